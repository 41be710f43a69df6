//! # Users Module
//!
//! The user record, its in-memory repository, and the request shapes
//! validated at the HTTP boundary.

pub mod errors;
pub mod model;
pub mod repository;
pub mod validation;

pub use errors::{UserError, UserResult};
pub use model::{NewUser, Role, User, UserId, UserPatch};
pub use repository::{seed_users, InMemoryUserRepository, UserRepository};
pub use validation::{CreateUserRequest, FieldError, UpdateUserRequest, ValidationErrors};
