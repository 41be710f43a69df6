//! # User Repository
//!
//! Owns the in-memory user collection. Every read hands out clones and every
//! mutation goes through the trait methods below; the backing `Vec` is never
//! exposed.

use std::sync::RwLock;

use tracing::debug;

use super::errors::{UserError, UserResult};
use super::model::{NewUser, Role, User, UserId, UserPatch};

/// User repository trait
///
/// Abstracts storage operations for users.
pub trait UserRepository: Send + Sync {
    /// All users in insertion order, optionally restricted to one role
    fn list(&self, role: Option<Role>) -> UserResult<Vec<User>>;

    /// Find a user by id
    fn get(&self, id: UserId) -> UserResult<User>;

    /// Store a new user under a freshly assigned id
    fn create(&self, new_user: NewUser) -> UserResult<User>;

    /// Overwrite the fields present in `patch`
    fn update(&self, id: UserId, patch: UserPatch) -> UserResult<User>;

    /// Remove a user, returning the record as it was
    fn remove(&self, id: UserId) -> UserResult<User>;

    /// Number of stored users
    fn len(&self) -> UserResult<usize>;

    fn is_empty(&self) -> UserResult<bool> {
        Ok(self.len()? == 0)
    }
}

/// Records loaded at startup
pub fn seed_users() -> Vec<User> {
    vec![
        User::from_new(1, NewUser::new("Leanne Graham", "Sincere@april.biz", Role::Intern)),
        User::from_new(2, NewUser::new("Ervin Howell", "Shanna@melissa.tv", Role::Intern)),
        User::from_new(3, NewUser::new("Clementine Bauch", "Nathan@yesenia.net", Role::Engineer)),
        User::from_new(
            4,
            NewUser::new("Patricia Lebsack", "Julianne.OConner@kory.org", Role::Engineer),
        ),
        User::from_new(5, NewUser::new("Chelsey Dietrich", "Lucio_Hettinger@annie.ca", Role::Admin)),
    ]
}

/// In-memory user repository
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    /// Empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository holding the startup records
    pub fn with_seed() -> Self {
        Self::with_users(seed_users())
    }

    /// Repository holding `users`. Ids must already be unique.
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: RwLock::new(users),
        }
    }

    /// Next id: one past the current maximum, or 1 for an empty collection.
    fn next_id(users: &[User]) -> UserId {
        users.iter().map(|u| u.id).max().unwrap_or(0) + 1
    }
}

impl UserRepository for InMemoryUserRepository {
    fn list(&self, role: Option<Role>) -> UserResult<Vec<User>> {
        let users = self.users.read().map_err(|_| UserError::lock_poisoned())?;

        Ok(match role {
            Some(role) => users.iter().filter(|u| u.role == role).cloned().collect(),
            None => users.clone(),
        })
    }

    fn get(&self, id: UserId) -> UserResult<User> {
        let users = self.users.read().map_err(|_| UserError::lock_poisoned())?;

        users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(UserError::NotFound(id))
    }

    fn create(&self, new_user: NewUser) -> UserResult<User> {
        let mut users = self.users.write().map_err(|_| UserError::lock_poisoned())?;

        let user = User::from_new(Self::next_id(&users), new_user);
        users.push(user.clone());

        debug!(id = user.id, role = %user.role, "user created");
        Ok(user)
    }

    fn update(&self, id: UserId, patch: UserPatch) -> UserResult<User> {
        let mut users = self.users.write().map_err(|_| UserError::lock_poisoned())?;

        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(UserError::NotFound(id))?;

        patch.apply(user);

        debug!(id, "user updated");
        Ok(user.clone())
    }

    fn remove(&self, id: UserId) -> UserResult<User> {
        let mut users = self.users.write().map_err(|_| UserError::lock_poisoned())?;

        let idx = users
            .iter()
            .position(|u| u.id == id)
            .ok_or(UserError::NotFound(id))?;

        let removed = users.remove(idx);

        debug!(id, "user removed");
        Ok(removed)
    }

    fn len(&self) -> UserResult<usize> {
        let users = self.users.read().map_err(|_| UserError::lock_poisoned())?;
        Ok(users.len())
    }
}
