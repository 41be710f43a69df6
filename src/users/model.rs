//! # User Model
//!
//! The user record and the inputs accepted by the repository.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier assigned by the repository
pub type UserId = i64;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Engineer,
    Intern,
}

impl Role {
    /// Every role, in declaration order
    pub const ALL: [Role; 3] = [Role::Admin, Role::Engineer, Role::Intern];

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Engineer => "ENGINEER",
            Role::Intern => "INTERN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}'", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    /// Matching is exact: `"intern"` is not a role.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// User record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier, immutable after creation
    pub id: UserId,

    /// Display name (non-empty)
    pub name: String,

    /// Email address
    pub email: String,

    /// Role within the organisation
    pub role: Role,
}

impl User {
    /// Build a record from validated input and an assigned id
    pub fn from_new(id: UserId, new_user: NewUser) -> Self {
        Self {
            id,
            name: new_user.name,
            email: new_user.email,
            role: new_user.role,
        }
    }
}

/// Input for creating a user. The id is assigned by the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            role,
        }
    }
}

/// Partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

impl UserPatch {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Overwrite the present fields of `user`
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing_is_exact() {
        assert_eq!("ADMIN".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("INTERN".parse::<Role>(), Ok(Role::Intern));
        assert!("intern".parse::<Role>().is_err());
        assert!("MANAGER".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serializes_uppercase() {
        let json = serde_json::to_value(Role::Engineer).unwrap();
        assert_eq!(json, "ENGINEER");
    }

    #[test]
    fn test_patch_only_touches_present_fields() {
        let mut user = User::from_new(7, NewUser::new("Ada", "ada@x.com", Role::Engineer));

        UserPatch::default().with_name("Grace").apply(&mut user);

        assert_eq!(user.id, 7);
        assert_eq!(user.name, "Grace");
        assert_eq!(user.email, "ada@x.com");
        assert_eq!(user.role, Role::Engineer);
    }
}
