//! # Request Validation
//!
//! Shape checks applied at the HTTP boundary before anything reaches the
//! repository. Every failing field is reported, not just the first.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::model::{NewUser, Role, UserId, UserPatch};

pub const NAME_EMPTY: &str = "name should not be empty";
pub const EMAIL_INVALID: &str = "email must be an email";
pub const ROLE_INVALID: &str = "Valid role required";
pub const ID_NOT_NUMERIC: &str = "Validation failed (numeric string is expected)";

static EMAIL_PATTERN: OnceLock<Regex> = OnceLock::new();

fn email_pattern() -> &'static Regex {
    EMAIL_PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").expect("email pattern is valid")
    })
}

/// Syntactic email check
pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

/// One failing field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All failing fields of one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-field error
    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// POST /users body
///
/// Fields are kept as raw JSON so a value of the wrong type is reported
/// against its field rather than as an unreadable body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub role: Option<Value>,
}

impl CreateUserRequest {
    /// All three fields are required.
    pub fn validate(self) -> Result<NewUser, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = check_name(self.name.as_ref(), &mut errors);
        let email = check_email(self.email.as_ref(), &mut errors);
        let role = check_role(self.role.as_ref(), &mut errors);

        match (name, email, role) {
            (Some(name), Some(email), Some(role)) => {
                errors.into_result(|| NewUser::new(name, email, role))
            }
            _ => Err(errors),
        }
    }
}

/// PATCH /users/:id body. A `null` field counts as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub role: Option<Value>,
}

impl UpdateUserRequest {
    /// Same rules as creation, applied only to the fields that are present.
    pub fn validate(self) -> Result<UserPatch, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = self
            .name
            .as_ref()
            .and_then(|name| check_name(Some(name), &mut errors));
        let email = self
            .email
            .as_ref()
            .and_then(|email| check_email(Some(email), &mut errors));
        let role = self
            .role
            .as_ref()
            .and_then(|role| check_role(Some(role), &mut errors));

        errors.into_result(|| UserPatch { name, email, role })
    }
}

fn check_name(name: Option<&Value>, errors: &mut ValidationErrors) -> Option<String> {
    match name.and_then(Value::as_str) {
        Some(name) if !name.trim().is_empty() => Some(name.to_string()),
        _ => {
            errors.push("name", NAME_EMPTY);
            None
        }
    }
}

fn check_email(email: Option<&Value>, errors: &mut ValidationErrors) -> Option<String> {
    match email.and_then(Value::as_str) {
        Some(email) if is_valid_email(email) => Some(email.to_string()),
        _ => {
            errors.push("email", EMAIL_INVALID);
            None
        }
    }
}

fn check_role(role: Option<&Value>, errors: &mut ValidationErrors) -> Option<Role> {
    match role.and_then(Value::as_str).map(str::parse::<Role>) {
        Some(Ok(role)) => Some(role),
        _ => {
            errors.push("role", ROLE_INVALID);
            None
        }
    }
}

/// Parse an `:id` path segment: optional `-` then ASCII digits only.
pub fn parse_id(raw: &str) -> Result<UserId, ValidationErrors> {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationErrors::single("id", ID_NOT_NUMERIC));
    }

    raw.parse::<UserId>()
        .map_err(|_| ValidationErrors::single("id", ID_NOT_NUMERIC))
}
