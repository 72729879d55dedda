//! Field validation for user input.
//!
//! The validator works on the raw JSON values a caller submitted so that type
//! mismatches (a numeric name, a string age) are reported the same way as
//! out-of-range values. It never trims or normalizes; that is the store's job.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::domain::{UserCreate, UserPatch};

/// Maximum allowed length for a name in UTF-16 code units, counted before trimming.
pub const NAME_MAX_LEN: usize = 100;
/// Youngest accepted age.
pub const AGE_MIN: u32 = 1;
/// Oldest accepted age.
pub const AGE_MAX: u32 = 149;

/// First failing field of a candidate user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidField {
    #[error("Name is required")]
    NameRequired,
    #[error("Email is required")]
    EmailRequired,
    #[error("Age is required")]
    AgeRequired,
    #[error("Name must be a non-empty string (max 100 chars)")]
    InvalidName,
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("Age must be a number between 1 and 149")]
    InvalidAge,
}

/// Candidate field values as submitted. `None` means the key was absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserInput {
    pub name: Option<Value>,
    pub email: Option<Value>,
    pub age: Option<Value>,
}

impl UserInput {
    /// Picks the known fields out of a request body. Anything other than a
    /// JSON object carries no fields.
    pub fn from_json(body: Value) -> Self {
        match body {
            Value::Object(mut fields) => Self {
                name: fields.remove("name"),
                email: fields.remove("email"),
                age: fields.remove("age"),
            },
            _ => Self::default(),
        }
    }

    /// Validates every field as mandatory and converts to a create payload.
    pub fn into_create(self) -> Result<UserCreate, InvalidField> {
        validate_user_input(&self, false)?;
        Ok(UserCreate {
            name: string_value(self.name).ok_or(InvalidField::NameRequired)?,
            email: string_value(self.email).ok_or(InvalidField::EmailRequired)?,
            age: self.age.as_ref().and_then(age_value).ok_or(InvalidField::AgeRequired)?,
        })
    }

    /// Validates the supplied fields and converts to a patch payload.
    pub fn into_patch(self) -> Result<UserPatch, InvalidField> {
        validate_user_input(&self, true)?;
        Ok(UserPatch {
            name: string_value(self.name),
            email: string_value(self.email),
            age: self.age.as_ref().and_then(age_value),
        })
    }
}

/// Return true if the name is non-blank and at most [`NAME_MAX_LEN`] UTF-16 units long.
pub fn is_valid_name(name: &str) -> bool {
    !name.trim().is_empty() && name.encode_utf16().count() <= NAME_MAX_LEN
}

/// Return true if the email has the `local@domain.tld` shape.
///
/// ```
/// assert!(user_directory::validation::is_valid_email("alice@example.com"));
/// assert!(!user_directory::validation::is_valid_email("alice@example"));
/// ```
pub fn is_valid_email(email: &str) -> bool {
    static RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));
    RE.is_match(email)
}

pub fn validate_name(value: &Value) -> bool {
    value.as_str().is_some_and(is_valid_name)
}

pub fn validate_email(value: &Value) -> bool {
    value.as_str().is_some_and(is_valid_email)
}

pub fn validate_age(value: &Value) -> bool {
    age_value(value).is_some()
}

/// Checks a candidate and reports the first failure.
///
/// A full candidate (`partial == false`) must carry all three fields: missing
/// fields are reported first, in the order name, email, age, before any
/// field's content is checked. A partial candidate only has its present
/// fields checked, in the same order.
pub fn validate_user_input(input: &UserInput, partial: bool) -> Result<(), InvalidField> {
    if !partial {
        if is_missing(input.name.as_ref()) {
            return Err(InvalidField::NameRequired);
        }
        if is_missing(input.email.as_ref()) {
            return Err(InvalidField::EmailRequired);
        }
        if is_missing(input.age.as_ref()) {
            return Err(InvalidField::AgeRequired);
        }
    }

    if input.name.as_ref().is_some_and(|name| !validate_name(name)) {
        return Err(InvalidField::InvalidName);
    }
    if input.email.as_ref().is_some_and(|email| !validate_email(email)) {
        return Err(InvalidField::InvalidEmail);
    }
    if input.age.as_ref().is_some_and(|age| !validate_age(age)) {
        return Err(InvalidField::InvalidAge);
    }
    Ok(())
}

// A required field counts as missing when it is absent or holds an empty value.
fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(_) => false,
    }
}

fn string_value(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

// Integral numbers only; `30.0` is accepted as 30.
fn age_value(value: &Value) -> Option<u32> {
    let age = value.as_f64()?;
    if age.fract() != 0.0 || age < f64::from(AGE_MIN) || age > f64::from(AGE_MAX) {
        return None;
    }
    u32::try_from(age as i64).ok()
}
