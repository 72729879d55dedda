use chrono::{DateTime, Utc};
use serde::Serialize;

/// Represents a registered user in the directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub age: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a new user. Values are stored trimmed and normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub age: u32,
}

/// Payload for updating an existing user. Only the supplied fields change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<u32>,
}

impl UserCreate {
    pub fn new(name: impl Into<String>, email: impl Into<String>, age: u32) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            age,
        }
    }
}

/// Lower-cases an email address for comparison and storage.
pub fn normalize_email(email: &str) -> String {
    email.to_lowercase()
}
