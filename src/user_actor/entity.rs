use chrono::Utc;

use crate::actor_framework::Entity;
use crate::domain::{normalize_email, User, UserCreate, UserPatch};

impl Entity for User {
    type Id = String;
    type CreateParams = UserCreate;
    type Patch = UserPatch;

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new User from creation parameters.
    ///
    /// # Arguments
    /// * `id` - Unique identifier for the user
    /// * `params` - Validated name, email and age
    ///
    /// # Notes
    /// The name is stored trimmed and the email lower-cased. Both timestamps
    /// start out equal.
    fn from_create_params(id: String, params: UserCreate) -> Result<Self, String> {
        let now = Utc::now();
        Ok(Self {
            id,
            name: params.name.trim().to_string(),
            email: normalize_email(&params.email),
            age: params.age,
            created_at: now,
            updated_at: now,
        })
    }

    /// Updates the user's profile information.
    ///
    /// # Fields Updated
    /// - `name`: trimmed display name
    /// - `email`: lower-cased email address
    /// - `age`: age in years
    /// - `updated_at`: always refreshed, never earlier than `created_at`
    fn on_update(&mut self, patch: UserPatch) -> Result<(), String> {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(email) = patch.email {
            self.email = normalize_email(&email);
        }
        if let Some(age) = patch.age {
            self.age = age;
        }
        self.updated_at = Utc::now().max(self.created_at);
        Ok(())
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.email.clone())
    }
}
