//! # User Directory
//!
//! An in-memory directory of user records with email uniqueness, served over
//! HTTP.
//!
//! ## Layout
//!
//! - **Validation** - pure checks on submitted fields → [`validation`]
//! - **Domain types** - the user record and its payloads → [`domain::User`]
//! - **Resource actor** - a single task owns the store and applies one
//!   request at a time, so uniqueness checks and writes never interleave →
//!   [`actor_framework::ResourceActor`]
//! - **Clients** - cheap cloneable handles with typed errors →
//!   [`clients::UserClient`]
//! - **System** - startup, tracing and shutdown → [`app_system`]
//! - **Transport** - axum routes and the JSON envelope → [`http`]
//!
//! ## Example Usage
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use user_directory::app_system::DirectorySystem;
//! use user_directory::domain::UserCreate;
//!
//! let system = DirectorySystem::new(32);
//! let users = system.user_client.clone();
//!
//! let alice = users.create_user(UserCreate::new("Alice", "Alice@X.com", 30)).await?;
//! assert_eq!(alice.email, "alice@x.com");
//!
//! drop(users);
//! system.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod actor_framework;
pub mod app_system;
pub mod clients;
pub mod config;
pub mod domain;
pub mod http;
pub mod user_actor;
pub mod validation;

#[cfg(test)]
mod mock_framework;
