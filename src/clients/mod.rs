//! Typed client facades over the generic resource actors.

pub mod macros;
pub mod user_client;

pub use user_client::*;
