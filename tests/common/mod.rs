//! Common test utilities and helpers
//!
//! - `fixtures` - a `TestApp` wrapping an axum-test server and its state
//! - `auth_helpers` - registering users and building bearer headers
//! - `assertions` - checks on the standard error body

pub mod assertions;

pub use assertions::*;
pub use auth_helpers::*;
pub use fixtures::*;
