//! Middleware Module
//!
//! Request processing shared by the protected routes.
//!
//! - **`auth`** - bearer-token authentication as an `AuthUser` extractor
//!
//! # Example
//!
//! ```rust,no_run
//! use circle_chat::backend::middleware::AuthUser;
//!
//! async fn handler(user: AuthUser) -> String {
//!     user.id().to_string()
//! }
//! ```

pub mod auth;

pub use auth::{authenticate, bearer_token, AuthUser, AuthenticatedUser};
