//! Authentication HTTP Handlers
//!
//! - `types` - request and response bodies
//! - `register` - POST /api/auth/register
//! - `login` - POST /api/auth/login

pub mod types;
pub mod register;
pub mod login;

pub use login::login;
pub use register::register;
