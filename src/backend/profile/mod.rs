//! Profile Module
//!
//! The caller's own account: `GET /api/profile/me` and `PUT /api/profile/me`.

pub mod handlers;

pub use handlers::{get_me, update_me};
