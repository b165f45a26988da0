//! Authentication Module
//!
//! Registration, login and bearer tokens.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── users.rs        - User model and profile views
//! ├── sessions.rs     - JWT token management
//! └── handlers/       - HTTP handlers
//!     ├── types.rs    - Request/response types
//!     ├── register.rs - Account creation
//!     └── login.rs    - Credential check
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Register**: name, email and password → user created → token returned
//! 2. **Login**: email and password verified → token returned
//! 3. **Protected routes**: `Authorization: Bearer <token>` is checked by the
//!    `AuthUser` extractor in `backend::middleware`
//!
//! # Security
//!
//! - Passwords are hashed with bcrypt before storage
//! - Tokens expire after `TOKEN_TTL_DAYS`
//! - Invalid credentials return 401 without saying which part was wrong

/// User model and profile views
pub mod users;

/// JWT token generation and validation
pub mod sessions;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use handlers::types::{AuthResponse, LoginRequest, RegisterRequest};
pub use handlers::{login, register};
pub use users::{Profile, ProfileUpdate, User};
