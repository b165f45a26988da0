//! Backend Module
//!
//! All server-side code: the Axum HTTP API, the WebSocket real-time channel,
//! persistence and authorization.
//!
//! # Architecture
//!
//! - **`server`** - Configuration, application state, start-up
//! - **`routes`** - Router assembly
//! - **`auth`** - Registration, login, JWT tokens
//! - **`middleware`** - The `AuthUser` bearer-token extractor
//! - **`profile`** - The caller's own profile
//! - **`connections`** - People directory and friend requests
//! - **`messaging`** - Direct message history and deletion
//! - **`groups`** - Groups, membership and group message history
//! - **`authorization`** - Who may do what, shared by HTTP and real-time
//! - **`realtime`** - Connection directory, group broadcast scope, fan-out
//! - **`store`** - `Store` trait with PostgreSQL and in-memory backends
//! - **`error`** - `BackendError` and its JSON rendering
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Binary entry point
//! ├── server/         - Config, state, initialization
//! ├── routes/         - Route configuration
//! ├── auth/           - Authentication
//! ├── middleware/     - Request extractors
//! ├── profile/        - Profile handlers
//! ├── connections/    - Friend request handlers
//! ├── messaging/      - Direct message handlers
//! ├── groups/         - Group handlers
//! ├── authorization/  - Decision functions
//! ├── realtime/       - WebSocket fan-out
//! ├── store/          - Persistence
//! └── error/          - Error types
//! ```
//!
//! # Request Flow
//!
//! Every mutating operation, HTTP or real-time, runs the same steps:
//!
//! 1. **Validate** the payload
//! 2. **Authorize** through `authorization`
//! 3. **Persist** through the `Store`
//! 4. **Fan out** to live connections through `realtime::FanOut`
//!
//! # Thread Safety
//!
//! The connection directory and broadcast scope are `Arc<RwLock<HashMap>>`
//! tables whose locks are never held across an `.await`; delivery goes through
//! a bounded queue per connection, so one slow socket cannot stall others.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Authentication and user model
pub mod auth;

/// Request extractors
pub mod middleware;

/// Profile endpoints
pub mod profile;

/// People directory and friend requests
pub mod connections;

/// Direct message endpoints
pub mod messaging;

/// Group endpoints
pub mod groups;

/// Authorization gate
pub mod authorization;

/// Real-time fan-out
pub mod realtime;

/// Persistence
pub mod store;

/// Backend error types
pub mod error;

pub use error::BackendError;
pub use server::create_app;
