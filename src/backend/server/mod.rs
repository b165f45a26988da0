//! Server Module
//!
//! Configuration, shared state and start-up of the Axum server.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - ServerConfig, builder and store selection
//! └── init.rs         - App creation and background tasks
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration**: `ServerConfig::from_env()` after `dotenv`
//! 2. **Store**: PostgreSQL or in-memory, chosen by `DATABASE_URL`
//! 3. **State**: directory, broadcast scope and fan-out engine
//! 4. **Background Tasks**: periodic prune of closed connections
//! 5. **Router**: API, WebSocket and health routes
//!
//! # Example
//!
//! ```rust,no_run
//! use circle_chat::backend::server::{create_app, config::ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(ServerConfig::from_env()?).await?;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use config::{ConfigError, ServerConfig};
pub use init::create_app;
pub use state::AppState;
