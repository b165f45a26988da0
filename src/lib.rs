//! Circle Chat - Main Library
//!
//! Server core of a small social network: people connect through friend
//! requests, exchange direct messages, and gather in admin-moderated groups.
//! New messages reach online users over a WebSocket the moment they are
//! persisted.
//!
//! # Module Structure
//!
//! - **`shared`** - Wire types used by both the HTTP API and the real-time
//!   channel: messages, groups, relationship views, the event protocol
//! - **`backend`** - Axum server, authorization, persistence, fan-out
//!
//! # Usage
//!
//! ```rust,no_run
//! use circle_chat::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(ServerConfig::from_env()?).await?;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;
