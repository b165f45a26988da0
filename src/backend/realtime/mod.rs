//! Real-time Module
//!
//! Live delivery of direct and group messages over WebSocket.
//!
//! # Architecture
//!
//! - **`directory`** - which socket each online user is reachable on
//! - **`scope`** - which sockets subscribed to each group's channel
//! - **`fanout`** - validate, authorize, persist, then deliver
//! - **`socket`** - the `/ws` transport (reader loop + writer task)
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs        - Module exports and documentation
//! ├── directory.rs  - Connection directory and handles
//! ├── scope.rs      - Group broadcast scope
//! ├── fanout.rs     - Fan-out engine
//! └── socket.rs     - WebSocket handler
//! ```
//!
//! # Delivery
//!
//! Delivery is best effort. Each socket has a bounded queue; a full or closed
//! queue drops the copy. There is no acknowledgement, retry or offline queue:
//! users who were offline read history over HTTP.

/// Connection directory
pub mod directory;

/// Group broadcast scope
pub mod scope;

/// Fan-out engine
pub mod fanout;

/// WebSocket handler
pub mod socket;

pub use directory::{ConnectionDirectory, ConnectionHandle, ConnectionId};
pub use fanout::{FanOut, FanOutError, FanOutPolicy, Session, DEFAULT_CONNECTION_BUFFER};
pub use scope::BroadcastScope;
pub use socket::ws_handler;
