//! Route Configuration Module
//!
//! - **`router`** - Main router creation, layers, health and WebSocket routes
//! - **`api_routes`** - The JSON API under `/api`
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation
//! └── api_routes.rs   - API endpoint table
//! ```

/// Main router creation
pub mod router;

/// API endpoint handlers
pub mod api_routes;

pub use router::create_router;
