//! Authorization Module
//!
//! Pure who-can-do-what rules. Both the HTTP handlers and the real-time
//! fan-out engine call into this module, so the two surfaces cannot diverge.
//!
//! # Module Structure
//!
//! ```text
//! authorization/
//! ├── mod.rs       - Module exports and documentation
//! ├── snapshot.rs  - Relationship and group snapshots
//! └── gate.rs      - Decision functions and deny reasons
//! ```

/// Relationship and group snapshots
pub mod snapshot;

/// Decision functions
pub mod gate;

pub use gate::{
    can_delete_message, can_exchange_direct_message, can_join_group, can_moderate_group,
    can_read_group, can_remove_member, Decision, DenyKind, DenyReason,
};
pub use snapshot::{GroupSnapshot, RelationshipSnapshot};
