//! Groups Module
//!
//! Moderated groups over HTTP. One admin (the creator) moderates; members
//! read and post; other users may ask to join and wait in a pending list.
//!
//! # Module Structure
//!
//! ```text
//! groups/
//! ├── mod.rs          - Module exports and documentation
//! ├── handlers.rs     - List, create, update, delete
//! ├── membership.rs   - Join, approve, reject, add, remove, member listing
//! └── messages.rs     - Group history and message deletion
//! ```
//!
//! Every mutation is checked by `backend::authorization` and, where live
//! sockets are affected, followed by a call into the fan-out engine so that
//! removed members stop receiving and deleted messages disappear.

pub mod handlers;
pub mod membership;
pub mod messages;

pub use handlers::{create_group, delete_group, list_groups, update_group};
pub use membership::{add_member, approve_member, join_group, list_members, reject_member, remove_member};
pub use messages::{delete_group_message, group_messages};

use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::messaging::{Group, GroupId};

/// Load a group or answer 404
pub(crate) async fn load_group(state: &AppState, id: GroupId) -> Result<Group, BackendError> {
    state
        .store
        .group(id)
        .await?
        .ok_or_else(|| BackendError::not_found("Group not found"))
}
