//! Messaging Module
//!
//! HTTP side of direct messages. Sending happens over the real-time channel
//! (`backend::realtime`); this module serves history and deletions and tells
//! live connections about the latter.

pub mod handlers;

pub use handlers::{delete_conversation, delete_message, get_conversation};
