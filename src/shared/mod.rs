//! Shared Module
//!
//! Types shared between the HTTP surface and the real-time channel. Everything
//! here is plain data plus serialization; no I/O happens in this module.
//!
//! # Overview
//!
//! - **`messaging`** - persisted records (messages, groups) and directory views
//! - **`event`** - the real-time frame protocol (`ClientEvent` / `ServerEvent`)
//! - **`error`** - payload decoding and validation errors

/// Message, group and relationship data structures
pub mod messaging;

/// Real-time event protocol
pub mod event;

/// Shared error types
pub mod error;

pub use error::SharedError;
pub use event::{ClientEvent, ServerEvent};
