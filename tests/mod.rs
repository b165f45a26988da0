//! Test suite for circle-chat
//!
//! - `common` - fixtures, auth helpers, assertions
//! - `integration` - HTTP API and real-time scenarios over the in-memory store
//! - `property` - proptest checks of the authorization gate and directory

mod common;
mod property;
