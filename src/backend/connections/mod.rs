//! Connections Module
//!
//! The people directory and friend requests.
//!
//! Each user keeps three id sets (friends, requests sent, requests received).
//! A request moves the pair into sent/received; accepting moves both sides to
//! friends; ignoring clears the pending pair. Sending a request to someone who
//! already asked you accepts theirs, so a pair is never both pending and
//! friends.

pub mod handlers;

pub use handlers::{accept_request, ignore_request, list_people, relation_status, send_request};
