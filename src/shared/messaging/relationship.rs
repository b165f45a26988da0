//! Relationship Types
//!
//! Friend requests in this system are not standalone records: each user keeps
//! three id lists (friends, requests sent, requests received) and the
//! connection handlers move ids between them. These are the wire shapes the
//! people directory returns.

use serde::{Deserialize, Serialize};

use super::UserId;

/// How the caller relates to another user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RelationStatus {
    None,
    Friends,
    RequestSent,
    RequestReceived,
}

impl RelationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationStatus::None => "none",
            RelationStatus::Friends => "friends",
            RelationStatus::RequestSent => "request_sent",
            RelationStatus::RequestReceived => "request_received",
        }
    }
}

/// Entry in `GET /api/connections/people`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PersonSummary {
    pub id: UserId,
    pub name: String,
    pub bio: String,
    pub avatar_url: String,
    pub location: String,
    pub status: RelationStatus,
    /// Whether the user has a live real-time connection right now
    pub online: bool,
}

/// Plain acknowledgement body used by action endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionResponse {
    pub message: String,
}

impl ActionResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
