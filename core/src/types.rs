//! Wire DTOs for the booleans API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Ids and timestamps stay opaque strings: the client never interprets them,
//! it only compares and hands them back. Integration tests catch any schema
//! drift between the two crates.

use serde::{Deserialize, Serialize};

/// A boolean record as returned by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoolRecord {
    pub id: String,
    pub value: bool,
    pub label: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Request payload for creating or partially updating a boolean. Only the
/// fields that are set end up in the JSON body; the server fills in defaults
/// on create and leaves omitted fields untouched on update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoolInit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl BoolInit {
    pub fn value(value: bool) -> Self {
        Self {
            value: Some(value),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Response body of `POST /tokens`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenResponse {
    pub token: String,
}
