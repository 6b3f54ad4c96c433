//! Uniform response envelope for confirmations and errors.

use serde::{Deserialize, Serialize};

/// The JSON body returned for confirmations and for every error response.
///
/// ```json
/// { "Message": "Error retriving comment by id", "Error": "record not found" }
/// ```
///
/// `Error` is omitted entirely on confirmations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Envelope {
    /// Human-readable context for the response.
    #[serde(rename = "Message")]
    pub message: String,

    /// Description of the underlying failure, if any.
    #[serde(rename = "Error", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    /// A confirmation with no error attached.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: None,
        }
    }

    /// An error envelope: request context plus the underlying error text.
    pub fn error(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: Some(error.into()),
        }
    }
}

/// Fixed `Message` strings used by the server.
///
/// Clients match on these, so they keep their historical spelling.
pub mod messages {
    pub const ALIVE: &str = "I am alive";
    pub const DELETED: &str = "Successfully deleted comment.";
    pub const NOT_AUTHORIZED: &str = "not authorized";
    pub const BAD_ID: &str = "unable to parse UINT from ID";
    pub const BAD_BODY: &str = "Failed to decode request body";
    pub const BAD_QUERY: &str = "Failed to decode query parameters";
    pub const GET_FAILED: &str = "Error retriving comment by id";
    pub const LIST_FAILED: &str = "Error retrieving all comments";
    pub const CREATE_FAILED: &str = "Failed to create comment";
    pub const UPDATE_FAILED: &str = "Failed to update comment";
    pub const ENCODE_FAILED: &str = "Failed to encode response";

    /// Context for a failed delete, which names the requested id.
    pub fn delete_failed(id: impl std::fmt::Display) -> String {
        format!("Failed to delete comment with id {id}")
    }
}
