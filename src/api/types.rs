//! API request and response types

use crate::state_machine::Message;
use serde::{Deserialize, Serialize};

/// Response for a freshly opened chat session
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub messages: Vec<Message>,
}

/// Request to submit chat text
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Request to replace the input buffer
#[derive(Debug, Serialize, Deserialize)]
pub struct DraftBody {
    pub text: String,
}

/// Response with the transcript
#[derive(Debug, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub messages: Vec<Message>,
    pub reply_pending: bool,
}

/// Response for chat action
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub queued: bool,
}

/// Pagination for the community feed
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct ConceptMergeRequest {
    #[serde(default)]
    pub concept1: String,
    #[serde(default)]
    pub concept2: String,
}

#[derive(Debug, Deserialize)]
pub struct OptimizeCostRequest {
    #[serde(default)]
    pub components: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuickMessageRequest {
    #[serde(default)]
    pub message: String,
}

/// Health probe body
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub sessions: usize,
}

/// Generic success response
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
