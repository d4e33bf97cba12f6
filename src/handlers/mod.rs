//! Request handlers for the gantt-bridge endpoints.

pub mod data;
pub mod settings;
pub mod writeback;

use serde::{Deserialize, Serialize};

/// Acknowledgment body returned by the write-back and settings endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteAck {
    /// `"success"`, or `"exists"` for a suppressed duplicate write.
    pub status: String,
    pub message: String,
}

impl WriteAck {
    pub(crate) fn success(message: &str) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn exists(message: &str) -> Self {
        Self {
            status: "exists".to_string(),
            message: message.to_string(),
        }
    }
}
