//! Error taxonomy for remote persistence calls.
//!
//! Rejections and transport failures are distinct variants but propagate
//! identically: either one stops a save invocation from advancing past the
//! failed step.

/// Error returned by any `CourseApi` operation.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The remote system returned a non-success status for the operation.
    #[error("{operation} rejected with status {status}: {message}")]
    Rejected {
        operation: &'static str,
        status: u16,
        message: String,
    },

    /// The request never completed (connection, DNS, timeout).
    #[error("transport failure during {operation}: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The operation referenced an id the remote system does not know.
    #[error("unknown {entity} id {id}")]
    UnknownEntity { entity: &'static str, id: String },

    /// The remote system answered with a body the client could not decode.
    #[error("invalid response from {operation}: {detail}")]
    InvalidResponse {
        operation: &'static str,
        detail: String,
    },
}

impl ApiError {
    /// The operation name the error originated from, where known.
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            ApiError::Rejected { operation, .. } => Some(operation),
            ApiError::Transport { operation, .. } => Some(operation),
            ApiError::InvalidResponse { operation, .. } => Some(operation),
            ApiError::UnknownEntity { .. } => None,
        }
    }
}
