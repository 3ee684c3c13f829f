use stockroom_core::error::CoreError;

/// Errors from the inventory REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a usable response: connection refused,
    /// timeout, TLS failure, or a body that did not decode.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A 2xx body that is not the JSON shape the endpoint promises.
    #[error("Unexpected API response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The server answered but refused the request, either with
    /// `success: false` or a non-2xx status.
    #[error("{message}")]
    Rejected {
        /// HTTP status code of the refusing response.
        status: u16,
        /// Server-provided message, or the raw body when none was given.
        message: String,
    },

    /// The endpoint set has no route for this operation.
    #[error("{collection} does not support {operation}")]
    Unsupported {
        collection: &'static str,
        operation: &'static str,
    },
}

/// Coarse classification used when deciding how to present a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NetworkFailure,
    ServerRejection,
    ValidationFailure,
}

impl ApiError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ApiError::Network(_) | ApiError::Decode(_) => FailureKind::NetworkFailure,
            ApiError::Rejected { .. } | ApiError::Unsupported { .. } => {
                FailureKind::ServerRejection
            }
        }
    }
}

/// Errors returned by [`ListCache::mutate`](crate::cache::ListCache::mutate).
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The draft failed client-side validation; nothing was sent.
    #[error(transparent)]
    Validation(#[from] CoreError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CacheError {
    pub fn kind(&self) -> FailureKind {
        match self {
            CacheError::Validation(_) => FailureKind::ValidationFailure,
            CacheError::Api(e) => e.kind(),
        }
    }
}
