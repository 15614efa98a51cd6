//! Engine error types

use thiserror::Error;

/// Error type for the scan engine
///
/// The taxonomy matters for control flow: validation errors never reach
/// the network, `NotFound` is an empty state rather than a failure, and
/// transport/ambiguous errors from a provider trigger the single defined
/// fallback when no explicit provider preference is set.
#[derive(Debug, Error)]
pub enum ScanError {
    /// HTTP request failed before a response body could be read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned a non-success status
    #[error("Provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    /// Provider responded 2xx but without a recognizable success signal
    #[error("Ambiguous response: {0}")]
    AmbiguousResponse(String),

    /// Strip grant rejected because the collection is already complete
    ///
    /// Not fatal: the session flips its local `reward_unlocked`
    /// projection and offers the reset/redeem flow instead.
    #[error("Collection already complete; reset or redeem instead")]
    CompletionConflict,

    /// Debit larger than the current balance, rejected locally
    ///
    /// `requested` is unsigned so the magnitude of `i64::MIN` survives.
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u64, available: i64 },

    /// Strip grant attempted on an already-unlocked collection, rejected locally
    #[error("Collection complete; grant rejected locally")]
    CollectionComplete,

    /// Locally detected invalid input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Lookup/search yielded no record
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Response body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ScanError {
    /// Whether a failed provider attempt may be retried against the
    /// other provider (unknown-preference path only)
    ///
    /// Any transport-level or ambiguous failure is eligible, including a
    /// provider 404, the common case for a record registered with the
    /// other backend. Locally rejected mutations and completion
    /// conflicts are not: the provider that answered owns the record.
    pub fn triggers_fallback(&self) -> bool {
        !matches!(
            self,
            ScanError::CompletionConflict
                | ScanError::InsufficientBalance { .. }
                | ScanError::CollectionComplete
                | ScanError::Validation(_)
                | ScanError::Unauthorized
        )
    }

    /// Whether this error was detected locally, without any network call
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ScanError::InsufficientBalance { .. }
                | ScanError::CollectionComplete
                | ScanError::Validation(_)
        )
    }
}

/// Result type for engine operations
pub type ScanResult<T> = Result<T, ScanError>;
