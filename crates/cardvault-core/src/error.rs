use cardvault_storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Content is empty")]
    EmptyContent,

    #[error("Content too large: {size} bytes (max {max})")]
    ContentTooLarge { size: usize, max: usize },

    #[error("Cannot digest empty input")]
    EmptyInput,

    #[error("Metadata key {0:?} is reserved for audit records")]
    ReservedMetadataKey(&'static str),

    #[error("Invalid pluggable digest: {0}")]
    InvalidPluggableDigest(String),

    #[error("Invalid escalation ladder: {0}")]
    InvalidLadder(String),

    #[error("No algorithm stronger than {algorithm}")]
    NoStrongerAlgorithm { algorithm: String },

    #[error("Storage unavailable: {operation} still busy after {attempts} attempts")]
    StorageUnavailable {
        operation: &'static str,
        attempts: u32,
    },

    #[error("Audit record for {digest} still conflicts after {attempts} attempts")]
    AuditUnresolvable { digest: String, attempts: u32 },

    #[error("Unknown digest algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl CoreError {
    /// True when the caller's input was rejected, as opposed to a server-side failure
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CoreError::EmptyContent
                | CoreError::ContentTooLarge { .. }
                | CoreError::EmptyInput
                | CoreError::ReservedMetadataKey(_)
        )
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
