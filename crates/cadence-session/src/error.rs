use cadence_codec::CodecError;
use cadence_storage::StorageError;
use thiserror::Error;

/// Reasons a cached session is not usable. All of them end in a logged-out
/// session; none reach the user.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cached user record is malformed: {0}")]
    Decode(#[from] CodecError),

    #[error("cached user record is not a user: {0}")]
    Record(#[source] serde_json::Error),

    #[error("cached user record failed its integrity check")]
    Integrity,

    #[error(transparent)]
    Storage(#[from] StorageError),
}
