use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("record could not be serialized: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("malformed record: {0}")]
    Decode(String),
}

impl CodecError {
    pub(crate) fn decode(what: impl std::fmt::Display) -> Self {
        CodecError::Decode(what.to_string())
    }
}
