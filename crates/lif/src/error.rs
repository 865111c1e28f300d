use crate::format::{FIELD_METADATA_JSON, FIELD_METADATA_JSON_LEGACY};

pub type LifResult<T> = Result<T, LifError>;

/// Every way a load can fail. The pipeline is fail-fast: the first error aborts the load and
/// no partially normalized view is ever returned.
#[derive(thiserror::Error, Debug)]
pub enum LifError {
    #[error("not a LIF container: trailing marker is {found:#06x}")]
    NotContainerFormat { found: u16 },

    #[error("read of {wanted} bytes at offset {offset} exceeds buffer of {len} bytes")]
    OutOfBounds { offset: u64, wanted: u64, len: u64 },

    #[error(
        "missing metadata: no field of type {} or {}",
        FIELD_METADATA_JSON,
        FIELD_METADATA_JSON_LEGACY
    )]
    MissingMetadata,

    #[error("malformed metadata: {0}")]
    MalformedMetadata(String),

    #[error("unresolved blob: no container field of type {0}")]
    UnresolvedBlob(i64),

    #[error("image decode error: {0}")]
    ImageDecode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LifError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedMetadata(msg.into())
    }

    pub fn image_decode(msg: impl Into<String>) -> Self {
        Self::ImageDecode(msg.into())
    }
}

impl From<serde_json::Error> for LifError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedMetadata(err.to_string())
    }
}
