use bytes::Bytes;

use crate::container::ContainerIndex;
use crate::error::{LifError, LifResult};
use crate::model::BlobRef;

/// Resolves a blob reference to its payload.
///
/// The primary-image sentinel yields `primary` unchanged; any other id is looked up as a field
/// type. Pure lookup: no decoding and no caching.
pub fn resolve_blob(blob: BlobRef, index: &ContainerIndex, primary: &Bytes) -> LifResult<Bytes> {
    if blob.is_primary() {
        return Ok(primary.clone());
    }

    u32::try_from(blob.blob_id)
        .ok()
        .and_then(|field_type| index.field(field_type))
        .map(|field| field.data.clone())
        .ok_or(LifError::UnresolvedBlob(blob.blob_id))
}

/// A container index bound to its primary bytes.
#[derive(Debug, Clone, Copy)]
pub struct BlobResolver<'a> {
    pub index: &'a ContainerIndex,
    pub primary: &'a Bytes,
}

impl<'a> BlobResolver<'a> {
    pub fn new(index: &'a ContainerIndex, primary: &'a Bytes) -> Self {
        Self { index, primary }
    }

    #[inline]
    pub fn resolve(&self, blob: BlobRef) -> LifResult<Bytes> {
        resolve_blob(blob, self.index, self.primary)
    }
}
