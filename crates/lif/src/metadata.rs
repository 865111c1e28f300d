use serde_json::Value;

use crate::container::ContainerIndex;
use crate::error::{LifError, LifResult};
use crate::format::{FIELD_METADATA_JSON, FIELD_METADATA_JSON_LEGACY};

/// Parses the JSON metadata field of a container into an untyped tree.
///
/// Field type 8 is preferred; older writers used 7. Trailing NUL padding is ignored.
pub fn extract_metadata(index: &ContainerIndex) -> LifResult<Value> {
    let field = index
        .field_or_legacy(FIELD_METADATA_JSON, FIELD_METADATA_JSON_LEGACY)
        .ok_or(LifError::MissingMetadata)?;

    let text = std::str::from_utf8(&field.data)
        .map_err(|e| LifError::malformed(format!("metadata is not UTF-8: {e}")))?;
    let text = text.trim_end_matches('\0');

    Ok(serde_json::from_str(text)?)
}
