//! Synthetic container construction for unit tests.

use crate::format::MAGIC;

/// Appends a field table and trailer to `prefix`.
pub(crate) fn build_container(prefix: &[u8], fields: &[(u32, &[u8])]) -> Vec<u8> {
    let mut table = Vec::new();
    table.extend_from_slice(&(fields.len() as u32).to_be_bytes());
    for (field_type, data) in fields {
        table.extend_from_slice(&field_type.to_be_bytes());
        table.extend_from_slice(&(data.len() as u32).to_be_bytes());
        table.extend_from_slice(data);
    }

    let mut out = prefix.to_vec();
    out.extend_from_slice(&table);
    let region_offset = (table.len() + 6) as u32;
    out.extend_from_slice(&region_offset.to_be_bytes());
    out.extend_from_slice(&MAGIC.to_be_bytes());
    out
}

/// Builds a container whose metadata field holds `json`.
pub(crate) fn container_with_json(json: &serde_json::Value, extra: &[(u32, &[u8])]) -> Vec<u8> {
    let text = serde_json::to_vec(json).unwrap();
    let mut fields: Vec<(u32, &[u8])> = vec![(crate::format::FIELD_METADATA_JSON, text.as_slice())];
    fields.extend_from_slice(extra);
    build_container(b"\xFF\xD8primary\xFF\xD9", &fields)
}

#[inline]
pub(crate) fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() <= 1e-4 * a.abs().max(b.abs()).max(1.0)
}
