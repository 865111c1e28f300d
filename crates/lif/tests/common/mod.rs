#![allow(dead_code)]

use lif::format::{FIELD_METADATA_JSON, MAGIC};

/// Appends a field table and trailer to `prefix`.
pub fn build_container(prefix: &[u8], fields: &[(u32, Vec<u8>)]) -> Vec<u8> {
    let mut table = Vec::new();
    table.extend_from_slice(&(fields.len() as u32).to_be_bytes());
    for (field_type, data) in fields {
        table.extend_from_slice(&field_type.to_be_bytes());
        table.extend_from_slice(&(data.len() as u32).to_be_bytes());
        table.extend_from_slice(data);
    }

    let mut out = prefix.to_vec();
    out.extend_from_slice(&table);
    out.extend_from_slice(&((table.len() + 6) as u32).to_be_bytes());
    out.extend_from_slice(&MAGIC.to_be_bytes());
    out
}

pub fn container_with_json(json: &serde_json::Value, extra: &[(u32, Vec<u8>)]) -> Vec<u8> {
    let mut fields = vec![(FIELD_METADATA_JSON, serde_json::to_vec(json).unwrap())];
    fields.extend_from_slice(extra);
    build_container(b"\xFF\xD8\xFF\xE0primary-jpeg\xFF\xD9", &fields)
}

/// Deterministic pseudo-random bytes (xorshift).
pub fn noise(seed: u32, len: usize) -> Vec<u8> {
    let mut state = seed.wrapping_mul(2_654_435_761).max(1);
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect()
}
