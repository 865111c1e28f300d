use bytes::Bytes;

use crate::cursor::ByteCursor;
use crate::error::{LifError, LifResult};
use crate::format::{MAGIC, MAGIC_LEN, TRAILER_LEN};

/// One typed record of the field table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawField {
    pub field_type: u32,
    pub data: Bytes,
}

/// Decoded field table of a LIF container, fields in file order.
#[derive(Debug, Clone)]
pub struct ContainerIndex {
    pub fields: Vec<RawField>,
    pub file_size: u64,
    /// Absolute offset of the field table.
    pub index_offset: u64,
}

impl ContainerIndex {
    /// Decodes the trailing index of a container. Any violated precondition aborts the decode.
    pub fn parse(bytes: impl Into<Bytes>) -> LifResult<Self> {
        let mut cur = ByteCursor::new(bytes);
        let file_size = cur.len();

        // 1. Trailing magic.
        cur.set_offset(tail(file_size, MAGIC_LEN)?);
        let found = cur.read_u16()?;
        if found != MAGIC {
            return Err(LifError::NotContainerFormat { found });
        }

        // 2. Backward distance from end-of-file to the field table.
        cur.set_offset(tail(file_size, TRAILER_LEN)?);
        let region_offset = cur.read_u32()? as u64;

        // 3. Field table.
        let index_offset = tail(file_size, region_offset)?;
        cur.set_offset(index_offset);
        let field_count = cur.read_u32()?;

        // Each record needs at least 8 header bytes; cap the reservation by what could fit.
        let room = file_size.saturating_sub(cur.offset()) / 8;
        let mut fields = Vec::with_capacity((field_count as u64).min(room) as usize);

        for _ in 0..field_count {
            let field_type = cur.read_u32()?;
            let field_size = cur.read_u32()? as u64;
            let data = cur.read_bytes(field_size)?;
            fields.push(RawField { field_type, data });
        }

        log::debug!(
            "LIF index: size={} index_offset={} fields={:?}",
            file_size,
            index_offset,
            fields
                .iter()
                .map(|f| (f.field_type, f.data.len()))
                .collect::<Vec<_>>()
        );

        Ok(Self {
            fields,
            file_size,
            index_offset,
        })
    }

    /// First field of the given type.
    pub fn field(&self, field_type: u32) -> Option<&RawField> {
        self.fields.iter().find(|f| f.field_type == field_type)
    }

    /// First field of `preferred`, else the first of `legacy`.
    pub fn field_or_legacy(&self, preferred: u32, legacy: u32) -> Option<&RawField> {
        self.field(preferred).or_else(|| self.field(legacy))
    }
}

#[inline]
fn tail(file_size: u64, distance: u64) -> LifResult<u64> {
    file_size
        .checked_sub(distance)
        .ok_or(LifError::OutOfBounds {
            offset: 0,
            wanted: distance,
            len: file_size,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::build_container;

    #[test]
    fn decodes_fields_in_order() {
        let bytes = build_container(b"\xFF\xD8jpeg\xFF\xD9", &[(9, b"abc"), (8, b"{}"), (9, b"zz")]);
        let index = ContainerIndex::parse(bytes.clone()).unwrap();

        assert_eq!(index.file_size, bytes.len() as u64);
        assert_eq!(index.index_offset, 8);
        assert_eq!(index.fields.len(), 3);
        assert_eq!(index.fields[0].field_type, 9);
        assert_eq!(&index.fields[0].data[..], b"abc");
        assert_eq!(&index.fields[2].data[..], b"zz");
        // First match wins.
        assert_eq!(&index.field(9).unwrap().data[..], b"abc");
        assert!(index.field(1).is_none());
    }

    #[test]
    fn legacy_fallback() {
        let bytes = build_container(b"", &[(7, b"old")]);
        let index = ContainerIndex::parse(bytes).unwrap();
        assert_eq!(&index.field_or_legacy(8, 7).unwrap().data[..], b"old");

        let bytes = build_container(b"", &[(7, b"old"), (8, b"new")]);
        let index = ContainerIndex::parse(bytes).unwrap();
        assert_eq!(&index.field_or_legacy(8, 7).unwrap().data[..], b"new");
    }

    #[test]
    fn rejects_wrong_magic() {
        let mut bytes = build_container(b"x", &[(8, b"{}")]);
        let n = bytes.len();
        bytes[n - 1] = 0x1B;
        assert!(matches!(
            ContainerIndex::parse(bytes),
            Err(LifError::NotContainerFormat { found: 0x1E1B })
        ));
    }

    #[test]
    fn tiny_buffers_are_out_of_bounds() {
        assert!(matches!(
            ContainerIndex::parse(vec![0x1E]),
            Err(LifError::OutOfBounds { .. })
        ));
        // Valid magic but no room for the region offset.
        assert!(matches!(
            ContainerIndex::parse(vec![0, 0x1E, 0x1A]),
            Err(LifError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn region_offset_past_start_is_out_of_bounds() {
        let mut bytes = vec![0u8; 4];
        bytes.extend_from_slice(&1000u32.to_be_bytes());
        bytes.extend_from_slice(&MAGIC.to_be_bytes());
        assert!(matches!(
            ContainerIndex::parse(bytes),
            Err(LifError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn oversized_field_is_out_of_bounds() {
        let mut bytes = build_container(b"", &[(8, b"{}")]);
        // Patch the first field_size (after field_count and field_type) to something huge.
        bytes[8..12].copy_from_slice(&u32::MAX.to_be_bytes());
        assert!(matches!(
            ContainerIndex::parse(bytes),
            Err(LifError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn oversized_field_count_is_out_of_bounds() {
        let mut bytes = build_container(b"", &[(8, b"{}")]);
        bytes[0..4].copy_from_slice(&u32::MAX.to_be_bytes());
        assert!(matches!(
            ContainerIndex::parse(bytes),
            Err(LifError::OutOfBounds { .. })
        ));
    }
}
