//! Wire-format constants of the LIF container.
//!
//! Trailer layout (big-endian, counted back from end-of-file):
//!   size-2 : u16  magic = 0x1E1A
//!   size-6 : u32  region offset (distance from end-of-file to the field table)
//!
//! Field table (starts at size - region offset):
//!   u32 field_count
//!   field_count x { u32 field_type, u32 field_size, [u8; field_size] payload }
//!
//! The container prefix is an ordinary JPEG, so the whole file doubles as the primary image.

/// Trailing marker identifying a LIF container.
pub const MAGIC: u16 = 0x1E1A;

/// Byte length of the trailing magic.
pub const MAGIC_LEN: u64 = 2;

/// Byte length of magic plus the region offset that precedes it.
pub const TRAILER_LEN: u64 = 6;

/// Field type holding UTF-8 JSON metadata (current writers).
pub const FIELD_METADATA_JSON: u32 = 8;

/// Field type holding UTF-8 JSON metadata (older writers).
pub const FIELD_METADATA_JSON_LEGACY: u32 = 7;

/// Blob id that refers to the primary image, i.e. the container file itself.
pub const PRIMARY_IMAGE_BLOB_ID: i64 = -1;
