use bytes::Bytes;

use crate::error::{LifError, LifResult};

/// Big-endian reader over a shared byte buffer.
///
/// The offset is freely settable because the container is decoded by seeking backward from
/// end-of-file before any forward read. Slices returned by [`ByteCursor::read_bytes`] share the
/// underlying allocation.
#[derive(Debug, Clone)]
pub struct ByteCursor {
    buf: Bytes,
    offset: u64,
}

impl ByteCursor {
    pub fn new(buf: impl Into<Bytes>) -> Self {
        Self {
            buf: buf.into(),
            offset: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.buf.len() as u64
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Moves the read position. Positions past the end are accepted; the next read fails.
    #[inline]
    pub fn set_offset(&mut self, offset: u64) {
        self.offset = offset;
    }

    #[inline(always)]
    fn need(&self, want: u64) -> LifResult<usize> {
        match self.offset.checked_add(want) {
            Some(end) if end <= self.len() => Ok(self.offset as usize),
            _ => Err(LifError::OutOfBounds {
                offset: self.offset,
                wanted: want,
                len: self.len(),
            }),
        }
    }

    #[inline(always)]
    fn take<const N: usize>(&mut self) -> LifResult<[u8; N]> {
        let start = self.need(N as u64)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[start..start + N]);
        self.offset += N as u64;
        Ok(out)
    }

    #[inline]
    pub fn read_u16(&mut self) -> LifResult<u16> {
        Ok(u16::from_be_bytes(self.take()?))
    }

    #[inline]
    pub fn read_u32(&mut self) -> LifResult<u32> {
        Ok(u32::from_be_bytes(self.take()?))
    }

    /// Returns the next `n` bytes as a slice of the shared buffer.
    pub fn read_bytes(&mut self, n: u64) -> LifResult<Bytes> {
        let start = self.need(n)?;
        let out = self.buf.slice(start..start + n as usize);
        self.offset += n;
        Ok(out)
    }
}
