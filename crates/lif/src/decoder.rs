/// External image decoding capability.
///
/// The core never inspects pixels; it only needs dimensions for views written before the
/// metadata carried them. Implementations live with the caller (the CLI uses the `image` crate).
pub trait ImageDecoder: Send + Sync {
    /// Returns `(width, height)` of the encoded image.
    fn dimensions(&self, bytes: &[u8]) -> Result<(u32, u32), String>;
}

impl<F> ImageDecoder for F
where
    F: Fn(&[u8]) -> Result<(u32, u32), String> + Send + Sync,
{
    fn dimensions(&self, bytes: &[u8]) -> Result<(u32, u32), String> {
        self(bytes)
    }
}
