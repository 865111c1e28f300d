use std::io::Cursor;

use lif::ImageDecoder;

/// Reads image dimensions from the header only, via the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderProbe;

impl ImageDecoder for HeaderProbe {
    fn dimensions(&self, bytes: &[u8]) -> Result<(u32, u32), String> {
        image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| e.to_string())?
            .into_dimensions()
            .map_err(|e| e.to_string())
    }
}
