use std::path::Path;

use bytes::Bytes;

use crate::blob::BlobResolver;
use crate::container::ContainerIndex;
use crate::decoder::ImageDecoder;
use crate::error::LifResult;
use crate::metadata::extract_metadata;
use crate::model::{BlobRef, Scene};
use crate::normalize::{normalize, NormalizeContext};

#[derive(Clone, Copy, Default)]
pub struct LoadOptions<'a> {
    /// Needed only for files whose views predate explicit dimensions.
    pub decoder: Option<&'a dyn ImageDecoder>,
}

/// A loaded container: its normalized scene plus what is needed to resolve blobs lazily.
#[derive(Debug, Clone)]
pub struct LifDocument {
    pub index: ContainerIndex,
    /// The whole file, which is also the primary JPEG.
    pub primary: Bytes,
    pub scene: Scene,
}

impl LifDocument {
    /// Index → metadata → normalization, failing on the first violated invariant.
    pub fn from_bytes(bytes: impl Into<Bytes>, options: &LoadOptions<'_>) -> LifResult<Self> {
        let primary: Bytes = bytes.into();
        let index = ContainerIndex::parse(primary.clone())?;
        let tree = extract_metadata(&index)?;

        let ctx = NormalizeContext {
            blobs: Some(BlobResolver::new(&index, &primary)),
            decoder: options.decoder,
        };
        let scene = normalize(&tree, &ctx)?;

        log::debug!(
            "LIF loaded: {} bytes, {} view(s), {} animation(s)",
            primary.len(),
            scene.views.len(),
            scene.animations.len()
        );

        Ok(Self {
            index,
            primary,
            scene,
        })
    }

    #[inline]
    pub fn resolver(&self) -> BlobResolver<'_> {
        BlobResolver::new(&self.index, &self.primary)
    }

    /// Payload of a blob; the primary-image sentinel yields the whole file.
    pub fn blob(&self, blob: BlobRef) -> LifResult<Bytes> {
        self.resolver().resolve(blob)
    }

    /// Resolves every blob referenced by every view, so dangling references surface early.
    pub fn check_blobs(&self) -> LifResult<()> {
        for view in &self.scene.views {
            for blob in view.blob_refs() {
                self.blob(blob)?;
            }
        }
        Ok(())
    }
}

/// Fast path: prefer mmap; fall back to a single read.
#[cfg(feature = "mmap")]
pub fn read_file<P: AsRef<Path>>(path: P, options: &LoadOptions<'_>) -> LifResult<LifDocument> {
    let file = std::fs::File::open(path)?;
    // Safety: the mapping is read-only and owned by the returned buffer.
    let map = unsafe { memmap2::MmapOptions::new().map(&file)? };
    LifDocument::from_bytes(Bytes::from_owner(map), options)
}

#[cfg(not(feature = "mmap"))]
pub fn read_file<P: AsRef<Path>>(path: P, options: &LoadOptions<'_>) -> LifResult<LifDocument> {
    let bytes = std::fs::read(path)?;
    LifDocument::from_bytes(bytes, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LifError;
    use crate::test_support::{approx, build_container, container_with_json};
    use serde_json::json;

    #[test]
    fn loads_and_resolves() {
        let meta = json!({"views": [{
            "image": {"blob_id": -1},
            "width_px": 64, "height_px": 32, "focal_px": 50.0,
            "layers_top_to_bottom": [{
                "image": {"blob_id": 10},
                "inv_z_map": {"blob_id": 11, "min": 0.1, "max": 0.9}
            }]
        }]});
        let bytes = container_with_json(&meta, &[(10, b"rgb"), (11, b"depth")]);
        let doc = LifDocument::from_bytes(bytes.clone(), &LoadOptions::default()).unwrap();

        assert_eq!(doc.scene.views.len(), 1);
        assert_eq!(&doc.blob(BlobRef::PRIMARY).unwrap()[..], &bytes[..]);
        let layer = &doc.scene.views[0].layers[0];
        assert_eq!(&doc.blob(layer.inv_z_map.blob).unwrap()[..], b"depth");
        doc.check_blobs().unwrap();
    }

    #[test]
    fn dangling_blob_is_reported_by_check() {
        let meta = json!({"views": [{
            "image": {"blob_id": -1},
            "width": 64, "height": 32, "f": 50.0,
            "inv_z_map": {"blob_id": 42, "min": 0.1, "max": 0.9}
        }]});
        let doc =
            LifDocument::from_bytes(container_with_json(&meta, &[]), &LoadOptions::default()).unwrap();
        assert!(matches!(doc.check_blobs(), Err(LifError::UnresolvedBlob(42))));
    }

    #[test]
    fn legacy_view_uses_decoder() {
        let meta = json!({"views": [{
            "image": {"blob_id": -1},
            "camera_data": {
                "focal_ratio_to_width": 0.8,
                "position": {"x": 0.1, "y": 0.0, "z": 0.0},
                "frustum_skew": {"x": 0.05, "y": 0.0},
                "rotation": {"rotation_slant": {"x": 0.0, "y": 0.0}, "roll_degrees": 2.0}
            },
            "disparity": {"blob_id": 9, "min_disparity": -0.08, "max_disparity": -0.4}
        }]});
        let bytes = container_with_json(&meta, &[(9, b"depth")]);
        let decoder = |bytes: &[u8]| -> Result<(u32, u32), String> {
            assert!(bytes.starts_with(b"\xFF\xD8"));
            Ok((400, 300))
        };
        let options = LoadOptions {
            decoder: Some(&decoder),
        };
        let doc = LifDocument::from_bytes(bytes, &options).unwrap();
        let view = &doc.scene.views[0];

        assert_eq!((view.width_px, view.height_px), (400, 300));
        assert!(approx(view.focal_px, 320.0));
        assert!(approx(view.position.x, 0.1));
        assert!(approx(view.frustum_skew.x, 0.05));
        assert!(approx(view.rotation.roll_degrees, 2.0));
        let inv_z = view.inv_z_map.unwrap();
        assert!(approx(inv_z.min, 0.1));
        assert!(approx(inv_z.max, 0.5));
    }

    #[test]
    fn decoder_failure_is_image_decode() {
        let meta = json!({"views": [{
            "image": {"blob_id": -1},
            "camera_data": {"focal_ratio_to_width": 0.8},
            "inv_z_map": {"blob_id": 9, "min": -0.08, "max": -0.4}
        }]});
        let decoder = |_: &[u8]| -> Result<(u32, u32), String> { Err("truncated".into()) };
        let options = LoadOptions {
            decoder: Some(&decoder),
        };
        assert!(matches!(
            LifDocument::from_bytes(container_with_json(&meta, &[]), &options),
            Err(LifError::ImageDecode(_))
        ));
    }

    #[test]
    fn missing_metadata_field() {
        let bytes = build_container(b"\xFF\xD8", &[(9, b"x")]);
        assert!(matches!(
            LifDocument::from_bytes(bytes, &LoadOptions::default()),
            Err(LifError::MissingMetadata)
        ));
    }

    #[test]
    fn read_file_reports_io_errors() {
        let missing = std::env::temp_dir().join("lif-does-not-exist.jpg");
        assert!(matches!(
            read_file(&missing, &LoadOptions::default()),
            Err(LifError::Io(_))
        ));
    }
}
