//! Canonical, generation-independent scene description handed to renderers.

use glam::{Vec2, Vec3};
use serde::Serialize;

use crate::animation::Animation;
use crate::format::PRIMARY_IMAGE_BLOB_ID;

/// Reference to binary payload inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BlobRef {
    pub blob_id: i64,
}

impl BlobRef {
    pub const PRIMARY: BlobRef = BlobRef {
        blob_id: PRIMARY_IMAGE_BLOB_ID,
    };

    #[inline]
    pub fn is_primary(&self) -> bool {
        self.blob_id == PRIMARY_IMAGE_BLOB_ID
    }
}

/// Inverse-depth image plus its normalization range.
///
/// `min`/`max` are always in normalized units: divided by `-focal_ratio_to_width` and corrected
/// for outpainting, whatever generation the file came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InvZMap {
    pub blob: BlobRef,
    pub min: f32,
    pub max: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rotation {
    pub slant: Vec2,
    pub roll_degrees: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StereoRenderData {
    pub inv_convergence_distance: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub image: BlobRef,
    pub inv_z_map: InvZMap,
    pub mask: Option<BlobRef>,
    pub width_px: u32,
    pub height_px: u32,
    pub focal_px: f32,
    /// Margin added beyond the view's extent, when the layer is wider than its view.
    pub outpaint_added_width_px: Option<u32>,
    pub outpaint_added_height_px: Option<u32>,
}

/// One eye/viewpoint of the scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub image: BlobRef,
    /// View-level inverse depth, present on single-layer and older files.
    pub inv_z_map: Option<InvZMap>,
    pub width_px: u32,
    pub height_px: u32,
    /// Focal length in pixels, always resolved.
    pub focal_px: f32,
    pub position: Vec3,
    pub rotation: Rotation,
    pub frustum_skew: Vec2,
    /// Front-most layer first.
    pub layers: Vec<Layer>,
    pub stereo_render_data: Option<StereoRenderData>,
}

impl View {
    /// Nearest-geometry inverse depth, taken from the front layer or the view's own map.
    pub fn inv_z_min(&self) -> Option<f32> {
        self.layers
            .first()
            .map(|l| l.inv_z_map.min)
            .or_else(|| self.inv_z_map.map(|m| m.min))
    }

    /// Every blob the view references, view-level first then per layer.
    pub fn blob_refs(&self) -> Vec<BlobRef> {
        let mut out = vec![self.image];
        out.extend(self.inv_z_map.map(|m| m.blob));
        for layer in &self.layers {
            out.push(layer.image);
            out.push(layer.inv_z_map.blob);
            out.extend(layer.mask);
        }
        out
    }
}

/// Normalized content of a container's metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub views: Vec<View>,
    pub animations: Vec<Animation>,
}
