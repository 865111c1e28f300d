//! Typed, still generation-specific drafts deserialized from the canonicalized tree.
//!
//! Every field is optional: which ones are present is exactly what the corrections inspect.
//! `finish` turns a corrected draft into the canonical model and fails if anything required is
//! still missing.

use glam::{Vec2, Vec3};
use serde::Deserialize;

use crate::error::{LifError, LifResult};
use crate::model::{BlobRef, InvZMap, Layer, Rotation, StereoRenderData, View};

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub(crate) struct Xy {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub(crate) struct Xyz {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub(crate) struct RotationDraft {
    pub sl: Option<Xy>,
    pub roll_degrees: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub(crate) struct BlobDraft {
    pub blob_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub(crate) struct InvZDraft {
    pub blob_id: Option<i64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl InvZDraft {
    /// Divides both ends of the range by `divisor`.
    pub fn rescale(&mut self, divisor: f64) {
        self.min = self.min.map(|v| v / divisor);
        self.max = self.max.map(|v| v / divisor);
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub(crate) struct CameraData {
    pub focal_ratio_to_width: Option<f64>,
    pub position: Option<Xyz>,
    pub sk: Option<Xy>,
    pub rotation: Option<RotationDraft>,
}

impl CameraData {
    /// Focal ratio usable as a divisor.
    pub fn focal_ratio(&self) -> LifResult<f64> {
        match self.focal_ratio_to_width {
            Some(r) if r.is_finite() && r != 0.0 => Ok(r),
            Some(r) => Err(LifError::malformed(format!(
                "camera_data.focal_ratio_to_width is {r}"
            ))),
            None => Err(LifError::malformed(
                "camera_data lacks focal_ratio_to_width",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub(crate) struct StereoDraft {
    pub inv_convergence_distance: Option<f64>,
}

impl StereoDraft {
    pub fn finish(self) -> Option<StereoRenderData> {
        self.inv_convergence_distance
            .map(|d| StereoRenderData {
                inv_convergence_distance: d as f32,
            })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct LayerDraft {
    pub image: Option<BlobDraft>,
    pub inv_z_map: Option<InvZDraft>,
    pub mask: Option<BlobDraft>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub f: Option<f64>,
    pub camera_data: Option<CameraData>,
    pub outpainting_added_width_px: Option<f64>,
    pub outpainting_added_height_px: Option<f64>,
}

/// Layer list plus outpainting shared by all layers in the first LDI generation.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct LdiDraft {
    pub layers: Option<Vec<LayerDraft>>,
    pub outpainting_added_width_px: Option<f64>,
    pub outpainting_added_height_px: Option<f64>,
}

/// What the shared-LDI hoist leaves behind for each layer to pick up.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SharedLdi {
    pub camera_data: Option<CameraData>,
    pub outpaint_width: f64,
    pub outpaint_height: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ViewDraft {
    pub image: Option<BlobDraft>,
    pub inv_z_map: Option<InvZDraft>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub f: Option<f64>,
    pub position: Option<Xyz>,
    pub rotation: Option<RotationDraft>,
    pub sk: Option<Xy>,
    pub layers: Option<Vec<LayerDraft>>,
    pub layered_depth_image_data: Option<LdiDraft>,
    pub camera_data: Option<CameraData>,
    pub stereo_render_data: Option<StereoDraft>,

    #[serde(skip)]
    pub shared: Option<SharedLdi>,
}

impl ViewDraft {
    pub fn require_width(&self) -> LifResult<f64> {
        positive(self.width, "view width")
    }

    pub fn require_height(&self) -> LifResult<f64> {
        positive(self.height, "view height")
    }

    pub fn require_focal(&self) -> LifResult<f64> {
        positive(self.f, "view focal length")
    }

    /// Camera data the view-level inverse depth was written against, if any.
    pub fn depth_camera_data(&self) -> Option<CameraData> {
        self.camera_data.or_else(|| {
            self.layers
                .iter()
                .flatten()
                .find(|l| l.outpainting_added_width_px.is_some())
                .and_then(|l| l.camera_data)
        })
    }

    pub fn image_ref(&self) -> LifResult<BlobRef> {
        blob(self.image, "view image")
    }

    pub fn finish(self, inherited_stereo: Option<StereoRenderData>) -> LifResult<View> {
        let width = self.require_width()?;
        let height = self.require_height()?;
        let focal = self.require_focal()?;
        let image = self.image_ref()?;

        let inv_z_map = self
            .inv_z_map
            .map(|m| inv_z(m, "view inv_z_map"))
            .transpose()?;

        let layers = self
            .layers
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, l)| {
                l.finish(width, height, focal)
                    .map_err(|e| prefix(e, &format!("layer {i}")))
            })
            .collect::<LifResult<Vec<_>>>()?;

        if layers.is_empty() && inv_z_map.is_none() {
            return Err(LifError::malformed("view has neither layers nor inv_z_map"));
        }

        let rotation = self.rotation.unwrap_or_default();

        Ok(View {
            image,
            inv_z_map,
            width_px: width.round() as u32,
            height_px: height.round() as u32,
            focal_px: focal as f32,
            position: self.position.map_or(Vec3::ZERO, vec3),
            rotation: Rotation {
                slant: rotation.sl.map_or(Vec2::ZERO, vec2),
                roll_degrees: rotation.roll_degrees.unwrap_or(0.0) as f32,
            },
            frustum_skew: self.sk.map_or(Vec2::ZERO, vec2),
            layers,
            stereo_render_data: self
                .stereo_render_data
                .and_then(StereoDraft::finish)
                .or(inherited_stereo),
        })
    }
}

impl LayerDraft {
    fn finish(self, view_width: f64, view_height: f64, view_focal: f64) -> LifResult<Layer> {
        let image = blob(self.image, "image")?;
        let inv_z_map = inv_z(
            self.inv_z_map.ok_or_else(|| LifError::malformed("missing inv_z_map"))?,
            "inv_z_map",
        )?;

        let width = positive(self.width.or(Some(view_width)), "width")?;
        let height = positive(self.height.or(Some(view_height)), "height")?;
        let focal = positive(self.f.or(Some(view_focal)), "focal length")?;

        let margin = |extent: f64, base: f64| {
            let added = (extent - base).round();
            (added > 0.0).then_some(added as u32)
        };

        Ok(Layer {
            image,
            inv_z_map,
            mask: self.mask.map(|m| blob(Some(m), "mask")).transpose()?,
            width_px: width.round() as u32,
            height_px: height.round() as u32,
            focal_px: focal as f32,
            outpaint_added_width_px: margin(width, view_width),
            outpaint_added_height_px: margin(height, view_height),
        })
    }
}

fn positive(value: Option<f64>, what: &str) -> LifResult<f64> {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => Ok(v),
        Some(v) => Err(LifError::malformed(format!("{what} is {v}"))),
        None => Err(LifError::malformed(format!("missing {what}"))),
    }
}

fn blob(draft: Option<BlobDraft>, what: &str) -> LifResult<BlobRef> {
    draft
        .and_then(|b| b.blob_id)
        .map(|blob_id| BlobRef { blob_id })
        .ok_or_else(|| LifError::malformed(format!("missing {what} blob_id")))
}

fn inv_z(draft: InvZDraft, what: &str) -> LifResult<InvZMap> {
    let blob = draft
        .blob_id
        .map(|blob_id| BlobRef { blob_id })
        .ok_or_else(|| LifError::malformed(format!("missing {what} blob_id")))?;
    let (Some(min), Some(max)) = (draft.min, draft.max) else {
        return Err(LifError::malformed(format!("{what} lacks min/max")));
    };
    if !min.is_finite() || !max.is_finite() {
        return Err(LifError::malformed(format!("{what} range is not finite")));
    }
    Ok(InvZMap {
        blob,
        min: min as f32,
        max: max as f32,
    })
}

pub(crate) fn prefix(err: LifError, context: &str) -> LifError {
    match err {
        LifError::MalformedMetadata(msg) => LifError::malformed(format!("{context}: {msg}")),
        other => other,
    }
}

#[inline]
fn vec2(v: Xy) -> Vec2 {
    Vec2::new(v.x as f32, v.y as f32)
}

#[inline]
fn vec3(v: Xyz) -> Vec3 {
    Vec3::new(v.x as f32, v.y as f32, v.z as f32)
}
