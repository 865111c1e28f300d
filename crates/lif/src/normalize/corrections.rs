//! Ordered generation corrections.
//!
//! Each correction is a precondition (`applies`) and a transformation (`apply`) on a draft.
//! View corrections run first, in [`ViewCorrection::ORDER`]; then every layer goes through
//! [`LayerCorrection::ORDER`]. A current-generation file passes through none of them.

use std::fmt;

use super::draft::{LayerDraft, SharedLdi, ViewDraft};
use super::NormalizeContext;
use crate::error::{LifError, LifResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCorrection {
    /// Views written before explicit dimensions: width/height come from decoding the view
    /// image, focal length and pose from `camera_data`.
    LegacyCameraData,
    /// Width known but no focal length: derive it from `camera_data.focal_ratio_to_width`.
    DeriveFocal,
    /// View-level inverse depth written next to camera data (on the view, or on an
    /// outpainted layer) is still in raw disparity units: divide by `-focal_ratio_to_width`.
    RawViewDepth,
    /// First LDI generation: the layer list lives in `layered_depth_image_data` and shares one
    /// `camera_data` and one outpainting margin.
    HoistSharedLdi,
}

impl ViewCorrection {
    /// `RawViewDepth` must run before `HoistSharedLdi` moves the view's camera data away.
    pub const ORDER: [ViewCorrection; 4] = [
        ViewCorrection::LegacyCameraData,
        ViewCorrection::DeriveFocal,
        ViewCorrection::RawViewDepth,
        ViewCorrection::HoistSharedLdi,
    ];

    pub(crate) fn applies(self, view: &ViewDraft) -> bool {
        match self {
            Self::LegacyCameraData => view.width.is_none(),
            Self::DeriveFocal => {
                view.f.is_none()
                    && view.width.is_some()
                    && view.camera_data.is_some_and(|c| c.focal_ratio_to_width.is_some())
            }
            Self::RawViewDepth => view.inv_z_map.is_some() && view.depth_camera_data().is_some(),
            Self::HoistSharedLdi => view.layers.is_none() && view.layered_depth_image_data.is_some(),
        }
    }

    pub(crate) fn apply(self, view: &mut ViewDraft, ctx: &NormalizeContext<'_>) -> LifResult<()> {
        match self {
            Self::LegacyCameraData => {
                let camera = view
                    .camera_data
                    .ok_or_else(|| LifError::malformed("view has neither width nor camera_data"))?;
                let ratio = camera.focal_ratio()?;

                let (width, height) = ctx.primary_dimensions(view.image_ref()?)?;
                let width = width as f64;
                view.width = Some(width);
                view.height = Some(height as f64);
                view.f = Some(ratio * width);
                view.position = camera.position.or(view.position);
                view.sk = camera.sk.or(view.sk);
                view.rotation = camera.rotation.or(view.rotation);
            }
            Self::DeriveFocal => {
                let ratio = view
                    .camera_data
                    .ok_or_else(|| LifError::malformed("missing camera_data"))?
                    .focal_ratio()?;
                view.f = Some(ratio * view.require_width()?);
            }
            Self::RawViewDepth => {
                let ratio = view
                    .depth_camera_data()
                    .ok_or_else(|| LifError::malformed("missing camera_data"))?
                    .focal_ratio()?;
                if let Some(inv_z) = view.inv_z_map.as_mut() {
                    inv_z.rescale(-ratio);
                }
            }
            Self::HoistSharedLdi => {
                let ldi = view.layered_depth_image_data.take().unwrap_or_default();
                let layers = ldi.layers.ok_or_else(|| {
                    LifError::malformed("layered_depth_image_data has no layer list")
                })?;

                view.layers = Some(layers);
                view.shared = Some(SharedLdi {
                    camera_data: view.camera_data.take(),
                    outpaint_width: ldi.outpainting_added_width_px.unwrap_or(0.0),
                    outpaint_height: ldi.outpainting_added_height_px.unwrap_or(0.0),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerCorrection {
    /// Attach the hoisted shared camera data and outpainting, and undo the outpainting
    /// padding ratio baked into the layer's inverse-depth range.
    InheritSharedLdi,
    /// Layer carries its own outpainting margin and `camera_data`: derive its extent from
    /// the view and bring its inverse-depth range into normalized units.
    OwnOutpaint,
}

impl LayerCorrection {
    /// Shared-LDI inheritance must come first: it attaches the fields `OwnOutpaint` detects.
    pub const ORDER: [LayerCorrection; 2] =
        [LayerCorrection::InheritSharedLdi, LayerCorrection::OwnOutpaint];

    pub(crate) fn applies(self, view: &ViewDraft, layer: &LayerDraft) -> bool {
        match self {
            Self::InheritSharedLdi => view.shared.is_some(),
            Self::OwnOutpaint => layer.outpainting_added_width_px.is_some(),
        }
    }

    pub(crate) fn apply(self, view: &ViewDraft, layer: &mut LayerDraft) -> LifResult<()> {
        match self {
            Self::InheritSharedLdi => {
                let shared = view.shared.unwrap_or_default();
                let view_width = view.require_width()?;

                layer.camera_data = shared.camera_data;
                layer.outpainting_added_width_px = Some(shared.outpaint_width);
                layer.outpainting_added_height_px = Some(shared.outpaint_height);

                if let Some(inv_z) = layer.inv_z_map.as_mut() {
                    inv_z.rescale(1.0 + shared.outpaint_width / view_width);
                }
            }
            Self::OwnOutpaint => {
                let outpaint_width = layer.outpainting_added_width_px.take().unwrap_or(0.0);
                let outpaint_height = layer.outpainting_added_height_px.take().unwrap_or(0.0);
                let ratio = layer
                    .camera_data
                    .take()
                    .ok_or_else(|| LifError::malformed("outpainted layer lacks camera_data"))?
                    .focal_ratio()?;

                layer.width = Some(view.require_width()? + outpaint_width);
                layer.height = Some(view.require_height()? + outpaint_height);
                layer.f = Some(view.require_focal()?);

                if let Some(inv_z) = layer.inv_z_map.as_mut() {
                    inv_z.rescale(-ratio);
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for ViewCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ViewCorrection::LegacyCameraData => "legacy_camera_data",
            ViewCorrection::DeriveFocal => "derive_focal",
            ViewCorrection::RawViewDepth => "raw_view_depth",
            ViewCorrection::HoistSharedLdi => "hoist_shared_ldi",
        };

        f.write_str(s)
    }
}

impl fmt::Display for LayerCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LayerCorrection::InheritSharedLdi => "inherit_shared_ldi",
            LayerCorrection::OwnOutpaint => "own_outpaint",
        };

        f.write_str(s)
    }
}
