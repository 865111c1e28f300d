//! Per-frame virtual camera for rendering a normalized view.
//!
//! The four formulas below are what renderers rely on every frame. They never fail: the focal
//! length clamps at zero, and `skew` is left unbounded at its pole (`pos.z == 1 / invd`), which
//! callers keep the camera away from.

use glam::{Vec2, Vec3};
use serde::Serialize;

use crate::model::View;

/// Scale from the layer's resolution to the output viewport, fitting the shorter side.
#[inline]
pub fn viewport_scale(inner_res: Vec2, outer_res: Vec2) -> f32 {
    outer_res.min_element() / inner_res.min_element()
}

/// Inverse depth at which skew vanishes. `focus` 0 is the back-most geometry, 1 the nearest.
#[inline]
pub fn convergence_factor(focus: f32, inv_z_min: f32) -> f32 {
    focus * inv_z_min
}

/// Frustum skew that keeps the convergence plane fixed while the camera moves to `pos`.
#[inline]
pub fn skew(pos: Vec3, invd: f32) -> Vec2 {
    let denom = 1.0 - pos.z * invd;
    Vec2::new(-pos.x * invd / denom, -pos.y * invd / denom)
}

/// Focal length for a camera dollied to `pos_z`; never negative.
#[inline]
pub fn render_focal_px(base_focal_px: f32, scale: f32, pos_z: f32, invd: f32) -> f32 {
    base_focal_px * scale * (1.0 - pos_z * invd).max(0.0)
}

/// Where the zero-skew plane comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Convergence {
    /// Fraction of the front layer's inverse-depth range.
    Focus(f32),
    /// The view's stored stereo convergence; falls back to the given focus when absent.
    Stereo { fallback_focus: f32 },
}

impl Convergence {
    /// Resolves to an inverse depth (`invd`) for `view`.
    pub fn invd(&self, view: &View) -> f32 {
        let inv_z_min = view.inv_z_min().unwrap_or(0.0);
        match *self {
            Convergence::Focus(focus) => convergence_factor(focus, inv_z_min),
            Convergence::Stereo { fallback_focus } => view
                .stereo_render_data
                .map(|s| s.inv_convergence_distance)
                .unwrap_or_else(|| convergence_factor(fallback_focus, inv_z_min)),
        }
    }
}

/// Live input for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraInput {
    /// Virtual camera displacement from the captured viewpoint (scene units).
    pub offset: Vec3,
    /// Additional roll on top of the view's own roll.
    pub roll_degrees: f32,
    pub convergence: Convergence,
    /// Output resolution in pixels.
    pub viewport: Vec2,
}

impl Default for CameraInput {
    fn default() -> Self {
        Self {
            offset: Vec3::ZERO,
            roll_degrees: 0.0,
            convergence: Convergence::Focus(0.0),
            viewport: Vec2::ZERO,
        }
    }
}

/// Renderer-facing camera state, recomputed every frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderCamera {
    pub pos: Vec3,
    pub skew: Vec2,
    /// Radians.
    pub roll: f32,
    pub focal_px: f32,
}

impl RenderCamera {
    pub fn for_view(view: &View, input: &CameraInput) -> Self {
        let inner = Vec2::new(view.width_px as f32, view.height_px as f32);
        // A zero viewport means "render at the view's own resolution".
        let scale = if input.viewport.min_element() > 0.0 {
            viewport_scale(inner, input.viewport)
        } else {
            1.0
        };
        let invd = input.convergence.invd(view);
        let pos = input.offset;

        Self {
            pos,
            skew: skew(pos, invd),
            roll: (view.rotation.roll_degrees + input.roll_degrees).to_radians(),
            focal_px: render_focal_px(view.focal_px, scale, pos.z, invd),
        }
    }

    pub fn to_uniform(&self) -> RenderCameraUniformStd140 {
        RenderCameraUniformStd140 {
            pos: self.pos.to_array(),
            roll: self.roll,
            skew: self.skew.to_array(),
            focal_px: self.focal_px,
            _pad0: 0.0,
        }
    }
}

/// GPU uniform layout of [`RenderCamera`], std140 compatible.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RenderCameraUniformStd140 {
    pub pos: [f32; 3],
    pub roll: f32,
    pub skew: [f32; 2],
    pub focal_px: f32,
    pub _pad0: f32,
}
