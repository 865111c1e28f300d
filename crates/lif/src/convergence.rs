//! Plane on which two asymmetric frustums (a stereo pair) have the same projected extent.
//!
//! Cameras look down their local -Z with +Y up. A frustum is four tangents measured from the
//! forward axis; at distance `d` ahead of a camera at `(x, y)` its window spans
//! `x - l*d ..= x + r*d` horizontally and `y - down*d ..= y + up*d` vertically.
//!
//! The pair is solved in camera 0's frame, so both cameras are expected to share one
//! orientation. A mismatch is logged and camera 0's orientation is used.

use glam::{Mat3, Quat, Vec3};
use serde::Serialize;

use crate::model::View;

/// Below this, the frustum centre lines are treated as parallel.
pub const PARALLEL_EPSILON: f32 = 1e-6;

/// Distance of the fallback plane ahead of camera 0, in scene units.
pub const FALLBACK_PLANE_DISTANCE: f32 = 1.0;

const ORIENTATION_TOLERANCE: f32 = 1e-4;

/// Tangents of the four half-angles, all positive for a frustum containing its forward axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Frustum {
    pub up: f32,
    pub down: f32,
    pub left: f32,
    pub right: f32,
}

impl Frustum {
    pub fn symmetric(tan_half_h: f32, tan_half_v: f32) -> Self {
        Self {
            up: tan_half_v,
            down: tan_half_v,
            left: tan_half_h,
            right: tan_half_h,
        }
    }

    /// Frustum of a view: image half-extent over focal length, shifted by the view's skew.
    pub fn from_view(view: &View) -> Self {
        let half_w = view.width_px as f32 * 0.5 / view.focal_px;
        let half_h = view.height_px as f32 * 0.5 / view.focal_px;
        let sk = view.frustum_skew;
        Self {
            up: half_h + sk.y,
            down: half_h - sk.y,
            left: half_w - sk.x,
            right: half_w + sk.x,
        }
    }

    /// Offset of the window centre per unit of distance.
    #[inline]
    fn center_slope_x(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    fn center_slope_y(&self) -> f32 {
        self.up - self.down
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrustumCamera {
    pub position: Vec3,
    pub orientation: Quat,
    pub frustum: Frustum,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConvergencePlane {
    pub position: Vec3,
    pub orientation: Quat,
    pub width: f32,
    pub height: f32,
    /// The fixed-distance approximation was used instead of a solved plane.
    pub degenerate: bool,
}

/// Solves the convergence plane of a camera pair.
///
/// Falls back to a plane centred on camera 0's forward axis, [`FALLBACK_PLANE_DISTANCE`]
/// ahead of it and sized from its frustum, when the horizontal centre lines are (near)
/// parallel, when the solved depth is not in front of both cameras (a mirrored, diverging
/// pair), or when anything non-finite comes out of the solve.
pub fn solve(cam0: &FrustumCamera, cam1: &FrustumCamera) -> ConvergencePlane {
    let orientation = cam0.orientation.normalize();
    if cam0.orientation.dot(cam1.orientation).abs() < 1.0 - ORIENTATION_TOLERANCE {
        log::warn!(
            "convergence: camera orientations differ ({:?} vs {:?}); using camera 0",
            cam0.orientation,
            cam1.orientation
        );
    }

    // 1. Positions in the shared camera frame.
    let to_local = orientation.inverse();
    let p0 = to_local * cam0.position;
    let p1 = to_local * cam1.position;
    let (f0, f1) = (cam0.frustum, cam1.frustum);

    let plane_orientation = remove_roll(orientation);
    let fallback = || {
        log::warn!("convergence: degenerate frustum pair, using fixed-distance plane");
        fallback_plane(cam0, plane_orientation)
    };

    // 2. Degenerate configurations.
    // Equal centre slopes, centred pairs included, never meet.
    let denom_x = f1.center_slope_x() - f0.center_slope_x();
    if denom_x.abs() < PARALLEL_EPSILON {
        return fallback();
    }

    // 3. Depth where the window centres coincide, then the shared centre.
    let zd = (2.0 * (p1.x - p0.x) + p1.z * f1.center_slope_x() - p0.z * f0.center_slope_x())
        / denom_x;
    if zd >= p0.z || zd >= p1.z {
        return fallback();
    }

    let xd = p0.x - f0.center_slope_x() * (zd - p0.z) * 0.5;
    let yd = p0.y - f0.center_slope_y() * (zd - p0.z) * 0.5;
    let width = ((p0.z - zd) * (f0.left + f0.right)).abs();
    let height = ((p0.z - zd) * (f0.up + f0.down)).abs();

    let position = orientation * Vec3::new(xd, yd, zd);
    if !position.is_finite() || !width.is_finite() || !height.is_finite() {
        return fallback();
    }

    ConvergencePlane {
        position,
        orientation: plane_orientation,
        width,
        height,
        degenerate: false,
    }
}

fn fallback_plane(cam0: &FrustumCamera, orientation: Quat) -> ConvergencePlane {
    let f = cam0.frustum;
    let d = FALLBACK_PLANE_DISTANCE;

    ConvergencePlane {
        position: cam0.position + cam0.orientation.normalize() * Vec3::new(0.0, 0.0, -d),
        orientation,
        width: (f.left + f.right) * d,
        height: (f.up + f.down) * d,
        degenerate: true,
    }
}

/// Same forward direction, but with the up vector as close to world +Y as possible.
pub fn remove_roll(orientation: Quat) -> Quat {
    let forward = orientation * Vec3::NEG_Z;
    let right = forward.cross(Vec3::Y);
    // Looking straight up or down: roll is undefined, keep the input.
    if right.length_squared() < 1e-8 {
        return orientation;
    }
    let right = right.normalize();
    let up = right.cross(forward);

    Quat::from_mat3(&Mat3::from_cols(right, up, -forward)).normalize()
}
