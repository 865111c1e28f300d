//! Camera animations stored alongside the views.
//!
//! Only the harmonic kind is understood: each axis of the virtual camera offset oscillates as
//! `bias + amplitude * sin(2π (phase + t / duration_sec))`.

use std::f32::consts::TAU;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HarmonicAxis {
    #[serde(default)]
    pub amplitude: f32,
    #[serde(default)]
    pub phase: f32,
    #[serde(default)]
    pub bias: f32,
}

impl HarmonicAxis {
    #[inline]
    pub fn at(&self, cycles: f32) -> f32 {
        self.bias + self.amplitude * (TAU * (self.phase + cycles)).sin()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HarmonicPosition {
    #[serde(default)]
    pub x: HarmonicAxis,
    #[serde(default)]
    pub y: HarmonicAxis,
    #[serde(default)]
    pub z: HarmonicAxis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Animation {
    pub name: Option<String>,
    pub duration_sec: f32,
    pub position: HarmonicPosition,
    /// Focus override for the duration of the animation.
    pub focus: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct AnimationDraft {
    #[serde(rename = "type")]
    kind: Option<String>,
    name: Option<String>,
    duration_sec: Option<f32>,
    data: Option<AnimationData>,
}

#[derive(Debug, Deserialize)]
struct AnimationData {
    #[serde(default)]
    position: HarmonicPosition,
    focus: Option<f32>,
}

impl Animation {
    /// Reads one entry of the metadata's animation list. Anything not understood is skipped.
    pub fn from_json(value: &Value) -> Option<Self> {
        let draft = match AnimationDraft::deserialize(value) {
            Ok(d) => d,
            Err(e) => {
                log::debug!("skipping unreadable animation: {e}");
                return None;
            }
        };

        if draft.kind.as_deref() != Some("harmonic") {
            log::debug!("skipping animation of type {:?}", draft.kind);
            return None;
        }

        let duration_sec = draft.duration_sec.filter(|d| d.is_finite() && *d > 0.0)?;
        let data = draft.data?;

        Some(Self {
            name: draft.name,
            duration_sec,
            position: data.position,
            focus: data.focus,
        })
    }

    /// Camera offset at `t` seconds; periodic in `duration_sec`.
    pub fn position_at(&self, t: f32) -> Vec3 {
        let cycles = t / self.duration_sec;
        Vec3::new(
            self.position.x.at(cycles),
            self.position.y.at(cycles),
            self.position.z.at(cycles),
        )
    }
}
