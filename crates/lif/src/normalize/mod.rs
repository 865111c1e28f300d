//! Metadata normalization: any historical JSON shape in, canonical [`Scene`] out.
//!
//! 1. Canonicalize key spellings over the whole tree (a new tree, the input is untouched).
//! 2. Deserialize each view into a draft.
//! 3. Run the view corrections, then the layer corrections, in their fixed order.
//! 4. Finish the draft into a [`View`], failing on anything still missing.

mod corrections;
mod draft;
pub mod keys;

use serde::Deserialize;
use serde_json::Value;

pub use self::corrections::{LayerCorrection, ViewCorrection};
use self::draft::{prefix, StereoDraft, ViewDraft};
use crate::animation::Animation;
use crate::blob::BlobResolver;
use crate::decoder::ImageDecoder;
use crate::error::{LifError, LifResult};
use crate::model::{BlobRef, Scene, StereoRenderData, View};

/// What normalization may call out to. Both are only needed by the legacy correction.
#[derive(Clone, Copy, Default)]
pub struct NormalizeContext<'a> {
    pub blobs: Option<BlobResolver<'a>>,
    pub decoder: Option<&'a dyn ImageDecoder>,
}

impl NormalizeContext<'_> {
    pub(crate) fn primary_dimensions(&self, image: BlobRef) -> LifResult<(u32, u32)> {
        let Some(decoder) = self.decoder else {
            return Err(LifError::malformed(
                "view lacks width and no image decoder was supplied",
            ));
        };
        let Some(blobs) = self.blobs else {
            return Err(LifError::malformed(
                "view lacks width and its image cannot be resolved without the container",
            ));
        };
        let bytes = blobs.resolve(image)?;
        decoder
            .dimensions(&bytes)
            .map_err(LifError::image_decode)
    }
}

#[derive(Debug, Default, Deserialize)]
struct MetadataDraft {
    views: Option<Vec<Value>>,
    stereo_render_data: Option<StereoDraft>,
    #[serde(default)]
    animations: Vec<Value>,
}

/// Normalizes a parsed metadata tree into the canonical scene.
pub fn normalize(tree: &Value, ctx: &NormalizeContext<'_>) -> LifResult<Scene> {
    let tree = keys::canonicalize(tree);
    let meta = MetadataDraft::deserialize(&tree)?;

    let views = meta
        .views
        .ok_or_else(|| LifError::malformed("metadata has no views"))?;
    if views.is_empty() {
        return Err(LifError::malformed("metadata has an empty view list"));
    }

    let inherited_stereo = meta.stereo_render_data.and_then(StereoDraft::finish);

    let views = views
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            normalize_view(raw, ctx, inherited_stereo)
                .map_err(|e| prefix(e, &format!("view {i}")))
        })
        .collect::<LifResult<Vec<_>>>()?;

    let animations = meta
        .animations
        .iter()
        .filter_map(Animation::from_json)
        .collect();

    Ok(Scene { views, animations })
}

fn normalize_view(
    raw: &Value,
    ctx: &NormalizeContext<'_>,
    inherited_stereo: Option<StereoRenderData>,
) -> LifResult<View> {
    let mut view = ViewDraft::deserialize(raw)?;

    for correction in ViewCorrection::ORDER {
        if correction.applies(&view) {
            log::debug!("view correction: {correction}");
            correction.apply(&mut view, ctx)?;
        }
    }

    if let Some(mut layers) = view.layers.take() {
        for (i, layer) in layers.iter_mut().enumerate() {
            for correction in LayerCorrection::ORDER {
                if correction.applies(&view, layer) {
                    log::debug!("layer {i} correction: {correction}");
                    correction
                        .apply(&view, layer)
                        .map_err(|e| prefix(e, &format!("layer {i}")))?;
                }
            }
        }
        view.layers = Some(layers);
    }

    view.finish(inherited_stereo)
}
