//! LIF: reader for layered-depth-image containers embedded in a JPEG byte stream.
//!
//! - A trailing big-endian field index (see [`format`]) carries typed binary blobs and one
//!   JSON metadata field.
//! - The metadata exists in three historical shapes; [`normalize`] turns any of them into one
//!   canonical [`View`] model with focal length in pixels and inverse-depth ranges in
//!   normalized units.
//! - [`camera`] and [`convergence`] hold the per-frame camera math a renderer applies to
//!   those views.
//!
//! Everything here is synchronous and free of global state. Image decoding, GPU work and
//! network fetches belong to the caller.

pub mod animation;
pub mod blob;
pub mod camera;
pub mod container;
pub mod convergence;
pub mod cursor;
pub mod decoder;
pub mod document;
pub mod error;
pub mod format;
pub mod metadata;
pub mod model;
pub mod normalize;

#[cfg(test)]
mod test_support;

pub use animation::Animation;
pub use blob::{resolve_blob, BlobResolver};
pub use camera::{CameraInput, Convergence, RenderCamera};
pub use container::{ContainerIndex, RawField};
pub use convergence::{ConvergencePlane, Frustum, FrustumCamera};
pub use cursor::ByteCursor;
pub use decoder::ImageDecoder;
pub use document::{read_file, LifDocument, LoadOptions};
pub use error::{LifError, LifResult};
pub use metadata::extract_metadata;
pub use model::{BlobRef, InvZMap, Layer, Rotation, Scene, StereoRenderData, View};
pub use normalize::{normalize, NormalizeContext};
