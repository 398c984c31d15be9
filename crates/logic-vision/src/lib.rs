//! LogicVision — derive luminance and gradient logic tensors from images and remix them.

pub mod codec;
pub mod derive;
pub mod pipeline;
pub mod remix;
pub mod serializer;
pub mod types;

pub use codec::{decode, encode, DecodedImage};
pub use derive::{derive, sample_atom, LUMA_WEIGHTS};
pub use pipeline::{image_to_text, inspect, run, text_to_image, RunReport};
pub use remix::{reconstruct, remix, synthesize};
pub use serializer::DEFAULT_PRECISION;
pub use types::*;
