//! End-to-end operations: decode, derive, synthesize, encode.

use std::path::Path;
use std::time::{Duration, Instant};

use crate::codec::{decode, encode};
use crate::derive::{derive, sample_atom};
use crate::remix::synthesize;
use crate::serializer;
use crate::types::{SmartAtom, SynthesisMode, VisionResult};

/// Summary of a completed [`run`].
#[derive(Debug, Clone)]
pub struct RunReport {
    pub height: usize,
    pub width: usize,
    pub mode: SynthesisMode,
    pub elapsed: Duration,
}

/// Load `input`, derive its logic tensor, synthesize with `mode` and write `output`.
pub fn run(input: &Path, output: &Path, mode: SynthesisMode) -> VisionResult<RunReport> {
    let start = Instant::now();

    tracing::info!("[1/4] Ingesting {}", input.display());
    let decoded = decode(input)?;
    let (height, width, _) = decoded.shape;

    tracing::info!("[2/4] Deriving logic tensor");
    let tensor = derive(decoded.field)?;

    tracing::info!("[3/4] Synthesizing (mode: {mode})");
    let result = synthesize(&tensor, mode);

    tracing::info!("[4/4] Writing {}", output.display());
    encode(&result, output)?;

    let elapsed = start.elapsed();
    tracing::info!("Completed {mode} on {width}x{height} in {:.4}s", elapsed.as_secs_f64());

    Ok(RunReport {
        height,
        width,
        mode,
        elapsed,
    })
}

/// Convert an image file to its JSON text representation.
pub fn image_to_text(image_path: &Path, text_path: &Path, precision: u32) -> VisionResult<()> {
    let decoded = decode(image_path)?;
    serializer::write_to_file(&decoded.field, text_path, precision)
}

/// Rebuild an image file from its JSON text representation.
pub fn text_to_image(text_path: &Path, image_path: &Path) -> VisionResult<()> {
    let field = serializer::read_from_file(text_path)?;
    encode(&field, image_path)
}

/// Sample the logic tensor of an image file at column `x`, row `y`.
pub fn inspect(image_path: &Path, x: i64, y: i64) -> VisionResult<Option<SmartAtom>> {
    let decoded = decode(image_path)?;
    let tensor = derive(decoded.field)?;
    let atom = sample_atom(&tensor, x, y);
    if atom.is_none() {
        tracing::warn!(
            "({x}, {y}) is outside the {}x{} image",
            tensor.width(),
            tensor.height()
        );
    }
    Ok(atom)
}
