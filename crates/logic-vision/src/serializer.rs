//! JSON text representation of color fields.
//!
//! The document is `{"dimensions": [H, W, 3], "atoms": [[[r, g, b], ...], ...]}` with
//! every value rounded to a fixed number of decimals.

use std::path::Path;

use ndarray::Array3;
use serde::{Deserialize, Serialize};

use crate::types::{ColorField, Real, VisionError, VisionResult, CHANNELS};

/// Decimal digits kept by default.
pub const DEFAULT_PRECISION: u32 = 5;

/// Largest precision accepted; beyond this rounding is a no-op for f64.
const MAX_PRECISION: u32 = 15;

#[derive(Serialize)]
struct TensorPacket<'a> {
    dimensions: [usize; 3],
    atoms: &'a [Vec<[Real; 3]>],
}

#[derive(Deserialize)]
struct RawPacket {
    #[serde(alias = "shape")]
    dimensions: Vec<usize>,
    atoms: Vec<Vec<Vec<Real>>>,
}

/// Serialize a color field to JSON text, rounding each value to `precision` decimals.
pub fn to_text(field: &ColorField, precision: u32) -> VisionResult<String> {
    let (h, w, c) = field.dim();
    if c != CHANNELS {
        return Err(VisionError::ShapeMismatch {
            field: "color",
            expected: (h, w, CHANNELS),
            found: (h, w, c),
        });
    }

    if let Some(((y, x, ch), v)) = field.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(VisionError::MalformedData(format!(
            "pixel ({x}, {y}) channel {ch} is not finite: {v}"
        )));
    }

    let scale = 10f64.powi(precision.min(MAX_PRECISION) as i32);
    let round = |v: Real| (v * scale).round_ties_even() / scale;

    let atoms: Vec<Vec<[Real; 3]>> = (0..h)
        .map(|y| {
            (0..w)
                .map(|x| {
                    [
                        round(field[[y, x, 0]]),
                        round(field[[y, x, 1]]),
                        round(field[[y, x, 2]]),
                    ]
                })
                .collect()
        })
        .collect();

    serde_json::to_string(&TensorPacket {
        dimensions: [h, w, c],
        atoms: &atoms,
    })
    .map_err(|e| VisionError::MalformedData(format!("Serialization failed: {e}")))
}

/// Parse JSON text back into a color field, checking it against its stated dimensions.
pub fn from_text(text: &str) -> VisionResult<ColorField> {
    let packet: RawPacket = serde_json::from_str(text)
        .map_err(|e| VisionError::MalformedData(format!("Deserialization failed: {e}")))?;

    let (h, w) = match packet.dimensions.as_slice() {
        [h, w, c] if *c == CHANNELS => (*h, *w),
        other => {
            return Err(VisionError::MalformedData(format!(
                "dimensions must be [H, W, 3], got {other:?}"
            )))
        }
    };

    if packet.atoms.len() != h {
        return Err(VisionError::MalformedData(format!(
            "expected {h} rows, found {}",
            packet.atoms.len()
        )));
    }

    // Sized by what was actually parsed; `dimensions` is untrusted.
    let parsed: usize = packet.atoms.iter().map(|row| row.len()).sum();
    let mut values = Vec::with_capacity(parsed * CHANNELS);
    for (y, row) in packet.atoms.iter().enumerate() {
        if row.len() != w {
            return Err(VisionError::MalformedData(format!(
                "row {y}: expected {w} pixels, found {}",
                row.len()
            )));
        }
        for (x, pixel) in row.iter().enumerate() {
            if pixel.len() != CHANNELS {
                return Err(VisionError::MalformedData(format!(
                    "pixel ({x}, {y}): expected {CHANNELS} channels, found {}",
                    pixel.len()
                )));
            }
            values.extend_from_slice(pixel);
        }
    }

    Array3::from_shape_vec((h, w, CHANNELS), values)
        .map_err(|e| VisionError::MalformedData(e.to_string()))
}

/// Serialize a field and write it to a file, creating parent directories.
pub fn write_to_file(field: &ColorField, path: &Path, precision: u32) -> VisionResult<()> {
    let text = to_text(field, precision)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, text)?;
    tracing::info!("Wrote tensor text to {}", path.display());
    Ok(())
}

/// Read and parse a serialized field from a file.
pub fn read_from_file(path: &Path) -> VisionResult<ColorField> {
    if !path.exists() {
        return Err(VisionError::InputNotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    let field = from_text(&text)?;
    tracing::info!("Read tensor text from {} {:?}", path.display(), field.dim());
    Ok(field)
}
