//! Core data types for logic tensors, point samples, and synthesis modes.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};

/// Numeric type of every field in the pipeline.
pub type Real = f64;

/// Normalized RGB grid of shape (H, W, 3).
pub type ColorField = Array3<Real>;

/// Per-pixel scalar grid of shape (H, W).
pub type ScalarField = Array2<Real>;

/// Number of color channels in a [`ColorField`].
pub const CHANNELS: usize = 3;

/// A color field together with the luminance and gradient fields derived from it.
///
/// The derived fields are never mutated on their own. A tensor is built either by
/// [`crate::derive::derive`] or, at an external boundary, by [`LogicTensor::from_parts`].
#[derive(Debug, Clone, PartialEq)]
pub struct LogicTensor {
    color: ColorField,
    energy: ScalarField,
    flow_x: ScalarField,
    flow_y: ScalarField,
}

impl LogicTensor {
    /// Assemble a tensor from externally supplied fields, checking that all extents agree.
    pub fn from_parts(
        color: ColorField,
        energy: ScalarField,
        flow_x: ScalarField,
        flow_y: ScalarField,
    ) -> VisionResult<Self> {
        let (h, w, c) = color.dim();
        if c != CHANNELS {
            return Err(VisionError::ShapeMismatch {
                field: "color",
                expected: (h, w, CHANNELS),
                found: (h, w, c),
            });
        }

        for (field, scalar) in [("energy", &energy), ("flow_x", &flow_x), ("flow_y", &flow_y)] {
            let (sh, sw) = scalar.dim();
            if (sh, sw) != (h, w) {
                return Err(VisionError::ShapeMismatch {
                    field,
                    expected: (h, w, 1),
                    found: (sh, sw, 1),
                });
            }
        }

        Ok(Self {
            color,
            energy,
            flow_x,
            flow_y,
        })
    }

    /// Extents agree by construction when every field comes from `derive`.
    pub(crate) fn from_derived(
        color: ColorField,
        energy: ScalarField,
        flow_x: ScalarField,
        flow_y: ScalarField,
    ) -> Self {
        Self {
            color,
            energy,
            flow_x,
            flow_y,
        }
    }

    /// The source color field.
    pub fn color(&self) -> &ColorField {
        &self.color
    }

    /// Luminance per pixel.
    pub fn energy(&self) -> &ScalarField {
        &self.energy
    }

    /// Horizontal rate of change, averaged across channels.
    pub fn flow_x(&self) -> &ScalarField {
        &self.flow_x
    }

    /// Vertical rate of change, averaged across channels.
    pub fn flow_y(&self) -> &ScalarField {
        &self.flow_y
    }

    /// Grid height.
    pub fn height(&self) -> usize {
        self.color.dim().0
    }

    /// Grid width.
    pub fn width(&self) -> usize {
        self.color.dim().1
    }

    /// Consume the tensor and hand back its color field.
    pub fn into_color(self) -> ColorField {
        self.color
    }
}

/// A single-point sample extracted from a [`LogicTensor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartAtom {
    pub coordinate: (i64, i64),
    pub vector_rgb: [Real; 3],
    pub energy_val: Real,
    pub logic_flow: [Real; 2],
}

/// Remix rules driven by the derived fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemixMode {
    FlowVisualize,
    QuantumInverse,
    EnergyBoost,
}

impl RemixMode {
    pub const ALL: [RemixMode; 3] = [
        RemixMode::FlowVisualize,
        RemixMode::QuantumInverse,
        RemixMode::EnergyBoost,
    ];

    /// Name used on the command line and in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            RemixMode::FlowVisualize => "visualize_flow",
            RemixMode::QuantumInverse => "quantum_inverse",
            RemixMode::EnergyBoost => "energy_boost",
        }
    }
}

/// What a driver asks the synthesis stage to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SynthesisMode {
    /// Lossless identity reconstruction.
    #[default]
    Reconstruct,
    Remix(RemixMode),
}

impl SynthesisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SynthesisMode::Reconstruct => "reconstruct",
            SynthesisMode::Remix(mode) => mode.as_str(),
        }
    }

    /// Every accepted mode name, in presentation order.
    pub fn names() -> Vec<&'static str> {
        std::iter::once(SynthesisMode::Reconstruct.as_str())
            .chain(RemixMode::ALL.iter().map(|m| m.as_str()))
            .collect()
    }
}

impl fmt::Display for SynthesisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SynthesisMode {
    type Err = VisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "reconstruct" => Ok(SynthesisMode::Reconstruct),
            "visualize_flow" => Ok(SynthesisMode::Remix(RemixMode::FlowVisualize)),
            "quantum_inverse" => Ok(SynthesisMode::Remix(RemixMode::QuantumInverse)),
            "energy_boost" => Ok(SynthesisMode::Remix(RemixMode::EnergyBoost)),
            other => Err(VisionError::UnknownMode(other.to_string())),
        }
    }
}

/// Errors that can occur in the vision library.
#[derive(thiserror::Error, Debug)]
pub enum VisionError {
    #[error("Input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Decode error for {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Encode error for {}: {reason}", .path.display())]
    Encode { path: PathBuf, reason: String },

    #[error("Shape mismatch in {field}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        field: &'static str,
        expected: (usize, usize, usize),
        found: (usize, usize, usize),
    },

    #[error("Malformed data: {0}")]
    MalformedData(String),

    #[error("Unknown mode: {0}")]
    UnknownMode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type VisionResult<T> = Result<T, VisionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_accepts_matching_extents() {
        let tensor = LogicTensor::from_parts(
            ColorField::zeros((2, 3, 3)),
            ScalarField::zeros((2, 3)),
            ScalarField::zeros((2, 3)),
            ScalarField::zeros((2, 3)),
        )
        .unwrap();
        assert_eq!(tensor.height(), 2);
        assert_eq!(tensor.width(), 3);
    }

    #[test]
    fn test_from_parts_rejects_mismatched_flow() {
        let err = LogicTensor::from_parts(
            ColorField::zeros((2, 3, 3)),
            ScalarField::zeros((2, 3)),
            ScalarField::zeros((3, 2)),
            ScalarField::zeros((2, 3)),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            VisionError::ShapeMismatch { field: "flow_x", .. }
        ));
    }

    #[test]
    fn test_from_parts_rejects_wrong_channel_count() {
        let err = LogicTensor::from_parts(
            ColorField::zeros((2, 2, 4)),
            ScalarField::zeros((2, 2)),
            ScalarField::zeros((2, 2)),
            ScalarField::zeros((2, 2)),
        )
        .unwrap_err();
        assert!(matches!(err, VisionError::ShapeMismatch { field: "color", .. }));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(
            "reconstruct".parse::<SynthesisMode>().unwrap(),
            SynthesisMode::Reconstruct
        );
        assert_eq!(
            "energy_boost".parse::<SynthesisMode>().unwrap(),
            SynthesisMode::Remix(RemixMode::EnergyBoost)
        );
        for name in SynthesisMode::names() {
            assert_eq!(name.parse::<SynthesisMode>().unwrap().as_str(), name);
        }
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let err = "edge_glow".parse::<SynthesisMode>().unwrap_err();
        assert!(matches!(err, VisionError::UnknownMode(m) if m == "edge_glow"));
    }

    #[test]
    fn test_smart_atom_field_names() {
        let atom = SmartAtom {
            coordinate: (1, 0),
            vector_rgb: [1.0, 1.0, 1.0],
            energy_val: 1.0,
            logic_flow: [1.0, 0.0],
        };
        let json = serde_json::to_value(&atom).unwrap();
        assert_eq!(json["coordinate"], serde_json::json!([1, 0]));
        assert_eq!(json["logic_flow"], serde_json::json!([1.0, 0.0]));
        assert_eq!(json["energy_val"], serde_json::json!(1.0));
    }
}
