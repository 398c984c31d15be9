//! Synthesis of output color fields from a logic tensor.
//!
//! Nothing here clips. Values may leave [0, 1] and are only clamped when the
//! field is encoded, so remix results can be chained before a single final clip.

use ndarray::{Axis, Zip};

use crate::types::{ColorField, LogicTensor, Real, RemixMode, SynthesisMode, CHANNELS};

/// Gain applied to gradient magnitude so weak edges become visible.
pub const FLOW_BOOST: Real = 5.0;

/// Pixels with energy strictly above this are boosted.
pub const ENERGY_THRESHOLD: Real = 0.5;

/// Amount added to every channel of a boosted pixel.
pub const ENERGY_BOOST_STEP: Real = 0.2;

/// Identity reconstruction: the tensor's color field, unchanged.
pub fn reconstruct(tensor: &LogicTensor) -> ColorField {
    tracing::debug!("Reconstructing color field from logic tensor");
    tensor.color().clone()
}

/// Apply a remix rule to a tensor.
pub fn remix(tensor: &LogicTensor, mode: RemixMode) -> ColorField {
    tracing::debug!("Applying remix rule: {}", mode.as_str());
    match mode {
        RemixMode::FlowVisualize => flow_visualize(tensor),
        RemixMode::QuantumInverse => quantum_inverse(tensor.color()),
        RemixMode::EnergyBoost => energy_boost(tensor),
    }
}

/// Dispatch on a driver-selected mode.
pub fn synthesize(tensor: &LogicTensor, mode: SynthesisMode) -> ColorField {
    match mode {
        SynthesisMode::Reconstruct => reconstruct(tensor),
        SynthesisMode::Remix(rule) => remix(tensor, rule),
    }
}

/// Gradient magnitude as a grayscale heat map, R = G = B.
fn flow_visualize(tensor: &LogicTensor) -> ColorField {
    let mut visual = ColorField::zeros((tensor.height(), tensor.width(), CHANNELS));
    Zip::from(visual.lanes_mut(Axis(2)))
        .and(tensor.flow_x())
        .and(tensor.flow_y())
        .for_each(|mut pixel, &fx, &fy| {
            let magnitude = (fx * fx + fy * fy).sqrt();
            pixel.fill((magnitude * FLOW_BOOST).clamp(0.0, 1.0));
        });
    visual
}

fn quantum_inverse(color: &ColorField) -> ColorField {
    color.mapv(|v| 1.0 - v)
}

fn energy_boost(tensor: &LogicTensor) -> ColorField {
    let mut boosted = tensor.color().clone();
    Zip::from(boosted.lanes_mut(Axis(2)))
        .and(tensor.energy())
        .for_each(|mut pixel, &energy| {
            let mask = if energy > ENERGY_THRESHOLD { 1.0 } else { 0.0 };
            pixel.mapv_inplace(|v| v + mask * ENERGY_BOOST_STEP);
        });
    boosted
}
