//! Logic tensor derivation: luminance and directional color gradients.

use ndarray::{Array2, Axis};

use crate::types::{
    ColorField, LogicTensor, Real, ScalarField, SmartAtom, VisionError, VisionResult, CHANNELS,
};

/// ITU-R BT.709 luma weights for R, G, B.
pub const LUMA_WEIGHTS: [Real; 3] = [0.2126, 0.7152, 0.0722];

/// Derive the logic tensor of a color field.
///
/// `energy` is the BT.709 luminance of each pixel. `flow_x` and `flow_y` are the
/// horizontal and vertical first derivatives of color, taken per channel with
/// central differences in the interior and one-sided differences at the edges,
/// then averaged across the three channels. Along an axis of length 1 the
/// derivative is zero.
///
/// Fails with `ShapeMismatch` when the field does not have exactly 3 channels.
pub fn derive(color: ColorField) -> VisionResult<LogicTensor> {
    let (h, w, c) = color.dim();
    if c != CHANNELS {
        return Err(VisionError::ShapeMismatch {
            field: "color",
            expected: (h, w, CHANNELS),
            found: (h, w, c),
        });
    }

    let energy = Array2::from_shape_fn((h, w), |(y, x)| {
        color[[y, x, 0]] * LUMA_WEIGHTS[0]
            + color[[y, x, 1]] * LUMA_WEIGHTS[1]
            + color[[y, x, 2]] * LUMA_WEIGHTS[2]
    });

    let flow_y = channel_mean_gradient(&color, Axis(0));
    let flow_x = channel_mean_gradient(&color, Axis(1));

    tracing::debug!("Derived logic tensor over {h}x{w} grid");

    Ok(LogicTensor::from_derived(color, energy, flow_x, flow_y))
}

/// Gradient of every channel along `axis`, averaged across channels.
fn channel_mean_gradient(color: &ColorField, axis: Axis) -> ScalarField {
    let (h, w, _) = color.dim();
    let len = color.len_of(axis);

    Array2::from_shape_fn((h, w), |(y, x)| {
        let i = if axis == Axis(0) { y } else { x };
        let at = |j: usize, ch: usize| {
            if axis == Axis(0) {
                color[[j, x, ch]]
            } else {
                color[[y, j, ch]]
            }
        };

        let mut sum = 0.0;
        for ch in 0..CHANNELS {
            sum += edge_clamped_difference(len, i, |j| at(j, ch));
        }
        sum / CHANNELS as Real
    })
}

/// First derivative at index `i` of a sequence of length `len` with unit spacing.
fn edge_clamped_difference(len: usize, i: usize, value: impl Fn(usize) -> Real) -> Real {
    if len < 2 {
        0.0
    } else if i == 0 {
        value(1) - value(0)
    } else if i == len - 1 {
        value(len - 1) - value(len - 2)
    } else {
        (value(i + 1) - value(i - 1)) / 2.0
    }
}

/// Extract the sample at column `x`, row `y`, or `None` when out of bounds.
pub fn sample_atom(tensor: &LogicTensor, x: i64, y: i64) -> Option<SmartAtom> {
    let col = usize::try_from(x).ok().filter(|&c| c < tensor.width())?;
    let row = usize::try_from(y).ok().filter(|&r| r < tensor.height())?;

    let color = tensor.color();
    Some(SmartAtom {
        coordinate: (x, y),
        vector_rgb: [
            color[[row, col, 0]],
            color[[row, col, 1]],
            color[[row, col, 2]],
        ],
        energy_val: tensor.energy()[[row, col]],
        logic_flow: [tensor.flow_x()[[row, col]], tensor.flow_y()[[row, col]]],
    })
}
