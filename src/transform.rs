//! Pixel arithmetic over 8-bit RGB buffers.
//!
//! Every formula is evaluated in `f32`, clipped to `[0, 255]` and truncated
//! back to `u8`. Zero divisors never reach the division: the single-image
//! scalar 0 is replaced by 1, and the two-image divisor gets `BLEND_EPSILON`.

use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::models::Operation;

/// Scalar that leaves Multiplication and Division unchanged.
pub const IDENTITY_SCALAR: f32 = 50.0;

/// Added to the second buffer before dividing by it.
pub const BLEND_EPSILON: f32 = 1e-10;

/// Rescales the two-image quotient into the displayable range.
const DIVISION_GAIN: f32 = 127.5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    #[error("Image sizes differ: {first_width}x{first_height} vs {second_width}x{second_height}")]
    DimensionMismatch {
        first_width: u32,
        first_height: u32,
        second_width: u32,
        second_height: u32,
    },
}

#[inline]
fn clip_to_u8(value: f32) -> u8 {
    // Float-to-int `as` truncates toward zero; NaN maps to 0.
    value.clamp(0.0, 255.0) as u8
}

/// Apply `op` with a 0–255 scalar to every channel of `image`.
pub fn apply_scalar(image: &RgbImage, op: Operation, value: u8) -> RgbImage {
    let v = value as f32;
    let kernel: fn(f32, f32) -> f32 = match op {
        Operation::Addition => |p, v| p + v,
        Operation::Subtraction => |p, v| p - v,
        Operation::Multiplication => |p, v| p * (v / IDENTITY_SCALAR),
        Operation::Division => |p, v| {
            let v = if v == 0.0 { 1.0 } else { v };
            p / (v / IDENTITY_SCALAR)
        },
    };

    let mut out = image.clone();
    for channel in out.iter_mut() {
        *channel = clip_to_u8(kernel(*channel as f32, v));
    }
    out
}

/// Combine two equally sized buffers with `op`. `weight` only affects
/// Addition and Subtraction.
pub fn apply_blend(
    first: &RgbImage,
    second: &RgbImage,
    op: Operation,
    weight: f32,
) -> Result<RgbImage, TransformError> {
    if first.dimensions() != second.dimensions() {
        return Err(TransformError::DimensionMismatch {
            first_width: first.width(),
            first_height: first.height(),
            second_width: second.width(),
            second_height: second.height(),
        });
    }

    let w = weight;
    let kernel = |p1: f32, p2: f32| -> f32 {
        match op {
            Operation::Addition => w * p1 + (1.0 - w) * p2,
            Operation::Subtraction => w * p1 - (1.0 - w) * p2,
            Operation::Multiplication => (p1 * p2) / 255.0,
            Operation::Division => p1 / (p2 + BLEND_EPSILON) * DIVISION_GAIN,
        }
    };

    let mut out = first.clone();
    for (channel, &other) in out.iter_mut().zip(second.as_raw().iter()) {
        *channel = clip_to_u8(kernel(*channel as f32, other as f32));
    }
    Ok(out)
}

/// Resize `other` to the dimensions of `reference`. Returns a plain copy
/// when they already match.
pub fn match_dimensions(reference: &RgbImage, other: &RgbImage) -> RgbImage {
    let (w, h) = reference.dimensions();
    if other.dimensions() == (w, h) {
        return other.clone();
    }
    tracing::debug!(
        from = %format!("{}x{}", other.width(), other.height()),
        to = %format!("{w}x{h}"),
        "Resizing second image to match the first"
    );
    imageops::resize(other, w, h, FilterType::CatmullRom)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
