//! # Similarity Module
//!
//! Decides whether two photos show the same scene.
//!
//! ## How It Works
//! 1. Take the absolute per-pixel difference of the two images
//! 2. Find the tight bounding box around every pixel that differs
//! 3. Compare the box's share of the frame against a threshold
//!
//! No differing pixels at all means the images are identical, which is
//! always "similar" whatever the threshold.
//!
//! The measure is the *area of the box*, not the number of changed pixels.
//! One small change in each corner spans the whole frame, while a large but
//! compact change may stay under the threshold.

mod traits;

pub use traits::{BoundingBoxComparator, SimilarityComparator, DEFAULT_THRESHOLD};

use crate::error::CompareError;
use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};

/// Tight bounding box of the differing pixels, right/bottom exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffBounds {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl DiffBounds {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }
}

/// Outcome of comparing two images
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityReport {
    /// Where the images differ; `None` when they are identical
    pub bounds: Option<DiffBounds>,
    /// Bounding-box area over frame area (0.0 when identical)
    pub diff_fraction: f64,
    /// Threshold the verdict was reached with
    pub threshold: f64,
    /// The verdict
    pub similar: bool,
}

impl SimilarityReport {
    pub fn is_identical(&self) -> bool {
        self.bounds.is_none()
    }
}

/// Bounding box of every pixel where `a` and `b` differ in any channel.
///
/// Both images are compared as RGBA8. Returns `Ok(None)` when the images are
/// pixel-identical.
pub fn difference_bounds(
    a: &DynamicImage,
    b: &DynamicImage,
) -> Result<Option<DiffBounds>, CompareError> {
    if a.dimensions() != b.dimensions() {
        return Err(CompareError::DimensionMismatch {
            left_width: a.width(),
            left_height: a.height(),
            right_width: b.width(),
            right_height: b.height(),
        });
    }

    let a = a.to_rgba8();
    let b = b.to_rgba8();

    let mut bounds: Option<DiffBounds> = None;
    for ((x, y, pa), pb) in a.enumerate_pixels().zip(b.pixels()) {
        if pa == pb {
            continue;
        }
        bounds = Some(match bounds {
            None => DiffBounds {
                left: x,
                top: y,
                right: x + 1,
                bottom: y + 1,
            },
            Some(bb) => DiffBounds {
                left: bb.left.min(x),
                top: bb.top.min(y),
                right: bb.right.max(x + 1),
                bottom: bb.bottom.max(y + 1),
            },
        });
    }

    Ok(bounds)
}

/// Compare two images under `threshold` and explain the verdict
pub fn compare(
    a: &DynamicImage,
    b: &DynamicImage,
    threshold: f64,
) -> Result<SimilarityReport, CompareError> {
    validate_threshold(threshold)?;

    let bounds = difference_bounds(a, b)?;
    let (diff_fraction, similar) = match bounds {
        None => (0.0, true),
        Some(bb) => {
            let frame = a.width() as u64 * a.height() as u64;
            let fraction = bb.area() as f64 / frame as f64;
            (fraction, fraction < threshold)
        }
    };

    Ok(SimilarityReport {
        bounds,
        diff_fraction,
        threshold,
        similar,
    })
}

/// True when the differing region covers less than `threshold` of the frame
pub fn are_similar(a: &DynamicImage, b: &DynamicImage, threshold: f64) -> Result<bool, CompareError> {
    compare(a, b, threshold).map(|report| report.similar)
}

pub(crate) fn validate_threshold(threshold: f64) -> Result<(), CompareError> {
    if threshold.is_finite() && (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(CompareError::InvalidThreshold { value: threshold })
    }
}
