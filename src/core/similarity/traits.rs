//! Comparator trait used by the grouper.

use super::{compare, validate_threshold, SimilarityReport};
use crate::error::CompareError;
use image::DynamicImage;

/// Threshold used when nothing else is configured
pub const DEFAULT_THRESHOLD: f64 = 0.65;

/// Strategy for deciding whether a photo matches a reference frame
pub trait SimilarityComparator: Send + Sync {
    /// Compare two images and explain the verdict
    fn compare(&self, a: &DynamicImage, b: &DynamicImage) -> Result<SimilarityReport, CompareError>;

    /// Just the verdict
    fn are_similar(&self, a: &DynamicImage, b: &DynamicImage) -> Result<bool, CompareError> {
        self.compare(a, b).map(|report| report.similar)
    }

    /// Threshold in use
    fn threshold(&self) -> f64;

    /// Human-readable description
    fn description(&self) -> String;
}

/// Bounding-box-of-difference comparator
#[derive(Debug, Clone)]
pub struct BoundingBoxComparator {
    threshold: f64,
}

impl BoundingBoxComparator {
    /// Create a comparator; `threshold` must lie in `[0, 1]`
    pub fn new(threshold: f64) -> Result<Self, CompareError> {
        validate_threshold(threshold)?;
        Ok(Self { threshold })
    }
}

impl Default for BoundingBoxComparator {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl SimilarityComparator for BoundingBoxComparator {
    fn compare(&self, a: &DynamicImage, b: &DynamicImage) -> Result<SimilarityReport, CompareError> {
        compare(a, b, self.threshold)
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn description(&self) -> String {
        format!(
            "Similar when the changed region covers less than {:.0}% of the frame",
            self.threshold * 100.0
        )
    }
}
