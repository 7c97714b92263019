use image::GrayImage;
use crate::{error::Result, types::Contour};

/// Trait for single-channel preprocessing steps (blur, binarization)
pub trait ImagePreprocessor: Send + Sync {
    /// Preprocess the intensity image
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage>;
}

/// Trait for contour extraction over a binary raster.
///
/// Implementations must return every closed contour, nested ones included,
/// in detection-resolution coordinates. A failure here is reported to the
/// caller instead of being turned into an empty result.
pub trait ContourExtractor: Send + Sync {
    /// Extract contours from a binary image
    fn extract_contours(&self, binary_image: &GrayImage) -> Result<Vec<Contour>>;
}
