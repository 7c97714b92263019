use image::{GrayImage, Luma};
use crate::{error::{PiecesError, Result}, traits::ImagePreprocessor};

/// Global binarization with the level picked by Otsu's method
#[derive(Debug, Clone, Default)]
pub struct OtsuThresholdPreprocessor;

impl ImagePreprocessor for OtsuThresholdPreprocessor {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        let level = imageproc::contrast::otsu_level(image);
        tracing::trace!(level, "otsu threshold level");
        Ok(binarize(image, level))
    }
}

/// Pixels brighter than `level` become 255, everything else 0
fn binarize(image: &GrayImage, level: u8) -> GrayImage {
    imageproc::map::map_colors(image, |Luma([value])| {
        Luma([if value > level { 255 } else { 0 }])
    })
}

/// Fixed-level thresholding preprocessor
#[derive(Debug, Clone)]
pub struct ThresholdPreprocessor {
    pub threshold: u8,
}

impl Default for ThresholdPreprocessor {
    fn default() -> Self {
        Self { threshold: 128 }
    }
}

impl ImagePreprocessor for ThresholdPreprocessor {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        Ok(binarize(image, self.threshold))
    }
}

/// Gaussian blur preprocessor for noise reduction
#[derive(Debug, Clone)]
pub struct GaussianBlurPreprocessor {
    pub sigma: f32,
}

impl Default for GaussianBlurPreprocessor {
    fn default() -> Self {
        Self { sigma: 1.0 }
    }
}

impl ImagePreprocessor for GaussianBlurPreprocessor {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        // imageproc panics on a non-positive sigma
        if !(self.sigma > 0.0) {
            return Err(PiecesError::ImageProcessing(format!(
                "gaussian sigma must be positive, got {}",
                self.sigma
            )));
        }
        Ok(imageproc::filter::gaussian_blur_f32(image, self.sigma))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_tone_image() -> GrayImage {
        GrayImage::from_fn(40, 40, |x, _| if x < 20 { Luma([30u8]) } else { Luma([220u8]) })
    }

    #[test]
    fn test_otsu_separates_two_tones() {
        let binary = OtsuThresholdPreprocessor.preprocess(&two_tone_image()).unwrap();
        assert_eq!(binary.get_pixel(5, 5)[0], 0);
        assert_eq!(binary.get_pixel(35, 5)[0], 255);
    }

    #[test]
    fn test_fixed_threshold() {
        let binary = ThresholdPreprocessor { threshold: 250 }
            .preprocess(&two_tone_image())
            .unwrap();
        assert!(binary.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_blur_rejects_bad_sigma() {
        let result = GaussianBlurPreprocessor { sigma: 0.0 }.preprocess(&two_tone_image());
        assert!(matches!(result, Err(PiecesError::ImageProcessing(_))));
    }
}
