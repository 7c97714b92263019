use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use crate::{
    algorithms::{ChainApproximation, ImageprocContourExtractor, OtsuThresholdPreprocessor},
    error::{PiecesError, Result},
    pipeline::PieceDetector,
    traits::{ContourExtractor, ImagePreprocessor},
};

pub const DEFAULT_PROCESS_RATIO: f32 = 1.0;
pub const DEFAULT_CONTOUR_COMPLEXITY_THRESHOLD: usize = 20;
pub const DEFAULT_MIN_BOX_SIZE: f32 = 50.0;

/// Serializable detector settings, as they appear in configuration files
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct SegmentationSettings {
    /// Resolution scale used for contour detection, in (0, 1]
    #[schemars(range(min = 0.01, max = 1.0))]
    pub process_ratio: f32,
    /// Contours with fewer points are treated as noise
    pub contour_complexity_threshold: usize,
    /// Boxes must be strictly larger than this on both sides (full-resolution pixels)
    pub min_box_size: f32,
    pub chain_approximation: ChainApproximation,
}

impl Default for SegmentationSettings {
    fn default() -> Self {
        Self {
            process_ratio: DEFAULT_PROCESS_RATIO,
            contour_complexity_threshold: DEFAULT_CONTOUR_COMPLEXITY_THRESHOLD,
            min_box_size: DEFAULT_MIN_BOX_SIZE,
            chain_approximation: ChainApproximation::default(),
        }
    }
}

/// Builder for creating piece detectors with a fluent API
pub struct PieceDetectorBuilder {
    process_ratio: f32,
    contour_complexity_threshold: usize,
    min_box_size: f32,
    chain_approximation: ChainApproximation,
    preprocessors: Vec<Box<dyn ImagePreprocessor>>,
    contour_extractor: Option<Box<dyn ContourExtractor>>,
}

impl PieceDetectorBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::from_settings(&SegmentationSettings::default())
    }

    pub fn from_settings(settings: &SegmentationSettings) -> Self {
        Self {
            process_ratio: settings.process_ratio,
            contour_complexity_threshold: settings.contour_complexity_threshold,
            min_box_size: settings.min_box_size,
            chain_approximation: settings.chain_approximation,
            preprocessors: Vec::new(),
            contour_extractor: None,
        }
    }

    pub fn process_ratio(mut self, ratio: f32) -> Self {
        self.process_ratio = ratio;
        self
    }

    pub fn contour_complexity_threshold(mut self, points: usize) -> Self {
        self.contour_complexity_threshold = points;
        self
    }

    pub fn min_box_size(mut self, size: f32) -> Self {
        self.min_box_size = size;
        self
    }

    /// Chain approximation of the default extractor. Ignored when a custom
    /// extractor is set.
    pub fn chain_approximation(mut self, approximation: ChainApproximation) -> Self {
        self.chain_approximation = approximation;
        self
    }

    /// Add a preprocessor. When none is added the detector binarizes with Otsu.
    pub fn add_preprocessor<P>(mut self, preprocessor: P) -> Self
    where
        P: ImagePreprocessor + 'static,
    {
        self.preprocessors.push(Box::new(preprocessor));
        self
    }

    /// Set the contour extractor (replaces any existing one)
    pub fn set_contour_extractor<E>(mut self, extractor: E) -> Self
    where
        E: ContourExtractor + 'static,
    {
        self.contour_extractor = Some(Box::new(extractor));
        self
    }

    /// Validate the settings and build the detector
    pub fn build(self) -> Result<PieceDetector> {
        if !self.process_ratio.is_finite() || self.process_ratio <= 0.0 || self.process_ratio > 1.0 {
            return Err(PiecesError::InvalidConfig(format!(
                "process ratio must be in (0, 1], got {}",
                self.process_ratio
            )));
        }
        if !self.min_box_size.is_finite() || self.min_box_size < 0.0 {
            return Err(PiecesError::InvalidConfig(format!(
                "minimum box size must be a non-negative number, got {}",
                self.min_box_size
            )));
        }

        let mut preprocessors = self.preprocessors;
        if preprocessors.is_empty() {
            preprocessors.push(Box::new(OtsuThresholdPreprocessor));
        }

        let contour_extractor = self.contour_extractor
            .unwrap_or_else(|| Box::new(ImageprocContourExtractor::new(self.chain_approximation)));

        Ok(PieceDetector::new(
            self.process_ratio,
            preprocessors,
            contour_extractor,
            self.contour_complexity_threshold,
            self.min_box_size,
        ))
    }
}

impl Default for PieceDetectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range_ratio() {
        for ratio in [0.0, -0.5, 1.5, f32::NAN] {
            let result = PieceDetectorBuilder::new().process_ratio(ratio).build();
            assert!(matches!(result, Err(PiecesError::InvalidConfig(_))), "ratio {ratio}");
        }
    }

    #[test]
    fn test_defaults() {
        let detector = PieceDetectorBuilder::new().build().unwrap();
        assert_eq!(detector.process_ratio(), 1.0);
        assert_eq!(detector.contour_complexity_threshold(), 20);
        assert_eq!(detector.min_box_size(), 50.0);
    }

    #[test]
    fn test_settings_fill_missing_fields() {
        let settings: SegmentationSettings =
            serde_json::from_str(r#"{ "process_ratio": 0.2, "chain_approximation": "full" }"#).unwrap();
        assert_eq!(settings.process_ratio, 0.2);
        assert_eq!(settings.contour_complexity_threshold, 20);
        assert_eq!(settings.chain_approximation, ChainApproximation::Full);
    }
}
