pub mod builder;

use tracing::{debug, trace};
use crate::{
    algorithms::{local_polygon, masked_crop, polygon_mask},
    error::Result,
    scaler::FrameScaler,
    traits::{ContourExtractor, ImagePreprocessor},
    types::{BoundingBox, Contour, Frame, Piece},
};

/// Segments frames into pieces.
///
/// Each call to [`PieceDetector::process`] is one segmentation pass:
/// downscale, intensity, binarize, trace contours, filter, then cut a masked
/// crop out of the full-resolution frame for every contour that survives.
pub struct PieceDetector {
    scaler: FrameScaler,
    preprocessors: Vec<Box<dyn ImagePreprocessor>>,
    contour_extractor: Box<dyn ContourExtractor>,
    contour_complexity_threshold: usize,
    min_box_size: f32,
}

impl PieceDetector {
    /// Create a new detector builder
    pub fn builder() -> builder::PieceDetectorBuilder {
        builder::PieceDetectorBuilder::new()
    }

    /// Create a new detector from already validated components
    pub fn new(
        process_ratio: f32,
        preprocessors: Vec<Box<dyn ImagePreprocessor>>,
        contour_extractor: Box<dyn ContourExtractor>,
        contour_complexity_threshold: usize,
        min_box_size: f32,
    ) -> Self {
        Self {
            scaler: FrameScaler::new(process_ratio),
            preprocessors,
            contour_extractor,
            contour_complexity_threshold,
            min_box_size,
        }
    }

    pub fn process_ratio(&self) -> f32 {
        self.scaler.ratio()
    }

    pub fn contour_complexity_threshold(&self) -> usize {
        self.contour_complexity_threshold
    }

    pub fn min_box_size(&self) -> f32 {
        self.min_box_size
    }

    pub fn scaler(&self) -> &FrameScaler {
        &self.scaler
    }

    /// Run one segmentation pass over `frame`.
    ///
    /// An empty list is a valid result. Errors from a preprocessor or the
    /// contour extractor abort the pass.
    pub fn process<F: Frame>(&mut self, frame: &F) -> Result<Vec<Piece>> {
        let contours = self.detect_contours(frame)?;
        let found = contours.len();

        let mut pieces = Vec::new();
        for contour in contours {
            let Some(bounding_box) = self.qualify(&contour) else {
                continue;
            };

            let polygon = local_polygon(&contour, &bounding_box, self.scaler.ratio());
            let (width, height) = bounding_box.pixel_size();
            let Some(mask) = polygon_mask(&polygon, width, height) else {
                trace!(points = polygon.len(), "contour too degenerate to fill");
                continue;
            };

            pieces.push(Piece {
                bounding_box,
                image: masked_crop(frame, &bounding_box, &mask),
                contour_points: contour.len(),
            });
        }

        debug!(contours = found, pieces = pieces.len(), "segmentation pass complete");
        Ok(pieces)
    }

    /// Full-resolution boxes of every contour that would become a piece,
    /// without cutting any images.
    pub fn detect_boxes<F: Frame>(&mut self, frame: &F) -> Result<Vec<BoundingBox>> {
        let contours = self.detect_contours(frame)?;
        Ok(contours.iter().filter_map(|contour| self.qualify(contour)).collect())
    }

    fn detect_contours<F: Frame>(&mut self, frame: &F) -> Result<Vec<Contour>> {
        let ratio = self.scaler.ratio();
        let Some(scratch) = self.scaler.downscale(frame) else {
            debug!("frame too small to segment at ratio {}", ratio);
            return Ok(Vec::new());
        };

        let mut processed = image::imageops::grayscale(scratch);
        for preprocessor in &self.preprocessors {
            processed = preprocessor.preprocess(&processed)?;
        }

        self.contour_extractor.extract_contours(&processed)
    }

    /// Apply the complexity and size filters, returning the full-resolution
    /// box of a contour that passes both.
    fn qualify(&self, contour: &Contour) -> Option<BoundingBox> {
        if contour.len() < 2 || contour.len() < self.contour_complexity_threshold {
            return None;
        }
        let raw_box = contour.bounding_box()?;
        let bounding_box = self.scaler.to_full_resolution_box(&raw_box);
        bounding_box.exceeds(self.min_box_size).then_some(bounding_box)
    }

    /// Get information about the detector configuration
    pub fn info(&self) -> String {
        format!(
            "PieceDetector: ratio {}, {} preprocessors, complexity >= {}, boxes > {}px",
            self.scaler.ratio(),
            self.preprocessors.len(),
            self.contour_complexity_threshold,
            self.min_box_size
        )
    }
}
