use image::GrayImage;
use imageproc::{contours::BorderType, point::Point};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr, VariantNames};
use crate::{error::Result, traits::ContourExtractor, types::{BorderKind, Contour}};

/// How many border pixels a traced contour keeps
#[derive(
    Debug, Clone, Copy, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, VariantNames, IntoStaticStr,
    PartialEq, Eq
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChainApproximation {
    /// Straight runs (horizontal, vertical, diagonal) collapse to their end points
    #[default]
    Simple,
    /// Every traced border pixel is kept
    Full,
}

/// Imageproc-based contour extractor
#[derive(Debug, Clone, Default)]
pub struct ImageprocContourExtractor {
    pub approximation: ChainApproximation,
}

impl ImageprocContourExtractor {
    pub fn new(approximation: ChainApproximation) -> Self {
        Self { approximation }
    }
}

impl ContourExtractor for ImageprocContourExtractor {
    fn extract_contours(&self, binary_image: &GrayImage) -> Result<Vec<Contour>> {
        let contours = imageproc::contours::find_contours::<i32>(binary_image);

        let result = contours
            .into_iter()
            .map(|contour| {
                let border = match contour.border_type {
                    BorderType::Outer => BorderKind::Outer,
                    BorderType::Hole => BorderKind::Hole,
                };
                let points = match self.approximation {
                    ChainApproximation::Simple => compress_chain(&contour.points),
                    ChainApproximation::Full => contour.points,
                };
                Contour::new(points, border)
            })
            .collect();

        Ok(result)
    }
}

/// Drop every point that continues the previous step in the same direction,
/// treating the sequence as closed.
pub fn compress_chain(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let step = |from: Point<i32>, to: Point<i32>| ((to.x - from.x).signum(), (to.y - from.y).signum());

    (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            step(prev, points[i]) != step(points[i], next)
        })
        .map(|i| points[i])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn square_image() -> GrayImage {
        let mut img = GrayImage::new(60, 60);
        for y in 10..40 {
            for x in 10..40 {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }
        img
    }

    #[test]
    fn test_compress_chain_keeps_corners() {
        let mut ring = Vec::new();
        for x in 0..5 {
            ring.push(Point::new(x, 0));
        }
        for y in 1..5 {
            ring.push(Point::new(4, y));
        }
        for x in (0..4).rev() {
            ring.push(Point::new(x, 4));
        }
        for y in (1..4).rev() {
            ring.push(Point::new(0, y));
        }

        let corners = compress_chain(&ring);
        assert_eq!(
            corners,
            vec![Point::new(0, 0), Point::new(4, 0), Point::new(4, 4), Point::new(0, 4)]
        );
    }

    #[test]
    fn test_short_chains_untouched() {
        let pair = vec![Point::new(1, 1), Point::new(2, 2)];
        assert_eq!(compress_chain(&pair), pair);
    }

    #[test]
    fn test_simple_approximation_shrinks_square() {
        let full = ImageprocContourExtractor::new(ChainApproximation::Full)
            .extract_contours(&square_image())
            .unwrap();
        let simple = ImageprocContourExtractor::new(ChainApproximation::Simple)
            .extract_contours(&square_image())
            .unwrap();

        assert_eq!(full.len(), 1);
        assert_eq!(simple.len(), 1);
        assert_eq!(full[0].border, BorderKind::Outer);
        assert!(full[0].len() > 100);
        assert!(simple[0].len() <= 8);
        assert_eq!(full[0].bounding_box(), simple[0].bounding_box());
    }

    #[test]
    fn test_nested_contours_reported() {
        let mut img = square_image();
        for y in 20..30 {
            for x in 20..30 {
                img.put_pixel(x, y, Luma([0u8]));
            }
        }
        let contours = ImageprocContourExtractor::default()
            .extract_contours(&img)
            .unwrap();
        assert!(contours.iter().any(|c| c.border == BorderKind::Hole));
        assert!(contours.iter().any(|c| c.border == BorderKind::Outer));
    }
}
