use image::{GenericImageView, Rgba, RgbaImage};
use imageproc::point::Point;
use serde::{Deserialize, Serialize};

/// Anything that can be sampled as an RGBA frame: camera frames, decoded
/// files and the detector's own scratch buffer all go through this.
pub trait Frame: GenericImageView<Pixel = Rgba<u8>> {}

impl<T> Frame for T where T: GenericImageView<Pixel = Rgba<u8>> {}

/// Axis-aligned rectangle. Detection code produces it in scratch-buffer
/// coordinates, pieces carry it in full-resolution frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Bounding box of a point set, `width = max_x - min_x` (no +1).
    pub fn from_points(points: &[Point<i32>]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y) = (first.x, first.y);
        let (mut max_x, mut max_y) = (first.x, first.y);

        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        Some(Self {
            x: min_x as f32,
            y: min_y as f32,
            width: (max_x - min_x) as f32,
            height: (max_y - min_y) as f32,
        })
    }

    pub fn top_left(&self) -> [f32; 2] {
        [self.x, self.y]
    }

    /// Both sides strictly larger than `min_size`
    pub fn exceeds(&self, min_size: f32) -> bool {
        self.width > min_size && self.height > min_size
    }

    /// Integer origin of the box on the pixel grid.
    pub fn pixel_origin(&self) -> (u32, u32) {
        (self.x.max(0.0) as u32, self.y.max(0.0) as u32)
    }

    /// Integer size of the box on the pixel grid (fractional part dropped).
    pub fn pixel_size(&self) -> (u32, u32) {
        (self.width.max(0.0) as u32, self.height.max(0.0) as u32)
    }
}

/// Whether a contour bounds a foreground region or a hole inside one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BorderKind {
    Outer,
    Hole,
}

/// Closed polygon in detection-resolution coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
    pub border: BorderKind,
}

impl Contour {
    pub fn new(points: Vec<Point<i32>>, border: BorderKind) -> Self {
        Self { points, border }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.points)
    }
}

/// A detected object: where it is in the frame and what it looks like.
#[derive(Debug, Clone)]
pub struct Piece {
    /// Full-resolution frame coordinates
    pub bounding_box: BoundingBox,
    /// Crop of the source frame, transparent outside the contour
    pub image: RgbaImage,
    /// Point count of the contour the piece was cut from
    pub contour_points: usize,
}

impl Piece {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Whether the masked image is visible at the given local pixel.
    pub fn is_opaque_at(&self, x: u32, y: u32) -> bool {
        self.image
            .get_pixel_checked(x, y)
            .is_some_and(|pixel| pixel[3] > 0)
    }

    /// Fraction of the crop that lies inside the contour
    pub fn coverage(&self) -> f32 {
        let total = self.image.width() as usize * self.image.height() as usize;
        if total == 0 {
            return 0.0;
        }
        let visible = self.image.pixels().filter(|p| p[3] > 0).count();
        visible as f32 / total as f32
    }
}
