use image::{GenericImageView, RgbaImage};
use crate::types::{BoundingBox, Frame};

/// Owns the detection scratch buffer and the mapping between detection and
/// full-resolution coordinates.
///
/// The buffer is allocated on first use and only reallocated when the source
/// frame changes size; it is dropped together with the scaler.
#[derive(Debug, Clone)]
pub struct FrameScaler {
    ratio: f32,
    source_size: Option<(u32, u32)>,
    scratch: Option<RgbaImage>,
}

impl FrameScaler {
    pub fn new(ratio: f32) -> Self {
        Self {
            ratio,
            source_size: None,
            scratch: None,
        }
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    /// Size of the detection buffer for a source of the given size
    pub fn detection_size(&self, width: u32, height: u32) -> (u32, u32) {
        (
            (width as f32 * self.ratio) as u32,
            (height as f32 * self.ratio) as u32,
        )
    }

    /// Dimensions of the current scratch buffer, if one has been allocated
    pub fn scratch_dimensions(&self) -> Option<(u32, u32)> {
        self.scratch.as_ref().map(|scratch| scratch.dimensions())
    }

    /// Nearest-neighbour resample of `frame` into the scratch buffer.
    ///
    /// Returns `None` when the scaled frame would be empty.
    pub fn downscale<F: Frame>(&mut self, frame: &F) -> Option<&RgbaImage> {
        let (width, height) = frame.dimensions();
        let (scaled_width, scaled_height) = self.detection_size(width, height);
        if scaled_width == 0 || scaled_height == 0 {
            return None;
        }

        if self.source_size != Some((width, height)) || self.scratch.is_none() {
            tracing::debug!(
                width, height, scaled_width, scaled_height,
                "allocating detection scratch buffer"
            );
            self.scratch = Some(RgbaImage::new(scaled_width, scaled_height));
            self.source_size = Some((width, height));
        }

        let ratio = self.ratio;
        let scratch = self.scratch.as_mut()?;
        for (x, y, pixel) in scratch.enumerate_pixels_mut() {
            let sx = ((x as f32 / ratio) as u32).min(width - 1);
            let sy = ((y as f32 / ratio) as u32).min(height - 1);
            *pixel = frame.get_pixel(sx, sy);
        }

        Some(&*scratch)
    }

    /// Map a detection-resolution value back to full resolution
    pub fn to_full_resolution(&self, value: f32) -> f32 {
        value / self.ratio
    }

    /// Map a detection-resolution box back to full resolution
    pub fn to_full_resolution_box(&self, raw: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x: self.to_full_resolution(raw.x),
            y: self.to_full_resolution(raw.y),
            width: self.to_full_resolution(raw.width),
            height: self.to_full_resolution(raw.height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_rescale_is_division_by_ratio() {
        let scaler = FrameScaler::new(0.2);
        let raw = BoundingBox::new(13.0, 7.0, 21.0, 34.0);
        let full = scaler.to_full_resolution_box(&raw);
        assert_eq!(full.x, 13.0 / 0.2);
        assert_eq!(full.y, 7.0 / 0.2);
        assert_eq!(full.width, 21.0 / 0.2);
        assert_eq!(full.height, 34.0 / 0.2);
    }

    #[test]
    fn test_downscale_samples_nearest() {
        let frame = RgbaImage::from_fn(8, 8, |x, y| Rgba([x as u8, y as u8, 0, 255]));
        let mut scaler = FrameScaler::new(0.5);
        let scratch = scaler.downscale(&frame).unwrap();
        assert_eq!(scratch.dimensions(), (4, 4));
        assert_eq!(scratch.get_pixel(3, 1), &Rgba([6, 2, 0, 255]));
    }

    #[test]
    fn test_scratch_reused_until_size_changes() {
        let mut scaler = FrameScaler::new(0.5);
        let small = RgbaImage::new(10, 10);
        let large = RgbaImage::new(20, 12);

        scaler.downscale(&small).unwrap();
        let first = scaler.scratch.as_ref().unwrap().as_raw().as_ptr();
        scaler.downscale(&small).unwrap();
        let second = scaler.scratch.as_ref().unwrap().as_raw().as_ptr();
        assert_eq!(first, second);

        scaler.downscale(&large).unwrap();
        assert_eq!(scaler.scratch_dimensions(), Some((10, 6)));
    }

    #[test]
    fn test_tiny_frame_yields_nothing() {
        let mut scaler = FrameScaler::new(0.1);
        assert!(scaler.downscale(&RgbaImage::new(5, 5)).is_none());
        assert_eq!(scaler.scratch_dimensions(), None);
    }
}
