use image::{GenericImageView, GrayImage, Luma, RgbaImage};
use imageproc::point::Point;
use crate::types::{BoundingBox, Contour, Frame};

/// Map a detection-resolution contour into the local pixel space of a
/// full-resolution crop at `bounding_box`.
///
/// Consecutive duplicates produced by rounding are removed, as is a closing
/// point equal to the first one, so the result can be handed straight to a
/// polygon fill.
pub fn local_polygon(contour: &Contour, bounding_box: &BoundingBox, process_ratio: f32) -> Vec<Point<i32>> {
    let mut polygon: Vec<Point<i32>> = Vec::with_capacity(contour.len());

    for p in &contour.points {
        let local = Point::new(
            (p.x as f32 / process_ratio - bounding_box.x).round() as i32,
            (p.y as f32 / process_ratio - bounding_box.y).round() as i32,
        );
        if polygon.last() != Some(&local) {
            polygon.push(local);
        }
    }

    while polygon.len() > 1 && polygon.first() == polygon.last() {
        polygon.pop();
    }

    polygon
}

/// Rasterize `polygon` into a `width x height` coverage mask (255 inside).
///
/// Returns `None` when the polygon has fewer than two distinct points.
pub fn polygon_mask(polygon: &[Point<i32>], width: u32, height: u32) -> Option<GrayImage> {
    if polygon.len() < 2 || polygon.first() == polygon.last() {
        return None;
    }

    let mut mask = GrayImage::new(width, height);
    imageproc::drawing::draw_polygon_mut(&mut mask, polygon, Luma([255u8]));
    Some(mask)
}

/// Crop `frame` to `bounding_box` and keep only the pixels covered by
/// `mask`, multiplying the source alpha the way a destination-in
/// composite would.
pub fn masked_crop<F: Frame>(frame: &F, bounding_box: &BoundingBox, mask: &GrayImage) -> RgbaImage {
    let (frame_width, frame_height) = frame.dimensions();
    let (x0, y0) = bounding_box.pixel_origin();
    let width = mask.width().min(frame_width.saturating_sub(x0));
    let height = mask.height().min(frame_height.saturating_sub(y0));

    RgbaImage::from_fn(width, height, |x, y| {
        let mut pixel = frame.get_pixel(x0 + x, y0 + y);
        let coverage = mask.get_pixel(x, y)[0] as u16;
        pixel.0[3] = ((pixel.0[3] as u16 * coverage) / 255) as u8;
        pixel
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BorderKind;
    use image::Rgba;

    #[test]
    fn test_local_polygon_scales_and_translates() {
        let contour = Contour::new(
            vec![Point::new(10, 10), Point::new(20, 10), Point::new(20, 30), Point::new(10, 30)],
            BorderKind::Outer,
        );
        let bbox = BoundingBox::new(20.0, 20.0, 20.0, 40.0);
        let polygon = local_polygon(&contour, &bbox, 0.5);
        assert_eq!(
            polygon,
            vec![Point::new(0, 0), Point::new(20, 0), Point::new(20, 40), Point::new(0, 40)]
        );
    }

    #[test]
    fn test_local_polygon_drops_closing_point() {
        let contour = Contour::new(
            vec![Point::new(0, 0), Point::new(5, 0), Point::new(5, 5), Point::new(0, 0)],
            BorderKind::Outer,
        );
        let bbox = BoundingBox::new(0.0, 0.0, 5.0, 5.0);
        assert_eq!(local_polygon(&contour, &bbox, 1.0).len(), 3);
    }

    #[test]
    fn test_degenerate_polygon_has_no_mask() {
        assert!(polygon_mask(&[], 10, 10).is_none());
        assert!(polygon_mask(&[Point::new(3, 3)], 10, 10).is_none());
    }

    #[test]
    fn test_masked_crop_clears_outside() {
        let frame = RgbaImage::from_pixel(30, 30, Rgba([200, 100, 50, 255]));
        let triangle = [Point::new(0, 0), Point::new(19, 0), Point::new(0, 19)];
        let mask = polygon_mask(&triangle, 20, 20).unwrap();
        let crop = masked_crop(&frame, &BoundingBox::new(5.0, 5.0, 20.0, 20.0), &mask);

        assert_eq!(crop.dimensions(), (20, 20));
        assert_eq!(crop.get_pixel(2, 2), &Rgba([200, 100, 50, 255]));
        assert_eq!(crop.get_pixel(18, 18)[3], 0);
    }
}
