use std::sync::Arc;

use image::{Pixel, Rgba, RgbaImage, imageops};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};
use nalgebra::Point2;
use pieces::Piece;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use crate::tracker::HoldState;

const BOX_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct RenderSettings {
    /// Flip the output horizontally (selfie view)
    pub mirror: bool,
    /// Render the camera frame in grayscale while a piece is held
    pub desaturate_while_holding: bool,
    /// Outline every detected piece
    pub show_boxes: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            mirror: false,
            desaturate_while_holding: true,
            show_boxes: false,
        }
    }
}

/// Draws the output frame: the camera image, plus the held piece pinned to
/// the fingertip.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    settings: RenderSettings,
}

impl Compositor {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn render(
        &self,
        frame: &RgbaImage,
        hold: &HoldState,
        fingertip: Option<Point2<f32>>,
        pieces: &[Arc<Piece>],
    ) -> RgbaImage {
        let mut canvas = if hold.is_holding() && self.settings.desaturate_while_holding {
            desaturate(frame)
        } else {
            frame.clone()
        };

        if self.settings.show_boxes {
            for piece in pieces {
                let bbox = &piece.bounding_box;
                let (width, height) = bbox.pixel_size();
                let rect = Rect::at(bbox.x as i32, bbox.y as i32).of_size(width.max(1), height.max(1));
                draw_hollow_rect_mut(&mut canvas, rect, BOX_COLOR);
            }
        }

        if let (Some(held), Some(tip)) = (hold.held(), fingertip) {
            imageops::overlay(
                &mut canvas,
                &held.piece.image,
                tip.x.round() as i64,
                tip.y.round() as i64,
            );
        }

        if self.settings.mirror {
            imageops::flip_horizontal_in_place(&mut canvas);
        }

        canvas
    }
}

/// Grayscale copy of `frame` that keeps the alpha channel
fn desaturate(frame: &RgbaImage) -> RgbaImage {
    let mut out = frame.clone();
    for pixel in out.pixels_mut() {
        let luma = pixel.to_luma()[0];
        pixel.0 = [luma, luma, luma, pixel[3]];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::HeldPiece;
    use pieces::BoundingBox;

    const CAMERA: Rgba<u8> = Rgba([0, 0, 255, 255]);

    fn held_piece() -> HoldState {
        let mut image = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 0, 255]));
        // transparent corner, outside the contour
        image.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        HoldState::Holding(HeldPiece {
            id: 1,
            piece: Arc::new(Piece {
                bounding_box: BoundingBox::new(0.0, 0.0, 10.0, 10.0),
                image,
                contour_points: 20,
            }),
        })
    }

    #[test]
    fn test_idle_frame_passes_through() {
        let frame = RgbaImage::from_pixel(40, 30, CAMERA);
        let out = Compositor::default().render(&frame, &HoldState::Idle, Some(Point2::new(5.0, 5.0)), &[]);
        assert_eq!(out, frame);
    }

    #[test]
    fn test_held_piece_drawn_at_fingertip() {
        let frame = RgbaImage::from_pixel(40, 30, CAMERA);
        let compositor = Compositor::new(RenderSettings {
            desaturate_while_holding: false,
            ..Default::default()
        });
        let out = compositor.render(&frame, &held_piece(), Some(Point2::new(20.0, 10.0)), &[]);

        assert_eq!(out.get_pixel(25, 15), &Rgba([255, 255, 0, 255]));
        // transparent pixels keep the camera image
        assert_eq!(out.get_pixel(20, 10), &CAMERA);
        assert_eq!(out.get_pixel(5, 5), &CAMERA);
    }

    #[test]
    fn test_desaturates_while_holding() {
        let frame = RgbaImage::from_pixel(40, 30, CAMERA);
        let out = Compositor::default().render(&frame, &held_piece(), Some(Point2::new(20.0, 10.0)), &[]);

        let background = out.get_pixel(2, 2);
        assert_eq!(background[0], background[1]);
        assert_eq!(background[1], background[2]);
        assert_eq!(out.get_pixel(25, 15), &Rgba([255, 255, 0, 255]));
    }

    #[test]
    fn test_mirror_flips_output() {
        let mut frame = RgbaImage::from_pixel(40, 30, CAMERA);
        frame.put_pixel(0, 0, Rgba([1, 2, 3, 255]));
        let compositor = Compositor::new(RenderSettings {
            mirror: true,
            ..Default::default()
        });
        let out = compositor.render(&frame, &HoldState::Idle, None, &[]);
        assert_eq!(out.get_pixel(39, 0), &Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn test_box_outline() {
        let frame = RgbaImage::from_pixel(40, 30, CAMERA);
        let piece = Arc::new(Piece {
            bounding_box: BoundingBox::new(5.0, 5.0, 20.0, 10.0),
            image: RgbaImage::new(20, 10),
            contour_points: 20,
        });
        let compositor = Compositor::new(RenderSettings {
            show_boxes: true,
            ..Default::default()
        });
        let out = compositor.render(&frame, &HoldState::Idle, None, &[piece]);
        assert_eq!(out.get_pixel(5, 5), &BOX_COLOR);
        assert_eq!(out.get_pixel(15, 10), &CAMERA);
    }
}
