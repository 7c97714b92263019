use nalgebra::Point3;
use crate::{
    landmarks::{INDEX_FINGER_MCP, INDEX_FINGER_PIP, INDEX_FINGER_TIP, LANDMARK_COUNT, THUMB_TIP},
    pose::Hand,
};

pub const DEFAULT_PINCH_RATIO: f32 = 2.0;

/// Decides whether a hand is pinching (thumb tip close to index tip).
///
/// The proximal index segment (MCP to PIP) is the size reference, so the
/// test does not depend on how far the hand is from the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchDetector {
    /// Tip gap must be below `ratio` times the reference segment
    pub ratio: f32,
}

impl Default for PinchDetector {
    fn default() -> Self {
        Self { ratio: DEFAULT_PINCH_RATIO }
    }
}

impl PinchDetector {
    pub fn new(ratio: f32) -> Self {
        Self { ratio }
    }

    /// Without 3D keypoints the answer is always `false`.
    pub fn is_pinching(&self, keypoints_3d: Option<&[Point3<f32>]>) -> bool {
        let Some(kp) = keypoints_3d else {
            return false;
        };
        if kp.len() < LANDMARK_COUNT {
            return false;
        }

        let reference = (kp[INDEX_FINGER_PIP] - kp[INDEX_FINGER_MCP]).norm();
        let gap = (kp[THUMB_TIP] - kp[INDEX_FINGER_TIP]).norm();
        gap < self.ratio * reference
    }

    pub fn is_hand_pinching(&self, hand: &Hand) -> bool {
        self.is_pinching(hand.keypoints_3d())
    }
}
