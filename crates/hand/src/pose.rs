use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};
use crate::{
    error::{HandError, Result},
    landmarks::{INDEX_FINGER_TIP, LANDMARK_COUNT},
};

/// One tracked hand in a single frame.
///
/// `keypoints` are in screen pixels. `keypoints_3d` live in the tracker's
/// relative space and are absent whenever the tracker could not resolve
/// depth for this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Hand {
    keypoints: Vec<Point2<f32>>,
    keypoints_3d: Option<Vec<Point3<f32>>>,
    handedness: Option<String>,
    score: Option<f32>,
}

impl Hand {
    pub fn new(keypoints: Vec<Point2<f32>>, keypoints_3d: Option<Vec<Point3<f32>>>) -> Result<Self> {
        check_count(keypoints.len())?;
        if let Some(points) = &keypoints_3d {
            check_count(points.len())?;
        }
        Ok(Self {
            keypoints,
            keypoints_3d,
            handedness: None,
            score: None,
        })
    }

    pub fn with_handedness(mut self, handedness: impl Into<String>) -> Self {
        self.handedness = Some(handedness.into());
        self
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    pub fn keypoints(&self) -> &[Point2<f32>] {
        &self.keypoints
    }

    pub fn keypoints_3d(&self) -> Option<&[Point3<f32>]> {
        self.keypoints_3d.as_deref()
    }

    pub fn handedness(&self) -> Option<&str> {
        self.handedness.as_deref()
    }

    pub fn score(&self) -> Option<f32> {
        self.score
    }

    /// Index finger tip in screen pixels
    pub fn index_finger_tip(&self) -> Point2<f32> {
        self.keypoints[INDEX_FINGER_TIP]
    }
}

fn check_count(actual: usize) -> Result<()> {
    if actual == LANDMARK_COUNT {
        Ok(())
    } else {
        Err(HandError::KeypointCount { expected: LANDMARK_COUNT, actual })
    }
}

/// Wire form of a hand, as written by recorders
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HandRecord {
    pub keypoints: Vec<[f32; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keypoints_3d: Option<Vec<[f32; 3]>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handedness: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl TryFrom<HandRecord> for Hand {
    type Error = HandError;

    fn try_from(record: HandRecord) -> Result<Self> {
        let keypoints = record.keypoints
            .iter()
            .map(|&[x, y]| Point2::new(x, y))
            .collect();
        let keypoints_3d = record.keypoints_3d.map(|points| {
            points
                .iter()
                .map(|&[x, y, z]| Point3::new(x, y, z))
                .collect()
        });

        let mut hand = Hand::new(keypoints, keypoints_3d)?;
        hand.handedness = record.handedness;
        hand.score = record.score;
        Ok(hand)
    }
}

impl From<&Hand> for HandRecord {
    fn from(hand: &Hand) -> Self {
        Self {
            keypoints: hand.keypoints.iter().map(|p| [p.x, p.y]).collect(),
            keypoints_3d: hand.keypoints_3d
                .as_ref()
                .map(|points| points.iter().map(|p| [p.x, p.y, p.z]).collect()),
            handedness: hand.handedness.clone(),
            score: hand.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_wrong_keypoint_count() {
        let result = Hand::new(vec![Point2::origin(); 20], None);
        assert!(matches!(
            result,
            Err(HandError::KeypointCount { expected: 21, actual: 20 })
        ));

        let result = Hand::new(vec![Point2::origin(); 21], Some(vec![Point3::origin(); 5]));
        assert!(matches!(result, Err(HandError::KeypointCount { actual: 5, .. })));
    }

    #[test]
    fn test_index_finger_tip() {
        let mut keypoints = vec![Point2::origin(); 21];
        keypoints[INDEX_FINGER_TIP] = Point2::new(320.0, 240.0);
        let hand = Hand::new(keypoints, None).unwrap();
        assert_eq!(hand.index_finger_tip(), Point2::new(320.0, 240.0));
        assert!(hand.keypoints_3d().is_none());
    }

    #[test]
    fn test_record_conversion_keeps_metadata() {
        let record = HandRecord {
            keypoints: vec![[1.0, 2.0]; 21],
            keypoints_3d: Some(vec![[0.0, 0.0, 0.1]; 21]),
            handedness: Some("Left".to_string()),
            score: Some(0.9),
        };
        let hand = Hand::try_from(record.clone()).unwrap();
        assert_eq!(hand.handedness(), Some("Left"));
        assert_eq!(hand.score(), Some(0.9));
        assert_eq!(HandRecord::from(&hand), record);
    }
}
