use std::{collections::VecDeque, future::Future, path::Path};

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use crate::{
    error::{HandError, Result},
    pose::{Hand, HandRecord},
};

/// Source of per-frame hand poses.
///
/// The estimator is a black box: given a frame it reports zero or more
/// hands. Estimation may suspend; callers await it before touching the next
/// frame.
pub trait HandTracker {
    fn estimate_hands(&mut self, frame: &RgbaImage) -> impl Future<Output = Result<Vec<Hand>>> + Send;
}

/// One line of a hand recording
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordedFrame {
    #[serde(default)]
    pub hands: Vec<HandRecord>,
}

/// Replays previously recorded hand poses, one entry per frame.
///
/// Once the recording runs out every further frame reports no hands.
#[derive(Debug, Clone, Default)]
pub struct ReplayHandTracker {
    frames: VecDeque<Vec<Hand>>,
    min_score: f32,
}

impl ReplayHandTracker {
    pub fn from_frames(frames: Vec<Vec<Hand>>) -> Self {
        Self {
            frames: frames.into(),
            min_score: 0.0,
        }
    }

    /// Parse a JSON-lines recording. Blank lines are ignored; hands with the
    /// wrong number of keypoints are dropped with a warning.
    pub fn from_jsonl(content: &str) -> Result<Self> {
        let mut frames = Vec::new();

        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let recorded: RecordedFrame = serde_json::from_str(line)
                .map_err(|source| HandError::Recording { line: index + 1, source })?;

            let mut hands = Vec::with_capacity(recorded.hands.len());
            for record in recorded.hands {
                match Hand::try_from(record) {
                    Ok(hand) => hands.push(hand),
                    Err(e) => warn!("Skipping hand on line {}: {}", index + 1, e),
                }
            }
            frames.push(hands);
        }

        debug!(frames = frames.len(), "loaded hand recording");
        Ok(Self::from_frames(frames))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_jsonl(&content)
    }

    /// Hands scoring below `min_score` are not reported. Hands without a
    /// score always are.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score.clamp(0.0, 1.0);
        self
    }

    /// Frames left in the recording
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl HandTracker for ReplayHandTracker {
    async fn estimate_hands(&mut self, _frame: &RgbaImage) -> Result<Vec<Hand>> {
        let hands = self.frames.pop_front().unwrap_or_default();
        let min_score = self.min_score;
        Ok(hands
            .into_iter()
            .filter(|hand| hand.score().is_none_or(|score| score >= min_score))
            .collect())
    }
}
