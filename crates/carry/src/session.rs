use hand::{Hand, HandTracker, PinchDetector};
use image::RgbaImage;
use nalgebra::Point2;
use pieces::PieceDetector;
use tracing::{debug, info};
use crate::{
    error::Result,
    render::Compositor,
    source::{FrameSink, FrameSource},
    tracker::{HoldState, HoldTransition, PieceTracker},
};

/// Segmentation runs on every frame whose index is a multiple of this
pub const SEGMENTATION_STRIDE: u64 = 3;

/// Everything one frame produced
#[derive(Debug, Clone)]
pub struct FrameOutput {
    pub index: u64,
    pub image: RgbaImage,
    pub hold: HoldState,
    pub transition: HoldTransition,
    /// Whether this frame ran a segmentation pass
    pub segmented: bool,
    /// Size of the piece list used for this frame (fresh or stale)
    pub piece_count: usize,
    pub fingertip: Option<Point2<f32>>,
    pub pinching: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub segmentation_passes: u64,
    pub acquisitions: u64,
    pub releases: u64,
}

impl RunSummary {
    fn record(&mut self, output: &FrameOutput) {
        self.frames += 1;
        if output.segmented {
            self.segmentation_passes += 1;
        }
        match output.transition {
            HoldTransition::Acquired { .. } => self.acquisitions += 1,
            HoldTransition::Released { .. } => self.releases += 1,
            HoldTransition::Unchanged => {}
        }
    }
}

/// The per-frame loop: segment (every few frames), track the hand, update
/// the hold state, render.
///
/// Frames are processed strictly one at a time. The hand tracker is the
/// only await point, and the next frame is not touched until the current
/// one has been rendered.
pub struct Session<T: HandTracker> {
    detector: PieceDetector,
    hand_tracker: T,
    pinch: PinchDetector,
    tracker: PieceTracker,
    compositor: Compositor,
    frame_index: u64,
}

impl<T: HandTracker> Session<T> {
    pub fn new(detector: PieceDetector, hand_tracker: T, pinch: PinchDetector, compositor: Compositor) -> Self {
        Self {
            detector,
            hand_tracker,
            pinch,
            tracker: PieceTracker::new(),
            compositor,
            frame_index: 0,
        }
    }

    pub fn tracker(&self) -> &PieceTracker {
        &self.tracker
    }

    /// Index of the next frame to be processed
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub async fn step(&mut self, frame: &RgbaImage) -> Result<FrameOutput> {
        let index = self.frame_index;
        let segmented = index % SEGMENTATION_STRIDE == 0;
        let new_pieces = if segmented {
            Some(self.detector.process(frame)?)
        } else {
            None
        };

        let hands = self.hand_tracker.estimate_hands(frame).await?;
        let hand = hands.first();
        let fingertip = hand.map(Hand::index_finger_tip);
        let pinching = hand.is_some_and(|hand| self.pinch.is_hand_pinching(hand));

        let transition = self.tracker.update(
            new_pieces,
            fingertip.unwrap_or_else(Point2::origin),
            pinching,
        );

        let image = self.compositor.render(
            frame,
            self.tracker.hold(),
            fingertip,
            self.tracker.last_pieces(),
        );

        debug!(
            index,
            segmented,
            pieces = self.tracker.last_pieces().len(),
            hands = hands.len(),
            pinching,
            %transition,
            "frame processed"
        );

        self.frame_index += 1;
        Ok(FrameOutput {
            index,
            image,
            hold: self.tracker.hold().clone(),
            transition,
            segmented,
            piece_count: self.tracker.last_pieces().len(),
            fingertip,
            pinching,
        })
    }

    /// Drive frames from `source` into `sink` until the source runs dry
    pub async fn run<S, K>(&mut self, source: &mut S, sink: &mut K) -> Result<RunSummary>
    where
        S: FrameSource,
        K: FrameSink,
    {
        info!("Running session: {} -> {}", source.description(), sink.description());
        info!("{}", self.detector.info());

        let mut summary = RunSummary::default();
        while let Some(frame) = source.next_frame()? {
            let output = self.step(&frame).await?;
            sink.write_frame(output.index, &output.image)?;
            summary.record(&output);
        }

        info!(
            frames = summary.frames,
            segmentation_passes = summary.segmentation_passes,
            acquisitions = summary.acquisitions,
            releases = summary.releases,
            "session finished"
        );
        Ok(summary)
    }
}
