use std::sync::Arc;

use nalgebra::Point2;
use pieces::Piece;
use strum::{Display, IntoStaticStr};
use tracing::{info, trace};

/// A piece is picked up only when the fingertip is closer than this to the
/// top-left corner of its bounding box (frame pixels).
pub const ACQUISITION_DISTANCE: f32 = 100.0;

/// The piece attached to the hand.
///
/// `piece` is the snapshot taken at acquisition; later segmentation passes
/// never change it. `id` is unique for the lifetime of the tracker.
#[derive(Debug, Clone)]
pub struct HeldPiece {
    pub id: u64,
    pub piece: Arc<Piece>,
}

#[derive(Debug, Clone, Default)]
pub enum HoldState {
    #[default]
    Idle,
    Holding(HeldPiece),
}

impl HoldState {
    pub fn is_holding(&self) -> bool {
        matches!(self, Self::Holding(_))
    }

    pub fn held(&self) -> Option<&HeldPiece> {
        match self {
            Self::Holding(held) => Some(held),
            Self::Idle => None,
        }
    }
}

/// What a single [`PieceTracker::update`] did to the hold state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum HoldTransition {
    Unchanged,
    Acquired { id: u64 },
    Released { id: u64 },
}

/// Pick / hold / release state machine.
#[derive(Debug, Clone, Default)]
pub struct PieceTracker {
    last_pieces: Vec<Arc<Piece>>,
    hold: HoldState,
    next_id: u64,
}

impl PieceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hold(&self) -> &HoldState {
        &self.hold
    }

    pub fn held_piece(&self) -> Option<&HeldPiece> {
        self.hold.held()
    }

    pub fn is_holding(&self) -> bool {
        self.hold.is_holding()
    }

    /// Pieces from the most recent segmentation pass
    pub fn last_pieces(&self) -> &[Arc<Piece>] {
        &self.last_pieces
    }

    /// Advance one frame.
    ///
    /// `new_pieces` is `Some` only on frames that ran a segmentation pass;
    /// otherwise the previous list stays in use. Releasing happens on the
    /// first frame without a pinch. While holding, neither new pieces nor
    /// fingertip movement change which piece is held.
    pub fn update(
        &mut self,
        new_pieces: Option<Vec<Piece>>,
        fingertip: Point2<f32>,
        pinching: bool,
    ) -> HoldTransition {
        if let Some(pieces) = new_pieces {
            self.last_pieces = pieces.into_iter().map(Arc::new).collect();
        }

        if !pinching {
            return match std::mem::take(&mut self.hold) {
                HoldState::Holding(held) => {
                    info!(id = held.id, "released piece");
                    HoldTransition::Released { id: held.id }
                }
                HoldState::Idle => HoldTransition::Unchanged,
            };
        }

        if self.hold.is_holding() {
            return HoldTransition::Unchanged;
        }

        let Some((piece, distance)) = self.nearest_piece(fingertip) else {
            return HoldTransition::Unchanged;
        };
        if distance >= ACQUISITION_DISTANCE {
            trace!(distance, "nearest piece out of reach");
            return HoldTransition::Unchanged;
        }

        self.next_id += 1;
        let id = self.next_id;
        info!(
            id,
            distance,
            x = piece.bounding_box.x,
            y = piece.bounding_box.y,
            "acquired piece"
        );
        self.hold = HoldState::Holding(HeldPiece { id, piece });
        HoldTransition::Acquired { id }
    }

    /// Piece whose box corner is closest to `fingertip`, with that distance
    fn nearest_piece(&self, fingertip: Point2<f32>) -> Option<(Arc<Piece>, f32)> {
        self.last_pieces
            .iter()
            .map(|piece| {
                let [x, y] = piece.bounding_box.top_left();
                (piece, nalgebra::distance(&Point2::new(x, y), &fingertip))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(piece, distance)| (Arc::clone(piece), distance))
    }
}
