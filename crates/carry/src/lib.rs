//! # Piece Carry
//!
//! Pick up a physical object seen by the camera by pinching near it, carry a
//! cut-out of it around on the fingertip, and drop it by opening the pinch.
//!
//! [`Session`] ties the pieces together: a [`pieces::PieceDetector`] that runs
//! every [`SEGMENTATION_STRIDE`] frames, a [`hand::HandTracker`], the
//! [`PieceTracker`] hold state machine and the [`Compositor`].
//!
//! ```rust,no_run
//! use carry::{Compositor, ImageSequenceSink, ImageSequenceSource, Session};
//! use hand::{PinchDetector, ReplayHandTracker};
//! use pieces::PieceDetector;
//!
//! # async fn demo() -> carry::Result<()> {
//! let mut session = Session::new(
//!     PieceDetector::builder().process_ratio(0.2).build()?,
//!     ReplayHandTracker::from_file("hands.jsonl")?,
//!     PinchDetector::default(),
//!     Compositor::default(),
//! );
//! let mut source = ImageSequenceSource::open("frames")?;
//! let mut sink = ImageSequenceSink::create("out")?;
//! let summary = session.run(&mut source, &mut sink).await?;
//! println!("{} pieces picked up", summary.acquisitions);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod render;
pub mod session;
pub mod source;
pub mod tracker;

pub use error::{CarryError, Result};
pub use render::{Compositor, RenderSettings};
pub use session::{FrameOutput, RunSummary, SEGMENTATION_STRIDE, Session};
pub use source::{FrameSink, FrameSource, ImageSequenceSink, ImageSequenceSource};
pub use tracker::{ACQUISITION_DISTANCE, HeldPiece, HoldState, HoldTransition, PieceTracker};
