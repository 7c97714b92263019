//! # Hand Pose and Gesture Library
//!
//! Data model for tracked hands (21 landmarks in screen space, optionally 21
//! more in a depth-relative space), the [`HandTracker`] capability that
//! produces them, and the pinch test used as the grab trigger.
//!
//! ```rust
//! use hand::{Hand, PinchDetector};
//! use nalgebra::Point2;
//!
//! let hand = Hand::new(vec![Point2::origin(); 21], None)?;
//! // no depth information: never pinching
//! assert!(!PinchDetector::default().is_hand_pinching(&hand));
//! # Ok::<(), hand::HandError>(())
//! ```

pub mod error;
pub mod gesture;
pub mod landmarks;
pub mod pose;
pub mod tracker;

pub use error::{HandError, Result};
pub use gesture::PinchDetector;
pub use pose::{Hand, HandRecord};
pub use tracker::{HandTracker, RecordedFrame, ReplayHandTracker};
