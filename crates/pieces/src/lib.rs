//! # Piece Segmentation Library
//!
//! Finds physical objects ("pieces") lying in a camera frame and cuts each
//! one out as an alpha-masked crop.
//!
//! ## Core Features
//!
//! - **Trait-based Architecture**: swap preprocessing or contour extraction by implementing traits
//! - **Reduced-resolution detection**: contours are traced on a downscaled copy, boxes are mapped back
//! - **Noise rejection**: simple contours and small boxes are dropped
//! - **Masked crops**: every piece carries the source pixels inside its contour
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pieces::PieceDetector;
//!
//! let mut detector = PieceDetector::builder()
//!     .process_ratio(0.2)
//!     .build()?;
//!
//! let frame = image::open("table.png")?.to_rgba8();
//! for piece in detector.process(&frame)? {
//!     println!("{:?}", piece.bounding_box);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod error;
pub mod types;
pub mod traits;
pub mod algorithms;
pub mod pipeline;
pub mod scaler;

// Re-exports for convenience
pub use error::{PiecesError, Result};
pub use types::{BorderKind, BoundingBox, Contour, Frame, Piece};
pub use traits::*;
pub use algorithms::*;
pub use pipeline::{PieceDetector, builder::{PieceDetectorBuilder, SegmentationSettings}};
pub use scaler::FrameScaler;
