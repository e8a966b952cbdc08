//! Counts the pips on a domino tile from a single camera frame.
//!
//! The pipeline is purely classical: grayscale conversion, Gaussian blur,
//! Canny edge extraction, then a gradient Hough circle transform tuned to
//! the physical pip size at the calibrated camera distance. Camera capture
//! and display are external collaborators; they supply [`NativeFrame`]s and
//! consume [`AnalysisResult`]s.

pub mod analyzer;
pub mod annotate;
pub mod config;
pub mod detect;
pub mod error;
pub mod frame;
pub mod preprocess;
pub mod session;

pub use analyzer::{AnalysisResult, FrameAnalyzer};
pub use config::{HoughParams, PipelineConfig, PreprocessParams};
pub use detect::{CircleRecord, DetectedCircle};
pub use error::{Error, Result};
pub use frame::{ChromaPlanes, NativeFrame};
pub use session::AnalysisSession;
