//! Per-frame analysis: ingestion, preprocessing, detection, annotation.

use opencv::{
    core::{Scalar, CV_8UC1, CV_8UC3},
    prelude::*,
};
use tracing::debug;

use crate::annotate;
use crate::config::PipelineConfig;
use crate::detect;
use crate::error::{Error, Result};
use crate::frame::NativeFrame;
use crate::preprocess;

/// Geometry established on the first frame of a session and reused for its
/// lifetime. Frame dimensions and rotation are assumed stable once seen.
struct SessionGeometry {
    rotation_degrees: i32,
    /// NV21 assembly scratch for plane ingestion.
    nv21: Mat,
    /// The shared RGB/display buffer. Single-writer, overwritten per call.
    rgb: Mat,
}

impl SessionGeometry {
    fn allocate(width: i32, height: i32, rotation_degrees: i32) -> Result<Self> {
        Ok(SessionGeometry {
            rotation_degrees,
            nv21: Mat::new_rows_cols_with_default(
                height + height / 2,
                width,
                CV_8UC1,
                Scalar::all(0.),
            )?,
            rgb: Mat::new_rows_cols_with_default(height, width, CV_8UC3, Scalar::all(0.))?,
        })
    }
}

/// The output of one analyzed frame.
///
/// `frame` borrows the analyzer's shared display buffer, which the next
/// `analyze` call overwrites. A consumer that needs to keep the image must
/// copy it before analyzing again; the borrow makes that a compile-time
/// rule rather than a comment.
pub struct AnalysisResult<'a> {
    pub frame: &'a Mat,
    pub pip_count: usize,
    pub rotation_degrees: i32,
}

/// Runs the full detection pipeline once per incoming frame.
///
/// Stateless across invocations apart from [`SessionGeometry`], which is
/// initialized lazily on the first frame.
pub struct FrameAnalyzer {
    config: PipelineConfig,
    geometry: Option<SessionGeometry>,
    edges: Mat,
    annotated: Mat,
}

impl FrameAnalyzer {
    pub fn new(config: PipelineConfig) -> Self {
        FrameAnalyzer {
            config,
            geometry: None,
            edges: Mat::default(),
            annotated: Mat::default(),
        }
    }

    /// Analyzes one native camera frame.
    ///
    /// Runs synchronously to completion; there is no partial or cancelable
    /// state. Precondition failures mark this frame as failed and leave the
    /// analyzer usable for the next one.
    pub fn analyze(&mut self, frame: &NativeFrame) -> Result<AnalysisResult<'_>> {
        frame.validate()?;

        if self.geometry.is_none() {
            debug!(
                width = frame.width,
                height = frame.height,
                rotation = frame.rotation_degrees,
                "allocating shared buffers on first frame"
            );
            self.geometry = Some(SessionGeometry::allocate(
                frame.width,
                frame.height,
                frame.rotation_degrees,
            )?);
        }
        let geometry = self
            .geometry
            .as_mut()
            .ok_or_else(|| Error::Precondition("shared buffers not allocated".to_string()))?;

        if geometry.rgb.cols() != frame.width || geometry.rgb.rows() != frame.height {
            return Err(Error::Precondition(format!(
                "frame geometry changed mid-session: buffer is {}x{}, frame is {}x{}",
                geometry.rgb.cols(),
                geometry.rgb.rows(),
                frame.width,
                frame.height
            )));
        }

        frame.to_rgb(&mut geometry.nv21, &mut geometry.rgb)?;

        preprocess::edge_map(&geometry.rgb, &self.config.preprocess, &mut self.edges)?;
        let records = detect::detect_circles(&self.edges, &self.config.hough)?;
        // The count reflects detector output, not drawing success.
        let pip_count = records.len();

        let skipped = annotate::render(&self.edges, &records, &mut self.annotated)?;
        if skipped > 0 {
            debug!(skipped, pip_count, "annotated frame with skipped records");
        }

        self.annotated.copy_to(&mut geometry.rgb)?;

        Ok(AnalysisResult {
            frame: &geometry.rgb,
            pip_count,
            rotation_degrees: geometry.rotation_degrees,
        })
    }

    /// Analyzes a frame that is already interleaved 8-bit RGB.
    ///
    /// Entry point for still-image tooling and tests; skips plane ingestion
    /// but shares every later stage and the same cached geometry.
    pub fn analyze_rgb(&mut self, rgb: &Mat) -> Result<AnalysisResult<'_>> {
        if rgb.rows() == 0 || rgb.cols() == 0 {
            return Err(Error::Precondition("empty input frame".to_string()));
        }
        if rgb.typ() != CV_8UC3 {
            return Err(Error::Precondition(format!(
                "expected an 8-bit 3-channel frame, got mat type {}",
                rgb.typ()
            )));
        }

        if self.geometry.is_none() {
            self.geometry = Some(SessionGeometry::allocate(rgb.cols(), rgb.rows(), 0)?);
        }
        let geometry = self
            .geometry
            .as_mut()
            .ok_or_else(|| Error::Precondition("shared buffers not allocated".to_string()))?;

        if geometry.rgb.cols() != rgb.cols() || geometry.rgb.rows() != rgb.rows() {
            return Err(Error::Precondition(format!(
                "frame geometry changed mid-session: buffer is {}x{}, frame is {}x{}",
                geometry.rgb.cols(),
                geometry.rgb.rows(),
                rgb.cols(),
                rgb.rows()
            )));
        }

        preprocess::edge_map(rgb, &self.config.preprocess, &mut self.edges)?;
        let records = detect::detect_circles(&self.edges, &self.config.hough)?;
        let pip_count = records.len();

        let skipped = annotate::render(&self.edges, &records, &mut self.annotated)?;
        if skipped > 0 {
            debug!(skipped, pip_count, "annotated frame with skipped records");
        }

        self.annotated.copy_to(&mut geometry.rgb)?;

        Ok(AnalysisResult {
            frame: &geometry.rgb,
            pip_count,
            rotation_degrees: geometry.rotation_degrees,
        })
    }
}
