//! Native frame ingestion and format adaptation.
//!
//! Camera stacks hand over 4:2:0 luma/chroma planes rather than interleaved
//! RGB. `NativeFrame` owns one such frame together with its rotation
//! metadata and converts it into a caller-owned RGB buffer, assembling the
//! planes into a single NV21 matrix so the color conversion is one
//! `cvt_color` call.

use opencv::{
    core::{CV_8UC1, CV_8UC3},
    imgproc,
    prelude::*,
};

use crate::error::{Error, Result};

/// Chroma plane arrangement of a native frame.
///
/// Planar (I420-style) sources deliver separate quarter-resolution U and V
/// planes; NV21-style sources deliver a single interleaved VU plane.
#[derive(Debug, Clone)]
pub enum ChromaPlanes {
    Planar { u: Vec<u8>, v: Vec<u8> },
    InterleavedVu { vu: Vec<u8> },
}

/// One multi-plane camera frame plus its declared geometry.
#[derive(Debug, Clone)]
pub struct NativeFrame {
    pub width: i32,
    pub height: i32,
    /// Display rotation reported by the camera. Informational for the
    /// pipeline; compensation belongs to the display layer.
    pub rotation_degrees: i32,
    pub y: Vec<u8>,
    pub chroma: ChromaPlanes,
}

impl NativeFrame {
    /// Checks the declared geometry against the plane sizes.
    ///
    /// 4:2:0 subsampling needs even dimensions; the luma plane must hold
    /// exactly `width * height` bytes and the chroma planes half that
    /// between them.
    pub fn validate(&self) -> Result<()> {
        if self.width <= 0 || self.height <= 0 {
            return Err(Error::Precondition(format!(
                "zero-sized frame: {}x{}",
                self.width, self.height
            )));
        }
        if self.width % 2 != 0 || self.height % 2 != 0 {
            return Err(Error::Precondition(format!(
                "4:2:0 frame dimensions must be even, got {}x{}",
                self.width, self.height
            )));
        }

        let luma_len = (self.width * self.height) as usize;
        if self.y.len() != luma_len {
            return Err(Error::Precondition(format!(
                "luma plane holds {} bytes, expected {}",
                self.y.len(),
                luma_len
            )));
        }

        let chroma_len = match &self.chroma {
            ChromaPlanes::Planar { u, v } => {
                if u.len() != v.len() {
                    return Err(Error::Precondition(format!(
                        "chroma planes differ in size: u={} v={}",
                        u.len(),
                        v.len()
                    )));
                }
                u.len() + v.len()
            }
            ChromaPlanes::InterleavedVu { vu } => vu.len(),
        };
        if chroma_len != luma_len / 2 {
            return Err(Error::Precondition(format!(
                "chroma planes hold {} bytes, expected {}",
                chroma_len,
                luma_len / 2
            )));
        }

        Ok(())
    }

    /// Writes the planes into `nv21` as one contiguous NV21 image
    /// (luma rows followed by interleaved VU rows).
    pub(crate) fn fill_nv21(&self, nv21: &mut Mat) -> Result<()> {
        let expected_rows = self.height + self.height / 2;
        if nv21.rows() != expected_rows || nv21.cols() != self.width || nv21.typ() != CV_8UC1 {
            return Err(Error::Precondition(format!(
                "nv21 scratch buffer is {}x{}, expected {}x{}",
                nv21.cols(),
                nv21.rows(),
                self.width,
                expected_rows
            )));
        }

        let luma_len = self.y.len();
        let dst = nv21.data_bytes_mut()?;
        dst[..luma_len].copy_from_slice(&self.y);

        match &self.chroma {
            ChromaPlanes::InterleavedVu { vu } => {
                dst[luma_len..].copy_from_slice(vu);
            }
            ChromaPlanes::Planar { u, v } => {
                for (i, (&v_byte, &u_byte)) in v.iter().zip(u.iter()).enumerate() {
                    dst[luma_len + 2 * i] = v_byte;
                    dst[luma_len + 2 * i + 1] = u_byte;
                }
            }
        }

        Ok(())
    }

    /// Converts this frame to interleaved RGB in the shared output buffer.
    ///
    /// Both buffers must already be allocated to this frame's geometry;
    /// converting before the analyzer's warm-up allocation is a
    /// caller-sequencing bug and fails fast. The output buffer is
    /// overwritten on every call.
    pub fn to_rgb(&self, nv21: &mut Mat, rgb: &mut Mat) -> Result<()> {
        self.validate()?;
        if rgb.rows() != self.height || rgb.cols() != self.width || rgb.typ() != CV_8UC3 {
            return Err(Error::Precondition(format!(
                "rgb buffer is {}x{}, expected {}x{}",
                rgb.cols(),
                rgb.rows(),
                self.width,
                self.height
            )));
        }

        self.fill_nv21(nv21)?;
        imgproc::cvt_color(nv21, rgb, imgproc::COLOR_YUV2RGB_NV21, 0)?;

        Ok(())
    }

    /// Builds a planar native frame from a BGR capture.
    ///
    /// Used by tooling that feeds the session from `videoio` so the whole
    /// ingestion path is exercised, not just the RGB tail of the pipeline.
    pub fn from_bgr_mat(bgr: &Mat, rotation_degrees: i32) -> Result<NativeFrame> {
        let width = bgr.cols();
        let height = bgr.rows();
        if width <= 0 || height <= 0 {
            return Err(Error::Precondition("empty capture frame".to_string()));
        }
        if width % 2 != 0 || height % 2 != 0 {
            return Err(Error::Precondition(format!(
                "capture dimensions must be even for 4:2:0, got {}x{}",
                width, height
            )));
        }

        let mut i420 = Mat::default();
        imgproc::cvt_color(bgr, &mut i420, imgproc::COLOR_BGR2YUV_I420, 0)?;

        let data = i420.data_bytes()?;
        let luma_len = (width * height) as usize;
        let chroma_len = luma_len / 4;

        Ok(NativeFrame {
            width,
            height,
            rotation_degrees,
            y: data[..luma_len].to_vec(),
            chroma: ChromaPlanes::Planar {
                u: data[luma_len..luma_len + chroma_len].to_vec(),
                v: data[luma_len + chroma_len..].to_vec(),
            },
        })
    }
}
