//! Conditions an RGB frame for geometric circle extraction.

use opencv::{core, core::Size, imgproc, prelude::*};

use crate::config::PreprocessParams;
use crate::error::{Error, Result};

/// Produces the edge map the detector votes over.
///
/// Stage order is fixed: grayscale conversion, Gaussian blur, Canny.
/// Reordering changes detector sensitivity and counts as a behavioral
/// regression. The grayscale intermediate is created fresh per call;
/// `out` receives a single-channel edge image of the input dimensions.
pub fn edge_map(rgb: &Mat, params: &PreprocessParams, out: &mut Mat) -> Result<()> {
    if rgb.rows() == 0 || rgb.cols() == 0 {
        return Err(Error::Precondition(
            "preprocessing called on an empty frame".to_string(),
        ));
    }

    let mut gray = Mat::default();
    imgproc::cvt_color(rgb, &mut gray, imgproc::COLOR_RGB2GRAY, 0)?;

    let mut blurred = Mat::default();
    imgproc::gaussian_blur(
        &gray,
        &mut blurred,
        Size::new(params.blur_kernel, params.blur_kernel),
        params.blur_sigma,
        params.blur_sigma,
        core::BORDER_DEFAULT,
    )?;

    imgproc::canny(&blurred, out, params.canny_low, params.canny_high, 3, false)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Rect, Scalar, CV_8UC3};

    #[test]
    fn test_uniform_frame_has_no_edges() {
        let rgb =
            Mat::new_rows_cols_with_default(120, 160, CV_8UC3, Scalar::all(255.)).unwrap();
        let mut edges = Mat::default();
        edge_map(&rgb, &PreprocessParams::default(), &mut edges).unwrap();

        assert_eq!(edges.rows(), 120);
        assert_eq!(edges.cols(), 160);
        assert_eq!(core::count_non_zero(&edges).unwrap(), 0);
    }

    #[test]
    fn test_hard_contrast_boundary_survives_thresholds() {
        let mut rgb =
            Mat::new_rows_cols_with_default(120, 160, CV_8UC3, Scalar::all(255.)).unwrap();
        imgproc::rectangle(
            &mut rgb,
            Rect::new(40, 30, 80, 60),
            Scalar::all(0.),
            imgproc::FILLED,
            imgproc::LINE_8,
            0,
        )
        .unwrap();

        let mut edges = Mat::default();
        edge_map(&rgb, &PreprocessParams::default(), &mut edges).unwrap();
        assert!(core::count_non_zero(&edges).unwrap() > 0);

        // The edge response stays on the rectangle boundary.
        let center = edges.at_2d::<u8>(60, 80).unwrap();
        assert_eq!(*center, 0);
    }

    #[test]
    fn test_empty_frame_is_precondition() {
        let rgb = Mat::default();
        let mut edges = Mat::default();
        match edge_map(&rgb, &PreprocessParams::default(), &mut edges) {
            Err(Error::Precondition(_)) => {}
            other => panic!("expected precondition error, got {other:?}"),
        }
    }
}
