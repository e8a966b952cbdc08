//! Marker drawing over accepted detections.

use opencv::{
    core::{Point, Scalar},
    imgproc,
    prelude::*,
};
use tracing::warn;

use crate::detect::{CircleRecord, DetectedCircle};
use crate::error::Result;

/// Solid green, the marker color for accepted pips.
fn highlight_color() -> Scalar {
    Scalar::new(0., 255., 0., 0.)
}

/// Converts the edge image back to a displayable 3-channel image and draws
/// a filled marker over every readable detection.
///
/// A record that cannot be parsed is skipped and the rest are still drawn;
/// the pip count is taken from the detector output upstream, so skips here
/// never change it. Returns how many records were skipped.
pub fn render(edges: &Mat, records: &[CircleRecord], out: &mut Mat) -> Result<usize> {
    imgproc::cvt_color(edges, out, imgproc::COLOR_GRAY2BGR, 0)?;

    let mut skipped = 0;
    for record in records {
        let circle = match DetectedCircle::try_from(record) {
            Ok(circle) => circle,
            Err(err) => {
                warn!(error = %err, "skipping unreadable detection record");
                skipped += 1;
                continue;
            }
        };

        imgproc::circle(
            out,
            Point::new(circle.center_x as i32, circle.center_y as i32),
            circle.radius as i32,
            highlight_color(),
            imgproc::FILLED,
            imgproc::LINE_8,
            0,
        )?;
    }

    Ok(skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Vec3b, CV_8UC1};

    fn blank_edges() -> Mat {
        Mat::new_rows_cols_with_default(120, 160, CV_8UC1, Scalar::all(0.)).unwrap()
    }

    fn marker_at(image: &Mat, x: i32, y: i32) -> bool {
        let pixel = image.at_2d::<Vec3b>(y, x).unwrap();
        pixel[0] == 0 && pixel[1] == 255 && pixel[2] == 0
    }

    #[test]
    fn test_markers_are_filled_at_detected_centers() {
        let records = vec![
            CircleRecord(vec![40.0, 60.0, 12.0]),
            CircleRecord(vec![120.0, 60.0, 15.0]),
        ];
        let mut out = Mat::default();
        let skipped = render(&blank_edges(), &records, &mut out).unwrap();

        assert_eq!(skipped, 0);
        // Filled markers cover the center, not just the outline.
        assert!(marker_at(&out, 40, 60));
        assert!(marker_at(&out, 45, 60));
        assert!(marker_at(&out, 120, 60));
    }

    #[test]
    fn test_malformed_record_does_not_abort_remaining() {
        let records = vec![
            CircleRecord(vec![40.0, 60.0, 12.0]),
            CircleRecord(vec![1.0, 2.0]),
            CircleRecord(vec![120.0, 60.0, 15.0]),
        ];
        let mut out = Mat::default();
        let skipped = render(&blank_edges(), &records, &mut out).unwrap();

        assert_eq!(skipped, 1);
        assert!(marker_at(&out, 40, 60));
        assert!(marker_at(&out, 120, 60));
    }

    #[test]
    fn test_no_records_leaves_image_unmarked() {
        let mut out = Mat::default();
        let skipped = render(&blank_edges(), &[], &mut out).unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(out.rows(), 120);
        assert_eq!(out.cols(), 160);
        assert!(!marker_at(&out, 80, 60));
    }
}
