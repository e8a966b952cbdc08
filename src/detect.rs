//! Hough circle detection over the edge map.

use opencv::{
    core::{Vec3f, Vector},
    imgproc,
    prelude::*,
};

use crate::config::HoughParams;
use crate::error::{Error, Result};

/// One raw accumulator row as reported by the transform, nominally
/// `[center_x, center_y, radius]`. The raw layout is kept so that an
/// unreadable row can be skipped downstream instead of aborting the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CircleRecord(pub Vec<f32>);

/// A pip candidate in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectedCircle {
    pub center_x: f32,
    pub center_y: f32,
    pub radius: f32,
}

impl TryFrom<&CircleRecord> for DetectedCircle {
    type Error = Error;

    fn try_from(record: &CircleRecord) -> Result<Self> {
        match record.0.as_slice() {
            &[center_x, center_y, radius] => Ok(DetectedCircle {
                center_x,
                center_y,
                radius,
            }),
            _ => Err(Error::MalformedRecord {
                len: record.0.len(),
            }),
        }
    }
}

/// Runs the gradient Hough transform over a single-channel edge image.
///
/// An empty result is valid (no pips in view). Radii are bounded by
/// `params.min_radius ..= params.max_radius`; the radius range encodes the
/// physical pip size at the calibrated camera distance, so it is narrow on
/// purpose. No deduplication happens here beyond the transform's own
/// minimum-center-distance suppression.
pub fn detect_circles(edges: &Mat, params: &HoughParams) -> Result<Vec<CircleRecord>> {
    if edges.rows() == 0 || edges.cols() == 0 {
        return Err(Error::Precondition(
            "circle detection called on an empty edge image".to_string(),
        ));
    }

    let mut circles = Vector::<Vec3f>::new();
    imgproc::hough_circles(
        edges,
        &mut circles,
        imgproc::HOUGH_GRADIENT,
        params.dp,
        params.min_dist,
        params.param1,
        params.param2,
        params.min_radius,
        params.max_radius,
    )?;

    Ok(circles
        .iter()
        .map(|row| CircleRecord(row.0.to_vec()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_record_parses() {
        let record = CircleRecord(vec![12.5, 40.0, 15.0]);
        let circle = DetectedCircle::try_from(&record).unwrap();
        assert_eq!(circle.center_x, 12.5);
        assert_eq!(circle.center_y, 40.0);
        assert_eq!(circle.radius, 15.0);
    }

    #[test]
    fn test_two_component_record_is_malformed() {
        let record = CircleRecord(vec![12.5, 40.0]);
        match DetectedCircle::try_from(&record) {
            Err(Error::MalformedRecord { len: 2 }) => {}
            other => panic!("expected malformed record, got {other:?}"),
        }
    }

    #[test]
    fn test_oversized_record_is_malformed() {
        let record = CircleRecord(vec![1.0, 2.0, 3.0, 4.0]);
        match DetectedCircle::try_from(&record) {
            Err(Error::MalformedRecord { len: 4 }) => {}
            other => panic!("expected malformed record, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_edge_image_is_precondition() {
        let edges = Mat::default();
        match detect_circles(&edges, &HoughParams::default()) {
            Err(Error::Precondition(_)) => {}
            other => panic!("expected precondition error, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_edge_image_yields_no_circles() {
        use opencv::core::{Scalar, CV_8UC1};

        let edges =
            Mat::new_rows_cols_with_default(240, 320, CV_8UC1, Scalar::all(0.)).unwrap();
        let records = detect_circles(&edges, &HoughParams::default()).unwrap();
        assert!(records.is_empty());
    }
}
