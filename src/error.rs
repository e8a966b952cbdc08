//! Error types for the analysis pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Caller-sequencing bug: uninitialized buffers, zero-sized frames,
    /// mis-sized pixel planes. Fatal for the frame, never for the session.
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// A detection record that cannot be read back as (x, y, r).
    /// Recoverable: the circle is skipped and annotation continues.
    #[error("malformed circle record: expected 3 components, found {len}")]
    MalformedRecord { len: usize },

    /// The camera/session collaborator is unavailable (device busy,
    /// permission denied). Retry policy belongs to the collaborator.
    #[error("upstream unavailable: {0}")]
    Upstream(String),

    #[error("opencv: {0}")]
    OpenCv(#[from] opencv::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_display() {
        let err = Error::Precondition("rgb buffer not allocated".to_string());
        assert!(err.to_string().contains("precondition violated"));
        assert!(err.to_string().contains("rgb buffer not allocated"));
    }

    #[test]
    fn test_malformed_record_reports_arity() {
        let err = Error::MalformedRecord { len: 2 };
        assert!(err.to_string().contains("found 2"));
    }

    #[test]
    fn test_from_opencv_error() {
        let cv_err = opencv::Error::new(opencv::core::StsError, "boom".to_string());
        let err: Error = cv_err.into();
        match err {
            Error::OpenCv(_) => {}
            _ => panic!("expected OpenCv variant"),
        }
    }
}
