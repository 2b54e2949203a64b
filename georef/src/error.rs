//! Error types for fitting, transform application and CRS scoring.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the georeferencing core.
///
/// Every failure is reported to the immediate caller; nothing in the crate
/// swallows an inner error or retries.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Paired point sequences differ in length or are empty: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("Insufficient control points: found {found}, need at least {required}")]
    InsufficientPoints { found: usize, required: usize },

    #[error("Unknown transform mode '{0}' (expected affine, similar or noshear)")]
    UnknownMode(String),

    #[error("Unknown y-axis mode '{0}' (expected same, opposite or auto)")]
    UnknownYAxisMode(String),

    #[error("Least-squares normal matrix is singular (collinear or coincident control points)")]
    SingularFit,

    #[error("Degenerate control point geometry: all image points coincide")]
    DegenerateGeometry,

    #[error("Affine transform is not invertible (determinant {determinant:e})")]
    SingularTransform { determinant: f64 },

    #[error("CRS '{0}' is not defined and has no entry in the definition table")]
    UnknownCrs(String),

    #[error("Invalid projection definition for '{crs}': {reason}")]
    InvalidDefinition { crs: String, reason: String },

    #[error("CRS '{0}' is already registered with a different definition")]
    ConflictingDefinition(String),

    #[error("Projection from '{from}' to '{to}' failed: {reason}")]
    Projection {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No candidate CRS supplied")]
    NoCandidates,

    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Format(#[from] common::FileFormatError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Checks that two sequences are paired: equal and non-zero length.
pub(crate) fn ensure_paired<A, B>(left: &[A], right: &[B]) -> Result<usize> {
    if left.len() != right.len() || left.is_empty() {
        return Err(Error::LengthMismatch {
            left: left.len(),
            right: right.len(),
        });
    }
    Ok(left.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_mismatch_message() {
        let err = Error::LengthMismatch { left: 3, right: 4 };
        assert_eq!(
            err.to_string(),
            "Paired point sequences differ in length or are empty: 3 vs 4"
        );
    }

    #[test]
    fn test_ensure_paired() {
        assert_eq!(ensure_paired(&[1, 2], &[3, 4]).unwrap(), 2);
        assert!(matches!(
            ensure_paired(&[1, 2], &[3]),
            Err(Error::LengthMismatch { left: 2, right: 1 })
        ));
        assert!(matches!(
            ensure_paired::<i32, i32>(&[], &[]),
            Err(Error::LengthMismatch { left: 0, right: 0 })
        ));
    }
}
