//! Recoverable error taxonomy for the recognition pipeline.
//!
//! Every variant is a per-request failure the caller can act on; none is
//! process-fatal. Display strings are user-coachable (what to fix), and
//! the serialized form carries a stable `kind` tag for API consumers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecognitionError {
    #[error("invalid image: {reason}")]
    InvalidImage { reason: String },

    #[error("no face detected in image")]
    NoFaceDetected,

    #[error("multiple faces detected ({count}); use a photo with a single face or enable multiple face detection")]
    MultipleFaces { count: usize },

    #[error("image quality too low: {score:.3} < {threshold:.3}")]
    LowQuality { score: f32, threshold: f32 },

    #[error("failed to extract face encoding")]
    EncodingFailed,

    #[error("liveness detection failed: {score:.3}")]
    LivenessFailed { score: f32 },

    #[error("no enrolled identities for this tenant")]
    NoEnrolledIdentities,

    #[error("face recognition backend unavailable")]
    BackendUnavailable,

    #[error("invalid settings: {reason}")]
    InvalidSettings { reason: String },
}

impl RecognitionError {
    pub fn invalid_image(reason: impl Into<String>) -> Self {
        Self::InvalidImage {
            reason: reason.into(),
        }
    }

    pub fn invalid_settings(reason: impl Into<String>) -> Self {
        Self::InvalidSettings {
            reason: reason.into(),
        }
    }

    /// Stable machine-readable tag, matching the serialized `kind` field.
    pub fn kind(&self) -> &'static str {
        match self {
            RecognitionError::InvalidImage { .. } => "invalid_image",
            RecognitionError::NoFaceDetected => "no_face_detected",
            RecognitionError::MultipleFaces { .. } => "multiple_faces",
            RecognitionError::LowQuality { .. } => "low_quality",
            RecognitionError::EncodingFailed => "encoding_failed",
            RecognitionError::LivenessFailed { .. } => "liveness_failed",
            RecognitionError::NoEnrolledIdentities => "no_enrolled_identities",
            RecognitionError::BackendUnavailable => "backend_unavailable",
            RecognitionError::InvalidSettings { .. } => "invalid_settings",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_actionable() {
        let err = RecognitionError::LowQuality {
            score: 0.42,
            threshold: 0.70,
        };
        assert_eq!(err.to_string(), "image quality too low: 0.420 < 0.700");

        let err = RecognitionError::MultipleFaces { count: 3 };
        assert!(err.to_string().contains("3"));
    }

    #[test]
    fn test_serialized_kind_tag() {
        let err = RecognitionError::NoFaceDetected;
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "no_face_detected");
        assert_eq!(err.kind(), "no_face_detected");
    }
}
