//! Exhaustive gallery matching.
//!
//! Every candidate is scored; there is no early exit or index. The
//! best match is therefore the true best regardless of gallery size,
//! and tie-breaking depends only on snapshot order.

use common::errors::RecognitionError;
use common::faces::{FaceEncoding, GallerySnapshot};
use common::settings::RecognitionSettings;
use face_engine::backend::FaceBackend;

/// The winning gallery candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    pub identity_ref: String,
    /// Similarity in [0, 1].
    pub similarity: f32,
    /// 1 − similarity.
    pub distance: f32,
}

/// Result of one probe-versus-gallery scan.
///
/// Two independent gates apply: the distance bound filters candidates,
/// then the confidence threshold gates acceptance of the filtered best.
/// A candidate can be the closest match and still not be accepted.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub matched: bool,
    pub best: Option<MatchCandidate>,
}

/// Scan the full gallery for the probe's best match.
pub fn match_probe(
    backend: &dyn FaceBackend,
    probe: &FaceEncoding,
    gallery: &GallerySnapshot,
    settings: &RecognitionSettings,
) -> Result<MatchOutcome, RecognitionError> {
    if gallery.is_empty() {
        return Err(RecognitionError::NoEnrolledIdentities);
    }

    let mut best: Option<MatchCandidate> = None;

    for entry in gallery.iter() {
        let similarity = backend.compare(probe, &entry.encoding);
        let distance = 1.0 - similarity;

        if distance > settings.max_recognition_distance {
            continue;
        }

        let is_better = match &best {
            Some(current) => similarity > current.similarity,
            None => true,
        };
        if is_better {
            best = Some(MatchCandidate {
                identity_ref: entry.identity_ref.clone(),
                similarity,
                distance,
            });
        }
    }

    let matched = best
        .as_ref()
        .map(|candidate| candidate.similarity >= settings.confidence_threshold)
        .unwrap_or(false);

    Ok(MatchOutcome { matched, best })
}
