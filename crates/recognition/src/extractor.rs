//! Policy-gated extraction: raw image bytes → validated face encoding.

use std::sync::Arc;
use std::time::Instant;

use common::errors::RecognitionError;
use common::faces::{DetectionResult, FaceEncoding, FaceRectangle};
use common::settings::RecognitionSettings;
use face_engine::engine::FaceEngine;
use face_engine::preprocess::{self, PixelImage};

/// Liveness scores below this floor are rejected when anti-spoofing is
/// enabled. Deliberately not tenant-configurable: a security floor, not
/// a tuning knob.
pub const LIVENESS_FLOOR: f32 = 0.5;

/// Successful extraction payload.
#[derive(Debug, Clone)]
pub struct EncodingOutcome {
    pub encoding: FaceEncoding,
    pub face: FaceRectangle,
    pub quality_score: f32,
    pub liveness_score: f32,
    pub processing_time_ms: u64,
}

/// Orchestrates preprocessor and backend under tenant policy gates.
pub struct EncodingExtractor {
    engine: Arc<FaceEngine>,
}

impl EncodingExtractor {
    pub fn new(engine: Arc<FaceEngine>) -> Self {
        Self { engine }
    }

    /// Detection and quality assessment only; zero faces is a completed
    /// result, not an error.
    pub async fn detect(&self, bytes: &[u8]) -> DetectionResult {
        let start = Instant::now();

        let backend = match self.engine.backend().await {
            Ok(backend) => backend,
            Err(e) => return DetectionResult::failed(e, elapsed_ms(start)),
        };

        let image = match PixelImage::decode(bytes) {
            Ok(image) => image,
            Err(e) => return DetectionResult::failed(e, elapsed_ms(start)),
        };

        let quality = backend
            .assess_quality(&image)
            .unwrap_or_else(|| preprocess::assess_quality(&image));
        let faces = backend.detect_faces(&image).await;

        tracing::info!(
            faces = faces.len(),
            quality = quality,
            elapsed_ms = elapsed_ms(start),
            "face detection completed"
        );

        DetectionResult::completed(faces, elapsed_ms(start), quality)
    }

    /// Full extraction pipeline: decode, detect, gate on quality and face
    /// count, pick the largest face, encode, gate on liveness.
    pub async fn extract(
        &self,
        bytes: &[u8],
        settings: &RecognitionSettings,
    ) -> Result<EncodingOutcome, RecognitionError> {
        let start = Instant::now();

        let backend = self.engine.backend().await?;
        let image = PixelImage::decode(bytes)?;

        let faces = backend.detect_faces(&image).await;
        if faces.is_empty() {
            return Err(RecognitionError::NoFaceDetected);
        }

        let quality_score = backend
            .assess_quality(&image)
            .unwrap_or_else(|| preprocess::assess_quality(&image));
        if quality_score < settings.photo_quality_threshold {
            return Err(RecognitionError::LowQuality {
                score: quality_score,
                threshold: settings.photo_quality_threshold,
            });
        }

        if faces.len() > 1 && !settings.enable_multiple_face_detection {
            return Err(RecognitionError::MultipleFaces { count: faces.len() });
        }

        let best_face = select_best_face(&faces);

        let encoding = backend
            .extract_encoding(&image, &best_face)
            .await
            .ok_or(RecognitionError::EncodingFailed)?;
        if encoding.is_empty() {
            return Err(RecognitionError::EncodingFailed);
        }

        let liveness_score = if settings.enable_anti_spoofing {
            let score = backend.detect_liveness(&image, &best_face).await;
            if score < LIVENESS_FLOOR {
                return Err(RecognitionError::LivenessFailed { score });
            }
            score
        } else {
            1.0
        };

        let processing_time_ms = elapsed_ms(start);
        tracing::info!(
            dimensions = encoding.dim(),
            liveness = liveness_score,
            quality = quality_score,
            elapsed_ms = processing_time_ms,
            "face encoding extracted"
        );

        Ok(EncodingOutcome {
            encoding,
            face: best_face,
            quality_score,
            liveness_score,
            processing_time_ms,
        })
    }
}

/// Largest face wins; equal areas resolve to the first one encountered.
fn select_best_face(faces: &[FaceRectangle]) -> FaceRectangle {
    let mut best = faces[0];
    for face in &faces[1..] {
        if face.area() > best.area() {
            best = *face;
        }
    }
    best
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
