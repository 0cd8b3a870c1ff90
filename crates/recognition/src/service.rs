//! Recognition service facade.
//!
//! Ties the extractor, matcher, engine lifecycle, and audit log together
//! behind the surface exposed to collaborators. Persistence of galleries
//! and settings stays with the caller; this service only reads the
//! snapshots it is handed.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use common::audit::{RecognitionLogEntry, RecognitionStatsReport, RecognitionStatus};
use common::faces::{DetectionResult, EncodingResult, GallerySnapshot, RecognitionResult};
use common::settings::RecognitionSettings;
use common::stores::RecognitionLogStore;
use common::validation::safe_unix_timestamp;
use face_engine::engine::FaceEngine;

use crate::extractor::EncodingExtractor;
use crate::matcher;

/// Trailing window for the `recent_failures` stat.
const RECENT_FAILURE_WINDOW_SECS: u64 = 7 * 24 * 60 * 60;

pub struct RecognitionService {
    engine: Arc<FaceEngine>,
    extractor: EncodingExtractor,
    log_store: Arc<dyn RecognitionLogStore>,
}

impl RecognitionService {
    pub fn new(engine: Arc<FaceEngine>, log_store: Arc<dyn RecognitionLogStore>) -> Self {
        let extractor = EncodingExtractor::new(engine.clone());
        Self {
            engine,
            extractor,
            log_store,
        }
    }

    /// Detection and quality assessment without policy gates.
    pub async fn detect_faces(&self, image_bytes: &[u8]) -> DetectionResult {
        self.extractor.detect(image_bytes).await
    }

    /// Bytes → policy-gated encoding, as a flat result DTO.
    pub async fn extract_encoding(
        &self,
        image_bytes: &[u8],
        settings: &RecognitionSettings,
    ) -> EncodingResult {
        let start = Instant::now();
        match self.extractor.extract(image_bytes, settings).await {
            Ok(outcome) => EncodingResult::completed(
                outcome.encoding,
                outcome.face,
                outcome.processing_time_ms,
                outcome.quality_score,
                outcome.liveness_score,
            ),
            Err(error) => {
                tracing::warn!(error = %error, "encoding extraction rejected");
                EncodingResult::failed(error, start.elapsed().as_millis() as u64)
            }
        }
    }

    /// Extraction for enrollment. Persisting the returned encoding into
    /// the tenant gallery is the caller's responsibility.
    pub async fn enroll(
        &self,
        image_bytes: &[u8],
        settings: &RecognitionSettings,
    ) -> EncodingResult {
        let result = self.extract_encoding(image_bytes, settings).await;
        if result.success {
            tracing::info!(
                dimensions = result.encoding.as_ref().map(|e| e.dim()).unwrap_or(0),
                "enrollment encoding extracted"
            );
        }
        result
    }

    /// Match one probe photograph against a tenant gallery snapshot.
    ///
    /// An empty gallery fails immediately with `NoEnrolledIdentities`;
    /// extraction errors are never allowed to mask that case.
    pub async fn recognize(
        &self,
        image_bytes: &[u8],
        settings: &RecognitionSettings,
        gallery: &GallerySnapshot,
    ) -> RecognitionResult {
        let start = Instant::now();

        if gallery.is_empty() {
            tracing::warn!(tenant = %settings.tenant_id, "recognition attempted with empty gallery");
            return RecognitionResult::failed(
                common::errors::RecognitionError::NoEnrolledIdentities,
                start.elapsed().as_millis() as u64,
            );
        }

        let outcome = match self.extractor.extract(image_bytes, settings).await {
            Ok(outcome) => outcome,
            Err(error) => {
                return RecognitionResult::failed(error, start.elapsed().as_millis() as u64)
            }
        };

        let backend = match self.engine.backend().await {
            Ok(backend) => backend,
            Err(error) => {
                return RecognitionResult::failed(error, start.elapsed().as_millis() as u64)
            }
        };

        let match_outcome =
            match matcher::match_probe(backend.as_ref(), &outcome.encoding, gallery, settings) {
                Ok(match_outcome) => match_outcome,
                Err(error) => {
                    return RecognitionResult::failed(error, start.elapsed().as_millis() as u64)
                }
            };

        let (confidence_score, distance_score) = match &match_outcome.best {
            Some(candidate) => (candidate.similarity, candidate.distance),
            None => (0.0, 1.0),
        };
        let matched_identity = if match_outcome.matched {
            match_outcome
                .best
                .as_ref()
                .map(|candidate| candidate.identity_ref.clone())
        } else {
            None
        };

        if match_outcome.matched {
            tracing::info!(
                identity = matched_identity.as_deref().unwrap_or(""),
                confidence = confidence_score,
                distance = distance_score,
                "face recognized"
            );
        } else {
            tracing::info!(
                best_confidence = confidence_score,
                threshold = settings.confidence_threshold,
                "face not recognized"
            );
        }

        RecognitionResult {
            success: true,
            matched: match_outcome.matched,
            confidence_score,
            distance_score,
            processing_time_ms: start.elapsed().as_millis() as u64,
            matched_identity,
            quality_score: outcome.quality_score,
            liveness_score: outcome.liveness_score,
            detected_face: Some(outcome.face),
            error: None,
        }
    }

    /// Record one recognition attempt. Status classification is
    /// three-way: SUCCESS (matched), LOW_CONFIDENCE (processed but not
    /// accepted), FAILED (could not analyze the image at all). Audit
    /// failures are logged and swallowed; they never fail the request.
    pub async fn log_attempt(
        &self,
        result: &RecognitionResult,
        tenant_id: &str,
        session_ref: Option<&str>,
        identity_ref: Option<&str>,
        device_info: Option<&str>,
    ) {
        let (status, confidence_score, error_message) = if result.success {
            let status = if result.matched {
                RecognitionStatus::Success
            } else {
                RecognitionStatus::LowConfidence
            };
            (status, Some(result.confidence_score), None)
        } else {
            (
                RecognitionStatus::Failed,
                None,
                result.error.as_ref().map(|e| e.to_string()),
            )
        };

        let entry = RecognitionLogEntry {
            id: uuid::Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            identity_ref: identity_ref.map(String::from),
            session_ref: session_ref.map(String::from),
            status,
            confidence_score,
            processing_time_ms: Some(result.processing_time_ms),
            error_message,
            device_info: device_info.map(String::from),
            recorded_at: safe_unix_timestamp(),
        };

        if let Err(e) = self.log_store.append(&entry).await {
            tracing::error!(error = %e, "failed to record recognition attempt");
        }
    }

    /// Audit entries for one session, newest first.
    pub async fn logs_for_session(&self, session_ref: &str) -> Result<Vec<RecognitionLogEntry>> {
        self.log_store.list_for_session(session_ref).await
    }

    /// Audit entries for one identity, newest first.
    pub async fn logs_for_identity(
        &self,
        identity_ref: &str,
    ) -> Result<Vec<RecognitionLogEntry>> {
        self.log_store.list_for_identity(identity_ref).await
    }

    /// Aggregated recognition activity for one tenant. The enrolled-face
    /// count comes from the caller, who owns gallery persistence.
    pub async fn stats(
        &self,
        tenant_id: &str,
        enrolled_faces: u64,
    ) -> Result<RecognitionStatsReport> {
        let status_counts = self.log_store.count_by_status(tenant_id).await?;
        let since = safe_unix_timestamp().saturating_sub(RECENT_FAILURE_WINDOW_SECS);
        let recent_failures = self.log_store.recent_failures(tenant_id, since).await?;

        Ok(RecognitionStatsReport {
            tenant_id: tenant_id.to_string(),
            enrolled_faces,
            status_counts,
            recent_failures: recent_failures.len() as u64,
            engine_status: self.engine.status_message().await,
            available: self.engine.is_available().await,
        })
    }

    pub async fn engine_status(&self) -> String {
        self.engine.status_message().await
    }

    pub async fn is_available(&self) -> bool {
        self.engine.is_available().await
    }

    /// Release the engine. Subsequent calls fail with
    /// `BackendUnavailable`.
    pub async fn shutdown(&self) {
        self.engine.shutdown().await;
    }
}
