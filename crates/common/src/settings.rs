//! Per-tenant recognition settings model.
//!
//! Every numeric field has a documented valid range and is clamped on
//! every write path (update, optimize, import, reset). Settings are
//! created lazily with defaults on first access and are never
//! hard-deleted; reset replaces the values.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Valid range for `confidence_threshold`.
pub const CONFIDENCE_RANGE: (f32, f32) = (0.50, 0.95);
/// Valid range for `max_recognition_distance`.
pub const DISTANCE_RANGE: (f32, f32) = (0.30, 0.80);
/// Valid range for `max_processing_time_ms`.
pub const PROCESSING_TIME_RANGE_MS: (u32, u32) = (2_000, 10_000);
/// Valid range for `photo_quality_threshold`.
pub const QUALITY_RANGE: (f32, f32) = (0.50, 0.90);

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.80;
pub const DEFAULT_MAX_RECOGNITION_DISTANCE: f32 = 0.60;
pub const DEFAULT_MAX_PROCESSING_TIME_MS: u32 = 5_000;
pub const DEFAULT_PHOTO_QUALITY_THRESHOLD: f32 = 0.70;

/// Face recognition tuning for one tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionSettings {
    pub tenant_id: String,

    /// Minimum similarity the best candidate must reach to be accepted.
    pub confidence_threshold: f32,

    /// Maximum distance (1 − similarity) a gallery candidate may have to
    /// be considered at all.
    pub max_recognition_distance: f32,

    pub enable_anti_spoofing: bool,

    pub enable_multiple_face_detection: bool,

    /// Advisory latency budget; not enforced as a hard deadline here.
    pub max_processing_time_ms: u32,

    /// Minimum intrinsic image quality accepted for extraction.
    pub photo_quality_threshold: f32,

    pub created_at: u64,
    pub updated_at: u64,
}

impl RecognitionSettings {
    /// Default settings for a tenant, timestamped at `now` (epoch seconds).
    pub fn defaults_for(tenant_id: impl Into<String>, now: u64) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            max_recognition_distance: DEFAULT_MAX_RECOGNITION_DISTANCE,
            enable_anti_spoofing: true,
            enable_multiple_face_detection: false,
            max_processing_time_ms: DEFAULT_MAX_PROCESSING_TIME_MS,
            photo_quality_threshold: DEFAULT_PHOTO_QUALITY_THRESHOLD,
            created_at: now,
            updated_at: now,
        }
    }

    /// Clamp every numeric field into its valid range.
    pub fn clamp_to_ranges(&mut self) {
        self.confidence_threshold = self
            .confidence_threshold
            .clamp(CONFIDENCE_RANGE.0, CONFIDENCE_RANGE.1);
        self.max_recognition_distance = self
            .max_recognition_distance
            .clamp(DISTANCE_RANGE.0, DISTANCE_RANGE.1);
        self.max_processing_time_ms = self
            .max_processing_time_ms
            .clamp(PROCESSING_TIME_RANGE_MS.0, PROCESSING_TIME_RANGE_MS.1);
        self.photo_quality_threshold = self
            .photo_quality_threshold
            .clamp(QUALITY_RANGE.0, QUALITY_RANGE.1);
    }

    /// Merge the provided fields of a partial update; absent fields keep
    /// their current values. Does not clamp or timestamp; write paths do.
    pub fn apply_patch(&mut self, patch: &SettingsPatch) {
        if let Some(value) = patch.confidence_threshold {
            self.confidence_threshold = value;
        }
        if let Some(value) = patch.max_recognition_distance {
            self.max_recognition_distance = value;
        }
        if let Some(value) = patch.enable_anti_spoofing {
            self.enable_anti_spoofing = value;
        }
        if let Some(value) = patch.enable_multiple_face_detection {
            self.enable_multiple_face_detection = value;
        }
        if let Some(value) = patch.max_processing_time_ms {
            self.max_processing_time_ms = value;
        }
        if let Some(value) = patch.photo_quality_threshold {
            self.photo_quality_threshold = value;
        }
    }

    /// Full-field patch mirroring this settings value, used by export.
    pub fn to_patch(&self) -> SettingsPatch {
        SettingsPatch {
            confidence_threshold: Some(self.confidence_threshold),
            max_recognition_distance: Some(self.max_recognition_distance),
            enable_anti_spoofing: Some(self.enable_anti_spoofing),
            enable_multiple_face_detection: Some(self.enable_multiple_face_detection),
            max_processing_time_ms: Some(self.max_processing_time_ms),
            photo_quality_threshold: Some(self.photo_quality_threshold),
        }
    }
}

/// Partial settings update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_threshold: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_recognition_distance: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_anti_spoofing: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_multiple_face_detection: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_processing_time_ms: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_quality_threshold: Option<f32>,
}

/// Field-keyed validation outcome. Errors block writes; warnings do not.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsValidation {
    pub errors: HashMap<String, String>,
    pub warnings: HashMap<String, String>,
}

impl SettingsValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

/// Multi-axis performance score for a settings value, each axis in [0, 1].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SettingsScore {
    pub accuracy: f32,
    pub speed: f32,
    pub security: f32,
    pub scalability: f32,
    /// Weighted percentage: round(100 × (0.3·accuracy + 0.2·speed +
    /// 0.3·security + 0.2·scalability)).
    pub overall: u32,
}

/// Human-readable level labels derived from the sub-scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceLevels {
    pub accuracy: String,
    pub speed: String,
    pub security: String,
    pub scalability: String,
}

/// One targeted tuning suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// Which axis the suggestion addresses (accuracy, speed, security,
    /// scalability).
    pub area: String,
    pub message: String,
}

/// Full settings performance report for one tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsAnalysis {
    pub tenant_id: String,
    pub total_enrolled: u64,
    pub enrolled_with_face: u64,
    pub face_registration_ratio: f64,
    pub settings: RecognitionSettings,
    pub score: SettingsScore,
    pub levels: PerformanceLevels,
    pub recommendations: Vec<Recommendation>,
    pub score_description: String,
}

/// Portable settings snapshot for backup or migration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsExport {
    pub tenant_id: String,
    pub exported_at: u64,
    pub version: String,
    pub settings: SettingsPatch,
}
