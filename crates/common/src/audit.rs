//! Append-only audit trail contracts for recognition attempts.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Outcome classification for one recognition attempt.
///
/// The three-way split is deliberate: `LowConfidence` means the image was
/// processed but nobody was accepted, `Failed` means the image could not
/// even be analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecognitionStatus {
    Success,
    LowConfidence,
    Failed,
}

impl RecognitionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecognitionStatus::Success => "SUCCESS",
            RecognitionStatus::LowConfidence => "LOW_CONFIDENCE",
            RecognitionStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for RecognitionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecognitionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SUCCESS" => Ok(RecognitionStatus::Success),
            "LOW_CONFIDENCE" => Ok(RecognitionStatus::LowConfidence),
            "FAILED" => Ok(RecognitionStatus::Failed),
            _ => Err(format!("unknown recognition status '{s}'")),
        }
    }
}

/// One recognition attempt, recorded for every call whether or not it
/// succeeded. Entries are never mutated or deleted by this core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionLogEntry {
    pub id: String,
    pub tenant_id: String,

    /// Accepted identity; unmatched and failed attempts retain `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_ref: Option<String>,

    /// Session correlation reference, passed through unopinionated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_ref: Option<String>,

    pub status: RecognitionStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_info: Option<String>,

    /// Epoch seconds.
    pub recorded_at: u64,
}

/// Per-status attempt counts for one tenant.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StatusCounts {
    pub success: u64,
    pub low_confidence: u64,
    pub failed: u64,
}

impl StatusCounts {
    pub fn total(&self) -> u64 {
        self.success + self.low_confidence + self.failed
    }

    pub fn record(&mut self, status: RecognitionStatus) {
        match status {
            RecognitionStatus::Success => self.success += 1,
            RecognitionStatus::LowConfidence => self.low_confidence += 1,
            RecognitionStatus::Failed => self.failed += 1,
        }
    }
}

/// Aggregated recognition activity report for one tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionStatsReport {
    pub tenant_id: String,
    pub enrolled_faces: u64,
    pub status_counts: StatusCounts,
    /// Failed attempts within the trailing reporting window.
    pub recent_failures: u64,
    pub engine_status: String,
    pub available: bool,
}
