//! Per-tenant settings management: lazy defaults, clamped updates,
//! validation, heuristic optimization, and multi-axis scoring.
//!
//! All state lives behind the injected [`SettingsStore`]; the engine
//! itself is stateless and the optimization/scoring functions are pure.

use std::sync::Arc;

use anyhow::Result;
use common::settings::{
    PerformanceLevels, Recommendation, RecognitionSettings, SettingsAnalysis, SettingsExport,
    SettingsPatch, SettingsScore, SettingsValidation, CONFIDENCE_RANGE, DISTANCE_RANGE,
    PROCESSING_TIME_RANGE_MS, QUALITY_RANGE,
};
use common::stores::SettingsStore;
use common::validation::{safe_unix_timestamp, validate_tenant_id};

/// Tenant population size class used by the optimizer and the
/// scalability score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TenantSize {
    Small,
    Medium,
    Large,
}

impl TenantSize {
    fn classify(total_enrolled: u64) -> Self {
        if total_enrolled < 50 {
            TenantSize::Small
        } else if total_enrolled < 200 {
            TenantSize::Medium
        } else {
            TenantSize::Large
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            TenantSize::Small => "small",
            TenantSize::Medium => "medium",
            TenantSize::Large => "large",
        }
    }
}

/// Usage pattern inferred from the face-registration ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UsagePattern {
    HighSecurity,
    HighThroughput,
    Standard,
}

impl UsagePattern {
    fn classify(total_enrolled: u64, enrolled_with_face: u64) -> Self {
        if total_enrolled == 0 {
            return UsagePattern::Standard;
        }
        let ratio = enrolled_with_face as f64 / total_enrolled as f64;
        if ratio > 0.8 {
            UsagePattern::HighThroughput
        } else if ratio < 0.3 {
            UsagePattern::HighSecurity
        } else {
            UsagePattern::Standard
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            UsagePattern::HighSecurity => "high_security",
            UsagePattern::HighThroughput => "high_throughput",
            UsagePattern::Standard => "standard",
        }
    }
}

pub struct SettingsEngine {
    store: Arc<dyn SettingsStore>,
}

impl SettingsEngine {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    /// Existing settings for the tenant, or defaults persisted on first
    /// access.
    pub async fn get_or_create(&self, tenant_id: &str) -> Result<RecognitionSettings> {
        validate_tenant_id(tenant_id)?;
        if let Some(settings) = self.store.load(tenant_id).await? {
            return Ok(settings);
        }

        let settings = RecognitionSettings::defaults_for(tenant_id, safe_unix_timestamp());
        self.store.save(&settings).await?;
        tracing::info!(tenant = %tenant_id, "created default recognition settings");
        Ok(settings)
    }

    /// Merge the patch, clamp every numeric field into range, timestamp,
    /// and persist. Applying the same patch twice yields the same value.
    pub async fn update(
        &self,
        tenant_id: &str,
        patch: &SettingsPatch,
    ) -> Result<RecognitionSettings> {
        let mut settings = self.get_or_create(tenant_id).await?;
        settings.apply_patch(patch);
        settings.clamp_to_ranges();
        settings.updated_at = safe_unix_timestamp();

        self.store.save(&settings).await?;
        Ok(settings)
    }

    /// Replace the tenant's settings with defaults. Settings rows are
    /// never hard-deleted; reset is the supported way back.
    pub async fn reset(&self, tenant_id: &str) -> Result<RecognitionSettings> {
        validate_tenant_id(tenant_id)?;
        let mut settings = RecognitionSettings::defaults_for(tenant_id, safe_unix_timestamp());
        if let Some(existing) = self.store.load(tenant_id).await? {
            settings.created_at = existing.created_at;
        }
        self.store.save(&settings).await?;
        tracing::info!(tenant = %tenant_id, "recognition settings reset to defaults");
        Ok(settings)
    }

    /// Advisory pre-flight check. Errors flag values outside the hard
    /// ranges (writes clamp them away); warnings flag legal but extreme
    /// values.
    pub fn validate(settings: &RecognitionSettings) -> SettingsValidation {
        let mut validation = SettingsValidation::default();

        if settings.confidence_threshold < CONFIDENCE_RANGE.0 {
            validation.errors.insert(
                "confidence_threshold".to_string(),
                "confidence threshold too low; may produce false positives".to_string(),
            );
        } else if settings.confidence_threshold > CONFIDENCE_RANGE.1 {
            validation.warnings.insert(
                "confidence_threshold".to_string(),
                "confidence threshold very high; may produce false negatives".to_string(),
            );
        }

        if settings.max_recognition_distance > DISTANCE_RANGE.1 {
            validation.warnings.insert(
                "max_recognition_distance".to_string(),
                "max distance very high; may reduce accuracy".to_string(),
            );
        } else if settings.max_recognition_distance < DISTANCE_RANGE.0 {
            validation.warnings.insert(
                "max_recognition_distance".to_string(),
                "max distance very low; may be too restrictive".to_string(),
            );
        }

        if settings.max_processing_time_ms < PROCESSING_TIME_RANGE_MS.0 {
            validation.warnings.insert(
                "max_processing_time_ms".to_string(),
                "processing time budget very low; may cause timeouts".to_string(),
            );
        } else if settings.max_processing_time_ms > PROCESSING_TIME_RANGE_MS.1 {
            validation.warnings.insert(
                "max_processing_time_ms".to_string(),
                "processing time budget very high; may hurt user experience".to_string(),
            );
        }

        if settings.photo_quality_threshold > QUALITY_RANGE.1 {
            validation.warnings.insert(
                "photo_quality_threshold".to_string(),
                "quality threshold very high; may reject good photos".to_string(),
            );
        } else if settings.photo_quality_threshold < QUALITY_RANGE.0 {
            validation.warnings.insert(
                "photo_quality_threshold".to_string(),
                "quality threshold very low; may accept poor photos".to_string(),
            );
        }

        validation
    }

    /// Pure optimization heuristic: classify tenant size and usage
    /// pattern from coarse population statistics, apply the size base
    /// profile, then the pattern deltas, then clamp.
    pub fn optimized_settings(
        tenant_id: &str,
        total_enrolled: u64,
        enrolled_with_face: u64,
        now: u64,
    ) -> RecognitionSettings {
        let size = TenantSize::classify(total_enrolled);
        let pattern = UsagePattern::classify(total_enrolled, enrolled_with_face);

        let mut settings = RecognitionSettings::defaults_for(tenant_id, now);

        match size {
            TenantSize::Small => {
                settings.confidence_threshold = 0.85;
                settings.max_recognition_distance = 0.50;
                settings.max_processing_time_ms = 7_000;
                settings.photo_quality_threshold = 0.80;
            }
            TenantSize::Large => {
                settings.confidence_threshold = 0.75;
                settings.max_recognition_distance = 0.65;
                settings.max_processing_time_ms = 3_000;
                settings.photo_quality_threshold = 0.65;
            }
            TenantSize::Medium => {}
        }

        match pattern {
            UsagePattern::HighSecurity => {
                settings.confidence_threshold += 0.05;
                settings.enable_anti_spoofing = true;
                settings.photo_quality_threshold += 0.10;
            }
            UsagePattern::HighThroughput => {
                settings.confidence_threshold -= 0.05;
                settings.max_processing_time_ms =
                    settings.max_processing_time_ms.saturating_sub(1_000).max(2_000);
                settings.enable_multiple_face_detection = true;
            }
            UsagePattern::Standard => {}
        }

        settings.clamp_to_ranges();

        tracing::info!(
            tenant = %tenant_id,
            size = size.as_str(),
            pattern = pattern.as_str(),
            enrolled = total_enrolled,
            "generated optimized settings"
        );

        settings
    }

    /// Compute and persist optimized settings for the tenant.
    pub async fn optimize(
        &self,
        tenant_id: &str,
        total_enrolled: u64,
        enrolled_with_face: u64,
    ) -> Result<RecognitionSettings> {
        validate_tenant_id(tenant_id)?;
        let mut settings = Self::optimized_settings(
            tenant_id,
            total_enrolled,
            enrolled_with_face,
            safe_unix_timestamp(),
        );
        if let Some(existing) = self.store.load(tenant_id).await? {
            settings.created_at = existing.created_at;
        }
        self.store.save(&settings).await?;
        Ok(settings)
    }

    /// Multi-axis performance score via the documented bucket rules.
    pub fn score(settings: &RecognitionSettings, enrolled_count: u64) -> SettingsScore {
        let accuracy = accuracy_score(settings);
        let speed = speed_score(settings);
        let security = security_score(settings);
        let scalability = scalability_score(settings, enrolled_count);

        let weighted =
            0.3 * accuracy + 0.2 * speed + 0.3 * security + 0.2 * scalability;

        SettingsScore {
            accuracy,
            speed,
            security,
            scalability,
            overall: (weighted * 100.0).round() as u32,
        }
    }

    /// Full performance report: scores, level labels, targeted
    /// recommendations, and an overall description.
    pub async fn analyze(
        &self,
        tenant_id: &str,
        total_enrolled: u64,
        enrolled_with_face: u64,
    ) -> Result<SettingsAnalysis> {
        let settings = self.get_or_create(tenant_id).await?;
        let ratio = if total_enrolled > 0 {
            enrolled_with_face as f64 / total_enrolled as f64
        } else {
            0.0
        };

        let score = Self::score(&settings, total_enrolled);
        let levels = performance_levels(&score);
        let recommendations = recommendations(&settings, total_enrolled);
        let score_description = score_description(score.overall).to_string();

        Ok(SettingsAnalysis {
            tenant_id: tenant_id.to_string(),
            total_enrolled,
            enrolled_with_face,
            face_registration_ratio: ratio,
            settings,
            score,
            levels,
            recommendations,
            score_description,
        })
    }

    /// Portable snapshot for backup or migration.
    pub async fn export(&self, tenant_id: &str) -> Result<SettingsExport> {
        let settings = self.get_or_create(tenant_id).await?;
        Ok(SettingsExport {
            tenant_id: tenant_id.to_string(),
            exported_at: safe_unix_timestamp(),
            version: "1.0".to_string(),
            settings: settings.to_patch(),
        })
    }

    /// Rebuild settings from an exported snapshot: provided fields are
    /// honored, the rest take defaults, everything is clamped.
    pub async fn import(
        &self,
        tenant_id: &str,
        export: &SettingsExport,
    ) -> Result<RecognitionSettings> {
        validate_tenant_id(tenant_id)?;
        let now = safe_unix_timestamp();
        let mut settings = RecognitionSettings::defaults_for(tenant_id, now);
        settings.apply_patch(&export.settings);
        settings.clamp_to_ranges();
        if let Some(existing) = self.store.load(tenant_id).await? {
            settings.created_at = existing.created_at;
        }

        self.store.save(&settings).await?;
        tracing::info!(tenant = %tenant_id, version = %export.version, "imported recognition settings");
        Ok(settings)
    }
}

fn accuracy_score(settings: &RecognitionSettings) -> f32 {
    let mut score: f32 = 0.5;

    let confidence = settings.confidence_threshold;
    if (0.80..=0.90).contains(&confidence) {
        score += 0.3;
    } else if (0.70..0.95).contains(&confidence) {
        score += 0.2;
    } else {
        score += 0.1;
    }

    let quality = settings.photo_quality_threshold;
    if (0.70..=0.80).contains(&quality) {
        score += 0.2;
    } else if (0.60..0.90).contains(&quality) {
        score += 0.1;
    }

    score.min(1.0)
}

fn speed_score(settings: &RecognitionSettings) -> f32 {
    let mut score: f32 = 0.5;

    score += match settings.max_processing_time_ms {
        0..=3_000 => 0.4,
        3_001..=5_000 => 0.3,
        5_001..=7_000 => 0.2,
        _ => 0.1,
    };

    if settings.enable_multiple_face_detection {
        score += 0.1;
    }

    score.min(1.0)
}

fn security_score(settings: &RecognitionSettings) -> f32 {
    let mut score: f32 = 0.3;

    if settings.enable_anti_spoofing {
        score += 0.4;
    }

    if settings.confidence_threshold >= 0.85 {
        score += 0.2;
    } else if settings.confidence_threshold >= 0.80 {
        score += 0.1;
    }

    if settings.max_recognition_distance <= 0.50 {
        score += 0.1;
    }

    score.min(1.0)
}

fn scalability_score(settings: &RecognitionSettings, enrolled_count: u64) -> f32 {
    let mut score: f32 = 0.5;

    match TenantSize::classify(enrolled_count) {
        TenantSize::Small => {
            // Small tenants can afford generous budgets and strictness.
            if settings.max_processing_time_ms <= 7_000 {
                score += 0.3;
            }
            if settings.confidence_threshold >= 0.80 {
                score += 0.2;
            }
        }
        TenantSize::Medium => {
            if settings.max_processing_time_ms <= 5_000 {
                score += 0.3;
            }
            if (0.75..=0.85).contains(&settings.confidence_threshold) {
                score += 0.2;
            }
        }
        TenantSize::Large => {
            if settings.max_processing_time_ms <= 3_000 {
                score += 0.3;
            }
            if settings.enable_multiple_face_detection {
                score += 0.1;
            }
            if (0.70..=0.80).contains(&settings.confidence_threshold) {
                score += 0.1;
            }
        }
    }

    score.min(1.0)
}

fn level(score: f32, high: &'static str, medium: &'static str, low: &'static str) -> String {
    if score >= 0.8 {
        high.to_string()
    } else if score >= 0.6 {
        medium.to_string()
    } else {
        low.to_string()
    }
}

fn performance_levels(score: &SettingsScore) -> PerformanceLevels {
    PerformanceLevels {
        accuracy: level(score.accuracy, "High", "Medium", "Low"),
        speed: level(score.speed, "Fast", "Medium", "Slow"),
        security: level(score.security, "High", "Medium", "Low"),
        scalability: level(score.scalability, "Excellent", "Good", "Poor"),
    }
}

fn recommendations(settings: &RecognitionSettings, enrolled_count: u64) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if settings.confidence_threshold < 0.70 {
        recommendations.push(Recommendation {
            area: "accuracy".to_string(),
            message: "consider increasing the confidence threshold for better accuracy"
                .to_string(),
        });
    } else if settings.confidence_threshold > 0.90 {
        recommendations.push(Recommendation {
            area: "accuracy".to_string(),
            message: "consider decreasing the confidence threshold to reduce false negatives"
                .to_string(),
        });
    }

    if settings.max_processing_time_ms > 7_000 {
        recommendations.push(Recommendation {
            area: "speed".to_string(),
            message: "consider reducing the processing time budget for better user experience"
                .to_string(),
        });
    } else if settings.max_processing_time_ms < 3_000 {
        recommendations.push(Recommendation {
            area: "speed".to_string(),
            message: "consider increasing the processing time budget to improve accuracy"
                .to_string(),
        });
    }

    if !settings.enable_anti_spoofing && enrolled_count > 100 {
        recommendations.push(Recommendation {
            area: "security".to_string(),
            message: "consider enabling anti-spoofing for larger organizations".to_string(),
        });
    }

    if enrolled_count > 500 && settings.max_processing_time_ms > 5_000 {
        recommendations.push(Recommendation {
            area: "scalability".to_string(),
            message: "consider optimizing settings for high-volume usage".to_string(),
        });
    }

    recommendations
}

fn score_description(overall: u32) -> &'static str {
    if overall >= 85 {
        "excellent: settings are well optimized"
    } else if overall >= 70 {
        "good: settings are mostly optimized"
    } else if overall >= 55 {
        "fair: some optimization needed"
    } else {
        "poor: significant optimization recommended"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::memory::InMemorySettingsStore;

    fn engine() -> SettingsEngine {
        SettingsEngine::new(Arc::new(InMemorySettingsStore::new()))
    }

    #[tokio::test]
    async fn test_get_or_create_persists_defaults() {
        let engine = engine();
        let first = engine.get_or_create("tenant-1").await.unwrap();
        assert_eq!(first.confidence_threshold, 0.80);

        let second = engine.get_or_create("tenant-1").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_get_or_create_rejects_bad_tenant_ids() {
        let engine = engine();
        assert!(engine.get_or_create("").await.is_err());
    }

    #[tokio::test]
    async fn test_update_clamps_and_is_idempotent() {
        let engine = engine();
        let patch = SettingsPatch {
            confidence_threshold: Some(1.5),
            max_recognition_distance: Some(0.1),
            max_processing_time_ms: Some(100),
            photo_quality_threshold: Some(0.99),
            ..Default::default()
        };

        let once = engine.update("tenant-1", &patch).await.unwrap();
        assert_eq!(once.confidence_threshold, 0.95);
        assert_eq!(once.max_recognition_distance, 0.30);
        assert_eq!(once.max_processing_time_ms, 2_000);
        assert_eq!(once.photo_quality_threshold, 0.90);

        let twice = engine.update("tenant-1", &patch).await.unwrap();
        assert_eq!(once.confidence_threshold, twice.confidence_threshold);
        assert_eq!(once.max_recognition_distance, twice.max_recognition_distance);
        assert_eq!(once.max_processing_time_ms, twice.max_processing_time_ms);
        assert_eq!(once.photo_quality_threshold, twice.photo_quality_threshold);
    }

    #[tokio::test]
    async fn test_reset_restores_defaults_and_keeps_created_at() {
        let engine = engine();
        let created = engine.get_or_create("tenant-1").await.unwrap();
        engine
            .update(
                "tenant-1",
                &SettingsPatch {
                    confidence_threshold: Some(0.95),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let reset = engine.reset("tenant-1").await.unwrap();
        assert_eq!(reset.confidence_threshold, 0.80);
        assert_eq!(reset.created_at, created.created_at);
    }

    #[test]
    fn test_validate_flags_low_confidence_as_error() {
        let mut settings = RecognitionSettings::defaults_for("tenant-1", 0);
        settings.confidence_threshold = 0.40;

        let validation = SettingsEngine::validate(&settings);
        assert!(!validation.is_valid());
        assert!(validation.errors.contains_key("confidence_threshold"));
    }

    #[test]
    fn test_validate_warnings_do_not_invalidate() {
        let mut settings = RecognitionSettings::defaults_for("tenant-1", 0);
        settings.confidence_threshold = 0.97;
        settings.max_recognition_distance = 0.85;
        settings.max_processing_time_ms = 12_000;
        settings.photo_quality_threshold = 0.95;

        let validation = SettingsEngine::validate(&settings);
        assert!(validation.is_valid());
        assert_eq!(validation.warning_count(), 4);
        assert_eq!(validation.error_count(), 0);
    }

    #[test]
    fn test_validate_default_settings_are_clean() {
        let settings = RecognitionSettings::defaults_for("tenant-1", 0);
        let validation = SettingsEngine::validate(&settings);
        assert!(validation.is_valid());
        assert_eq!(validation.warning_count(), 0);
    }

    #[test]
    fn test_optimize_small_high_security_tenant() {
        // 10 enrolled, 1 with a face: ratio 0.1 ⇒ high security, small.
        let settings = SettingsEngine::optimized_settings("tenant-1", 10, 1, 0);

        assert!(settings.enable_anti_spoofing);
        assert!((settings.confidence_threshold - 0.90).abs() < 1e-6);
        assert_eq!(settings.photo_quality_threshold, 0.90);
        assert_eq!(settings.max_recognition_distance, 0.50);
        assert_eq!(settings.max_processing_time_ms, 7_000);
    }

    #[test]
    fn test_optimize_large_high_throughput_tenant() {
        // 1000 enrolled, 900 with faces: ratio 0.9 ⇒ high throughput,
        // large.
        let settings = SettingsEngine::optimized_settings("tenant-1", 1_000, 900, 0);

        assert!((settings.confidence_threshold - 0.70).abs() < 1e-6);
        assert_eq!(settings.max_processing_time_ms, 2_000);
        assert!(settings.enable_multiple_face_detection);
        assert_eq!(settings.photo_quality_threshold, 0.65);
    }

    #[test]
    fn test_optimize_zero_population_is_small_standard() {
        let settings = SettingsEngine::optimized_settings("tenant-1", 0, 0, 0);
        // Size small (0 < 50), pattern standard (no population signal).
        assert_eq!(settings.confidence_threshold, 0.85);
        assert!(!settings.enable_multiple_face_detection);
    }

    #[test]
    fn test_optimize_is_pure() {
        let a = SettingsEngine::optimized_settings("tenant-1", 120, 60, 42);
        let b = SettingsEngine::optimized_settings("tenant-1", 120, 60, 42);
        assert_eq!(a, b);

        // Every numeric field stays inside its documented range.
        let extremes = [(0, 0), (10, 1), (49, 49), (199, 1), (5_000, 5_000)];
        for (total, with_face) in extremes {
            let settings = SettingsEngine::optimized_settings("tenant-1", total, with_face, 0);
            assert!((CONFIDENCE_RANGE.0..=CONFIDENCE_RANGE.1)
                .contains(&settings.confidence_threshold));
            assert!(
                (DISTANCE_RANGE.0..=DISTANCE_RANGE.1).contains(&settings.max_recognition_distance)
            );
            assert!((PROCESSING_TIME_RANGE_MS.0..=PROCESSING_TIME_RANGE_MS.1)
                .contains(&settings.max_processing_time_ms));
            assert!(
                (QUALITY_RANGE.0..=QUALITY_RANGE.1).contains(&settings.photo_quality_threshold)
            );
        }
    }

    #[test]
    fn test_score_default_settings_medium_tenant() {
        let settings = RecognitionSettings::defaults_for("tenant-1", 0);
        let score = SettingsEngine::score(&settings, 100);

        assert!((score.accuracy - 1.0).abs() < 1e-6);
        assert!((score.speed - 0.8).abs() < 1e-6);
        assert!((score.security - 0.8).abs() < 1e-6);
        assert!((score.scalability - 1.0).abs() < 1e-6);
        assert_eq!(score.overall, 90);
    }

    #[test]
    fn test_score_caps_at_one() {
        let mut settings = RecognitionSettings::defaults_for("tenant-1", 0);
        settings.confidence_threshold = 0.85;
        settings.max_recognition_distance = 0.40;
        settings.max_processing_time_ms = 2_500;
        settings.enable_multiple_face_detection = true;

        let score = SettingsEngine::score(&settings, 10);
        for axis in [score.accuracy, score.speed, score.security, score.scalability] {
            assert!(axis <= 1.0);
        }
        assert!(score.overall <= 100);
    }

    #[tokio::test]
    async fn test_export_import_round_trip() {
        let engine = engine();
        engine
            .update(
                "tenant-1",
                &SettingsPatch {
                    confidence_threshold: Some(0.88),
                    enable_multiple_face_detection: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let export = engine.export("tenant-1").await.unwrap();
        assert_eq!(export.version, "1.0");

        let imported = engine.import("tenant-2", &export).await.unwrap();
        assert!((imported.confidence_threshold - 0.88).abs() < 1e-6);
        assert!(imported.enable_multiple_face_detection);
        assert_eq!(imported.tenant_id, "tenant-2");
    }

    #[tokio::test]
    async fn test_import_honors_partial_fields_and_clamps() {
        let engine = engine();
        let export = SettingsExport {
            tenant_id: "elsewhere".to_string(),
            exported_at: 0,
            version: "1.0".to_string(),
            settings: SettingsPatch {
                confidence_threshold: Some(2.0),
                ..Default::default()
            },
        };

        let imported = engine.import("tenant-1", &export).await.unwrap();
        assert_eq!(imported.confidence_threshold, 0.95);
        // Unspecified fields fall back to defaults.
        assert_eq!(imported.max_processing_time_ms, 5_000);
        assert!(imported.enable_anti_spoofing);
    }

    #[tokio::test]
    async fn test_analyze_reports_levels_and_recommendations() {
        let engine = engine();
        engine
            .update(
                "tenant-1",
                &SettingsPatch {
                    confidence_threshold: Some(0.92),
                    max_processing_time_ms: Some(9_000),
                    enable_anti_spoofing: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let analysis = engine.analyze("tenant-1", 600, 60).await.unwrap();
        assert_eq!(analysis.total_enrolled, 600);
        assert!((analysis.face_registration_ratio - 0.1).abs() < 1e-9);

        let areas: Vec<&str> = analysis
            .recommendations
            .iter()
            .map(|r| r.area.as_str())
            .collect();
        assert!(areas.contains(&"accuracy"));
        assert!(areas.contains(&"speed"));
        assert!(areas.contains(&"security"));
        assert!(areas.contains(&"scalability"));

        assert!(!analysis.score_description.is_empty());
        assert!(!analysis.levels.security.is_empty());
    }
}
