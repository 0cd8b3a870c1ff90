/// Settings engine flows over the in-memory settings store.
use std::sync::Arc;

use common::memory::InMemorySettingsStore;
use common::settings::{RecognitionSettings, SettingsPatch};
use recognition::settings_engine::SettingsEngine;

fn engine() -> SettingsEngine {
    SettingsEngine::new(Arc::new(InMemorySettingsStore::new()))
}

#[tokio::test]
async fn test_first_access_creates_documented_defaults() {
    let engine = engine();
    let settings = engine.get_or_create("org-0001").await.unwrap();

    assert_eq!(settings.tenant_id, "org-0001");
    assert_eq!(settings.confidence_threshold, 0.80);
    assert_eq!(settings.max_recognition_distance, 0.60);
    assert!(settings.enable_anti_spoofing);
    assert!(!settings.enable_multiple_face_detection);
    assert_eq!(settings.max_processing_time_ms, 5_000);
    assert_eq!(settings.photo_quality_threshold, 0.70);
}

#[tokio::test]
async fn test_update_is_clamped_and_idempotent() {
    let engine = engine();
    let patch = SettingsPatch {
        confidence_threshold: Some(0.99),
        max_recognition_distance: Some(0.05),
        enable_anti_spoofing: Some(false),
        ..Default::default()
    };

    let once = engine.update("org-0001", &patch).await.unwrap();
    let twice = engine.update("org-0001", &patch).await.unwrap();

    assert_eq!(once.confidence_threshold, 0.95);
    assert_eq!(once.max_recognition_distance, 0.30);
    assert!(!once.enable_anti_spoofing);

    assert_eq!(once.confidence_threshold, twice.confidence_threshold);
    assert_eq!(once.max_recognition_distance, twice.max_recognition_distance);
    assert_eq!(once.enable_anti_spoofing, twice.enable_anti_spoofing);
    assert_eq!(once.photo_quality_threshold, twice.photo_quality_threshold);
}

#[tokio::test]
async fn test_validation_flags_out_of_range_confidence() {
    let mut settings = RecognitionSettings::defaults_for("org-0001", 0);
    settings.confidence_threshold = 0.40;

    let validation = SettingsEngine::validate(&settings);
    assert!(!validation.is_valid());
    assert!(validation.errors.contains_key("confidence_threshold"));
    assert!(validation
        .errors
        .get("confidence_threshold")
        .unwrap()
        .contains("false positives"));
}

#[tokio::test]
async fn test_optimize_small_high_security_is_persisted() {
    let engine = engine();
    // 10 enrolled, 1 with a face: small tenant, high-security pattern.
    let optimized = engine.optimize("org-0001", 10, 1).await.unwrap();

    assert!(optimized.enable_anti_spoofing);
    assert!(optimized.confidence_threshold >= 0.89);
    assert!(optimized.confidence_threshold <= 0.95);
    assert_eq!(optimized.photo_quality_threshold, 0.90);

    // The optimizer writes through the store.
    let reloaded = engine.get_or_create("org-0001").await.unwrap();
    assert_eq!(reloaded.confidence_threshold, optimized.confidence_threshold);
    assert_eq!(reloaded.photo_quality_threshold, 0.90);
}

#[tokio::test]
async fn test_optimize_is_deterministic_for_fixed_inputs() {
    let a = SettingsEngine::optimized_settings("org-0001", 150, 80, 1_000);
    let b = SettingsEngine::optimized_settings("org-0001", 150, 80, 1_000);
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_export_import_preserves_tuning() {
    let engine = engine();
    engine
        .update(
            "org-0001",
            &SettingsPatch {
                confidence_threshold: Some(0.87),
                max_processing_time_ms: Some(3_500),
                enable_multiple_face_detection: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let export = engine.export("org-0001").await.unwrap();
    assert_eq!(export.tenant_id, "org-0001");
    assert_eq!(export.version, "1.0");

    // Snapshots survive a serialization round trip.
    let json = serde_json::to_string(&export).unwrap();
    let restored: common::settings::SettingsExport = serde_json::from_str(&json).unwrap();

    let imported = engine.import("org-0002", &restored).await.unwrap();
    assert!((imported.confidence_threshold - 0.87).abs() < 1e-6);
    assert_eq!(imported.max_processing_time_ms, 3_500);
    assert!(imported.enable_multiple_face_detection);
}

#[tokio::test]
async fn test_analyze_scores_default_settings() {
    let engine = engine();
    let analysis = engine.analyze("org-0001", 100, 60).await.unwrap();

    assert_eq!(analysis.score.overall, 90);
    assert!(analysis.score_description.starts_with("excellent"));
    assert_eq!(analysis.levels.accuracy, "High");
    assert_eq!(analysis.levels.scalability, "Excellent");
    assert!((analysis.face_registration_ratio - 0.6).abs() < 1e-9);
    // Well-tuned defaults produce no recommendations.
    assert!(analysis.recommendations.is_empty());
}

#[tokio::test]
async fn test_reset_returns_to_defaults() {
    let engine = engine();
    engine
        .update(
            "org-0001",
            &SettingsPatch {
                confidence_threshold: Some(0.95),
                enable_anti_spoofing: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let reset = engine.reset("org-0001").await.unwrap();
    assert_eq!(reset.confidence_threshold, 0.80);
    assert!(reset.enable_anti_spoofing);
}
