//! Backend lifecycle owner.
//!
//! The engine selects a backend exactly once at startup: if native model
//! paths are configured it attempts the ONNX backend, and on any failure
//! it permanently falls back to the deterministic backend (when
//! enabled). The lifecycle is Uninitialized → Ready → Released with no
//! way back; dropping the engine (or shutting it down) releases the
//! native sessions with the last owning reference.

use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;
use tokio::sync::RwLock;

use common::errors::RecognitionError;

use crate::backend::fallback::FallbackFaceBackend;
use crate::backend::onnx::{OnnxBackendConfig, OnnxFaceBackend};
use crate::backend::FaceBackend;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Native backend configuration; `None` means fallback-only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native: Option<OnnxBackendConfig>,

    /// Whether the deterministic fallback may substitute for a failed or
    /// absent native backend.
    #[serde(default = "default_fallback_enabled")]
    pub fallback_enabled: bool,
}

fn default_fallback_enabled() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            native: None,
            fallback_enabled: true,
        }
    }
}

impl EngineConfig {
    /// Build from `FACE_ENGINE_*` environment variables. The native
    /// backend is configured only when both model paths are present.
    pub fn from_env() -> Self {
        let detection = env::var("FACE_ENGINE_DETECTION_MODEL").ok();
        let embedding = env::var("FACE_ENGINE_EMBEDDING_MODEL").ok();

        let native = match (detection, embedding) {
            (Some(detection_model_path), Some(embedding_model_path)) => {
                let mut config = OnnxBackendConfig {
                    detection_model_path,
                    embedding_model_path,
                    liveness_model_path: env::var("FACE_ENGINE_LIVENESS_MODEL").ok(),
                    ..OnnxBackendConfig::default()
                };
                if let Ok(provider) = env::var("FACE_ENGINE_EXECUTION_PROVIDER") {
                    config.execution_provider = provider;
                }
                if let Ok(device_id) = env::var("FACE_ENGINE_DEVICE_ID") {
                    if let Ok(id) = device_id.parse::<i32>() {
                        config.device_id = id;
                    }
                }
                Some(config)
            }
            _ => None,
        };

        let fallback_enabled = env::var("FACE_ENGINE_FALLBACK_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        Self {
            native,
            fallback_enabled,
        }
    }
}

/// Which backend (if any) is serving requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineStatus {
    Native { provider: String },
    Fallback,
    Unavailable,
    Released,
}

impl EngineStatus {
    pub fn message(&self) -> String {
        match self {
            EngineStatus::Native { provider } => {
                format!("native backend ready (provider: {provider})")
            }
            EngineStatus::Fallback => "using fallback implementation".to_string(),
            EngineStatus::Unavailable => "face recognition not available".to_string(),
            EngineStatus::Released => "engine released".to_string(),
        }
    }
}

struct EngineInner {
    backend: Option<Arc<dyn FaceBackend>>,
    status: EngineStatus,
}

/// Process-wide owner of the selected backend.
pub struct FaceEngine {
    inner: RwLock<EngineInner>,
}

impl FaceEngine {
    /// Attempt native initialization once, then settle on a backend for
    /// the life of the engine.
    pub fn initialize(config: EngineConfig) -> Self {
        let inner = match &config.native {
            Some(native_config) => match OnnxFaceBackend::initialize(native_config.clone()) {
                Ok(backend) => {
                    let provider = backend.execution_provider().to_string();
                    tracing::info!(provider = %provider, "native face backend initialized");
                    EngineInner {
                        backend: Some(Arc::new(backend)),
                        status: EngineStatus::Native { provider },
                    }
                }
                Err(e) if config.fallback_enabled => {
                    tracing::warn!(
                        error = %e,
                        "native backend initialization failed, using fallback implementation"
                    );
                    EngineInner {
                        backend: Some(Arc::new(FallbackFaceBackend::new())),
                        status: EngineStatus::Fallback,
                    }
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        "native backend initialization failed and fallback is disabled"
                    );
                    EngineInner {
                        backend: None,
                        status: EngineStatus::Unavailable,
                    }
                }
            },
            None if config.fallback_enabled => {
                tracing::info!("no native backend configured, using fallback implementation");
                EngineInner {
                    backend: Some(Arc::new(FallbackFaceBackend::new())),
                    status: EngineStatus::Fallback,
                }
            }
            None => EngineInner {
                backend: None,
                status: EngineStatus::Unavailable,
            },
        };

        Self {
            inner: RwLock::new(inner),
        }
    }

    /// Wrap an externally-constructed backend (custom implementations,
    /// tests). The lifecycle contract is unchanged.
    pub fn with_backend(backend: Arc<dyn FaceBackend>) -> Self {
        let provider = backend.id().to_string();
        Self {
            inner: RwLock::new(EngineInner {
                backend: Some(backend),
                status: EngineStatus::Native { provider },
            }),
        }
    }

    /// The active backend, or `BackendUnavailable` after release or a
    /// failed fallback-disabled startup.
    pub async fn backend(&self) -> Result<Arc<dyn FaceBackend>, RecognitionError> {
        self.inner
            .read()
            .await
            .backend
            .clone()
            .ok_or(RecognitionError::BackendUnavailable)
    }

    pub async fn status(&self) -> EngineStatus {
        self.inner.read().await.status.clone()
    }

    pub async fn status_message(&self) -> String {
        self.status().await.message()
    }

    pub async fn is_available(&self) -> bool {
        self.inner.read().await.backend.is_some()
    }

    /// Ready → Released. Drops the engine's backend reference; native
    /// sessions are freed when the last clone of that reference goes
    /// away. There is no transition back.
    pub async fn shutdown(&self) {
        let mut inner = self.inner.write().await;
        if inner.backend.take().is_some() {
            tracing::info!("face engine released");
        }
        inner.status = EngineStatus::Released;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fallback_only_engine_is_available() {
        let engine = FaceEngine::initialize(EngineConfig::default());
        assert!(engine.is_available().await);
        assert_eq!(engine.status().await, EngineStatus::Fallback);
        assert_eq!(engine.backend().await.unwrap().id(), "fallback");
    }

    #[tokio::test]
    async fn test_missing_native_models_fall_back() {
        let config = EngineConfig {
            native: Some(OnnxBackendConfig {
                detection_model_path: "/nonexistent/detector.onnx".to_string(),
                embedding_model_path: "/nonexistent/embedding.onnx".to_string(),
                ..OnnxBackendConfig::default()
            }),
            fallback_enabled: true,
        };
        let engine = FaceEngine::initialize(config);
        assert_eq!(engine.status().await, EngineStatus::Fallback);
        assert!(engine.is_available().await);
    }

    #[tokio::test]
    async fn test_unavailable_when_fallback_disabled() {
        let config = EngineConfig {
            native: None,
            fallback_enabled: false,
        };
        let engine = FaceEngine::initialize(config);
        assert!(!engine.is_available().await);
        assert_eq!(
            engine.backend().await.err(),
            Some(RecognitionError::BackendUnavailable)
        );
    }

    #[tokio::test]
    async fn test_shutdown_is_permanent() {
        let engine = FaceEngine::initialize(EngineConfig::default());
        engine.shutdown().await;

        assert_eq!(engine.status().await, EngineStatus::Released);
        assert!(!engine.is_available().await);
        assert_eq!(
            engine.backend().await.err(),
            Some(RecognitionError::BackendUnavailable)
        );

        // A second shutdown stays released.
        engine.shutdown().await;
        assert_eq!(engine.status().await, EngineStatus::Released);
    }
}
