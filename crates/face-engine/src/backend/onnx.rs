//! Native ONNX Runtime backend.
//!
//! Three-model pipeline: a face detector (YOLO-style output), an
//! embedding extractor (ArcFace-style, L2-normalized output), and an
//! optional liveness classifier. Sessions are created once at engine
//! startup with CUDA → CPU execution provider fallback and shared behind
//! async mutexes; inference through one session is serialized, which is
//! the documented thread-safety trade-off.

use anyhow::{Context, Result};
use async_trait::async_trait;
use common::faces::{FaceEncoding, FaceRectangle};
use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::{Array, IxDyn};
use ort::{
    execution_providers::{CPUExecutionProvider, CUDAExecutionProvider},
    session::{builder::GraphOptimizationLevel, Session},
    value::Value,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::FaceBackend;
use crate::preprocess::PixelImage;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnnxBackendConfig {
    /// Path to the face detection ONNX model.
    pub detection_model_path: String,

    /// Path to the face embedding ONNX model.
    pub embedding_model_path: String,

    /// Path to the liveness/anti-spoofing ONNX model. Absent means this
    /// backend answers liveness queries with assume-live 1.0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liveness_model_path: Option<String>,

    /// Minimum detector confidence for a face candidate.
    #[serde(default = "default_detection_confidence")]
    pub detection_confidence_threshold: f32,

    /// IoU threshold for non-maximum suppression.
    #[serde(default = "default_iou_threshold")]
    pub iou_threshold: f32,

    /// Maximum faces kept per image.
    #[serde(default = "default_max_detections")]
    pub max_detections: usize,

    /// Detector input edge length (square).
    #[serde(default = "default_detection_input_size")]
    pub detection_input_size: u32,

    /// Embedding input edge length (square).
    #[serde(default = "default_embedding_input_size")]
    pub embedding_input_size: u32,

    /// Liveness input edge length (square).
    #[serde(default = "default_liveness_input_size")]
    pub liveness_input_size: u32,

    /// Dimension of the embedding the model emits.
    #[serde(default = "default_encoding_dim")]
    pub encoding_dim: usize,

    /// Preferred execution provider ("CUDA" or "CPU").
    #[serde(default = "default_execution_provider")]
    pub execution_provider: String,

    #[serde(default)]
    pub device_id: i32,

    #[serde(default = "default_intra_threads")]
    pub intra_threads: usize,

    #[serde(default = "default_inter_threads")]
    pub inter_threads: usize,
}

fn default_detection_confidence() -> f32 {
    0.6
}

fn default_iou_threshold() -> f32 {
    0.4
}

fn default_max_detections() -> usize {
    16
}

fn default_detection_input_size() -> u32 {
    640
}

fn default_embedding_input_size() -> u32 {
    112
}

fn default_liveness_input_size() -> u32 {
    224
}

fn default_encoding_dim() -> usize {
    512
}

fn default_execution_provider() -> String {
    "CUDA".to_string()
}

fn default_intra_threads() -> usize {
    4
}

fn default_inter_threads() -> usize {
    1
}

impl Default for OnnxBackendConfig {
    fn default() -> Self {
        Self {
            detection_model_path: "models/face_detector.onnx".to_string(),
            embedding_model_path: "models/face_embedding.onnx".to_string(),
            liveness_model_path: None,
            detection_confidence_threshold: default_detection_confidence(),
            iou_threshold: default_iou_threshold(),
            max_detections: default_max_detections(),
            detection_input_size: default_detection_input_size(),
            embedding_input_size: default_embedding_input_size(),
            liveness_input_size: default_liveness_input_size(),
            encoding_dim: default_encoding_dim(),
            execution_provider: default_execution_provider(),
            device_id: 0,
            intra_threads: default_intra_threads(),
            inter_threads: default_inter_threads(),
        }
    }
}

pub struct OnnxFaceBackend {
    config: OnnxBackendConfig,
    detection_session: Arc<Mutex<Session>>,
    embedding_session: Arc<Mutex<Session>>,
    liveness_session: Option<Arc<Mutex<Session>>>,
    execution_provider: String,
}

impl OnnxFaceBackend {
    /// Create all sessions. Called exactly once at engine startup; any
    /// failure here makes the engine fall back permanently.
    pub fn initialize(config: OnnxBackendConfig) -> Result<Self> {
        let (detection_session, provider) =
            create_session(&config, &config.detection_model_path)?;
        tracing::info!(
            model = %config.detection_model_path,
            provider = %provider,
            "initialized face detection model"
        );

        let (embedding_session, _) = create_session(&config, &config.embedding_model_path)?;
        tracing::info!(
            model = %config.embedding_model_path,
            "initialized face embedding model"
        );

        let liveness_session = match &config.liveness_model_path {
            Some(path) => {
                let (session, _) = create_session(&config, path)?;
                tracing::info!(model = %path, "initialized liveness model");
                Some(Arc::new(Mutex::new(session)))
            }
            None => {
                tracing::warn!(
                    "no liveness model configured; liveness scores are assume-live"
                );
                None
            }
        };

        Ok(Self {
            config,
            detection_session: Arc::new(Mutex::new(detection_session)),
            embedding_session: Arc::new(Mutex::new(embedding_session)),
            liveness_session,
            execution_provider: provider,
        })
    }

    pub fn execution_provider(&self) -> &str {
        &self.execution_provider
    }

    /// Resize + NCHW layout + per-channel normalization.
    fn to_tensor(image: &DynamicImage, size: u32, zero_centered: bool) -> Array<f32, IxDyn> {
        let resized = image.resize_exact(size, size, FilterType::Triangle);
        let rgb = resized.to_rgb8();

        let mut input = Array::zeros(IxDyn(&[1, 3, size as usize, size as usize]));
        for (x, y, pixel) in rgb.enumerate_pixels() {
            for channel in 0..3 {
                let value = pixel[channel] as f32;
                let normalized = if zero_centered {
                    value / 127.5 - 1.0
                } else {
                    value / 255.0
                };
                input[[0, channel, y as usize, x as usize]] = normalized;
            }
        }
        input
    }

    fn crop_face(&self, image: &PixelImage, face: &FaceRectangle) -> Option<DynamicImage> {
        if !face.is_valid() {
            return None;
        }
        let x = face.x.max(0) as u32;
        let y = face.y.max(0) as u32;
        if x >= image.width() || y >= image.height() {
            return None;
        }
        let width = (face.width as u32).min(image.width() - x);
        let height = (face.height as u32).min(image.height() - y);
        if width == 0 || height == 0 {
            return None;
        }
        let cropped = image::imageops::crop_imm(image.as_rgb(), x, y, width, height).to_image();
        Some(DynamicImage::ImageRgb8(cropped))
    }

    /// Decode a YOLO-style `[1, 5, N]` output (cx, cy, w, h, confidence)
    /// back into image coordinates, filter by confidence, then NMS.
    fn postprocess_detections(
        &self,
        output: &Array<f32, IxDyn>,
        original_width: u32,
        original_height: u32,
    ) -> Vec<FaceRectangle> {
        let shape = output.shape();
        if shape.len() != 3 || shape[1] < 5 {
            tracing::warn!(?shape, "unexpected detection output shape");
            return Vec::new();
        }

        let scale_x = original_width as f32 / self.config.detection_input_size as f32;
        let scale_y = original_height as f32 / self.config.detection_input_size as f32;

        let mut candidates = Vec::new();
        for i in 0..shape[2] {
            let confidence = output[[0, 4, i]];
            if confidence < self.config.detection_confidence_threshold {
                continue;
            }

            let cx = output[[0, 0, i]];
            let cy = output[[0, 1, i]];
            let w = output[[0, 2, i]];
            let h = output[[0, 3, i]];

            let face = FaceRectangle::new(
                (((cx - w / 2.0) * scale_x).max(0.0)) as i32,
                (((cy - h / 2.0) * scale_y).max(0.0)) as i32,
                ((w * scale_x).min(original_width as f32)) as i32,
                ((h * scale_y).min(original_height as f32)) as i32,
                confidence,
            );
            if face.is_valid() {
                candidates.push(face);
            }
        }

        let kept = non_max_suppression(candidates, self.config.iou_threshold);
        kept.into_iter().take(self.config.max_detections).collect()
    }

    async fn run_session(
        session: &Arc<Mutex<Session>>,
        input: Array<f32, IxDyn>,
    ) -> Result<Array<f32, IxDyn>> {
        let input_tensor = Value::from_array(input)?;
        let mut session = session.lock().await;
        let outputs = session.run(ort::inputs![input_tensor])?;

        let output_value = outputs
            .get("output0")
            .or_else(|| outputs.get("output"))
            .or_else(|| outputs.get("embedding"))
            .or_else(|| outputs.get("logits"))
            .context("model produced no recognized output tensor")?;
        let (shape, data) = output_value.try_extract_tensor::<f32>()?;

        let dims: Vec<usize> = shape.as_ref().iter().map(|&d| d as usize).collect();
        Ok(Array::from_shape_vec(IxDyn(&dims), data.to_vec())?)
    }
}

#[async_trait]
impl FaceBackend for OnnxFaceBackend {
    fn id(&self) -> &'static str {
        "onnx"
    }

    fn encoding_dim(&self) -> usize {
        self.config.encoding_dim
    }

    async fn detect_faces(&self, image: &PixelImage) -> Vec<FaceRectangle> {
        let input = Self::to_tensor(
            &DynamicImage::ImageRgb8(image.as_rgb().clone()),
            self.config.detection_input_size,
            false,
        );

        match Self::run_session(&self.detection_session, input).await {
            Ok(output) => self.postprocess_detections(&output, image.width(), image.height()),
            Err(e) => {
                tracing::error!(error = %e, "face detection inference failed");
                Vec::new()
            }
        }
    }

    async fn extract_encoding(
        &self,
        image: &PixelImage,
        face: &FaceRectangle,
    ) -> Option<FaceEncoding> {
        let cropped = self.crop_face(image, face)?;
        let input = Self::to_tensor(&cropped, self.config.embedding_input_size, true);

        let output = match Self::run_session(&self.embedding_session, input).await {
            Ok(output) => output,
            Err(e) => {
                tracing::error!(error = %e, "embedding inference failed");
                return None;
            }
        };

        let mut values: Vec<f32> = output.iter().copied().collect();
        if values.is_empty() {
            return None;
        }

        // L2-normalize so compare() reduces to a dot product.
        let norm: f32 = values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut values {
                *value /= norm;
            }
        }

        Some(FaceEncoding::from_vec(values))
    }

    async fn detect_liveness(&self, image: &PixelImage, face: &FaceRectangle) -> f32 {
        let Some(session) = &self.liveness_session else {
            return 1.0;
        };
        let Some(cropped) = self.crop_face(image, face) else {
            return 0.0;
        };
        let input = Self::to_tensor(&cropped, self.config.liveness_input_size, false);

        match Self::run_session(session, input).await {
            Ok(output) => {
                let values: Vec<f32> = output.iter().copied().collect();
                liveness_score_from_logits(&values)
            }
            Err(e) => {
                tracing::error!(error = %e, "liveness inference failed");
                0.0
            }
        }
    }

    fn compare(&self, a: &FaceEncoding, b: &FaceEncoding) -> f32 {
        if a.dim() != b.dim() || a.is_empty() {
            return 0.0;
        }
        let dot: f32 = a
            .as_slice()
            .iter()
            .zip(b.as_slice().iter())
            .map(|(x, y)| x * y)
            .sum();
        dot.clamp(0.0, 1.0)
    }
}

fn create_session(config: &OnnxBackendConfig, model_path: &str) -> Result<(Session, String)> {
    if config.execution_provider.eq_ignore_ascii_case("cuda") {
        tracing::info!(model = %model_path, "attempting CUDA execution provider");
        let result = session_builder(config)?
            .with_execution_providers([
                CUDAExecutionProvider::default()
                    .with_device_id(config.device_id)
                    .build(),
                CPUExecutionProvider::default().build(),
            ])
            .context("failed to set execution providers")?
            .commit_from_file(model_path);

        match result {
            Ok(session) => return Ok((session, "CUDA".to_string())),
            Err(e) => {
                tracing::warn!(error = %e, "CUDA unavailable, using CPU");
            }
        }
    }

    let session = session_builder(config)?
        .commit_from_file(model_path)
        .with_context(|| format!("failed to load model from {model_path}"))?;
    Ok((session, "CPU".to_string()))
}

fn session_builder(config: &OnnxBackendConfig) -> Result<ort::session::builder::SessionBuilder> {
    Session::builder()
        .context("failed to create session builder")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("failed to set optimization level")?
        .with_intra_threads(config.intra_threads)
        .context("failed to set intra threads")?
        .with_inter_threads(config.inter_threads)
        .context("failed to set inter threads")
}

/// Greedy NMS keeping the highest-confidence box per overlap cluster.
fn non_max_suppression(mut candidates: Vec<FaceRectangle>, iou_threshold: f32) -> Vec<FaceRectangle> {
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut kept: Vec<FaceRectangle> = Vec::new();
    for candidate in candidates {
        if kept
            .iter()
            .all(|existing| intersection_over_union(existing, &candidate) < iou_threshold)
        {
            kept.push(candidate);
        }
    }
    kept
}

fn intersection_over_union(a: &FaceRectangle, b: &FaceRectangle) -> f32 {
    let x1 = a.x.max(b.x);
    let y1 = a.y.max(b.y);
    let x2 = (a.x + a.width).min(b.x + b.width);
    let y2 = (a.y + a.height).min(b.y + b.height);

    let intersection = if x2 > x1 && y2 > y1 {
        (x2 - x1) as f32 * (y2 - y1) as f32
    } else {
        0.0
    };

    let union = a.area() as f32 + b.area() as f32 - intersection;
    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}

/// Map a liveness model output to a live probability: two-class logits
/// are softmaxed (index 1 = live), a single logit is squashed.
fn liveness_score_from_logits(values: &[f32]) -> f32 {
    match values {
        [] => 0.0,
        [single] => (1.0 / (1.0 + (-single).exp())).clamp(0.0, 1.0),
        [spoof, live, ..] => {
            let max = spoof.max(*live);
            let exp_spoof = (spoof - max).exp();
            let exp_live = (live - max).exp();
            (exp_live / (exp_spoof + exp_live)).clamp(0.0, 1.0)
        }
    }
}
