pub mod fallback;
pub mod onnx;

use async_trait::async_trait;
use common::faces::{FaceEncoding, FaceRectangle};

use crate::preprocess::PixelImage;

/// Contract every detection backend must satisfy.
///
/// Implementations never panic on malformed input: detection returns an
/// empty list on failure, encoding extraction returns `None`. The
/// encoding dimension is fixed for the life of the process.
#[async_trait]
pub trait FaceBackend: Send + Sync {
    /// Unique backend identifier (e.g. "onnx", "fallback").
    fn id(&self) -> &'static str;

    /// Dimension of every encoding this backend produces.
    fn encoding_dim(&self) -> usize;

    /// Locate faces in the image. Zero or more; empty on failure.
    async fn detect_faces(&self, image: &PixelImage) -> Vec<FaceRectangle>;

    /// Extract the signature vector for one face region.
    async fn extract_encoding(
        &self,
        image: &PixelImage,
        face: &FaceRectangle,
    ) -> Option<FaceEncoding>;

    /// Liveness estimate in [0, 1]. Only meaningful when anti-spoofing is
    /// enabled; a backend without a real liveness model returns 1.0
    /// (assume-live), which callers must treat as a known-weak guarantee.
    async fn detect_liveness(&self, image: &PixelImage, face: &FaceRectangle) -> f32;

    /// Symmetric similarity in [0, 1]; 1.0 means identical. Dimension
    /// mismatch compares as 0.0.
    fn compare(&self, a: &FaceEncoding, b: &FaceEncoding) -> f32;

    /// Backend-supplied image quality score, taking precedence over the
    /// built-in heuristic when present.
    fn assess_quality(&self, _image: &PixelImage) -> Option<f32> {
        None
    }
}

/// Cosine similarity clamped to [0, 1]. Mismatched dimensions or a
/// zero-norm operand compare as 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += *x as f64 * *y as f64;
        norm_a += *x as f64 * *x as f64;
        norm_b += *y as f64 * *y as f64;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    ((dot / (norm_a.sqrt() * norm_b.sqrt())) as f32).clamp(0.0, 1.0)
}
