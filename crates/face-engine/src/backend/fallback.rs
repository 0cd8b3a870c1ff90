//! Deterministic fallback backend.
//!
//! Active when the native engine cannot initialize. Satisfies the full
//! [`FaceBackend`] contract at sharply reduced accuracy: it assumes a
//! single centered face and derives the encoding from average channel
//! values, so identical input bytes always produce bit-identical
//! encodings. It has no real discriminative power and is a
//! known-limitation fallback, not a security-equivalent substitute.

use async_trait::async_trait;
use common::faces::{FaceEncoding, FaceRectangle};

use super::{cosine_similarity, FaceBackend};
use crate::preprocess::PixelImage;

/// Encoding dimension of the fallback backend.
pub const FALLBACK_ENCODING_DIM: usize = 128;

/// Fixed confidence assigned to the assumed central face.
pub const FALLBACK_FACE_CONFIDENCE: f32 = 0.8;

#[derive(Debug, Default)]
pub struct FallbackFaceBackend;

impl FallbackFaceBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FaceBackend for FallbackFaceBackend {
    fn id(&self) -> &'static str {
        "fallback"
    }

    fn encoding_dim(&self) -> usize {
        FALLBACK_ENCODING_DIM
    }

    /// Assume exactly one face occupying the central region, with a
    /// margin of min(width, height)/10 on every side.
    async fn detect_faces(&self, image: &PixelImage) -> Vec<FaceRectangle> {
        let width = image.width() as i32;
        let height = image.height() as i32;
        let margin = width.min(height) / 10;

        let face = FaceRectangle::new(
            margin,
            margin,
            width - 2 * margin,
            height - 2 * margin,
            FALLBACK_FACE_CONFIDENCE,
        );

        if face.is_valid() {
            vec![face]
        } else {
            Vec::new()
        }
    }

    /// Pseudo-encoding derived from the average channel values inside the
    /// face rectangle: `enc[i] = ((avg_r + avg_g + avg_b + i) mod 256) / 255`.
    async fn extract_encoding(
        &self,
        image: &PixelImage,
        face: &FaceRectangle,
    ) -> Option<FaceEncoding> {
        let (avg_r, avg_g, avg_b) = image.mean_rgb_in(face);
        let base = avg_r + avg_g + avg_b;

        let values = (0..FALLBACK_ENCODING_DIM)
            .map(|i| ((base + i as u32) % 256) as f32 / 255.0)
            .collect();

        Some(FaceEncoding::from_vec(values))
    }

    /// Constant assume-live score; this backend cannot detect spoofing.
    async fn detect_liveness(&self, _image: &PixelImage, _face: &FaceRectangle) -> f32 {
        1.0
    }

    fn compare(&self, a: &FaceEncoding, b: &FaceEncoding) -> f32 {
        cosine_similarity(a.as_slice(), b.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn solid_image(width: u32, height: u32, rgb: [u8; 3]) -> PixelImage {
        PixelImage::from_rgb(RgbImage::from_pixel(width, height, Rgb(rgb)))
    }

    #[tokio::test]
    async fn test_detects_single_centered_face() {
        let backend = FallbackFaceBackend::new();
        let faces = backend.detect_faces(&solid_image(200, 100, [0; 3])).await;

        assert_eq!(faces.len(), 1);
        let face = faces[0];
        assert_eq!(face.x, 10);
        assert_eq!(face.y, 10);
        assert_eq!(face.width, 180);
        assert_eq!(face.height, 80);
        assert_eq!(face.confidence, FALLBACK_FACE_CONFIDENCE);
    }

    #[tokio::test]
    async fn test_degenerate_image_yields_no_faces() {
        let backend = FallbackFaceBackend::new();
        let empty = PixelImage::from_rgb(RgbImage::new(0, 0));
        assert!(backend.detect_faces(&empty).await.is_empty());

        // A tiny-but-real image still yields its assumed central face.
        let tiny = backend.detect_faces(&solid_image(4, 4, [0; 3])).await;
        assert_eq!(tiny.len(), 1);
    }

    #[tokio::test]
    async fn test_encoding_is_deterministic() {
        let backend = FallbackFaceBackend::new();
        let image = solid_image(200, 200, [120, 60, 30]);
        let face = backend.detect_faces(&image).await[0];

        let first = backend.extract_encoding(&image, &face).await.unwrap();
        let second = backend.extract_encoding(&image, &face).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.dim(), FALLBACK_ENCODING_DIM);
    }

    #[tokio::test]
    async fn test_encoding_matches_formula() {
        let backend = FallbackFaceBackend::new();
        let image = solid_image(200, 200, [10, 20, 30]);
        let face = backend.detect_faces(&image).await[0];

        let encoding = backend.extract_encoding(&image, &face).await.unwrap();
        // avg sum = 60, so enc[0] = 60/255, enc[200 % dim]... check a few.
        assert!((encoding.as_slice()[0] - 60.0 / 255.0).abs() < 1e-6);
        assert!((encoding.as_slice()[100] - 160.0 / 255.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_identical_encodings_compare_as_one() {
        let backend = FallbackFaceBackend::new();
        let image = solid_image(300, 300, [200, 10, 90]);
        let face = backend.detect_faces(&image).await[0];
        let encoding = backend.extract_encoding(&image, &face).await.unwrap();

        let similarity = backend.compare(&encoding, &encoding);
        assert!((similarity - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_liveness_is_assume_live() {
        let backend = FallbackFaceBackend::new();
        let image = solid_image(200, 200, [0; 3]);
        let face = backend.detect_faces(&image).await[0];
        assert_eq!(backend.detect_liveness(&image, &face).await, 1.0);
    }
}
