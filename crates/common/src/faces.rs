//! Face geometry, encoding, and result contracts shared across the
//! workspace.
//!
//! These types are the library boundary: backends produce them, the
//! recognition pipeline gates on them, and external persistence stores
//! encodings via the opaque byte form.

use crate::errors::RecognitionError;
use serde::{Deserialize, Serialize};

/// Axis-aligned face bounding box in integer pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceRectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Detector confidence in [0, 1].
    pub confidence: f32,
}

impl FaceRectangle {
    pub fn new(x: i32, y: i32, width: i32, height: i32, confidence: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence,
        }
    }

    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && self.confidence >= 0.0
    }
}

/// Immutable fixed-length face signature vector.
///
/// The dimension is fixed by the producing backend for the life of the
/// process. External persistence treats an encoding as an opaque blob via
/// [`FaceEncoding::to_bytes`] / [`FaceEncoding::from_bytes`]
/// (little-endian f32); all arithmetic in this core treats it as a vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceEncoding(Vec<f32>);

impl FaceEncoding {
    pub fn from_vec(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Serialize to the storage interchange format (little-endian f32).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.0.len() * 4);
        for value in &self.0 {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    /// Deserialize from the storage interchange format. Returns `None` for
    /// an empty blob or a length that is not a multiple of four.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() || bytes.len() % 4 != 0 {
            return None;
        }
        let values = bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        Some(Self(values))
    }
}

/// Outcome of a face detection pass over one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionResult {
    pub success: bool,
    pub faces: Vec<FaceRectangle>,
    pub processing_time_ms: u64,
    /// Intrinsic image quality estimate in [0, 1].
    pub image_quality_score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RecognitionError>,
}

impl DetectionResult {
    pub fn completed(faces: Vec<FaceRectangle>, processing_time_ms: u64, quality: f32) -> Self {
        Self {
            success: true,
            faces,
            processing_time_ms,
            image_quality_score: quality,
            error: None,
        }
    }

    pub fn failed(error: RecognitionError, processing_time_ms: u64) -> Self {
        Self {
            success: false,
            faces: Vec::new(),
            processing_time_ms,
            image_quality_score: 0.0,
            error: Some(error),
        }
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn has_faces(&self) -> bool {
        !self.faces.is_empty()
    }
}

/// Outcome of extracting an encoding from one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<FaceEncoding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face: Option<FaceRectangle>,
    pub processing_time_ms: u64,
    pub quality_score: f32,
    pub liveness_score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RecognitionError>,
}

impl EncodingResult {
    pub fn completed(
        encoding: FaceEncoding,
        face: FaceRectangle,
        processing_time_ms: u64,
        quality_score: f32,
        liveness_score: f32,
    ) -> Self {
        Self {
            success: true,
            encoding: Some(encoding),
            face: Some(face),
            processing_time_ms,
            quality_score,
            liveness_score,
            error: None,
        }
    }

    pub fn failed(error: RecognitionError, processing_time_ms: u64) -> Self {
        Self {
            success: false,
            encoding: None,
            face: None,
            processing_time_ms,
            quality_score: 0.0,
            liveness_score: 0.0,
            error: Some(error),
        }
    }
}

/// Outcome of matching one probe image against a tenant gallery.
///
/// `success` means processing completed; `matched` means an identity was
/// accepted. A probe can process fine and still match nobody.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub success: bool,
    pub matched: bool,
    /// Similarity to the best candidate, in [0, 1].
    pub confidence_score: f32,
    /// 1 − confidence.
    pub distance_score: f32,
    pub processing_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_identity: Option<String>,
    pub quality_score: f32,
    pub liveness_score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_face: Option<FaceRectangle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RecognitionError>,
}

impl RecognitionResult {
    pub fn failed(error: RecognitionError, processing_time_ms: u64) -> Self {
        Self {
            success: false,
            matched: false,
            confidence_score: 0.0,
            distance_score: 1.0,
            processing_time_ms,
            matched_identity: None,
            quality_score: 0.0,
            liveness_score: 0.0,
            detected_face: None,
            error: None,
        }
        .with_error(error)
    }

    fn with_error(mut self, error: RecognitionError) -> Self {
        self.error = Some(error);
        self
    }
}

/// One enrolled identity in a tenant gallery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryEntry {
    pub identity_ref: String,
    pub encoding: FaceEncoding,
}

/// Insertion-ordered, read-only snapshot of a tenant's enrolled encodings.
///
/// The matcher iterates entries in snapshot order; ties between equal
/// similarities resolve to the first entry encountered, so snapshot order
/// is part of the matching contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GallerySnapshot {
    entries: Vec<GalleryEntry>,
}

impl GallerySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<GalleryEntry>) -> Self {
        let mut snapshot = Self::new();
        for entry in entries {
            snapshot.insert(entry.identity_ref, entry.encoding);
        }
        snapshot
    }

    /// Insert an encoding, replacing any existing entry for the same
    /// identity so keys stay unique.
    pub fn insert(&mut self, identity_ref: impl Into<String>, encoding: FaceEncoding) {
        let identity_ref = identity_ref.into();
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|entry| entry.identity_ref == identity_ref)
        {
            existing.encoding = encoding;
        } else {
            self.entries.push(GalleryEntry {
                identity_ref,
                encoding,
            });
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GalleryEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_area_and_validity() {
        let face = FaceRectangle::new(10, 10, 100, 120, 0.9);
        assert_eq!(face.area(), 12_000);
        assert!(face.is_valid());

        assert!(!FaceRectangle::new(0, 0, 0, 50, 0.9).is_valid());
        assert!(!FaceRectangle::new(0, 0, 50, -1, 0.9).is_valid());
        assert!(!FaceRectangle::new(0, 0, 50, 50, -0.1).is_valid());
    }

    #[test]
    fn test_encoding_byte_round_trip() {
        let encoding = FaceEncoding::from_vec(vec![0.0, 1.0, -0.5, 3.25]);
        let bytes = encoding.to_bytes();
        assert_eq!(bytes.len(), 16);

        let restored = FaceEncoding::from_bytes(&bytes).unwrap();
        assert_eq!(restored, encoding);
    }

    #[test]
    fn test_encoding_from_bytes_rejects_bad_blobs() {
        assert!(FaceEncoding::from_bytes(&[]).is_none());
        assert!(FaceEncoding::from_bytes(&[1, 2, 3]).is_none());
    }

    #[test]
    fn test_gallery_insert_keeps_keys_unique() {
        let mut gallery = GallerySnapshot::new();
        gallery.insert("alice", FaceEncoding::from_vec(vec![1.0]));
        gallery.insert("bob", FaceEncoding::from_vec(vec![2.0]));
        gallery.insert("alice", FaceEncoding::from_vec(vec![3.0]));

        assert_eq!(gallery.len(), 2);
        let alice = gallery
            .iter()
            .find(|entry| entry.identity_ref == "alice")
            .unwrap();
        assert_eq!(alice.encoding.as_slice(), &[3.0]);
    }
}
