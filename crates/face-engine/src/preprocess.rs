//! Image decoding and intrinsic quality assessment.

use common::errors::RecognitionError;
use common::faces::FaceRectangle;
use image::RgbImage;

/// Decoded RGB pixel buffer. Ephemeral per call; never persisted.
pub struct PixelImage {
    rgb: RgbImage,
}

impl PixelImage {
    /// Decode arbitrary image bytes (JPEG, PNG, anything the `image`
    /// crate recognizes) into a normalized RGB buffer.
    pub fn decode(bytes: &[u8]) -> Result<Self, RecognitionError> {
        if bytes.is_empty() {
            return Err(RecognitionError::invalid_image("empty image data"));
        }
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| RecognitionError::invalid_image(e.to_string()))?;
        Ok(Self {
            rgb: decoded.to_rgb8(),
        })
    }

    /// Wrap an already-decoded buffer (callers holding raw frames).
    pub fn from_rgb(rgb: RgbImage) -> Self {
        Self { rgb }
    }

    pub fn width(&self) -> u32 {
        self.rgb.width()
    }

    pub fn height(&self) -> u32 {
        self.rgb.height()
    }

    pub fn pixel_count(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height() == 0 {
            return 0.0;
        }
        self.width() as f32 / self.height() as f32
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.rgb
    }

    /// Mean channel values over the face rectangle clipped to the image
    /// bounds, using integer division. Returns zeros for a degenerate
    /// intersection.
    pub fn mean_rgb_in(&self, face: &FaceRectangle) -> (u32, u32, u32) {
        let x0 = face.x.max(0) as u32;
        let y0 = face.y.max(0) as u32;
        let x1 = (face.x.saturating_add(face.width)).max(0) as u32;
        let y1 = (face.y.saturating_add(face.height)).max(0) as u32;
        let x1 = x1.min(self.width());
        let y1 = y1.min(self.height());

        let mut sum_r: u64 = 0;
        let mut sum_g: u64 = 0;
        let mut sum_b: u64 = 0;
        let mut count: u64 = 0;

        for y in y0..y1 {
            for x in x0..x1 {
                let pixel = self.rgb.get_pixel(x, y);
                sum_r += pixel[0] as u64;
                sum_g += pixel[1] as u64;
                sum_b += pixel[2] as u64;
                count += 1;
            }
        }

        if count == 0 {
            return (0, 0, 0);
        }
        (
            (sum_r / count) as u32,
            (sum_g / count) as u32,
            (sum_b / count) as u32,
        )
    }
}

/// Intrinsic quality heuristic, always available regardless of backend.
///
/// Base 1.0, halved below 50k pixels, ×0.8 below 200k, ×0.7 when the
/// aspect ratio falls outside [0.5, 2.0]; clamped to [0, 1]. A backend
/// supplying its own score takes precedence over this heuristic.
pub fn assess_quality(image: &PixelImage) -> f32 {
    let mut score: f32 = 1.0;

    let pixels = image.pixel_count();
    if pixels < 50_000 {
        score *= 0.5;
    } else if pixels < 200_000 {
        score *= 0.8;
    }

    let aspect = image.aspect_ratio();
    if !(0.5..=2.0).contains(&aspect) {
        score *= 0.7;
    }

    score.clamp(0.0, 1.0)
}
