//! Landmark overlay pipeline.
//!
//! Decodes uploaded bytes, runs the detector, scales each normalized landmark
//! by the image's pixel dimensions, draws a single-pixel marker at every
//! point, and re-encodes the image as PNG.

use std::io::Cursor;

use bytes::Bytes;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageReader, Rgb, RgbImage};

use crate::annotate::detector::{Landmark, LandmarkDetector};
use crate::error::AnnotateError;

/// Marker color for drawn landmarks.
const MARKER: Rgb<u8> = Rgb([255, 0, 0]);

/// Image annotation service.
///
/// Orchestrates the decode → detect → overlay → encode pipeline. A frame
/// with no detected face passes through unannotated (still re-encoded as
/// PNG).
pub struct Annotator<D: LandmarkDetector> {
    detector: D,
}

impl<D: LandmarkDetector> Annotator<D> {
    /// Create an annotator over the given detector.
    pub fn new(detector: D) -> Self {
        Self { detector }
    }

    /// Annotate uploaded image bytes and return the encoded PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be decoded as an image, the
    /// detector fails, or the result cannot be encoded.
    pub async fn annotate(&self, input: &[u8]) -> Result<Bytes, AnnotateError> {
        let decoded = ImageReader::new(Cursor::new(input))
            .with_guessed_format()
            .map_err(|e| AnnotateError::Decode {
                message: e.to_string(),
            })?
            .decode()
            .map_err(|e| AnnotateError::Decode {
                message: e.to_string(),
            })?;

        // The detector contract is three-channel color.
        let mut rgb = decoded.to_rgb8();

        let landmarks = self.detector.detect(&rgb).await?;
        draw_markers(&mut rgb, &landmarks);

        encode_png(&rgb)
    }
}

/// Draw a single-pixel marker for each normalized landmark.
fn draw_markers(image: &mut RgbImage, landmarks: &[Landmark]) {
    let (width, height) = image.dimensions();

    for landmark in landmarks {
        let x = ((landmark.x * width as f32) as u32).min(width - 1);
        let y = ((landmark.y * height as f32) as u32).min(height - 1);
        image.put_pixel(x, y, MARKER);
    }
}

/// Encode an RGB image as PNG.
fn encode_png(image: &RgbImage) -> Result<Bytes, AnnotateError> {
    let (width, height) = image.dimensions();
    let mut output = Vec::new();

    PngEncoder::new(&mut output)
        .write_image(image.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(|e| AnnotateError::Encode {
            message: e.to_string(),
        })?;

    Ok(Bytes::from(output))
}

// =============================================================================
// Tests
// =============================================================================
