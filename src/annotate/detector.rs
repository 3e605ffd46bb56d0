//! Facial landmark detection via ONNX Runtime.
//!
//! Wraps a pretrained single-face landmark model: the image is letterboxed
//! into the model's fixed input tensor, inference produces a flat coordinate
//! tensor plus an optional confidence output, and raw coordinates are mapped
//! back to the original frame before being normalized to `[0, 1]`.
//!
//! The model itself is opaque: given an image, it returns the landmark set of
//! at most one face. Model contract:
//!
//! - input: `1×3×H×W` float tensor, RGB, values in `[0, 1]`
//! - output 0: flat landmark coordinates in input-tensor pixel space,
//!   `(x, y, z)` per landmark (some exports drop the depth channel)
//! - output 1 (optional): face presence logit

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use thiserror::Error;

/// Side length of the model's square input tensor.
const DETECTOR_INPUT_SIZE: usize = 192;

/// Face presence threshold applied to the sigmoid of the score output.
const DETECTOR_SCORE_THRESHOLD: f32 = 0.5;

/// Divisor mapping 8-bit channel values into the model's input range.
const PIXEL_SCALE: f32 = 255.0;

/// Errors from loading or running the landmark model.
#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("model file not found: {0}")]
    ModelNotFound(String),
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// A normalized facial feature coordinate.
///
/// Both axes are in `[0, 1]` relative to the dimensions of the image the
/// detector was given.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

/// External landmark detection capability.
///
/// Returns the landmarks of at most one detected face; an empty vector means
/// no face was found.
#[async_trait]
pub trait LandmarkDetector: Send + Sync {
    async fn detect(&self, image: &RgbImage) -> Result<Vec<Landmark>, DetectorError>;
}

/// Metadata for coordinate de-mapping after letterbox resize.
struct LetterboxInfo {
    scale: f32,
    pad_x: f32,
    pad_y: f32,
}

// =============================================================================
// ONNX Detector
// =============================================================================

/// Landmark detector backed by a pretrained ONNX model.
pub struct OnnxLandmarkDetector {
    /// The inference API needs exclusive access, so the session sits behind
    /// a mutex and requests serialize on it.
    session: Mutex<Session>,
    input_width: usize,
    input_height: usize,
    has_score_output: bool,
}

impl OnnxLandmarkDetector {
    /// Load the landmark ONNX model from the given path.
    pub fn load(model_path: &str) -> Result<Self, DetectorError> {
        if !Path::new(model_path).exists() {
            return Err(DetectorError::ModelNotFound(model_path.to_string()));
        }

        let session = Session::builder()?
            .with_intra_threads(2)
            .map_err(ort::Error::from)?
            .commit_from_file(model_path)?;

        let output_names: Vec<String> = session
            .outputs()
            .iter()
            .map(|o| o.name().to_string())
            .collect();

        tracing::info!(
            path = model_path,
            outputs = ?output_names,
            "loaded landmark model"
        );

        if output_names.is_empty() {
            return Err(DetectorError::Inference(
                "landmark model has no outputs".into(),
            ));
        }

        Ok(Self {
            session: Mutex::new(session),
            input_width: DETECTOR_INPUT_SIZE,
            input_height: DETECTOR_INPUT_SIZE,
            has_score_output: output_names.len() >= 2,
        })
    }

    /// Letterbox the frame into an NCHW float tensor.
    ///
    /// The frame is scaled to fit the input while preserving aspect ratio and
    /// centered on a black canvas; padding regions stay zero.
    fn preprocess(&self, image: &RgbImage) -> (Array4<f32>, LetterboxInfo) {
        let (width, height) = image.dimensions();
        let letterbox = compute_letterbox(width, height, self.input_width, self.input_height);

        let new_w = ((width as f32 * letterbox.scale).round() as u32).max(1);
        let new_h = ((height as f32 * letterbox.scale).round() as u32).max(1);
        let resized = imageops::resize(image, new_w, new_h, FilterType::Triangle);

        let x_start = letterbox.pad_x.floor() as usize;
        let y_start = letterbox.pad_y.floor() as usize;

        let mut tensor = Array4::<f32>::zeros((1, 3, self.input_height, self.input_width));
        for (x, y, pixel) in resized.enumerate_pixels() {
            let tx = x as usize + x_start;
            let ty = y as usize + y_start;
            if tx >= self.input_width || ty >= self.input_height {
                continue;
            }
            for channel in 0..3 {
                tensor[[0, channel, ty, tx]] = pixel[channel] as f32 / PIXEL_SCALE;
            }
        }

        (tensor, letterbox)
    }
}

#[async_trait]
impl LandmarkDetector for OnnxLandmarkDetector {
    async fn detect(&self, image: &RgbImage) -> Result<Vec<Landmark>, DetectorError> {
        let (input, letterbox) = self.preprocess(image);

        let (coords, score) = {
            let mut session = self
                .session
                .lock()
                .map_err(|_| DetectorError::Inference("poisoned session lock".into()))?;

            let outputs = session.run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

            let (_, raw) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| DetectorError::Inference(format!("landmark tensor: {e}")))?;

            let score = if self.has_score_output {
                let (_, scores) = outputs[1]
                    .try_extract_tensor::<f32>()
                    .map_err(|e| DetectorError::Inference(format!("score tensor: {e}")))?;
                scores.first().copied()
            } else {
                None
            };

            (raw.to_vec(), score)
        };

        if let Some(logit) = score {
            if sigmoid(logit) < DETECTOR_SCORE_THRESHOLD {
                return Ok(Vec::new());
            }
        }

        Ok(decode_landmarks(
            &coords,
            &letterbox,
            image.width(),
            image.height(),
        ))
    }
}

// =============================================================================
// Coordinate Mapping
// =============================================================================

/// Compute the letterbox transform fitting a frame into the input tensor.
fn compute_letterbox(
    frame_width: u32,
    frame_height: u32,
    input_width: usize,
    input_height: usize,
) -> LetterboxInfo {
    let scale_w = input_width as f32 / frame_width as f32;
    let scale_h = input_height as f32 / frame_height as f32;
    let scale = scale_w.min(scale_h);

    let new_w = (frame_width as f32 * scale).round();
    let new_h = (frame_height as f32 * scale).round();

    LetterboxInfo {
        scale,
        pad_x: (input_width as f32 - new_w) / 2.0,
        pad_y: (input_height as f32 - new_h) / 2.0,
    }
}

/// Map raw model coordinates back to the frame and normalize to `[0, 1]`.
///
/// Mesh-style models emit `(x, y, z)` per landmark in input-tensor pixel
/// space; exports without a depth channel emit `(x, y)`.
fn decode_landmarks(
    raw: &[f32],
    letterbox: &LetterboxInfo,
    frame_width: u32,
    frame_height: u32,
) -> Vec<Landmark> {
    let stride = if raw.len() % 3 == 0 { 3 } else { 2 };

    raw.chunks_exact(stride)
        .map(|point| {
            let frame_x = (point[0] - letterbox.pad_x) / letterbox.scale;
            let frame_y = (point[1] - letterbox.pad_y) / letterbox.scale;
            Landmark {
                x: (frame_x / frame_width as f32).clamp(0.0, 1.0),
                y: (frame_y / frame_height as f32).clamp(0.0, 1.0),
            }
        })
        .collect()
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

// =============================================================================
// Tests
// =============================================================================
