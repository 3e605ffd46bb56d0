//! Image annotation layer.
//!
//! Accepts uploaded image bytes, runs a facial-landmark detector over them,
//! overlays the detected points, and re-encodes the result as PNG.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Handlers              │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │               Annotator                 │
//! │   (decode → detect → overlay → PNG)     │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │         LandmarkDetector trait          │
//! │   OnnxLandmarkDetector (ort session)    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! The detector is a trait seam: the production implementation wraps a
//! pretrained ONNX model, tests substitute stubs.

pub mod detector;
pub mod overlay;

pub use detector::{DetectorError, Landmark, LandmarkDetector, OnnxLandmarkDetector};
pub use overlay::Annotator;
