use thiserror::Error;

use crate::annotate::detector::DetectorError;

/// Errors from the user store.
///
/// Absence of a row is not an error: store operations return `Option` for
/// that case. This type covers failures of the backing database itself.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying database rejected or failed the operation
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Errors from the image annotation pipeline.
///
/// Every variant terminates the request; nothing is retried.
#[derive(Debug, Error)]
pub enum AnnotateError {
    /// Uploaded bytes could not be decoded as an image
    #[error("failed to decode image: {message}")]
    Decode { message: String },

    /// The landmark detector failed
    #[error("landmark detection failed: {0}")]
    Detector(#[from] DetectorError),

    /// The annotated image could not be re-encoded as PNG
    #[error("failed to encode image: {message}")]
    Encode { message: String },
}
