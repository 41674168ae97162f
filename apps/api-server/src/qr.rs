//! # QR Decoding
//!
//! Turns an uploaded label image into a product payload.
//!
//! ```text
//! bytes ──► image::load_from_memory ──► grayscale ──► rqrr grids ──► text
//!                   │                                      │
//!                   ▼                                      ▼
//!           UnreadableImage                           NotDetected
//!
//! first decoded text ──► ims_core::payload::parse_product_payload ──► NewProduct
//!                                      │
//!                                      ▼
//!                               InvalidPayload
//! ```
//!
//! Decoding is CPU bound; callers run it on the blocking pool.

use ims_core::payload::parse_product_payload;
use ims_core::NewProduct;
use thiserror::Error;

/// QR decoding errors. All of them are client errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QrError {
    #[error("Unreadable image: {0}")]
    UnreadableImage(String),

    #[error("QR code not detected")]
    NotDetected,

    #[error("Invalid QR payload: {0}")]
    InvalidPayload(String),
}

/// Decodes every QR code found in an image, in detection order.
///
/// Grids that are located but fail to decode are skipped. An image in
/// which nothing decodes yields [`QrError::NotDetected`].
pub fn decode_payloads(bytes: &[u8]) -> Result<Vec<String>, QrError> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| QrError::UnreadableImage(e.to_string()))?
        .to_luma8();

    let (width, height) = image.dimensions();
    let mut prepared =
        rqrr::PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
            image.get_pixel(x as u32, y as u32).0[0]
        });

    let payloads: Vec<String> = prepared
        .detect_grids()
        .into_iter()
        .filter_map(|grid| match grid.decode() {
            Ok((_meta, content)) => Some(content),
            Err(e) => {
                tracing::debug!(error = ?e, "Skipping undecodable QR grid");
                None
            }
        })
        .collect();

    if payloads.is_empty() {
        return Err(QrError::NotDetected);
    }

    Ok(payloads)
}

/// Decodes an image and parses its first QR payload as a product.
pub fn decode_product(bytes: &[u8]) -> Result<NewProduct, QrError> {
    let payloads = decode_payloads(bytes)?;
    let first = payloads.first().ok_or(QrError::NotDetected)?;

    parse_product_payload(first).map_err(|e| QrError::InvalidPayload(e.to_string()))
}
