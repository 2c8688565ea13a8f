//! Decoding of `data:` URIs carrying base64 image payloads.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use thiserror::Error;

/// Supported `data:` prefixes with the media type and file extension each
/// one maps to. Anything else is refused.
const SUPPORTED: &[(&str, &str, &str)] = &[
    ("data:image/jpeg;base64", "image/jpeg", "jpg"),
    ("data:image/png;base64", "image/png", "png"),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataUriError {
    #[error("value is not a data URI")]
    Malformed,
    #[error("unsupported data URI type \"{0}\"")]
    Unsupported(String),
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),
}

#[derive(Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub content_type: &'static str,
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

/// Split on the first comma, map the prefix through the supported table
/// and decode the remainder.
pub fn decode(value: &str) -> Result<DecodedImage, DataUriError> {
    let (prefix, payload) = value.split_once(',').ok_or(DataUriError::Malformed)?;
    if !prefix.starts_with("data:") {
        return Err(DataUriError::Malformed);
    }

    let (_, content_type, extension) = SUPPORTED
        .iter()
        .find(|(known, _, _)| known.eq_ignore_ascii_case(prefix))
        .ok_or_else(|| DataUriError::Unsupported(prefix.to_string()))?;

    // Payloads pasted from editors often wrap lines.
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| DataUriError::InvalidBase64(e.to_string()))?;

    Ok(DecodedImage {
        content_type,
        extension,
        bytes,
    })
}
