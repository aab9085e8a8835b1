//! Conversion between the data-URL strings the frontend passes around and
//! the raw bytes + MIME type the edit paths consume.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("not a data URL")]
    MissingPrefix,
    #[error("data URL is not base64-encoded")]
    NotBase64,
    #[error("invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// Decoded form of a data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub mime: String,
}

pub fn encode_data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

pub fn decode_data_url(data_url: &str) -> Result<ImagePayload, CodecError> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or(CodecError::MissingPrefix)?;
    let (header, payload) = rest.split_once(',').ok_or(CodecError::MissingPrefix)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(CodecError::NotBase64)?;
    let mime = if mime.is_empty() {
        "application/octet-stream".to_string()
    } else {
        mime.to_string()
    };
    let bytes = BASE64.decode(payload.trim())?;
    Ok(ImagePayload { bytes, mime })
}
