//! Data-URL payload decoding.
//!
//! Browsers submit captured media as `data:<mime>[;params];base64,<body>`.
//! MediaRecorder MIME types may themselves contain commas
//! (`video/webm;codecs=vp8,opus`), so the body starts after the *last* comma;
//! a base64 body never contains one.

use std::borrow::Cow;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::CoreError;

/// Raw bytes extracted from a data-URL payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPayload {
    /// Declared media type from the prefix, lowercased (e.g. `video/webm`).
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

/// Decode a `<metadata prefix>,<base64 body>` string.
///
/// Whitespace inside the body (line-wrapped base64) is ignored.
pub fn decode_data_url(payload: &str) -> Result<DecodedPayload, CoreError> {
    let (prefix, body) = payload
        .rsplit_once(',')
        .ok_or_else(|| CoreError::MalformedPayload("missing ',' separator".into()))?;

    let body: Cow<'_, str> = if body.bytes().any(|b| b.is_ascii_whitespace()) {
        Cow::Owned(body.chars().filter(|c| !c.is_ascii_whitespace()).collect())
    } else {
        Cow::Borrowed(body)
    };

    let bytes = STANDARD
        .decode(body.as_bytes())
        .map_err(|e| CoreError::MalformedPayload(format!("invalid base64 body: {e}")))?;

    Ok(DecodedPayload {
        mime: parse_mime(prefix),
        bytes,
    })
}

/// Extract the media type from a `data:<mime>;...` prefix.
fn parse_mime(prefix: &str) -> Option<String> {
    let rest = prefix.trim().strip_prefix("data:")?;
    let mime = rest.split(';').next()?.trim();
    if mime.is_empty() || !mime.contains('/') {
        return None;
    }
    Some(mime.to_ascii_lowercase())
}
