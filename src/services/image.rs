// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Decoding of `data:image/...;base64,` payloads sent by the chat client.

use crate::error::AppError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use regex::Regex;
use std::sync::LazyLock;

/// Image subtypes the vision extractor accepts.
const SUPPORTED_TYPES: [&str; 5] = ["jpeg", "jpg", "png", "webp", "gif"];

static DATA_URL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^data:image/(\w+);base64,(.+)$").ok());

/// Decoded image ready to forward to the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    /// Full MIME type, e.g. `image/png`
    pub mime_type: String,
}

impl ImagePayload {
    /// Parse and decode a data URL, rejecting anything over `max_bytes` once decoded.
    pub fn parse_data_url(data_url: &str, max_bytes: usize) -> Result<Self, AppError> {
        let caps = DATA_URL_PATTERN
            .as_ref()
            .and_then(|re| re.captures(data_url.trim()))
            .ok_or_else(|| AppError::InvalidInput("Invalid image format".to_string()))?;

        let subtype = caps[1].to_ascii_lowercase();
        if !SUPPORTED_TYPES.contains(&subtype.as_str()) {
            return Err(AppError::InvalidInput(format!(
                "Unsupported image type: {}",
                subtype
            )));
        }

        // Cheap upper bound before decoding: 4 base64 chars per 3 bytes
        let encoded = &caps[2];
        if encoded.len() / 4 * 3 > max_bytes + 2 {
            return Err(too_large(max_bytes));
        }

        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| AppError::InvalidInput(format!("Invalid base64 image data: {}", e)))?;

        if bytes.is_empty() {
            return Err(AppError::InvalidInput("Image data is empty".to_string()));
        }
        if bytes.len() > max_bytes {
            return Err(too_large(max_bytes));
        }

        let mime_type = match subtype.as_str() {
            "jpg" => "image/jpeg".to_string(),
            other => format!("image/{}", other),
        };

        Ok(Self { bytes, mime_type })
    }

    /// Re-encode as a data URL for the vision request.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

fn too_large(max_bytes: usize) -> AppError {
    AppError::InvalidInput(format!("Image exceeds {} bytes", max_bytes))
}
