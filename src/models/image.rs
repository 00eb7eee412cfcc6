use crate::error::{PoetError, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::path::Path;

/// Where the photograph comes from. Only the shape of the reference is
/// checked here; decoding and fetching happen in the describer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageReference {
    /// `data:<media_type>;base64,<data>`
    DataUri { media_type: String, data: String },
    /// `http://` or `https://` location
    Url(String),
}

impl ImageReference {
    pub fn parse(reference: &str) -> Result<Self> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(PoetError::InputError(
                "No image supplied, please upload an image to generate a poem".into(),
            ));
        }

        if let Some(rest) = reference.strip_prefix("data:") {
            let (header, data) = rest.split_once(',').ok_or_else(|| {
                PoetError::InputError("Data URI is missing its ',' separator".into())
            })?;
            let media_type = header.strip_suffix(";base64").ok_or_else(|| {
                PoetError::InputError("Only base64 encoded data URIs are supported".into())
            })?;
            if data.is_empty() {
                return Err(PoetError::InputError("Data URI carries no image data".into()));
            }
            let media_type = if media_type.is_empty() {
                "image/png".to_string()
            } else {
                media_type.to_ascii_lowercase()
            };
            return Ok(ImageReference::DataUri {
                media_type,
                data: data.to_string(),
            });
        }

        let lower = reference.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(ImageReference::Url(reference.to_string()));
        }

        Err(PoetError::InputError(format!(
            "Unsupported image reference, expected a data URI or http(s) URL: {}",
            preview(reference)
        )))
    }

    /// Reads a local image and wraps it in a data URI.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let media_type = media_type_for_extension(&extension).ok_or_else(|| {
            PoetError::InputError(format!(
                "Unsupported image type '{}' for {}",
                extension,
                path.display()
            ))
        })?;

        let bytes = std::fs::read(path).map_err(|e| {
            PoetError::InputError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        if bytes.is_empty() {
            return Err(PoetError::InputError(format!(
                "Image file {} is empty",
                path.display()
            )));
        }

        log::debug!(
            "Loaded {} ({}, {} bytes)",
            path.display(),
            media_type,
            bytes.len()
        );

        Ok(ImageReference::DataUri {
            media_type: media_type.to_string(),
            data: STANDARD.encode(&bytes),
        })
    }

    pub fn to_uri(&self) -> String {
        match self {
            ImageReference::DataUri { media_type, data } => {
                format!("data:{};base64,{}", media_type, data)
            }
            ImageReference::Url(url) => url.clone(),
        }
    }

    /// Short form safe for log lines.
    pub fn summary(&self) -> String {
        match self {
            ImageReference::DataUri { media_type, data } => {
                format!("inline {} ({} base64 chars)", media_type, data.len())
            }
            ImageReference::Url(url) => url.clone(),
        }
    }
}

pub fn media_type_for_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

/// Media types the vision models accept.
pub fn is_supported_image(media_type: &str) -> bool {
    matches!(
        media_type,
        "image/jpeg" | "image/png" | "image/webp" | "image/gif"
    )
}

fn preview(reference: &str) -> String {
    let cut: String = reference.chars().take(40).collect();
    if cut.len() < reference.len() {
        format!("{}...", cut)
    } else {
        cut
    }
}
