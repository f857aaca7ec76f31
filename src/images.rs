//! Image relay: stores row-attached images and serves them back with
//! placeholder fallback.
//!
//! Stored names are `<dataset_id>__<sanitized original name>`. Lookups are
//! reduced to a safe basename and never escape the image directory. A
//! missing image resolves to a placeholder asset (`cat.gif` for gif
//! requests, `placeholder.png` otherwise) rather than an error; only when
//! no placeholder asset exists does retrieval fail.

use std::fs;
use std::path::Path;

/// Accepted image extensions, lower-cased, without the dot.
pub const ALLOWED_IMAGE_EXTS: &[&str] = &["jpeg", "jpg", "png", "gif"];

/// Generic placeholder served for missing images.
pub const PLACEHOLDER_PNG: &str = "placeholder.png";
/// Animated placeholder served for missing gif requests.
pub const PLACEHOLDER_GIF: &str = "cat.gif";

#[derive(Debug)]
pub enum ImageError {
    InvalidFormat(String),
    NotFound(String),
    Io(String),
}

impl std::fmt::Display for ImageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageError::InvalidFormat(name) => write!(f, "invalid image format: {}", name),
            ImageError::NotFound(name) => write!(f, "image not found: {}", name),
            ImageError::Io(e) => write!(f, "image io failed: {}", e),
        }
    }
}

impl std::error::Error for ImageError {}

pub fn is_allowed_image(name: &str) -> bool {
    extension(name)
        .map(|ext| ALLOWED_IMAGE_EXTS.contains(&ext.as_str()))
        .unwrap_or(false)
}

fn extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Reduces a client-supplied name to a safe basename: path components are
/// stripped and anything outside `[A-Za-z0-9._-]` becomes `_`.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Validates and persists an uploaded image, returning the stored name.
pub fn store_image(
    image_dir: &Path,
    file_id: &str,
    original_name: &str,
    bytes: &[u8],
) -> Result<String, ImageError> {
    if !is_allowed_image(original_name) {
        return Err(ImageError::InvalidFormat(original_name.to_string()));
    }
    let stored = format!(
        "{}__{}",
        sanitize_filename(file_id),
        sanitize_filename(original_name)
    );
    fs::write(image_dir.join(&stored), bytes).map_err(|e| ImageError::Io(e.to_string()))?;
    Ok(stored)
}

/// Loads the named image, or a placeholder when it is missing. Returns the
/// bytes and the mime type to serve them under.
pub fn retrieve_image(image_dir: &Path, name: &str) -> Result<(Vec<u8>, &'static str), ImageError> {
    let safe = sanitize_filename(name);
    let path = image_dir.join(&safe);
    if path.is_file() {
        let bytes = fs::read(&path).map_err(|e| ImageError::Io(e.to_string()))?;
        return Ok((bytes, mime_for(&safe)));
    }

    let mut placeholders = Vec::new();
    if extension(&safe).as_deref() == Some("gif") {
        placeholders.push(PLACEHOLDER_GIF);
    }
    placeholders.push(PLACEHOLDER_PNG);

    for placeholder in placeholders {
        let fallback = image_dir.join(placeholder);
        if fallback.is_file() {
            let bytes = fs::read(&fallback).map_err(|e| ImageError::Io(e.to_string()))?;
            return Ok((bytes, mime_for(placeholder)));
        }
    }

    Err(ImageError::NotFound(name.to_string()))
}

/// Mime type from extension; anything unrecognized is served as jpeg.
pub fn mime_for(name: &str) -> &'static str {
    match extension(name).as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}
