use std::path::Path;

use uuid::Uuid;

use super::error::StorageError;

const MAX_STEM_CHARS: usize = 64;
const DEFAULT_STEM: &str = "image";

/// Naming seed for a file about to be stored.
///
/// The stored name keeps a sanitized form of the client's file stem so
/// that files stay recognizable on disk, followed by a unique suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaName {
    stem: String,
    extension: String,
}

impl MediaName {
    pub fn new(stem: &str, extension: &str) -> Self {
        Self {
            stem: sanitize_stem(stem),
            extension: sanitize_extension(extension),
        }
    }

    /// Build a seed from a client-supplied file name such as `photo 1.PNG`.
    ///
    /// `fallback_extension` is used when the name carries no extension.
    pub fn from_original(original: &str, fallback_extension: &str) -> Self {
        let path = Path::new(original);
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
            .unwrap_or(fallback_extension);
        Self::new(stem, extension)
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Generate a fresh stored name, e.g. `fixture-1-3f2a9c0d.png`.
    pub fn generate(&self) -> String {
        let unique = Uuid::new_v4().simple().to_string();
        let mut name = format!("{}-{}", self.stem, &unique[..12]);
        if !self.extension.is_empty() {
            name.push('.');
            name.push_str(&self.extension);
        }
        name
    }
}

fn sanitize_stem(stem: &str) -> String {
    let cleaned: String = stem
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .take(MAX_STEM_CHARS)
        .collect();
    let cleaned = cleaned.trim_matches('-');
    if cleaned.is_empty() {
        DEFAULT_STEM.to_string()
    } else {
        cleaned.to_string()
    }
}

fn sanitize_extension(extension: &str) -> String {
    extension
        .trim_start_matches('.')
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(8)
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Check that `name` addresses a file directly inside the store.
pub fn validate_flat_name(name: &str) -> Result<&str, StorageError> {
    let invalid = |reason: &str| Err(StorageError::InvalidName(format!("{name:?}: {reason}")));

    if name.trim().is_empty() {
        return invalid("empty");
    }
    if name.chars().any(|c| c.is_ascii_control()) {
        return invalid("control characters are not allowed");
    }
    if name.contains('/') || name.contains('\\') {
        return invalid("path separators are not allowed");
    }
    if name.starts_with('.') {
        return invalid("hidden files are not allowed");
    }
    Ok(name)
}
