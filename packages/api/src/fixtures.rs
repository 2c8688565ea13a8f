//! Image files used by the demo seeder and the test suite.
//!
//! The file behind every fixture upload comes from a process-wide source
//! that tests may replace with their own factory.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use uuid::Uuid;

/// Prefix shared by the names of all fixture files.
pub const FIXTURE_PREFIX: &str = "fixture";

/// A 1x1 transparent PNG.
const BUILTIN_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

type ImageSourceFn = dyn Fn() -> io::Result<PathBuf> + Send + Sync;

static IMAGE_SOURCE: RwLock<Option<Arc<ImageSourceFn>>> = RwLock::new(None);

/// Replace the fixture image source. The returned files belong to the
/// caller and are never deleted.
pub fn set_image_source<F>(source: F)
where
    F: Fn() -> io::Result<PathBuf> + Send + Sync + 'static,
{
    let mut guard = IMAGE_SOURCE.write().unwrap_or_else(|e| e.into_inner());
    *guard = Some(Arc::new(source));
}

/// Go back to the built-in PNG.
pub fn reset_image_source() {
    let mut guard = IMAGE_SOURCE.write().unwrap_or_else(|e| e.into_inner());
    *guard = None;
}

/// A fixture image on local disk.
#[derive(Debug)]
pub struct FixtureFile {
    path: PathBuf,
    temporary: bool,
}

impl FixtureFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file if it was written for this call only.
    pub async fn release(self) {
        if self.temporary
            && let Err(e) = tokio::fs::remove_file(&self.path).await
        {
            tracing::warn!(path = %self.path.display(), "Failed to remove fixture file: {e}");
        }
    }
}

/// Produce the file to upload as a fixture image.
pub fn fixture_image() -> io::Result<FixtureFile> {
    let source = IMAGE_SOURCE
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .clone();
    match source {
        Some(source) => Ok(FixtureFile {
            path: source()?,
            temporary: false,
        }),
        None => {
            let path = std::env::temp_dir().join(format!("hammer-{FIXTURE_PREFIX}-{}.png", Uuid::new_v4()));
            std::fs::write(&path, BUILTIN_PNG)?;
            Ok(FixtureFile {
                path,
                temporary: true,
            })
        }
    }
}

/// Whether a stored file name was produced for a fixture.
pub fn is_fixture(file_name: &str) -> bool {
    file_name.starts_with(FIXTURE_PREFIX)
}

/// Delete every fixture file in `dir`. Returns how many were removed.
pub async fn remove_fixture_files(dir: &Path) -> io::Result<usize> {
    let mut removed = 0;
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let is_file = entry.file_type().await?.is_file();
        if is_file && name.to_str().is_some_and(is_fixture) {
            tokio::fs::remove_file(entry.path()).await?;
            removed += 1;
        }
    }
    Ok(removed)
}
