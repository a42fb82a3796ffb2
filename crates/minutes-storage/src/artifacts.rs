//! Filesystem storage for binary artifacts.
//!
//! Uploaded audio lands under `<data_dir>/uploads`, generated visuals under
//! `<data_dir>/visuals`. The database stores paths relative to the data
//! directory so the whole tree can be moved without rewriting rows.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;

use minutes_core::error::MinutesError;

/// Sanitize a filename stem to be safe for filesystem use.
///
/// Anything outside ASCII alphanumerics, `-` and `_` becomes `_`, which also
/// neutralizes path separators and traversal sequences.
pub fn sanitize_stem(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            c if c.is_ascii_alphanumeric() => c,
            '-' | '_' => c,
            _ => '_',
        })
        .collect::<String>()
        .trim_matches('_')
        .to_string()
}

/// Writes uploads and visuals beneath a single data directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    data_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Store an uploaded audio file. Returns the path relative to the data
    /// directory, e.g. `uploads/20250101_090000_standup.mp3`.
    pub fn save_upload(&self, original_name: &str, bytes: &[u8]) -> Result<String, MinutesError> {
        let (stem, ext) = split_name(original_name);
        let stem = non_empty_or(&sanitize_stem(&stem), "audio");
        self.write_artifact("uploads", &stem, &ext, bytes)
    }

    /// Store a generated visual as PNG. Returns the path relative to the
    /// data directory.
    pub fn save_visual(&self, base_name: &str, bytes: &[u8]) -> Result<String, MinutesError> {
        let stem = non_empty_or(&sanitize_stem(base_name), "visual");
        self.write_artifact("visuals", &stem, "png", bytes)
    }

    /// Turn a stored relative path back into an absolute one.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.data_dir.join(relative)
    }

    fn write_artifact(
        &self,
        subdir: &str,
        stem: &str,
        ext: &str,
        bytes: &[u8],
    ) -> Result<String, MinutesError> {
        let dir = self.data_dir.join(subdir);
        std::fs::create_dir_all(&dir)?;

        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let file_name = if ext.is_empty() {
            format!("{}_{}", timestamp, stem)
        } else {
            format!("{}_{}.{}", timestamp, stem, ext)
        };
        let path = dir.join(&file_name);
        std::fs::write(&path, bytes)?;

        debug!(path = %path.display(), size = bytes.len(), "Stored artifact");
        Ok(format!("{}/{}", subdir, file_name))
    }
}

/// Split an uploaded filename into stem and lowercased extension.
fn split_name(name: &str) -> (String, String) {
    let path = Path::new(name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    (stem, ext)
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
