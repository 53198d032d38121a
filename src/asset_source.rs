//! Read-only sources for the bundled herb asset.

use std::fs;
use std::path::PathBuf;

use crate::app_response::AppResponse;

/// Where the sync routine reads the herb document from.
pub trait AssetSource: Send + Sync {
    /// Human readable name used in log lines.
    fn name(&self) -> &str;

    fn read_to_string(&self) -> Result<String, AppResponse>;
}

/// Asset shipped as a file next to the app (e.g. extracted from the APK assets).
#[derive(Debug, Clone)]
pub struct FileAsset {
    path: PathBuf,
    name: String,
}

impl FileAsset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        FileAsset { path, name }
    }
}

impl AssetSource for FileAsset {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_to_string(&self) -> Result<String, AppResponse> {
        fs::read_to_string(&self.path)
            .map_err(|e| AppResponse::AssetError(format!("Cannot read asset {}: {e}", self.name)))
    }
}

/// Asset compiled into the host binary, typically through `include_str!`.
#[derive(Debug, Clone)]
pub struct EmbeddedAsset {
    name: String,
    contents: String,
}

impl EmbeddedAsset {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        EmbeddedAsset {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

impl AssetSource for EmbeddedAsset {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_to_string(&self) -> Result<String, AppResponse> {
        Ok(self.contents.clone())
    }
}
