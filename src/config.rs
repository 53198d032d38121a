//! Repository configuration, passed by the host as JSON.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;

const DEFAULT_MAP_SIZE: usize = 64 * 1024 * 1024;
const DEFAULT_PAGE_SIZE: usize = 20;
const DEFAULT_RECOMMENDATION_COUNT: usize = 8;
const DEFAULT_FEATURED_COUNT: usize = 3;

/// Settings for a [`HerbRepository`](crate::herb_repository::HerbRepository).
///
/// Every field except the two paths has a default, so the smallest valid
/// document is:
///
/// ```json
/// { "db_path": "/data/user/0/app/files/tcm_database", "asset_path": "/data/.../herbs.json" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Directory of the LMDB environment.
    pub db_path: PathBuf,
    /// Location of the bundled herb document.
    pub asset_path: PathBuf,
    pub map_size: usize,
    pub page_size: usize,
    pub recommendation_count: usize,
    pub featured_count: usize,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        RepositoryConfig {
            db_path: PathBuf::from("tcm_database"),
            asset_path: PathBuf::from("herbs.json"),
            map_size: DEFAULT_MAP_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            recommendation_count: DEFAULT_RECOMMENDATION_COUNT,
            featured_count: DEFAULT_FEATURED_COUNT,
        }
    }
}

impl RepositoryConfig {
    pub fn new(db_path: impl Into<PathBuf>, asset_path: impl Into<PathBuf>) -> Self {
        RepositoryConfig {
            db_path: db_path.into(),
            asset_path: asset_path.into(),
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, AppResponse> {
        let config: RepositoryConfig = serde_json::from_str(json)
            .map_err(|e| AppResponse::BadRequest(format!("Invalid repository config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppResponse> {
        if self.db_path.as_os_str().is_empty() {
            return Err(AppResponse::ValidationError("db_path must not be empty".to_string()));
        }
        if self.asset_path.as_os_str().is_empty() {
            return Err(AppResponse::ValidationError("asset_path must not be empty".to_string()));
        }
        if self.map_size == 0 || self.page_size == 0 {
            return Err(AppResponse::ValidationError(
                "map_size and page_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
