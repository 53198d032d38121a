//! Versioned seeding and read access for the herb catalog.
//!
//! A [`HerbRepository`] is constructed once at process start and handed to every
//! consumer by cloning; clones share the same store, asset source and
//! recommendation cache.

use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info, warn};
use serde::Serialize;

use crate::app_response::AppResponse;
use crate::asset_source::{AssetSource, FileAsset};
use crate::config::RepositoryConfig;
use crate::herb_db_state::{HerbDbState, ReplaceOutcome};
use crate::herb_model::{HerbAsset, HerbRecord, VersionRecord, ALL_CATEGORY};
use crate::recommendations::Recommendations;

/// What a sync run did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SyncOutcome {
    #[serde(rename_all = "camelCase")]
    UpToDate { stored_version: i64 },
    #[serde(rename_all = "camelCase")]
    Reseeded { version: i64, herb_count: usize },
}

#[derive(Clone)]
pub struct HerbRepository {
    store: Arc<HerbDbState>,
    asset: Arc<dyn AssetSource>,
    recommendations: Arc<OnceLock<Recommendations>>,
    config: RepositoryConfig,
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

impl HerbRepository {
    /// Opens the store at `config.db_path` and reads the asset from
    /// `config.asset_path`.
    pub fn open(config: RepositoryConfig) -> Result<Self, AppResponse> {
        let asset = FileAsset::new(config.asset_path.clone());
        Self::with_asset(config, asset)
    }

    /// Opens the store at `config.db_path` with a caller supplied asset source.
    pub fn with_asset(config: RepositoryConfig, asset: impl AssetSource + 'static) -> Result<Self, AppResponse> {
        config.validate()?;
        let store = HerbDbState::init(&config.db_path, config.map_size)?;

        Ok(HerbRepository {
            store: Arc::new(store),
            asset: Arc::new(asset),
            recommendations: Arc::new(OnceLock::new()),
            config,
        })
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Runs [`HerbRepository::sync`] once on a background thread. Failures are
    /// logged and leave the store as it was.
    pub fn initialize(&self) -> JoinHandle<()> {
        let repository = self.clone();
        thread::spawn(move || repository.sync_logged())
    }

    /// Brings the store in line with the asset.
    ///
    /// The herb table is replaced only when the asset version is strictly
    /// greater than the stored one; otherwise this is a no-op. The replacement
    /// happens in one transaction, so concurrent readers see either the old or
    /// the new catalog. The recommendation cache is derived afterwards, at most
    /// once per process, whatever the outcome.
    pub fn sync(&self) -> Result<SyncOutcome, AppResponse> {
        let outcome = self.sync_store();
        self.ensure_recommendations();
        outcome
    }

    pub fn sync_logged(&self) {
        match self.sync() {
            Ok(outcome) => debug!("Herb sync finished: {outcome:?}"),
            Err(e) => warn!("Herb sync aborted, keeping previous data: {e}"),
        }
    }

    fn sync_store(&self) -> Result<SyncOutcome, AppResponse> {
        let json = self.asset.read_to_string()?;
        let asset_version = HerbAsset::parse_version(&json)?;
        let stored_version = self.store.stored_version()?.map_or(0, |v| v.version);

        debug!(
            "Asset {} version: {asset_version}, stored version: {stored_version}",
            self.asset.name()
        );

        if asset_version <= stored_version {
            info!("Herb store is up to date at version {stored_version}");
            return Ok(SyncOutcome::UpToDate { stored_version });
        }

        info!("Reseeding herb store from version {stored_version} to {asset_version}");
        let asset = HerbAsset::parse(&json)?;

        match self.store.replace_all(asset.herbs, asset.version, now_millis())? {
            ReplaceOutcome::Replaced { herb_count } => {
                info!("✅ Herb store updated to version {} with {herb_count} herbs", asset.version);
                Ok(SyncOutcome::Reseeded {
                    version: asset.version,
                    herb_count,
                })
            }
            ReplaceOutcome::Stale { stored_version } => {
                info!("Herb store reached version {stored_version} during sync, nothing to do");
                Ok(SyncOutcome::UpToDate { stored_version })
            }
        }
    }

    fn ensure_recommendations(&self) {
        self.recommendations.get_or_init(|| match self.store.all() {
            Ok(herbs) => Recommendations::from_herbs(&herbs),
            Err(e) => {
                warn!("Cannot derive recommendations, using fallback: {e}");
                Recommendations::fallback()
            }
        });
    }

    pub fn stored_version(&self) -> Result<Option<VersionRecord>, AppResponse> {
        self.store.stored_version()
    }

    pub fn get_page(&self, offset: usize, limit: usize) -> Result<Vec<HerbRecord>, AppResponse> {
        self.store.scan(offset, limit, |_| true)
    }

    pub fn get_by_id(&self, id: u32) -> Result<Option<HerbRecord>, AppResponse> {
        self.store.get_by_id(id)
    }

    /// Exact category filter. [`ALL_CATEGORY`] returns the unfiltered page.
    pub fn get_by_category(&self, category: &str, offset: usize, limit: usize) -> Result<Vec<HerbRecord>, AppResponse> {
        if category == ALL_CATEGORY {
            return self.get_page(offset, limit);
        }
        self.store.scan(offset, limit, |herb| herb.category == category)
    }

    /// Case-insensitive substring search; a blank query matches every herb.
    pub fn search(&self, query: &str, offset: usize, limit: usize) -> Result<Vec<HerbRecord>, AppResponse> {
        let needle = normalize_query(query);
        if needle.is_empty() {
            return self.get_page(offset, limit);
        }
        self.store.scan(offset, limit, |herb| herb.matches_query(&needle))
    }

    pub fn search_within_category(
        &self,
        category: &str,
        query: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<HerbRecord>, AppResponse> {
        let needle = normalize_query(query);
        self.store
            .scan(offset, limit, |herb| herb.in_category(category) && herb.matches_query(&needle))
    }

    pub fn list_categories(&self) -> Result<Vec<String>, AppResponse> {
        self.store.categories()
    }

    pub fn count(&self) -> Result<usize, AppResponse> {
        self.store.count()
    }

    /// Shuffled function tags, stable for the process lifetime. Served from the
    /// fallback list until the first sync has finished.
    pub fn recommended_functions(&self, count: usize) -> Vec<String> {
        match self.recommendations.get() {
            Some(recommendations) => recommendations.functions(count),
            None => Recommendations::fallback().functions(count),
        }
    }

    pub fn recommended_clinical_applications(&self, count: usize) -> Vec<String> {
        match self.recommendations.get() {
            Some(recommendations) => recommendations.clinical_applications(count),
            None => Recommendations::fallback().clinical_applications(count),
        }
    }
}
