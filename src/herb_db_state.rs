use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use lmdb::{Cursor, Database, DatabaseFlags, Environment, Transaction, WriteFlags};
use log::{debug, info};
use serde::Deserialize;

use crate::app_response::AppResponse;
use crate::herb_model::{HerbRecord, HerbRow, VersionRecord};

const HERBS_DB: &str = "herbs";
const VERSION_DB: &str = "version_info";
const VERSION_KEY: [u8; 4] = 1u32.to_be_bytes();

/// Result of [`HerbDbState::replace_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// The herb table was replaced and the version row written.
    Replaced { herb_count: usize },
    /// The stored version is already at or beyond the offered one.
    Stale { stored_version: i64 },
}

/// LMDB-backed herb store.
///
/// Holds two named databases inside one environment: `herbs`, keyed by the
/// big-endian herb id so cursor order is ascending id, and `version_info`,
/// which holds the single [`VersionRecord`].
pub struct HerbDbState {
    env: Environment,
    herbs: Database,
    version_info: Database,
    path: PathBuf,
}

#[derive(Deserialize)]
struct CategoryColumn {
    category: String,
}

fn lmdb_dir(db_path: &Path) -> PathBuf {
    let mut dir = OsString::from(db_path.as_os_str());
    dir.push(".lmdb");
    PathBuf::from(dir)
}

fn decode_row(bytes: &[u8]) -> Result<HerbRecord, AppResponse> {
    let row: HerbRow = serde_json::from_slice(bytes)?;
    Ok(row.into_record())
}

fn read_version<T: Transaction>(txn: &T, db: Database) -> Result<Option<VersionRecord>, AppResponse> {
    let version = match txn.get(db, &VERSION_KEY) {
        Ok(bytes) => Some(serde_json::from_slice(bytes)?),
        Err(lmdb::Error::NotFound) => None,
        Err(e) => return Err(e.into()),
    };
    Ok(version)
}

impl HerbDbState {
    /// Opens (or creates) the environment at `<db_path>.lmdb`.
    pub fn init(db_path: impl AsRef<Path>, map_size: usize) -> Result<Self, AppResponse> {
        let path = lmdb_dir(db_path.as_ref());

        fs::create_dir_all(&path).map_err(|e| {
            AppResponse::DatabaseError(format!("Cannot create database directory {}: {e}", path.display()))
        })?;

        let env = Environment::new()
            .set_max_dbs(2)
            .set_map_size(map_size)
            .open(&path)?;

        let herbs = env.create_db(Some(HERBS_DB), DatabaseFlags::empty())?;
        let version_info = env.create_db(Some(VERSION_DB), DatabaseFlags::empty())?;

        info!("Herb store opened at {}", path.display());

        Ok(HerbDbState {
            env,
            herbs,
            version_info,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn stored_version(&self) -> Result<Option<VersionRecord>, AppResponse> {
        let txn = self.env.begin_ro_txn()?;
        let version = read_version(&txn, self.version_info)?;
        Ok(version)
    }

    /// Replaces the whole herb table with `records` and records `version`, in a
    /// single write transaction.
    ///
    /// The stored version is re-read inside the transaction; when `version` is
    /// not strictly greater, nothing is written. Records sharing an id collapse
    /// to the last one.
    pub fn replace_all(
        &self,
        records: Vec<HerbRecord>,
        version: i64,
        updated_at: i64,
    ) -> Result<ReplaceOutcome, AppResponse> {
        let rows = records
            .into_iter()
            .map(|record| -> Result<([u8; 4], Vec<u8>), AppResponse> {
                let key = record.id.to_be_bytes();
                let row = HerbRow::from_record(record)?;
                Ok((key, serde_json::to_vec(&row)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let version_row = serde_json::to_vec(&VersionRecord {
            version,
            last_updated: updated_at,
        })?;

        let mut txn = self.env.begin_rw_txn()?;

        let stored_version = read_version(&txn, self.version_info)?.map_or(0, |v| v.version);
        if version <= stored_version {
            debug!("Skipping replace: offered version {version}, stored {stored_version}");
            txn.abort();
            return Ok(ReplaceOutcome::Stale { stored_version });
        }

        txn.clear_db(self.herbs)?;
        for (key, value) in &rows {
            txn.put(self.herbs, key, value, WriteFlags::empty())?;
        }
        txn.put(self.version_info, &VERSION_KEY, &version_row, WriteFlags::empty())?;

        let herb_count = {
            let mut cursor = txn.open_ro_cursor(self.herbs)?;
            cursor.iter().count()
        };

        txn.commit()?;

        Ok(ReplaceOutcome::Replaced { herb_count })
    }

    pub fn get_by_id(&self, id: u32) -> Result<Option<HerbRecord>, AppResponse> {
        let txn = self.env.begin_ro_txn()?;
        let record = match txn.get(self.herbs, &id.to_be_bytes()) {
            Ok(bytes) => Some(decode_row(bytes)?),
            Err(lmdb::Error::NotFound) => None,
            Err(e) => return Err(e.into()),
        };
        Ok(record)
    }

    /// Walks the herb table in id order, skipping the first `offset` records
    /// accepted by `predicate` and returning up to `limit` of the rest.
    pub fn scan<F>(&self, offset: usize, limit: usize, mut predicate: F) -> Result<Vec<HerbRecord>, AppResponse>
    where
        F: FnMut(&HerbRecord) -> bool,
    {
        let mut page = Vec::new();
        if limit == 0 {
            return Ok(page);
        }

        let txn = self.env.begin_ro_txn()?;
        // An unpositioned cursor starts at the first key; `iter_start` panics
        // on an empty database.
        let mut cursor = txn.open_ro_cursor(self.herbs)?;
        let mut skipped = 0;

        for (_, value) in cursor.iter() {
            let record = decode_row(value)?;

            if !predicate(&record) {
                continue;
            }
            if skipped < offset {
                skipped += 1;
                continue;
            }

            page.push(record);
            if page.len() >= limit {
                break;
            }
        }

        Ok(page)
    }

    pub fn all(&self) -> Result<Vec<HerbRecord>, AppResponse> {
        self.scan(0, usize::MAX, |_| true)
    }

    pub fn count(&self) -> Result<usize, AppResponse> {
        let txn = self.env.begin_ro_txn()?;
        let mut cursor = txn.open_ro_cursor(self.herbs)?;
        let count = cursor.iter().count();
        Ok(count)
    }

    /// Distinct categories in first-appearance order. Only the category column
    /// of each row is decoded.
    pub fn categories(&self) -> Result<Vec<String>, AppResponse> {
        let txn = self.env.begin_ro_txn()?;
        let mut cursor = txn.open_ro_cursor(self.herbs)?;
        let mut seen = HashSet::new();
        let mut categories = Vec::new();

        for (_, value) in cursor.iter() {
            let column: CategoryColumn = serde_json::from_slice(value)?;
            if seen.insert(column.category.clone()) {
                categories.push(column.category);
            }
        }

        Ok(categories)
    }
}
