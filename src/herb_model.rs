//! Data model definitions for the herb catalog.
//!
//! Three shapes of the same herb live in this module:
//!
//! - [`AssetHerb`]: one entry of the bundled JSON asset, underscore-named and
//!   mostly optional.
//! - [`HerbRecord`]: the domain record handed to the host, camelCase on the wire.
//! - [`HerbRow`]: the persisted form, where list-valued fields are stored as
//!   serialized JSON text blobs.
//!
//! [`VersionRecord`] is the singleton row that remembers which asset version was
//! last applied to the store.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;

/// Pseudo-category that matches every record. Never stored.
pub const ALL_CATEGORY: &str = "全部";

/// A single herb as exposed to the host.
///
/// Only `id`, `name` and `category` are guaranteed; every other field reflects
/// whatever the source data happened to carry for that herb.
///
/// ```rust
/// use herb_catalog_core::herb_model::HerbRecord;
///
/// let herb = HerbRecord::new(1, "人参", "补气类");
/// let json = serde_json::to_string(&herb)?;
/// assert!(json.contains("\"pinYin\":null"));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HerbRecord {
    /// Identity key, stable across asset versions.
    pub id: u32,
    pub name: String,
    pub pin_yin: Option<String>,
    pub category: String,
    pub url: Option<String>,
    pub medicinal_part: Option<String>,
    pub taste_meridian: Option<String>,
    pub properties: Option<String>,
    pub taste: Option<String>,
    pub meridians: Option<Vec<String>>,
    pub effects: Option<String>,
    /// Function tags, also the source of the "recommended functions" chips.
    pub functions: Option<Vec<String>>,
    pub clinical_application: Option<Vec<String>>,
    pub prescription_name: Option<String>,
    pub usage_dosage: Option<String>,
    pub notes: Option<Vec<String>>,
    pub formulas: Option<Vec<String>>,
    pub literature: Option<Vec<String>>,
    pub affiliated_herbs: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
}

impl HerbRecord {
    /// Creates a record carrying only the required fields.
    pub fn new(id: u32, name: impl Into<String>, category: impl Into<String>) -> Self {
        HerbRecord {
            id,
            name: name.into(),
            pin_yin: None,
            category: category.into(),
            url: None,
            medicinal_part: None,
            taste_meridian: None,
            properties: None,
            taste: None,
            meridians: None,
            effects: None,
            functions: None,
            clinical_application: None,
            prescription_name: None,
            usage_dosage: None,
            notes: None,
            formulas: None,
            literature: None,
            affiliated_herbs: None,
            images: None,
        }
    }

    /// Case-insensitive substring match over name, pin yin, function tags and
    /// clinical applications. `needle` must already be trimmed and lowercased;
    /// an empty needle matches everything.
    pub fn matches_query(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }

        let contains = |text: &str| text.to_lowercase().contains(needle);
        let any_contains =
            |list: &Option<Vec<String>>| list.iter().flatten().any(|item| contains(item.as_str()));

        contains(&self.name)
            || self.pin_yin.as_deref().is_some_and(contains)
            || any_contains(&self.functions)
            || any_contains(&self.clinical_application)
    }

    /// Exact category match, with [`ALL_CATEGORY`] matching every record.
    pub fn in_category(&self, category: &str) -> bool {
        category == ALL_CATEGORY || self.category == category
    }
}

/// One entry of the `herbs` array in the bundled asset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetHerb {
    pub id: Option<u32>,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub pin_yin: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub medicinal_part: Option<String>,
    #[serde(default)]
    pub taste_meridian: Option<String>,
    #[serde(default)]
    pub properties: Option<String>,
    #[serde(default)]
    pub taste: Option<String>,
    #[serde(default)]
    pub meridians: Option<Vec<String>>,
    #[serde(default)]
    pub effects: Option<String>,
    #[serde(default)]
    pub functions: Option<Vec<String>>,
    #[serde(default)]
    pub clinical_application: Option<Vec<String>>,
    #[serde(default)]
    pub prescription_name: Option<String>,
    #[serde(default)]
    pub usage_dosage: Option<String>,
    #[serde(default)]
    pub notes: Option<Vec<String>>,
    #[serde(default)]
    pub formulas: Option<Vec<String>>,
    #[serde(default)]
    pub literature: Option<Vec<String>>,
    #[serde(default)]
    pub affiliated_herbs: Option<Vec<String>>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
}

impl AssetHerb {
    /// Converts to a domain record; `position` is the zero-based index in the
    /// asset array and provides the id when the entry has none.
    pub fn into_record(self, position: usize) -> Result<HerbRecord, AppResponse> {
        let id = match self.id {
            Some(id) => id,
            None => u32::try_from(position + 1).map_err(|_| {
                AppResponse::ValidationError(format!("Herb at position {position} has no usable id"))
            })?,
        };

        if self.name.trim().is_empty() {
            return Err(AppResponse::ValidationError(format!("Herb {id} has an empty name")));
        }
        if self.category.trim().is_empty() {
            return Err(AppResponse::ValidationError(format!(
                "Herb {id} ({}) has an empty category",
                self.name
            )));
        }

        Ok(HerbRecord {
            id,
            name: self.name,
            pin_yin: self.pin_yin,
            category: self.category,
            url: self.url,
            medicinal_part: self.medicinal_part,
            taste_meridian: self.taste_meridian,
            properties: self.properties,
            taste: self.taste,
            meridians: self.meridians,
            effects: self.effects,
            functions: self.functions,
            clinical_application: self.clinical_application,
            prescription_name: self.prescription_name,
            usage_dosage: self.usage_dosage,
            notes: self.notes,
            formulas: self.formulas,
            literature: self.literature,
            affiliated_herbs: self.affiliated_herbs,
            images: self.images,
        })
    }
}

#[derive(Deserialize)]
struct AssetHeader {
    version: i64,
}

#[derive(Deserialize)]
struct AssetDocument {
    version: i64,
    herbs: Vec<AssetHerb>,
}

/// A fully parsed asset document.
#[derive(Debug, Clone, PartialEq)]
pub struct HerbAsset {
    pub version: i64,
    pub herbs: Vec<HerbRecord>,
}

impl HerbAsset {
    /// Reads only the `version` field, without materializing any herb.
    pub fn parse_version(json: &str) -> Result<i64, AppResponse> {
        let header: AssetHeader = serde_json::from_str(json)
            .map_err(|e| AppResponse::AssetError(format!("Invalid asset header: {e}")))?;
        Ok(header.version)
    }

    /// Parses the whole document, assigning positional ids where missing.
    pub fn parse(json: &str) -> Result<Self, AppResponse> {
        let document: AssetDocument = serde_json::from_str(json)
            .map_err(|e| AppResponse::AssetError(format!("Invalid asset document: {e}")))?;

        let herbs = document
            .herbs
            .into_iter()
            .enumerate()
            .map(|(position, herb)| herb.into_record(position))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(HerbAsset {
            version: document.version,
            herbs,
        })
    }
}

/// Persisted form of a [`HerbRecord`].
///
/// List-valued fields are kept as serialized JSON text, so a row maps one to one
/// onto a relational row with text columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HerbRow {
    pub id: u32,
    pub name: String,
    pub pin_yin: Option<String>,
    pub category: String,
    pub url: Option<String>,
    pub medicinal_part: Option<String>,
    pub taste_meridian: Option<String>,
    pub properties: Option<String>,
    pub taste: Option<String>,
    pub meridians: Option<String>,
    pub effects: Option<String>,
    pub functions: Option<String>,
    pub clinical_application: Option<String>,
    pub prescription_name: Option<String>,
    pub usage_dosage: Option<String>,
    pub notes: Option<String>,
    pub formulas: Option<String>,
    pub literature: Option<String>,
    pub affiliated_herbs: Option<String>,
    pub images: Option<String>,
}

fn list_to_blob(list: Option<Vec<String>>) -> Result<Option<String>, AppResponse> {
    list.map(|items| serde_json::to_string(&items))
        .transpose()
        .map_err(AppResponse::from)
}

fn blob_to_list(id: u32, field: &str, blob: Option<String>) -> Option<Vec<String>> {
    let blob = blob?;
    match serde_json::from_str(&blob) {
        Ok(items) => Some(items),
        Err(e) => {
            warn!("Dropping unreadable {field} list of herb {id}: {e}");
            None
        }
    }
}

impl HerbRow {
    pub fn from_record(record: HerbRecord) -> Result<Self, AppResponse> {
        Ok(HerbRow {
            id: record.id,
            name: record.name,
            pin_yin: record.pin_yin,
            category: record.category,
            url: record.url,
            medicinal_part: record.medicinal_part,
            taste_meridian: record.taste_meridian,
            properties: record.properties,
            taste: record.taste,
            meridians: list_to_blob(record.meridians)?,
            effects: record.effects,
            functions: list_to_blob(record.functions)?,
            clinical_application: list_to_blob(record.clinical_application)?,
            prescription_name: record.prescription_name,
            usage_dosage: record.usage_dosage,
            notes: list_to_blob(record.notes)?,
            formulas: list_to_blob(record.formulas)?,
            literature: list_to_blob(record.literature)?,
            affiliated_herbs: list_to_blob(record.affiliated_herbs)?,
            images: list_to_blob(record.images)?,
        })
    }

    /// Inverse of [`HerbRow::from_record`]. A list blob that no longer decodes
    /// comes back as `None` rather than failing the whole read.
    pub fn into_record(self) -> HerbRecord {
        let id = self.id;
        HerbRecord {
            id,
            name: self.name,
            pin_yin: self.pin_yin,
            category: self.category,
            url: self.url,
            medicinal_part: self.medicinal_part,
            taste_meridian: self.taste_meridian,
            properties: self.properties,
            taste: self.taste,
            meridians: blob_to_list(id, "meridians", self.meridians),
            effects: self.effects,
            functions: blob_to_list(id, "functions", self.functions),
            clinical_application: blob_to_list(id, "clinical_application", self.clinical_application),
            prescription_name: self.prescription_name,
            usage_dosage: self.usage_dosage,
            notes: blob_to_list(id, "notes", self.notes),
            formulas: blob_to_list(id, "formulas", self.formulas),
            literature: blob_to_list(id, "literature", self.literature),
            affiliated_herbs: blob_to_list(id, "affiliated_herbs", self.affiliated_herbs),
            images: blob_to_list(id, "images", self.images),
        }
    }
}

/// The single row of the `version_info` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    pub version: i64,
    /// Epoch milliseconds of the last successful sync.
    pub last_updated: i64,
}
