//! Suggestion chips for the home screen.
//!
//! Distinct function tags and clinical-application phrases are collected across
//! the catalog, shuffled once, and then served unchanged for the life of the
//! process.

use std::collections::HashSet;

use rand::seq::SliceRandom;

use crate::herb_model::HerbRecord;

pub const FALLBACK_FUNCTIONS: &[&str] = &[
    "补气", "清热", "解毒", "活血", "安神", "止咳", "健脾", "利水",
];

pub const FALLBACK_CLINICAL_APPLICATIONS: &[&str] = &[
    "咳嗽", "失眠", "头痛", "发热", "腹泻", "水肿", "便秘", "眩晕",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendations {
    functions: Vec<String>,
    clinical_applications: Vec<String>,
}

fn distinct<'a>(lists: impl Iterator<Item = &'a Option<Vec<String>>>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tags = Vec::new();
    for item in lists.flatten().flatten() {
        if !item.trim().is_empty() && seen.insert(item.as_str()) {
            tags.push(item.clone());
        }
    }
    tags
}

fn or_fallback(mut tags: Vec<String>, fallback: &[&str]) -> Vec<String> {
    if tags.is_empty() {
        return fallback.iter().map(|tag| tag.to_string()).collect();
    }
    tags.shuffle(&mut rand::thread_rng());
    tags
}

impl Recommendations {
    /// Derives both lists from `herbs`. A list with no source tags is replaced
    /// by its fixed fallback, so neither list is ever empty.
    pub fn from_herbs(herbs: &[HerbRecord]) -> Self {
        let functions = distinct(herbs.iter().map(|herb| &herb.functions));
        let clinical_applications = distinct(herbs.iter().map(|herb| &herb.clinical_application));

        Recommendations {
            functions: or_fallback(functions, FALLBACK_FUNCTIONS),
            clinical_applications: or_fallback(clinical_applications, FALLBACK_CLINICAL_APPLICATIONS),
        }
    }

    pub fn fallback() -> Self {
        Recommendations {
            functions: or_fallback(Vec::new(), FALLBACK_FUNCTIONS),
            clinical_applications: or_fallback(Vec::new(), FALLBACK_CLINICAL_APPLICATIONS),
        }
    }

    pub fn functions(&self, count: usize) -> Vec<String> {
        self.functions.iter().take(count).cloned().collect()
    }

    pub fn clinical_applications(&self, count: usize) -> Vec<String> {
        self.clinical_applications.iter().take(count).cloned().collect()
    }
}
