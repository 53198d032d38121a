//! Screen-level state built on top of [`HerbRepository`].
//!
//! [`CatalogBrowser`] backs the paginated herb list (category tabs plus a search
//! box); [`load_home`] and [`load_detail`] back the home and detail screens.

use log::warn;
use serde::Serialize;

use crate::app_response::AppResponse;
use crate::herb_model::HerbRecord;
use crate::herb_repository::HerbRepository;
use crate::resource::Resource;

/// Everything the home screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeSummary {
    pub featured_herbs: Vec<HerbRecord>,
    pub categories: Vec<String>,
    pub recommended_functions: Vec<String>,
    pub recommended_clinical_applications: Vec<String>,
}

pub fn home_summary(repository: &HerbRepository) -> Result<HomeSummary, AppResponse> {
    let config = repository.config();
    Ok(HomeSummary {
        featured_herbs: repository.get_page(0, config.featured_count)?,
        categories: repository.list_categories()?,
        recommended_functions: repository.recommended_functions(config.recommendation_count),
        recommended_clinical_applications: repository
            .recommended_clinical_applications(config.recommendation_count),
    })
}

pub fn load_home(repository: &HerbRepository) -> Resource<HomeSummary> {
    Resource::from_result(home_summary(repository))
}

/// A missing herb is an error at this level: the detail screen has nothing
/// to show but the retry affordance.
pub fn load_detail(repository: &HerbRepository, id: u32) -> Resource<HerbRecord> {
    match repository.get_by_id(id) {
        Ok(Some(herb)) => Resource::Ready(herb),
        Ok(None) => Resource::failed("Herb not found"),
        Err(e) => {
            warn!("Failed to load herb {id}: {e}");
            Resource::failed(e.message())
        }
    }
}

/// State of the herb list screen.
///
/// The active filter decides which query runs: category and search text
/// together, either alone, or the plain catalog. Pages accumulate until a page
/// comes back shorter than `page_size`.
pub struct CatalogBrowser {
    repository: HerbRepository,
    page_size: usize,
    selected_category: Option<String>,
    query: String,
    current_page: usize,
    requested_page: usize,
    herbs: Vec<HerbRecord>,
    has_more: bool,
    status: Resource<()>,
}

impl CatalogBrowser {
    pub fn new(repository: HerbRepository) -> Self {
        let page_size = repository.config().page_size;
        CatalogBrowser {
            repository,
            page_size,
            selected_category: None,
            query: String::new(),
            current_page: 0,
            requested_page: 0,
            herbs: Vec::new(),
            has_more: true,
            status: Resource::Pending,
        }
    }

    pub fn herbs(&self) -> &[HerbRecord] {
        &self.herbs
    }

    pub fn status(&self) -> &Resource<()> {
        &self.status
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn selected_category(&self) -> Option<&str> {
        self.selected_category.as_deref()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Reloads the first page with the current filter.
    pub fn refresh(&mut self) -> &Resource<()> {
        self.load_page(0)
    }

    pub fn load_more(&mut self) -> &Resource<()> {
        if !self.has_more {
            return &self.status;
        }
        self.load_page(self.current_page + 1)
    }

    /// Switches category tabs, clearing the search text. Re-selecting the
    /// current tab while it already shows data does nothing.
    pub fn select_category(&mut self, category: &str) -> &Resource<()> {
        if self.selected_category.as_deref() == Some(category) && self.status.is_ready() && !self.herbs.is_empty() {
            return &self.status;
        }
        self.selected_category = Some(category.to_string());
        self.query.clear();
        self.load_page(0)
    }

    /// Switches the category tab without clearing the search text or
    /// running a query. The next search or refresh applies it.
    pub fn set_category(&mut self, category: Option<&str>) {
        self.selected_category = category.map(str::to_string);
    }

    /// Updates the search text without running a query.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Runs a search within the selected category, if any.
    pub fn search(&mut self, query: impl Into<String>) -> &Resource<()> {
        self.query = query.into();
        self.load_page(0)
    }

    /// Clears the search text, keeping the category. Reloads only if a search
    /// was active.
    pub fn reset_search(&mut self) -> &Resource<()> {
        if self.query.trim().is_empty() {
            self.query.clear();
            return &self.status;
        }
        self.query.clear();
        self.load_page(0)
    }

    pub fn reset_to_all(&mut self) -> &Resource<()> {
        self.query.clear();
        self.selected_category = None;
        self.load_page(0)
    }

    /// Repeats the last requested page.
    pub fn retry(&mut self) -> &Resource<()> {
        self.load_page(self.requested_page)
    }

    fn load_page(&mut self, page: usize) -> &Resource<()> {
        self.requested_page = page;
        self.status = Resource::Pending;

        let offset = page * self.page_size;
        let limit = self.page_size;
        let query = self.query.trim();

        let result = match (self.selected_category.as_deref(), query.is_empty()) {
            (Some(category), false) => self.repository.search_within_category(category, query, offset, limit),
            (None, false) => self.repository.search(query, offset, limit),
            (Some(category), true) => self.repository.get_by_category(category, offset, limit),
            (None, true) => self.repository.get_page(offset, limit),
        };

        match result {
            Ok(herbs) => {
                self.has_more = herbs.len() == self.page_size;
                if page == 0 {
                    self.herbs = herbs;
                } else {
                    self.herbs.extend(herbs);
                }
                self.current_page = page;
                self.status = Resource::Ready(());
            }
            Err(e) => {
                warn!("Failed to load herb page {page}: {e}");
                self.status = Resource::failed(e.message());
            }
        }

        &self.status
    }
}
