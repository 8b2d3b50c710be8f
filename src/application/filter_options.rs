//! Option lists for the region filters and their province-driven cascade.

use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::application::repos::{FilterOptionsRepo, RepoError};
use crate::domain::filters::MuralFilters;
use crate::util::lock::lock_state;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptionsState {
    pub provinces: Vec<String>,
    pub municipalities: Vec<String>,
    pub neighborhoods: Vec<String>,
    pub is_loading: bool,
}

#[derive(Clone, Copy)]
enum OptionList {
    Provinces,
    Municipalities,
    Neighborhoods,
}

impl OptionList {
    fn name(self) -> &'static str {
        match self {
            OptionList::Provinces => "provinces",
            OptionList::Municipalities => "municipalities",
            OptionList::Neighborhoods => "neighborhoods",
        }
    }

    fn slot(self, state: &mut FilterOptionsState) -> &mut Vec<String> {
        match self {
            OptionList::Provinces => &mut state.provinces,
            OptionList::Municipalities => &mut state.municipalities,
            OptionList::Neighborhoods => &mut state.neighborhoods,
        }
    }
}

pub struct FilterOptions {
    repo: Arc<dyn FilterOptionsRepo>,
    state: Mutex<FilterOptionsState>,
}

impl FilterOptions {
    pub fn new(repo: Arc<dyn FilterOptionsRepo>) -> Self {
        Self {
            repo,
            state: Mutex::new(FilterOptionsState::default()),
        }
    }

    pub fn snapshot(&self) -> FilterOptionsState {
        lock_state(&self.state, "filter_options").clone()
    }

    pub async fn fetch_provinces(&self) {
        self.begin();
        let result = self.repo.provinces().await;
        self.finish(OptionList::Provinces, result);
    }

    pub async fn fetch_municipalities(&self, province: &str) {
        self.begin();
        let result = self.repo.municipalities(province).await;
        self.finish(OptionList::Municipalities, result);
    }

    pub async fn fetch_neighborhoods(&self, province: &str, municipality: Option<&str>) {
        self.begin();
        let result = self.repo.neighborhoods(province, municipality).await;
        self.finish(OptionList::Neighborhoods, result);
    }

    pub fn clear_municipalities(&self) {
        lock_state(&self.state, "filter_options")
            .municipalities
            .clear();
    }

    pub fn clear_neighborhoods(&self) {
        lock_state(&self.state, "filter_options")
            .neighborhoods
            .clear();
    }

    /// Bring the dependent lists in line with the selected filters.
    ///
    /// Municipalities exist only under a non-capital province; neighborhoods
    /// are listed for any selected province, narrowed by municipality when
    /// one is chosen.
    pub async fn sync_with(&self, filters: &MuralFilters) {
        let municipalities = async {
            if filters.municipality_applicable() {
                self.fetch_municipalities(&filters.province).await;
            } else {
                self.clear_municipalities();
            }
        };
        let neighborhoods = async {
            if filters.has_province() {
                let municipality =
                    Some(filters.municipality.as_str()).filter(|m| !m.is_empty());
                self.fetch_neighborhoods(&filters.province, municipality)
                    .await;
            } else {
                self.clear_neighborhoods();
            }
        };
        futures::join!(municipalities, neighborhoods);
    }

    fn begin(&self) {
        lock_state(&self.state, "filter_options").is_loading = true;
    }

    fn finish(&self, list: OptionList, result: Result<Vec<String>, RepoError>) {
        let mut state = lock_state(&self.state, "filter_options");
        state.is_loading = false;
        match result {
            Ok(values) => *list.slot(&mut state) = values,
            Err(err) => warn!(
                target = "murales::application::filter_options",
                list = list.name(),
                error = %err,
                "Failed to fetch filter options"
            ),
        }
    }
}
