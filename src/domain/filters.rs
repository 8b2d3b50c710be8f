//! Query parameters of the public mural list.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::region::is_capital_district;

/// Filter fields of the public list. An empty string means "unset".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuralFilters {
    pub name: String,
    pub province: String,
    pub municipality: String,
    pub neighborhood: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    Name,
    Province,
    Municipality,
    Neighborhood,
}

impl FilterKey {
    pub const ALL: [FilterKey; 4] = [
        FilterKey::Name,
        FilterKey::Province,
        FilterKey::Municipality,
        FilterKey::Neighborhood,
    ];

    /// Query parameter name sent to the backend.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterKey::Name => "name",
            FilterKey::Province => "province",
            FilterKey::Municipality => "municipality",
            FilterKey::Neighborhood => "neighborhood",
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("unknown filter `{s}`"))
    }
}

impl MuralFilters {
    pub fn get(&self, key: FilterKey) -> &str {
        match key {
            FilterKey::Name => &self.name,
            FilterKey::Province => &self.province,
            FilterKey::Municipality => &self.municipality,
            FilterKey::Neighborhood => &self.neighborhood,
        }
    }

    /// Update one field. Choosing the capital district as province drops the
    /// municipality, which that tier does not have.
    pub fn set(&mut self, key: FilterKey, value: impl Into<String>) {
        let value = value.into();
        let capital = key == FilterKey::Province && is_capital_district(&value);
        match key {
            FilterKey::Name => self.name = value,
            FilterKey::Province => self.province = value,
            FilterKey::Municipality => self.municipality = value,
            FilterKey::Neighborhood => self.neighborhood = value,
        }
        if capital {
            self.municipality.clear();
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        FilterKey::ALL.into_iter().all(|key| self.get(key).is_empty())
    }

    pub fn has_province(&self) -> bool {
        !self.province.is_empty()
    }

    /// Municipality options only exist for a selected, non-capital province.
    pub fn municipality_applicable(&self) -> bool {
        self.has_province() && !is_capital_district(&self.province)
    }

    /// Set fields in a fixed order: name, province, municipality, neighborhood.
    pub fn non_empty(&self) -> impl Iterator<Item = (FilterKey, &str)> {
        FilterKey::ALL
            .into_iter()
            .map(|key| (key, self.get(key)))
            .filter(|(_, value)| !value.is_empty())
    }
}

/// A list request: filters plus the 1-indexed page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuralQuery {
    pub page: u32,
    pub filters: MuralFilters,
}

impl MuralQuery {
    pub fn new(page: u32, filters: MuralFilters) -> Self {
        Self { page, filters }
    }

    /// `page` first, then every non-empty filter.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string())];
        pairs.extend(
            self.filters
                .non_empty()
                .map(|(key, value)| (key.as_str(), value.to_string())),
        );
        pairs
    }
}
