//! Administrative regions of the gallery: province, municipality, neighborhood.
//!
//! The capital district (Ciudad Autónoma de Buenos Aires) sits at province
//! level but has no municipality tier, and geocoders and users spell it many
//! ways. All matching here runs over an accent-folded form of the text.

use slug::slugify;

/// Canonical display name of the capital district.
pub const CAPITAL_DISTRICT: &str = "Ciudad Autónoma de Buenos Aires";

/// Folded fragments that mark a province filter value as the capital district.
const CAPITAL_FILTER_MARKERS: &[&str] = &["ciudad", "caba", "autonoma"];

/// Buenos Aires city center.
pub const BUENOS_AIRES_CENTER: Coordinates = Coordinates {
    latitude: -34.6037,
    longitude: -58.3816,
};

/// Zoom level used when centering a map on [`BUENOS_AIRES_CENTER`].
pub const DEFAULT_ZOOM: u8 = 12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Lowercase, strip accents and collapse every run of non-alphanumerics to
/// a single `-`, so `"Ciudad Autónoma"` and `"ciudad autonoma"` compare equal.
pub fn fold(text: &str) -> String {
    slugify(text)
}

/// Accent- and case-insensitive substring test.
pub fn folded_contains(haystack: &str, needle: &str) -> bool {
    let needle = fold(needle);
    if needle.is_empty() {
        return false;
    }
    fold(haystack).contains(&needle)
}

/// Whether a province value entered as a filter denotes the capital district.
pub fn is_capital_district(province: &str) -> bool {
    let folded = fold(province);
    CAPITAL_FILTER_MARKERS
        .iter()
        .any(|marker| folded.contains(marker))
}
