//! Reverse-geocoding address resolution.
//!
//! Geocoders return several candidate results for a point, each with typed
//! address components. The gallery needs a three-tier hierarchy out of them:
//! province, municipality and neighborhood.

use serde::{Deserialize, Serialize};

use super::region::{CAPITAL_DISTRICT, folded_contains};

const PROVINCE_TYPE: &str = "administrative_area_level_1";
const MUNICIPALITY_TYPE: &str = "administrative_area_level_2";
const NEIGHBORHOOD_TYPES: &[&str] = &["sublocality_level_1", "neighborhood", "locality"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

impl AddressComponent {
    fn has_type(&self, wanted: &str) -> bool {
        self.types.iter().any(|t| t == wanted)
    }

    fn has_any_type(&self, wanted: &[&str]) -> bool {
        wanted.iter().any(|w| self.has_type(w))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub formatted_address: String,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
}

/// Administrative location of a point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeocodedAddress {
    /// Empty when no result carried a first-level area.
    pub province: String,
    /// `None` inside the capital district.
    pub municipality: Option<String>,
    pub neighborhood: Option<String>,
    pub formatted_address: String,
}

/// Resolve the administrative hierarchy from geocoder output.
///
/// Each field takes the first matching component across all results and is
/// never overwritten afterwards. Returns `None` when there are no results.
pub fn resolve_address(results: &[GeocodeResult]) -> Option<GeocodedAddress> {
    let first = results.first()?;

    let mut province: Option<&str> = None;
    let mut municipality: Option<&str> = None;
    let mut neighborhood: Option<&str> = None;

    for component in results.iter().flat_map(|r| r.address_components.iter()) {
        if province.is_none() && component.has_type(PROVINCE_TYPE) {
            province = Some(component.long_name.as_str());
        }
        if municipality.is_none() && component.has_type(MUNICIPALITY_TYPE) {
            municipality = Some(component.long_name.as_str());
        }
        if neighborhood.is_none() && component.has_any_type(NEIGHBORHOOD_TYPES) {
            neighborhood = Some(component.long_name.as_str());
        }
    }

    let mut address = GeocodedAddress {
        province: province.unwrap_or_default().to_string(),
        municipality: municipality.map(str::to_string),
        neighborhood: neighborhood.map(str::to_string),
        formatted_address: first.formatted_address.clone(),
    };

    if looks_like_capital_district(&address) {
        address.province = CAPITAL_DISTRICT.to_string();
        address.municipality = None;
    }

    Some(address)
}

/// String heuristic separating the capital district from the surrounding
/// province of the same name. The geocoder reports both as "Buenos Aires"
/// in some responses; only the capital lacks a second-level area.
fn looks_like_capital_district(address: &GeocodedAddress) -> bool {
    let province = address.province.as_str();
    if folded_contains(province, "ciudad autónoma") {
        return true;
    }
    folded_contains(province, "buenos aires")
        && (folded_contains(&address.formatted_address, "caba") || address.municipality.is_none())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(name: &str, types: &[&str]) -> AddressComponent {
        AddressComponent {
            long_name: name.to_string(),
            short_name: name.to_string(),
            types: types.iter().map(|t| (*t).to_string()).collect(),
        }
    }

    fn result(formatted: &str, components: Vec<AddressComponent>) -> GeocodeResult {
        GeocodeResult {
            formatted_address: formatted.to_string(),
            address_components: components,
        }
    }

    #[test]
    fn empty_input_resolves_to_nothing() {
        assert_eq!(resolve_address(&[]), None);
    }

    #[test]
    fn first_match_wins_across_results() {
        let results = vec![
            result(
                "Calle 1, X",
                vec![component("X", &["administrative_area_level_1", "political"])],
            ),
            result(
                "Calle 1, Y",
                vec![
                    component("Y", &["administrative_area_level_1"]),
                    component("Rosario", &["administrative_area_level_2"]),
                    component("Centro", &["locality"]),
                ],
            ),
        ];
        let resolved = resolve_address(&results).expect("resolved");
        assert_eq!(resolved.province, "X");
        assert_eq!(resolved.municipality.as_deref(), Some("Rosario"));
        assert_eq!(resolved.neighborhood.as_deref(), Some("Centro"));
        assert_eq!(resolved.formatted_address, "Calle 1, X");
    }

    #[test]
    fn neighborhood_takes_first_of_any_kind() {
        let results = vec![result(
            "",
            vec![
                component("Quilmes", &["locality", "political"]),
                component("Bernal", &["sublocality_level_1"]),
            ],
        )];
        let resolved = resolve_address(&results).expect("resolved");
        assert_eq!(resolved.neighborhood.as_deref(), Some("Quilmes"));
    }

    #[test]
    fn buenos_aires_without_municipality_is_capital() {
        let results = vec![result(
            "Av. Corrientes 1234, Buenos Aires, Argentina",
            vec![
                component("Buenos Aires", &["administrative_area_level_1"]),
                component("San Nicolás", &["neighborhood"]),
            ],
        )];
        let resolved = resolve_address(&results).expect("resolved");
        assert_eq!(resolved.province, CAPITAL_DISTRICT);
        assert_eq!(resolved.municipality, None);
        assert_eq!(resolved.neighborhood.as_deref(), Some("San Nicolás"));
    }

    #[test]
    fn caba_in_address_forces_capital_even_with_municipality() {
        let results = vec![result(
            "Defensa 500, C1065 CABA, Argentina",
            vec![
                component("Buenos Aires", &["administrative_area_level_1"]),
                component("Comuna 1", &["administrative_area_level_2"]),
            ],
        )];
        let resolved = resolve_address(&results).expect("resolved");
        assert_eq!(resolved.province, CAPITAL_DISTRICT);
        assert_eq!(resolved.municipality, None);
    }

    #[test]
    fn autonomous_city_name_without_accent_is_capital() {
        let results = vec![result(
            "Palermo",
            vec![
                component("Ciudad Autonoma de Buenos Aires", &["administrative_area_level_1"]),
                component("Comuna 14", &["administrative_area_level_2"]),
            ],
        )];
        let resolved = resolve_address(&results).expect("resolved");
        assert_eq!(resolved.province, CAPITAL_DISTRICT);
        assert_eq!(resolved.municipality, None);
    }

    #[test]
    fn surrounding_province_with_municipality_is_kept() {
        let results = vec![result(
            "Av. Calchaquí 100, Quilmes, Provincia de Buenos Aires",
            vec![
                component("Provincia de Buenos Aires", &["administrative_area_level_1"]),
                component("Quilmes", &["administrative_area_level_2"]),
            ],
        )];
        let resolved = resolve_address(&results).expect("resolved");
        assert_eq!(resolved.province, "Provincia de Buenos Aires");
        assert_eq!(resolved.municipality.as_deref(), Some("Quilmes"));
    }

    #[test]
    fn missing_province_stays_empty() {
        let results = vec![result("Somewhere", vec![component("Centro", &["locality"])])];
        let resolved = resolve_address(&results).expect("resolved");
        assert!(resolved.province.is_empty());
    }

    #[test]
    fn resolution_is_idempotent() {
        let results = vec![result(
            "Defensa 500, CABA",
            vec![
                component("Buenos Aires", &["administrative_area_level_1"]),
                component("San Telmo", &["neighborhood"]),
            ],
        )];
        assert_eq!(resolve_address(&results), resolve_address(&results));
    }
}
