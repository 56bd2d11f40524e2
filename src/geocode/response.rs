//! Nominatim `/reverse` response body (`format=json&addressdetails=1`).

use serde::Deserialize;

use crate::models::{LookupResult, Placeholders};

#[derive(Debug, Deserialize)]
pub struct ReverseResponse {
    pub address: Option<AddressDetails>,
    /// Present instead of `address` when nothing is near the point
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddressDetails {
    pub road: Option<String>,
    pub suburb: Option<String>,
    pub neighbourhood: Option<String>,
}

impl AddressDetails {
    /// Street and area, each falling back to its own placeholder
    pub fn to_lookup(&self, placeholders: &Placeholders) -> LookupResult {
        let street = non_blank(&self.road).unwrap_or(&placeholders.street);
        let neighborhood = non_blank(&self.suburb)
            .or_else(|| non_blank(&self.neighbourhood))
            .unwrap_or(&placeholders.neighborhood);
        LookupResult::new(street, neighborhood)
    }
}

fn non_blank(value: &Option<String>) -> Option<&String> {
    value.as_ref().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> ReverseResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_road_and_suburb() {
        let response = parse(r#"{"address": {"road": "Rua X", "suburb": "Bairro Y"}}"#);
        let result = response.address.unwrap().to_lookup(&Placeholders::default());
        assert_eq!(result, LookupResult::new("Rua X", "Bairro Y"));
    }

    #[test]
    fn test_suburb_preferred_over_neighbourhood() {
        let response = parse(
            r#"{"address": {"road": "Rua X", "suburb": "Bairro Y", "neighbourhood": "Vila Z"}}"#,
        );
        let result = response.address.unwrap().to_lookup(&Placeholders::default());
        assert_eq!(result.neighborhood, "Bairro Y");
    }

    #[test]
    fn test_neighbourhood_fallback() {
        let response = parse(r#"{"address": {"road": "Rua X", "neighbourhood": "Vila Z"}}"#);
        let result = response.address.unwrap().to_lookup(&Placeholders::default());
        assert_eq!(result.neighborhood, "Vila Z");
    }

    #[test]
    fn test_missing_fields_are_independent() {
        let placeholders = Placeholders::default();

        let no_road = parse(r#"{"address": {"suburb": "Bairro Y"}}"#);
        let result = no_road.address.unwrap().to_lookup(&placeholders);
        assert_eq!(result, LookupResult::new(&placeholders.street, "Bairro Y"));

        let no_area = parse(r#"{"address": {"road": "Rua X", "city": "São Paulo"}}"#);
        let result = no_area.address.unwrap().to_lookup(&placeholders);
        assert_eq!(result, LookupResult::new("Rua X", &placeholders.neighborhood));
    }

    #[test]
    fn test_error_body_has_no_address() {
        let response = parse(r#"{"error": "Unable to geocode"}"#);
        assert!(response.address.is_none());
        assert_eq!(response.error.as_deref(), Some("Unable to geocode"));
    }
}
