#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Canonical venue feature model.
//!
//! Every data provider (government open-data endpoint, places-search API,
//! static geometry file, synthetic dataset) normalizes its records into
//! [`VenueFeature`]s grouped in a [`VenueCollection`]. The serde shapes
//! serialize exactly as the GeoJSON payloads the map frontend consumes.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The organization a venue record came from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Provider {
    /// Área Metropolitana del Valle de Aburrá (EnCicla bike-share).
    Amva,
    /// INDER Medellín (public sports venues and ciclovías).
    Inder,
    /// Metro de Medellín.
    Metro,
    /// Alcaldía de Medellín open geography (ciclorrutas).
    Medellin,
    /// Google Places search results.
    Google,
}

/// Activity category a venue is classified into.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VenueCategory {
    Run,
    Bike,
    Swim,
    Ciclovia,
    Metro,
    Multi,
}

/// Identifier for one of the six configured data sources.
///
/// The string form doubles as the cache key, the rendering-surface source
/// handle, and the API route segment (`/api/<source-id>`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SourceId {
    Encicla,
    InderVenues,
    Ciclorrutas,
    CicloviasInder,
    MetroStations,
    GooglePlaces,
}

impl SourceId {
    /// All configured sources, in presentation order.
    pub const ALL: [Self; 6] = [
        Self::Encicla,
        Self::InderVenues,
        Self::Ciclorrutas,
        Self::CicloviasInder,
        Self::MetroStations,
        Self::GooglePlaces,
    ];
}

/// Venue geometry, serialized as a GeoJSON geometry object.
///
/// Coordinates are `[longitude, latitude]` pairs in decimal degrees (WGS84).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point([f64; 2]),
    LineString(Vec<[f64; 2]>),
}

impl Geometry {
    /// Iterates over every `[lng, lat]` pair in the geometry.
    pub fn positions(&self) -> impl Iterator<Item = &[f64; 2]> {
        match self {
            Self::Point(p) => std::slice::from_ref(p).iter(),
            Self::LineString(line) => line.iter(),
        }
    }

    /// Returns `true` when every position is finite and within WGS84 bounds
    /// (longitude ∈ [-180, 180], latitude ∈ [-90, 90]) and the geometry is
    /// non-empty.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let mut any = false;
        for &[lng, lat] in self.positions() {
            any = true;
            if !lng.is_finite() || !lat.is_finite() {
                return false;
            }
            if !(-180.0..=180.0).contains(&lng) || !(-90.0..=90.0).contains(&lat) {
                return false;
            }
        }
        any
    }
}

/// Property bag shared by all normalized venue features.
///
/// Field names on the wire match the payloads the original data portals
/// publish (`horario`, `distancia_km`, `vicinity`, ...), so the frontend's
/// popups keep working unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueProps {
    /// Provider record id (e.g. the EnCicla station id).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Google Places identifier, kept under its own wire name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub category: VenueCategory,
    pub provider: Provider,
    /// Opening schedule, e.g. `"Domingos 7:00 AM - 2:00 PM"`.
    #[serde(
        rename = "horario",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub schedule: Option<String>,
    #[serde(
        rename = "distancia_km",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub distance_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(
        rename = "user_ratings_total",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub review_count: Option<u64>,
    #[serde(
        rename = "vicinity",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_now: Option<bool>,
    /// Bike-share dock count, only set by the EnCicla source.
    #[serde(
        rename = "total_anclajes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub dock_count: Option<u64>,
    /// Metro line letter (`"A"` / `"B"`), only set by the Metro source.
    #[serde(rename = "linea", default, skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,
}

impl VenueProps {
    /// Creates a property bag with only the required fields set.
    #[must_use]
    pub fn new(name: impl Into<String>, category: VenueCategory, provider: Provider) -> Self {
        Self {
            id: None,
            place_id: None,
            name: name.into(),
            category,
            provider,
            schedule: None,
            distance_km: None,
            url: None,
            rating: None,
            review_count: None,
            address: None,
            open_now: None,
            dock_count: None,
            line: None,
        }
    }
}

/// Marker for the GeoJSON `"type": "Feature"` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
enum FeatureKind {
    #[default]
    Feature,
}

/// A single normalized venue, serialized as a GeoJSON `Feature`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueFeature {
    #[serde(rename = "type", default)]
    kind: FeatureKind,
    pub geometry: Geometry,
    pub properties: VenueProps,
}

impl VenueFeature {
    /// Builds a feature, rejecting geometry with out-of-range or non-finite
    /// coordinates. Callers drop `None` rather than keeping malformed records.
    #[must_use]
    pub fn new(geometry: Geometry, properties: VenueProps) -> Option<Self> {
        geometry.is_valid().then_some(Self {
            kind: FeatureKind::Feature,
            geometry,
            properties,
        })
    }
}

/// Marker for the GeoJSON `"type": "FeatureCollection"` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
enum CollectionKind {
    #[default]
    FeatureCollection,
}

/// An ordered, immutable set of venue features from one source.
///
/// Serializes as a GeoJSON `FeatureCollection`; the source tag is internal
/// bookkeeping and stays off the wire. A refetch produces a brand-new
/// collection, never a mutation of a previous one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VenueCollection {
    #[serde(rename = "type")]
    kind: CollectionKind,
    #[serde(skip)]
    pub source: SourceId,
    pub features: Vec<VenueFeature>,
}

impl VenueCollection {
    #[must_use]
    pub fn new(source: SourceId, features: Vec<VenueFeature>) -> Self {
        Self {
            kind: CollectionKind::FeatureCollection,
            source,
            features,
        }
    }

    #[must_use]
    pub fn empty(source: SourceId) -> Self {
        Self::new(source, Vec::new())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Number of features classified into `category`.
    #[must_use]
    pub fn count_category(&self, category: VenueCategory) -> usize {
        self.features
            .iter()
            .filter(|f| f.properties.category == category)
            .count()
    }
}

/// Parses a decimal-degree coordinate, tolerating a comma decimal separator
/// (`"6,2518"` → `6.2518`) as published by the Colombian open-data portals.
///
/// Returns `None` for non-numeric or non-finite input; bounds are checked
/// later by [`VenueFeature::new`].
#[must_use]
pub fn parse_coord(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn parses_comma_decimal_coordinates() {
        assert_eq!(parse_coord("6,2518"), Some(6.2518));
        assert_eq!(parse_coord(" -75.5812 "), Some(-75.5812));
        assert_eq!(parse_coord("-75,5812"), Some(-75.5812));
    }

    #[test]
    fn rejects_non_numeric_coordinates() {
        assert_eq!(parse_coord(""), None);
        assert_eq!(parse_coord("N/A"), None);
        assert_eq!(parse_coord("6.25.18"), None);
        assert_eq!(parse_coord("NaN"), None);
        assert_eq!(parse_coord("inf"), None);
    }

    #[test]
    fn feature_rejects_out_of_range_coordinates() {
        let props = VenueProps::new("Test", VenueCategory::Bike, Provider::Amva);
        assert!(VenueFeature::new(Geometry::Point([-75.58, 6.25]), props.clone()).is_some());
        assert!(VenueFeature::new(Geometry::Point([-200.0, 6.25]), props.clone()).is_none());
        assert!(VenueFeature::new(Geometry::Point([-75.58, 91.0]), props.clone()).is_none());
        assert!(VenueFeature::new(Geometry::Point([f64::NAN, 6.25]), props.clone()).is_none());
        assert!(VenueFeature::new(Geometry::LineString(Vec::new()), props).is_none());
    }

    #[test]
    fn feature_serializes_as_geojson() {
        let mut props = VenueProps::new("Estación EnCicla Poblado", VenueCategory::Bike, Provider::Amva);
        props.schedule = Some("24/7".to_string());
        let feature = VenueFeature::new(Geometry::Point([-75.5812, 6.2518]), props).unwrap();
        let json = serde_json::to_value(&feature).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [-75.5812, 6.2518],
                },
                "properties": {
                    "name": "Estación EnCicla Poblado",
                    "type": "bike",
                    "provider": "AMVA",
                    "horario": "24/7",
                },
            })
        );
    }

    #[test]
    fn collection_serializes_without_source_tag() {
        let collection = VenueCollection::empty(SourceId::MetroStations);
        let json = serde_json::to_value(&collection).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "FeatureCollection", "features": [] })
        );
    }

    #[test]
    fn source_ids_round_trip_as_kebab_case() {
        assert_eq!(SourceId::InderVenues.to_string(), "inder-venues");
        assert_eq!(SourceId::CicloviasInder.to_string(), "ciclovias-inder");
        assert_eq!(
            "google-places".parse::<SourceId>().unwrap(),
            SourceId::GooglePlaces
        );
        assert_eq!(SourceId::ALL.len(), 6);
    }

    #[test]
    fn place_and_station_ids_keep_their_wire_names() {
        let mut props = VenueProps::new("Piscina Tranvía", VenueCategory::Swim, Provider::Google);
        props.place_id = Some("ChIJabc123".to_string());
        let json = serde_json::to_value(&props).unwrap();
        assert_eq!(json["place_id"], "ChIJabc123");
        assert!(json.get("id").is_none());

        let mut props = VenueProps::new("Estación Poblado", VenueCategory::Bike, Provider::Amva);
        props.id = Some("221".to_string());
        props.dock_count = Some(20);
        let json = serde_json::to_value(&props).unwrap();
        assert_eq!(json["id"], "221");
        assert_eq!(json["total_anclajes"], 20);
        assert!(json.get("place_id").is_none());
    }

    proptest! {
        // Comma and period decimal separators parse to the same value.
        #[test]
        fn comma_and_period_decimals_parse_alike(value in -200.0f64..200.0) {
            let period = format!("{value}");
            let comma = period.replace('.', ",");
            prop_assert_eq!(parse_coord(&comma), parse_coord(&period));
        }

        // parse_coord is total: arbitrary input never panics and never
        // yields a non-finite value.
        #[test]
        fn parse_coord_rejects_or_normalizes_arbitrary_input(raw in "\\PC*") {
            if let Some(value) = parse_coord(&raw) {
                prop_assert!(value.is_finite());
            }
        }

        // A point feature is accepted exactly when both coordinates are
        // finite and within WGS84 bounds.
        #[test]
        fn feature_accepts_exactly_in_range_points(
            lng in prop::num::f64::ANY,
            lat in prop::num::f64::ANY,
        ) {
            let in_range = lng.is_finite()
                && lat.is_finite()
                && (-180.0..=180.0).contains(&lng)
                && (-90.0..=90.0).contains(&lat);
            let props = VenueProps::new("p", VenueCategory::Multi, Provider::Inder);
            prop_assert_eq!(
                VenueFeature::new(Geometry::Point([lng, lat]), props).is_some(),
                in_range
            );
        }

        // Out-of-range latitudes in comma-decimal string form parse fine
        // but are excluded at feature construction.
        #[test]
        fn out_of_range_coordinate_strings_are_excluded(lat in 90.001f64..1.0e6) {
            let raw = format!("{lat}").replace('.', ",");
            let parsed = parse_coord(&raw).expect("numeric string parses");
            let props = VenueProps::new("p", VenueCategory::Multi, Provider::Inder);
            prop_assert!(VenueFeature::new(Geometry::Point([-75.58, parsed]), props).is_none());
        }
    }

    #[test]
    fn line_string_feature_deserializes() {
        let raw = serde_json::json!({
            "type": "Feature",
            "geometry": {
                "type": "LineString",
                "coordinates": [[-75.5812, 6.2518], [-75.5798, 6.2501]],
            },
            "properties": {
                "name": "Cicloruta Principal",
                "type": "bike",
                "provider": "MEDELLIN",
            },
        });
        let feature: VenueFeature = serde_json::from_value(raw).unwrap();
        assert_eq!(feature.properties.category, VenueCategory::Bike);
        assert_eq!(feature.properties.provider, Provider::Medellin);
        assert!(feature.geometry.is_valid());
    }
}
