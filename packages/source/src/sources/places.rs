//! Google Places search aggregator.
//!
//! Issues one text query per keyword per activity category against a
//! bounding region centered on Medellín, sequentially with a small delay
//! between requests to respect API rate limits. Results are merged and
//! de-duplicated by `place_id` (first occurrence wins). Availability is a
//! pure function of credential presence, checked once at construction:
//! without a key the adapter short-circuits to an empty collection.

use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tri_map_venue_models::{
    Geometry, Provider, SourceId, VenueCategory, VenueCollection, VenueFeature, VenueProps,
};

use crate::retry::{self, AGGREGATOR_ATTEMPTS};
use crate::{SourceError, VenueSource};

/// Places Text Search endpoint.
const PLACES_API_URL: &str = "https://maps.googleapis.com/maps/api/place/textsearch/json";

/// Medellín center, `"lat,lng"` as the API expects.
const MEDELLIN_CENTER: &str = "6.2442,-75.5812";

/// Search radius around the center, meters.
const SEARCH_RADIUS_M: u32 = 25_000;

/// Delay between consecutive keyword searches. A deliberate throttle for
/// the external API, not a correctness requirement.
const INTER_REQUEST_DELAY: Duration = Duration::from_millis(100);

/// Environment variable holding the search credential.
pub const API_KEY_ENV: &str = "GOOGLE_PLACES_API_KEY";

const SWIMMING_KEYWORDS: &[&str] = &[
    "piscina",
    "natación",
    "swimming pool",
    "aquatic center",
    "complejo acuático",
];

const RUNNING_KEYWORDS: &[&str] = &[
    "pista atletismo",
    "track",
    "running track",
    "estadio",
    "athletics",
];

const FITNESS_KEYWORDS: &[&str] = &["gimnasio", "gym", "fitness center", "crossfit"];

/// Fallback name-based run detection, lowest classification priority.
static NAME_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)pista|athletics|atletismo|track").expect("valid regex"));

/// Activity category a search keyword was issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchCategory {
    Swimming,
    Running,
    Fitness,
}

impl SearchCategory {
    const fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Swimming => SWIMMING_KEYWORDS,
            Self::Running => RUNNING_KEYWORDS,
            Self::Fitness => FITNESS_KEYWORDS,
        }
    }
}

/// The explicit task queue: every (category, keyword) pair to search,
/// drained one at a time.
fn search_tasks() -> Vec<(SearchCategory, &'static str)> {
    [
        SearchCategory::Swimming,
        SearchCategory::Running,
        SearchCategory::Fitness,
    ]
    .into_iter()
    .flat_map(|category| category.keywords().iter().map(move |&kw| (category, kw)))
    .collect()
}

/// Google Places search aggregator source.
pub struct PlacesSource {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl PlacesSource {
    /// Creates the aggregator. A missing credential is logged once here;
    /// every subsequent fetch silently returns empty.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        if api_key.is_none() {
            log::warn!("{API_KEY_ENV} is not set; Google Places source will return empty results");
        }
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }

    /// Builds the aggregator from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()))
    }

    /// One text search for `keyword` scoped to the Medellín region.
    async fn text_search(
        &self,
        api_key: &str,
        keyword: &str,
    ) -> Result<Vec<PlaceResult>, SourceError> {
        let query = format!("{keyword} Medellín");
        let radius = SEARCH_RADIUS_M.to_string();
        let body = retry::send_json("Google Places", AGGREGATOR_ATTEMPTS, || {
            self.client.get(PLACES_API_URL).query(&[
                ("query", query.as_str()),
                ("location", MEDELLIN_CENTER),
                ("radius", radius.as_str()),
                ("key", api_key),
            ])
        })
        .await?;

        let response: PlacesResponse = serde_json::from_value(body)?;
        if response.status != "OK" && response.status != "ZERO_RESULTS" {
            return Err(SourceError::Shape {
                message: format!("Places API status {}", response.status),
            });
        }

        // Individual results missing required fields are dropped, not fatal.
        Ok(response
            .results
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect())
    }
}

impl Default for PlacesSource {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Top-level Places API response envelope.
#[derive(Debug, Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    results: Vec<serde_json::Value>,
    #[serde(default)]
    status: String,
}

/// One search result, validated field by field.
#[derive(Debug, Deserialize)]
struct PlaceResult {
    place_id: String,
    name: String,
    geometry: PlaceGeometry,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    user_ratings_total: Option<u64>,
    #[serde(default)]
    vicinity: Option<String>,
    #[serde(default)]
    opening_hours: Option<OpeningHours>,
}

#[derive(Debug, Deserialize)]
struct PlaceGeometry {
    location: PlaceLocation,
}

#[derive(Debug, Deserialize)]
struct PlaceLocation {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct OpeningHours {
    #[serde(default)]
    open_now: Option<bool>,
}

/// Classification priority: search category tag, then provider type tags,
/// then name keywords, then `Multi`.
fn classify_place(category: SearchCategory, types: &[String], name: &str) -> VenueCategory {
    let has_type = |wanted: &[&str]| types.iter().any(|t| wanted.contains(&t.as_str()));

    if category == SearchCategory::Swimming || has_type(&["swimming_pool", "aquatic_center"]) {
        VenueCategory::Swim
    } else if category == SearchCategory::Running
        || has_type(&["stadium", "track"])
        || NAME_RUN_RE.is_match(name)
    {
        VenueCategory::Run
    } else {
        VenueCategory::Multi
    }
}

/// Merges per-keyword results into features: de-duplicates by `place_id`
/// (first occurrence wins) and drops coordinate-invalid places.
fn normalize(results: Vec<(SearchCategory, PlaceResult)>) -> Vec<VenueFeature> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut features = Vec::with_capacity(results.len());

    for (category, place) in results {
        if !seen.insert(place.place_id.clone()) {
            continue;
        }

        let venue_category = classify_place(category, &place.types, &place.name);
        let mut props = VenueProps::new(place.name, venue_category, Provider::Google);
        props.place_id = Some(place.place_id);
        props.rating = place.rating;
        props.review_count = place.user_ratings_total;
        props.address = place.vicinity;
        props.open_now = place.opening_hours.and_then(|h| h.open_now);

        let position = [place.geometry.location.lng, place.geometry.location.lat];
        if let Some(feature) = VenueFeature::new(Geometry::Point(position), props) {
            features.push(feature);
        }
    }

    features
}

#[async_trait]
impl VenueSource for PlacesSource {
    fn source_id(&self) -> SourceId {
        SourceId::GooglePlaces
    }

    fn name(&self) -> &'static str {
        "Google Places"
    }

    async fn fetch(&self) -> VenueCollection {
        let Some(api_key) = self.api_key.as_deref() else {
            return VenueCollection::empty(SourceId::GooglePlaces);
        };

        let mut results: Vec<(SearchCategory, PlaceResult)> = Vec::new();

        // Drain the keyword queue sequentially; one keyword's failure must
        // not abort the others.
        for (category, keyword) in search_tasks() {
            match self.text_search(api_key, keyword).await {
                Ok(places) => {
                    results.extend(places.into_iter().map(|p| (category, p)));
                }
                Err(e) => {
                    log::warn!("Google Places: search for {keyword:?} failed: {e}");
                }
            }
            tokio::time::sleep(INTER_REQUEST_DELAY).await;
        }

        let collection = VenueCollection::new(SourceId::GooglePlaces, normalize(results));
        log::info!(
            "Google Places: found {} venues (swim: {}, run: {}, multi: {})",
            collection.len(),
            collection.count_category(VenueCategory::Swim),
            collection.count_category(VenueCategory::Run),
            collection.count_category(VenueCategory::Multi),
        );
        collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(raw: serde_json::Value) -> PlaceResult {
        serde_json::from_value(raw).unwrap()
    }

    #[tokio::test]
    async fn missing_credential_short_circuits_to_empty() {
        let source = PlacesSource::new(None);
        let collection = source.fetch().await;
        assert_eq!(collection.source, SourceId::GooglePlaces);
        assert!(collection.is_empty());
    }

    #[test]
    fn duplicate_place_ids_collapse_first_seen_wins() {
        let first = place(serde_json::json!({
            "place_id": "abc123",
            "name": "Piscina Tranvía",
            "geometry": { "location": { "lat": 6.24, "lng": -75.57 } },
            "rating": 4.8,
        }));
        let second = place(serde_json::json!({
            "place_id": "abc123",
            "name": "Piscina Tranvía",
            "geometry": { "location": { "lat": 6.24, "lng": -75.57 } },
            "rating": 3.1,
        }));

        let features = normalize(vec![
            (SearchCategory::Swimming, first),
            (SearchCategory::Fitness, second),
        ]);
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].properties.rating, Some(4.8));
        assert_eq!(features[0].properties.category, VenueCategory::Swim);
    }

    #[test]
    fn classification_priority_category_then_types_then_name() {
        // Explicit search category wins even with conflicting type tags.
        assert_eq!(
            classify_place(
                SearchCategory::Swimming,
                &["stadium".to_string()],
                "Estadio Atanasio",
            ),
            VenueCategory::Swim
        );
        // Type tags win over the name fallback.
        assert_eq!(
            classify_place(SearchCategory::Fitness, &["swimming_pool".to_string()], "Gym"),
            VenueCategory::Swim
        );
        assert_eq!(
            classify_place(SearchCategory::Fitness, &["stadium".to_string()], "Smart Fit"),
            VenueCategory::Run
        );
        // Name fallback.
        assert_eq!(
            classify_place(SearchCategory::Fitness, &[], "Pista de trote La Frontera"),
            VenueCategory::Run
        );
        // Default.
        assert_eq!(
            classify_place(SearchCategory::Fitness, &[], "Bodytech Vizcaya"),
            VenueCategory::Multi
        );
    }

    #[test]
    fn out_of_range_places_are_dropped() {
        let bad = place(serde_json::json!({
            "place_id": "bad",
            "name": "Piscina fantasma",
            "geometry": { "location": { "lat": 195.0, "lng": -75.57 } },
        }));
        assert!(normalize(vec![(SearchCategory::Swimming, bad)]).is_empty());
    }

    #[test]
    fn optional_fields_carry_through() {
        let rich = place(serde_json::json!({
            "place_id": "rich",
            "name": "Complejo Acuático",
            "geometry": { "location": { "lat": 6.2566, "lng": -75.5903 } },
            "types": ["aquatic_center"],
            "rating": 4.6,
            "user_ratings_total": 812,
            "vicinity": "Estadio, Medellín",
            "opening_hours": { "open_now": true },
        }));
        let features = normalize(vec![(SearchCategory::Fitness, rich)]);
        let props = &features[0].properties;
        assert_eq!(props.place_id.as_deref(), Some("rich"));
        assert_eq!(props.review_count, Some(812));
        assert_eq!(props.address.as_deref(), Some("Estadio, Medellín"));
        assert_eq!(props.open_now, Some(true));
        assert_eq!(props.category, VenueCategory::Swim);
    }

    #[test]
    fn queue_covers_every_keyword_in_order() {
        let tasks = search_tasks();
        assert_eq!(
            tasks.len(),
            SWIMMING_KEYWORDS.len() + RUNNING_KEYWORDS.len() + FITNESS_KEYWORDS.len()
        );
        assert_eq!(tasks[0], (SearchCategory::Swimming, "piscina"));
        assert_eq!(
            tasks.last().copied(),
            Some((SearchCategory::Fitness, "crossfit"))
        );
    }
}
