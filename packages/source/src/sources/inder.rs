//! INDER Medellín public sports venue source.
//!
//! Uses the datos.gov.co Socrata open-data API. Venue coordinates arrive
//! either as JSON numbers or as strings (sometimes with comma decimal
//! separators), and the venue name drives activity classification.

use async_trait::async_trait;
use serde::Deserialize;
use tri_map_venue_models::{
    Geometry, Provider, SourceId, VenueCategory, VenueCollection, VenueFeature, VenueProps,
    parse_coord,
};

use crate::classify::classify_name;
use crate::retry::{self, OPEN_DATA_ATTEMPTS};
use crate::{SourceError, VenueSource};

/// Socrata API endpoint for INDER sports venues.
const INDER_API_URL: &str = "https://www.datos.gov.co/resource/i5z5-qhf8.json";

/// Bounded page size for the single query.
const PAGE_LIMIT: u64 = 1000;

/// INDER public sports venue data source.
pub struct InderSource {
    client: reqwest::Client,
}

impl InderSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    async fn try_fetch(&self) -> Result<VenueCollection, SourceError> {
        let url = format!("{INDER_API_URL}?$limit={PAGE_LIMIT}");
        let body = retry::send_json("INDER", OPEN_DATA_ATTEMPTS, || {
            self.client.get(&url).header("Accept", "application/json")
        })
        .await?;

        let records: Vec<InderRecord> = serde_json::from_value(body)?;
        let collection = VenueCollection::new(SourceId::InderVenues, normalize(records));

        log::info!(
            "INDER: found {} venues (swim: {}, run: {}, multi: {})",
            collection.len(),
            collection.count_category(VenueCategory::Swim),
            collection.count_category(VenueCategory::Run),
            collection.count_category(VenueCategory::Multi),
        );
        Ok(collection)
    }

    /// Bundled fallback venues for when the portal is unreachable.
    fn fallback() -> VenueCollection {
        let venues = [
            ("Piscina Olímpica", VenueCategory::Swim, [-75.5812, 6.2518]),
            ("Pista de Atletismo", VenueCategory::Run, [-75.5650, 6.2442]),
        ];
        let features = venues
            .into_iter()
            .filter_map(|(name, category, position)| {
                VenueFeature::new(
                    Geometry::Point(position),
                    VenueProps::new(name, category, Provider::Inder),
                )
            })
            .collect();
        VenueCollection::new(SourceId::InderVenues, features)
    }
}

impl Default for InderSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw record shape from the INDER Socrata dataset.
#[derive(Debug, Deserialize)]
struct InderRecord {
    #[serde(default)]
    nombre_escenario: Option<String>,
    #[serde(default)]
    latitud: Option<serde_json::Value>,
    #[serde(default)]
    longitud: Option<serde_json::Value>,
    #[serde(default)]
    direccion: Option<String>,
    #[serde(default)]
    barrio: Option<String>,
}

/// Extracts a coordinate that may arrive as a JSON number or a string.
fn coord_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        serde_json::Value::String(s) => parse_coord(s),
        _ => None,
    }
}

/// Converts raw venue records into classified features, dropping records
/// missing either coordinate or failing numeric parse / bounds checks.
fn normalize(records: Vec<InderRecord>) -> Vec<VenueFeature> {
    let mut features = Vec::with_capacity(records.len());

    for record in records {
        let Some(lat) = record.latitud.as_ref().and_then(coord_value) else {
            continue;
        };
        let Some(lng) = record.longitud.as_ref().and_then(coord_value) else {
            continue;
        };

        let name = record
            .nombre_escenario
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Escenario Deportivo".to_string());
        let category = classify_name(&name);

        let mut props = VenueProps::new(name, category, Provider::Inder);
        props.address = match (record.direccion, record.barrio) {
            (Some(direccion), Some(barrio)) => Some(format!("{direccion}, {barrio}")),
            (direccion, barrio) => direccion.or(barrio),
        };

        if let Some(feature) = VenueFeature::new(Geometry::Point([lng, lat]), props) {
            features.push(feature);
        }
    }

    features
}

#[async_trait]
impl VenueSource for InderSource {
    fn source_id(&self) -> SourceId {
        SourceId::InderVenues
    }

    fn name(&self) -> &'static str {
        "INDER Medellín"
    }

    async fn fetch(&self) -> VenueCollection {
        match self.try_fetch().await {
            Ok(collection) => collection,
            Err(e) => {
                log::error!("INDER fetch failed, serving fallback venues: {e}");
                Self::fallback()
            }
        }
    }
}
