//! EnCicla bike-share station source (AMVA).
//!
//! Uses the datos.gov.co Socrata open-data API. Stations publish their
//! position as a single `georeferenciaci_n` field in `"lat;lng"` form with
//! comma decimal separators.

use async_trait::async_trait;
use serde::Deserialize;
use tri_map_venue_models::{
    Geometry, Provider, SourceId, VenueCategory, VenueCollection, VenueFeature, VenueProps,
    parse_coord,
};

use crate::retry::{self, OPEN_DATA_ATTEMPTS};
use crate::{SourceError, VenueSource};

/// Socrata API endpoint for EnCicla stations.
const ENCICLA_API_URL: &str = "https://www.datos.gov.co/resource/hmuf-kqju.json";

/// Bounded page size for the single query.
const PAGE_LIMIT: u64 = 500;

/// EnCicla bike-share station data source.
pub struct EnciclaSource {
    client: reqwest::Client,
}

impl EnciclaSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    async fn try_fetch(&self) -> Result<VenueCollection, SourceError> {
        let url = format!("{ENCICLA_API_URL}?$limit={PAGE_LIMIT}");
        let body = retry::send_json("EnCicla", OPEN_DATA_ATTEMPTS, || {
            self.client.get(&url).header("Accept", "application/json")
        })
        .await?;

        let records: Vec<EnciclaRecord> = serde_json::from_value(body)?;
        let features = normalize(records);

        log::info!("EnCicla: found {} stations", features.len());
        Ok(VenueCollection::new(SourceId::Encicla, features))
    }

    /// Last-known-good stations bundled at build time, returned when the
    /// portal is unreachable so the bike layer never disappears entirely.
    fn fallback() -> VenueCollection {
        let stations = [
            ("Estación EnCicla Poblado", [-75.5812, 6.2518]),
            ("Estación EnCicla Centro", [-75.5650, 6.2442]),
        ];
        let features = stations
            .into_iter()
            .filter_map(|(name, position)| {
                VenueFeature::new(
                    Geometry::Point(position),
                    VenueProps::new(name, VenueCategory::Bike, Provider::Amva),
                )
            })
            .collect();
        VenueCollection::new(SourceId::Encicla, features)
    }
}

impl Default for EnciclaSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw record shape from the EnCicla Socrata dataset. The station id
/// arrives under the dataset's `_` column.
#[derive(Debug, Deserialize)]
struct EnciclaRecord {
    #[serde(rename = "_", default)]
    id: Option<String>,
    #[serde(default)]
    georeferenciaci_n: Option<String>,
    #[serde(default)]
    nombre_estacion: Option<String>,
    #[serde(default)]
    direccion: Option<String>,
    #[serde(default)]
    total_anclajes: Option<serde_json::Value>,
}

/// Extracts a dock count that may arrive as a JSON number or a string.
fn dock_count(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Converts raw station records into features, dropping records with a
/// missing, unsplittable, non-numeric, or out-of-range georeference.
fn normalize(records: Vec<EnciclaRecord>) -> Vec<VenueFeature> {
    let mut features = Vec::with_capacity(records.len());

    for record in records {
        let Some(georef) = &record.georeferenciaci_n else {
            continue;
        };
        let Some((lat_raw, lng_raw)) = georef.split_once(';') else {
            continue;
        };
        let Some(lat) = parse_coord(lat_raw) else {
            continue;
        };
        let Some(lng) = parse_coord(lng_raw) else {
            continue;
        };

        let name = record
            .nombre_estacion
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Estación EnCicla".to_string());

        let mut props = VenueProps::new(name, VenueCategory::Bike, Provider::Amva);
        props.id = record.id.filter(|id| !id.is_empty());
        props.address = record.direccion;
        props.dock_count = record.total_anclajes.as_ref().and_then(dock_count);

        if let Some(feature) = VenueFeature::new(Geometry::Point([lng, lat]), props) {
            features.push(feature);
        }
    }

    features
}

#[async_trait]
impl VenueSource for EnciclaSource {
    fn source_id(&self) -> SourceId {
        SourceId::Encicla
    }

    fn name(&self) -> &'static str {
        "EnCicla (AMVA)"
    }

    async fn fetch(&self) -> VenueCollection {
        match self.try_fetch().await {
            Ok(collection) => collection,
            Err(e) => {
                log::error!("EnCicla fetch failed, serving fallback stations: {e}");
                Self::fallback()
            }
        }
    }
}
