//! Static geometry file sources (ciclorrutas, ciclovías).
//!
//! Both feeds read a pre-published GeoJSON file from the data directory,
//! retrying the read on the same bounded budget as the open-data feeds.
//! Once the budget is spent (or the file fails to parse) they substitute
//! a small embedded fallback feature instead of returning empty, so the
//! map never shows a totally missing layer category.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tri_map_venue_models::{
    Geometry, Provider, SourceId, VenueCategory, VenueCollection, VenueFeature, VenueProps,
};

use crate::retry::{self, OPEN_DATA_ATTEMPTS};
use crate::{SourceError, VenueSource};

/// A venue source backed by a GeoJSON file on disk.
pub struct GeoFileSource {
    source: SourceId,
    label: &'static str,
    path: PathBuf,
    fallback: fn() -> VenueCollection,
}

impl GeoFileSource {
    /// The Medellín ciclorrutas (permanent bike route) network.
    #[must_use]
    pub fn ciclorrutas(data_dir: &Path) -> Self {
        Self {
            source: SourceId::Ciclorrutas,
            label: "Ciclorrutas",
            path: data_dir.join("ciclorrutas_va.geojson"),
            fallback: ciclorrutas_fallback,
        }
    }

    /// The INDER ciclovías (recurring open-streets events).
    #[must_use]
    pub fn ciclovias(data_dir: &Path) -> Self {
        Self {
            source: SourceId::CicloviasInder,
            label: "Ciclovías INDER",
            path: data_dir.join("ciclovias_inder.geojson"),
            fallback: ciclovias_fallback,
        }
    }

    /// Bounded-attempt disk read sharing the open-data retry budget and
    /// backoff. Only the read itself is retried; a parse failure of what
    /// was read is permanent.
    async fn read_with_retry(&self) -> Result<String, SourceError> {
        let mut attempt = 1;
        loop {
            match std::fs::read_to_string(&self.path) {
                Ok(data) => return Ok(data),
                Err(e) if attempt < OPEN_DATA_ATTEMPTS => {
                    attempt += 1;
                    log::warn!(
                        "{}: read failed ({e}), retry {attempt}/{OPEN_DATA_ATTEMPTS}",
                        self.label,
                    );
                    tokio::time::sleep(retry::backoff_delay(attempt)).await;
                }
                Err(e) => return Err(SourceError::Io(e)),
            }
        }
    }

    async fn try_fetch(&self) -> Result<VenueCollection, SourceError> {
        let data = self.read_with_retry().await?;
        let raw: RawCollection = serde_json::from_str(&data)?;

        let total = raw.features.len();
        let features: Vec<VenueFeature> = raw
            .features
            .into_iter()
            .filter_map(|value| serde_json::from_value::<VenueFeature>(value).ok())
            .filter(|feature| feature.geometry.is_valid())
            .collect();

        if features.len() < total {
            log::warn!(
                "{}: dropped {} of {total} features failing shape or bounds checks",
                self.label,
                total - features.len(),
            );
        }
        log::info!("{}: loaded {} features from {:?}", self.label, features.len(), self.path);

        Ok(VenueCollection::new(self.source, features))
    }
}

/// Tolerant outer shape for the on-disk file; individual features are
/// validated one by one so a single malformed entry never rejects the file.
#[derive(Debug, Deserialize)]
struct RawCollection {
    #[serde(default)]
    features: Vec<serde_json::Value>,
}

fn ciclorrutas_fallback() -> VenueCollection {
    let geometry = Geometry::LineString(vec![
        [-75.5812, 6.2518],
        [-75.5798, 6.2501],
        [-75.5785, 6.2485],
    ]);
    let props = VenueProps::new("Cicloruta Principal", VenueCategory::Bike, Provider::Medellin);
    VenueCollection::new(
        SourceId::Ciclorrutas,
        VenueFeature::new(geometry, props).into_iter().collect(),
    )
}

fn ciclovias_fallback() -> VenueCollection {
    let geometry = Geometry::LineString(vec![
        [-75.5664, 6.2677],
        [-75.5650, 6.2658],
        [-75.5635, 6.2640],
    ]);
    let mut props = VenueProps::new("Ciclovía Dominical", VenueCategory::Ciclovia, Provider::Inder);
    props.schedule = Some("Domingos 7:00 AM - 2:00 PM".to_string());
    props.distance_km = Some(2.5);
    VenueCollection::new(
        SourceId::CicloviasInder,
        VenueFeature::new(geometry, props).into_iter().collect(),
    )
}

#[async_trait]
impl VenueSource for GeoFileSource {
    fn source_id(&self) -> SourceId {
        self.source
    }

    fn name(&self) -> &'static str {
        self.label
    }

    async fn fetch(&self) -> VenueCollection {
        match self.try_fetch().await {
            Ok(collection) => collection,
            Err(e) => {
                log::error!(
                    "{}: failed to read {:?}, serving embedded fallback: {e}",
                    self.label,
                    self.path,
                );
                (self.fallback)()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_yields_medellin_fallback_line() {
        let source = GeoFileSource::ciclorrutas(Path::new("/nonexistent"));
        let collection = source.fetch().await;

        assert_eq!(collection.source, SourceId::Ciclorrutas);
        assert_eq!(collection.len(), 1);
        let feature = &collection.features[0];
        assert_eq!(feature.properties.provider, Provider::Medellin);
        assert!(matches!(feature.geometry, Geometry::LineString(_)));
    }

    #[tokio::test]
    async fn missing_file_yields_ciclovia_fallback_with_schedule() {
        let source = GeoFileSource::ciclovias(Path::new("/nonexistent"));
        let collection = source.fetch().await;

        assert_eq!(collection.source, SourceId::CicloviasInder);
        let props = &collection.features[0].properties;
        assert_eq!(props.category, VenueCategory::Ciclovia);
        assert_eq!(props.schedule.as_deref(), Some("Domingos 7:00 AM - 2:00 PM"));
        assert_eq!(props.distance_km, Some(2.5));
    }

    #[tokio::test]
    async fn malformed_features_are_dropped_not_fatal() {
        let dir = std::env::temp_dir().join("trimap-geofile-test");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("ciclorrutas_va.geojson"),
            serde_json::json!({
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "geometry": { "type": "LineString", "coordinates": [[-75.58, 6.25], [-75.57, 6.24]] },
                        "properties": { "name": "Cicloruta Av. El Poblado", "type": "bike", "provider": "MEDELLIN" },
                    },
                    { "type": "Feature", "geometry": null, "properties": {} },
                    {
                        "type": "Feature",
                        "geometry": { "type": "Point", "coordinates": [-200.0, 6.25] },
                        "properties": { "name": "fuera de rango", "type": "bike", "provider": "MEDELLIN" },
                    },
                ],
            })
            .to_string(),
        )
        .unwrap();

        let collection = GeoFileSource::ciclorrutas(&dir).fetch().await;
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.features[0].properties.name, "Cicloruta Av. El Poblado");
    }

    #[tokio::test]
    async fn file_appearing_between_read_attempts_is_picked_up() {
        let dir = std::env::temp_dir().join("trimap-geofile-late");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let source = GeoFileSource::ciclorrutas(&dir);
        // The file is absent when the first read happens and appears
        // before the retry fires.
        let write_late = async {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            std::fs::write(
                dir.join("ciclorrutas_va.geojson"),
                serde_json::json!({
                    "type": "FeatureCollection",
                    "features": [{
                        "type": "Feature",
                        "geometry": { "type": "LineString", "coordinates": [[-75.58, 6.25], [-75.57, 6.24]] },
                        "properties": { "name": "Cicloruta Tardía", "type": "bike", "provider": "MEDELLIN" },
                    }],
                })
                .to_string(),
            )
            .unwrap();
        };

        let (collection, ()) = tokio::join!(source.fetch(), write_late);
        assert_eq!(collection.features[0].properties.name, "Cicloruta Tardía");
    }

    #[tokio::test]
    async fn unparseable_file_yields_fallback() {
        let dir = std::env::temp_dir().join("trimap-geofile-broken");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("ciclovias_inder.geojson"), "{ not json").unwrap();

        let collection = GeoFileSource::ciclovias(&dir).fetch().await;
        assert_eq!(collection.features[0].properties.name, "Ciclovía Dominical");
    }
}
