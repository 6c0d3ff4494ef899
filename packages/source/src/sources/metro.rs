//! Metro de Medellín station source.
//!
//! The Metro does not publish a machine-readable station feed, so this is
//! a hand-authored synthetic dataset covering Línea A and Línea B. No I/O,
//! never fails.

use async_trait::async_trait;
use tri_map_venue_models::{
    Geometry, Provider, SourceId, VenueCategory, VenueCollection, VenueFeature, VenueProps,
};

use crate::VenueSource;

/// Línea A stations, north-south.
const LINEA_A: &[(&str, [f64; 2])] = &[
    ("Poblado", [-75.5812, 6.2518]),
    ("Aguacatala", [-75.5793, 6.2548]),
    ("Ayurá", [-75.5756, 6.2595]),
    ("Exposiciones", [-75.5743, 6.2677]),
    ("Industriales", [-75.5695, 6.2743]),
    ("Universidad", [-75.5665, 6.2693]),
    ("Parque Berrío", [-75.5664, 6.2842]),
    ("San Antonio", [-75.5670, 6.2945]),
    ("Prado", [-75.5648, 6.3048]),
    ("Hospital", [-75.5648, 6.3148]),
    ("Caribe", [-75.5648, 6.3248]),
    ("Tricentenario", [-75.5648, 6.3348]),
    ("Bello", [-75.5648, 6.3448]),
    ("Madera", [-75.5648, 6.3548]),
    ("Acevedo", [-75.5648, 6.3648]),
    ("Niquía", [-75.5648, 6.3748]),
];

/// Línea B stations, east-west.
const LINEA_B: &[(&str, [f64; 2])] = &[
    ("San Javier", [-75.6048, 6.2842]),
    ("Santa Lucía", [-75.5948, 6.2842]),
    ("Suramericana", [-75.5848, 6.2842]),
    ("Estadio", [-75.5748, 6.2842]),
    ("Floresta", [-75.5548, 6.2842]),
    ("San Antonio", [-75.5448, 6.2842]),
];

/// Synthetic Metro de Medellín station feed.
pub struct MetroSource;

impl MetroSource {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for MetroSource {
    fn default() -> Self {
        Self::new()
    }
}

fn station(name: &str, line: &str, position: [f64; 2]) -> Option<VenueFeature> {
    let mut props = VenueProps::new(name, VenueCategory::Metro, Provider::Metro);
    props.line = Some(line.to_string());
    VenueFeature::new(Geometry::Point(position), props)
}

#[async_trait]
impl VenueSource for MetroSource {
    fn source_id(&self) -> SourceId {
        SourceId::MetroStations
    }

    fn name(&self) -> &'static str {
        "Metro de Medellín"
    }

    async fn fetch(&self) -> VenueCollection {
        let features = LINEA_A
            .iter()
            .map(|&(name, position)| station(name, "A", position))
            .chain(
                LINEA_B
                    .iter()
                    .map(|&(name, position)| station(name, "B", position)),
            )
            .flatten()
            .collect();
        VenueCollection::new(SourceId::MetroStations, features)
    }
}
