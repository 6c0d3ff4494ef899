//! Source registry: builds the six configured adapters.

use std::path::Path;

use crate::VenueSource;
use crate::sources::encicla::EnciclaSource;
use crate::sources::geofile::GeoFileSource;
use crate::sources::inder::InderSource;
use crate::sources::metro::MetroSource;
use crate::sources::places::PlacesSource;

/// Returns all configured venue sources. `data_dir` is where the static
/// geometry files live; the places credential is read from the environment.
#[must_use]
pub fn all_sources(data_dir: &Path) -> Vec<Box<dyn VenueSource>> {
    vec![
        Box::new(EnciclaSource::new()),
        Box::new(InderSource::new()),
        Box::new(GeoFileSource::ciclorrutas(data_dir)),
        Box::new(GeoFileSource::ciclovias(data_dir)),
        Box::new(MetroSource::new()),
        Box::new(PlacesSource::from_env()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_all_six_sources_with_unique_ids() {
        let sources = all_sources(Path::new("data"));
        assert_eq!(sources.len(), 6);

        let mut ids: Vec<String> = sources.iter().map(|s| s.source_id().to_string()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn source_names_are_set() {
        for source in all_sources(Path::new("data")) {
            assert!(!source.name().is_empty(), "{}: empty name", source.source_id());
        }
    }
}
