//! Venue name classification.
//!
//! Maps a raw venue name to the canonical [`VenueCategory`] using ordered,
//! case-insensitive keyword matching. Order is significant: names routinely
//! contain keywords from several classes ("Pista de Natación"), and the
//! first matching class wins — swim before run before court/gym.

use std::sync::LazyLock;

use regex::Regex;
use tri_map_venue_models::VenueCategory;

/// Swimming venues: pools, aquatic complexes.
static SWIM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)piscin|nataci[oó]n|acu[aá]tico|agua|swim").expect("valid regex")
});

/// Running venues: tracks, athletics infrastructure.
static RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)pista|atletismo|running|trotar|track|carrera|velocidad|salto|lanzamiento")
        .expect("valid regex")
});

/// Court sports venues.
static COURT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)cancha|f[uú]tbol|baloncesto|voleibol|tenis|squash|futsal")
        .expect("valid regex")
});

/// Gyms and fitness centers.
static GYM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)gimnasio|gym|fitness|pesas|aerobicos").expect("valid regex"));

/// Classifies a venue by its name. Unrecognized names default to
/// [`VenueCategory::Multi`].
#[must_use]
pub fn classify_name(name: &str) -> VenueCategory {
    if SWIM_RE.is_match(name) {
        return VenueCategory::Swim;
    }
    if RUN_RE.is_match(name) {
        return VenueCategory::Run;
    }
    if COURT_RE.is_match(name) || GYM_RE.is_match(name) {
        return VenueCategory::Multi;
    }
    VenueCategory::Multi
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swim_keywords_win_over_run_keywords() {
        // Contains both "pista" (run) and "natación" (swim); swim is
        // checked first, so swim wins.
        assert_eq!(classify_name("Pista de Natación"), VenueCategory::Swim);
        assert_eq!(classify_name("Complejo Acuático"), VenueCategory::Swim);
        assert_eq!(classify_name("PISCINA OLÍMPICA"), VenueCategory::Swim);
    }

    #[test]
    fn run_keywords_match_accented_and_plain() {
        assert_eq!(classify_name("Pista de Atletismo"), VenueCategory::Run);
        assert_eq!(classify_name("Running Track El Estadio"), VenueCategory::Run);
        assert_eq!(classify_name("Zona de trotar"), VenueCategory::Run);
    }

    #[test]
    fn courts_and_gyms_map_to_multi() {
        assert_eq!(classify_name("Cancha de Fútbol La 80"), VenueCategory::Multi);
        assert_eq!(classify_name("Gimnasio al aire libre"), VenueCategory::Multi);
        assert_eq!(classify_name("Placa polideportiva voleibol"), VenueCategory::Multi);
    }

    #[test]
    fn unrecognized_names_default_to_multi() {
        assert_eq!(classify_name("Unidad Deportiva de Belén"), VenueCategory::Multi);
        assert_eq!(classify_name(""), VenueCategory::Multi);
    }
}
