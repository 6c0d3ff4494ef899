//! Detail popup text, built from feature properties.

use std::fmt::Write as _;

use tri_map_venue_models::{VenueCategory, VenueProps};

/// Spanish label for a venue category, as shown in the detail popup.
#[must_use]
pub const fn category_label(category: VenueCategory) -> &'static str {
    match category {
        VenueCategory::Run => "Atletismo",
        VenueCategory::Bike => "Ciclismo",
        VenueCategory::Swim => "Natación",
        VenueCategory::Ciclovia => "Ciclovía",
        VenueCategory::Metro => "Metro",
        VenueCategory::Multi => "Multi-deporte",
    }
}

/// Builds the popup text for a clicked feature.
///
/// Pure function of the property bag so click handlers stay data-driven:
/// the same handler serves every feature of a layer.
#[must_use]
pub fn venue_popup(props: &VenueProps) -> String {
    let mut text = props.name.clone();
    let _ = write!(
        text,
        "\nTipo: {} ({})",
        category_label(props.category),
        props.provider
    );

    if props.category == VenueCategory::Ciclovia {
        let _ = write!(
            text,
            "\nHorario: {}",
            props.schedule.as_deref().unwrap_or("No especificado")
        );
        match props.distance_km {
            Some(km) => {
                let _ = write!(text, "\nDistancia: {km} km");
            }
            None => text.push_str("\nDistancia: N/A"),
        }
    }

    if let Some(rating) = props.rating {
        let _ = write!(text, "\nCalificación: {rating}");
        if let Some(count) = props.review_count {
            let _ = write!(text, " ({count} reseñas)");
        }
    }
    if let Some(address) = &props.address {
        let _ = write!(text, "\nDirección: {address}");
    }
    if let Some(url) = &props.url {
        let _ = write!(text, "\nMás información: {url}");
    }

    text
}
