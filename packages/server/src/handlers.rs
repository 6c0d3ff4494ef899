//! HTTP handler functions for the venue map API.

use actix_web::{HttpResponse, web};
use serde::Serialize;
use tri_map_venue_models::SourceId;

use crate::AppState;

/// `GET /api/health` response body.
#[derive(Debug, Serialize)]
pub struct ApiHealth {
    pub healthy: bool,
    pub version: String,
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Shared read path: latest cached collection for `source`, always 200.
fn collection_response(state: &web::Data<AppState>, source: SourceId) -> HttpResponse {
    HttpResponse::Ok().json(state.cache.get(source))
}

/// `GET /api/encicla`
pub async fn encicla(state: web::Data<AppState>) -> HttpResponse {
    collection_response(&state, SourceId::Encicla)
}

/// `GET /api/inder-venues`
pub async fn inder_venues(state: web::Data<AppState>) -> HttpResponse {
    collection_response(&state, SourceId::InderVenues)
}

/// `GET /api/ciclorrutas`
pub async fn ciclorrutas(state: web::Data<AppState>) -> HttpResponse {
    collection_response(&state, SourceId::Ciclorrutas)
}

/// `GET /api/ciclovias-inder`
pub async fn ciclovias_inder(state: web::Data<AppState>) -> HttpResponse {
    collection_response(&state, SourceId::CicloviasInder)
}

/// `GET /api/metro-stations`
pub async fn metro_stations(state: web::Data<AppState>) -> HttpResponse {
    collection_response(&state, SourceId::MetroStations)
}

/// `GET /api/google-places`
pub async fn google_places(state: web::Data<AppState>) -> HttpResponse {
    collection_response(&state, SourceId::GooglePlaces)
}
