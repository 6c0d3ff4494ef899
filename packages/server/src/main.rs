#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Venue map API server entry point.

use std::path::Path;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use tri_map_cache::VenueCache;
use tri_map_server::{AppState, handlers};
use tri_map_source::registry::all_sources;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let data_dir =
        std::env::var("TRIMAP_DATA_DIR").unwrap_or_else(|_| "packages/source/data".to_string());
    let cache = Arc::new(VenueCache::new(all_sources(Path::new(&data_dir))));

    log::info!("Warming venue cache...");
    cache.refresh_all().await;

    let state = web::Data::new(AppState { cache });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/encicla", web::get().to(handlers::encicla))
                    .route("/inder-venues", web::get().to(handlers::inder_venues))
                    .route("/ciclorrutas", web::get().to(handlers::ciclorrutas))
                    .route("/ciclovias-inder", web::get().to(handlers::ciclovias_inder))
                    .route("/metro-stations", web::get().to(handlers::metro_stations))
                    .route("/google-places", web::get().to(handlers::google_places)),
            )
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
