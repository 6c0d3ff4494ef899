#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the venue map.
//!
//! One GET endpoint per data source, each returning the latest cached
//! GeoJSON `FeatureCollection`. Endpoints always return HTTP success:
//! provider failures are masked upstream by fallback data, so callers
//! never branch on error status.

pub mod handlers;

use std::sync::Arc;

use tri_map_cache::VenueCache;

/// Shared application state.
pub struct AppState {
    /// Process-lifetime venue cache, shared with every worker.
    pub cache: Arc<VenueCache>,
}
