#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Venue data provider adapters.
//!
//! Each external provider implements the [`VenueSource`] trait to define how
//! raw records are fetched, classified, and normalized into the canonical
//! [`VenueCollection`] format. Adapters are fail-open: any transport or
//! parse failure degrades to a bundled fallback or an empty collection,
//! logged but never surfaced to the caller.

pub mod classify;
pub mod registry;
pub mod retry;
pub mod sources;

use async_trait::async_trait;
use tri_map_venue_models::{SourceId, VenueCollection};

/// Errors that can occur inside a data source adapter.
///
/// These never cross the [`VenueSource::fetch`] boundary; each adapter
/// recovers by substituting fallback or empty data.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (static geometry file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The payload arrived but did not have the expected shape.
    #[error("Unexpected payload: {message}")]
    Shape {
        /// Description of what went wrong.
        message: String,
    },
}

/// Trait that all venue data sources implement.
///
/// `fetch` resolves with a collection in every case: on failure the adapter
/// logs the condition and returns its fallback (or empty) collection instead
/// of propagating the error.
#[async_trait]
pub trait VenueSource: Send + Sync {
    /// The source this adapter feeds.
    fn source_id(&self) -> SourceId;

    /// Human-readable provider name for log messages.
    fn name(&self) -> &str;

    /// Fetches, classifies, and normalizes the provider's current records.
    async fn fetch(&self) -> VenueCollection;
}
