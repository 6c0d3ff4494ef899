#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Map synchronization engine.
//!
//! Reconciles normalized venue collections with a long-lived, stateful
//! rendering surface: each source is registered (data handle + paint layer
//! + interaction handlers) exactly once per surface instance, and every
//! later collection update replaces the underlying data in place so handle
//! identities survive. Visibility toggles never touch data.
//!
//! The engine owns the surface and all methods take `&mut self`, so all
//! surface mutation happens on one timeline; the surface handle is not
//! safe for concurrent writers. Rendering-surface initialization failures
//! (e.g. a missing map access token) are the consumer's concern: no
//! surface, no engine.

pub mod popup;

use std::collections::HashMap;

use tri_map_venue_models::{SourceId, VenueCollection, VenueProps};

/// Builds the detail text shown when a feature of a layer is clicked.
pub type PopupHandler = Box<dyn Fn(&VenueProps) -> String + Send + Sync>;

/// Visual layer flavor: point markers or route lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Circle,
    Line,
}

/// Specification for the paint layer registered for one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerSpec {
    pub id: &'static str,
    pub source: SourceId,
    pub kind: LayerKind,
    /// Initial visibility, taken from the current configuration at
    /// registration time rather than a fixed default.
    pub visible: bool,
}

/// Stable layer handle id for a source.
#[must_use]
pub const fn layer_id(source: SourceId) -> &'static str {
    match source {
        SourceId::Encicla => "encicla-points",
        SourceId::InderVenues => "inder-venues-points",
        SourceId::Ciclorrutas => "ciclorrutas-lines",
        SourceId::CicloviasInder => "ciclovias-lines",
        SourceId::MetroStations => "metro-stations-points",
        SourceId::GooglePlaces => "google-places-points",
    }
}

/// Route sources render as lines, everything else as circle markers.
#[must_use]
pub const fn layer_kind(source: SourceId) -> LayerKind {
    match source {
        SourceId::Ciclorrutas | SourceId::CicloviasInder => LayerKind::Line,
        SourceId::Encicla
        | SourceId::InderVenues
        | SourceId::MetroStations
        | SourceId::GooglePlaces => LayerKind::Circle,
    }
}

/// The narrow contract the rendering surface exposes.
///
/// The engine never assumes calls are synchronous beyond completion and
/// never reads values back across an async boundary.
pub trait MapSurface {
    /// Whether the surface has signalled readiness and is still live.
    fn is_ready(&self) -> bool;

    fn has_source(&self, id: &str) -> bool;
    fn add_source(&mut self, id: &str, collection: &VenueCollection);
    fn set_source_data(&mut self, id: &str, collection: &VenueCollection);

    fn has_layer(&self, id: &str) -> bool;
    fn add_layer(&mut self, spec: &LayerSpec);
    fn set_layer_visibility(&mut self, id: &str, visible: bool);

    fn on_click(&mut self, layer_id: &str, popup: PopupHandler);
    fn on_hover_enter(&mut self, layer_id: &str);
    fn on_hover_exit(&mut self, layer_id: &str);
}

/// Per-source layer visibility, owned by the presentation layer and
/// consulted (never copied) by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerVisibility {
    flags: HashMap<SourceId, bool>,
}

impl Default for LayerVisibility {
    /// Every layer starts visible except the INDER venue markers, which
    /// the user opts into.
    fn default() -> Self {
        let flags = SourceId::ALL
            .into_iter()
            .map(|source| (source, source != SourceId::InderVenues))
            .collect();
        Self { flags }
    }
}

impl LayerVisibility {
    /// Flips exactly one source's flag.
    pub fn toggle(&mut self, source: SourceId) {
        let flag = self.flags.entry(source).or_insert(true);
        *flag = !*flag;
    }

    #[must_use]
    pub fn is_visible(&self, source: SourceId) -> bool {
        self.flags.get(&source).copied().unwrap_or(true)
    }
}

/// Handles created for a registered source.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Registration {
    source_handle: String,
    layer_handle: &'static str,
}

/// Reconciles collections and visibility with the rendering surface.
///
/// State machine per source: `Unregistered → Registered`, transitioning
/// exactly once per surface instance. Handle identities are kept in an
/// arena keyed by source id.
pub struct SyncEngine<S> {
    surface: S,
    registered: HashMap<SourceId, Registration>,
}

impl<S: MapSurface> SyncEngine<S> {
    #[must_use]
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            registered: HashMap::new(),
        }
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub fn is_registered(&self, source: SourceId) -> bool {
        self.registered.contains_key(&source)
    }

    /// Reconciles one source's collection with the surface.
    ///
    /// A no-op until the surface reports ready. The first call for a source
    /// registers data, layer, and interaction handlers and applies the
    /// current desired visibility; subsequent calls only replace the data
    /// in place.
    pub fn sync(&mut self, collection: &VenueCollection, visibility: &LayerVisibility) {
        if !self.surface.is_ready() {
            log::debug!("surface not ready, skipping sync for {}", collection.source);
            return;
        }

        let source = collection.source;
        if let Some(registration) = self.registered.get(&source) {
            self.surface
                .set_source_data(&registration.source_handle, collection);
            return;
        }

        let source_handle = source.to_string();
        if self.surface.has_source(&source_handle) {
            self.surface.set_source_data(&source_handle, collection);
        } else {
            self.surface.add_source(&source_handle, collection);
        }

        let layer_handle = layer_id(source);
        if !self.surface.has_layer(layer_handle) {
            let spec = LayerSpec {
                id: layer_handle,
                source,
                kind: layer_kind(source),
                visible: visibility.is_visible(source),
            };
            self.surface.add_layer(&spec);
            self.surface.on_click(layer_handle, Box::new(popup::venue_popup));
            self.surface.on_hover_enter(layer_handle);
            self.surface.on_hover_exit(layer_handle);
        }

        self.registered.insert(
            source,
            Registration {
                source_handle,
                layer_handle,
            },
        );
        log::info!("registered {source} on the map surface");
    }

    /// Applies the desired visibility to every registered layer.
    ///
    /// Unregistered sources are skipped; their visibility is picked up at
    /// registration time from the configuration passed to [`Self::sync`].
    pub fn apply_visibility(&mut self, visibility: &LayerVisibility) {
        if !self.surface.is_ready() {
            return;
        }
        for (&source, registration) in &self.registered {
            self.surface
                .set_layer_visibility(registration.layer_handle, visibility.is_visible(source));
        }
    }

    /// Releases all registrations at end of session. The next surface
    /// instance starts from `Unregistered` for every source.
    pub fn teardown(&mut self) {
        self.registered.clear();
    }
}
