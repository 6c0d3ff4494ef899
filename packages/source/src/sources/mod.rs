//! Concrete adapters, one module per provider.

pub mod encicla;
pub mod geofile;
pub mod inder;
pub mod metro;
pub mod places;
