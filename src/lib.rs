pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::ServiceConfig;

pub use adapters::{FileStore, NominatimClient};
pub use app::DiscoveryApp;
pub use core::{geocoding::GeocodingResolver, search::SearchEngine};
pub use domain::model::{
    AvailabilitySnapshot, BoundingBox, DiscoveryFilters, GeoPoint, ObfuscationPolicy, ProfileDto,
    ProviderRecord, ResolvedPlace,
};
pub use utils::error::{DiscoveryError, Result};
