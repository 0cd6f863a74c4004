pub mod attributes;
pub mod availability;
pub mod geo;
pub mod geocoding;
pub mod privacy;
pub mod search;

pub use crate::domain::model::{
    AvailabilitySnapshot, BoundingBox, DiscoveryFilters, GeoPoint, ProfileDto, ResolvedPlace,
};
pub use crate::domain::ports::{ConfigProvider, GeocodingProvider, ProviderStore};
pub use crate::utils::error::Result;
