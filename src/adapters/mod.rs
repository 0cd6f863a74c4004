// Adapters layer: concrete implementations for external systems (provider
// store files, the Nominatim geocoding API). Everything behind the ports in
// domain::ports.

pub mod file_store;
pub mod nominatim;

pub use file_store::FileStore;
pub use nominatim::NominatimClient;
