// Application assembly: wires adapters and core services together from any
// ConfigProvider implementation (CLI flags or TOML file).

use std::path::Path;
use std::time::Duration;

use chrono::NaiveDateTime;

use crate::adapters::{FileStore, NominatimClient};
use crate::core::availability;
use crate::core::geocoding::GeocodingResolver;
use crate::core::search::SearchEngine;
use crate::domain::model::{
    AvailabilitySnapshot, DiscoveryFilters, GeoPoint, ProfileDto, ResolvedPlace,
};
use crate::domain::ports::{ConfigProvider, ProviderStore};
use crate::utils::error::{DiscoveryError, Result};

pub struct DiscoveryApp<C: ConfigProvider> {
    pub(crate) config: C,
    pub(crate) engine: SearchEngine<FileStore>,
    pub(crate) resolver: GeocodingResolver<NominatimClient>,
}

impl<C: ConfigProvider> DiscoveryApp<C> {
    pub fn from_config(config: C) -> Result<Self> {
        let store = load_store(config.data_file())?;

        let client = NominatimClient::new(config.geocoder_endpoint())
            .with_timeout(Duration::from_secs(config.request_timeout_secs()));
        let resolver =
            GeocodingResolver::new(client).with_country_codes(config.country_codes().to_vec());

        let engine = SearchEngine::new(store)
            .with_obfuscation(config.obfuscation())
            .with_unbounded_cap(config.unbounded_result_cap());

        Ok(Self {
            config,
            engine,
            resolver,
        })
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub async fn search(&self, filters: &DiscoveryFilters) -> Vec<ProfileDto> {
        self.engine.search(filters).await
    }

    pub async fn resolve_city(&self, name: &str) -> Option<ResolvedPlace> {
        self.resolver.resolve_city(name).await
    }

    pub async fn reverse_resolve(&self, point: GeoPoint) -> Option<ResolvedPlace> {
        self.resolver.reverse_resolve(point).await
    }

    /// Live availability for one profile, evaluated against the given clock.
    pub async fn availability(
        &self,
        profile_id: &str,
        now: NaiveDateTime,
    ) -> Option<AvailabilitySnapshot> {
        let record = self.engine.store().get(profile_id).await.ok().flatten()?;
        Some(availability::evaluate_record(
            now,
            record.schedule.as_ref(),
            record.available_now_override,
        ))
    }
}

// 依副檔名挑選資料來源，其他格式一律拒絕
fn load_store(path: &str) -> Result<FileStore> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("json") => FileStore::from_json_file(path),
        Some("csv") => FileStore::from_csv_file(path),
        _ => Err(DiscoveryError::StorageError {
            message: format!("Unsupported data file format: {}", path),
        }),
    }
}
