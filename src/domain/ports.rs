use crate::domain::model::{CandidateQuery, GeoPoint, GeocodeHit, ObfuscationPolicy, ProviderRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait ProviderStore: Send + Sync {
    /// Candidates with non-null coordinates, constrained by bbox/price/type
    /// and capped by `limit` when the query carries one.
    fn fetch_candidates(
        &self,
        query: &CandidateQuery,
    ) -> impl std::future::Future<Output = Result<Vec<ProviderRecord>>> + Send;

    fn get(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<ProviderRecord>>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn data_file(&self) -> &str;
    fn geocoder_endpoint(&self) -> &str;
    fn country_codes(&self) -> &[String];
    fn request_timeout_secs(&self) -> u64;
    /// Cap applied to discovery queries that arrive without a bounding box.
    fn unbounded_result_cap(&self) -> usize;
    fn obfuscation(&self) -> ObfuscationPolicy;
}

#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    /// First forward-geocoding hit for a free-text name, restricted to the
    /// given country codes. `Ok(None)` means the provider found nothing.
    async fn forward(&self, name: &str, country_codes: &[String]) -> Result<Option<GeocodeHit>>;

    /// Nearest known place for a coordinate pair.
    async fn reverse(&self, point: GeoPoint) -> Result<Option<GeocodeHit>>;
}
