use crate::core::attributes;
use crate::core::geo;
use crate::core::privacy::ObfuscationPolicy;
use crate::domain::model::{
    AttributeList, CandidateQuery, DiscoveryFilters, GeoPoint, PriceRange, ProfileDto,
    ProviderRecord,
};
use crate::domain::ports::ProviderStore;
use crate::utils::error::Result;

/// Result cap applied when the request carries no viewport; a bbox bounds
/// cardinality by itself and is never capped.
pub const DEFAULT_UNBOUNDED_CAP: usize = 50;

pub struct SearchEngine<S: ProviderStore> {
    store: S,
    obfuscation: ObfuscationPolicy,
    unbounded_cap: usize,
}

impl<S: ProviderStore> SearchEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            obfuscation: ObfuscationPolicy::default(),
            unbounded_cap: DEFAULT_UNBOUNDED_CAP,
        }
    }

    pub fn with_obfuscation(mut self, policy: ObfuscationPolicy) -> Self {
        self.obfuscation = policy;
        self
    }

    pub fn with_unbounded_cap(mut self, cap: usize) -> Self {
        self.unbounded_cap = cap;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Discovery entry point. Never propagates failures: discovery is an
    /// advisory surface and a broken search degrades to an empty page.
    pub async fn search(&self, filters: &DiscoveryFilters) -> Vec<ProfileDto> {
        match self.try_search(filters).await {
            Ok(results) => results,
            Err(e) => {
                tracing::error!("❌ Discovery search failed, returning empty result: {}", e);
                Vec::new()
            }
        }
    }

    /// Same as [`search`](Self::search) but with the failure visible, so
    /// callers and tests can tell "no matches" from "search broke".
    pub async fn try_search(&self, filters: &DiscoveryFilters) -> Result<Vec<ProfileDto>> {
        let bbox = match filters.bbox.as_deref() {
            None => None,
            Some(raw) => match geo::parse_bbox(raw) {
                Ok(parsed) => parsed,
                Err(e) => {
                    // 壞掉的 viewport 降級成「沒有框」，照樣套用上限
                    tracing::warn!("Ignoring malformed viewport: {}", e);
                    None
                }
            },
        };

        let query = CandidateQuery {
            bbox,
            price_max: filters.price_max,
            profile_type: filters.profile_type,
            limit: if bbox.is_none() {
                Some(self.unbounded_cap)
            } else {
                None
            },
        };

        let candidates = self.store.fetch_candidates(&query).await?;
        tracing::debug!("📥 Fetched {} candidates", candidates.len());

        let center = bbox.map(|b| geo::bbox_center(&b));

        let mut hits: Vec<(f64, ProfileDto)> = Vec::new();
        for record in &candidates {
            let point = match record.location {
                Some(p) => p,
                None => continue,
            };
            // storage may hold partial rows; drop anything the validator rejects
            if !geo::validate_coordinates(point.lat, point.lng) {
                tracing::debug!("⏭️ Skipping profile {} with invalid coordinates", record.id);
                continue;
            }

            let services = decode_or_empty(&record.services, "services", &record.id);
            if !filters.services.is_empty() && !services.matches_any(&filters.services) {
                continue;
            }

            let languages = decode_or_empty(&record.languages, "languages", &record.id);
            if !filters.languages.is_empty() && !languages.matches_any(&filters.languages) {
                continue;
            }

            let distance = match center {
                Some(c) => geo::distance_km(&c, &point),
                None => 0.0,
            };
            hits.push((distance, self.to_dto(record, point, &services, &languages)));
        }

        // closest to the viewport center first; without a viewport the store
        // order stands (the sort is stable, so ties keep it too)
        if center.is_some() {
            hits.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        }

        tracing::info!(
            "🔍 Discovery matched {} of {} candidates",
            hits.len(),
            candidates.len()
        );
        Ok(hits.into_iter().map(|(_, dto)| dto).collect())
    }

    fn to_dto(
        &self,
        record: &ProviderRecord,
        point: GeoPoint,
        services: &AttributeList,
        languages: &AttributeList,
    ) -> ProfileDto {
        let shown = self.obfuscation.displayed_point(&record.id, point);

        let short_id: String = record.id.chars().take(8).collect();
        let name = record
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Profile {}", short_id));
        let handle = name
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");

        ProfileDto {
            id: record.id.clone(),
            profile_type: record.profile_type,
            name,
            handle,
            avatar: record.avatar_url.clone(),
            lat: shown.lat,
            lng: shown.lng,
            is_active: record.is_active,
            services: services.labels(),
            languages: languages.labels(),
            price_range: record.hourly_rate.map(|rate| PriceRange {
                min: rate,
                max: rate * 2.0,
            }),
            city: record.city.clone(),
            verified: record.verified,
        }
    }
}

/// Attribute blobs come from storage in several encodings; a malformed blob
/// is logged and treated as empty rather than failing the whole search.
fn decode_or_empty(raw: &serde_json::Value, what: &str, id: &str) -> AttributeList {
    match attributes::parse_attributes(raw) {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!("Malformed {} blob on profile {}: {}", what, id, e);
            AttributeList::default()
        }
    }
}
