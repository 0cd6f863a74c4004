use crate::core::geo;
use crate::domain::model::{GeoPoint, GeocodeHit, PlaceSource, ResolvedPlace};
use crate::domain::ports::GeocodingProvider;

/// Minimum trimmed query length; anything shorter resolves to nothing.
pub const MIN_QUERY_LEN: usize = 2;

struct GazetteerEntry {
    names: &'static [&'static str],
    lat: f64,
    lng: f64,
    display_name: &'static str,
    city: &'static str,
}

/// Places the platform's users ask for constantly. Matching here costs
/// nothing and keeps the external provider out of the hot path.
const GAZETTEER: &[GazetteerEntry] = &[
    GazetteerEntry {
        names: &["geneva", "genève", "geneve"],
        lat: 46.2044,
        lng: 6.1432,
        display_name: "Genève, Switzerland",
        city: "Genève",
    },
    GazetteerEntry {
        names: &["zurich", "zürich"],
        lat: 47.3769,
        lng: 8.5417,
        display_name: "Zürich, Switzerland",
        city: "Zürich",
    },
    GazetteerEntry {
        names: &["lausanne"],
        lat: 46.5197,
        lng: 6.6323,
        display_name: "Lausanne, Switzerland",
        city: "Lausanne",
    },
    GazetteerEntry {
        names: &["bern", "berne"],
        lat: 46.9480,
        lng: 7.4474,
        display_name: "Bern, Switzerland",
        city: "Bern",
    },
    GazetteerEntry {
        names: &["basel", "bâle", "bale"],
        lat: 47.5596,
        lng: 7.5886,
        display_name: "Basel, Switzerland",
        city: "Basel",
    },
    GazetteerEntry {
        names: &["lugano"],
        lat: 46.0037,
        lng: 8.9511,
        display_name: "Lugano, Switzerland",
        city: "Lugano",
    },
    GazetteerEntry {
        names: &["lucerne", "luzern"],
        lat: 47.0502,
        lng: 8.3093,
        display_name: "Luzern, Switzerland",
        city: "Luzern",
    },
    GazetteerEntry {
        names: &["sion"],
        lat: 46.2331,
        lng: 7.3606,
        display_name: "Sion, Switzerland",
        city: "Sion",
    },
    GazetteerEntry {
        names: &["fribourg", "freiburg"],
        lat: 46.8065,
        lng: 7.1620,
        display_name: "Fribourg, Switzerland",
        city: "Fribourg",
    },
    GazetteerEntry {
        names: &["neuchatel", "neuchâtel"],
        lat: 46.9900,
        lng: 6.9293,
        display_name: "Neuchâtel, Switzerland",
        city: "Neuchâtel",
    },
    GazetteerEntry {
        names: &["st. gallen", "st gallen", "sankt gallen"],
        lat: 47.4245,
        lng: 9.3767,
        display_name: "St. Gallen, Switzerland",
        city: "St. Gallen",
    },
    GazetteerEntry {
        names: &["winterthur"],
        lat: 47.5001,
        lng: 8.7501,
        display_name: "Winterthur, Switzerland",
        city: "Winterthur",
    },
];

pub fn default_country_codes() -> Vec<String> {
    vec!["ch".to_string(), "fr".to_string()]
}

/// Resolves free-text place names to coordinates, gazetteer first, external
/// provider second. Every failure path yields `None`; callers treat that as
/// "place not found".
///
/// Successful external lookups should be cached upstream for at least an
/// hour; place data is effectively static and the provider rate-limits.
pub struct GeocodingResolver<P: GeocodingProvider> {
    provider: P,
    country_codes: Vec<String>,
}

impl<P: GeocodingProvider> GeocodingResolver<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            country_codes: default_country_codes(),
        }
    }

    pub fn with_country_codes(mut self, codes: Vec<String>) -> Self {
        self.country_codes = codes;
        self
    }

    pub async fn resolve_city(&self, name: &str) -> Option<ResolvedPlace> {
        let query = name.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return None;
        }

        if let Some(place) = lookup_gazetteer(query) {
            tracing::debug!("🔍 Gazetteer hit for '{}'", query);
            return Some(place);
        }

        match self.provider.forward(query, &self.country_codes).await {
            Ok(Some(hit)) => place_from_hit(hit, PlaceSource::External),
            Ok(None) => {
                tracing::debug!("No geocoding result for '{}'", query);
                None
            }
            Err(e) => {
                tracing::warn!("Geocoding lookup for '{}' failed: {}", query, e);
                None
            }
        }
    }

    /// Reverse lookup goes straight to the external provider; the gazetteer
    /// has no useful notion of "nearest known place".
    pub async fn reverse_resolve(&self, point: GeoPoint) -> Option<ResolvedPlace> {
        if !geo::validate_coordinates(point.lat, point.lng) {
            return None;
        }

        match self.provider.reverse(point).await {
            Ok(Some(hit)) => place_from_hit(hit, PlaceSource::External),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Reverse geocoding failed: {}", e);
                None
            }
        }
    }
}

/// Case-insensitive substring match in either direction, so "Genèv" and
/// "Grand Genève Area" both land on Geneva.
fn lookup_gazetteer(query: &str) -> Option<ResolvedPlace> {
    let needle = query.to_lowercase();
    for entry in GAZETTEER {
        for alias in entry.names {
            if alias.contains(&needle) || needle.contains(alias) {
                return Some(ResolvedPlace {
                    lat: entry.lat,
                    lng: entry.lng,
                    display_name: entry.display_name.to_string(),
                    city: Some(entry.city.to_string()),
                    country: Some("Switzerland".to_string()),
                    source: PlaceSource::Predefined,
                });
            }
        }
    }
    None
}

fn place_from_hit(hit: GeocodeHit, source: PlaceSource) -> Option<ResolvedPlace> {
    if !geo::validate_coordinates(hit.lat, hit.lng) {
        tracing::warn!(
            "Discarding geocoding hit '{}' with invalid coordinates",
            hit.display_name
        );
        return None;
    }

    // 市 → 鎮 → 村，取第一個有值的
    let city = hit.city.or(hit.town).or(hit.village);

    Some(ResolvedPlace {
        lat: hit.lat,
        lng: hit.lng,
        display_name: hit.display_name,
        city,
        country: hit.country,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::{DiscoveryError, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakeProvider {
        hit: Option<GeocodeHit>,
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    impl FakeProvider {
        fn returning(hit: Option<GeocodeHit>) -> Self {
            Self {
                hit,
                fail: false,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing() -> Self {
            Self {
                hit: None,
                fail: true,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl GeocodingProvider for FakeProvider {
        async fn forward(
            &self,
            _name: &str,
            _country_codes: &[String],
        ) -> Result<Option<GeocodeHit>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DiscoveryError::StorageError {
                    message: "provider down".to_string(),
                });
            }
            Ok(self.hit.clone())
        }

        async fn reverse(&self, _point: GeoPoint) -> Result<Option<GeocodeHit>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DiscoveryError::StorageError {
                    message: "provider down".to_string(),
                });
            }
            Ok(self.hit.clone())
        }
    }

    fn annemasse_hit() -> GeocodeHit {
        GeocodeHit {
            lat: 46.1934,
            lng: 6.2356,
            display_name: "Annemasse, Haute-Savoie, France".to_string(),
            city: None,
            town: Some("Annemasse".to_string()),
            village: None,
            country: Some("France".to_string()),
        }
    }

    #[tokio::test]
    async fn test_short_names_resolve_to_nothing() {
        let provider = FakeProvider::returning(Some(annemasse_hit()));
        let calls = provider.calls.clone();
        let resolver = GeocodingResolver::new(provider);

        assert!(resolver.resolve_city("").await.is_none());
        assert!(resolver.resolve_city(" g ").await.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_gazetteer_hit_skips_the_provider() {
        let provider = FakeProvider::failing();
        let calls = provider.calls.clone();
        let resolver = GeocodingResolver::new(provider);

        for query in ["Genève", "geneva", "GENEVA", "Grand Genève Area"] {
            let place = resolver.resolve_city(query).await.unwrap();
            assert_eq!(place.source, PlaceSource::Predefined);
            assert_eq!(place.city.as_deref(), Some("Genève"));
            assert!((place.lat - 46.2044).abs() < 1e-9);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_gazetteer_miss_falls_back_to_provider() {
        let resolver = GeocodingResolver::new(FakeProvider::returning(Some(annemasse_hit())));

        let place = resolver.resolve_city("Annemasse").await.unwrap();
        assert_eq!(place.source, PlaceSource::External);
        // no city field on the hit: the town fills the chain
        assert_eq!(place.city.as_deref(), Some("Annemasse"));
        assert_eq!(place.country.as_deref(), Some("France"));
    }

    #[tokio::test]
    async fn test_village_fills_chain_when_city_and_town_missing() {
        let hit = GeocodeHit {
            city: None,
            town: None,
            village: Some("Chancy".to_string()),
            ..annemasse_hit()
        };
        let resolver = GeocodingResolver::new(FakeProvider::returning(Some(hit)));
        let place = resolver.resolve_city("Chancy").await.unwrap();
        assert_eq!(place.city.as_deref(), Some("Chancy"));
    }

    #[tokio::test]
    async fn test_provider_failure_means_not_found() {
        let resolver = GeocodingResolver::new(FakeProvider::failing());
        assert!(resolver.resolve_city("Annemasse").await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_provider_coordinates_are_rejected() {
        let hit = GeocodeHit {
            lat: f64::NAN,
            ..annemasse_hit()
        };
        let resolver = GeocodingResolver::new(FakeProvider::returning(Some(hit)));
        assert!(resolver.resolve_city("Annemasse").await.is_none());
    }

    #[tokio::test]
    async fn test_reverse_always_uses_the_provider() {
        let provider = FakeProvider::returning(Some(annemasse_hit()));
        let calls = provider.calls.clone();
        let resolver = GeocodingResolver::new(provider);

        // even a point sitting on a gazetteer city goes external
        let place = resolver
            .reverse_resolve(GeoPoint::new(46.2044, 6.1432))
            .await
            .unwrap();
        assert_eq!(place.source, PlaceSource::External);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reverse_rejects_invalid_points_without_calling_out() {
        let provider = FakeProvider::returning(Some(annemasse_hit()));
        let calls = provider.calls.clone();
        let resolver = GeocodingResolver::new(provider);

        assert!(resolver
            .reverse_resolve(GeoPoint::new(91.0, 6.0))
            .await
            .is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
