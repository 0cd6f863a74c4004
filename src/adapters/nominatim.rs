use crate::domain::model::{GeoPoint, GeocodeHit};
use crate::domain::ports::GeocodingProvider;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

const USER_AGENT: &str = concat!("geo-discovery/", env!("CARGO_PKG_VERSION"));

/// Nominatim sends coordinates as JSON strings, not numbers.
#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    display_name: String,
    #[serde(default)]
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    town: Option<String>,
    #[serde(default)]
    village: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

/// Outbound geocoding over the Nominatim HTTP API. Every request is
/// time-boxed so a slow provider can only stall a lookup, never the caller's
/// whole request.
pub struct NominatimClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl NominatimClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl GeocodingProvider for NominatimClient {
    async fn forward(&self, name: &str, country_codes: &[String]) -> Result<Option<GeocodeHit>> {
        let url = format!("{}/search", self.base_url);
        tracing::debug!("Geocoding request to: {}", url);

        let mut request = self.client.get(&url).query(&[
            ("q", name),
            ("format", "jsonv2"),
            ("addressdetails", "1"),
            ("limit", "1"),
        ]);
        let codes = country_codes.join(",");
        if !codes.is_empty() {
            request = request.query(&[("countrycodes", codes.as_str())]);
        }

        let response = request
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await?;

        tracing::debug!("Geocoding response status: {}", response.status());
        if !response.status().is_success() {
            return Ok(None);
        }

        let results: Vec<NominatimResult> = response.json().await?;
        Ok(results.into_iter().next().map(into_hit))
    }

    async fn reverse(&self, point: GeoPoint) -> Result<Option<GeocodeHit>> {
        let url = format!("{}/reverse", self.base_url);
        tracing::debug!("Reverse geocoding request to: {}", url);

        let lat = point.lat.to_string();
        let lon = point.lng.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("format", "jsonv2"),
                ("addressdetails", "1"),
            ])
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(None);
        }

        // reverse misses come back 200 with an "error" body
        let body: serde_json::Value = response.json().await?;
        if body.get("error").is_some() {
            return Ok(None);
        }
        let result: NominatimResult = serde_json::from_value(body)?;
        Ok(Some(into_hit(result)))
    }
}

fn into_hit(result: NominatimResult) -> GeocodeHit {
    let address = result.address.unwrap_or_default();
    GeocodeHit {
        // unparseable coordinate strings become NaN and fail validation downstream
        lat: result.lat.parse().unwrap_or(f64::NAN),
        lng: result.lon.parse().unwrap_or(f64::NAN),
        display_name: result.display_name,
        city: address.city,
        town: address.town,
        village: address.village,
        country: address.country,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_forward_takes_first_result_and_sends_country_codes() {
        let server = MockServer::start();
        let mock_data = serde_json::json!([
            {
                "lat": "46.1934",
                "lon": "6.2356",
                "display_name": "Annemasse, Haute-Savoie, France",
                "address": {"town": "Annemasse", "country": "France"}
            },
            {
                "lat": "48.8566",
                "lon": "2.3522",
                "display_name": "Paris, France",
                "address": {"city": "Paris", "country": "France"}
            }
        ]);

        let search_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/search")
                .query_param("q", "Annemasse")
                .query_param("format", "jsonv2")
                .query_param("limit", "1")
                .query_param("countrycodes", "ch,fr");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(mock_data);
        });

        let client = NominatimClient::new(server.base_url());
        let hit = client
            .forward("Annemasse", &["ch".to_string(), "fr".to_string()])
            .await
            .unwrap()
            .unwrap();

        search_mock.assert();
        assert_eq!(hit.display_name, "Annemasse, Haute-Savoie, France");
        assert!((hit.lat - 46.1934).abs() < 1e-9);
        assert_eq!(hit.town.as_deref(), Some("Annemasse"));
        assert_eq!(hit.city, None);
    }

    #[tokio::test]
    async fn test_forward_empty_result_list_is_none() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/search");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([]));
        });

        let client = NominatimClient::new(server.base_url());
        let hit = client.forward("Nowhere", &[]).await.unwrap();
        assert!(hit.is_none());
    }

    #[tokio::test]
    async fn test_forward_server_error_is_none_not_err() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/search");
            then.status(503);
        });

        let client = NominatimClient::new(server.base_url());
        let hit = client.forward("Geneva", &[]).await.unwrap();
        assert!(hit.is_none());
    }

    #[tokio::test]
    async fn test_forward_times_out_with_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/search");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([]))
                .delay(Duration::from_millis(500));
        });

        let client =
            NominatimClient::new(server.base_url()).with_timeout(Duration::from_millis(50));
        assert!(client.forward("Geneva", &[]).await.is_err());
    }

    #[tokio::test]
    async fn test_unparseable_coordinates_become_nan() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/search");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    {"lat": "not-a-number", "lon": "6.1", "display_name": "Broken"}
                ]));
        });

        let client = NominatimClient::new(server.base_url());
        let hit = client.forward("Broken", &[]).await.unwrap().unwrap();
        assert!(hit.lat.is_nan());
    }

    #[tokio::test]
    async fn test_reverse_parses_single_object() {
        let server = MockServer::start();
        let reverse_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/reverse")
                .query_param("lat", "46.2044")
                .query_param("lon", "6.1432");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "lat": "46.2044",
                    "lon": "6.1432",
                    "display_name": "Genève, Switzerland",
                    "address": {"city": "Genève", "country": "Switzerland"}
                }));
        });

        let client = NominatimClient::new(server.base_url());
        let hit = client
            .reverse(GeoPoint::new(46.2044, 6.1432))
            .await
            .unwrap()
            .unwrap();

        reverse_mock.assert();
        assert_eq!(hit.city.as_deref(), Some("Genève"));
    }

    #[tokio::test]
    async fn test_reverse_error_body_is_none() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/reverse");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"error": "Unable to geocode"}));
        });

        let client = NominatimClient::new(server.base_url());
        let hit = client.reverse(GeoPoint::new(0.0, 0.0)).await.unwrap();
        assert!(hit.is_none());
    }
}
