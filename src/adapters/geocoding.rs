use crate::domain::model::LatLng;
use crate::domain::ports::Geocoder;
use crate::utils::error::{BoardError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_GEOCODING_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
}

/// Google Geocoding API 的反向查詢
#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    client: Client,
    endpoint: String,
    api_key: String,
    language: Option<String>,
    region: Option<String>,
}

impl GoogleGeocoder {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            language: None,
            region: None,
        }
    }

    /// 沒有設定逾時就不限時間，等待中的視窗會一直停在查詢狀態
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Result<Self> {
        if let Some(timeout) = timeout {
            self.client = Client::builder().timeout(timeout).build()?;
        }
        Ok(self)
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn reverse_geocode(&self, position: LatLng) -> Result<String> {
        let mut query = vec![
            ("latlng", format!("{},{}", position.lat, position.lng)),
            ("key", self.api_key.clone()),
        ];
        if let Some(language) = &self.language {
            query.push(("language", language.clone()));
        }
        if let Some(region) = &self.region {
            query.push(("region", region.clone()));
        }

        tracing::debug!("Reverse geocoding ({}) via {}", position, self.endpoint);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&query)
            .send()
            .await?
            .error_for_status()?;

        let body: GeocodeResponse = serde_json::from_str(&response.text().await?)?;
        match body.status.as_str() {
            "OK" => body
                .results
                .into_iter()
                .next()
                .map(|r| r.formatted_address)
                .ok_or(BoardError::NoResultsError {
                    lat: position.lat,
                    lng: position.lng,
                }),
            "ZERO_RESULTS" => Err(BoardError::NoResultsError {
                lat: position.lat,
                lng: position.lng,
            }),
            status => Err(BoardError::GeocodingError {
                status: status.to_string(),
                message: body.error_message.unwrap_or_default(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn position() -> LatLng {
        LatLng::new(-33.7421825090221, 19.011633172357847)
    }

    #[tokio::test]
    async fn test_returns_first_formatted_address() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/geocode/json")
                .query_param("latlng", "-33.7421825090221,19.011633172357847")
                .query_param("key", "secret");
            then.status(200).json_body(serde_json::json!({
                "status": "OK",
                "results": [
                    {"formatted_address": "123 Main St"},
                    {"formatted_address": "Somewhere else"}
                ]
            }));
        });

        let geocoder = GoogleGeocoder::new(server.url("/geocode/json"), "secret");
        let address = geocoder.reverse_geocode(position()).await.unwrap();

        mock.assert();
        assert_eq!(address, "123 Main St");
    }

    #[tokio::test]
    async fn test_sends_language_and_region() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/geocode/json")
                .query_param("language", "af")
                .query_param("region", "za");
            then.status(200).json_body(serde_json::json!({
                "status": "OK",
                "results": [{"formatted_address": "Hoofstraat 1"}]
            }));
        });

        let geocoder = GoogleGeocoder::new(server.url("/geocode/json"), "")
            .with_language(Some("af".to_string()))
            .with_region(Some("za".to_string()));

        assert_eq!(
            geocoder.reverse_geocode(position()).await.unwrap(),
            "Hoofstraat 1"
        );
        mock.assert();
    }

    #[tokio::test]
    async fn test_zero_results_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/geocode/json");
            then.status(200)
                .json_body(serde_json::json!({"status": "ZERO_RESULTS", "results": []}));
        });

        let geocoder = GoogleGeocoder::new(server.url("/geocode/json"), "key");
        let err = geocoder.reverse_geocode(position()).await.unwrap_err();
        assert!(matches!(err, BoardError::NoResultsError { .. }));
    }

    #[tokio::test]
    async fn test_denied_request_carries_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/geocode/json");
            then.status(200).json_body(serde_json::json!({
                "status": "REQUEST_DENIED",
                "error_message": "The provided API key is invalid.",
                "results": []
            }));
        });

        let geocoder = GoogleGeocoder::new(server.url("/geocode/json"), "");
        match geocoder.reverse_geocode(position()).await {
            Err(BoardError::GeocodingError { status, message }) => {
                assert_eq!(status, "REQUEST_DENIED");
                assert!(message.contains("API key"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_failure_and_malformed_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/broken");
            then.status(500);
        });
        server.mock(|when, then| {
            when.method(GET).path("/garbage");
            then.status(200).body("<html>not json</html>");
        });

        let broken = GoogleGeocoder::new(server.url("/broken"), "key");
        assert!(matches!(
            broken.reverse_geocode(position()).await,
            Err(BoardError::HttpError(_))
        ));

        let garbage = GoogleGeocoder::new(server.url("/garbage"), "key");
        assert!(matches!(
            garbage.reverse_geocode(position()).await,
            Err(BoardError::SerializationError(_))
        ));
    }
}
