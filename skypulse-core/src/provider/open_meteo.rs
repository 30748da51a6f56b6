use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    config::ApiConfig,
    model::{Coordinates, GeoPlace},
    provider::{ForecastProvider, ForecastRequest, GeocodingProvider, truncate_body},
    snapshot::{AirQualityPayload, ForecastPayload},
};

const USER_AGENT: &str = concat!("skypulse/", env!("CARGO_PKG_VERSION"));

pub const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,weather_code,wind_speed_10m,visibility,uv_index";
pub const HOURLY_FIELDS: &str =
    "temperature_2m,weather_code,visibility,wind_speed_10m,relative_humidity_2m";
pub const DAILY_FIELDS: &str =
    "weather_code,temperature_2m_max,temperature_2m_min,sunrise,sunset,uv_index_max";
pub const AIR_QUALITY_FIELDS: &str = "european_aqi";

/// Client for the Open-Meteo geocoding, forecast and air-quality APIs.
/// No API key required.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    api: ApiConfig,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct OmGeocodingResponse {
    #[serde(default)]
    results: Option<Vec<GeoPlace>>,
}

impl OpenMeteoClient {
    pub fn new(api: ApiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(api.timeout())
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { api, http })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        what: &str,
    ) -> Result<T> {
        tracing::debug!("GET {} ({})", url, what);

        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send request to Open-Meteo ({what})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read Open-Meteo {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "Open-Meteo {} request failed with status {}: {}",
                what,
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body).with_context(|| format!("Failed to parse Open-Meteo {what} JSON"))
    }

    /// Best effort: any failure means "no air quality", never an error.
    async fn fetch_air_quality(&self, coordinates: Coordinates) -> Option<AirQualityPayload> {
        if self.api.air_quality_url.is_empty() {
            return None;
        }

        let url = format!("{}/air-quality", self.api.air_quality_url);
        let query = [
            ("latitude", coordinates.latitude.to_string()),
            ("longitude", coordinates.longitude.to_string()),
            ("current", AIR_QUALITY_FIELDS.to_string()),
            ("timezone", "auto".to_string()),
        ];

        match self.get_json::<AirQualityPayload>(&url, &query, "air quality").await {
            Ok(payload) => Some(payload),
            Err(e) => {
                tracing::debug!("Air quality unavailable: {:#}", e);
                None
            }
        }
    }
}

#[async_trait]
impl GeocodingProvider for OpenMeteoClient {
    async fn search(&self, name: &str, count: u8, language: &str) -> Result<Vec<GeoPlace>> {
        let url = format!("{}/search", self.api.geocoding_url);
        let query = [
            ("name", name.to_string()),
            ("count", count.to_string()),
            ("language", language.to_string()),
            ("format", "json".to_string()),
        ];

        let parsed: OmGeocodingResponse = self.get_json(&url, &query, "geocoding search").await?;
        Ok(parsed.results.unwrap_or_default())
    }

    async fn reverse(&self, coordinates: Coordinates, language: &str) -> Result<Vec<GeoPlace>> {
        let url = format!("{}/reverse", self.api.geocoding_url);
        let query = [
            ("latitude", coordinates.latitude.to_string()),
            ("longitude", coordinates.longitude.to_string()),
            ("language", language.to_string()),
            ("format", "json".to_string()),
        ];

        let parsed: OmGeocodingResponse = self.get_json(&url, &query, "reverse geocoding").await?;
        Ok(parsed.results.unwrap_or_default())
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoClient {
    async fn forecast(&self, request: ForecastRequest) -> Result<ForecastPayload> {
        let url = format!("{}/forecast", self.api.forecast_url);
        let query = [
            ("latitude", request.coordinates.latitude.to_string()),
            ("longitude", request.coordinates.longitude.to_string()),
            ("current", CURRENT_FIELDS.to_string()),
            ("hourly", HOURLY_FIELDS.to_string()),
            ("daily", DAILY_FIELDS.to_string()),
            ("timezone", "auto".to_string()),
            ("forecast_days", request.forecast_days.to_string()),
        ];

        let mut payload: ForecastPayload = self.get_json(&url, &query, "forecast").await?;

        if payload.air_quality.is_none() {
            payload.air_quality = self.fetch_air_quality(request.coordinates).await;
        }

        Ok(payload)
    }
}
