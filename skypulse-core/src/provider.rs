use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

use crate::{
    Config,
    error::GeolocationError,
    model::{Coordinates, GeoPlace},
    provider::{ip_geolocation::IpGeolocator, open_meteo::OpenMeteoClient},
    snapshot::ForecastPayload,
};

pub mod ip_geolocation;
pub mod open_meteo;

/// Forward and reverse geocoding.
#[async_trait]
pub trait GeocodingProvider: Send + Sync + Debug {
    /// Up to `count` places matching `name`. No match is an empty list.
    async fn search(&self, name: &str, count: u8, language: &str) -> anyhow::Result<Vec<GeoPlace>>;

    /// Zero or one place near `coordinates`.
    async fn reverse(&self, coordinates: Coordinates, language: &str) -> anyhow::Result<Vec<GeoPlace>>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastRequest {
    pub coordinates: Coordinates,
    pub forecast_days: u8,
}

#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    /// Current, hourly and daily data plus air quality when available, in the
    /// location's own timezone.
    async fn forecast(&self, request: ForecastRequest) -> anyhow::Result<ForecastPayload>;
}

/// Single-shot position lookup.
#[async_trait]
pub trait GeolocationProvider: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// Somewhere to send a shareable weather summary.
pub trait ShareTarget: Send + Sync {
    fn share(&self, title: &str, text: &str) -> anyhow::Result<()>;
}

/// A position supplied up front, e.g. from command-line flags.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinates);

#[async_trait]
impl GeolocationProvider for FixedPosition {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Ok(self.0)
    }
}

/// Construct the Open-Meteo client from config.
pub fn open_meteo_from_config(config: &Config) -> anyhow::Result<Arc<OpenMeteoClient>> {
    Ok(Arc::new(OpenMeteoClient::new(config.api.clone())?))
}

/// Construct the IP-based geolocator from config.
pub fn geolocator_from_config(config: &Config) -> anyhow::Result<Arc<dyn GeolocationProvider>> {
    let geolocator = IpGeolocator::new(
        config.geolocation.ip_lookup_url.clone(),
        config.geolocation.enabled,
        config.api.timeout(),
    )?;

    Ok(Arc::new(geolocator))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
