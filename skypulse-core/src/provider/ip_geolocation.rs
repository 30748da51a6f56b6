//! Approximate position from the caller's public IP address.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::{error::GeolocationError, model::Coordinates, provider::GeolocationProvider};

#[derive(Debug, Clone)]
pub struct IpGeolocator {
    url: String,
    enabled: bool,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: Option<String>,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpGeolocator {
    pub fn new(url: String, enabled: bool, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { url, enabled, http })
    }
}

fn classify_transport_error(err: reqwest::Error) -> GeolocationError {
    if err.is_timeout() {
        GeolocationError::Timeout
    } else if err.is_connect() {
        GeolocationError::Unavailable
    } else {
        GeolocationError::Unknown(err.to_string())
    }
}

#[async_trait]
impl GeolocationProvider for IpGeolocator {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        if !self.enabled {
            return Err(GeolocationError::PermissionDenied);
        }

        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(classify_transport_error)?;

        match res.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(GeolocationError::PermissionDenied);
            }
            status if !status.is_success() => {
                tracing::debug!("IP lookup returned status {}", status);
                return Err(GeolocationError::Unavailable);
            }
            _ => {}
        }

        let body: IpLookupResponse = res.json().await.map_err(|e| {
            if e.is_timeout() {
                GeolocationError::Timeout
            } else {
                GeolocationError::Unknown(format!("invalid lookup response: {e}"))
            }
        })?;

        if body.status.as_deref().is_some_and(|s| s != "success") {
            tracing::debug!("IP lookup failed: {:?}", body.message);
            return Err(GeolocationError::Unavailable);
        }

        match (body.lat, body.lon) {
            (Some(latitude), Some(longitude)) => {
                tracing::info!("IP geolocation: {}, {}", latitude, longitude);
                Ok(Coordinates { latitude, longitude })
            }
            _ => Err(GeolocationError::Unknown("lookup response had no coordinates".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_geolocation_is_permission_denied() {
        let geo = IpGeolocator::new("http://127.0.0.1:9".into(), false, Duration::from_secs(1)).unwrap();
        assert_eq!(geo.current_position().await.unwrap_err(), GeolocationError::PermissionDenied);
    }
}
