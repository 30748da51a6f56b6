//! Forecast payload (as delivered by the forecast collaborator) and the
//! snapshot derived from it.
//!
//! Every field except the `current` block is optional upstream. Missing values
//! stay `None` and are rendered as placeholders; only a payload without any
//! current conditions is rejected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    catalog::{AqiBand, WeatherCodeInfo, classify_aqi, describe_optional_code},
    error::DashboardError,
    model::{Location, Temperature},
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastPayload {
    pub timezone: Option<String>,
    pub current: Option<CurrentPayload>,
    pub hourly: Option<HourlyPayload>,
    pub daily: Option<DailyPayload>,
    pub air_quality: Option<AirQualityPayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentPayload {
    pub time: Option<String>,
    pub temperature_2m: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub relative_humidity_2m: Option<f64>,
    pub wind_speed_10m: Option<f64>,
    pub uv_index: Option<f64>,
    pub visibility: Option<f64>,
    pub weather_code: Option<i32>,
}

/// Time-index-aligned hourly arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlyPayload {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub weather_code: Vec<Option<i32>>,
    #[serde(default)]
    pub visibility: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    pub relative_humidity_2m: Vec<Option<f64>>,
}

/// Time-index-aligned daily arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyPayload {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub weather_code: Vec<Option<i32>>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    pub sunrise: Vec<Option<String>>,
    #[serde(default)]
    pub sunset: Vec<Option<String>>,
    #[serde(default)]
    pub uv_index_max: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AirQualityPayload {
    pub current: Option<AirQualityCurrent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AirQualityCurrent {
    pub european_aqi: Option<f64>,
}

impl ForecastPayload {
    pub fn european_aqi(&self) -> Option<f64> {
        self.air_quality
            .as_ref()
            .and_then(|aq| aq.current.as_ref())
            .and_then(|c| c.european_aqi)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub time: Option<String>,
    pub temperature: Option<Temperature>,
    pub feels_like: Option<Temperature>,
    pub humidity_pct: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub uv_index: Option<f64>,
    pub visibility_m: Option<f64>,
    pub weather_code: Option<i32>,
}

impl CurrentConditions {
    pub fn weather(&self) -> WeatherCodeInfo {
        describe_optional_code(self.weather_code)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourlyEntry {
    pub time: String,
    pub temperature: Option<Temperature>,
    pub weather_code: Option<i32>,
    pub visibility_m: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub humidity_pct: Option<f64>,
}

impl HourlyEntry {
    pub fn weather(&self) -> WeatherCodeInfo {
        describe_optional_code(self.weather_code)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyEntry {
    pub date: String,
    pub weather_code: Option<i32>,
    pub max: Option<Temperature>,
    pub min: Option<Temperature>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub uv_index_max: Option<f64>,
}

impl DailyEntry {
    pub fn weather(&self) -> WeatherCodeInfo {
        describe_optional_code(self.weather_code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AirQuality {
    Unavailable,
    /// European AQI, rounded to the nearest integer.
    Index(u32),
}

impl AirQuality {
    pub fn from_reading(reading: Option<f64>) -> Self {
        match reading {
            Some(value) if value.is_finite() && value >= 0.0 => {
                AirQuality::Index(value.round() as u32)
            }
            _ => AirQuality::Unavailable,
        }
    }

    pub fn band(&self) -> Option<&'static AqiBand> {
        match self {
            AirQuality::Index(value) => Some(classify_aqi(f64::from(*value))),
            AirQuality::Unavailable => None,
        }
    }

    /// "42" or "N/A".
    pub fn value_text(&self) -> String {
        match self {
            AirQuality::Index(value) => value.to_string(),
            AirQuality::Unavailable => "N/A".to_string(),
        }
    }

    pub fn summary(&self) -> String {
        match self.band() {
            Some(band) => format!("Air Quality: {}", band.label),
            None => "Air quality data unavailable".to_string(),
        }
    }
}

/// Full weather picture for one location at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub location: Location,
    pub fetched_at: DateTime<Utc>,
    pub timezone: Option<String>,
    pub current: CurrentConditions,
    pub hourly: Vec<HourlyEntry>,
    pub daily: Vec<DailyEntry>,
    pub air_quality: AirQuality,
}

impl WeatherSnapshot {
    pub fn from_payload(location: Location, payload: ForecastPayload) -> Result<Self, DashboardError> {
        let air_quality = AirQuality::from_reading(payload.european_aqi());

        let current = payload.current.ok_or_else(|| {
            DashboardError::FetchFailed("forecast payload has no current conditions".to_string())
        })?;

        let current = CurrentConditions {
            time: current.time,
            temperature: current.temperature_2m.map(Temperature::from_celsius),
            feels_like: current.apparent_temperature.map(Temperature::from_celsius),
            humidity_pct: current.relative_humidity_2m,
            wind_speed_kmh: current.wind_speed_10m,
            uv_index: current.uv_index,
            visibility_m: current.visibility,
            weather_code: current.weather_code,
        };

        let hourly = payload.hourly.map(hourly_entries).unwrap_or_default();
        let daily = payload.daily.map(daily_entries).unwrap_or_default();

        Ok(Self {
            location,
            fetched_at: Utc::now(),
            timezone: payload.timezone,
            current,
            hourly,
            daily,
            air_quality,
        })
    }

    /// Up to `count` hourly entries strictly after the current observation
    /// time. Without a current time, the first slot is assumed to be "now".
    pub fn upcoming_hours(&self, count: usize) -> &[HourlyEntry] {
        let start = match self.current.time.as_deref() {
            // ISO-8601 local timestamps of equal shape sort lexically.
            Some(now) => self
                .hourly
                .iter()
                .position(|entry| entry.time.as_str() > now)
                .unwrap_or(self.hourly.len()),
            None => 1.min(self.hourly.len()),
        };

        let end = (start + count).min(self.hourly.len());
        &self.hourly[start..end]
    }
}

fn at<T: Clone>(values: &[Option<T>], index: usize) -> Option<T> {
    values.get(index).cloned().flatten()
}

fn hourly_entries(hourly: HourlyPayload) -> Vec<HourlyEntry> {
    hourly
        .time
        .iter()
        .enumerate()
        .map(|(i, time)| HourlyEntry {
            time: time.clone(),
            temperature: at(&hourly.temperature_2m, i).map(Temperature::from_celsius),
            weather_code: at(&hourly.weather_code, i),
            visibility_m: at(&hourly.visibility, i),
            wind_speed_kmh: at(&hourly.wind_speed_10m, i),
            humidity_pct: at(&hourly.relative_humidity_2m, i),
        })
        .collect()
}

fn daily_entries(daily: DailyPayload) -> Vec<DailyEntry> {
    daily
        .time
        .iter()
        .enumerate()
        .map(|(i, date)| DailyEntry {
            date: date.clone(),
            weather_code: at(&daily.weather_code, i),
            max: at(&daily.temperature_2m_max, i).map(Temperature::from_celsius),
            min: at(&daily.temperature_2m_min, i).map(Temperature::from_celsius),
            sunrise: at(&daily.sunrise, i),
            sunset: at(&daily.sunset, i),
            uv_index_max: at(&daily.uv_index_max, i),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TemperatureUnit;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> ForecastPayload {
        serde_json::from_value(value).unwrap()
    }

    fn full_payload() -> serde_json::Value {
        json!({
            "timezone": "Europe/Berlin",
            "current": {
                "time": "2026-10-18T10:00",
                "temperature_2m": 20.0,
                "apparent_temperature": 18.5,
                "relative_humidity_2m": 60,
                "wind_speed_10m": 12.3,
                "uv_index": 3.1,
                "visibility": 24140.0,
                "weather_code": 2
            },
            "hourly": {
                "time": ["2026-10-18T09:00", "2026-10-18T10:00", "2026-10-18T11:00", "2026-10-18T12:00"],
                "temperature_2m": [18.0, 20.0, null, 22.0],
                "weather_code": [1, 2, 3],
                "visibility": [],
                "wind_speed_10m": [5.0, 6.0, 7.0, 8.0],
                "relative_humidity_2m": [70, 60, 55, 50]
            },
            "daily": {
                "time": ["2026-10-18", "2026-10-19"],
                "weather_code": [2, 61],
                "temperature_2m_max": [22.0, 15.0],
                "temperature_2m_min": [10.0, 8.0],
                "sunrise": ["2026-10-18T07:40", "2026-10-19T07:42"],
                "sunset": ["2026-10-18T18:20", "2026-10-19T18:18"],
                "uv_index_max": [3.5, 1.2]
            },
            "air_quality": { "current": { "european_aqi": 34.6 } }
        })
    }

    fn berlin() -> Location {
        Location::new("Berlin, Germany", 52.52, 13.41)
    }

    #[test]
    fn full_payload_becomes_snapshot() {
        let snap = WeatherSnapshot::from_payload(berlin(), payload(full_payload())).unwrap();

        let temp = snap.current.temperature.unwrap();
        assert_eq!(temp.celsius, 20.0);
        assert_eq!(temp.in_unit(TemperatureUnit::Fahrenheit), 68.0);
        assert_eq!(snap.current.weather().description, "Partly cloudy");
        assert_eq!(snap.air_quality, AirQuality::Index(35));
        assert_eq!(snap.air_quality.summary(), "Air Quality: Good");
        assert_eq!(snap.hourly.len(), 4);
        assert_eq!(snap.daily[1].weather().description, "Slight rain");
        assert_eq!(snap.timezone.as_deref(), Some("Europe/Berlin"));
    }

    #[test]
    fn misaligned_or_null_series_values_become_none() {
        let snap = WeatherSnapshot::from_payload(berlin(), payload(full_payload())).unwrap();

        assert_eq!(snap.hourly[2].temperature, None);
        assert_eq!(snap.hourly[3].weather_code, None);
        assert_eq!(snap.hourly[3].weather().description, "Unknown");
        assert_eq!(snap.hourly[0].visibility_m, None);
    }

    #[test]
    fn missing_air_quality_is_unavailable_not_an_error() {
        let mut value = full_payload();
        value.as_object_mut().unwrap().remove("air_quality");

        let snap = WeatherSnapshot::from_payload(berlin(), payload(value)).unwrap();
        assert_eq!(snap.air_quality, AirQuality::Unavailable);
        assert_eq!(snap.air_quality.value_text(), "N/A");
        assert_eq!(snap.air_quality.summary(), "Air quality data unavailable");
        assert!(snap.air_quality.band().is_none());
        assert_eq!(snap.current.temperature.unwrap().celsius, 20.0);
        assert_eq!(snap.daily.len(), 2);
    }

    #[test]
    fn missing_current_block_is_fetch_failure() {
        let err = WeatherSnapshot::from_payload(berlin(), payload(json!({ "hourly": {} }))).unwrap_err();
        assert!(matches!(err, DashboardError::FetchFailed(_)));
    }

    #[test]
    fn missing_current_fields_are_tolerated() {
        let snap = WeatherSnapshot::from_payload(berlin(), payload(json!({ "current": {} }))).unwrap();
        assert_eq!(snap.current.temperature, None);
        assert!(snap.hourly.is_empty());
        assert!(snap.daily.is_empty());
        assert_eq!(snap.current.weather().description, "Unknown");
    }

    #[test]
    fn upcoming_hours_start_after_current_time() {
        let snap = WeatherSnapshot::from_payload(berlin(), payload(full_payload())).unwrap();

        let upcoming: Vec<&str> = snap.upcoming_hours(24).iter().map(|h| h.time.as_str()).collect();
        assert_eq!(upcoming, vec!["2026-10-18T11:00", "2026-10-18T12:00"]);
        assert_eq!(snap.upcoming_hours(1).len(), 1);
    }

    #[test]
    fn upcoming_hours_without_current_time_skip_first_slot() {
        let mut value = full_payload();
        value["current"].as_object_mut().unwrap().remove("time");

        let snap = WeatherSnapshot::from_payload(berlin(), payload(value)).unwrap();
        assert_eq!(snap.upcoming_hours(24).len(), 3);
    }
}
