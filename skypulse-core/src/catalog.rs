//! Static lookups: WMO weather codes and European AQI bands.
//! See: https://open-meteo.com/en/docs#weathervariables

/// Description and icon for a WMO weather code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherCodeInfo {
    pub description: &'static str,
    /// OpenWeatherMap-style icon id, e.g. "01d".
    pub icon: &'static str,
}

pub const UNKNOWN_WEATHER: WeatherCodeInfo = WeatherCodeInfo {
    description: "Unknown",
    icon: "unknown",
};

const fn info(description: &'static str, icon: &'static str) -> WeatherCodeInfo {
    WeatherCodeInfo { description, icon }
}

/// Total: codes outside the WMO table map to [`UNKNOWN_WEATHER`].
pub fn describe_weather_code(code: i32) -> WeatherCodeInfo {
    match code {
        0 => info("Clear sky", "01d"),
        1 => info("Mainly clear", "01d"),
        2 => info("Partly cloudy", "02d"),
        3 => info("Overcast", "03d"),
        45 => info("Fog", "50d"),
        48 => info("Depositing rime fog", "50d"),
        51 => info("Light drizzle", "09d"),
        53 => info("Moderate drizzle", "09d"),
        55 => info("Dense drizzle", "09d"),
        56 => info("Light freezing drizzle", "09d"),
        57 => info("Dense freezing drizzle", "09d"),
        61 => info("Slight rain", "10d"),
        63 => info("Moderate rain", "10d"),
        65 => info("Heavy rain", "10d"),
        66 => info("Light freezing rain", "13d"),
        67 => info("Heavy freezing rain", "13d"),
        71 => info("Slight snow fall", "13d"),
        73 => info("Moderate snow fall", "13d"),
        75 => info("Heavy snow fall", "13d"),
        77 => info("Snow grains", "13d"),
        80 => info("Slight rain showers", "09d"),
        81 => info("Moderate rain showers", "09d"),
        82 => info("Violent rain showers", "09d"),
        85 => info("Slight snow showers", "13d"),
        86 => info("Heavy snow showers", "13d"),
        95 => info("Thunderstorm", "11d"),
        96 => info("Thunderstorm with slight hail", "11d"),
        99 => info("Thunderstorm with heavy hail", "11d"),
        _ => UNKNOWN_WEATHER,
    }
}

/// Same as [`describe_weather_code`] but for a possibly missing code.
pub fn describe_optional_code(code: Option<i32>) -> WeatherCodeInfo {
    code.map(describe_weather_code).unwrap_or(UNKNOWN_WEATHER)
}

pub fn icon_url(icon: &str) -> String {
    format!("https://openweathermap.org/img/wn/{icon}.png")
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AqiBand {
    /// Inclusive upper bound.
    pub max: f64,
    pub label: &'static str,
    pub color: &'static str,
}

/// Ascending by `max`; the last band is open-ended.
pub const AQI_BANDS: [AqiBand; 6] = [
    AqiBand { max: 20.0, label: "Excellent", color: "#4caf50" },
    AqiBand { max: 40.0, label: "Good", color: "#8bc34a" },
    AqiBand { max: 60.0, label: "Moderate", color: "#ffeb3b" },
    AqiBand { max: 80.0, label: "Poor", color: "#ff9800" },
    AqiBand { max: 100.0, label: "Very Poor", color: "#f44336" },
    AqiBand { max: f64::INFINITY, label: "Hazardous", color: "#9c27b0" },
];

/// First band whose threshold is >= `value`. Callers must not pass a missing
/// index; absent air quality is rendered as unavailable instead.
pub fn classify_aqi(value: f64) -> &'static AqiBand {
    AQI_BANDS
        .iter()
        .find(|band| value <= band.max)
        .unwrap_or(&AQI_BANDS[AQI_BANDS.len() - 1])
}
