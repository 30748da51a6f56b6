use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A named coordinate pair.
///
/// `name` is the composite display name ("City, Region, Country") and doubles
/// as the identity key for recent searches and favorites: two locations are the
/// same iff their names are equal. Distinct places sharing a display name
/// therefore collide in the lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Milliseconds since the Unix epoch; only set on recent-search entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl Location {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            timestamp: None,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Copy of this location stamped with the current time.
    pub fn stamped_now(&self) -> Self {
        Self {
            timestamp: Some(Utc::now().timestamp_millis()),
            ..self.clone()
        }
    }

    /// Copy of this location without a timestamp.
    pub fn unstamped(&self) -> Self {
        Self {
            timestamp: None,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A single geocoding match as returned by the geocoding collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPlace {
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub admin1: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPlace {
    /// "City, Region, Country", dropping the region when it repeats the city
    /// and any part that is missing.
    pub fn display_name(&self) -> String {
        let mut name = self.name.clone();

        if let Some(admin) = self.admin1.as_deref().filter(|a| !a.is_empty() && *a != self.name) {
            name.push_str(", ");
            name.push_str(admin);
        }

        if let Some(country) = self.country.as_deref().filter(|c| !c.is_empty()) {
            name.push_str(", ");
            name.push_str(country);
        }

        name
    }

    pub fn to_location(&self) -> Location {
        Location::new(self.display_name(), self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Fahrenheit => "fahrenheit",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            TemperatureUnit::Celsius => TemperatureUnit::Fahrenheit,
            TemperatureUnit::Fahrenheit => TemperatureUnit::Celsius,
        }
    }
}

impl std::fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TemperatureUnit {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "c" | "celsius" => Ok(TemperatureUnit::Celsius),
            "f" | "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            _ => Err(anyhow::anyhow!(
                "Unknown temperature unit '{value}'. Supported units: celsius (c), fahrenheit (f)."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::Dark)
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Theme {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(anyhow::anyhow!("Unknown theme '{value}'. Supported themes: light, dark.")),
        }
    }
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Nearest whole number for display, halves rounding up (-2.5 becomes -2).
/// Never yields negative zero.
pub fn round_for_display(value: f64) -> f64 {
    (value + 0.5).floor() + 0.0
}

/// A temperature reading with both scales derived once at fetch time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub celsius: f64,
    pub fahrenheit: f64,
}

impl Temperature {
    pub fn from_celsius(celsius: f64) -> Self {
        Self {
            celsius,
            fahrenheit: celsius_to_fahrenheit(celsius),
        }
    }

    pub fn in_unit(&self, unit: TemperatureUnit) -> f64 {
        match unit {
            TemperatureUnit::Celsius => self.celsius,
            TemperatureUnit::Fahrenheit => self.fahrenheit,
        }
    }

    /// "21°C", rounded for display.
    pub fn display(&self, unit: TemperatureUnit) -> String {
        format!("{}{}", round_for_display(self.in_unit(unit)), unit.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(name: &str, admin1: Option<&str>, country: Option<&str>) -> GeoPlace {
        GeoPlace {
            name: name.to_string(),
            admin1: admin1.map(str::to_string),
            country: country.map(str::to_string),
            latitude: 1.0,
            longitude: 2.0,
        }
    }

    #[test]
    fn celsius_to_fahrenheit_fixed_points() {
        assert_eq!(celsius_to_fahrenheit(0.0), 32.0);
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
        assert_eq!(celsius_to_fahrenheit(-40.0), -40.0);
    }

    #[test]
    fn display_name_includes_region_and_country() {
        let p = place("Springfield", Some("Illinois"), Some("United States"));
        assert_eq!(p.display_name(), "Springfield, Illinois, United States");
    }

    #[test]
    fn display_name_skips_region_equal_to_city() {
        let p = place("Berlin", Some("Berlin"), Some("Germany"));
        assert_eq!(p.display_name(), "Berlin, Germany");
    }

    #[test]
    fn display_name_tolerates_missing_parts() {
        assert_eq!(place("Nowhere", None, None).display_name(), "Nowhere");
        assert_eq!(place("Nowhere", Some(""), Some("Atlantis")).display_name(), "Nowhere, Atlantis");
    }

    #[test]
    fn unit_parsing_accepts_short_and_long_names() {
        assert_eq!(TemperatureUnit::try_from("F").unwrap(), TemperatureUnit::Fahrenheit);
        assert_eq!(TemperatureUnit::try_from("celsius").unwrap(), TemperatureUnit::Celsius);
        assert!(TemperatureUnit::try_from("kelvin").is_err());
    }

    #[test]
    fn location_timestamp_is_omitted_when_absent() {
        let json = serde_json::to_string(&Location::new("X", 1.0, 2.0)).unwrap();
        assert!(!json.contains("timestamp"));

        let stamped = Location::new("X", 1.0, 2.0).stamped_now();
        assert!(stamped.timestamp.is_some());
        assert_eq!(stamped.unstamped(), Location::new("X", 1.0, 2.0));
    }

    #[test]
    fn display_rounding_rounds_halves_up_without_negative_zero() {
        assert_eq!(round_for_display(-0.3).to_string(), "0");
        assert_eq!(round_for_display(-2.5), -2.0);
        assert_eq!(round_for_display(2.5), 3.0);
        assert_eq!(round_for_display(-2.6), -3.0);
        assert!(round_for_display(-0.4).is_sign_positive());
    }

    #[test]
    fn temperature_display_never_shows_minus_zero() {
        assert_eq!(Temperature::from_celsius(-0.3).display(TemperatureUnit::Celsius), "0°C");
        assert_eq!(Temperature::from_celsius(-2.5).display(TemperatureUnit::Celsius), "-2°C");
        assert_eq!(Temperature::from_celsius(12.4).display(TemperatureUnit::Fahrenheit), "54°F");
    }

    #[test]
    fn temperature_reads_in_either_unit() {
        let t = Temperature::from_celsius(20.0);
        assert_eq!(t.in_unit(TemperatureUnit::Celsius), 20.0);
        assert_eq!(t.in_unit(TemperatureUnit::Fahrenheit), 68.0);
    }
}
