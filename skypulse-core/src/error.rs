use thiserror::Error;

/// Failures surfaced by dashboard operations.
///
/// Every variant carries a `user_message()` suitable for the error banner and
/// toast. Missing optional data (air quality, individual fields) is not an
/// error and never shows up here.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("No geocoding results for '{0}'")]
    NotFound(String),

    #[error("Weather fetch failed: {0}")]
    FetchFailed(String),

    #[error("Geolocation failed: {0}")]
    Geolocation(#[from] GeolocationError),

    #[error("No active location")]
    NoActiveLocation,

    /// No active location when toggling a favorite.
    #[error("No active location to add to favorites")]
    NoLocationToFavorite,

    #[error("No weather data to share")]
    NothingToShare,
}

impl DashboardError {
    pub fn user_message(&self) -> &'static str {
        match self {
            DashboardError::NotFound(_) => "City not found. Please try a different name.",
            DashboardError::FetchFailed(_) => {
                "Failed to fetch weather data. Please try again later."
            }
            DashboardError::Geolocation(e) => e.user_message(),
            DashboardError::NoActiveLocation => "Please search for a location first.",
            DashboardError::NoLocationToFavorite => {
                "Please search for a location first to add it to favorites."
            }
            DashboardError::NothingToShare => "Please search for a location first.",
        }
    }

    /// Short toast title.
    pub fn title(&self) -> &'static str {
        match self {
            DashboardError::NotFound(_) => "Error",
            DashboardError::FetchFailed(_) => "Data Error",
            DashboardError::Geolocation(GeolocationError::Unsupported) => "Not Supported",
            DashboardError::Geolocation(_) => "Location Error",
            DashboardError::NoActiveLocation | DashboardError::NoLocationToFavorite => {
                "No Location"
            }
            DashboardError::NothingToShare => "Nothing to Share",
        }
    }

    /// Precondition failures are warnings rather than errors and do not raise
    /// the error banner.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            DashboardError::NoActiveLocation
                | DashboardError::NoLocationToFavorite
                | DashboardError::NothingToShare
        )
    }
}

/// Reasons the platform geolocation capability can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location information unavailable")]
    Unavailable,

    #[error("Location request timed out")]
    Timeout,

    #[error("Unknown location error: {0}")]
    Unknown(String),

    #[error("Geolocation is not supported")]
    Unsupported,
}

impl GeolocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            GeolocationError::PermissionDenied => {
                "Location access denied. Please enable location services or search by city name."
            }
            GeolocationError::Unavailable => {
                "Location information unavailable. Please try again or search by city name."
            }
            GeolocationError::Timeout => {
                "Location request timed out. Please try again or search by city name."
            }
            GeolocationError::Unknown(_) => {
                "An error occurred getting your location. Please try again or search by city name."
            }
            GeolocationError::Unsupported => {
                "Geolocation is not supported here. Please search by city name."
            }
        }
    }
}
