//! The dashboard controller.
//!
//! Owns the application state (active location, current snapshot, unit and
//! theme flags, location lists) and runs every user-facing operation: it
//! resolves, fetches, applies and persists, and reports each outcome on the
//! [`EventBus`]. Failures never escape as panics; each operation returns a
//! `Result` and has already published the matching banner/toast.
//!
//! Weather fetches and suggestion lookups are tagged with request tickets. Only
//! the response to the most recently issued request is applied; older ones
//! come back as [`Outcome::Superseded`].

use parking_lot::Mutex;
use std::{sync::Arc, time::Duration};

use crate::{
    Config,
    error::{DashboardError, GeolocationError},
    events::{DashboardEvent, EventBus, EventListener, Notice},
    locations::{FavoriteToggle, ListKind, LocationLists},
    model::{Location, TemperatureUnit, Theme},
    provider::{
        ForecastProvider, ForecastRequest, GeocodingProvider, GeolocationProvider, ShareTarget,
        geolocator_from_config, open_meteo_from_config,
    },
    sequence::{Debouncer, RequestSequence, Ticket},
    snapshot::WeatherSnapshot,
    store::{DARK_MODE_KEY, FileStore, KeyValueStore, TEMPERATURE_UNIT_KEY},
};

/// Daily forecast horizon.
pub const FORECAST_DAYS: u8 = 7;

pub const FALLBACK_LOCATION_NAME: &str = "Your Location";
pub const SHARE_TITLE: &str = "Weather Update";

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSettings {
    pub language: String,
    pub suggestion_count: u8,
    pub suggestion_debounce: Duration,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for DashboardSettings {
    fn from(config: &Config) -> Self {
        Self {
            language: config.api.language.clone(),
            suggestion_count: config.api.suggestion_count,
            suggestion_debounce: config.ui.suggestion_debounce(),
        }
    }
}

/// Result of a request that may have been overtaken by a newer one.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Applied(T),
    Superseded,
}

impl<T> Outcome<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            Outcome::Applied(value) => Some(value),
            Outcome::Superseded => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Outcome::Superseded)
    }
}

pub type FetchOutcome = Outcome<Arc<WeatherSnapshot>>;

/// Where an already resolved location was picked from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// A live search suggestion; recorded as a recent search.
    Suggestion,
    Recent,
    Favorite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    /// The primary target failed or was absent; the fallback took it.
    FellBack,
    Failed,
}

#[derive(Debug, Default)]
struct AppState {
    active: Option<Location>,
    snapshot: Option<Arc<WeatherSnapshot>>,
    unit: TemperatureUnit,
    theme: Theme,
    error: Option<String>,
}

pub struct Dashboard {
    geocoder: Arc<dyn GeocodingProvider>,
    forecaster: Arc<dyn ForecastProvider>,
    geolocator: Option<Arc<dyn GeolocationProvider>>,
    store: Arc<dyn KeyValueStore>,
    settings: DashboardSettings,
    state: Mutex<AppState>,
    lists: Mutex<LocationLists>,
    pending_list_events: Arc<Mutex<Vec<DashboardEvent>>>,
    events: EventBus,
    fetches: RequestSequence,
    suggestions: RequestSequence,
    debouncer: Debouncer,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("settings", &self.settings)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    pub fn new(
        geocoder: Arc<dyn GeocodingProvider>,
        forecaster: Arc<dyn ForecastProvider>,
        store: Arc<dyn KeyValueStore>,
        settings: DashboardSettings,
    ) -> Self {
        let events = EventBus::new();

        // List changes are queued while the lists are locked and published
        // once the lock is released.
        let pending: Arc<Mutex<Vec<DashboardEvent>>> = Arc::default();
        let mut lists = LocationLists::load(store.clone());
        let queue = pending.clone();
        lists.subscribe(Box::new(move |kind, list| {
            queue.lock().push(match kind {
                ListKind::Recent => DashboardEvent::RecentSearchesChanged(list.to_vec()),
                ListKind::Favorites => DashboardEvent::FavoritesChanged(list.to_vec()),
            });
        }));

        let unit = store
            .get(TEMPERATURE_UNIT_KEY)
            .and_then(|raw| TemperatureUnit::try_from(raw.as_str()).ok())
            .unwrap_or_default();
        let theme = match store.get(DARK_MODE_KEY).as_deref() {
            Some("true") => Theme::Dark,
            _ => Theme::Light,
        };

        Self {
            geocoder,
            forecaster,
            geolocator: None,
            store,
            debouncer: Debouncer::new(settings.suggestion_debounce),
            settings,
            state: Mutex::new(AppState {
                unit,
                theme,
                ..AppState::default()
            }),
            lists: Mutex::new(lists),
            pending_list_events: pending,
            events,
            fetches: RequestSequence::new(),
            suggestions: RequestSequence::new(),
        }
    }

    pub fn with_geolocator(mut self, geolocator: Arc<dyn GeolocationProvider>) -> Self {
        self.geolocator = Some(geolocator);
        self
    }

    /// Open-Meteo collaborators, IP geolocation and the on-disk store, all as
    /// configured.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = open_meteo_from_config(config)?;
        let store = Arc::new(FileStore::open(config.storage_file_path()?));

        let dashboard = Self::new(client.clone(), client, store, DashboardSettings::from(config))
            .with_geolocator(geolocator_from_config(config)?);

        Ok(dashboard)
    }

    pub fn subscribe(&self, listener: EventListener) {
        self.events.subscribe(listener);
    }

    // ----- state accessors -----

    pub fn active_location(&self) -> Option<Location> {
        self.state.lock().active.clone()
    }

    pub fn snapshot(&self) -> Option<Arc<WeatherSnapshot>> {
        self.state.lock().snapshot.clone()
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.state.lock().unit
    }

    pub fn theme(&self) -> Theme {
        self.state.lock().theme
    }

    pub fn error_message(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    pub fn recent_searches(&self) -> Vec<Location> {
        self.lists.lock().recent().to_vec()
    }

    pub fn favorites(&self) -> Vec<Location> {
        self.lists.lock().favorites().to_vec()
    }

    pub fn is_favorite(&self, name: &str) -> bool {
        self.lists.lock().is_favorite(name)
    }

    pub fn is_active_favorite(&self) -> bool {
        match self.active_location() {
            Some(active) => self.is_favorite(&active.name),
            None => false,
        }
    }

    // ----- resolution -----

    /// Best geocoding match for a free-text query.
    pub async fn resolve_city(&self, query: &str) -> Result<Location, DashboardError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DashboardError::NotFound(String::new()));
        }

        let places = self
            .geocoder
            .search(query, 1, &self.settings.language)
            .await
            .map_err(|e| DashboardError::FetchFailed(format!("{e:#}")))?;

        places
            .first()
            .map(|place| place.to_location())
            .ok_or_else(|| DashboardError::NotFound(query.to_string()))
    }

    /// Up to `suggestion_count` matches; an empty query makes no request.
    pub async fn resolve_suggestions(&self, query: &str) -> Result<Vec<Location>, DashboardError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let places = self
            .geocoder
            .search(query, self.settings.suggestion_count, &self.settings.language)
            .await
            .map_err(|e| DashboardError::FetchFailed(format!("{e:#}")))?;

        Ok(places.iter().map(|place| place.to_location()).collect())
    }

    /// Debounced, sequence-tagged suggestions for live typing. Lookup failures
    /// yield an empty list; a call overtaken by a newer one is `Superseded`.
    pub async fn suggest(&self, query: &str) -> Outcome<Vec<Location>> {
        let query = query.trim();
        if query.is_empty() {
            self.debouncer.cancel();
            self.suggestions.invalidate();
            return Outcome::Applied(Vec::new());
        }

        if !self.debouncer.settle().await {
            return Outcome::Superseded;
        }

        let ticket = self.suggestions.issue();
        let result = self.resolve_suggestions(query).await;

        if !self.suggestions.is_latest(ticket) {
            tracing::debug!("Discarding stale suggestions for '{}'", query);
            return Outcome::Superseded;
        }

        match result {
            Ok(locations) => Outcome::Applied(locations),
            Err(e) => {
                tracing::debug!("Suggestion lookup failed: {}", e);
                Outcome::Applied(Vec::new())
            }
        }
    }

    /// Platform position, named by reverse geocoding when possible.
    pub async fn resolve_current_position(&self) -> Result<Location, DashboardError> {
        let geolocator = self.geolocator.as_ref().ok_or(GeolocationError::Unsupported)?;
        let coordinates = geolocator.current_position().await?;

        let name = match self.geocoder.reverse(coordinates, &self.settings.language).await {
            Ok(places) => places.first().map(|place| place.display_name()),
            Err(e) => {
                tracing::warn!("Reverse geocoding failed: {:#}", e);
                None
            }
        };

        Ok(Location::new(
            name.unwrap_or_else(|| FALLBACK_LOCATION_NAME.to_string()),
            coordinates.latitude,
            coordinates.longitude,
        ))
    }

    /// Fetch a snapshot for `location` without touching any state.
    pub async fn fetch_weather(&self, location: &Location) -> Result<WeatherSnapshot, DashboardError> {
        let request = ForecastRequest {
            coordinates: location.coordinates(),
            forecast_days: FORECAST_DAYS,
        };

        let payload = self
            .forecaster
            .forecast(request)
            .await
            .map_err(|e| DashboardError::FetchFailed(format!("{e:#}")))?;

        WeatherSnapshot::from_payload(location.unstamped(), payload)
    }

    // ----- user operations -----

    /// Resolve `query`, fetch its weather, make it active and record it as a
    /// recent search.
    pub async fn search_city(&self, query: &str) -> Result<FetchOutcome, DashboardError> {
        self.dismiss_error();
        let ticket = self.begin_fetch();

        let result = async {
            let location = self.resolve_city(query).await?;
            let snapshot = self.fetch_weather(&location).await?;
            Ok::<_, DashboardError>((location, snapshot))
        }
        .await;

        let outcome = self.finish_fetch(ticket, result, true)?;
        if let Outcome::Applied(snapshot) = &outcome {
            self.events.toast(weather_updated(&snapshot.location.name));
        }
        Ok(outcome)
    }

    /// Geolocate, fetch, make active and record as a recent search.
    pub async fn use_current_location(&self) -> Result<FetchOutcome, DashboardError> {
        self.dismiss_error();
        let ticket = self.begin_fetch();

        let result = async {
            let location = self.resolve_current_position().await?;
            let snapshot = self.fetch_weather(&location).await?;
            Ok::<_, DashboardError>((location, snapshot))
        }
        .await;

        let outcome = self.finish_fetch(ticket, result, true)?;
        if outcome.is_superseded() {
            return Ok(outcome);
        }
        self.events.toast(Notice::success(
            "Location Found",
            "Using your current location for weather data.",
        ));
        Ok(outcome)
    }

    /// Fetch an already resolved location picked from a suggestion or a
    /// saved list. Only suggestions are recorded as recent searches.
    pub async fn show_location(
        &self,
        location: Location,
        selection: Selection,
    ) -> Result<FetchOutcome, DashboardError> {
        self.dismiss_error();

        let title = match selection {
            Selection::Suggestion => None,
            Selection::Recent => Some("Location Selected"),
            Selection::Favorite => Some("Favorite Selected"),
        };
        if let Some(title) = title {
            self.events.toast(Notice::info(title, format!("Loading weather for {}", location.name)));
        }

        let ticket = self.begin_fetch();
        let result = self.fetch_weather(&location).await.map(|snapshot| (location, snapshot));
        let outcome = self.finish_fetch(ticket, result, selection == Selection::Suggestion)?;

        if let (Selection::Suggestion, Outcome::Applied(snapshot)) = (selection, &outcome) {
            self.events.toast(weather_updated(&snapshot.location.name));
        }
        Ok(outcome)
    }

    /// Re-fetch the active location.
    pub async fn refresh(&self) -> Result<FetchOutcome, DashboardError> {
        let Some(location) = self.active_location() else {
            return Err(self.report(DashboardError::NoActiveLocation));
        };

        self.events.toast(Notice::info("Refreshing", "Updating weather data..."));

        let ticket = self.begin_fetch();
        let result = self.fetch_weather(&location).await.map(|snapshot| (location, snapshot));
        self.finish_fetch(ticket, result, false)
    }

    pub fn toggle_favorite(&self) -> Result<FavoriteToggle, DashboardError> {
        let active = self.active_location();
        let toggled = self.with_lists(|lists| lists.toggle_favorite(active.as_ref()));

        match (toggled, active) {
            (Ok(FavoriteToggle::Added), Some(location)) => {
                self.events.toast(Notice::success(
                    "Added to Favorites",
                    format!("{} has been added to your favorites.", location.name),
                ));
                Ok(FavoriteToggle::Added)
            }
            (Ok(FavoriteToggle::Removed), Some(location)) => {
                self.events.toast(Notice::info(
                    "Removed from Favorites",
                    format!("{} has been removed from your favorites.", location.name),
                ));
                Ok(FavoriteToggle::Removed)
            }
            (Ok(_), None) => Err(self.report(DashboardError::NoLocationToFavorite)),
            (Err(e), _) => Err(self.report(e)),
        }
    }

    /// "Current weather in {name}: {temp}, {description}. ..." in the
    /// selected unit.
    pub fn share_text(&self) -> Result<String, DashboardError> {
        let state = self.state.lock();
        let (Some(active), Some(snapshot)) = (&state.active, &state.snapshot) else {
            return Err(DashboardError::NothingToShare);
        };

        let temp = match snapshot.current.temperature {
            Some(t) => t.display(state.unit),
            None => "N/A".to_string(),
        };

        Ok(format!(
            "Current weather in {}: {}, {}. Checked via SkyPulse Weather App.",
            active.name,
            temp,
            snapshot.current.weather().description,
        ))
    }

    /// Share through `primary` when given, falling back to `fallback` if it is
    /// absent or fails.
    pub fn share(
        &self,
        primary: Option<&dyn ShareTarget>,
        fallback: &dyn ShareTarget,
    ) -> Result<ShareOutcome, DashboardError> {
        let text = self.share_text().map_err(|e| self.report(e))?;

        if let Some(target) = primary {
            match target.share(SHARE_TITLE, &text) {
                Ok(()) => {
                    self.events.toast(Notice::success("Shared Successfully", "Weather information shared!"));
                    return Ok(ShareOutcome::Shared);
                }
                Err(e) => tracing::warn!("Share failed, using fallback: {:#}", e),
            }
        }

        match fallback.share(SHARE_TITLE, &text) {
            Ok(()) => {
                self.events.toast(Notice::success(
                    "Copied to Clipboard",
                    "Weather information copied! You can now paste and share it.",
                ));
                Ok(ShareOutcome::FellBack)
            }
            Err(e) => {
                tracing::warn!("Fallback share failed: {:#}", e);
                self.events.toast(Notice::error("Copy Failed", "Could not copy weather information."));
                Ok(ShareOutcome::Failed)
            }
        }
    }

    /// Switch the display unit. Cached snapshot values are reused; nothing is
    /// fetched.
    pub fn set_unit(&self, unit: TemperatureUnit) {
        {
            let mut state = self.state.lock();
            if state.unit == unit {
                return;
            }
            state.unit = unit;
        }

        self.persist(TEMPERATURE_UNIT_KEY, unit.as_str());
        self.events.publish(DashboardEvent::UnitChanged(unit));
    }

    pub fn toggle_unit(&self) -> TemperatureUnit {
        let unit = self.unit().toggled();
        self.set_unit(unit);
        unit
    }

    pub fn set_theme(&self, theme: Theme) {
        self.state.lock().theme = theme;
        self.persist(DARK_MODE_KEY, if theme.is_dark() { "true" } else { "false" });
        self.events.publish(DashboardEvent::ThemeChanged(theme));
    }

    pub fn toggle_theme(&self) -> Theme {
        let theme = self.theme().toggled();
        self.set_theme(theme);
        theme
    }

    /// Clear the error banner, if shown.
    pub fn dismiss_error(&self) {
        if self.state.lock().error.take().is_some() {
            self.events.publish(DashboardEvent::ErrorCleared);
        }
    }

    // ----- internals -----

    fn begin_fetch(&self) -> Ticket {
        let ticket = self.fetches.issue();
        self.events.publish(DashboardEvent::Loading(true));
        ticket
    }

    fn finish_fetch(
        &self,
        ticket: Ticket,
        result: Result<(Location, WeatherSnapshot), DashboardError>,
        record_recent: bool,
    ) -> Result<FetchOutcome, DashboardError> {
        if !self.fetches.is_latest(ticket) {
            tracing::debug!("Discarding stale weather response");
            return Ok(Outcome::Superseded);
        }
        self.events.publish(DashboardEvent::Loading(false));

        let (location, snapshot) = result.map_err(|e| self.report(e))?;
        let snapshot = Arc::new(snapshot);

        {
            let mut state = self.state.lock();
            // Re-checked under the lock so a newer response can't be
            // overwritten by this one.
            if !self.fetches.is_latest(ticket) {
                return Ok(Outcome::Superseded);
            }
            state.active = Some(location.unstamped());
            state.snapshot = Some(snapshot.clone());
        }

        tracing::info!("Weather applied for {}", location.name);

        if record_recent {
            self.with_lists(|lists| lists.record_recent_search(&location));
        }

        self.events.publish(DashboardEvent::SnapshotUpdated(snapshot.clone()));
        Ok(Outcome::Applied(snapshot))
    }

    /// Publish `err` as banner + toast (or a warning toast for precondition
    /// failures) and hand it back.
    fn report(&self, err: DashboardError) -> DashboardError {
        let message = err.user_message();

        if err.is_warning() {
            self.events.toast(Notice::warning(err.title(), message));
        } else {
            tracing::warn!("{}", err);
            self.state.lock().error = Some(message.to_string());
            self.events.publish(DashboardEvent::ErrorBanner(message.to_string()));
            self.events.toast(Notice::error(err.title(), message));
        }

        err
    }

    /// Mutate the lists, then publish their change events with no lock held.
    fn with_lists<R>(&self, mutate: impl FnOnce(&mut LocationLists) -> R) -> R {
        let mut lists = self.lists.lock();
        let result = mutate(&mut *lists);
        drop(lists);

        let pending = std::mem::take(&mut *self.pending_list_events.lock());
        for event in pending {
            self.events.publish(event);
        }
        result
    }

    fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            tracing::warn!("Failed to persist {}: {:#}", key, e);
        }
    }
}

fn weather_updated(name: &str) -> Notice {
    Notice::success(
        "Weather Updated",
        format!("Latest weather data for {} loaded successfully.", short_name(name)),
    )
}

/// City part of a composite display name.
fn short_name(name: &str) -> &str {
    name.split(',').next().unwrap_or(name).trim()
}
