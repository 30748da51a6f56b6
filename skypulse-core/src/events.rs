//! Change notifications for whatever renders the dashboard.
//!
//! Listeners run synchronously on the thread that caused the change, after the
//! dashboard has released its locks. They may read dashboard state but must
//! not subscribe further listeners from inside a callback.

use parking_lot::RwLock;
use std::{sync::Arc, time::Duration};

use crate::{
    model::{Location, TemperatureUnit, Theme},
    snapshot::WeatherSnapshot,
};

/// How long a toast stays on screen.
pub const TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A transient toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, title, message)
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, title, message)
    }
}

#[derive(Debug, Clone)]
pub enum DashboardEvent {
    Loading(bool),
    SnapshotUpdated(Arc<WeatherSnapshot>),
    RecentSearchesChanged(Vec<Location>),
    FavoritesChanged(Vec<Location>),
    UnitChanged(TemperatureUnit),
    ThemeChanged(Theme),
    Toast(Notice),
    /// Persistent, dismissible error message.
    ErrorBanner(String),
    ErrorCleared,
}

pub type EventListener = Box<dyn Fn(&DashboardEvent) + Send + Sync>;

#[derive(Default)]
pub struct EventBus {
    listeners: RwLock<Vec<EventListener>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.read().len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: EventListener) {
        self.listeners.write().push(listener);
    }

    pub fn publish(&self, event: DashboardEvent) {
        for listener in self.listeners.read().iter() {
            listener(&event);
        }
    }

    pub fn toast(&self, notice: Notice) {
        self.publish(DashboardEvent::Toast(notice));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn every_listener_receives_published_events() {
        let bus = EventBus::new();
        let count = Arc::new(Mutex::new(0));

        for _ in 0..2 {
            let count = count.clone();
            bus.subscribe(Box::new(move |event| {
                if matches!(event, DashboardEvent::Toast(_)) {
                    *count.lock() += 1;
                }
            }));
        }

        bus.toast(Notice::info("Refreshing", "Updating weather data..."));
        bus.publish(DashboardEvent::ErrorCleared);

        assert_eq!(*count.lock(), 2);
    }
}
