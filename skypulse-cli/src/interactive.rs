//! Menu-driven dashboard session.
//!
//! Dashboard operations report their own failures through the event bus, so
//! this loop only renders: toasts stay up for their TTL and the error banner
//! stays until dismissed or replaced by the next successful request.

use anyhow::Result;
use inquire::{Select, Text};
use parking_lot::Mutex;
use skypulse_core::{
    Config, Dashboard, DashboardError, DashboardEvent, Location, Notice, Outcome, Selection,
    ShareTarget, TemperatureUnit, Theme,
};
use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};

use crate::{
    render::{self, Palette, View},
    share::{FileShare, StdoutShare},
};

/// Toasts currently on screen, each expiring `ttl` after it was raised.
#[derive(Debug)]
pub struct ToastBoard {
    ttl: Duration,
    entries: Vec<(Instant, Notice)>,
}

impl ToastBoard {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: Vec::new() }
    }

    pub fn push(&mut self, notice: Notice, raised_at: Instant) {
        self.entries.push((raised_at, notice));
    }

    /// Drop expired toasts and return the rest, oldest first.
    pub fn active(&mut self, now: Instant) -> Vec<Notice> {
        let ttl = self.ttl;
        self.entries
            .retain(|(raised_at, _)| now.saturating_duration_since(*raised_at) < ttl);
        self.entries.iter().map(|(_, notice)| notice.clone()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Search,
    CurrentLocation,
    Recent,
    Favorites,
    ToggleFavorite { active_is_favorite: bool },
    Refresh,
    SwitchUnit(TemperatureUnit),
    SwitchTheme(Theme),
    ChangeView,
    Share,
    DismissError,
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Search => f.write_str("Search for a city"),
            Action::CurrentLocation => f.write_str("Use my location"),
            Action::Recent => f.write_str("Recent searches"),
            Action::Favorites => f.write_str("Favorites"),
            Action::ToggleFavorite { active_is_favorite: true } => f.write_str("Remove from favorites"),
            Action::ToggleFavorite { active_is_favorite: false } => f.write_str("Add to favorites"),
            Action::Refresh => f.write_str("Refresh"),
            Action::SwitchUnit(unit) => write!(f, "Switch to {}", unit.toggled().symbol()),
            Action::SwitchTheme(Theme::Light) => f.write_str("Dark mode"),
            Action::SwitchTheme(Theme::Dark) => f.write_str("Light mode"),
            Action::ChangeView => f.write_str("Change view"),
            Action::Share => f.write_str("Share"),
            Action::DismissError => f.write_str("Dismiss error"),
            Action::Quit => f.write_str("Quit"),
        }
    }
}

fn menu(dashboard: &Dashboard) -> Vec<Action> {
    let mut actions = vec![Action::Search, Action::CurrentLocation, Action::Recent, Action::Favorites];

    if dashboard.active_location().is_some() {
        actions.push(Action::ToggleFavorite {
            active_is_favorite: dashboard.is_active_favorite(),
        });
        actions.push(Action::Refresh);
        actions.push(Action::ChangeView);
        actions.push(Action::Share);
    }

    actions.push(Action::SwitchUnit(dashboard.unit()));
    actions.push(Action::SwitchTheme(dashboard.theme()));

    if dashboard.error_message().is_some() {
        actions.push(Action::DismissError);
    }

    actions.push(Action::Quit);
    actions
}

/// A suggestion or saved entry offered in a picker.
enum Pick {
    Place(Location),
    Query(String),
}

impl fmt::Display for Pick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pick::Place(location) => f.write_str(&location.name),
            Pick::Query(query) => write!(f, "Search for \"{query}\""),
        }
    }
}

/// Failures were already published; keep them out of the loop's control flow.
fn reported<T>(result: Result<T, DashboardError>) {
    if let Err(e) = result {
        tracing::debug!("{}", e);
    }
}

pub async fn run(config: &Config) -> Result<()> {
    let dashboard = Dashboard::from_config(config)?;

    let board = Arc::new(Mutex::new(ToastBoard::new(config.ui.toast_ttl())));
    let sink = board.clone();
    dashboard.subscribe(Box::new(move |event| match event {
        DashboardEvent::Toast(notice) => sink.lock().push(notice.clone(), Instant::now()),
        DashboardEvent::Loading(true) => eprintln!("Loading..."),
        _ => {}
    }));

    let mut view = View::All;

    loop {
        draw(&dashboard, &board, view);

        let Some(action) = Select::new("What next?", menu(&dashboard)).prompt_skippable()? else {
            break;
        };

        match action {
            Action::Search => search(&dashboard).await?,
            Action::CurrentLocation => reported(dashboard.use_current_location().await),
            Action::Recent => {
                open_saved(&dashboard, "Recent searches", dashboard.recent_searches(), Selection::Recent).await?
            }
            Action::Favorites => {
                open_saved(&dashboard, "Favorites", dashboard.favorites(), Selection::Favorite).await?
            }
            Action::ToggleFavorite { .. } => reported(dashboard.toggle_favorite()),
            Action::Refresh => reported(dashboard.refresh().await),
            Action::SwitchUnit(_) => {
                dashboard.toggle_unit();
            }
            Action::SwitchTheme(_) => {
                dashboard.toggle_theme();
            }
            Action::ChangeView => {
                let views = vec![View::All, View::Current, View::Hourly, View::Daily];
                if let Some(picked) = Select::new("Show:", views).prompt_skippable()? {
                    view = picked;
                }
            }
            Action::Share => share(&dashboard)?,
            Action::DismissError => dashboard.dismiss_error(),
            Action::Quit => break,
        }
    }

    Ok(())
}

fn draw(dashboard: &Dashboard, board: &Mutex<ToastBoard>, view: View) {
    let palette = Palette::detect(dashboard.theme());
    println!();

    if let Some(message) = dashboard.error_message() {
        println!("{}", render::banner(&message, &palette));
    }

    for notice in board.lock().active(Instant::now()) {
        println!("{}", render::notice(&notice, &palette));
    }

    match dashboard.snapshot() {
        Some(snapshot) => {
            print!("{}", render::snapshot(&snapshot, dashboard.unit(), &palette, view));
            if dashboard.is_active_favorite() {
                println!("{}", palette.muted("(favorite)"));
            }
        }
        None => println!("{}", palette.muted("Search for a city to get started.")),
    }
}

async fn search(dashboard: &Dashboard) -> Result<()> {
    let Some(query) = Text::new("City:").prompt_skippable()? else {
        return Ok(());
    };

    let suggestions = match dashboard.suggest(&query).await {
        Outcome::Applied(locations) => locations,
        Outcome::Superseded => Vec::new(),
    };

    if suggestions.is_empty() {
        reported(dashboard.search_city(&query).await);
        return Ok(());
    }

    let mut picks: Vec<Pick> = suggestions.into_iter().map(Pick::Place).collect();
    picks.push(Pick::Query(query.trim().to_string()));

    match Select::new("Did you mean:", picks).prompt_skippable()? {
        Some(Pick::Place(location)) => reported(dashboard.show_location(location, Selection::Suggestion).await),
        Some(Pick::Query(query)) => reported(dashboard.search_city(&query).await),
        None => {}
    }

    Ok(())
}

async fn open_saved(
    dashboard: &Dashboard,
    title: &str,
    entries: Vec<Location>,
    selection: Selection,
) -> Result<()> {
    if entries.is_empty() {
        let palette = Palette::detect(dashboard.theme());
        print!("{}", render::location_list(title, &entries, &palette));
        return Ok(());
    }

    let picks: Vec<Pick> = entries.into_iter().map(Pick::Place).collect();
    if let Some(Pick::Place(location)) = Select::new(title, picks).prompt_skippable()? {
        reported(dashboard.show_location(location, selection).await);
    }

    Ok(())
}

fn share(dashboard: &Dashboard) -> Result<()> {
    let path = Text::new("Save to file (leave empty to print):").prompt_skippable()?;
    let file = path
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .map(|p| FileShare { path: p.into() });

    reported(dashboard.share(file.as_ref().map(|f| f as &dyn ShareTarget), &StdoutShare));
    Ok(())
}
