use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use inquire::{Confirm, CustomType, Text};
use skypulse_core::{
    Config, Coordinates, Dashboard, DashboardError, FavoriteToggle, FetchOutcome, Selection,
    ShareOutcome, ShareTarget, TemperatureUnit, Theme, provider::FixedPosition,
};
use std::{path::PathBuf, sync::Arc};

use crate::{
    interactive,
    render::{self, Palette, View},
    share::{FileShare, StdoutShare},
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skypulse", version, about = "SkyPulse weather dashboard")]
pub struct Cli {
    /// Defaults to the interactive dashboard.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SavedList {
    Recent,
    Favorites,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Edit API, geolocation and UI settings.
    Configure,

    /// Show weather for a city and remember it as a recent search.
    Show {
        /// City name, e.g. "Lisbon".
        city: String,

        #[arg(long, value_enum, default_value_t = View::All)]
        view: View,
    },

    /// Show weather for your current position.
    Here {
        /// Use this latitude instead of IP geolocation.
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Use this longitude instead of IP geolocation.
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        #[arg(long, value_enum, default_value_t = View::All)]
        view: View,
    },

    /// List places matching a partial name.
    Suggest { query: String },

    /// List recent searches, newest first.
    Recent,

    /// List favorite locations.
    Favorites,

    /// Show weather for an entry of a saved list.
    Open {
        #[arg(value_enum)]
        list: SavedList,

        /// 1-based position in the list.
        index: usize,

        #[arg(long, value_enum, default_value_t = View::All)]
        view: View,
    },

    /// Add a city to favorites, or remove it if already there.
    Favorite { city: String },

    /// Set the temperature unit: c or f.
    Unit {
        #[arg(value_parser = parse_unit)]
        unit: TemperatureUnit,
    },

    /// Set the colour theme, or toggle it when no theme is given.
    Theme {
        #[arg(value_parser = parse_theme)]
        theme: Option<Theme>,
    },

    /// Print (or save) a short summary of a city's current weather.
    Share {
        city: String,

        /// Write the summary to this file instead of printing it.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Run the interactive dashboard.
    Interactive,
}

fn parse_unit(value: &str) -> Result<TemperatureUnit, String> {
    TemperatureUnit::try_from(value).map_err(|e| e.to_string())
}

fn parse_theme(value: &str) -> Result<Theme, String> {
    Theme::try_from(value).map_err(|e| e.to_string())
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;

        let command = match self.command.unwrap_or(Command::Interactive) {
            Command::Configure => return configure(config),
            Command::Interactive => return interactive::run(&config).await,
            Command::Show { city, view } => OneShot::Show { city, view },
            Command::Here { lat, lon, view } => OneShot::Here { lat, lon, view },
            Command::Suggest { query } => OneShot::Suggest { query },
            Command::Recent => OneShot::List(SavedList::Recent),
            Command::Favorites => OneShot::List(SavedList::Favorites),
            Command::Open { list, index, view } => OneShot::Open { list, index, view },
            Command::Favorite { city } => OneShot::Favorite { city },
            Command::Unit { unit } => OneShot::Unit(unit),
            Command::Theme { theme } => OneShot::Theme(theme),
            Command::Share { city, out } => OneShot::Share { city, out },
        };

        let dashboard = Dashboard::from_config(&config)?;
        run_once(command, dashboard).await
    }
}

/// Commands that run a single dashboard operation and exit.
enum OneShot {
    Show { city: String, view: View },
    Here { lat: Option<f64>, lon: Option<f64>, view: View },
    Suggest { query: String },
    List(SavedList),
    Open { list: SavedList, index: usize, view: View },
    Favorite { city: String },
    Unit(TemperatureUnit),
    Theme(Option<Theme>),
    Share { city: String, out: Option<PathBuf> },
}

/// Dashboard errors carry a user-facing message; technical detail goes to the log.
fn user_error(err: DashboardError) -> anyhow::Error {
    tracing::debug!("{}", err);
    anyhow!(err.user_message())
}

fn print_outcome(dashboard: &Dashboard, outcome: FetchOutcome, view: View) {
    if let Some(snapshot) = outcome.applied() {
        let palette = Palette::detect(dashboard.theme());
        print!("{}", render::snapshot(&snapshot, dashboard.unit(), &palette, view));
    }
}

async fn run_once(command: OneShot, dashboard: Dashboard) -> Result<()> {
    let palette = Palette::detect(dashboard.theme());

    match command {
        OneShot::Show { city, view } => {
            let outcome = dashboard.search_city(&city).await.map_err(user_error)?;
            print_outcome(&dashboard, outcome, view);
        }

        OneShot::Here { lat, lon, view } => {
            let dashboard = match (lat, lon) {
                (Some(latitude), Some(longitude)) => {
                    dashboard.with_geolocator(Arc::new(FixedPosition(Coordinates { latitude, longitude })))
                }
                _ => dashboard,
            };
            let outcome = dashboard.use_current_location().await.map_err(user_error)?;
            print_outcome(&dashboard, outcome, view);
        }

        OneShot::Suggest { query } => {
            let places = dashboard.resolve_suggestions(&query).await.map_err(user_error)?;
            if places.is_empty() {
                println!("No matching places.");
            }
            for (i, place) in places.iter().enumerate() {
                let coords = format!("({:.2}, {:.2})", place.latitude, place.longitude);
                println!("{}. {}  {}", i + 1, place.name, palette.muted(&coords));
            }
        }

        OneShot::List(SavedList::Recent) => {
            print!("{}", render::location_list("Recent searches", &dashboard.recent_searches(), &palette));
        }

        OneShot::List(SavedList::Favorites) => {
            print!("{}", render::location_list("Favorites", &dashboard.favorites(), &palette));
        }

        OneShot::Open { list, index, view } => {
            let (entries, label, selection) = match list {
                SavedList::Recent => (dashboard.recent_searches(), "recent searches", Selection::Recent),
                SavedList::Favorites => (dashboard.favorites(), "favorites", Selection::Favorite),
            };
            let Some(location) = index.checked_sub(1).and_then(|i| entries.get(i)).cloned() else {
                bail!("There is no entry {index} in {label} ({} saved).", entries.len());
            };

            let outcome = dashboard.show_location(location, selection).await.map_err(user_error)?;
            print_outcome(&dashboard, outcome, view);
        }

        OneShot::Favorite { city } => {
            dashboard.search_city(&city).await.map_err(user_error)?;
            let name = dashboard.active_location().map(|l| l.name).unwrap_or(city);

            match dashboard.toggle_favorite().map_err(user_error)? {
                FavoriteToggle::Added => println!("Added {name} to favorites."),
                FavoriteToggle::Removed => println!("Removed {name} from favorites."),
            }
        }

        OneShot::Unit(unit) => {
            dashboard.set_unit(unit);
            println!("Temperature unit: {unit}");
        }

        OneShot::Theme(theme) => {
            let theme = match theme {
                Some(theme) => {
                    dashboard.set_theme(theme);
                    theme
                }
                None => dashboard.toggle_theme(),
            };
            println!("{}", Palette::detect(theme).heading(&format!("Theme: {theme}")));
        }

        OneShot::Share { city, out } => {
            dashboard.search_city(&city).await.map_err(user_error)?;

            let file = out.map(|path| FileShare { path });
            let primary = file.as_ref().map(|f| f as &dyn ShareTarget);

            match dashboard.share(primary, &StdoutShare).map_err(user_error)? {
                ShareOutcome::Shared => {
                    if let Some(file) = &file {
                        println!("Saved weather summary to {}", file.path.display());
                    }
                }
                ShareOutcome::FellBack => {}
                ShareOutcome::Failed => bail!("Could not share weather information."),
            }
        }
    }

    Ok(())
}

fn configure(mut config: Config) -> Result<()> {
    println!("Configuring SkyPulse. Press Enter to keep the current value.");

    let language = config.api.language.clone();
    config.api.language = Text::new("Language code for place names:")
        .with_default(&language)
        .prompt()?;

    config.api.suggestion_count = CustomType::new("Suggestions to show while typing:")
        .with_default(config.api.suggestion_count)
        .with_error_message("Please enter a whole number")
        .prompt()?;

    config.ui.suggestion_debounce_ms = CustomType::new("Suggestion delay in milliseconds:")
        .with_default(config.ui.suggestion_debounce_ms)
        .with_error_message("Please enter a whole number")
        .prompt()?;

    config.geolocation.enabled = Confirm::new("Allow approximate location lookup from your IP address?")
        .with_default(config.geolocation.enabled)
        .prompt()?;

    let current_storage = config.storage_file_path()?.display().to_string();
    let storage = Text::new("Storage file for preferences and saved locations:")
        .with_default(&current_storage)
        .prompt()?;
    if storage != current_storage {
        config.storage_path = Some(PathBuf::from(storage));
    }

    config.save()?;

    let path = Config::config_file_path().context("Failed to resolve config path")?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}
