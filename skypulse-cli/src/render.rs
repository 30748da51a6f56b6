//! Plain-text rendering of weather snapshots and location lists.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use skypulse_core::{
    AirQuality, Location, Temperature, TemperatureUnit, Theme, WeatherSnapshot, catalog::icon_url,
    events::{Notice, NoticeLevel},
    round_for_display,
};
use std::fmt::Write as _;

/// Number of hourly slots shown in the hourly view.
pub const HOURLY_SLOTS: usize = 24;

/// Which part of the dashboard to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum View {
    #[default]
    All,
    Current,
    Hourly,
    Daily,
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            View::All => "Everything",
            View::Current => "Current conditions",
            View::Hourly => "Hourly forecast",
            View::Daily => "7-day forecast",
        })
    }
}

/// ANSI colours for the active theme. `plain()` disables colour entirely.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    heading: &'static str,
    accent: &'static str,
    muted: &'static str,
    error: &'static str,
    enabled: bool,
}

const RESET: &str = "\x1b[0m";

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                heading: "\x1b[1;34m",
                accent: "\x1b[36m",
                muted: "\x1b[90m",
                error: "\x1b[1;31m",
                enabled: true,
            },
            Theme::Dark => Self {
                heading: "\x1b[1;95m",
                accent: "\x1b[93m",
                muted: "\x1b[37m",
                error: "\x1b[1;91m",
                enabled: true,
            },
        }
    }

    pub fn plain() -> Self {
        Self {
            heading: "",
            accent: "",
            muted: "",
            error: "",
            enabled: false,
        }
    }

    /// Theme palette on a terminal, plain otherwise or when `NO_COLOR` is set.
    pub fn detect(theme: Theme) -> Self {
        use std::io::IsTerminal;

        if std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none() {
            Self::for_theme(theme)
        } else {
            Self::plain()
        }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.enabled {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    pub fn heading(&self, text: &str) -> String {
        self.paint(self.heading, text)
    }

    pub fn accent(&self, text: &str) -> String {
        self.paint(self.accent, text)
    }

    pub fn muted(&self, text: &str) -> String {
        self.paint(self.muted, text)
    }

    pub fn error(&self, text: &str) -> String {
        self.paint(self.error, text)
    }

    /// `text` in a `#rrggbb` colour, when colour is enabled.
    fn hex(&self, hex: &str, text: &str) -> String {
        match (self.enabled, parse_hex(hex)) {
            (true, Some((r, g, b))) => format!("\x1b[38;2;{r};{g};{b}m{text}{RESET}"),
            _ => text.to_string(),
        }
    }
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

pub fn temperature(value: Option<Temperature>, unit: TemperatureUnit) -> String {
    match value {
        Some(t) => t.display(unit),
        None => "N/A".to_string(),
    }
}

fn number(value: Option<f64>, suffix: &str) -> String {
    match value {
        Some(v) => format!("{}{}", round_for_display(v), suffix),
        None => "N/A".to_string(),
    }
}

pub fn visibility(metres: Option<f64>) -> String {
    match metres {
        Some(m) => format!("{:.1} km", m / 1000.0),
        None => "N/A".to_string(),
    }
}

fn uv(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.1}"),
        None => "N/A".to_string(),
    }
}

/// "3 PM" from a local ISO timestamp such as "2026-10-18T15:00".
pub fn hour_label(time: &str) -> String {
    NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M")
        .map(|t| t.format("%-I %p").to_string())
        .unwrap_or_else(|_| time.to_string())
}

/// "7:31 AM" from a local ISO timestamp.
pub fn clock_label(time: Option<&str>) -> String {
    match time {
        Some(time) => NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M")
            .map(|t| t.format("%-I:%M %p").to_string())
            .unwrap_or_else(|_| time.to_string()),
        None => "N/A".to_string(),
    }
}

/// "Today" for the first day, then short weekday names.
pub fn day_label(index: usize, date: &str) -> String {
    if index == 0 {
        return "Today".to_string();
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%a").to_string())
        .unwrap_or_else(|_| date.to_string())
}

fn air_quality(aq: AirQuality, palette: &Palette) -> String {
    match aq.band() {
        Some(band) => format!("{} ({})", aq.value_text(), palette.hex(band.color, band.label)),
        None => format!("{} ({})", aq.value_text(), aq.summary()),
    }
}

pub fn current(snapshot: &WeatherSnapshot, unit: TemperatureUnit, palette: &Palette) -> String {
    let c = &snapshot.current;
    let weather = c.weather();
    let mut out = String::new();

    let _ = writeln!(out, "{}", palette.heading(&snapshot.location.name));
    let _ = writeln!(
        out,
        "  {}  {}",
        palette.accent(&temperature(c.temperature, unit)),
        weather.description
    );
    let _ = writeln!(out, "  Icon         {}", palette.muted(&icon_url(weather.icon)));
    let _ = writeln!(out, "  Feels like   {}", temperature(c.feels_like, unit));
    let _ = writeln!(out, "  Humidity     {}", number(c.humidity_pct, "%"));
    let _ = writeln!(out, "  Wind         {}", number(c.wind_speed_kmh, " km/h"));
    let _ = writeln!(out, "  UV index     {}", uv(c.uv_index));
    let _ = writeln!(out, "  Visibility   {}", visibility(c.visibility_m));
    let _ = writeln!(out, "  Air quality  {}", air_quality(snapshot.air_quality, palette));
    let _ = writeln!(
        out,
        "  {}",
        palette.muted(&format!(
            "Updated {}",
            snapshot.fetched_at.with_timezone(&Local).format("%-I:%M %p")
        ))
    );
    out
}

pub fn hourly(snapshot: &WeatherSnapshot, unit: TemperatureUnit, palette: &Palette) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", palette.heading("Hourly"));

    let hours = snapshot.upcoming_hours(HOURLY_SLOTS);
    if hours.is_empty() {
        let _ = writeln!(out, "  {}", palette.muted("No hourly data"));
    }
    for entry in hours {
        let _ = writeln!(
            out,
            "  {:>5}  {:>6}  {}",
            hour_label(&entry.time),
            temperature(entry.temperature, unit),
            entry.weather().description
        );
    }
    out
}

pub fn daily(snapshot: &WeatherSnapshot, unit: TemperatureUnit, palette: &Palette) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", palette.heading("Daily"));

    if snapshot.daily.is_empty() {
        let _ = writeln!(out, "  {}", palette.muted("No daily data"));
    }
    for (i, day) in snapshot.daily.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:<5}  {:>6} / {:<6}  {:<28} UV {:<4}  {} - {}",
            day_label(i, &day.date),
            temperature(day.max, unit),
            temperature(day.min, unit),
            day.weather().description,
            uv(day.uv_index_max),
            clock_label(day.sunrise.as_deref()),
            clock_label(day.sunset.as_deref()),
        );
    }
    out
}

pub fn snapshot(snapshot: &WeatherSnapshot, unit: TemperatureUnit, palette: &Palette, view: View) -> String {
    match view {
        View::Current => current(snapshot, unit, palette),
        View::Hourly => hourly(snapshot, unit, palette),
        View::Daily => daily(snapshot, unit, palette),
        View::All => [
            current(snapshot, unit, palette),
            hourly(snapshot, unit, palette),
            daily(snapshot, unit, palette),
        ]
        .join("\n"),
    }
}

pub fn location_list(title: &str, locations: &[Location], palette: &Palette) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", palette.heading(title));

    if locations.is_empty() {
        let _ = writeln!(out, "  {}", palette.muted("(none)"));
    }
    for (i, location) in locations.iter().enumerate() {
        let when = location
            .timestamp
            .and_then(DateTime::from_timestamp_millis)
            .map(|t| {
                let local = t.with_timezone(&Local).format("%b %-d, %-I:%M %p").to_string();
                format!("  {}", palette.muted(&local))
            })
            .unwrap_or_default();
        let _ = writeln!(out, "  {}. {}{}", i + 1, location.name, when);
    }
    out
}

pub fn notice(notice: &Notice, palette: &Palette) -> String {
    let tag = match notice.level {
        NoticeLevel::Success => palette.accent("[ok]"),
        NoticeLevel::Info => palette.muted("[info]"),
        NoticeLevel::Warning => palette.heading("[warn]"),
        NoticeLevel::Error => palette.error("[error]"),
    };
    format!("{tag} {}: {}", notice.title, notice.message)
}

pub fn banner(message: &str, palette: &Palette) -> String {
    palette.error(&format!("! {message}"))
}
