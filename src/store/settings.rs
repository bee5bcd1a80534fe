use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use super::Store;
use crate::error::Result;

pub const DEFAULT_MAX_ENTRIES: u32 = 9;
pub const DEFAULT_SCREENSHOT_SIZE: u32 = 640;

/// Which page template the new tab view is rendered with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum DisplayMode {
    #[default]
    Grid,
    CoverFlow,
}

impl DisplayMode {
    pub fn as_i64(self) -> i64 {
        match self {
            DisplayMode::Grid => 0,
            DisplayMode::CoverFlow => 1,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(DisplayMode::Grid),
            1 => Some(DisplayMode::CoverFlow),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DisplayMode::Grid => "grid",
            DisplayMode::CoverFlow => "coverflow",
        }
    }
}

/// Which ranked sites are eligible for the rendered page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FilterMode {
    #[default]
    ShowAll,
    ShowBookmarks,
    ShowAllButBookmarks,
    ShowCustom,
}

impl FilterMode {
    pub fn as_i64(self) -> i64 {
        match self {
            FilterMode::ShowAll => 0,
            FilterMode::ShowBookmarks => 1,
            FilterMode::ShowAllButBookmarks => 2,
            FilterMode::ShowCustom => 3,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(FilterMode::ShowAll),
            1 => Some(FilterMode::ShowBookmarks),
            2 => Some(FilterMode::ShowAllButBookmarks),
            3 => Some(FilterMode::ShowCustom),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FilterMode::ShowAll => "all",
            FilterMode::ShowBookmarks => "bookmarks",
            FilterMode::ShowAllButBookmarks => "all-but-bookmarks",
            FilterMode::ShowCustom => "custom",
        }
    }
}

/// The single row of the settings table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub display_mode: DisplayMode,
    pub max_entries: u32,
    pub screenshot_size: u32,
    pub filter_mode: FilterMode,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            display_mode: DisplayMode::Grid,
            max_entries: DEFAULT_MAX_ENTRIES,
            screenshot_size: DEFAULT_SCREENSHOT_SIZE,
            filter_mode: FilterMode::ShowAll,
        }
    }
}

pub(super) fn seed_defaults(conn: &Connection) -> rusqlite::Result<()> {
    let rows: i64 = conn.query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))?;
    if rows > 0 {
        return Ok(());
    }

    let defaults = Settings::default();
    conn.execute(
        "INSERT INTO settings (displayMode, maxEntries, screenshotSize, filterMode) VALUES (?1, ?2, ?3, ?4)",
        params![
            defaults.display_mode.as_i64(),
            defaults.max_entries,
            defaults.screenshot_size,
            defaults.filter_mode.as_i64()
        ],
    )?;
    Ok(())
}

// values out of range (hand edited or from a newer build) fall back to defaults
fn positive(value: Option<i64>, fallback: u32) -> u32 {
    value
        .and_then(|v| u32::try_from(v).ok())
        .filter(|v| *v > 0)
        .unwrap_or(fallback)
}

impl Store {
    pub fn load_settings(&self) -> Result<Settings> {
        let row = self
            .conn
            .query_row(
                "SELECT displayMode, maxEntries, screenshotSize, filterMode FROM settings LIMIT 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, Option<i64>>(0)?,
                        row.get::<_, Option<i64>>(1)?,
                        row.get::<_, Option<i64>>(2)?,
                        row.get::<_, Option<i64>>(3)?,
                    ))
                },
            )
            .optional()?;

        let defaults = Settings::default();
        let Some((display, max, size, filter)) = row else {
            return Ok(defaults);
        };

        Ok(Settings {
            display_mode: display.and_then(DisplayMode::from_i64).unwrap_or_default(),
            max_entries: positive(max, defaults.max_entries),
            screenshot_size: positive(size, defaults.screenshot_size),
            filter_mode: filter.and_then(FilterMode::from_i64).unwrap_or_default(),
        })
    }

    pub fn save_display_mode(&self, mode: DisplayMode) -> Result<usize> {
        self.execute("UPDATE settings SET displayMode = ?1", params![mode.as_i64()])
    }

    pub fn save_max_entries(&self, max_entries: u32) -> Result<usize> {
        self.execute("UPDATE settings SET maxEntries = ?1", params![max_entries])
    }

    pub fn save_screenshot_size(&self, width: u32) -> Result<usize> {
        self.execute("UPDATE settings SET screenshotSize = ?1", params![width])
    }

    pub fn save_filter_mode(&self, mode: FilterMode) -> Result<usize> {
        self.execute("UPDATE settings SET filterMode = ?1", params![mode.as_i64()])
    }
}
