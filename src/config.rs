use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cli::Cli;
use crate::error::{Result, TopSitesError};
use crate::host::DEFAULT_HISTORY_AGE_DAYS;
use crate::platform;

/// Presence of either variable turns the matching feature off.
pub const DISABLE_ENV: &str = "TOPSITES_DISABLE";
pub const DISABLE_SCREENSHOTS_ENV: &str = "TOPSITES_DISABLE_SCREENSHOTS";

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub db_path: PathBuf,
    /// directory holding the page templates and the two embedded images
    pub resource_dir: PathBuf,
    pub enabled: bool,
    pub screenshots_enabled: bool,
    /// how long an unvisited site is kept, e.g. "30d" or "2w"
    pub history_age: String,
    /// schemes never ranked, in addition to the built-in ones
    pub excluded_schemes: Vec<String>,
    pub bookmarks_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: platform::default_db_path(),
            resource_dir: platform::default_resource_dir(),
            enabled: true,
            screenshots_enabled: true,
            history_age: format!("{}d", DEFAULT_HISTORY_AGE_DAYS as u64),
            excluded_schemes: Vec::new(),
            bookmarks_file: None,
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path`, or the default config file if it exists. A missing
    /// default file means defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (Some(p.to_path_buf()), true),
            None => (platform::config_file(), false),
        };

        let Some(path) = path else {
            return Ok(Config::default());
        };

        match std::fs::read_to_string(&path) {
            Ok(text) => Config::from_toml(&text),
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(source) => Err(TopSitesError::FileRead { path, source }),
        }
    }

    /// Config for the command line tool: file, then environment, then flags.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = Config::load(cli.config.as_deref())?;
        config.apply_env(|key| std::env::var_os(key));

        if let Some(db) = &cli.db {
            config.db_path = db.clone();
        }
        if let Some(resources) = &cli.resources {
            config.resource_dir = resources.clone();
        }

        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<OsString>,
    {
        if lookup(DISABLE_ENV).is_some() {
            self.enabled = false;
        }
        if lookup(DISABLE_SCREENSHOTS_ENV).is_some() {
            self.screenshots_enabled = false;
        }
    }

    fn validate(&self) -> Result<()> {
        self.history_age_duration()?;
        Ok(())
    }

    fn history_age_duration(&self) -> Result<Duration> {
        humantime::parse_duration(&self.history_age)
            .map_err(|e| TopSitesError::Config(format!("history_age '{}': {e}", self.history_age)))
    }

    /// Retention window in days, as the preferences collaborator reports it.
    pub fn history_age_days(&self) -> f64 {
        match self.history_age_duration() {
            Ok(age) => age.as_secs_f64() / SECONDS_PER_DAY,
            Err(e) => {
                log::warn!("{e}, keeping {DEFAULT_HISTORY_AGE_DAYS} days");
                DEFAULT_HISTORY_AGE_DAYS
            }
        }
    }

    pub fn template_path(&self, file: &str) -> PathBuf {
        self.resource_dir.join(file)
    }
}
