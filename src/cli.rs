use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::command::NEW_TAB_URL;
use crate::store::{DisplayMode, FilterMode};

#[derive(Parser)]
#[command(name = "topsites")]
#[command(about = "Most visited sites with cached thumbnails and a generated new tab page")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file, overrides the config
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Directory with page templates and images, overrides the config
    #[arg(long, global = true)]
    pub resources: Option<PathBuf>,

    /// Log every decision the manager takes
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Record a navigation (or apply a topsites:// control url)
    Visit(VisitArgs),

    /// Generate the top sites page
    Render(RenderArgs),

    /// List recorded sites in ranking order
    List(ListArgs),

    /// Forget a site
    Remove(RemoveArgs),

    /// Drop stale thumbnails and expire old sites
    Prune,

    /// Show or change page settings
    Settings(SettingsArgs),
}

#[derive(Parser)]
pub struct VisitArgs {
    /// Url that was navigated to
    pub url: String,

    /// Page title
    #[arg(long, default_value = "")]
    pub title: String,

    /// Image file returned when the manager asks for a screenshot
    #[arg(long)]
    pub screenshot: Option<PathBuf>,

    /// Where a reloaded page is written (stdout if omitted)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct RenderArgs {
    /// Base url for the generated page
    #[arg(long, default_value = NEW_TAB_URL)]
    pub origin: String,

    /// Output file (stdout if omitted)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ListArgs {
    /// Output as JSON instead of table
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct RemoveArgs {
    pub url: String,
}

#[derive(Parser)]
pub struct SettingsArgs {
    /// Number of sites shown on the page
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_entries: Option<u32>,

    #[arg(long, value_enum)]
    pub display_mode: Option<DisplayModeArg>,

    #[arg(long, value_enum)]
    pub filter_mode: Option<FilterModeArg>,

    /// Capture width in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub screenshot_size: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DisplayModeArg {
    Grid,
    Coverflow,
}

impl From<DisplayModeArg> for DisplayMode {
    fn from(arg: DisplayModeArg) -> Self {
        match arg {
            DisplayModeArg::Grid => DisplayMode::Grid,
            DisplayModeArg::Coverflow => DisplayMode::CoverFlow,
        }
    }
}

/// Which sites the page may show
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterModeArg {
    All,
    Bookmarks,
    AllButBookmarks,
    Custom,
}

impl From<FilterModeArg> for FilterMode {
    fn from(arg: FilterModeArg) -> Self {
        match arg {
            FilterModeArg::All => FilterMode::ShowAll,
            FilterModeArg::Bookmarks => FilterMode::ShowBookmarks,
            FilterModeArg::AllButBookmarks => FilterMode::ShowAllButBookmarks,
            FilterModeArg::Custom => FilterMode::ShowCustom,
        }
    }
}

impl SettingsArgs {
    /// returns true if any setting is being changed
    pub fn has_changes(&self) -> bool {
        self.max_entries.is_some()
            || self.display_mode.is_some()
            || self.filter_mode.is_some()
            || self.screenshot_size.is_some()
    }
}
