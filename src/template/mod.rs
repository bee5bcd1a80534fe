//! New tab page generation.
//!
//! Templates are plain HTML files with `{{name}}` placeholders. Substitution
//! is a single left to right pass over the template, so a value that itself
//! contains `{{...}}` (a page title, say) is never expanded again and the
//! order in which values are registered does not matter.

pub mod markup;

use std::collections::{BTreeMap, BTreeSet};

use crate::store::{DisplayMode, Settings};

pub use markup::{data_url, escape_html, render_tile, Tile};

pub const GRID_TEMPLATE: &str = "TopSites_Grid.html";
pub const COVERFLOW_TEMPLATE: &str = "TopSites_CoverFlow.html";
pub const PLACEHOLDER_IMAGE: &str = "TopSites_Default.png";
pub const CLOSE_IMAGE: &str = "close.png";

pub const TOPSITES_TOKEN: &str = "topsites";
pub const MAX_ENTRIES_TOKEN: &str = "maxEntries";
pub const DISPLAY_MODE_TOKEN: &str = "displayMode";
pub const FILTER_MODE_TOKEN: &str = "filterMode";
pub const SCREENSHOT_SIZE_TOKEN: &str = "screenshotSize";

pub fn template_file(mode: DisplayMode) -> &'static str {
    match mode {
        DisplayMode::Grid => GRID_TEMPLATE,
        DisplayMode::CoverFlow => COVERFLOW_TEMPLATE,
    }
}

/// Output of a substitution pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub html: String,
    /// values that had no placeholder in the template
    pub unused: Vec<String>,
}

/// Replaces every `{{name}}` whose name has a value. Unknown placeholders
/// are left in the output untouched.
pub fn substitute(template: &str, values: &BTreeMap<&str, String>) -> Rendered {
    let mut html = String::with_capacity(template.len());
    let mut used = BTreeSet::new();
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        html.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];

        let Some(end) = after_open.find("}}") else {
            // unterminated, copy the remainder verbatim
            html.push_str(&rest[start..]);
            rest = "";
            break;
        };

        let name = &after_open[..end];
        match values.get_key_value(name) {
            Some((key, value)) => {
                html.push_str(value);
                used.insert(*key);
            }
            None => {
                html.push_str("{{");
                html.push_str(name);
                html.push_str("}}");
            }
        }

        rest = &after_open[end + 2..];
    }
    html.push_str(rest);

    let unused = values
        .keys()
        .filter(|k| !used.contains(*k))
        .map(|k| k.to_string())
        .collect();

    Rendered { html, unused }
}

/// The five values every top sites template receives.
pub fn page_values(settings: &Settings, tiles: String) -> BTreeMap<&'static str, String> {
    // an empty container collapses in some layouts
    let tiles = if tiles.is_empty() { " ".to_string() } else { tiles };

    BTreeMap::from([
        (TOPSITES_TOKEN, tiles),
        (MAX_ENTRIES_TOKEN, settings.max_entries.to_string()),
        (DISPLAY_MODE_TOKEN, settings.display_mode.as_i64().to_string()),
        (FILTER_MODE_TOKEN, settings.filter_mode.as_i64().to_string()),
        (SCREENSHOT_SIZE_TOKEN, settings.screenshot_size.to_string()),
    ])
}
