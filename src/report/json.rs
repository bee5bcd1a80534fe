//! JSON output for ranked sites.
//!
//! Screenshots are reported by size only, the image bytes stay in the store.

use serde::Serialize;

use crate::store::{Settings, SiteRecord};

#[derive(Serialize)]
struct SiteView<'a> {
    rank: Option<usize>,
    #[serde(flatten)]
    site: &'a SiteRecord,
    screenshot_bytes: usize,
}

#[derive(Serialize)]
struct Listing<'a> {
    settings: &'a Settings,
    sites: Vec<SiteView<'a>>,
}

pub fn render(sites: &[SiteRecord], settings: &Settings) -> String {
    let listing = Listing {
        settings,
        sites: sites
            .iter()
            .enumerate()
            .map(|(i, site)| SiteView {
                rank: (i < settings.max_entries as usize).then_some(i + 1),
                site,
                screenshot_bytes: site.screenshot.as_ref().map_or(0, Vec::len),
            })
            .collect(),
    };

    serde_json::to_string_pretty(&listing).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}
