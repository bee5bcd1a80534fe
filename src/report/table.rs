//! Terminal table rendering for ranked sites.
//!
//! One line per site in ranking order, marking the ones that make the
//! rendered page (the first `max_entries`) and whether a thumbnail is cached.

use crate::store::{Settings, SiteRecord};
use crate::util::{format_bytes, format_timestamp};

pub fn render(sites: &[SiteRecord], settings: &Settings) -> String {
    if sites.is_empty() {
        return String::from("No sites recorded yet.\n");
    }

    let mut output = String::new();

    output.push_str(&format!(
        "{:<4} {:<40} {:>7} {:<20} {:>10}\n",
        "#", "Site", "Visits", "Last visit", "Thumbnail"
    ));
    output.push_str(&"-".repeat(85));
    output.push('\n');

    let mut thumbnail_total: u64 = 0;

    for (rank, site) in sites.iter().enumerate() {
        // sites past the display limit are listed but unranked
        let marker = if rank < settings.max_entries as usize {
            (rank + 1).to_string()
        } else {
            String::from("-")
        };

        let thumbnail = match &site.screenshot {
            Some(shot) if !shot.is_empty() => {
                thumbnail_total += shot.len() as u64;
                format_bytes(shot.len() as u64)
            }
            _ => String::from("none"),
        };

        let label = if site.title.is_empty() { &site.url } else { &site.title };

        output.push_str(&format!(
            "{:<4} {:<40} {:>7} {:<20} {:>10}\n",
            marker,
            truncate(label, 40),
            site.visit_count,
            format_timestamp(site.last_accessed),
            thumbnail
        ));
    }

    output.push_str(&format!(
        "\n{} sites, {} of thumbnails\n",
        sites.len(),
        format_bytes(thumbnail_total)
    ));

    output
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    }
}
