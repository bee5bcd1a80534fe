pub mod json;
pub mod table;

use crate::store::{Settings, SiteRecord};

pub fn print(sites: &[SiteRecord], settings: &Settings, json_output: bool) {
    if json_output {
        println!("{}", json::render(sites, settings));
    } else {
        print!("{}", table::render(sites, settings));
    }
}

pub fn print_settings(settings: &Settings) {
    println!("display mode:    {}", settings.display_mode.as_str());
    println!("max entries:     {}", settings.max_entries);
    println!("filter mode:     {}", settings.filter_mode.as_str());
    println!("screenshot size: {}px", settings.screenshot_size);
}
