//! Visit ranking, thumbnail policy and new tab page generation.
//!
//! The manager is fed every finished navigation through [`TopSitesManager::update`].
//! It counts visits per url, decides when a page has earned a (new) thumbnail,
//! evicts stale data on startup and renders the top sites page on request.
//!
//! Top sites is a convenience feature. Nothing here returns an error to the
//! host: a database that cannot be opened, a failing statement or a missing
//! template turns the affected operation into a logged no-op.

use std::path::PathBuf;

use crate::command::{self, ControlCommand, NEW_TAB_URL};
use crate::config::Config;
use crate::error::Result;
use crate::host::{Collaborators, RenderTarget};
use crate::store::{DisplayMode, FilterMode, Settings, SiteRecord, Store};
use crate::template::{self, Tile};

/// Minimum gap, in seconds, between two visits before an existing thumbnail is retaken.
pub const SCREENSHOT_UPDATE_DELAY: f64 = 60.0 * 60.0;

const SECONDS_PER_DAY: f64 = 24.0 * 60.0 * 60.0;

/// Pages of the browser's own web inspector end in this path.
const INSPECTOR_PATH: &str = "webinspector/inspector.html";

pub struct TopSitesManager {
    store: Option<Store>,
    settings: Settings,
    enabled: bool,
    screenshots_enabled: bool,
    excluded_schemes: Vec<String>,
    resource_dir: PathBuf,
    placeholder_image: Option<String>,
    remove_icon: String,
    host: Collaborators,
}

impl TopSitesManager {
    /// Opens the database named by `config`. When it cannot be opened the
    /// manager still works, every operation simply does nothing.
    pub fn open(config: &Config, host: Collaborators) -> Self {
        let store = match Store::open(&config.db_path) {
            Ok(store) => Some(store),
            Err(e) => {
                log::warn!("top sites disabled for this session: {e}");
                None
            }
        };

        Self::with_store(store, config, host)
    }

    /// Builds a manager around an already opened store, then prunes it.
    pub fn with_store(store: Option<Store>, config: &Config, host: Collaborators) -> Self {
        let settings = match store.as_ref().map(Store::load_settings) {
            Some(Ok(settings)) => settings,
            Some(Err(e)) => {
                log::warn!("cannot load top sites settings, using defaults: {e}");
                Settings::default()
            }
            None => Settings::default(),
        };

        let load_image = |name: &str| {
            let path = config.template_path(name);
            match host.files.read(&path) {
                Ok(bytes) if !bytes.is_empty() => Some(template::data_url(&bytes)),
                Ok(_) => None,
                Err(e) => {
                    log::debug!("no image at {}: {e}", path.display());
                    None
                }
            }
        };
        let placeholder_image = load_image(template::PLACEHOLDER_IMAGE);
        let remove_icon = load_image(template::CLOSE_IMAGE).unwrap_or_else(|| template::data_url(&[]));

        let excluded_schemes = config
            .excluded_schemes
            .iter()
            .map(|s| s.trim_end_matches(':').to_ascii_lowercase())
            .collect();

        let manager = TopSitesManager {
            store,
            settings,
            enabled: config.enabled,
            screenshots_enabled: config.screenshots_enabled,
            excluded_schemes,
            resource_dir: config.resource_dir.clone(),
            placeholder_image,
            remove_icon,
            host,
        };

        if manager.is_open() {
            manager.prune_older_entries();
        }

        manager
    }

    pub fn is_open(&self) -> bool {
        self.store.is_some()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Releases the database. Later calls, and every other operation
    /// afterwards, are no-ops.
    pub fn close(&mut self) {
        if let Some(store) = self.store.take() {
            if let Err(e) = store.close() {
                log::warn!("closing top sites database: {e}");
            }
        }
    }

    fn store_op<T>(&self, what: &str, f: impl FnOnce(&Store) -> Result<T>) -> Option<T> {
        let store = self.store.as_ref()?;
        match f(store) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("top sites {what} failed: {e}");
                None
            }
        }
    }

    /// Entry point for every finished navigation.
    ///
    /// Control urls (`topsites://?key=value`) apply their command and reload
    /// the page into `target`. Any other url counts as a visit if it
    /// qualifies.
    pub fn update(&mut self, target: &mut dyn RenderTarget, url: &str, title: &str) {
        if !self.enabled {
            return;
        }

        match ControlCommand::from_url(url) {
            Ok(None) => {}
            Ok(Some(cmd)) => {
                self.apply_command(cmd);
                self.generate_template(target, NEW_TAB_URL);
                return;
            }
            Err(e) => {
                log::warn!("ignoring {url}: {e}");
                self.generate_template(target, NEW_TAB_URL);
                return;
            }
        }

        if self.should_add(url) {
            self.add_or_update(target, url, title);
        }
    }

    pub fn apply_command(&mut self, cmd: ControlCommand) {
        log::debug!("applying {cmd:?}");
        match cmd {
            ControlCommand::Remove(url) => {
                self.remove(&url);
            }
            ControlCommand::SetMaxEntries(n) => self.set_max_entries(n),
            ControlCommand::SetDisplayMode(mode) => self.set_display_mode(mode),
            ControlCommand::SetFilterMode(mode) => self.set_filter_mode(mode),
            ControlCommand::SetScreenshotSize(width) => self.set_screenshot_size(width),
        }
    }

    /// Whether a navigation to `url` counts as a visit. Control urls, the
    /// web inspector, `data:` urls and configured schemes never do.
    pub fn should_add(&self, url: &str) -> bool {
        if command::is_control_url(url) || url.ends_with(INSPECTOR_PATH) {
            return false;
        }

        let scheme = match url::Url::parse(url) {
            Ok(parsed) => parsed.scheme().to_string(),
            Err(_) => return true,
        };

        scheme != "data" && !self.excluded_schemes.contains(&scheme)
    }

    /// Counts a visit to `url` and retakes its thumbnail when due. Returns
    /// false when any store write or the capture failed.
    pub fn add_or_update(&self, target: &mut dyn RenderTarget, url: &str, title: &str) -> bool {
        let Some(store) = self.store.as_ref() else {
            return false;
        };

        let now = self.host.clock.now();

        let existing = match store.find_site(url) {
            Ok(site) => site,
            Err(e) => {
                log::warn!("looking up {url}: {e}");
                return false;
            }
        };

        let (visit_count, has_screenshot, last_accessed) = match &existing {
            Some(site) => (site.visit_count + 1, site.has_screenshot(), site.last_accessed),
            None => (1, false, 0.0),
        };

        let generate_screenshot = self.screenshots_enabled
            && visit_count >= self.required_visit_count()
            && (!has_screenshot || now >= last_accessed + SCREENSHOT_UPDATE_DELAY);

        let saved = if existing.is_some() {
            store.update_visit(url, title, visit_count, now).map(|_| ())
        } else {
            store.insert_site(url, title, visit_count, now)
        };
        if let Err(e) = saved {
            log::warn!("recording visit to {url}: {e}");
            return false;
        }

        if !generate_screenshot {
            return true;
        }

        let width = self.settings.screenshot_size;
        log::debug!("capturing {url} at {width}px (visit {visit_count})");

        let Some(capture) = target.screenshot(width) else {
            log::warn!("render target produced no screenshot for {url}");
            return false;
        };

        match store.set_screenshot(url, Some(&capture.image)) {
            Ok(_) => true,
            Err(e) => {
                log::warn!("storing screenshot for {url}: {e}");
                false
            }
        }
    }

    /// Visit count a site needs to earn a thumbnail: 1 while fewer than
    /// `max_entries` sites are known, otherwise the lowest count among the
    /// `max_entries` most visited.
    pub fn required_visit_count(&self) -> i64 {
        let max = self.settings.max_entries;
        self.store_op("ranking", |store| {
            let entries = store.count_sites()?;
            if entries < i64::from(max) {
                return Ok(1);
            }
            Ok(store.min_visit_count_in_top(max)?.unwrap_or(0))
        })
        .unwrap_or(0)
    }

    /// Whether `url` is visited at least as often as the lowest ranked of
    /// the top `max_entries` sites.
    pub fn should_appear(&self, url: &str) -> bool {
        let max = self.settings.max_entries;
        self.store_op("ranking", |store| {
            let min = store.min_visit_count_in_top(max)?.unwrap_or(0);
            let visits = store.find_site(url)?.map_or(0, |site| site.visit_count);
            Ok(visits >= min)
        })
        .unwrap_or(false)
    }

    /// Drops thumbnails of sites that fell out of the top ranks, then
    /// deletes sites not visited within the history age limit.
    pub fn prune_older_entries(&self) {
        let below_cutoff = self.required_visit_count() - 1;
        if let Some(cleared) = self.store_op("screenshot pruning", |store| {
            store.clear_screenshots_up_to(below_cutoff)
        }) {
            log::debug!("dropped {cleared} thumbnails of sites visited {below_cutoff} times or fewer");
        }

        let max_age_days = self.host.preferences.history_age_in_days_limit();
        if !max_age_days.is_finite() || max_age_days <= 0.0 {
            log::debug!("history age limit {max_age_days} disables expiry");
            return;
        }

        let cutoff = self.host.clock.now() - max_age_days * SECONDS_PER_DAY;
        if let Some(deleted) = self.store_op("expiry", |store| store.delete_accessed_before(cutoff)) {
            log::debug!("expired {deleted} sites older than {max_age_days} days");
        }
    }

    /// Forgets `url`. Returns true if a row was deleted.
    pub fn remove(&self, url: &str) -> bool {
        self.store_op("remove", |store| store.delete_site(url))
            .is_some_and(|n| n > 0)
    }

    fn accepts(&self, url: &str) -> bool {
        match self.settings.filter_mode {
            FilterMode::ShowAll | FilterMode::ShowCustom => true,
            FilterMode::ShowBookmarks => self.host.bookmarks.contains_url(url),
            FilterMode::ShowAllButBookmarks => !self.host.bookmarks.contains_url(url),
        }
    }

    /// Renders the top sites page and loads it into `target` with
    /// `origin_url` as base. Nothing is loaded if the page can't be built.
    pub fn generate_template(&self, target: &mut dyn RenderTarget, origin_url: &str) {
        if !self.enabled {
            return;
        }

        if let Some(html) = self.render_page() {
            target.load_html_string(&html, origin_url);
        }
    }

    /// Builds the page for the current settings without loading it anywhere.
    pub fn render_page(&self) -> Option<String> {
        let store = self.store.as_ref()?;
        let mode = self.settings.display_mode;
        let path = self.resource_dir.join(template::template_file(mode));

        let page = match self.host.files.read_to_string(&path) {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => {
                log::warn!("top sites template {} is empty", path.display());
                return None;
            }
            Err(e) => {
                log::warn!("cannot read top sites template {}: {e}", path.display());
                return None;
            }
        };

        let max = self.settings.max_entries;
        let mut accepted = 0;
        let mut tiles = String::new();

        let walked = store.for_each_ranked(|site| {
            if accepted >= max {
                return Ok(false);
            }
            if !self.accepts(&site.url) {
                return Ok(true);
            }

            let image = match (&site.screenshot, &self.placeholder_image) {
                (Some(shot), _) if !shot.is_empty() => template::data_url(shot),
                (_, Some(placeholder)) => placeholder.clone(),
                (_, None) => template::data_url(&[]),
            };

            let tile = Tile {
                url: &site.url,
                title: &site.title,
                visits: site.visit_count,
                image: &image,
                remove_icon: &self.remove_icon,
            };
            template::render_tile(mode, &tile, &mut tiles);

            accepted += 1;
            Ok(accepted < max)
        });

        if let Err(e) = walked {
            log::warn!("reading ranked sites: {e}");
            return None;
        }

        let rendered = template::substitute(&page, &template::page_values(&self.settings, tiles));
        if !rendered.unused.is_empty() {
            log::debug!("{} has no placeholder for {:?}", path.display(), rendered.unused);
        }

        Some(rendered.html)
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.settings.display_mode
    }

    pub fn max_entries(&self) -> u32 {
        self.settings.max_entries
    }

    pub fn filter_mode(&self) -> FilterMode {
        self.settings.filter_mode
    }

    pub fn screenshot_size(&self) -> u32 {
        self.settings.screenshot_size
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.settings.display_mode = mode;
        self.store_op("saving displayMode", |store| store.save_display_mode(mode));
    }

    pub fn set_filter_mode(&mut self, mode: FilterMode) {
        self.settings.filter_mode = mode;
        self.store_op("saving filterMode", |store| store.save_filter_mode(mode));
    }

    pub fn set_max_entries(&mut self, max_entries: u32) {
        if max_entries == 0 {
            log::warn!("ignoring maxEntries of 0");
            return;
        }
        self.settings.max_entries = max_entries;
        self.store_op("saving maxEntries", |store| store.save_max_entries(max_entries));
    }

    pub fn set_screenshot_size(&mut self, width: u32) {
        if width == 0 {
            log::warn!("ignoring screenshotSize of 0");
            return;
        }
        self.settings.screenshot_size = width;
        self.store_op("saving screenshotSize", |store| store.save_screenshot_size(width));
    }

    /// Number of known sites, 0 when the store is unavailable.
    pub fn entries(&self) -> i64 {
        self.store_op("count", Store::count_sites).unwrap_or(0)
    }

    fn site(&self, url: &str) -> Option<SiteRecord> {
        self.store_op("lookup", |store| store.find_site(url)).flatten()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.site(url).is_some()
    }

    pub fn title(&self, url: &str) -> Option<String> {
        self.site(url).map(|site| site.title)
    }

    pub fn screenshot(&self, url: &str) -> Option<Vec<u8>> {
        self.site(url).and_then(|site| site.screenshot).filter(|s| !s.is_empty())
    }

    pub fn has_screenshot(&self, url: &str) -> bool {
        self.site(url).is_some_and(|site| site.has_screenshot())
    }

    /// Seconds since the epoch of the last visit, 0 for unknown sites.
    pub fn last_accessed(&self, url: &str) -> f64 {
        self.site(url).map_or(0.0, |site| site.last_accessed)
    }

    pub fn visit_count(&self, url: &str) -> i64 {
        self.site(url).map_or(0, |site| site.visit_count)
    }

    /// Every known site in ranking order.
    pub fn ranked_sites(&self) -> Vec<SiteRecord> {
        self.store_op("listing", Store::ranked_sites).unwrap_or_default()
    }
}

impl Drop for TopSitesManager {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{BookmarkList, Capture, FileSource, FixedHistoryAge, ManualClock};
    use std::collections::HashMap;
    use std::io;
    use std::path::Path;

    const GRID: &str = "<ul>{{topsites}}</ul>|{{maxEntries}}|{{displayMode}}|{{filterMode}}|{{screenshotSize}}";
    const NOW: f64 = 1_700_000_000.0;

    #[derive(Default)]
    struct Target {
        captures: Vec<u32>,
        loaded: Vec<(String, String)>,
        fail_capture: bool,
    }

    impl RenderTarget for Target {
        fn screenshot(&mut self, width: u32) -> Option<Capture> {
            self.captures.push(width);
            (!self.fail_capture).then(|| Capture { width, height: width / 2, image: b"shot".to_vec() })
        }

        fn load_html_string(&mut self, html: &str, base_url: &str) {
            self.loaded.push((html.to_string(), base_url.to_string()));
        }
    }

    struct MemoryFiles(HashMap<PathBuf, Vec<u8>>);

    impl FileSource for MemoryFiles {
        fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
            self.0.get(path).cloned().ok_or_else(|| io::ErrorKind::NotFound.into())
        }

        fn read_to_string(&self, path: &Path) -> io::Result<String> {
            let bytes = self.read(path)?;
            String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
        }
    }

    fn config() -> Config {
        Config {
            resource_dir: PathBuf::from("/res"),
            ..Config::default()
        }
    }

    fn files() -> MemoryFiles {
        MemoryFiles(HashMap::from([
            (PathBuf::from("/res/TopSites_Grid.html"), GRID.as_bytes().to_vec()),
            (PathBuf::from("/res/TopSites_CoverFlow.html"), b"<div>{{topsites}}</div>".to_vec()),
            (PathBuf::from("/res/TopSites_Default.png"), b"placeholder".to_vec()),
        ]))
    }

    fn manager_with(store: Store, clock: &ManualClock, bookmarks: &[&str]) -> TopSitesManager {
        let host = Collaborators {
            files: Box::new(files()),
            bookmarks: Box::new(bookmarks.iter().copied().collect::<BookmarkList>()),
            preferences: Box::new(FixedHistoryAge(30.0)),
            clock: Box::new(clock.clone()),
        };
        TopSitesManager::with_store(Some(store), &config(), host)
    }

    fn manager(clock: &ManualClock) -> TopSitesManager {
        manager_with(Store::open_in_memory().unwrap(), clock, &[])
    }

    fn visit(m: &mut TopSitesManager, target: &mut Target, url: &str, times: usize) {
        for _ in 0..times {
            m.update(target, url, "title");
        }
    }

    #[test]
    fn first_visit_inserts_and_captures() {
        let clock = ManualClock::at(NOW);
        let mut m = manager(&clock);
        let mut target = Target::default();

        assert!(m.add_or_update(&mut target, "https://a.example/", "A"));
        assert_eq!(m.visit_count("https://a.example/"), 1);
        assert_eq!(m.last_accessed("https://a.example/"), NOW);
        assert_eq!(target.captures, vec![640]);
        assert_eq!(m.screenshot("https://a.example/"), Some(b"shot".to_vec()));

        m.set_screenshot_size(320);
        clock.advance(SCREENSHOT_UPDATE_DELAY);
        visit(&mut m, &mut target, "https://a.example/", 1);
        assert_eq!(target.captures, vec![640, 320]);
    }

    #[test]
    fn recapture_waits_for_delay() {
        let clock = ManualClock::at(NOW);
        let mut m = manager(&clock);
        let mut target = Target::default();

        visit(&mut m, &mut target, "https://a.example/", 1);
        clock.advance(SCREENSHOT_UPDATE_DELAY - 1.0);
        visit(&mut m, &mut target, "https://a.example/", 1);

        assert_eq!(target.captures.len(), 1);
        assert_eq!(m.visit_count("https://a.example/"), 2);
    }

    #[test]
    fn failed_capture_reports_false_but_counts_visit() {
        let clock = ManualClock::at(NOW);
        let m = manager(&clock);
        let mut target = Target { fail_capture: true, ..Target::default() };

        assert!(!m.add_or_update(&mut target, "https://a.example/", "A"));
        assert_eq!(m.visit_count("https://a.example/"), 1);
        assert!(!m.has_screenshot("https://a.example/"));
    }

    #[test]
    fn disabled_screenshots_never_capture() {
        let clock = ManualClock::at(NOW);
        let host = Collaborators {
            files: Box::new(files()),
            clock: Box::new(clock.clone()),
            ..Collaborators::default()
        };
        let cfg = Config { screenshots_enabled: false, ..config() };
        let mut m = TopSitesManager::with_store(Some(Store::open_in_memory().unwrap()), &cfg, host);
        let mut target = Target::default();

        visit(&mut m, &mut target, "https://a.example/", 3);
        assert!(target.captures.is_empty());
        assert_eq!(m.visit_count("https://a.example/"), 3);
    }

    #[test]
    fn full_list_raises_screenshot_bar() {
        let clock = ManualClock::at(NOW);
        let mut m = manager(&clock);
        let mut target = Target::default();
        m.set_max_entries(2);

        visit(&mut m, &mut target, "https://a.example/", 3);
        visit(&mut m, &mut target, "https://b.example/", 2);
        assert_eq!(m.required_visit_count(), 2);

        target.captures.clear();
        visit(&mut m, &mut target, "https://c.example/", 1);
        assert!(target.captures.is_empty());
        assert!(!m.has_screenshot("https://c.example/"));
    }

    #[test]
    fn should_add_denylist() {
        let clock = ManualClock::at(NOW);
        let m = manager(&clock);

        assert!(m.should_add("https://example.com/"));
        assert!(m.should_add("not a url at all"));
        assert!(!m.should_add("topsites://"));
        assert!(!m.should_add("topsites://?remove=x"));
        assert!(!m.should_add("file:///usr/share/owb/webinspector/inspector.html"));
        assert!(!m.should_add("data:text/html,<p>hi</p>"));
        assert!(!m.should_add("DATA:text/plain,hi"));
    }

    #[test]
    fn configured_schemes_excluded() {
        let clock = ManualClock::at(NOW);
        let host = Collaborators { clock: Box::new(clock.clone()), ..Collaborators::default() };
        let cfg = Config { excluded_schemes: vec!["About:".into(), "file".into()], ..config() };
        let m = TopSitesManager::with_store(Some(Store::open_in_memory().unwrap()), &cfg, host);

        assert!(!m.should_add("about:blank"));
        assert!(!m.should_add("file:///tmp/index.html"));
        assert!(m.should_add("https://example.com/"));
    }

    #[test]
    fn control_url_applies_command_and_reloads() {
        let clock = ManualClock::at(NOW);
        let mut m = manager(&clock);
        let mut target = Target::default();

        m.update(&mut target, "topsites://?maxEntries=5", "");
        assert_eq!(m.max_entries(), 5);
        assert_eq!(m.entries(), 0);
        assert_eq!(target.loaded.len(), 1);
        assert_eq!(target.loaded[0].1, NEW_TAB_URL);
        assert!(target.loaded[0].0.contains("|5|"));
    }

    #[test]
    fn invalid_control_url_still_reloads() {
        let clock = ManualClock::at(NOW);
        let mut m = manager(&clock);
        let mut target = Target::default();

        m.update(&mut target, "topsites://?maxEntries=lots", "");
        assert_eq!(m.max_entries(), 9);
        assert_eq!(target.loaded.len(), 1);
    }

    #[test]
    fn bare_control_url_does_nothing() {
        let clock = ManualClock::at(NOW);
        let mut m = manager(&clock);
        let mut target = Target::default();

        m.update(&mut target, "topsites://", "Top Sites");
        assert!(target.loaded.is_empty());
        assert_eq!(m.entries(), 0);
    }

    #[test]
    fn remove_command_deletes_site() {
        let clock = ManualClock::at(NOW);
        let mut m = manager(&clock);
        let mut target = Target::default();

        visit(&mut m, &mut target, "https://a.example/?q=1&r=2", 1);
        let link = command::remove_link("https://a.example/?q=1&r=2");
        m.update(&mut target, &link, "");

        assert!(!m.contains("https://a.example/?q=1&r=2"));
    }

    #[test]
    fn filter_modes_consult_bookmarks() {
        let clock = ManualClock::at(NOW);
        let mut m = manager_with(Store::open_in_memory().unwrap(), &clock, &["https://b.example/"]);
        let mut target = Target::default();
        visit(&mut m, &mut target, "https://a.example/", 2);
        visit(&mut m, &mut target, "https://b.example/", 1);

        m.set_filter_mode(FilterMode::ShowBookmarks);
        let page = m.render_page().unwrap();
        assert!(page.contains("href=\"https://b.example/\""));
        assert!(!page.contains("href=\"https://a.example/\""));

        m.set_filter_mode(FilterMode::ShowAllButBookmarks);
        let page = m.render_page().unwrap();
        assert!(page.contains("href=\"https://a.example/\""));
        assert!(!page.contains("href=\"https://b.example/\""));

        m.set_filter_mode(FilterMode::ShowCustom);
        assert_eq!(m.render_page().unwrap().matches("<li class=").count(), 2);
    }

    #[test]
    fn filtered_out_sites_do_not_use_up_slots() {
        let clock = ManualClock::at(NOW);
        let mut m = manager_with(Store::open_in_memory().unwrap(), &clock, &["https://top.example/"]);
        let mut target = Target::default();
        visit(&mut m, &mut target, "https://top.example/", 5);
        visit(&mut m, &mut target, "https://a.example/", 2);
        visit(&mut m, &mut target, "https://b.example/", 1);

        m.set_max_entries(2);
        m.set_filter_mode(FilterMode::ShowAllButBookmarks);
        let page = m.render_page().unwrap();
        assert_eq!(page.matches("<li class=").count(), 2);
    }

    #[test]
    fn placeholder_used_without_screenshot() {
        let clock = ManualClock::at(NOW);
        let store = Store::open_in_memory().unwrap();
        store.insert_site("https://a.example/", "A", 1, NOW).unwrap();
        let m = manager_with(store, &clock, &[]);

        let page = m.render_page().unwrap();
        assert!(page.contains(&template::data_url(b"placeholder")));
    }

    #[test]
    fn empty_store_renders_single_space() {
        let clock = ManualClock::at(NOW);
        let m = manager(&clock);
        assert_eq!(m.render_page().unwrap(), "<ul> </ul>|9|0|0|640");
    }

    #[test]
    fn coverflow_uses_its_own_template() {
        let clock = ManualClock::at(NOW);
        let mut m = manager(&clock);
        let mut target = Target::default();
        visit(&mut m, &mut target, "https://a.example/", 1);

        m.set_display_mode(DisplayMode::CoverFlow);
        let page = m.render_page().unwrap();
        assert!(page.starts_with("<div><div class=\"item\""));
    }

    #[test]
    fn missing_template_loads_nothing() {
        let clock = ManualClock::at(NOW);
        let host = Collaborators { clock: Box::new(clock.clone()), ..Collaborators::default() };
        let cfg = Config { resource_dir: PathBuf::from("/nonexistent/resources"), ..config() };
        let m = TopSitesManager::with_store(Some(Store::open_in_memory().unwrap()), &cfg, host);
        let mut target = Target::default();

        m.generate_template(&mut target, NEW_TAB_URL);
        assert!(target.loaded.is_empty());
    }

    #[test]
    fn without_store_everything_is_a_no_op() {
        let clock = ManualClock::at(NOW);
        let host = Collaborators {
            files: Box::new(files()),
            clock: Box::new(clock.clone()),
            ..Collaborators::default()
        };
        let mut m = TopSitesManager::with_store(None, &config(), host);
        let mut target = Target::default();

        assert!(!m.is_open());
        assert!(!m.add_or_update(&mut target, "https://a.example/", "A"));
        m.update(&mut target, "topsites://?maxEntries=3", "");
        assert!(target.loaded.is_empty());
        assert!(target.captures.is_empty());
        assert_eq!(m.entries(), 0);
        assert_eq!(m.required_visit_count(), 0);
        assert!(!m.should_appear("https://a.example/"));
        assert!(!m.remove("https://a.example/"));
        assert!(m.ranked_sites().is_empty());
    }

    #[test]
    fn disabled_manager_ignores_navigation() {
        let clock = ManualClock::at(NOW);
        let host = Collaborators {
            files: Box::new(files()),
            clock: Box::new(clock.clone()),
            ..Collaborators::default()
        };
        let cfg = Config { enabled: false, ..config() };
        let mut m = TopSitesManager::with_store(Some(Store::open_in_memory().unwrap()), &cfg, host);
        let mut target = Target::default();

        assert!(!m.is_enabled());
        visit(&mut m, &mut target, "https://a.example/", 2);
        m.update(&mut target, "topsites://?maxEntries=3", "");
        m.generate_template(&mut target, NEW_TAB_URL);
        assert_eq!(m.entries(), 0);
        assert_eq!(m.max_entries(), Settings::default().max_entries);
        assert!(target.loaded.is_empty());
    }

    #[test]
    fn non_positive_history_age_keeps_old_sites() {
        const DAY: f64 = 86_400.0;

        for age in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let store = Store::open_in_memory().unwrap();
            store.insert_site("https://ancient.example/", "", 3, NOW - 400.0 * DAY).unwrap();
            store.insert_site("https://recent.example/", "", 1, NOW - DAY).unwrap();

            let clock = ManualClock::at(NOW);
            let host = Collaborators {
                files: Box::new(files()),
                preferences: Box::new(FixedHistoryAge(age)),
                clock: Box::new(clock.clone()),
                ..Collaborators::default()
            };
            let m = TopSitesManager::with_store(Some(store), &config(), host);

            assert_eq!(m.entries(), 2, "history age {age}");
            assert!(m.contains("https://ancient.example/"));
        }
    }

    #[test]
    fn positive_history_age_expires_old_sites() {
        const DAY: f64 = 86_400.0;

        let store = Store::open_in_memory().unwrap();
        store.insert_site("https://ancient.example/", "", 3, NOW - 8.0 * DAY).unwrap();
        store.insert_site("https://recent.example/", "", 1, NOW - DAY).unwrap();

        let clock = ManualClock::at(NOW);
        let host = Collaborators {
            files: Box::new(files()),
            preferences: Box::new(FixedHistoryAge(7.0)),
            clock: Box::new(clock.clone()),
            ..Collaborators::default()
        };
        let m = TopSitesManager::with_store(Some(store), &config(), host);

        assert!(!m.contains("https://ancient.example/"));
        assert!(m.contains("https://recent.example/"));
    }

    #[test]
    fn close_is_idempotent() {
        let clock = ManualClock::at(NOW);
        let mut m = manager(&clock);
        m.close();
        m.close();
        assert!(!m.is_open());
        assert_eq!(m.entries(), 0);
    }

    #[test]
    fn settings_persist_across_managers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("TopSites.db");
        let clock = ManualClock::at(NOW);

        {
            let mut m = manager_with(Store::open(&path).unwrap(), &clock, &[]);
            m.set_display_mode(DisplayMode::CoverFlow);
            m.set_max_entries(4);
            m.set_screenshot_size(800);
            m.set_filter_mode(FilterMode::ShowBookmarks);
            m.set_max_entries(0);
        }

        let m = manager_with(Store::open(&path).unwrap(), &clock, &[]);
        assert_eq!(
            m.settings(),
            Settings {
                display_mode: DisplayMode::CoverFlow,
                max_entries: 4,
                screenshot_size: 800,
                filter_mode: FilterMode::ShowBookmarks,
            }
        );
    }
}
