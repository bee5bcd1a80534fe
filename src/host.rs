//! Interfaces the manager consumes from the embedding browser.
//!
//! The manager never talks to a web view, the bookmark store or the
//! preferences directly; the host hands it implementations of these traits.
//! Stock implementations used by the command line tool live here too.

use std::cell::Cell;
use std::collections::HashSet;
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use image::imageops::FilterType;
use image::ImageFormat;

use crate::error::{Result, TopSitesError};

pub const DEFAULT_HISTORY_AGE_DAYS: f64 = 30.0;

/// Encoded image produced by a render target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub width: u32,
    pub height: u32,
    pub image: Vec<u8>,
}

/// The view being navigated: something that can be captured and can load markup.
pub trait RenderTarget {
    /// Renders the current document `width` pixels wide. Height follows the
    /// document's aspect ratio. None when nothing could be rendered.
    fn screenshot(&mut self, width: u32) -> Option<Capture>;

    /// Navigates to `html`, resolving relative references against `base_url`.
    fn load_html_string(&mut self, html: &str, base_url: &str);
}

pub trait Bookmarks {
    fn contains_url(&self, url: &str) -> bool;
}

pub trait Preferences {
    fn history_age_in_days_limit(&self) -> f64;
}

pub trait FileSource {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Source of "now", in seconds since the unix epoch.
pub trait Clock {
    fn now(&self) -> f64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone, Default)]
pub struct ManualClock(Rc<Cell<f64>>);

impl ManualClock {
    pub fn at(now: f64) -> Self {
        ManualClock(Rc::new(Cell::new(now)))
    }

    pub fn set(&self, now: f64) {
        self.0.set(now);
    }

    pub fn advance(&self, seconds: f64) {
        self.0.set(self.0.get() + seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.0.get()
    }
}

pub struct DiskFiles;

impl FileSource for DiskFiles {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

pub struct NoBookmarks;

impl Bookmarks for NoBookmarks {
    fn contains_url(&self, _url: &str) -> bool {
        false
    }
}

/// Bookmarked urls held in memory
#[derive(Debug, Default, Clone)]
pub struct BookmarkList {
    urls: HashSet<String>,
}

impl BookmarkList {
    /// Reads one url per line; blank lines and `#` comments are skipped.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| TopSitesError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect())
    }
}

impl<S: Into<String>> FromIterator<S> for BookmarkList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        BookmarkList {
            urls: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl Bookmarks for BookmarkList {
    fn contains_url(&self, url: &str) -> bool {
        self.urls.contains(url)
    }
}

pub struct FixedHistoryAge(pub f64);

impl Preferences for FixedHistoryAge {
    fn history_age_in_days_limit(&self) -> f64 {
        self.0
    }
}

/// Everything besides the store the manager needs from its host.
pub struct Collaborators {
    pub files: Box<dyn FileSource>,
    pub bookmarks: Box<dyn Bookmarks>,
    pub preferences: Box<dyn Preferences>,
    pub clock: Box<dyn Clock>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Collaborators {
            files: Box::new(DiskFiles),
            bookmarks: Box::new(NoBookmarks),
            preferences: Box::new(FixedHistoryAge(DEFAULT_HISTORY_AGE_DAYS)),
            clock: Box::new(SystemClock),
        }
    }
}

/// Decodes `encoded`, scales it to `width` pixels keeping the aspect ratio
/// and re-encodes it as PNG.
pub fn scale_capture(encoded: &[u8], width: u32) -> Result<Capture> {
    let source = image::load_from_memory(encoded)?;
    let height = u64::from(source.height()) * u64::from(width) / u64::from(source.width().max(1));
    let height = u32::try_from(height.max(1)).unwrap_or(u32::MAX);

    let scaled = source.resize_exact(width, height, FilterType::Triangle);
    let mut image = Vec::new();
    scaled.write_to(&mut Cursor::new(&mut image), ImageFormat::Png)?;

    Ok(Capture {
        width: scaled.width(),
        height: scaled.height(),
        image,
    })
}

/// Render target backed by files, for driving the manager without a browser.
///
/// Captures decode a prepared image file and scale it to the requested
/// width; loaded pages are written to an output file, or stdout when none is set.
pub struct FileRenderTarget {
    capture: Option<PathBuf>,
    output: Option<PathBuf>,
    pages_loaded: usize,
}

impl FileRenderTarget {
    pub fn new(capture: Option<PathBuf>, output: Option<PathBuf>) -> Self {
        FileRenderTarget {
            capture,
            output,
            pages_loaded: 0,
        }
    }

    pub fn pages_loaded(&self) -> usize {
        self.pages_loaded
    }
}

impl RenderTarget for FileRenderTarget {
    fn screenshot(&mut self, width: u32) -> Option<Capture> {
        let path = self.capture.as_ref()?;
        let encoded = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("cannot read capture {}: {e}", path.display());
                return None;
            }
        };

        match scale_capture(&encoded, width) {
            Ok(capture) => Some(capture),
            Err(e) => {
                log::warn!("capture {}: {e}", path.display());
                None
            }
        }
    }

    fn load_html_string(&mut self, html: &str, base_url: &str) {
        log::debug!("loading {} bytes of html with base {base_url}", html.len());
        self.pages_loaded += 1;

        let written = match &self.output {
            Some(path) => std::fs::write(path, html),
            None => io::stdout().lock().write_all(html.as_bytes()),
        };

        if let Err(e) = written {
            log::warn!("cannot write generated page: {e}");
        }
    }
}
