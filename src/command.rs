//! Control commands sent back by the rendered page.
//!
//! The page's links and settings controls navigate to `topsites://?key=value`.
//! Exactly one key is read per navigation:
//!
//! | key              | value                                   |
//! |------------------|-----------------------------------------|
//! | `remove`         | form-encoded url of the site to drop    |
//! | `maxEntries`     | positive integer                        |
//! | `displayMode`    | 0 grid, 1 coverflow                     |
//! | `filterMode`     | 0 all, 1 bookmarks, 2 all but bookmarks, 3 custom |
//! | `screenshotSize` | positive integer, capture width in px   |

use url::form_urlencoded;

use crate::error::{Result, TopSitesError};
use crate::store::{DisplayMode, FilterMode};

pub const CONTROL_SCHEME: &str = "topsites:";

/// Url the host opens for a new tab; also the base url of generated pages.
pub const NEW_TAB_URL: &str = "topsites://";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCommand {
    Remove(String),
    SetMaxEntries(u32),
    SetDisplayMode(DisplayMode),
    SetFilterMode(FilterMode),
    SetScreenshotSize(u32),
}

pub fn is_control_url(url: &str) -> bool {
    url.starts_with(CONTROL_SCHEME)
}

/// The query string of a control url, if it carries a non-empty one.
pub fn control_query(url: &str) -> Option<&str> {
    if !is_control_url(url) {
        return None;
    }
    let (_, query) = url.split_once('?')?;
    (!query.is_empty()).then_some(query)
}

/// Link target that asks the manager to forget `url`.
pub fn remove_link(url: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(url.as_bytes()).collect();
    format!("{NEW_TAB_URL}?remove={encoded}")
}

fn positive(key: &str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| TopSitesError::InvalidCommand(format!("{key}={value}")))
}

fn code(key: &str, value: &str) -> Result<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| TopSitesError::InvalidCommand(format!("{key}={value}")))
}

impl ControlCommand {
    /// Parses a control url. Returns `Ok(None)` for urls that carry no command.
    pub fn from_url(url: &str) -> Result<Option<Self>> {
        control_query(url).map(Self::parse_query).transpose()
    }

    pub fn parse_query(query: &str) -> Result<Self> {
        let (key, value) = form_urlencoded::parse(query.as_bytes())
            .next()
            .ok_or_else(|| TopSitesError::InvalidCommand(query.to_string()))?;

        let invalid = || TopSitesError::InvalidCommand(format!("{key}={value}"));

        match key.as_ref() {
            "remove" if !value.is_empty() => Ok(ControlCommand::Remove(value.to_string())),
            "maxEntries" => positive(&key, &value).map(ControlCommand::SetMaxEntries),
            "screenshotSize" => positive(&key, &value).map(ControlCommand::SetScreenshotSize),
            "displayMode" => DisplayMode::from_i64(code(&key, &value)?)
                .map(ControlCommand::SetDisplayMode)
                .ok_or_else(invalid),
            "filterMode" => FilterMode::from_i64(code(&key, &value)?)
                .map(ControlCommand::SetFilterMode)
                .ok_or_else(invalid),
            _ => Err(invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_query_requires_scheme_and_query() {
        assert_eq!(control_query("topsites://?maxEntries=5"), Some("maxEntries=5"));
        assert_eq!(control_query("topsites://"), None);
        assert_eq!(control_query("topsites://?"), None);
        assert_eq!(control_query("https://example.com/?maxEntries=5"), None);
    }

    #[test]
    fn parses_each_setting() {
        assert_eq!(
            ControlCommand::parse_query("maxEntries=5").unwrap(),
            ControlCommand::SetMaxEntries(5)
        );
        assert_eq!(
            ControlCommand::parse_query("displayMode=1").unwrap(),
            ControlCommand::SetDisplayMode(DisplayMode::CoverFlow)
        );
        assert_eq!(
            ControlCommand::parse_query("filterMode=2").unwrap(),
            ControlCommand::SetFilterMode(FilterMode::ShowAllButBookmarks)
        );
        assert_eq!(
            ControlCommand::parse_query("screenshotSize=320").unwrap(),
            ControlCommand::SetScreenshotSize(320)
        );
    }

    #[test]
    fn rejects_bad_values() {
        for query in [
            "maxEntries=0",
            "maxEntries=abc",
            "displayMode=2",
            "filterMode=-1",
            "screenshotSize=",
            "remove=",
            "zoom=3",
        ] {
            let err = ControlCommand::parse_query(query).unwrap_err();
            assert!(matches!(err, TopSitesError::InvalidCommand(_)), "{query}");
        }
    }

    #[test]
    fn only_first_pair_is_used() {
        assert_eq!(
            ControlCommand::parse_query("maxEntries=4&displayMode=1").unwrap(),
            ControlCommand::SetMaxEntries(4)
        );
    }

    #[test]
    fn remove_link_round_trips_awkward_urls() {
        let target = "https://example.com/search?q=a b&lang=en+fr#top";
        let link = remove_link(target);
        assert!(link.starts_with("topsites://?remove="));
        assert!(!link.contains('#'));

        assert_eq!(
            ControlCommand::from_url(&link).unwrap(),
            Some(ControlCommand::Remove(target.to_string()))
        );
    }

    #[test]
    fn from_url_ignores_plain_navigation() {
        assert_eq!(ControlCommand::from_url("topsites://").unwrap(), None);
        assert_eq!(ControlCommand::from_url("https://example.com/").unwrap(), None);
    }
}
