//! Error types for the top sites store and manager.

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TopSitesError {
    #[error("cannot open top sites database {path}: {source}")]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("statement failed: {0}")]
    Statement(#[from] rusqlite::Error),

    #[error("cannot read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid control command: {0}")]
    InvalidCommand(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("cannot scale capture: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, TopSitesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_command_display() {
        let e = TopSitesError::InvalidCommand("maxEntries=abc".into());
        assert_eq!(format!("{e}"), "invalid control command: maxEntries=abc");
    }

    #[test]
    fn file_read_display_names_path() {
        let e = TopSitesError::FileRead {
            path: PathBuf::from("/res/TopSites_Grid.html"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        let msg = format!("{e}");
        assert!(msg.contains("/res/TopSites_Grid.html"));
        assert!(msg.contains("missing"));
    }
}
