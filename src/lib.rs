//! Most visited sites for a browser's new tab page.
//!
//! [`manager::TopSitesManager`] counts visits per url in a SQLite database,
//! keeps thumbnails for the highest ranked sites and renders them into an
//! HTML page from a template. The browser side (the view being captured, the
//! bookmark store, preferences) is reached only through the traits in
//! [`host`].

pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod host;
pub mod manager;
pub mod platform;
pub mod report;
pub mod store;
pub mod template;
pub mod util;

pub use error::{Result, TopSitesError};
pub use manager::TopSitesManager;
