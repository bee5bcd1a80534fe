//! SQLite storage for top sites.
//!
//! Two tables:
//! - topsites: url, title, screenshot, visitCount, lastAccessed
//! - settings: displayMode, maxEntries, screenshotSize, filterMode (single row)
//!
//! The column names match databases written by earlier browser builds so an
//! existing TopSites.db keeps working. Those databases have no uniqueness
//! constraint on url; duplicates are folded away on open before the unique
//! index is created.

pub mod settings;
pub mod sites;

use std::path::Path;

use rusqlite::{Connection, Params, Row};

use crate::error::{Result, TopSitesError};

pub use settings::{DisplayMode, FilterMode, Settings};
pub use sites::SiteRecord;

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS topsites (
            url TEXT NOT NULL,
            title TEXT,
            screenshot BLOB,
            visitCount INTEGER NOT NULL DEFAULT 1,
            lastAccessed DOUBLE NOT NULL DEFAULT 0
        )",
        [],
    )?;

    // older databases may carry several rows per url, keep the most recently
    // accessed one (last inserted on a tie)
    let folded = conn.execute(
        "DELETE FROM topsites WHERE rowid NOT IN (
            SELECT (SELECT newest.rowid FROM topsites AS newest
                    WHERE newest.url = dup.url
                    ORDER BY newest.lastAccessed DESC, newest.rowid DESC
                    LIMIT 1)
            FROM topsites AS dup
            GROUP BY dup.url
        )",
        [],
    )?;
    if folded > 0 {
        log::info!("folded {folded} duplicate top sites rows");
    }

    conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_topsites_url ON topsites(url)",
        [],
    )?;

    // ranking always orders by visit count first
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_topsites_rank ON topsites(visitCount DESC, lastAccessed DESC)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings (
            displayMode INTEGER,
            maxEntries INTEGER,
            screenshotSize INTEGER,
            filterMode INTEGER
        )",
        [],
    )?;

    settings::seed_defaults(conn)?;

    Ok(())
}

/// Database handle. Opened once by the manager and reused for every operation.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Opens or creates the database at `path`. Safe to call on an existing
    /// database: tables and the settings row are only created when missing.
    pub fn open(path: &Path) -> Result<Self> {
        let unavailable = |source| TopSitesError::StoreUnavailable {
            path: path.to_path_buf(),
            source,
        };

        let conn = Connection::open(path).map_err(unavailable)?;
        init_schema(&conn).map_err(unavailable)?;
        log::debug!("opened top sites database at {}", path.display());
        Ok(Store { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Store { conn })
    }

    /// Runs a parameterized mutation and returns the number of affected rows.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<usize> {
        Ok(self.conn.execute(sql, params)?)
    }

    /// Steps through the rows of a parameterized query in a single pass.
    /// `f` returns `Ok(false)` to stop early; remaining rows are never read.
    pub fn for_each_row<P, F>(&self, sql: &str, params: P, mut f: F) -> Result<()>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> Result<bool>,
    {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;

        while let Some(row) = rows.next()? {
            if !f(row)? {
                break;
            }
        }

        Ok(())
    }

    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| TopSitesError::Statement(e))
    }
}
