use rusqlite::{params, OptionalExtension, Row};
use serde::Serialize;

use super::Store;
use crate::error::Result;

/// One visited site as stored in the topsites table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteRecord {
    pub url: String,
    pub title: String,
    #[serde(skip_serializing)]
    pub screenshot: Option<Vec<u8>>,
    pub visit_count: i64,
    /// seconds since the unix epoch
    pub last_accessed: f64,
}

impl SiteRecord {
    pub fn has_screenshot(&self) -> bool {
        self.screenshot.as_ref().is_some_and(|s| !s.is_empty())
    }
}

const SITE_COLUMNS: &str = "url, title, screenshot, visitCount, lastAccessed";

fn site_from_row(row: &Row) -> rusqlite::Result<SiteRecord> {
    Ok(SiteRecord {
        url: row.get(0)?,
        title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        screenshot: row.get(2)?,
        visit_count: row.get::<_, Option<i64>>(3)?.unwrap_or(0),
        last_accessed: row.get::<_, Option<f64>>(4)?.unwrap_or(0.0),
    })
}

impl Store {
    pub fn find_site(&self, url: &str) -> Result<Option<SiteRecord>> {
        let site = self
            .conn
            .query_row(
                &format!("SELECT {SITE_COLUMNS} FROM topsites WHERE url = ?1"),
                params![url],
                site_from_row,
            )
            .optional()?;
        Ok(site)
    }

    /// Inserts a new row without a screenshot.
    pub fn insert_site(&self, url: &str, title: &str, visit_count: i64, now: f64) -> Result<()> {
        self.execute(
            "INSERT INTO topsites (url, title, screenshot, visitCount, lastAccessed)
             VALUES (?1, ?2, NULL, ?3, ?4)",
            params![url, title, visit_count, now],
        )?;
        Ok(())
    }

    /// Records a visit on an existing row. The screenshot column is left alone.
    pub fn update_visit(&self, url: &str, title: &str, visit_count: i64, now: f64) -> Result<usize> {
        self.execute(
            "UPDATE topsites SET title = ?1, visitCount = ?2, lastAccessed = ?3 WHERE url = ?4",
            params![title, visit_count, now, url],
        )
    }

    pub fn set_screenshot(&self, url: &str, image: Option<&[u8]>) -> Result<usize> {
        self.execute(
            "UPDATE topsites SET screenshot = ?1 WHERE url = ?2",
            params![image, url],
        )
    }

    pub fn delete_site(&self, url: &str) -> Result<usize> {
        self.execute("DELETE FROM topsites WHERE url = ?1", params![url])
    }

    pub fn count_sites(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM topsites", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Smallest visit count among the `limit` most visited rows, or None
    /// when the table is empty.
    pub fn min_visit_count_in_top(&self, limit: u32) -> Result<Option<i64>> {
        let min = self.conn.query_row(
            "SELECT MIN(visitCount) FROM (
                SELECT visitCount FROM topsites ORDER BY visitCount DESC LIMIT ?1
            )",
            params![limit],
            |row| row.get(0),
        )?;
        Ok(min)
    }

    /// Drops the cached image of every row visited at most `max_visit_count`
    /// times. Rows themselves are kept.
    pub fn clear_screenshots_up_to(&self, max_visit_count: i64) -> Result<usize> {
        self.execute(
            "UPDATE topsites SET screenshot = NULL WHERE visitCount <= ?1 AND screenshot IS NOT NULL",
            params![max_visit_count],
        )
    }

    pub fn delete_accessed_before(&self, cutoff: f64) -> Result<usize> {
        self.execute(
            "DELETE FROM topsites WHERE lastAccessed < ?1",
            params![cutoff],
        )
    }

    /// Walks rows in ranking order (most visited first, most recent breaking
    /// ties) until `f` returns false.
    pub fn for_each_ranked<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(SiteRecord) -> Result<bool>,
    {
        self.for_each_row(
            &format!("SELECT {SITE_COLUMNS} FROM topsites ORDER BY visitCount DESC, lastAccessed DESC"),
            [],
            |row| f(site_from_row(row)?),
        )
    }

    pub fn ranked_sites(&self) -> Result<Vec<SiteRecord>> {
        let mut sites = Vec::new();
        self.for_each_ranked(|site| {
            sites.push(site);
            Ok(true)
        })?;
        Ok(sites)
    }
}
