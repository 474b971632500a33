use crate::{Check, CheckKind, CheckStatus, FileEntry, StatusKindCounts};
use rusqlite::{Connection, OpenFlags, params};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while reading the results database.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
    #[error("invalid check status code: {0}")]
    InvalidStatus(i64),
    #[error("invalid call context id list: {0:?}")]
    InvalidIdList(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Read-only view of an analyzer results database.
///
/// The database is produced by the analyzer; this side never writes. Expected
/// tables: `files`, `check_kinds`, `functions`, `call_contexts` and `checks`
/// (one row per finding, with a comma-separated `call_context_ids` column).
pub struct ResultsDb {
    conn: Connection,
}

impl ResultsDb {
    /// Open an existing results database read-only.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// The static check kind catalog, ordered by id.
    pub fn check_kinds(&self) -> Result<Vec<CheckKind>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM check_kinds ORDER BY id")?;
        let kinds = stmt
            .query_map([], |row| {
                Ok(CheckKind {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(kinds)
    }

    /// All analyzed files with their aggregated status-by-kind counts,
    /// sorted by path.
    pub fn files(&self) -> Result<Vec<FileEntry>> {
        let mut stmt = self.conn.prepare("SELECT id, path FROM files")?;
        let mut files = stmt
            .query_map([], |row| {
                Ok(FileEntry {
                    id: row.get(0)?,
                    path: row.get(1)?,
                    status_kinds: StatusKindCounts::default(),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let index: BTreeMap<i64, usize> = files
            .iter()
            .enumerate()
            .map(|(i, file)| (file.id, i))
            .collect();

        let mut stmt = self.conn.prepare(
            "SELECT file_id, status, kind, COUNT(*)
             FROM checks GROUP BY file_id, status, kind",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, u32>(2)?,
                    row.get::<_, u64>(3)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for (file_id, status_code, kind, count) in rows {
            let status = decode_status(status_code)?;
            if let Some(&i) = index.get(&file_id) {
                files[i].status_kinds.record(status, kind, count);
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    /// Path of a single file, if the id exists.
    pub fn file_path(&self, id: i64) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT path FROM files WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], |row| row.get::<_, String>(0))?;
        match rows.next() {
            Some(path) => Ok(Some(path?)),
            None => Ok(None),
        }
    }

    /// Checks of one file, ordered by line and, within a line, by status
    /// descending so errors render first.
    pub fn checks(&self, file_id: i64) -> Result<Vec<Check>> {
        let mut stmt = self.conn.prepare(
            "SELECT kind, status, line, col, message, function_id, call_context_ids
             FROM checks WHERE file_id = ?1
             ORDER BY line ASC, status DESC",
        )?;
        let rows = stmt
            .query_map(params![file_id], |row| {
                Ok((
                    row.get::<_, u32>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, u32>(2)?,
                    row.get::<_, Option<u32>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, i64>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut checks = Vec::with_capacity(rows.len());
        for (kind, status_code, line, column, message, function_id, id_list) in rows {
            checks.push(Check {
                kind,
                status: decode_status(status_code)?,
                line,
                column,
                message,
                function_id,
                call_context_ids: parse_id_list(&id_list)?,
            });
        }
        Ok(checks)
    }

    /// Function id to pretty name.
    pub fn functions(&self) -> Result<BTreeMap<i64, String>> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM functions")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<BTreeMap<i64, String>, _>>()?;
        Ok(rows)
    }

    /// Call context id to description. The empty description is the program
    /// entry point.
    pub fn call_contexts(&self) -> Result<BTreeMap<i64, String>> {
        let mut stmt = self.conn.prepare("SELECT id, description FROM call_contexts")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<BTreeMap<i64, String>, _>>()?;
        Ok(rows)
    }
}

fn decode_status(code: i64) -> Result<CheckStatus> {
    u8::try_from(code)
        .ok()
        .and_then(CheckStatus::from_code)
        .ok_or(DbError::InvalidStatus(code))
}

/// Parse a comma-separated id list; the empty string is an empty list.
fn parse_id_list(raw: &str) -> Result<Vec<i64>> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    raw.split(',')
        .map(|part| {
            part.trim()
                .parse::<i64>()
                .map_err(|_| DbError::InvalidIdList(raw.to_string()))
        })
        .collect()
}
