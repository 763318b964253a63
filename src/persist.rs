// used for persistence
use rusqlite::{params, Connection, Error};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::catalog::Rows;
use crate::error::Result;

/// Where the query cache keeps its entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceMode {
    /// Entries vanish with the process, used by tests and `cache.enabled = false`.
    InMemory,
    /// Entries survive restarts in an SQLite file, parent directories are created.
    File(PathBuf),
}

/// Listing entry for a cached query.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedQuery {
    pub query: String,
    pub row_count: usize,
    pub cached_at: DateTime<Utc>,
}

// ------------- Persistence -------------
pub struct Persistor {
    db: Connection,
    mode: PersistenceMode,
}
impl Persistor {
    pub fn new(mode: PersistenceMode) -> Result<Persistor> {
        let db = match &mode {
            PersistenceMode::InMemory => Connection::open_in_memory()?,
            PersistenceMode::File(path) => {
                ensure_parent(path)?;
                Connection::open(path)?
            }
        };
        // The "STRICT" keyword introduced in 3.37.0 breaks JDBC connections, which makes
        // debugging using an external tool like DBeaver impossible
        db.execute_batch(
            "
            create table if not exists QueryCache (
                Query_Hash text not null,
                Query text not null,
                Rows text not null,
                CachedAt text not null,
                constraint referenceable_Query_Hash primary key (
                    Query_Hash
                )
            );-- STRICT;
            ",
        )?;
        debug!(?mode, "query cache store opened");
        Ok(Persistor { db, mode })
    }
    pub fn mode(&self) -> &PersistenceMode {
        &self.mode
    }
    // The full query text can be several kilobytes, so the primary key is its digest
    // and the text itself is compared after the lookup.
    fn digest(query: &str) -> String {
        blake3::hash(query.as_bytes()).to_hex().to_string()
    }
    pub fn lookup(&self, query: &str) -> Result<Option<Rows>> {
        let mut statement = self.db.prepare_cached(
            "
            select Query, Rows
                from QueryCache
                where Query_Hash = ?
            ",
        )?;
        match statement.query_row::<(String, String), _, _>(params![Self::digest(query)], |r| {
            Ok((r.get(0)?, r.get(1)?))
        }) {
            Ok((stored, rows)) if stored == query => Ok(Some(serde_json::from_str(&rows)?)),
            Ok((stored, _)) => {
                warn!(%stored, %query, "digest collision in query cache, treating as a miss");
                Ok(None)
            }
            Err(Error::QueryReturnedNoRows) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
    pub fn store(&self, query: &str, rows: &Rows) -> Result<()> {
        let mut statement = self.db.prepare_cached(
            "
            insert or replace into QueryCache (
                Query_Hash,
                Query,
                Rows,
                CachedAt
            ) values (?, ?, ?, ?)
            ",
        )?;
        statement.execute(params![
            Self::digest(query),
            query,
            serde_json::to_string(rows)?,
            Utc::now()
        ])?;
        Ok(())
    }
    pub fn clear(&self) -> Result<usize> {
        Ok(self.db.execute("delete from QueryCache", [])?)
    }
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .db
            .query_row("select count(*) from QueryCache", [], |r| r.get(0))?;
        Ok(count as usize)
    }
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
    pub fn entries(&self) -> Result<Vec<CachedQuery>> {
        let mut statement = self.db.prepare_cached(
            "
            select Query, json_array_length(Rows), CachedAt
                from QueryCache
                order by CachedAt, Query
            ",
        )?;
        let entries = statement
            .query_map([], |row| {
                Ok(CachedQuery {
                    query: row.get(0)?,
                    row_count: row.get::<_, i64>(1)? as usize,
                    cached_at: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
