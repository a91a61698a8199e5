//! # Stocksim Warehouse
//!
//! DuckDB-backed snapshot storage for stocksim.
//!
//! ## Overview
//!
//! The simulation persists each entity collection (stocks, trades,
//! participants, ...) as one opaque JSON document. This crate stores those
//! documents in a single `collections` table keyed by collection name, and
//! records recent writes in an audit table that keeps at most
//! [`WarehouseConfig::write_log_retention`] rows per name.
//!
//! ```rust,no_run
//! use stocksim_warehouse::{Warehouse, WarehouseConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let warehouse = Warehouse::open(WarehouseConfig::default())?;
//!     warehouse.write("stocks", r#"{"schema_version":1,"records":[]}"#)?;
//!     assert!(warehouse.read("stocks")?.is_some());
//!     Ok(())
//! }
//! ```
//!
//! ## Tables
//!
//! | Table | Description |
//! |-------|-------------|
//! | `collections` | Latest snapshot per collection name |
//! | `write_log` | Most recent writes and clears per name |
//! | `schema_migrations` | Applied migration versions |

pub mod duckdb;
pub mod migrations;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ::duckdb::{params, Connection};
use serde::Serialize;
use thiserror::Error;

pub use duckdb::{DatabaseLocation, DuckDbConnectionManager, PooledConnection};

const MAX_COLLECTION_NAME_LEN: usize = 64;

/// Audit rows kept per collection name unless configured otherwise.
pub const DEFAULT_WRITE_LOG_RETENTION: usize = 256;

/// Errors that can occur during warehouse operations.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// `DuckDB` database error.
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    /// I/O error (creating the data directory).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Collection names are restricted to ASCII letters, digits and `_`.
    #[error("invalid collection name '{0}'")]
    InvalidCollectionName(String),
}

/// Configuration for the warehouse database.
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    /// Root directory for stocksim data.
    pub stocksim_home: PathBuf,
    /// Path to the `DuckDB` database file.
    pub db_path: PathBuf,
    /// Maximum number of idle connections kept around.
    pub max_pool_size: usize,
    /// Audit rows kept per collection name; older rows are pruned on write.
    pub write_log_retention: usize,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self::for_home(resolve_stocksim_home())
    }
}

impl WarehouseConfig {
    /// Layout rooted at `stocksim_home`: `<home>/data/stocksim.duckdb`.
    pub fn for_home(stocksim_home: impl Into<PathBuf>) -> Self {
        let stocksim_home = stocksim_home.into();
        let db_path = stocksim_home.join("data").join("stocksim.duckdb");
        Self {
            stocksim_home,
            db_path,
            max_pool_size: 4,
            write_log_retention: DEFAULT_WRITE_LOG_RETENTION,
        }
    }
}

/// Summary row for one stored collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionInfo {
    pub name: String,
    pub bytes: u64,
    pub updated_at: String,
}

/// Named-document store over `DuckDB`.
#[derive(Clone)]
pub struct Warehouse {
    manager: DuckDbConnectionManager,
    write_log_retention: usize,
}

impl Warehouse {
    /// Open (creating if needed) the database file named by `config`.
    pub fn open(config: WarehouseConfig) -> Result<Self, WarehouseError> {
        if let Some(parent) = config.db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let manager = DuckDbConnectionManager::open(
            DatabaseLocation::File(config.db_path.clone()),
            config.max_pool_size,
        )?;
        let warehouse = Self {
            manager,
            write_log_retention: config.write_log_retention.max(1),
        };
        warehouse.initialize()?;
        tracing::debug!(db_path = %config.db_path.display(), "warehouse opened");
        Ok(warehouse)
    }

    /// Open a throwaway in-memory warehouse.
    pub fn open_in_memory() -> Result<Self, WarehouseError> {
        let manager = DuckDbConnectionManager::open(DatabaseLocation::InMemory, 2)?;
        let warehouse = Self {
            manager,
            write_log_retention: DEFAULT_WRITE_LOG_RETENTION,
        };
        warehouse.initialize()?;
        Ok(warehouse)
    }

    /// Apply schema migrations.
    pub fn initialize(&self) -> Result<(), WarehouseError> {
        let connection = self.manager.acquire()?;
        migrations::apply_migrations(&connection)?;
        Ok(())
    }

    /// Path to the database file, `None` when in memory.
    pub fn db_path(&self) -> Option<&Path> {
        self.manager.db_path()
    }

    /// Read the stored document for `name`, if any.
    pub fn read(&self, name: &str) -> Result<Option<String>, WarehouseError> {
        validate_collection_name(name)?;
        let connection = self.manager.acquire()?;
        let payload = connection.query_row(
            "SELECT payload FROM collections WHERE name = ?",
            params![name],
            |row| row.get::<_, String>(0),
        );

        match payload {
            Ok(payload) => Ok(Some(payload)),
            Err(::duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    /// Replace the whole document stored under `name`.
    pub fn write(&self, name: &str, payload: &str) -> Result<(), WarehouseError> {
        validate_collection_name(name)?;
        let connection = self.manager.acquire()?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<(), WarehouseError> {
            connection.execute(
                "INSERT OR REPLACE INTO collections (name, payload, updated_at) \
                 VALUES (?, ?, CURRENT_TIMESTAMP)",
                params![name, payload],
            )?;
            let bytes = payload.len() as i64;
            connection.execute(
                "INSERT INTO write_log (name, operation, bytes, written_at) \
                 VALUES (?, 'write', ?, CURRENT_TIMESTAMP)",
                params![name, bytes],
            )?;
            prune_write_log(&connection, name, self.write_log_retention)?;
            Ok(())
        })();

        finalize_transaction(&connection, result)
    }

    /// Drop every stored collection. Returns how many were removed.
    pub fn clear(&self) -> Result<usize, WarehouseError> {
        let connection = self.manager.acquire()?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<usize, WarehouseError> {
            let removed = connection.execute("DELETE FROM collections", [])?;
            connection.execute(
                "INSERT INTO write_log (name, operation, bytes, written_at) \
                 VALUES ('*', 'clear', NULL, CURRENT_TIMESTAMP)",
                [],
            )?;
            prune_write_log(&connection, "*", self.write_log_retention)?;
            Ok(removed)
        })();

        let removed = finalize_transaction(&connection, result)?;
        tracing::info!(removed, "warehouse cleared");
        Ok(removed)
    }

    /// List stored collections ordered by name.
    pub fn list(&self) -> Result<Vec<CollectionInfo>, WarehouseError> {
        let connection = self.manager.acquire()?;
        let mut statement = connection.prepare(
            "SELECT name, LENGTH(payload)::BIGINT, CAST(updated_at AS VARCHAR) \
             FROM collections ORDER BY name",
        )?;
        let rows = statement.query_map([], |row| {
            Ok(CollectionInfo {
                name: row.get(0)?,
                bytes: row.get::<_, i64>(1)?.max(0) as u64,
                updated_at: row.get(2)?,
            })
        })?;

        let mut collections = Vec::new();
        for row in rows {
            collections.push(row?);
        }
        Ok(collections)
    }

    /// Number of writes still in the log for `name`, at most the configured
    /// retention.
    pub fn write_count(&self, name: &str) -> Result<u64, WarehouseError> {
        validate_collection_name(name)?;
        let connection = self.manager.acquire()?;
        let count: i64 = connection.query_row(
            "SELECT COUNT(*) FROM write_log WHERE name = ? AND operation = 'write'",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }
}

/// Keep only the newest `retain` audit rows for `name`.
fn prune_write_log(
    connection: &Connection,
    name: &str,
    retain: usize,
) -> Result<(), WarehouseError> {
    let sql = format!(
        "DELETE FROM write_log WHERE name = ? AND seq NOT IN \
         (SELECT seq FROM write_log WHERE name = ? ORDER BY seq DESC LIMIT {retain})"
    );
    connection.execute(&sql, params![name, name])?;
    Ok(())
}

/// Commit on success, roll back on failure.
fn finalize_transaction<T>(
    connection: &Connection,
    result: Result<T, WarehouseError>,
) -> Result<T, WarehouseError> {
    match result {
        Ok(value) => {
            connection.execute_batch("COMMIT")?;
            Ok(value)
        }
        Err(error) => {
            let _ = connection.execute_batch("ROLLBACK");
            Err(error)
        }
    }
}

fn validate_collection_name(name: &str) -> Result<(), WarehouseError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_COLLECTION_NAME_LEN
        && name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
    if valid {
        Ok(())
    } else {
        Err(WarehouseError::InvalidCollectionName(name.to_owned()))
    }
}

/// `$STOCKSIM_HOME`, else `$HOME/.stocksim`, else `./.stocksim`.
pub fn resolve_stocksim_home() -> PathBuf {
    if let Some(explicit) = env::var_os("STOCKSIM_HOME") {
        return PathBuf::from(explicit);
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".stocksim");
    }

    PathBuf::from(".stocksim")
}
