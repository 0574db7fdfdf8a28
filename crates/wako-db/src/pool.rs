//! # Connection Handle
//!
//! Opens the SQLite file, applies the schema and hands out repositories.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Who Waits On What                                     │
//! │                                                                         │
//! │  create order ─┐                                                        │
//! │  create order ─┼──► UPDATE sequence_numbers ... RETURNING   (writer)    │
//! │  issue invoice ┘        │                                               │
//! │                         │  one writer at a time; the rest sleep on      │
//! │                         │  busy_timeout, then retry the BEGIN           │
//! │                         ▼                                               │
//! │                   COMMIT / ROLLBACK                                     │
//! │                                                                         │
//! │  list / get ──────► WAL snapshot                            (reader)    │
//! │                     never blocked by the writer                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`Database`] is cheap to clone and is passed to whoever needs storage.
//! Nothing here is global.

use chrono::{FixedOffset, Offset, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::customer::CustomerRepository;
use crate::repository::sequence::SequenceRepository;
use crate::repository::transaction::TransactionRepository;
use crate::repository::user::UserRepository;

/// Offset used for the date part of PO and invoice codes unless configured.
pub const DEFAULT_UTC_OFFSET_SECS: i32 = 7 * 3600;

const MEMORY_PATH: &str = ":memory:";

// =============================================================================
// DbConfig
// =============================================================================

/// Settings for [`Database::new`].
///
/// ```rust,ignore
/// let config = DbConfig::new("./wako.db")
///     .max_connections(8)
///     .busy_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_path: PathBuf,

    /// Pool upper bound (5).
    pub max_connections: u32,

    /// Connections kept open while idle (1).
    pub min_connections: u32,

    /// How long a caller waits for a free pooled connection (30s).
    pub connect_timeout: Duration,

    /// Idle connections older than this are closed (10 min).
    pub idle_timeout: Duration,

    /// How long a writer sleeps on a locked database before failing (5s).
    pub busy_timeout: Duration,

    /// Apply embedded migrations after connecting (true).
    pub run_migrations: bool,

    /// Shop-local offset for the YY/MM/DD of generated codes (UTC+07:00).
    pub local_offset: FixedOffset,
}

fn default_offset() -> FixedOffset {
    FixedOffset::east_opt(DEFAULT_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

impl DbConfig {
    /// Settings for a database file, created on first connect.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
            local_offset: default_offset(),
        }
    }

    /// A private in-memory database.
    ///
    /// Every SQLite connection to `:memory:` sees its own empty database, so
    /// the pool is pinned to a single connection.
    pub fn in_memory() -> Self {
        DbConfig {
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            ..DbConfig::new(MEMORY_PATH)
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    pub fn local_offset(mut self, offset: FixedOffset) -> Self {
        self.local_offset = offset;
        self
    }

    fn is_memory(&self) -> bool {
        self.database_path.as_os_str() == MEMORY_PATH
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let url = format!("sqlite://{}?mode=rwc", self.database_path.display());

        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| DbError::Unavailable(format!("{url}: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(self.busy_timeout);

        // WAL needs a real file.
        let options = if self.is_memory() {
            options
        } else {
            options
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
        };

        Ok(options)
    }
}

// =============================================================================
// Database
// =============================================================================

/// Pool plus the settings repositories need.
///
/// ```rust,ignore
/// async fn list_transactions(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Transaction>>> {
///     let transactions = state.db.transactions().list().await?;
///     Ok(Json(transactions))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    local_offset: FixedOffset,
}

impl Database {
    /// Connects, then migrates unless `run_migrations` is off.
    ///
    /// Migration 001 seeds the `po_number` and `invoice_number` counters, so
    /// a freshly created file is ready to allocate.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            local_offset = %config.local_offset,
            "Opening database"
        );

        let options = config.connect_options()?;
        debug!(busy_timeout_ms = config.busy_timeout.as_millis() as u64, "Connect options ready");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(options)
            .await
            .map_err(|e| DbError::Unavailable(e.to_string()))?;

        info!(max_connections = config.max_connections, "Pool ready");

        let db = Database {
            pool,
            local_offset: config.local_offset,
        };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending embedded migrations; a no-op when up to date.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn local_offset(&self) -> FixedOffset {
        self.local_offset
    }

    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.pool.clone())
    }

    /// Direct counter access. Order creation and invoice issuance allocate
    /// inside their own units of work and do not go through this.
    pub fn sequences(&self) -> SequenceRepository {
        SequenceRepository::new(self.pool.clone())
    }

    pub fn transactions(&self) -> TransactionRepository {
        TransactionRepository::new(self.pool.clone(), self.local_offset)
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    /// Waits for checked-out connections to return, then closes the pool.
    pub async fn close(&self) {
        info!("Closing database pool");
        self.pool.close().await;
    }

    /// `true` when a trivial query round-trips.
    pub async fn health_check(&self) -> bool {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_database_is_healthy() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);

        db.close().await;
        assert!(!db.health_check().await);
    }

    #[test]
    fn test_builder_overrides() {
        let config = DbConfig::new("./wako.db")
            .max_connections(8)
            .busy_timeout(Duration::from_secs(10))
            .local_offset(FixedOffset::east_opt(0).unwrap());

        assert_eq!(config.max_connections, 8);
        assert_eq!(config.busy_timeout, Duration::from_secs(10));
        assert_eq!(config.local_offset.local_minus_utc(), 0);
        assert!(!config.is_memory());
    }

    #[test]
    fn test_memory_config_pins_one_connection() {
        let config = DbConfig::in_memory();
        assert!(config.is_memory());
        assert_eq!(config.max_connections, 1);
        assert_eq!(config.local_offset.local_minus_utc(), 7 * 3600);
    }

    #[tokio::test]
    async fn test_fresh_database_has_both_counters_at_zero() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let counters: Vec<(String, i64)> =
            sqlx::query_as("SELECT id, last_number FROM sequence_numbers ORDER BY id")
                .fetch_all(db.pool())
                .await
                .unwrap();

        assert_eq!(
            counters,
            vec![
                ("invoice_number".to_string(), 0),
                ("po_number".to_string(), 0)
            ]
        );
    }
}
