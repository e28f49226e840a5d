pub mod filter;
pub mod seed;
pub mod table;

pub use seed::seed_data;
pub use table::Table;

use std::env;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteRow};
use sqlx::{Column, Row, SqlitePool};
use thiserror::Error;

/// Failure taxonomy at the executor boundary. Both kinds collapse to an
/// empty table; the distinction only drives logging and notification text.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("data source unreachable: {0}")]
    Connect(sqlx::Error),
    #[error("query failed: {0}")]
    Query(sqlx::Error),
}

impl From<sqlx::Error> for ExecError {
    fn from(source: sqlx::Error) -> Self {
        match source {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Configuration(_) => ExecError::Connect(source),
            _ => ExecError::Query(source),
        }
    }
}

/// Collaborator that carries human-readable failure notices to the
/// display layer. The default sink only logs.
pub trait ErrorSink: Send + Sync {
    fn notify(&self, message: &str);
}

pub struct LogSink;

impl ErrorSink for LogSink {
    fn notify(&self, message: &str) {
        tracing::error!("database error: {}", message);
    }
}

pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    // Strip the "sqlite:" prefix to get the file path, create parent dir if needed
    let file_path = database_url
        .strip_prefix("sqlite:///")
        .or_else(|| database_url.strip_prefix("sqlite://"))
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);

    if let Some(parent) = std::path::Path::new(file_path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.ok();
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = SqlitePool::connect_with(options).await?;
    Ok(pool)
}

/// Pool from the DATABASE_URL env var, for CLI paths without settings.
pub async fn create_pool_from_env() -> Result<SqlitePool> {
    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:data/pitchboard.db".to_string());
    create_pool(&database_url).await
}

/// Read-only query executor over the shared pool.
///
/// Execution failures never propagate: they are classified, logged,
/// pushed to the sink, and returned as an empty table so the caller
/// always receives a well-defined "no data" result.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    sink: Arc<dyn ErrorSink>,
}

impl Database {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_sink(pool, Arc::new(LogSink))
    }

    pub fn with_sink(pool: SqlitePool, sink: Arc<dyn ErrorSink>) -> Self {
        Self { pool, sink }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn fetch_table(&self, sql: &str, params: &[String]) -> Table {
        match self.try_fetch(sql, params).await {
            Ok(table) => table,
            Err(e) => {
                tracing::error!("query execution failed: {}", e);
                self.sink.notify(&e.to_string());
                Table::default()
            }
        }
    }

    async fn try_fetch(&self, sql: &str, params: &[String]) -> Result<Table, ExecError> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = query.bind(param);
        }

        let rows = query.fetch_all(&self.pool).await?;
        tracing::debug!("query returned {} rows", rows.len());

        let Some(first) = rows.first() else {
            return Ok(Table::default());
        };

        let names: Vec<String> = first.columns().iter().map(|c| c.name().to_string()).collect();
        let mut table = Table::new(names.clone());
        for row in &rows {
            let cells = (0..names.len()).map(|idx| cell_value(row, idx)).collect();
            table.push_row(cells);
        }
        Ok(table)
    }

    /// Connectivity probe: a trivial statement against the data source.
    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok()
    }
}

/// Decode one cell into JSON. SQLite values are dynamically typed, so
/// decoding cascades integer, float, text and falls back to NULL.
fn cell_value(row: &SqliteRow, idx: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
        return v
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return v.map(Value::String).unwrap_or(Value::Null);
    }
    Value::Null
}

/// Called from the CLI where no pool exists yet.
pub async fn init_database() -> Result<()> {
    let pool = create_pool_from_env().await?;
    init_database_with_pool(&pool).await
}

/// Called from the server so schema creation shares the main pool.
pub async fn init_database_with_pool(pool: &SqlitePool) -> Result<()> {
    // Historical match facts, loaded by the upstream pipeline
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS match_results (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            league TEXT NOT NULL,
            season TEXT NOT NULL,
            game_date TEXT NOT NULL,
            home_team TEXT NOT NULL,
            away_team TEXT NOT NULL,
            home_goals INTEGER,
            away_goals INTEGER,
            home_shots INTEGER,
            away_shots INTEGER,
            result TEXT,
            avg_home_odds REAL,
            avg_draw_odds REAL,
            avg_away_odds REAL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Upstream model output, versioned by session batch
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS predictions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id INTEGER NOT NULL,
            model TEXT NOT NULL,
            game_date TEXT NOT NULL,
            game_time TEXT NOT NULL,
            league TEXT NOT NULL,
            home_team TEXT NOT NULL,
            away_team TEXT NOT NULL,
            predicted_result TEXT NOT NULL,
            confidence REAL NOT NULL,
            draw_probability REAL NOT NULL DEFAULT 0,
            avg_home_odds REAL,
            avg_draw_odds REAL,
            avg_away_odds REAL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS team_statistics (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            team TEXT NOT NULL,
            league TEXT NOT NULL,
            season TEXT NOT NULL,
            league_rank INTEGER,
            total_points INTEGER,
            total_games_played INTEGER,
            total_goals_scored INTEGER,
            total_goals_conceded INTEGER,
            last_5_games TEXT,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS team_locations (
            team TEXT PRIMARY KEY,
            stadium TEXT,
            city TEXT,
            country TEXT,
            latitude REAL,
            longitude REAL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_match_results_date ON match_results(game_date)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_match_results_league_season ON match_results(league, season)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_predictions_session ON predictions(session_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_team_statistics_season ON team_statistics(league, season)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Database initialized successfully");
    Ok(())
}

/// In-memory database with the full schema, shared by query-level tests.
#[cfg(test)]
pub(crate) async fn memory_database() -> Database {
    use sqlx::sqlite::SqlitePoolOptions;

    // Single connection: each in-memory connection is its own database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    init_database_with_pool(&pool).await.expect("schema init");
    Database::new(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_table_materializes_rows() {
        let db = memory_database().await;
        sqlx::query(
            "INSERT INTO team_locations (team, stadium, city, country, latitude, longitude)
             VALUES ('Arsenal', 'Emirates Stadium', 'London', 'England', 51.555, -0.1086)",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let table = db
            .fetch_table("SELECT team, latitude FROM team_locations", &[])
            .await;
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.get_str(0, "team"), "Arsenal");
        assert_eq!(table.get_f64(0, "latitude"), Some(51.555));
    }

    #[tokio::test]
    async fn test_fetch_table_binds_params_positionally() {
        let db = memory_database().await;
        for team in ["Arsenal", "Chelsea"] {
            sqlx::query("INSERT INTO team_locations (team) VALUES (?)")
                .bind(team)
                .execute(db.pool())
                .await
                .unwrap();
        }

        let table = db
            .fetch_table(
                "SELECT team FROM team_locations WHERE team = ?",
                &["Chelsea".to_string()],
            )
            .await;
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.get_str(0, "team"), "Chelsea");
    }

    #[tokio::test]
    async fn test_bad_query_returns_empty_table() {
        let db = memory_database().await;
        let table = db.fetch_table("SELECT nope FROM no_such_table", &[]).await;
        assert!(table.is_empty());

        let table = db
            .fetch_table("SELECT no_such_column FROM match_results", &[])
            .await;
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_ping() {
        let db = memory_database().await;
        assert!(db.ping().await);
    }
}
