//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling using deadpool-postgres, and the
//! `LessonStore` implementation backed by it.

use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, PoolError, RecyclingMethod, Runtime};
use faculty_core::{LessonId, NewLesson, StoreError, StoreResult, Teacher};
use faculty_storage::LessonStore;
use std::time::Duration;
use tokio_postgres::NoTls;

use crate::constants::{
    DEFAULT_DB_HOST, DEFAULT_DB_NAME, DEFAULT_DB_POOL_SIZE, DEFAULT_DB_PORT, DEFAULT_DB_TIMEOUT,
    DEFAULT_DB_USER,
};
use crate::error::{ApiError, ApiResult};

/// Teacher of one lesson. The id parameter is declared `int8` so an `i64`
/// binds regardless of the column width.
const TEACHER_OF_LESSON_SQL: &str = "SELECT t.name, t.surname, t.degree \
     FROM t_lesson l \
     JOIN t_teacher t ON t.id = l.teacher_id \
     WHERE l.id = $1::int8";

const INSERT_LESSON_SQL: &str = "INSERT INTO t_lesson (name, teacher_id) VALUES ($1, $2::int8)";

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Connection timeout
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DB_HOST.to_string(),
            port: DEFAULT_DB_PORT,
            dbname: DEFAULT_DB_NAME.to_string(),
            user: DEFAULT_DB_USER.to_string(),
            password: "".to_string(),
            max_size: DEFAULT_DB_POOL_SIZE,
            timeout: DEFAULT_DB_TIMEOUT,
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("FACULTY_DB_HOST").unwrap_or_else(|_| DEFAULT_DB_HOST.to_string()),
            port: std::env::var("FACULTY_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_DB_PORT),
            dbname: std::env::var("FACULTY_DB_NAME").unwrap_or_else(|_| DEFAULT_DB_NAME.to_string()),
            user: std::env::var("FACULTY_DB_USER").unwrap_or_else(|_| DEFAULT_DB_USER.to_string()),
            password: std::env::var("FACULTY_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("FACULTY_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_DB_POOL_SIZE),
            timeout: std::env::var("FACULTY_DB_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_DB_TIMEOUT),
        }
    }

    /// Create a connection pool from this configuration.
    ///
    /// No connection is opened here; the first one is made on first use.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_cfg = PoolConfig::new(self.max_size);
        pool_cfg.timeouts.wait = Some(self.timeout);
        pool_cfg.timeouts.create = Some(self.timeout);
        cfg.pool = Some(pool_cfg);

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// DATABASE CLIENT WRAPPER
// ============================================================================

/// PostgreSQL-backed `LessonStore`.
#[derive(Clone)]
pub struct DbClient {
    pool: Pool,
    timeout: Duration,
}

impl DbClient {
    /// Create a new database client with the given pool.
    pub fn new(pool: Pool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Create a new database client from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool, config.timeout))
    }

    /// Get the current pool size for observability.
    pub fn pool_size(&self) -> usize {
        self.pool.status().size
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> StoreResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(|e| pool_error(e, self.timeout))
    }
}

fn pool_error(err: PoolError, waited: Duration) -> StoreError {
    tracing::error!(error = ?err, "Connection pool error");
    match err {
        PoolError::Timeout(_) => StoreError::Timeout { after: waited },
        PoolError::Closed => StoreError::Unavailable {
            reason: "Database connection pool is closed".to_string(),
        },
        other => StoreError::Unavailable {
            reason: format!("Failed to acquire database connection: {}", other),
        },
    }
}

fn query_error(err: tokio_postgres::Error) -> StoreError {
    tracing::error!(error = ?err, "Database error");
    if err.is_closed() {
        StoreError::Unavailable {
            reason: err.to_string(),
        }
    } else {
        StoreError::QueryFailed {
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl LessonStore for DbClient {
    async fn fetch_teacher_of_lesson(&self, lesson_id: LessonId) -> StoreResult<Teacher> {
        let conn = self.get_conn().await?;

        let row = conn
            .query_opt(TEACHER_OF_LESSON_SQL, &[&lesson_id.get()])
            .await
            .map_err(query_error)?
            .ok_or(StoreError::NotFound { lesson_id })?;

        Ok(Teacher {
            name: row.try_get(0).map_err(query_error)?,
            surname: row.try_get(1).map_err(query_error)?,
            degree: row.try_get(2).map_err(query_error)?,
        })
    }

    async fn create_lesson(&self, lesson: &NewLesson) -> StoreResult<()> {
        let conn = self.get_conn().await?;

        conn.execute(INSERT_LESSON_SQL, &[&lesson.name, &lesson.teacher_id.get()])
            .await
            .map_err(query_error)?;

        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        let conn = self.get_conn().await?;

        // Simple query to verify connectivity
        conn.query_one("SELECT 1", &[]).await.map_err(query_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DbConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.dbname, "postgres");
        assert_eq!(config.max_size, 16);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_lookup_query_joins_on_lesson_id() {
        assert!(TEACHER_OF_LESSON_SQL.contains("JOIN t_teacher t ON t.id = l.teacher_id"));
        assert!(TEACHER_OF_LESSON_SQL.ends_with("WHERE l.id = $1::int8"));
        assert!(INSERT_LESSON_SQL.starts_with("INSERT INTO t_lesson (name, teacher_id)"));
    }

    #[tokio::test]
    async fn test_pool_is_created_lazily() {
        let client = DbClient::from_config(&DbConfig::default()).expect("pool config is valid");
        assert_eq!(client.pool_size(), 0);
    }
}
