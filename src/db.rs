pub mod query_builder;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use metrics::{counter, gauge, histogram};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, DbBackend,
    DbErr, FromQueryResult, Statement, Value,
};
use sea_orm_migration::MigratorTrait;
use std::borrow::Cow;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

pub use query_builder::PartialUpdate;

/// Type alias for a database connection pool
pub type DbPool = DatabaseConnection;

/// Configuration for database connection
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Minimum number of connections
    pub min_connections: u32,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Idle timeout duration
    pub idle_timeout: Duration,
    /// Acquire connection timeout
    pub acquire_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            acquire_timeout: Duration::from_secs(8),
        }
    }
}

impl From<&AppConfig> for DbConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            url: cfg.database_url.clone(),
            max_connections: cfg.db_max_connections,
            min_connections: cfg.db_min_connections,
            connect_timeout: Duration::from_secs(cfg.db_connect_timeout_secs),
            idle_timeout: Duration::from_secs(cfg.db_idle_timeout_secs),
            acquire_timeout: Duration::from_secs(cfg.db_acquire_timeout_secs),
        }
    }
}

/// Establishes a connection pool to the database with custom configuration
///
/// # Errors
/// Returns a `ServiceError` if the connection cannot be established
pub async fn establish_connection_with_config(config: &DbConfig) -> Result<DbPool, ServiceError> {
    debug!("Configuring database connection with: {:?}", config);

    let mut opt = ConnectOptions::new(config.url.clone());
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .sqlx_logging(false);

    gauge!("granja_db.max_connections", config.max_connections as f64);

    info!(
        "Connecting to database with max_connections={}",
        config.max_connections
    );

    let db_pool = Database::connect(opt).await.map_err(|e| {
        error!("Database connection establishment failed: {}", e);
        ServiceError::DatabaseError(e)
    })?;

    info!("Database connection pool established successfully");
    Ok(db_pool)
}

/// Establish DB pool using AppConfig tuning
pub async fn establish_connection_from_app_config(cfg: &AppConfig) -> Result<DbPool, ServiceError> {
    let db_cfg: DbConfig = cfg.into();
    establish_connection_with_config(&db_cfg).await
}

/// Runs the embedded schema migrations
pub async fn run_migrations(pool: &DbPool) -> Result<(), ServiceError> {
    info!("Running database migrations");
    let start = Instant::now();

    let result = crate::migrator::Migrator::up(pool, None)
        .await
        .map_err(ServiceError::DatabaseError);

    let elapsed = start.elapsed();
    match &result {
        Ok(_) => info!("Database migrations completed successfully in {:?}", elapsed),
        Err(e) => error!("Database migrations failed after {:?}: {}", elapsed, e),
    }

    result
}

/// Checks if the database connection is active
pub async fn check_connection(pool: &DbPool) -> Result<(), ServiceError> {
    let start = Instant::now();
    let result = pool.ping().await.map_err(ServiceError::DatabaseError);

    let elapsed = start.elapsed();
    match &result {
        Ok(_) => {
            debug!("Database connection check successful in {:?}", elapsed);
            gauge!("granja_db.connection_latency", elapsed.as_millis() as f64);
        }
        Err(e) => {
            error!("Database connection check failed after {:?}: {}", elapsed, e);
            counter!("granja_db.connection_failures", 1);
        }
    }

    result
}

/// Closes the database connection pool
pub async fn close_pool(pool: DbPool) -> Result<(), ServiceError> {
    info!("Closing database connection pool");
    pool.close().await.map_err(ServiceError::DatabaseError)
}

/// Rewrites `?` placeholders into the numbered `$n` form PostgreSQL expects.
///
/// Question marks inside single-quoted literals are left alone. Other backends get the
/// SQL back untouched.
pub fn bind_placeholders(backend: DbBackend, sql: &str) -> Cow<'_, str> {
    if backend != DbBackend::Postgres || !sql.contains('?') {
        return Cow::Borrowed(sql);
    }

    let mut out = String::with_capacity(sql.len() + 8);
    let mut n = 0;
    let mut in_literal = false;
    for ch in sql.chars() {
        match ch {
            '\'' => {
                in_literal = !in_literal;
                out.push(ch);
            }
            '?' if !in_literal => {
                n += 1;
                out.push('$');
                out.push_str(&n.to_string());
            }
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// Builds a parameterized statement for whatever backend `conn` talks to.
pub fn statement<C>(conn: &C, sql: &str, values: Vec<Value>) -> Statement
where
    C: ConnectionTrait,
{
    let backend = conn.get_database_backend();
    Statement::from_sql_and_values(backend, bind_placeholders(backend, sql), values)
}

/// Runs a query and maps every row into `T`.
pub async fn query_all<T, C>(conn: &C, sql: &str, values: Vec<Value>) -> Result<Vec<T>, DbErr>
where
    T: FromQueryResult,
    C: ConnectionTrait,
{
    let start = Instant::now();
    let rows = T::find_by_statement(statement(conn, sql, values))
        .all(conn)
        .await
        .map_err(|e| {
            counter!("granja_db.query.error", 1);
            e
        })?;
    histogram!("granja_db.query.duration", start.elapsed());
    Ok(rows)
}

/// Runs a query expected to produce at most one row.
pub async fn query_one<T, C>(conn: &C, sql: &str, values: Vec<Value>) -> Result<Option<T>, DbErr>
where
    T: FromQueryResult,
    C: ConnectionTrait,
{
    T::find_by_statement(statement(conn, sql, values))
        .one(conn)
        .await
        .map_err(|e| {
            counter!("granja_db.query.error", 1);
            e
        })
}

/// Executes a statement and returns the number of affected rows.
pub async fn execute<C>(conn: &C, sql: &str, values: Vec<Value>) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    let result = conn.execute(statement(conn, sql, values)).await.map_err(|e| {
        counter!("granja_db.query.error", 1);
        e
    })?;
    Ok(result.rows_affected())
}

/// Executes an `INSERT ... RETURNING <id_column>` and yields the generated key.
pub async fn insert_returning_id<C>(
    conn: &C,
    sql: &str,
    values: Vec<Value>,
    id_column: &str,
) -> Result<i64, DbErr>
where
    C: ConnectionTrait,
{
    let row = conn
        .query_one(statement(conn, sql, values))
        .await?
        .ok_or_else(|| DbErr::RecordNotInserted)?;
    row.try_get::<i64>("", id_column)
}

/// Commits a transaction, recording the outcome.
pub async fn commit(txn: DatabaseTransaction, operation: &'static str) -> Result<(), ServiceError> {
    match txn.commit().await {
        Ok(()) => {
            counter!("granja_db.transaction.committed", 1, "operation" => operation);
            debug!(operation, "Transaction committed");
            Ok(())
        }
        Err(e) => {
            counter!("granja_db.transaction.failed", 1, "operation" => operation);
            error!(operation, error = %e, "Transaction commit failed");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postgres_placeholders_are_numbered() {
        let sql = "UPDATE stock SET cantidad_disponible = cantidad_disponible + ? WHERE id_producto = ? AND cantidad_disponible + ? >= 0";
        assert_eq!(
            bind_placeholders(DbBackend::Postgres, sql),
            "UPDATE stock SET cantidad_disponible = cantidad_disponible + $1 WHERE id_producto = $2 AND cantidad_disponible + $3 >= 0"
        );
    }

    #[test]
    fn sqlite_placeholders_untouched() {
        let sql = "SELECT * FROM ventas WHERE id_venta = ?";
        assert!(matches!(
            bind_placeholders(DbBackend::Sqlite, sql),
            Cow::Borrowed(s) if s == sql
        ));
    }

    #[test]
    fn literals_keep_their_question_marks() {
        let sql = "SELECT '¿huevos?' AS tipo, id_detalle FROM detalle_huevos WHERE id_venta = ?";
        assert_eq!(
            bind_placeholders(DbBackend::Postgres, sql),
            "SELECT '¿huevos?' AS tipo, id_detalle FROM detalle_huevos WHERE id_venta = $1"
        );
    }
}
