use std::{error::Error, sync::Arc};

use async_trait::async_trait;
use ingestion::store::{self, TripStore};
use log::{debug, info};
use model::record::TripRecord;
use queries::convert_error;
use utility::env::{parse_or, var_or, EnvError};

pub mod buffer;
pub mod queries;

pub use buffer::RedisBufferStore;

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConnectionInfo {
    pub username: String,
    pub password: String,
    pub hostname: String,
    pub port: u16,
    pub database: String,
}

impl DatabaseConnectionInfo {
    pub fn from_lookup<L>(lookup: &L) -> Result<Self, EnvError>
    where
        L: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            username: var_or(lookup, "DATABASE_USER", "postgres"),
            password: var_or(lookup, "DATABASE_PASSWORD", "postgres"),
            hostname: var_or(lookup, "DATABASE_HOST", "127.0.0.1"),
            port: parse_or(lookup, "DATABASE_PORT", 5432)?,
            database: var_or(
                lookup,
                "DATABASE_NAME",
                "distributed_gps_route_tracking_system",
            ),
        })
    }

    pub fn postgres_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.hostname, self.port, self.database
        )
    }
}

/// Completed trips, one row each, in a PostgreSQL table.
#[derive(Clone)]
pub struct PgTripStore {
    connection: sqlx::PgPool,
    table: Arc<str>,
}

impl PgTripStore {
    /// Connects and creates `table` if it does not exist yet.
    pub async fn connect(
        database_connection_info: &DatabaseConnectionInfo,
        table: &str,
    ) -> Result<Self, Box<dyn Error + Send + Sync>> {
        if !queries::is_valid_table_name(table) {
            return Err(format!("invalid trips table name {:?}", table).into());
        }
        let url = database_connection_info.postgres_url();
        let pool = sqlx::postgres::PgPool::connect(&url).await?;

        queries::trip::create_table(&pool, table).await?;
        info!(
            "Connected to database {} on {}:{}, storing trips in {}.",
            database_connection_info.database,
            database_connection_info.hostname,
            database_connection_info.port,
            table
        );

        Ok(Self {
            connection: pool,
            table: table.into(),
        })
    }
}

#[async_trait]
impl TripStore for PgTripStore {
    async fn insert(&self, record: &TripRecord) -> store::Result<()> {
        let id = queries::trip::insert(&self.connection, &self.table, record)
            .await
            .map_err(convert_error)?;
        debug!(
            "Inserted trip {}:{} as row {}.",
            record.driver_id, record.current_route_id, id
        );
        Ok(())
    }
}
