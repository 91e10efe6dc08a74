use model::record::TripRecord;
use sqlx::{types::Json, Executor, Postgres};

pub async fn create_table<'c, E>(executor: E, table: &str) -> Result<(), sqlx::Error>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query(
        format!(
            "
            CREATE TABLE IF NOT EXISTS {}(
                id BIGSERIAL PRIMARY KEY,
                driver_id TEXT NOT NULL,
                current_route_id TEXT NOT NULL,
                simplified_route JSONB NOT NULL,
                timestamp BIGINT NOT NULL,
                original_points_count BIGINT NOT NULL,
                simplified_points_count BIGINT NOT NULL,
                compression_ratio DOUBLE PRECISION NOT NULL,
                reduction_percent DOUBLE PRECISION NOT NULL,
                processed_at TIMESTAMPTZ NOT NULL
            );
            ",
            table
        )
        .as_ref(),
    )
    .execute(executor)
    .await
    .map(|_| ())
}

/// Returns the id of the new row.
pub async fn insert<'c, E>(
    executor: E,
    table: &str,
    record: &TripRecord,
) -> Result<i64, sqlx::Error>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_scalar(
        format!(
            "
            INSERT INTO {}(
                driver_id,
                current_route_id,
                simplified_route,
                timestamp,
                original_points_count,
                simplified_points_count,
                compression_ratio,
                reduction_percent,
                processed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id;
            ",
            table
        )
        .as_ref(),
    )
    .bind(&record.driver_id)
    .bind(&record.current_route_id)
    .bind(Json(&record.simplified_route))
    .bind(record.timestamp)
    .bind(record.original_points_count)
    .bind(record.simplified_points_count)
    .bind(record.compression_ratio)
    .bind(record.reduction_percent)
    .bind(record.processed_at)
    .fetch_one(executor)
    .await
}
