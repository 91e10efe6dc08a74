use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, on},
    Json, Router,
};
use chrono::{DateTime, Utc};
use ingestion::metrics::MetricsSnapshot;
use log::info;
use model::message::DriverLocationMessage;
use reduction::Tolerance;
use serde::{Deserialize, Serialize};

use crate::{
    common::{route_not_found, schema, RouteErrorResponse, METHOD_FILTER_ALL},
    RouteResult, WebState,
};

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/tolerance", get(get_tolerance).put(put_tolerance))
        .route("/messages/schema", get(schema::<DriverLocationMessage>))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthDto {
    pub status: &'static str,
    pub topic: String,
    pub tolerance: Tolerance,
    pub active_trips: usize,
    pub started_at: DateTime<Utc>,
    pub uptime_secs: i64,
}

pub(crate) async fn health(State(state): State<WebState>) -> Json<HealthDto> {
    let snapshot = state.metrics.snapshot();
    Json(HealthDto {
        status: "ok",
        topic: state.topic.clone(),
        tolerance: state.tolerance.get(),
        active_trips: snapshot.active_trips,
        started_at: state.started_at,
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
    })
}

pub(crate) async fn metrics(State(state): State<WebState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToleranceDto {
    pub tolerance: f64,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToleranceChangeDto {
    pub tolerance: Tolerance,
    pub previous: Option<Tolerance>,
}

pub(crate) async fn get_tolerance(State(state): State<WebState>) -> Json<ToleranceChangeDto> {
    Json(ToleranceChangeDto {
        tolerance: state.tolerance.get(),
        previous: None,
    })
}

/// Applies to reductions started after the response.
pub(crate) async fn put_tolerance(
    State(state): State<WebState>,
    body: Result<Json<ToleranceDto>, JsonRejection>,
) -> RouteResult<Json<ToleranceChangeDto>> {
    let Json(ToleranceDto { tolerance }) = body.map_err(|why| {
        RouteErrorResponse::new(why.status())
            .with_default_message()
            .with_detailed_information(why.body_text())
    })?;
    let tolerance = Tolerance::new(tolerance)?;
    let previous = state.tolerance.set(tolerance);
    info!("Route tolerance set to {} through the admin API.", tolerance);
    Ok(Json(ToleranceChangeDto {
        tolerance,
        previous: Some(previous),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use ingestion::{metrics::Metrics, tolerance::ToleranceControl};

    use super::*;

    fn state() -> WebState {
        WebState {
            tolerance: ToleranceControl::default(),
            metrics: Arc::new(Metrics::new()),
            topic: "drivers_location/#".to_string(),
            started_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn health_reports_configuration() {
        let state = state();
        state.metrics.set_active_trips(2);

        let Json(health) = health(State(state)).await;

        assert_eq!(health.status, "ok");
        assert_eq!(health.topic, "drivers_location/#");
        assert_eq!(health.tolerance, Tolerance::DEFAULT);
        assert_eq!(health.active_trips, 2);
        assert!(health.uptime_secs >= 0);
    }

    #[tokio::test]
    async fn metrics_snapshot() {
        let state = state();
        state.metrics.message_processed();
        state.metrics.message_rejected();

        let Json(snapshot) = metrics(State(state)).await;

        assert_eq!(snapshot.messages_processed, 1);
        assert_eq!(snapshot.messages_rejected, 1);
    }

    #[tokio::test]
    async fn tolerance_can_be_changed() {
        let state = state();

        let Json(change) = put_tolerance(
            State(state.clone()),
            Ok(Json(ToleranceDto { tolerance: 0.001 })),
        )
        .await
        .unwrap();

        assert_eq!(change.tolerance.value(), 0.001);
        assert_eq!(change.previous, Some(Tolerance::DEFAULT));
        let Json(current) = get_tolerance(State(state)).await;
        assert_eq!(current.tolerance.value(), 0.001);
        assert_eq!(
            serde_json::to_value(&current).unwrap(),
            serde_json::json!({ "tolerance": 0.001 })
        );
    }

    #[tokio::test]
    async fn negative_tolerance_is_rejected() {
        let state = state();

        let error = put_tolerance(
            State(state.clone()),
            Ok(Json(ToleranceDto { tolerance: -0.5 })),
        )
        .await
        .unwrap_err();

        assert_eq!(error.status_code, StatusCode::BAD_REQUEST);
        assert_eq!(state.tolerance.get(), Tolerance::DEFAULT);
    }
}
