pub use crate::common::RouteResult;

use std::{net::SocketAddr, sync::Arc};

use axum::{extract::FromRef, routing::on, Router};
use chrono::{DateTime, Utc};
use common::{route_not_found, METHOD_FILTER_ALL};
use ingestion::{metrics::Metrics, tolerance::ToleranceControl};
use log::info;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod common;
pub mod config;

#[derive(Clone, FromRef)]
pub struct WebState {
    pub tolerance: ToleranceControl,
    pub metrics: Arc<Metrics>,
    /// The MQTT subscription, reported by the health endpoint.
    pub topic: String,
    pub started_at: DateTime<Utc>,
}

pub async fn start_web_server(
    state: WebState,
    address: SocketAddr,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let routes = Router::new()
        .nest_service("/api", api::routes(state))
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(address).await?;
    info!("Admin API listening on {}.", address);
    axum::serve(listener, routes.into_make_service())
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    info!("Admin API stopped.");
    Ok(())
}
