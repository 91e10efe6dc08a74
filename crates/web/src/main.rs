use std::{error::Error, sync::Arc};

use chrono::Utc;
use database::{PgTripStore, RedisBufferStore};
use feed::Feed;
use ingestion::{
    coordinator::Coordinator, dispatcher::Dispatcher, metrics::Metrics,
    tolerance::ToleranceControl,
};
use log::{error, info};
use tokio_util::sync::CancellationToken;
use web::{config::Config, start_web_server, WebState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = Config::from_env();

    // RUST_LOG wins over LOG_LEVEL
    let log_level = config.as_ref().map_or("info", |config| config.log_level.as_str());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .init();

    let config = config.map_err(|why| {
        error!("{}", why);
        why
    })?;
    info!(
        "Starting route ingestion: MQTT {}:{} (topic {}), tolerance {}.",
        config.feed.broker, config.feed.port, config.feed.topic, config.tolerance
    );

    // stores
    let buffer = RedisBufferStore::connect(&config.redis_url).await?;
    let trips = PgTripStore::connect(&config.database, &config.trips_table).await?;

    // ingestion
    let tolerance = ToleranceControl::new(config.tolerance);
    let metrics = Arc::new(Metrics::new());
    let dispatcher = Dispatcher::new(Coordinator::new(buffer, trips, &tolerance, metrics.clone()));

    let feed = Feed::connect(&config.feed).await?;

    // shutdown
    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl-C, shutting down.");
                    shutdown.cancel();
                }
                Err(why) => error!("Could not listen for Ctrl-C: {}", why),
            }
        }
    });

    // web server
    let web = tokio::spawn(start_web_server(
        WebState {
            tolerance,
            metrics,
            topic: config.feed.topic.clone(),
            started_at: Utc::now(),
        },
        config.web_address,
        shutdown.clone(),
    ));

    feed.run(dispatcher, shutdown.clone()).await;
    shutdown.cancel();
    web.await??;

    info!("Route ingestion stopped.");
    Ok(())
}
