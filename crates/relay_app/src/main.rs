use std::future::IntoFuture;
use std::sync::Arc;

use anyhow::Context;
use engine_logging::{engine_info, LogDestination};
use log::LevelFilter;
use relay_app::config::AppConfig;
use relay_app::routes;
use relay_app::state::AppState;
use relay_app::users::UserStore;
use relay_engine::GraphPoster;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;

    let destination = match &config.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    };
    engine_logging::initialize(destination, LevelFilter::Info);
    engine_info!(
        "Provider {} (connect {:?}, request {:?}), users file {:?}",
        config.poster.api_base,
        config.poster.connect_timeout,
        config.poster.request_timeout,
        config.users_file
    );

    let poster = GraphPoster::new(config.poster.clone()).context("building provider client")?;
    let users = UserStore::open(&config.users_file)
        .with_context(|| format!("opening user store {:?}", config.users_file))?;
    if config.admin_key.is_none() {
        engine_info!("RELAY_ADMIN_KEY not set; admin routes are disabled");
    }

    let state = AppState::new(
        Arc::new(poster),
        users,
        config.admin_key.clone(),
        config.feed_capacity,
    );
    let runner = state.runner.clone();
    let app = routes::router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    engine_info!("Listening on {}", addr);

    // Open progress feeds never finish on their own, so shut down without draining.
    tokio::select! {
        result = axum::serve(listener, app).into_future() => result.context("server error")?,
        _ = tokio::signal::ctrl_c() => {
            engine_info!("Shutdown signal received");
            runner.stop();
        }
    }

    Ok(())
}
