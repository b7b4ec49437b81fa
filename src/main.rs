mod api;
mod config;
mod models;
mod services;
mod sources;

use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{create_rest_router, AppState, TableView};
use config::Config;
use services::{PairCache, PairPipeline, ViewParams};
use sources::meteora::MeteoraDlmm;

#[tokio::main(worker_threads = 2)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,dlmm_viewer=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load_or_default()?;
    let defaults = ViewParams::from_config(&config.view)?;
    tracing::info!("✓ Configuration loaded");

    let source = Arc::new(MeteoraDlmm::new(&config.api)?);
    let cache = Arc::new(PairCache::new(config.cache.ttl_secs));
    let pipeline = Arc::new(PairPipeline::new(source, cache));

    // --once: print one table and exit
    if args.contains(&"--once".to_string()) || args.contains(&"-o".to_string()) {
        let output = pipeline.run(defaults).await;
        let view = TableView::build(&output, None, &config.view.columns);
        println!("{}", view.render_text());
        return Ok(());
    }

    let state = Arc::new(AppState {
        pipeline,
        view: config.view.clone(),
    });

    let app = create_rest_router(state).layer(CorsLayer::permissive());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(
        "✓ Server ready on http://{} (period {}, target ${}, min liquidity ${})",
        addr, defaults.period, defaults.target_liquidity, defaults.min_liquidity
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
