use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use fifo_api::config::Config;
use fifo_api::{router, AppState, AppStateInner, ScoreSource};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = Config::parse();

    let scores = match ScoreSource::find_tablebase(&config.tablebase_paths()) {
        Some(source) => source,
        None => {
            info!("no tablebase found, solving in process");
            let scores = tokio::task::spawn_blocking(fifo_solver::compute_scores)
                .await
                .context("solver task panicked")?
                .context("solve failed")?;
            ScoreSource::Memory(scores)
        }
    };

    let state: AppState = Arc::new(AppStateInner::new(scores));
    let app = router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("FIFO API running on http://localhost:{}", config.port);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
