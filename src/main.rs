use anyhow::Result;
use std::env;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber;

mod config;
mod index;
mod repo;
mod server;

use config::settings::Settings;
use index::build::IndexBuilder;
use repo::scan::scan_repository;

const DEFAULT_SETTINGS_FILE: &str = "./aptdex.toml";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    info!("Starting aptdex");

    let settings_file = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS_FILE.to_string());
    let settings = Settings::load(&settings_file)?;

    let files = scan_repository(&settings.repository.dists);
    let snapshot = IndexBuilder::new(&settings.url.info, &settings.url.repo).build(&files);

    let routes = server::router::build_routes(Arc::new(snapshot));

    info!("Server listening on {}", settings.server.bind);

    warp::serve(routes).run(settings.server.bind).await;

    Ok(())
}
