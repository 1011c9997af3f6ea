use anyhow::Context;
use shootdesk::{
    config::Config,
    db::{self, SqliteStore},
    overlay::Overlay,
    state::AppState,
    store::{FixtureError, ScheduleStore},
};
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn load_fixtures(path: &Path) -> anyhow::Result<ScheduleStore> {
    match ScheduleStore::load(path).await {
        Ok(store) => Ok(store),
        Err(FixtureError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "no fixture file, starting with an empty schedule");
            Ok(ScheduleStore::default())
        }
        Err(e) => Err(e).context("failed to load schedule fixtures"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shootdesk=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(addr = %config.addr(), database_url = %config.database_url, "loaded configuration");

    let pool = db::connect(&config.database_url, config.max_connections)
        .await
        .context("failed to connect to db")?;
    db::create_schema(&pool)
        .await
        .context("failed to create overlay table")?;

    let store = load_fixtures(&config.fixtures_path).await?;
    let overlay = Overlay::new(SqliteStore::new(pool));

    let addr = config.addr();
    let app = shootdesk::router(AppState::new(store, overlay, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
