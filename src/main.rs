use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use realm_sim::catalog::Catalog;
use realm_sim::config::EngineConfig;
use realm_sim::db::{PgWorldStore, migrate};
use realm_sim::engine::{Realms, Services};
use realm_sim::service::{
    ChannelBroadcaster, FileStore, MemoryStore, OpenAiCompatClient, SilentCompletion, TextCompletion, WorldStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("realm_sim=info".parse()?))
        .init();

    let config = EngineConfig::from_env()?;
    let catalog = match &config.catalog_path {
        Some(path) => Catalog::from_path(path)?,
        None => Catalog::builtin(),
    };
    catalog.validate()?;

    let store: Arc<dyn WorldStore> = if let Some(url) = &config.database_url {
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await?;
        migrate(&pool).await?;
        info!("using postgres snapshot store");
        Arc::new(PgWorldStore::new(pool))
    } else if let Some(dir) = &config.snapshot_dir {
        info!(dir = %dir.display(), "using file snapshot store");
        Arc::new(FileStore::new(dir))
    } else {
        warn!("no DATABASE_URL or REALM_SNAPSHOT_DIR; worlds will not survive a restart");
        Arc::new(MemoryStore::new())
    };

    let completion: Arc<dyn TextCompletion> = match &config.completion.api_key {
        Some(key) => Arc::new(OpenAiCompatClient::new(key, &config.completion)),
        None => {
            warn!("no completion API key; rulers will stay silent");
            Arc::new(SilentCompletion)
        }
    };

    let services = Services {
        completion,
        store,
        broadcaster: Arc::new(ChannelBroadcaster::new()),
        completion_timeout: config.completion.timeout,
    };
    let realms = Realms::new(config.clone(), Arc::new(catalog), services);
    let handle = realms.open(&config.realm).await;
    info!(realm = %handle.realm(), "realm running; ctrl-c to stop");

    tokio::signal::ctrl_c().await?;
    drop(handle);
    realms.shutdown().await;
    Ok(())
}
