use santi_cache_contracts::CacheService;
use santi_config::Config;
use tracing::{info, warn};

use crate::{
    cache, email,
    environment::{ConfigProvider, Provider},
};

pub async fn serve(config: Config) -> anyhow::Result<()> {
    info!(environment = %config.environment, "Starting LA SANTI Gomme website");

    let cache = cache::connect(&config.cache).await?;
    cache.ping().await?;
    info!(kind = cache.kind(), "Rate limit counters ready");
    let _purge_task = cache.spawn_purge_task(config.cache.purge_interval.into());

    let email = email::connect(&config.email)?;

    let index = config.http.static_dir.join("index.html");
    if !index.is_file() {
        warn!(path = %index.display(), "Website entry point is missing");
    }

    let config_provider = ConfigProvider::new(&config);
    let server = Provider::new(config_provider, cache, email).rest_server();
    info!(
        recipient = %config.contact.email,
        "Starting http server on {}:{}",
        config.http.host,
        config.http.port
    );
    server.serve(config.http.host, config.http.port).await
}
