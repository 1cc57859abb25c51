use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    sync::Arc,
};

use anyhow::Context;
use axum::{extract::DefaultBodyLimit, Router};
use santi_core_contact_contracts::ContactFeatureService;
use santi_core_health_contracts::HealthFeatureService;
use santi_models::environment::Environment;
use santi_shared_contracts::rate_limit::{RateLimitPolicy, RateLimitService};
use tokio::net::TcpListener;
use tracing::info;

use crate::middlewares::{
    client_ip, panic_handler, rate_limit, request_id, security_headers, trace,
};

mod errors;
mod extractors;
mod middlewares;
mod models;
mod routes;

#[derive(Debug, Clone)]
pub struct RestServer<Health, Contact, RateLimit> {
    health: Health,
    contact: Contact,
    rate_limit: RateLimit,
    config: RestServerConfig,
}

#[derive(Debug, Clone)]
pub struct RestServerConfig {
    pub environment: Environment,
    /// Root directory of the website.
    pub static_dir: PathBuf,
    /// Maximum size of a request body in bytes.
    pub body_limit: usize,
    pub real_ip_config: Option<Arc<RestServerRealIpConfig>>,
    /// Limit applied to every request, including static files.
    pub rate_limit: RateLimitPolicy,
}

#[derive(Debug)]
pub struct RestServerRealIpConfig {
    pub header: String,
    /// Only trust the header on connections from this address. If unset, the
    /// header is trusted on every connection.
    pub set_from: Option<IpAddr>,
}

impl<Health, Contact, RateLimit> RestServer<Health, Contact, RateLimit>
where
    Health: HealthFeatureService,
    Contact: ContactFeatureService,
    RateLimit: RateLimitService,
{
    pub fn new(
        health: Health,
        contact: Contact,
        rate_limit: RateLimit,
        config: RestServerConfig,
    ) -> Self {
        Self {
            health,
            contact,
            rate_limit,
            config,
        }
    }

    pub async fn serve(self, host: IpAddr, port: u16) -> anyhow::Result<()> {
        let router = self.router();
        let listener = TcpListener::bind((host, port))
            .await
            .with_context(|| format!("Failed to bind to {host}:{port}"))?;

        info!("Listening on http://{}", listener.local_addr()?);

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Failed to run http server")
    }

    /// Requests must carry the [`ConnectInfo`](axum::extract::ConnectInfo)
    /// of the client.
    pub fn router(self) -> Router<()> {
        let Self {
            health,
            contact,
            rate_limit,
            config,
        } = self;

        let router = Router::new()
            .merge(routes::health::router(health.into()))
            .merge(routes::contact::router(contact.into()))
            .merge(routes::fallback::router(
                &config.static_dir,
                config.environment,
            ))
            .layer(DefaultBodyLimit::max(config.body_limit));

        let router = panic_handler::add(router);
        let router = rate_limit::add(rate_limit.into(), config.rate_limit)(router);
        let router = security_headers::add(config.environment)(router);
        let router = trace::add(router);
        let router = client_ip::add(config.real_ip_config)(router);
        request_id::add(router)
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutting down http server");
}
