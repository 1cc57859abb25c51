use std::{
    net::{IpAddr, SocketAddr},
    sync::{Arc, Mutex},
};

use anyhow::Context;
use axum::{extract::State, http::HeaderMap, http::StatusCode, routing, Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::info;
use uuid::Uuid;

pub const EMAILS_ROUTE: &str = "/emails";

/// An email accepted by the testing server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
    #[serde(default)]
    pub reply_to: Option<String>,
}

/// Emails accepted by the testing server, in the order they were received.
#[derive(Debug, Clone, Default)]
pub struct Mailbox(Arc<Mutex<Vec<ReceivedEmail>>>);

impl Mailbox {
    pub fn emails(&self) -> Vec<ReceivedEmail> {
        self.0.lock().map(|x| x.clone()).unwrap_or_default()
    }

    fn push(&self, email: ReceivedEmail) {
        if let Ok(mut emails) = self.0.lock() {
            emails.push(email);
        }
    }
}

pub async fn start_server(host: IpAddr, port: u16, api_key: String) -> anyhow::Result<()> {
    info!("Starting resend testing server on {host}:{port}");
    info!("Resend emails endpoint: http://{host}:{port}{EMAILS_ROUTE}");
    info!("API key: {api_key:?}");

    let listener = TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind to {host}:{port}"))?;
    axum::serve(listener, router(api_key, Mailbox::default()))
        .await
        .context("Failed to start HTTP server")
}

/// Starts the testing server on a random local port in the background.
pub async fn spawn(api_key: impl Into<String>) -> anyhow::Result<(SocketAddr, Mailbox)> {
    let mailbox = Mailbox::default();
    let listener = TcpListener::bind((IpAddr::from([127, 0, 0, 1]), 0))
        .await
        .context("Failed to bind to local port")?;
    let addr = listener.local_addr()?;

    let router = router(api_key.into(), mailbox.clone());
    tokio::spawn(async move { axum::serve(listener, router).await });

    Ok((addr, mailbox))
}

pub fn router(api_key: String, mailbox: Mailbox) -> Router<()> {
    Router::new()
        .route(EMAILS_ROUTE, routing::post(send_email))
        .with_state(ResendState {
            api_key: api_key.into(),
            mailbox,
        })
}

#[derive(Clone)]
struct ResendState {
    api_key: Arc<str>,
    mailbox: Mailbox,
}

#[derive(Serialize)]
struct SendEmailResponse {
    id: Uuid,
}

#[derive(Serialize)]
struct ErrorResponse {
    #[serde(rename = "statusCode")]
    status_code: u16,
    name: &'static str,
    message: &'static str,
}

async fn send_email(
    State(state): State<ResendState>,
    headers: HeaderMap,
    Json(email): Json<ReceivedEmail>,
) -> Result<Json<SendEmailResponse>, (StatusCode, Json<ErrorResponse>)> {
    let token = headers
        .get("authorization")
        .and_then(|x| x.to_str().ok())
        .and_then(|x| x.strip_prefix("Bearer "));

    let error = |status: StatusCode, name, message| {
        Err((
            status,
            Json(ErrorResponse {
                status_code: status.as_u16(),
                name,
                message,
            }),
        ))
    };

    match token {
        None => {
            return error(
                StatusCode::UNAUTHORIZED,
                "missing_api_key",
                "Missing API key in the authorization header",
            )
        }
        Some(token) if *token != *state.api_key => {
            return error(StatusCode::FORBIDDEN, "invalid_api_key", "API key is invalid")
        }
        Some(_) => {}
    }

    if email.to.is_empty() {
        return error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "validation_error",
            "Missing `to` field",
        );
    }

    info!(subject = email.subject, "received email");
    state.mailbox.push(email);

    Ok(Json(SendEmailResponse {
        id: Uuid::now_v7(),
    }))
}
