//! HTTP shell over the session registry
//!
//! Thin request/response adapters; every decision is delegated to
//! [`SessionRegistry`].
//!
//! | Method | Path                | Purpose                              |
//! |--------|---------------------|--------------------------------------|
//! | POST   | `/start_monitor`    | Start (or detect) a domain monitor   |
//! | GET    | `/logs/{domain}`    | Rendered log lines                   |
//! | GET    | `/events/{domain}`  | Structured log events                |
//! | GET    | `/status/{domain}`  | Change-detection status              |
//! | GET    | `/domains`          | Watched domains                      |
//! | GET    | `/health`           | Liveness                             |

use axum::{
    Form, Json, Router,
    extract::{FromRequest, Path, Request, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use dnswatch_core::{
    Error, EventRecord, SessionRegistry, SessionStatus, StartOutcome, StartRequest, render,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

/// Error body for requests missing `domain` or `record_type`
pub const MISSING_FIELDS: &str = "Missing required fields";

/// Error body for unknown domains
pub const NO_LOGS: &str = "No logs found for this domain.";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }
}

/// Creates all routes with state
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/start_monitor", post(start_monitor))
        .route("/logs/{domain}", get(get_logs))
        .route("/events/{domain}", get(get_events))
        .route("/status/{domain}", get(get_status))
        .route("/domains", get(list_domains))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Body of `POST /start_monitor`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StartMonitorForm {
    pub domain: Option<String>,
    pub record_type: Option<String>,
    pub dns_resolver: Option<String>,
}

/// Extracts a [`StartMonitorForm`] from a JSON or urlencoded form body
///
/// The encoding is chosen by `Content-Type`. Any body that cannot be read
/// is answered with `400 Missing required fields`.
pub struct StartMonitorBody(pub StartMonitorForm);

impl<S> FromRequest<S> for StartMonitorBody
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        let form = if is_json {
            Json::<StartMonitorForm>::from_request(req, state)
                .await
                .map(|Json(form)| form)
                .map_err(|e| e.body_text())
        } else {
            Form::<StartMonitorForm>::from_request(req, state)
                .await
                .map(|Form(form)| form)
                .map_err(|e| e.body_text())
        };

        form.map(StartMonitorBody).map_err(|reason| {
            debug!(%reason, "Unreadable start request body");
            error_response(StatusCode::BAD_REQUEST, MISSING_FIELDS)
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartMonitorResponse {
    pub status: String,
    pub message: String,
    pub hide_button: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogsResponse {
    pub logs: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EventsResponse {
    pub domain: String,
    pub record_type: String,
    pub nameserver: String,
    pub events: Vec<EventRecord>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub domain: String,
    pub alive: bool,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub status: SessionStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DomainsResponse {
    pub domains: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

fn lookup_failed(e: Error) -> Response {
    if e.is_not_found() {
        error_response(StatusCode::NOT_FOUND, NO_LOGS)
    } else {
        error!(error = %e, "Session lookup failed");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.trim().is_empty())
}

async fn start_monitor(
    State(state): State<AppState>,
    StartMonitorBody(form): StartMonitorBody,
) -> Response {
    let (Some(domain), Some(record_type)) = (present(form.domain), present(form.record_type))
    else {
        return error_response(StatusCode::BAD_REQUEST, MISSING_FIELDS);
    };

    let mut request = StartRequest::new(domain, record_type);
    if let Some(nameserver) = present(form.dns_resolver) {
        request = request.with_nameserver(nameserver);
    }

    match state.registry.start_monitoring(&request).await {
        Ok(outcome) => {
            let status = match outcome {
                StartOutcome::Started { .. } => "started",
                StartOutcome::AlreadyRunning { .. } => "already_running",
            };
            Json(StartMonitorResponse {
                status: status.to_string(),
                message: outcome.message(),
                hide_button: true,
            })
            .into_response()
        }
        Err(e) if e.is_invalid_input() => {
            debug!(error = %e, "Rejected start request");
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e) => {
            error!(error = %e, "Failed to start monitor");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn get_logs(State(state): State<AppState>, Path(domain): Path<String>) -> Response {
    match state.registry.find_session(&domain).await {
        Ok(session) => {
            let logs = render::render_log(
                &session.log().snapshot(),
                session.domain().as_str(),
                session.record_type(),
            );
            Json(LogsResponse { logs }).into_response()
        }
        Err(e) => lookup_failed(e),
    }
}

async fn get_events(State(state): State<AppState>, Path(domain): Path<String>) -> Response {
    match state.registry.find_session(&domain).await {
        Ok(session) => Json(EventsResponse {
            domain: session.domain().to_string(),
            record_type: session.record_type().to_string(),
            nameserver: session.nameserver().to_string(),
            events: session.log().snapshot().to_vec(),
        })
        .into_response(),
        Err(e) => lookup_failed(e),
    }
}

async fn get_status(State(state): State<AppState>, Path(domain): Path<String>) -> Response {
    let session = match state.registry.find_session(&domain).await {
        Ok(session) => session,
        Err(e) => return lookup_failed(e),
    };
    let Some(alive) = state.registry.is_alive(&domain).await else {
        return error_response(StatusCode::NOT_FOUND, NO_LOGS);
    };

    Json(StatusResponse {
        domain: session.domain().to_string(),
        alive,
        created_at: session.created_at(),
        status: session.status(),
    })
    .into_response()
}

async fn list_domains(State(state): State<AppState>) -> Json<DomainsResponse> {
    let domains = state
        .registry
        .domains()
        .await
        .into_iter()
        .map(|d| d.to_string())
        .collect();
    Json(DomainsResponse { domains })
}

async fn health_check() -> &'static str {
    "OK"
}
