//! HTTP surface: index page, creation form, detail page.

use crate::backend::{AppSyncClient, BackendError, BackendQueryError, TodoBackend};
use crate::config::ServeSettings;
use crate::form::{CreateTodoForm, FormHandler, SubmissionError, SubmissionGuard};
use crate::loader::{load_detail, load_index};
use crate::models::{IndexProps, ListOrder};
use crate::render::{self, Gate};
use crate::session::Session;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;

pub const INDEX: &str = "/";
pub const TODO_DETAIL: &str = "/todo/{id}";
pub const HEALTH: &str = "/health";

/// Page-level settings that do not concern the backend connection.
#[derive(Debug, Clone, Default)]
pub struct SiteSettings {
    pub auth_client_id: String,
    pub auth_sign_in_url: Option<String>,
    pub list_order: ListOrder,
}

impl From<&ServeSettings> for SiteSettings {
    fn from(settings: &ServeSettings) -> Self {
        Self {
            auth_client_id: settings.auth_client_id.clone(),
            auth_sign_in_url: settings.auth_sign_in_url.clone(),
            list_order: settings.list_order,
        }
    }
}

/// Shared, immutable per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    backend: Arc<dyn TodoBackend>,
    site: Arc<SiteSettings>,
    guard: Arc<SubmissionGuard>,
}

impl AppState {
    pub fn new(backend: Arc<dyn TodoBackend>, site: SiteSettings) -> Self {
        Self {
            backend,
            site: Arc::new(site),
            guard: Arc::new(SubmissionGuard::new()),
        }
    }

    /// Builds the GraphQL client once for the lifetime of the process.
    pub fn init(settings: &ServeSettings) -> Result<Self, BackendError> {
        let client = AppSyncClient::new(&settings.graphql_endpoint, &settings.graphql_api_key)?;
        tracing::info!(
            endpoint = client.endpoint(),
            region = settings.graphql_region.as_deref().unwrap_or("unknown"),
            "Backend client configured"
        );
        Ok(Self::new(Arc::new(client), SiteSettings::from(settings)))
    }

    fn session(&self, headers: &HeaderMap) -> Option<Session> {
        Session::from_headers(headers, &self.site.auth_client_id)
    }

    fn gate<'a>(&'a self, session: Option<&'a Session>) -> Gate<'a> {
        match session {
            Some(session) => Gate::SignedIn {
                username: &session.username,
            },
            None => Gate::SignedOut {
                sign_in_url: self.site.auth_sign_in_url.as_deref(),
            },
        }
    }
}

/// A request that could not be served. Rendered as the generic error page.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Query(#[from] BackendQueryError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, Html(render::error_page())).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(INDEX, get(index).post(create))
        .route(TODO_DETAIL, get(detail))
        .route(HEALTH, get(health))
        .with_state(state)
}

async fn index(State(state): State<AppState>, headers: HeaderMap) -> Result<Html<String>, ServerError> {
    let props = load_index(state.backend.as_ref(), state.site.list_order).await?;
    let session = state.session(&headers);
    Ok(Html(render::index_page(&props, state.gate(session.as_ref()), None)))
}

async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<CreateTodoForm>,
) -> Result<Response, ServerError> {
    if !is_same_origin(&headers) {
        tracing::warn!(
            origin = ?headers.get(header::ORIGIN),
            referer = ?headers.get(header::REFERER),
            "Rejected cross-origin form post"
        );
        return Ok((StatusCode::FORBIDDEN, Html(render::forbidden_page())).into_response());
    }

    let session = state.session(&headers);
    let mut handler = FormHandler::new(state.backend.as_ref(), &state.guard);

    match handler.submit(session.as_ref(), form).await {
        Ok(location) => Ok(Redirect::to(&location).into_response()),
        Err(err) => {
            // The error boundary re-renders the page with the message.
            let props = match load_index(state.backend.as_ref(), state.site.list_order).await {
                Ok(props) => props,
                Err(e) => {
                    tracing::warn!(error = %e, "Could not reload todos for the error page");
                    IndexProps::default()
                }
            };
            let message = err.to_string();
            let html = render::index_page(&props, state.gate(session.as_ref()), Some(&message));
            Ok((submission_status(&err), Html(html)).into_response())
        }
    }
}

/// Browsers attach `Origin` (or at least `Referer`) to form posts, so a
/// post whose source is another site is refused. Posts carrying neither
/// header come from non-browser clients and are let through.
fn is_same_origin(headers: &HeaderMap) -> bool {
    let source = match headers
        .get(header::ORIGIN)
        .or_else(|| headers.get(header::REFERER))
    {
        Some(value) => value,
        None => return true,
    };
    let Some(host) = headers.get(header::HOST).and_then(|h| h.to_str().ok()) else {
        return false;
    };
    let Some(url) = source
        .to_str()
        .ok()
        .and_then(|s| reqwest::Url::parse(s).ok())
    else {
        return false;
    };
    let Some(source_host) = url.host_str() else {
        return false;
    };
    let authority = match url.port() {
        Some(port) => format!("{source_host}:{port}"),
        None => source_host.to_string(),
    };
    authority.eq_ignore_ascii_case(host.trim())
}

fn submission_status(err: &SubmissionError) -> StatusCode {
    match err {
        SubmissionError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SubmissionError::SignedOut => StatusCode::UNAUTHORIZED,
        SubmissionError::AlreadySubmitting => StatusCode::CONFLICT,
        SubmissionError::Backend(_) => StatusCode::BAD_GATEWAY,
    }
}

async fn detail(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ServerError> {
    match load_detail(state.backend.as_ref(), &id).await? {
        Some(todo) => Ok(Html(render::detail_page(&todo)).into_response()),
        None => Ok((StatusCode::NOT_FOUND, Html(render::not_found_page())).into_response()),
    }
}

async fn health() -> &'static str {
    "ok"
}

pub async fn serve(state: AppState, listen: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
