//! Browser front end: settings form, article preview and the generate-and-upload flow.

pub mod forms;
pub mod pages;

use std::net::SocketAddr;

use anyhow::{Error, anyhow};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use maud::Markup;
use mpdraft_core::{ConfigStore, PublishError, WeChatClient, publish, render_article};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::forms::{ArticleForm, FormError, SettingsForm, read_publish_form};

/// Permanent image material on the platform is capped at 10 MB.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Shared per-process state. Configuration itself is re-read from disk on every request.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: ConfigStore,
    pub client: WeChatClient,
}

impl AppState {
    pub fn new(store: ConfigStore, client: WeChatClient) -> Self {
        Self { store, client }
    }
}

#[derive(Debug)]
struct PageError {
    status: StatusCode,
    inner: Error,
}

impl PageError {
    fn new(status: StatusCode, inner: Error) -> Self {
        Self { status, inner }
    }
}

impl From<FormError> for PageError {
    fn from(value: FormError) -> Self {
        let status = match &value {
            FormError::Multipart(_) => StatusCode::BAD_REQUEST,
            FormError::MissingTitle | FormError::InvalidParagraphs(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
        };
        Self::new(status, value.into())
    }
}

impl From<Error> for PageError {
    fn from(value: Error) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, value)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        warn!(status = %self.status, error = %self.inner, "Request failed");
        let page = pages::error_page(self.status.as_u16(), &self.inner.to_string());
        (self.status, page).into_response()
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn index_handler(State(state): State<AppState>) -> Markup {
    let loaded = state.store.load();
    pages::index(&loaded.config, &loaded.warnings)
}

async fn save_config_handler(
    State(state): State<AppState>,
    Form(form): Form<SettingsForm>,
) -> Result<Redirect, PageError> {
    let saved = state
        .store
        .save(&form.appid, &form.appsecret, form.simulate())
        .map_err(|err| anyhow!("Failed to save configuration: {err}"))?;
    info!(simulate = saved.simulate, has_credentials = saved.has_credentials(), "Settings saved");
    Ok(Redirect::to("/"))
}

async fn preview_handler(
    State(state): State<AppState>,
    Form(form): Form<ArticleForm>,
) -> Result<Markup, PageError> {
    let request = form.to_article()?;
    let article = render_article(&request).map_err(|err| anyhow!(err))?;
    let simulate = state.store.load().config.simulate;
    Ok(pages::preview(&form, simulate, &article))
}

async fn generate_upload_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, PageError> {
    let (_form, request) = read_publish_form(multipart).await?;
    let config = state.store.load().config;

    let response = match publish(&state.client, &config, request).await {
        Ok(outcome) => pages::publish_success(&outcome).into_response(),
        Err(PublishError::Content(err)) => {
            return Err(PageError::new(StatusCode::UNPROCESSABLE_ENTITY, err.into()));
        }
        Err(err) => {
            warn!(error = %err, "Publish pipeline stopped");
            pages::publish_failure(&err.to_string()).into_response()
        }
    };
    Ok(response)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/save-config", post(save_config_handler))
        .route("/preview", post(preview_handler))
        .route("/generate-upload", post(generate_upload_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> Result<(), Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        addr = %listener.local_addr()?,
        config = %state.store.path().display(),
        api = state.client.base_url(),
        "mpdraft listening"
    );
    axum::serve(listener, router(state)).await?;
    Ok(())
}
