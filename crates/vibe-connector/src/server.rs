//! HTTP API: identity lookup, meme generation and quota administration.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{ConnectInfo, DefaultBodyLimit, FromRequestParts, Multipart, State};
use axum::http::request::Parts;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;

use vibe_protocol::{Vibe, WhoAmI, EVENT_LOG_FILE, MISSING_IMAGE_MESSAGE};
use vibe_state::{RequestGate, StateError};

use crate::collaborators::{
    normalize_caption, CannedCaptioner, Captioner, Compositor, ImageStore, LocalImageStore,
    PassthroughCompositor,
};
use crate::config::ConnectorConfig;
use crate::error::ApiError;
use crate::event_log::{EventLog, MemeEvent};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub gate: RequestGate,
    pub captioner: Arc<dyn Captioner>,
    pub compositor: Arc<dyn Compositor>,
    pub store: Arc<dyn ImageStore>,
    pub events: Arc<EventLog>,
    pub trust_forwarded_for: bool,
}

impl AppState {
    /// State with file-backed stores and the built-in collaborators.
    pub fn from_config(config: &ConnectorConfig) -> Self {
        let storage = &config.storage;
        let events = if storage.event_log {
            EventLog::ndjson(storage.data_dir.join(EVENT_LOG_FILE))
        } else {
            EventLog::disabled()
        };
        Self {
            gate: RequestGate::open(&storage.data_dir, config.quota.daily_limit),
            captioner: Arc::new(CannedCaptioner::new(config.caption.clone())),
            compositor: Arc::new(PassthroughCompositor),
            store: Arc::new(LocalImageStore::from_config(storage)),
            events: Arc::new(events),
            trust_forwarded_for: config.server.trust_forwarded_for,
        }
    }
}

pub struct MemeServer {
    config: ConnectorConfig,
    state: AppState,
}

impl MemeServer {
    pub fn new(config: ConnectorConfig) -> Self {
        let state = AppState::from_config(&config);
        Self { config, state }
    }

    pub async fn run(self) -> Result<(), anyhow::Error> {
        let app = router(self.state, &self.config);
        let listener = tokio::net::TcpListener::bind(&self.config.server.bind_addr).await?;
        tracing::info!(
            addr = %self.config.server.bind_addr,
            data_dir = %self.config.storage.data_dir.display(),
            daily_limit = self.config.quota.daily_limit,
            "meme API listening"
        );
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
        Ok(())
    }
}

pub fn router(state: AppState, config: &ConnectorConfig) -> Router {
    let memes = ServeDir::new(PathBuf::from(&config.storage.meme_dir));
    Router::new()
        .route("/", get(hello))
        .route("/api/health", get(api_health))
        .route("/whoami/", post(whoami))
        .route("/generate-meme/", post(generate_meme))
        .route("/reset-quota", get(reset_quota))
        .nest_service("/memes", memes)
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes))
        .layer(cors_layer(&config.server.allowed_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any)
}

/// Network address of the caller, used when no device token is sent.
pub struct ClientAddr(pub String);

#[axum::async_trait]
impl FromRequestParts<AppState> for ClientAddr {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if state.trust_forwarded_for {
            let forwarded = parts
                .headers
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty());
            if let Some(addr) = forwarded {
                return Ok(ClientAddr(addr.to_string()));
            }
        }
        let addr = ConnectInfo::<SocketAddr>::from_request_parts(parts, state)
            .await
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        Ok(ClientAddr(addr))
    }
}

/// Run a gate call on the blocking pool; the stores do synchronous file I/O
/// under a document mutex.
async fn on_gate<R, F>(gate: &RequestGate, f: F) -> Result<R, ApiError>
where
    F: FnOnce(&RequestGate) -> Result<R, StateError> + Send + 'static,
    R: Send + 'static,
{
    let gate = gate.clone();
    tokio::task::spawn_blocking(move || f(&gate))
        .await
        .map_err(|e| ApiError::Internal(format!("gate task failed: {e}")))?
        .map_err(ApiError::from)
}

async fn hello() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Hello, World! from the meme API" }))
}

async fn api_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "ok": true,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Default, Deserialize)]
struct WhoAmIBody {
    device_token: Option<String>,
}

async fn whoami(
    State(app): State<AppState>,
    ClientAddr(addr): ClientAddr,
    body: Bytes,
) -> Result<Json<WhoAmI>, ApiError> {
    // A missing or malformed body just means "no device token".
    let token = serde_json::from_slice::<WhoAmIBody>(&body)
        .unwrap_or_default()
        .device_token;
    let who = on_gate(&app.gate, move |gate| gate.whoami(token.as_deref(), &addr)).await?;
    Ok(Json(who))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MemeResponse {
    pub meme_url: String,
    pub caption: String,
}

/// Fields of the `generate-meme` multipart form.
#[derive(Default)]
struct MemeForm {
    file: Option<Bytes>,
    vibe: Option<String>,
    device_token: Option<String>,
}

async fn read_meme_form(multipart: &mut Multipart) -> Result<MemeForm, ApiError> {
    let bad = |e: axum::extract::multipart::MultipartError| ApiError::BadRequest(e.to_string());
    let mut form = MemeForm::default();
    while let Some(field) = multipart.next_field().await.map_err(bad)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => form.file = Some(field.bytes().await.map_err(bad)?),
            Some("vibe") => form.vibe = Some(field.text().await.map_err(bad)?),
            Some("device_token") => form.device_token = Some(field.text().await.map_err(bad)?),
            _ => {}
        }
    }
    Ok(form)
}

async fn generate_meme(
    State(app): State<AppState>,
    ClientAddr(addr): ClientAddr,
    mut multipart: Multipart,
) -> Result<Json<MemeResponse>, ApiError> {
    let form = read_meme_form(&mut multipart).await?;
    let vibe: Vibe = form
        .vibe
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("missing form field 'vibe'".into()))?
        .parse()?;
    let image = form
        .file
        .ok_or_else(|| ApiError::BadRequest("missing form field 'file'".into()))?;

    // Admission is persisted before any collaborator runs.
    let token = form.device_token;
    let admission = on_gate(&app.gate, move |gate| gate.admit(token.as_deref(), &addr)).await?;
    if !admission.allowed {
        return Err(ApiError::QuotaExceeded);
    }

    if image.is_empty() {
        return Err(ApiError::BadRequest(MISSING_IMAGE_MESSAGE.into()));
    }

    let caption = normalize_caption(&app.captioner.generate(&image, vibe).await?);

    let event = MemeEvent::now(&admission.identifier, vibe, &caption);
    if let Err(e) = app.events.append(&event).await {
        tracing::warn!(error = %e, "failed to record meme event");
    }

    let meme = app.compositor.compose(&image, &caption)?;
    let meme_url = app.store.upload(meme).await?;
    tracing::info!(identifier = %admission.identifier, %vibe, url = %meme_url, "meme generated");

    Ok(Json(MemeResponse { meme_url, caption }))
}

async fn reset_quota(State(app): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    on_gate(&app.gate, |gate| gate.reset_quotas()).await?;
    Ok(Json(serde_json::json!({ "message": "All quotas reset 🔄" })))
}
