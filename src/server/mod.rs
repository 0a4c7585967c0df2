//! HTTP server for the chat front end.
//!
//! Routes:
//! - `GET /` and `GET /chat.html`: static pages
//! - `POST /process`: chat turn, optionally spoken
//! - `GET /audio`: the latest synthesized reply

pub mod pages;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::chat::{ChatRequest, ChatResponse, ChatService};
use crate::completion::gemini::GeminiGenerator;
use crate::completion::CompletionClient;
use crate::config::Config;
use crate::error::{ApiError, StartupError};
use crate::speech::gtts::GoogleTranslateTts;
use crate::speech::playback::{NoPlayback, Playback, RodioPlayback};
use crate::speech::store::AudioStore;
use crate::speech::{SpeechSynthesizer, AUDIO_CONTENT_TYPE};

#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    pub audio: Arc<AudioStore>,
}

impl AppState {
    /// Wire the Gemini backend, the TTS encoder, the artifact store, and
    /// playback from configuration.
    pub fn from_config(config: &Config) -> Result<Self, StartupError> {
        let api_key = config.completion.api_key();
        if api_key.is_none() {
            warn!(
                "{} is not set; chat replies will report the missing key",
                config.completion.api_key_env
            );
        }
        let generator = GeminiGenerator::new(&config.completion, api_key)?;
        let encoder = GoogleTranslateTts::new(&config.tts)?;
        let audio = Arc::new(AudioStore::new(config.tts.audio_path.clone()));

        let playback: Arc<dyn Playback> = if config.playback.enabled {
            Arc::new(RodioPlayback::new())
        } else {
            Arc::new(NoPlayback)
        };

        let chat = ChatService::new(
            CompletionClient::new(Arc::new(generator)),
            SpeechSynthesizer::new(Arc::new(encoder), audio.clone()),
            playback,
        );

        Ok(Self {
            chat: Arc::new(chat),
            audio,
        })
    }
}

/// Build the axum router.
pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/chat.html", get(pages::chat))
        .route("/process", post(handle_process))
        .route("/audio", get(handle_audio))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// CORS policy: any origin unless an explicit list is configured.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new().allow_headers(Any).allow_methods(Any);
    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}

/// Bind the configured address and serve until the process exits.
pub async fn run(config: &Config, state: AppState) -> std::io::Result<()> {
    let app = router(state, cors_layer(&config.server.cors_allowed_origins));
    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{addr}");
    axum::serve(listener, app).await
}

// --- Handlers ---

#[derive(Debug, Default, Deserialize)]
struct ProcessRequest {
    #[serde(default)]
    text: Option<String>,
    /// Any JSON value; truthy values turn speech on.
    #[serde(default)]
    tts: Value,
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

async fn handle_process(
    State(state): State<AppState>,
    body: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            warn!("Unreadable /process body: {rejection}");
            ProcessRequest::default()
        }
    };

    let reply = state
        .chat
        .handle(ChatRequest {
            text: req.text.unwrap_or_default(),
            tts_enabled: is_truthy(&req.tts),
        })
        .await?;

    Ok(Json(reply.into()))
}

async fn handle_audio(State(state): State<AppState>) -> Result<Response, ApiError> {
    match state.audio.fetch_latest().await {
        Ok(Some(bytes)) => Ok((
            [
                (header::CONTENT_TYPE, AUDIO_CONTENT_TYPE),
                (header::CACHE_CONTROL, "no-store"),
            ],
            bytes,
        )
            .into_response()),
        Ok(None) => Err(ApiError::NotFound("Audio file not found".to_string())),
        Err(e) => Err(ApiError::Internal(format!("failed to read audio: {e}"))),
    }
}
