use crate::config::{Config, FallbackPolicy, TributeDefaults};
use crate::credits::SortMode;
use crate::images::ImageUrls;
use crate::screens::{self, FilmographyView, MovieView, TributeView};
use crate::tmdb::{TmdbApi, TmdbClient};
use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub tmdb: Arc<dyn TmdbApi>,
    pub images: ImageUrls,
    pub person_id: u32,
    pub tribute_fallback: FallbackPolicy,
    pub tribute_defaults: Arc<TributeDefaults>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            tmdb: Arc::new(TmdbClient::new(&config.tmdb)),
            images: ImageUrls::new(config.tmdb.image_base.clone()),
            person_id: config.person_id,
            tribute_fallback: config.tribute_fallback,
            tribute_defaults: Arc::new(config.tribute_defaults.clone()),
        }
    }
}

pub async fn run_server(config: Config) -> Result<()> {
    let state = AppState::from_config(&config);
    info!(
        "Serving filmography for person {} (tribute fallback: {:?})",
        state.person_id, state.tribute_fallback
    );

    let app = build_router(state);

    info!("Listening on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/filmography", get(filmography))
        .route("/tribute", get(tribute))
        .route("/movies/:id", get(movie))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

/// A screen that could not be shown.
pub enum ApiError {
    BadRequest(String),
    Upstream(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Upstream(err) => {
                error!("Screen load failed: {:#}", err);
                (StatusCode::BAD_GATEWAY, format!("{:#}", err))
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Upstream(err)
    }
}

#[derive(Debug, Deserialize)]
struct FilmographyQuery {
    #[serde(default)]
    q: String,
    sort: Option<String>,
}

async fn filmography(
    State(state): State<AppState>,
    Query(params): Query<FilmographyQuery>,
) -> Result<Json<FilmographyView>, ApiError> {
    let sort = match params.sort.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => raw
            .parse::<SortMode>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => SortMode::default(),
    };
    let loaded = screens::load_filmography(state.tmdb.as_ref(), state.person_id).await?;
    Ok(Json(loaded.view(&params.q, sort, &state.images)))
}

async fn tribute(State(state): State<AppState>) -> Result<Json<TributeView>, ApiError> {
    let view = screens::load_tribute(
        state.tmdb.as_ref(),
        state.person_id,
        state.tribute_fallback,
        &state.tribute_defaults,
        &state.images,
    )
    .await?;
    Ok(Json(view))
}

async fn movie(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<MovieView>, ApiError> {
    let movie_id = raw_id
        .parse::<u32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid movie id: {}", raw_id)))?;
    let view =
        screens::load_movie(state.tmdb.as_ref(), movie_id, state.person_id, &state.images).await?;
    Ok(Json(view))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
