use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use formats::{ManifestDocument, ManifestIndex, MANIFEST_FILE_NAME};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
struct AppState {
    index: Arc<ManifestIndex>,
}

#[derive(Clone, Debug)]
struct ServerConfig {
    /// Directory image references resolve against; served under `/data`.
    data_root: PathBuf,
    manifest_path: PathBuf,
    /// Viewer page and wasm bundle.
    static_root: PathBuf,
    addr: SocketAddr,
}

impl ServerConfig {
    fn from_env() -> anyhow::Result<Self> {
        let data_root = env_var_path("VIEWER_ROOT", PathBuf::from("data"));
        let manifest_path = env_var_path("VIEWER_MANIFEST", data_root.join(MANIFEST_FILE_NAME));
        let static_root =
            env_var_path("VIEWER_STATIC_ROOT", PathBuf::from("crates/apps/viewer_web/www"));
        let addr = env::var("VIEWER_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:9200".to_string())
            .parse()
            .context("invalid VIEWER_ADDR")?;
        Ok(Self {
            data_root,
            manifest_path,
            static_root,
            addr,
        })
    }
}

#[derive(Debug, Serialize)]
struct RunsSummary<'a> {
    runs: &'a [String],
    variables: &'a [String],
    conversions: &'a [String],
    max_time_steps: usize,
    issues: &'a [formats::DataQualityIssue],
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::from_env()?;

    // A viewer without its manifest has nothing to show.
    let document = ManifestDocument::load(&config.manifest_path)
        .with_context(|| format!("failed to load manifest {}", config.manifest_path.display()))?;
    let index = ManifestIndex::new(document);
    info!(
        runs = index.runs().len(),
        images = index.document().image_count(),
        issues = index.issues().len(),
        "manifest indexed from {}",
        config.manifest_path.display()
    );
    if tokio::fs::metadata(&config.static_root).await.is_err() {
        warn!("static root {} does not exist", config.static_root.display());
    }

    let app = router(AppState { index: Arc::new(index) }, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    info!("run viewer listening on http://{}", config.addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

fn router(state: AppState, config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::OPTIONS]);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/manifest.json", get(get_manifest))
        .route("/api/runs", get(get_runs))
        .nest_service("/data", ServeDir::new(&config.data_root))
        .fallback_service(ServeDir::new(&config.static_root))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn get_manifest(State(state): State<AppState>) -> Response {
    json_response(state.index.document())
}

async fn get_runs(State(state): State<AppState>) -> Response {
    let index = &state.index;
    json_response(&RunsSummary {
        runs: index.runs(),
        variables: index.variables(),
        conversions: index.conversions(),
        max_time_steps: index.max_time_steps(),
        issues: index.issues(),
    })
}

fn json_response<T: Serialize + ?Sized>(value: &T) -> Response {
    let body = match serde_json::to_string(value) {
        Ok(v) => v,
        Err(err) => {
            error!("json serialization failed: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "serialization error").into_response();
        }
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        http::header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    (StatusCode::OK, headers, Body::from(body)).into_response()
}

fn env_var_path(key: &str, default: PathBuf) -> PathBuf {
    env::var(key).map(PathBuf::from).unwrap_or(default)
}
