use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use goalboard_engine::Engine;
use goalboard_protocol::{messages, routes};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub engine: Engine,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(routes::HEALTH, get(health))
        .route(routes::GOALS, get(list_goals))
        .route(routes::USER_BY_ID, get(get_user))
        .with_state(Arc::new(state))
        .layer(TraceLayer::new_for_http())
        .layer(local_only_cors())
}

async fn health() -> &'static str {
    "ok"
}

async fn list_goals(State(state): State<Arc<AppState>>) -> Response {
    match state.engine.list_goals() {
        Ok(goals) => Json(goals).into_response(),
        Err(err) => {
            tracing::error!(error = ?err, "error fetching goals");
            server_error()
        }
    }
}

async fn get_user(State(state): State<Arc<AppState>>, Path(raw_id): Path<String>) -> Response {
    let Ok(id) = raw_id.parse::<i64>() else {
        return (StatusCode::BAD_REQUEST, messages::INVALID_USER_ID).into_response();
    };

    match state.engine.get_user(id) {
        Ok(Some(user)) => Json(user).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, messages::USER_NOT_FOUND).into_response(),
        Err(err) => {
            tracing::error!(user_id = id, error = ?err, "error fetching user");
            server_error()
        }
    }
}

fn server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, messages::SERVER_ERROR).into_response()
}

pub async fn serve(addr: SocketAddr, db_path: PathBuf) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve_listener(listener, db_path, async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutdown requested");
    })
    .await?;
    Ok(())
}

pub async fn serve_listener(
    listener: tokio::net::TcpListener,
    db_path: PathBuf,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<SocketAddr> {
    let engine = Engine::new(db_path);
    // Fail fast if the database cannot be opened or migrated.
    let _ = engine.open()?;
    let app = build_router(AppState { engine });
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "goal service listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(addr)
}

fn local_only_cors() -> CorsLayer {
    use axum::http::header;
    use axum::http::HeaderValue;
    use axum::http::Method;

    CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _req| {
            is_allowed_local_origin(origin)
        }))
}

fn is_allowed_local_origin(origin: &axum::http::HeaderValue) -> bool {
    let Ok(s) = origin.to_str() else {
        return false;
    };
    is_http_origin_for_host(s, "localhost") || is_http_origin_for_host(s, "127.0.0.1")
}

fn is_http_origin_for_host(origin: &str, host: &str) -> bool {
    for scheme in ["http://", "https://"] {
        if let Some(rest) = origin.strip_prefix(scheme) {
            if let Some(after) = rest.strip_prefix(host) {
                // scheme://host[:port]
                return after.is_empty() || after.starts_with(':');
            }
        }
    }
    false
}
