use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use shared::{
    domain::PostId,
    error::{ApiError, ApiException},
    protocol::{NewPost, Post},
};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info};

mod api;
mod app_state;
mod config;
mod store;

use api::{create_post, delete_post, get_post, list_posts, post_item_route, posts_route, ApiContext};
use app_state::AppState;
use config::load_settings;
use store::PostStore;

type HttpResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings()?;
    let store = match &settings.seed_file {
        Some(path) => PostStore::from_seed_file(path).map_err(|error| {
            error!(path = %path.display(), %error, "failed to load seed posts");
            error
        })?,
        None => PostStore::new(Vec::new()),
    };

    let state = AppState {
        api: ApiContext { store },
    };
    let app = build_router(Arc::new(state), settings.max_body_bytes);

    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(%addr, "posts server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(posts_route(), get(http_list_posts).post(http_create_post))
        .route(post_item_route(), get(http_get_post).delete(http_delete_post))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .with_state(state)
}

fn into_http_error(err: ApiException) -> (StatusCode, Json<ApiError>) {
    let status = StatusCode::from_u16(err.code.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ApiError::from(err)))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_list_posts(State(state): State<Arc<AppState>>) -> Json<Vec<Post>> {
    Json(list_posts(&state.api).await)
}

async fn http_get_post(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<String>,
) -> HttpResult<Json<Post>> {
    let post = get_post(&state.api, &PostId::new(post_id))
        .await
        .map_err(into_http_error)?;
    Ok(Json(post))
}

async fn http_create_post(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewPost>,
) -> HttpResult<(StatusCode, Json<Post>)> {
    let post = create_post(&state.api, payload)
        .await
        .map_err(into_http_error)?;
    info!(post_id = %post.id, "post created");
    Ok((StatusCode::CREATED, Json(post)))
}

async fn http_delete_post(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<String>,
) -> HttpResult<Json<Post>> {
    let post = delete_post(&state.api, &PostId::new(post_id))
        .await
        .map_err(into_http_error)?;
    info!(post_id = %post.id, "post deleted");
    Ok(Json(post))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
