//! HTTP 层：路由、会话提取器、页面与 JSON 接口

use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod account;
pub mod api;
pub mod pages;
pub mod session;
pub mod views;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/categories", post(api::fetch_categories))
        .route("/jokes", get(api::stored_jokes))
        .route("/jokes/random", post(api::random_joke))
        .route("/favorites/add", post(api::add_favorite))
        .route("/favorites/remove", post(api::remove_favorite))
        .route("/favorites/check", post(api::check_favorite));

    Router::new()
        .route("/", get(pages::index))
        .route("/jokes", get(pages::jokes))
        .route("/favorites", get(pages::favorites))
        .route(
            "/login",
            get(account::login_page).post(account::login_submit),
        )
        .route(
            "/register",
            get(account::register_page).post(account::register_submit),
        )
        .route("/logout", get(account::logout).post(account::logout))
        .route("/health", get(health))
        .nest("/api", api)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}
