//! JSON 接口，全部要求登录

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, State},
};

use super::session::ApiUser;
use crate::database::dto::{
    FavoriteForm, FavoriteResponse, JokePayload, RandomJokeForm, StoredJokesQuery,
};
use crate::database::repository::jokes_repository::JokeWithCategory;
use crate::database as service;
use crate::error::AppError;
use crate::state::AppState;

/// `Form` 的包装，解析失败时返回 JSON 错误
#[derive(FromRequest)]
#[from_request(via(axum::Form), rejection(AppError))]
pub struct ApiForm<T>(pub T);

/// `Query` 的包装，解析失败时返回 JSON 错误
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

fn joke_id(form: &FavoriteForm) -> Result<i32, AppError> {
    form.joke_id()
        .ok_or_else(|| AppError::BadRequest("Joke id not provided".to_string()))
}

pub async fn fetch_categories(
    State(state): State<AppState>,
    ApiUser(user): ApiUser,
) -> Result<Json<Vec<String>>, AppError> {
    log::debug!("用户 {} 请求分类列表", user.id);
    let names = service::fetch_categories(&state.db, state.jokes.as_ref()).await?;
    Ok(Json(names))
}

pub async fn random_joke(
    State(state): State<AppState>,
    ApiUser(user): ApiUser,
    ApiForm(form): ApiForm<RandomJokeForm>,
) -> Result<Json<JokePayload>, AppError> {
    let category = form
        .category
        .ok_or_else(|| AppError::BadRequest("Category not provided".to_string()))?;

    let joke =
        service::fetch_random_joke(&state.db, state.jokes.as_ref(), user.id, &category).await?;
    Ok(Json(joke))
}

pub async fn stored_jokes(
    State(state): State<AppState>,
    ApiUser(user): ApiUser,
    ApiQuery(query): ApiQuery<StoredJokesQuery>,
) -> Result<Json<Vec<JokeWithCategory>>, AppError> {
    let limit = query
        .limit()
        .map_err(|raw| AppError::BadRequest(format!("Invalid limit: {raw}")))?;
    let jokes = service::stored_jokes(&state.db, user.id, limit).await?;
    Ok(Json(jokes))
}

pub async fn add_favorite(
    State(state): State<AppState>,
    ApiUser(user): ApiUser,
    ApiForm(form): ApiForm<FavoriteForm>,
) -> Result<Json<FavoriteResponse>, AppError> {
    let response = service::add_favorite(&state.db, user.id, joke_id(&form)?).await?;
    Ok(Json(response))
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    ApiUser(user): ApiUser,
    ApiForm(form): ApiForm<FavoriteForm>,
) -> Result<Json<FavoriteResponse>, AppError> {
    let response = service::remove_favorite(&state.db, user.id, joke_id(&form)?).await?;
    Ok(Json(response))
}

pub async fn check_favorite(
    State(state): State<AppState>,
    ApiUser(user): ApiUser,
    ApiForm(form): ApiForm<FavoriteForm>,
) -> Result<Json<FavoriteResponse>, AppError> {
    let response = service::check_favorite(&state.db, user.id, joke_id(&form)?).await?;
    Ok(Json(response))
}
