//! 会话 cookie 与登录状态提取器

use std::time::Duration;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};

use crate::database::current_user;
use crate::entity::users;
use crate::error::AppError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "chuck_session";

/// 从 `Cookie` 头中取出会话 token
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// 登录成功时下发的 `Set-Cookie` 值
pub fn session_cookie(token: &str, ttl: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        ttl.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", Duration::ZERO, secure)
}

async fn resolve_user(parts: &Parts, state: &AppState) -> Result<Option<users::Model>, AppError> {
    match session_token(&parts.headers) {
        Some(token) => current_user(&state.db, &token).await,
        None => Ok(None),
    }
}

/// 页面路由使用：未登录时重定向到 `/login`
pub struct PageUser(pub users::Model);

#[async_trait]
impl FromRequestParts<AppState> for PageUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match resolve_user(parts, state).await {
            Ok(Some(user)) => Ok(PageUser(user)),
            Ok(None) => Err(Redirect::to("/login").into_response()),
            Err(e) => Err(e.into_response()),
        }
    }
}

/// JSON 接口使用：未登录时返回 401
pub struct ApiUser(pub users::Model);

#[async_trait]
impl FromRequestParts<AppState> for ApiUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve_user(parts, state)
            .await?
            .map(ApiUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// 登录、注册页面使用：已登录时直接跳回首页
pub struct MaybeUser(pub Option<users::Model>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(resolve_user(parts, state).await?))
    }
}
