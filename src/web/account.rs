//! 登录、注册与登出

use axum::{
    Form,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};

use super::session::{MaybeUser, clear_session_cookie, session_cookie, session_token};
use super::views::{LoginTemplate, RegisterTemplate, render};
use crate::database::dto::{LoginForm, LoginPageQuery, RegisterForm};
use crate::database::{login, logout as end_session, register};
use crate::error::AppError;
use crate::state::AppState;

fn login_form(
    status: StatusCode,
    error: Option<String>,
    notice: Option<String>,
    username: &str,
) -> Result<Response, AppError> {
    let page = render(&LoginTemplate {
        username: None,
        error,
        notice,
        form_username: username.to_string(),
    })?;
    Ok((status, page).into_response())
}

fn register_form(
    status: StatusCode,
    error: Option<String>,
    form: &RegisterForm,
) -> Result<Response, AppError> {
    let page = render(&RegisterTemplate {
        username: None,
        error,
        form_username: form.username.trim().to_string(),
        form_email: form.email.trim().to_string(),
    })?;
    Ok((status, page).into_response())
}

pub async fn login_page(
    MaybeUser(user): MaybeUser,
    Query(query): Query<LoginPageQuery>,
) -> Result<Response, AppError> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let notice = query
        .registered
        .map(|_| "Registration successful! Please log in.".to_string());
    login_form(StatusCode::OK, None, notice, "")
}

pub async fn login_submit(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if form.username.trim().is_empty() || form.password.is_empty() {
        return login_form(
            StatusCode::BAD_REQUEST,
            Some("Please enter both username and password.".to_string()),
            None,
            &form.username,
        );
    }

    match login(&state.db, &form, state.config.session_ttl).await {
        Ok((_, session)) => {
            let cookie = session_cookie(
                &session.id,
                state.config.session_ttl,
                state.config.cookie_secure,
            );
            Ok((AppendHeaders([(SET_COOKIE, cookie)]), Redirect::to("/")).into_response())
        }
        Err(e @ AppError::InvalidCredentials) => login_form(
            e.status(),
            Some(e.public_message()),
            None,
            form.username.trim(),
        ),
        Err(e) => Err(e),
    }
}

pub async fn register_page(MaybeUser(user): MaybeUser) -> Result<Response, AppError> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let empty = RegisterForm {
        username: String::new(),
        email: String::new(),
        password: String::new(),
        confirm_password: String::new(),
    };
    register_form(StatusCode::OK, None, &empty)
}

pub async fn register_submit(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    match register(&state.db, &form).await {
        Ok(_) => Ok(Redirect::to("/login?registered=1").into_response()),
        Err(e @ (AppError::BadRequest(_) | AppError::Conflict(_))) => {
            register_form(e.status(), Some(e.public_message()), &form)
        }
        Err(e) => Err(e),
    }
}

/// 删除会话并清除 cookie，未登录时同样跳转到登录页
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if let Some(token) = session_token(&headers) {
        end_session(&state.db, &token).await?;
        log::debug!("会话已注销");
    }

    let cookie = clear_session_cookie(state.config.cookie_secure);
    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Redirect::to("/login")).into_response())
}
