//! Askama 模板与视图模型

use std::collections::HashSet;

use askama::Template;
use axum::response::Html;
use chrono::DateTime;
use url::form_urlencoded::byte_serialize;

use crate::database::repository::{
    favorites_repository::FavoriteJoke, jokes_repository::JokeWithCategory,
};
use crate::entity::categories;
use crate::error::AppError;
use crate::utils::pagination::Pagination;

pub fn render<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    Ok(Html(template.render()?))
}

/// 首字母大写，用于分类名展示
pub fn ucfirst(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn format_timestamp(secs: i64, pattern: &str) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format(pattern).to_string())
        .unwrap_or_default()
}

/// `Mar 5, 2024 3:07 PM`
pub fn format_datetime(secs: i64) -> String {
    format_timestamp(secs, "%b %-d, %Y %-I:%M %p")
}

/// `Mar 5, 2024`
pub fn format_date(secs: i64) -> String {
    format_timestamp(secs, "%b %-d, %Y")
}

// ==================== 视图模型 ====================

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryOption {
    pub name: String,
    pub label: String,
    pub selected: bool,
}

pub fn category_options(
    rows: &[categories::Model],
    selected: Option<&str>,
) -> Vec<CategoryOption> {
    rows.iter()
        .map(|row| CategoryOption {
            name: row.category_name.clone(),
            label: ucfirst(&row.category_name),
            selected: selected == Some(row.category_name.as_str()),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct JokeView {
    pub id: i32,
    pub text: String,
    pub category: String,
    pub created_at: String,
    pub is_favorite: bool,
}

impl JokeView {
    pub fn from_row(row: JokeWithCategory, favorites: &HashSet<i32>) -> Self {
        Self {
            id: row.id,
            category: ucfirst(&row.category_name),
            created_at: format_datetime(row.created_at),
            is_favorite: favorites.contains(&row.id),
            text: row.joke_text,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FavoriteView {
    pub id: i32,
    pub text: String,
    pub category: String,
    pub favorited_at: String,
}

impl From<FavoriteJoke> for FavoriteView {
    fn from(row: FavoriteJoke) -> Self {
        Self {
            id: row.id,
            category: ucfirst(&row.category_name),
            favorited_at: format_date(row.favorited_at),
            text: row.joke_text,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageLink {
    pub number: u64,
    pub href: String,
    pub current: bool,
}

/// 分页导航，链接保留分类筛选条件
#[derive(Debug, Clone)]
pub struct Pager {
    pub page: u64,
    pub total_pages: u64,
    pub show: bool,
    pub has_prev: bool,
    pub prev_href: String,
    pub has_next: bool,
    pub next_href: String,
    pub links: Vec<PageLink>,
}

impl Pager {
    pub fn new(pagination: &Pagination, category: Option<&str>) -> Self {
        let suffix = category
            .map(|c| format!("&category={}", byte_serialize(c.as_bytes()).collect::<String>()))
            .unwrap_or_default();
        let href = |page: u64| format!("?page={page}{suffix}");

        Self {
            page: pagination.page,
            total_pages: pagination.total_pages.max(1),
            show: pagination.is_paginated(),
            has_prev: pagination.has_prev(),
            prev_href: href(pagination.page.saturating_sub(1).max(1)),
            has_next: pagination.has_next(),
            next_href: href(pagination.page + 1),
            links: pagination
                .window()
                .map(|number| PageLink {
                    number,
                    href: href(number),
                    current: number == pagination.page,
                })
                .collect(),
        }
    }
}

// ==================== 模板 ====================

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub username: Option<String>,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub form_username: String,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub username: Option<String>,
    pub error: Option<String>,
    pub form_username: String,
    pub form_email: String,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub username: Option<String>,
    pub categories: Vec<CategoryOption>,
    pub recent: Vec<JokeView>,
}

#[derive(Template)]
#[template(path = "jokes.html")]
pub struct JokesTemplate {
    pub username: Option<String>,
    pub total: u64,
    pub categories: Vec<CategoryOption>,
    pub filter_label: Option<String>,
    pub jokes: Vec<JokeView>,
    pub pager: Pager,
}

#[derive(Template)]
#[template(path = "favorites.html")]
pub struct FavoritesTemplate {
    pub username: Option<String>,
    pub total: u64,
    pub jokes: Vec<FavoriteView>,
    pub pager: Pager,
}
