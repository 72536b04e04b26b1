//! 需要登录的 HTML 页面

use axum::{
    extract::{Query, State},
    response::Html,
};

use super::session::PageUser;
use super::views::{
    FavoriteView, FavoritesTemplate, IndexTemplate, JokeView, JokesTemplate, Pager,
    category_options, render, ucfirst,
};
use crate::database::dto::{FavoritesQuery, JokeListQuery};
use crate::database::{RECENT_JOKES, favorites_page, jokes_page, stored_categories, stored_jokes};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::pagination::parse_page;

/// 笑话生成页
pub async fn index(
    State(state): State<AppState>,
    PageUser(user): PageUser,
) -> Result<Html<String>, AppError> {
    let categories = stored_categories(&state.db).await?;
    let recent = stored_jokes(&state.db, user.id, Some(RECENT_JOKES)).await?;

    render(&IndexTemplate {
        username: Some(user.username),
        categories: category_options(&categories, None),
        recent: recent
            .into_iter()
            .map(|row| JokeView::from_row(row, &Default::default()))
            .collect(),
    })
}

/// 已保存笑话列表，可按分类筛选
pub async fn jokes(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    Query(query): Query<JokeListQuery>,
) -> Result<Html<String>, AppError> {
    let category = query.category.as_deref();
    let page = jokes_page(&state.db, user.id, parse_page(query.page.as_deref()), category).await?;

    let jokes = page
        .jokes
        .into_iter()
        .map(|row| JokeView::from_row(row, &page.favorite_ids))
        .collect();

    render(&JokesTemplate {
        username: Some(user.username),
        total: page.pagination.total,
        categories: category_options(&page.categories, category),
        filter_label: category.map(ucfirst),
        jokes,
        pager: Pager::new(&page.pagination, category),
    })
}

/// 收藏列表
pub async fn favorites(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    Query(query): Query<FavoritesQuery>,
) -> Result<Html<String>, AppError> {
    let page = favorites_page(&state.db, user.id, parse_page(query.page.as_deref())).await?;

    render(&FavoritesTemplate {
        username: Some(user.username),
        total: page.pagination.total,
        jokes: page.jokes.into_iter().map(FavoriteView::from).collect(),
        pager: Pager::new(&page.pagination, None),
    })
}
