//! 业务操作
//!
//! 组合各个 Repository 与笑话 API，供 web 层的处理函数调用。

use std::collections::HashSet;
use std::time::Duration;

use sea_orm::{DatabaseConnection, SqlErr, TransactionTrait};

use crate::database::dto::{FavoriteResponse, JokePayload, LoginForm, RegisterForm};
use crate::database::repository::{
    categories_repository::CategoriesRepository,
    favorites_repository::{FavoriteJoke, FavoritesRepository},
    jokes_repository::{JokeWithCategory, JokesRepository, NewJoke},
    sessions_repository::SessionsRepository,
    users_repository::UsersRepository,
};
use crate::entity::{categories, sessions, users};
use crate::error::AppError;
use crate::joke_api::JokeSource;
use crate::utils::pagination::{PER_PAGE, Pagination};
use crate::utils::password::{hash_password, verify_password};

/// `/api/jokes` 默认返回条数
pub const DEFAULT_STORED_JOKES: u64 = 10;
pub const MAX_STORED_JOKES: u64 = 50;
/// 首页展示的最近笑话条数
pub const RECENT_JOKES: u64 = 5;

// ==================== 笑话 ====================

/// 从 API 拉取分类并保存
pub async fn fetch_categories(
    db: &DatabaseConnection,
    api: &dyn JokeSource,
) -> Result<Vec<String>, AppError> {
    let names = api.categories().await?;

    let inserted = CategoriesRepository::insert_ignore_many(db, &names).await?;
    log::info!("拉取到 {} 个分类，新增 {} 个", names.len(), inserted);

    Ok(names)
}

/// 从 API 拉取指定分类的随机笑话并为用户保存
pub async fn fetch_random_joke(
    db: &DatabaseConnection,
    api: &dyn JokeSource,
    user_id: i32,
    category: &str,
) -> Result<JokePayload, AppError> {
    let joke = api.random_joke(category).await?;

    // 分类和笑话在同一事务中写入
    let txn = db.begin().await?;
    let category_row = CategoriesRepository::find_or_create(&txn, category).await?;
    let stored = JokesRepository::insert_for_user(
        &txn,
        NewJoke {
            user_id,
            category_id: category_row.id,
            api_id: joke.id.clone(),
            joke_text: joke.value.clone(),
        },
    )
    .await?;
    txn.commit().await?;

    log::debug!("用户 {} 保存笑话 {} (api_id={})", user_id, stored.id, stored.api_id);

    Ok(JokePayload {
        id: stored.id,
        api_id: stored.api_id,
        value: stored.joke_text,
        category: category_row.category_name,
        url: joke.url,
    })
}

/// 用户最近保存的笑话，`limit` 限制在 1..=50
pub async fn stored_jokes(
    db: &DatabaseConnection,
    user_id: i32,
    limit: Option<u64>,
) -> Result<Vec<JokeWithCategory>, AppError> {
    let limit = limit
        .unwrap_or(DEFAULT_STORED_JOKES)
        .clamp(1, MAX_STORED_JOKES);

    Ok(JokesRepository::find_recent(db, user_id, limit).await?)
}

pub async fn stored_categories(
    db: &DatabaseConnection,
) -> Result<Vec<categories::Model>, AppError> {
    Ok(CategoriesRepository::find_all(db).await?)
}

/// 笑话列表页数据
#[derive(Debug, Clone)]
pub struct JokesPage {
    pub pagination: Pagination,
    pub jokes: Vec<JokeWithCategory>,
    pub favorite_ids: HashSet<i32>,
    pub categories: Vec<categories::Model>,
}

pub async fn jokes_page(
    db: &DatabaseConnection,
    user_id: i32,
    page: Option<i64>,
    category: Option<&str>,
) -> Result<JokesPage, AppError> {
    let total = JokesRepository::count_for_user(db, user_id, category).await?;
    let pagination = Pagination::new(page, PER_PAGE, total);

    let jokes = JokesRepository::find_page(
        db,
        user_id,
        category,
        pagination.offset(),
        pagination.per_page,
    )
    .await?;

    let ids: Vec<i32> = jokes.iter().map(|j| j.id).collect();
    let favorite_ids = JokesRepository::favorite_ids(db, user_id, &ids).await?;
    let categories = CategoriesRepository::find_all(db).await?;

    Ok(JokesPage {
        pagination,
        jokes,
        favorite_ids,
        categories,
    })
}

// ==================== 收藏 ====================

/// 收藏笑话，只能收藏自己保存的笑话
pub async fn add_favorite(
    db: &DatabaseConnection,
    user_id: i32,
    joke_id: i32,
) -> Result<FavoriteResponse, AppError> {
    if JokesRepository::find_owned(db, user_id, joke_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound(
            "Joke not found or access denied.".to_string(),
        ));
    }

    FavoritesRepository::add(db, user_id, joke_id).await?;
    Ok(FavoriteResponse::ok("Added to favorites!"))
}

/// 取消收藏，未收藏时同样视为成功
pub async fn remove_favorite(
    db: &DatabaseConnection,
    user_id: i32,
    joke_id: i32,
) -> Result<FavoriteResponse, AppError> {
    FavoritesRepository::remove(db, user_id, joke_id).await?;
    Ok(FavoriteResponse::ok("Removed from favorites!"))
}

pub async fn check_favorite(
    db: &DatabaseConnection,
    user_id: i32,
    joke_id: i32,
) -> Result<FavoriteResponse, AppError> {
    let is_favorite = FavoritesRepository::is_favorite(db, user_id, joke_id).await?;
    Ok(FavoriteResponse::status(is_favorite))
}

/// 收藏列表页数据
#[derive(Debug, Clone)]
pub struct FavoritesPage {
    pub pagination: Pagination,
    pub jokes: Vec<FavoriteJoke>,
}

pub async fn favorites_page(
    db: &DatabaseConnection,
    user_id: i32,
    page: Option<i64>,
) -> Result<FavoritesPage, AppError> {
    let total = FavoritesRepository::count_for_user(db, user_id).await?;
    let pagination = Pagination::new(page, PER_PAGE, total);

    let jokes =
        FavoritesRepository::find_page(db, user_id, pagination.offset(), pagination.per_page)
            .await?;

    Ok(FavoritesPage { pagination, jokes })
}

// ==================== 账户 ====================

fn validate_registration(form: &RegisterForm) -> Result<(), AppError> {
    let username = form.username.trim();
    let email = form.email.trim();

    if !(3..=50).contains(&username.chars().count()) {
        return Err(AppError::BadRequest(
            "Username must be between 3 and 50 characters.".to_string(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(AppError::BadRequest(
            "Username may only contain letters, digits, '_', '-' and '.'.".to_string(),
        ));
    }
    if email.is_empty() || email.len() > 100 || !email.contains('@') {
        return Err(AppError::BadRequest(
            "Please enter a valid email address.".to_string(),
        ));
    }
    if form.password.chars().count() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters.".to_string(),
        ));
    }
    if form.password != form.confirm_password {
        return Err(AppError::BadRequest("Passwords do not match.".to_string()));
    }

    Ok(())
}

/// 注册新用户
pub async fn register(db: &DatabaseConnection, form: &RegisterForm) -> Result<users::Model, AppError> {
    validate_registration(form)?;

    let username = form.username.trim();
    let email = form.email.trim().to_lowercase();

    if UsersRepository::username_exists(db, username).await? {
        return Err(AppError::Conflict("Username is already taken.".to_string()));
    }
    if UsersRepository::email_exists(db, &email).await? {
        return Err(AppError::Conflict(
            "Email is already registered.".to_string(),
        ));
    }

    let password_hash = hash_password(&form.password).map_err(AppError::Internal)?;

    // 并发注册时由唯一约束兜底
    let user = UsersRepository::create(db, username.to_string(), email, password_hash)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("Username or email is already registered.".to_string())
            }
            _ => AppError::Database(e),
        })?;

    log::info!("新用户注册: {} (id={})", user.username, user.id);
    Ok(user)
}

/// 登录并创建会话
pub async fn login(
    db: &DatabaseConnection,
    form: &LoginForm,
    session_ttl: Duration,
) -> Result<(users::Model, sessions::Model), AppError> {
    let user = UsersRepository::find_by_username(db, form.username.trim())
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&form.password, &user.password_hash) {
        log::info!("用户 {} 登录失败：密码错误", user.username);
        return Err(AppError::InvalidCredentials);
    }

    let purged = SessionsRepository::purge_expired(db).await?;
    if purged > 0 {
        log::debug!("清理过期会话 {} 个", purged);
    }

    let session = SessionsRepository::create(db, user.id, session_ttl).await?;
    log::info!("用户 {} 登录成功", user.username);

    Ok((user, session))
}

/// 登出，会话不存在时忽略
pub async fn logout(db: &DatabaseConnection, token: &str) -> Result<(), AppError> {
    SessionsRepository::delete(db, token).await?;
    Ok(())
}

/// 根据 cookie token 解析当前用户
pub async fn current_user(
    db: &DatabaseConnection,
    token: &str,
) -> Result<Option<users::Model>, AppError> {
    match SessionsRepository::find_valid(db, token).await? {
        Some(session) => Ok(UsersRepository::find_by_id(db, session.user_id).await?),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::repository::test_support::test_db;
    use crate::joke_api::{ApiJoke, JokeApiError};
    use async_trait::async_trait;
    use reqwest::StatusCode;

    struct FixedJokes;

    #[async_trait]
    impl JokeSource for FixedJokes {
        async fn categories(&self) -> Result<Vec<String>, JokeApiError> {
            Ok(vec!["dev".to_string(), "animal".to_string()])
        }

        async fn random_joke(&self, category: &str) -> Result<ApiJoke, JokeApiError> {
            if category == "broken" {
                return Err(JokeApiError::Status(StatusCode::NOT_FOUND));
            }
            Ok(ApiJoke {
                id: format!("{category}-1"),
                value: format!("Chuck Norris wrote the {category} joke."),
                categories: vec![category.to_string()],
                url: None,
                icon_url: None,
            })
        }
    }

    fn register_form(username: &str, email: &str) -> RegisterForm {
        RegisterForm {
            username: username.to_string(),
            email: email.to_string(),
            password: "correct horse".to_string(),
            confirm_password: "correct horse".to_string(),
        }
    }

    async fn registered(db: &DatabaseConnection, name: &str) -> users::Model {
        register(db, &register_form(name, &format!("{name}@example.com")))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn fetch_categories_stores_them() {
        let db = test_db().await;
        let names = fetch_categories(&db, &FixedJokes).await.unwrap();
        assert_eq!(names.len(), 2);

        let stored = stored_categories(&db).await.unwrap();
        let stored: Vec<_> = stored.into_iter().map(|c| c.category_name).collect();
        assert_eq!(stored, vec!["animal", "dev"]);
    }

    #[tokio::test]
    async fn random_joke_is_saved_once() {
        let db = test_db().await;
        let user = registered(&db, "alice").await;

        let first = fetch_random_joke(&db, &FixedJokes, user.id, "travel").await.unwrap();
        let second = fetch_random_joke(&db, &FixedJokes, user.id, "travel").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.category, "travel");
        assert_eq!(stored_jokes(&db, user.id, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn upstream_failure_saves_nothing() {
        let db = test_db().await;
        let user = registered(&db, "alice").await;

        let err = fetch_random_joke(&db, &FixedJokes, user.id, "broken").await.unwrap_err();
        assert!(matches!(err, AppError::JokeApi(_)));
        assert!(stored_jokes(&db, user.id, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn favorites_require_ownership() {
        let db = test_db().await;
        let alice = registered(&db, "alice").await;
        let bob = registered(&db, "bob").await;
        let joke = fetch_random_joke(&db, &FixedJokes, alice.id, "dev").await.unwrap();

        let err = add_favorite(&db, bob.id, joke.id).await.unwrap_err();
        assert_eq!(err.public_message(), "Joke not found or access denied.");

        let ok = add_favorite(&db, alice.id, joke.id).await.unwrap();
        assert_eq!(ok.message, "Added to favorites!");
        assert!(add_favorite(&db, alice.id, joke.id).await.unwrap().success);

        assert_eq!(check_favorite(&db, alice.id, joke.id).await.unwrap().is_favorite, Some(true));
        assert_eq!(check_favorite(&db, bob.id, joke.id).await.unwrap().is_favorite, Some(false));

        remove_favorite(&db, alice.id, joke.id).await.unwrap();
        let again = remove_favorite(&db, alice.id, joke.id).await.unwrap();
        assert_eq!(again.message, "Removed from favorites!");
        assert_eq!(check_favorite(&db, alice.id, joke.id).await.unwrap().is_favorite, Some(false));
    }

    #[tokio::test]
    async fn jokes_page_marks_favorites() {
        let db = test_db().await;
        let user = registered(&db, "alice").await;
        let a = fetch_random_joke(&db, &FixedJokes, user.id, "dev").await.unwrap();
        let b = fetch_random_joke(&db, &FixedJokes, user.id, "animal").await.unwrap();
        add_favorite(&db, user.id, b.id).await.unwrap();

        let page = jokes_page(&db, user.id, None, None).await.unwrap();
        assert_eq!(page.pagination.total, 2);
        assert!(page.favorite_ids.contains(&b.id));
        assert!(!page.favorite_ids.contains(&a.id));

        let filtered = jokes_page(&db, user.id, Some(1), Some("dev")).await.unwrap();
        assert_eq!(filtered.jokes.len(), 1);
        assert_eq!(filtered.jokes[0].id, a.id);

        let favorites = favorites_page(&db, user.id, None).await.unwrap();
        assert_eq!(favorites.pagination.total, 1);
        assert_eq!(favorites.jokes[0].id, b.id);
    }

    #[tokio::test]
    async fn stored_jokes_limit_is_clamped() {
        let db = test_db().await;
        let user = registered(&db, "alice").await;
        fetch_random_joke(&db, &FixedJokes, user.id, "dev").await.unwrap();
        fetch_random_joke(&db, &FixedJokes, user.id, "animal").await.unwrap();

        assert_eq!(stored_jokes(&db, user.id, Some(0)).await.unwrap().len(), 1);
        assert_eq!(stored_jokes(&db, user.id, Some(500)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn registration_rejects_duplicates() {
        let db = test_db().await;
        registered(&db, "alice").await;

        let same_name = register(&db, &register_form("alice", "other@example.com")).await;
        assert!(matches!(same_name, Err(AppError::Conflict(_))));

        let same_email = register(&db, &register_form("alicia", "ALICE@example.com")).await;
        assert!(matches!(same_email, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn registration_validates_input() {
        let db = test_db().await;

        let short = register(&db, &register_form("al", "al@example.com")).await;
        assert!(matches!(short, Err(AppError::BadRequest(_))));

        let bad_email = register(&db, &register_form("alice", "nope")).await;
        assert!(matches!(bad_email, Err(AppError::BadRequest(_))));

        let mut mismatch = register_form("alice", "alice@example.com");
        mismatch.confirm_password = "something else".to_string();
        assert!(matches!(
            register(&db, &mismatch).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn login_logout_cycle() {
        let db = test_db().await;
        registered(&db, "alice").await;

        let wrong = LoginForm {
            username: "alice".to_string(),
            password: "wrong password".to_string(),
        };
        assert!(matches!(
            login(&db, &wrong, Duration::from_secs(60)).await,
            Err(AppError::InvalidCredentials)
        ));

        let form = LoginForm {
            username: "alice".to_string(),
            password: "correct horse".to_string(),
        };
        let (user, session) = login(&db, &form, Duration::from_secs(60)).await.unwrap();
        let current = current_user(&db, &session.id).await.unwrap().unwrap();
        assert_eq!(current.id, user.id);

        logout(&db, &session.id).await.unwrap();
        assert!(current_user(&db, &session.id).await.unwrap().is_none());
    }
}
