use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use chuck_jokes_lib::database::connection::{MEMORY_DATABASE_URL, establish_connection};
use chuck_jokes_lib::joke_api::{ApiJoke, JokeApiError};
use chuck_jokes_lib::{AppState, Config, JokeSource, build_router};
use migration::{Migrator, MigratorTrait};
use serde_json::Value;
use tower::ServiceExt;

struct FakeJokes;

#[async_trait]
impl JokeSource for FakeJokes {
    async fn categories(&self) -> Result<Vec<String>, JokeApiError> {
        Ok(vec!["dev".to_string(), "food".to_string()])
    }

    async fn random_joke(&self, category: &str) -> Result<ApiJoke, JokeApiError> {
        if category == "offline" {
            return Err(JokeApiError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE));
        }
        Ok(ApiJoke {
            id: format!("api-{category}"),
            value: format!("Chuck Norris can divide by zero in {category}."),
            categories: vec![category.to_string()],
            url: Some(format!("https://api.chucknorris.io/jokes/api-{category}")),
            icon_url: None,
        })
    }
}

async fn app() -> Router {
    let db = establish_connection(MEMORY_DATABASE_URL, 1).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    build_router(AppState::new(db, Arc::new(FakeJokes), Config::default()))
}

fn form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

async fn text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn json(response: Response) -> Value {
    serde_json::from_str(&text(response).await).unwrap()
}

/// 注册并登录，返回可直接放进 `Cookie` 头的值
async fn sign_in(app: &Router, username: &str) -> String {
    let body = format!(
        "username={username}&email={username}%40example.com&password=roundhouse&confirm_password=roundhouse"
    );
    let response = app.clone().oneshot(form("/register", &body, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?registered=1");

    let body = format!("username={username}&password=roundhouse");
    let response = app.clone().oneshot(form("/login", &body, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(set_cookie.contains("HttpOnly"));
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn anonymous_requests_are_gated() {
    let app = app().await;

    let response = app.clone().oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let response = app.clone().oneshot(get("/favorites", None)).await.unwrap();
    assert_eq!(location(&response), "/login");

    let response = app
        .clone()
        .oneshot(form("/api/jokes/random", "category=dev", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Authentication required");

    let response = app
        .clone()
        .oneshot(get("/", Some("chuck_session=not-a-real-session")))
        .await
        .unwrap();
    assert_eq!(location(&response), "/login");

    let response = app.clone().oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text(response).await, "ok");
}

#[tokio::test]
async fn registration_and_login_errors_render_the_form() {
    let app = app().await;
    sign_in(&app, "alice").await;

    let body = "username=alice&email=other%40example.com&password=roundhouse&confirm_password=roundhouse";
    let response = app.clone().oneshot(form("/register", body, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(text(response).await.contains("Username is already taken."));

    let body = "username=bob&email=bob%40example.com&password=short&confirm_password=short";
    let response = app.clone().oneshot(form("/register", body, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(text(response).await.contains("at least 8 characters"));

    let response = app
        .clone()
        .oneshot(form("/login", "username=alice&password=wrong-password", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(text(response).await.contains("Invalid username or password."));

    let response = app.clone().oneshot(get("/login?registered=1", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(text(response).await.contains("Registration successful"));
}

#[tokio::test]
async fn jokes_and_favorites_round_trip() {
    let app = app().await;
    let cookie = sign_in(&app, "alice").await;
    let cookie = Some(cookie.as_str());

    let response = app
        .clone()
        .oneshot(form("/api/categories", "", cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await, serde_json::json!(["dev", "food"]));

    let response = app
        .clone()
        .oneshot(form("/api/jokes/random", "category=dev", cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let joke = json(response).await;
    assert_eq!(joke["category"], "dev");
    assert_eq!(joke["api_id"], "api-dev");
    let joke_id = joke["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(form("/api/jokes/random", "category=", cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json(response).await["message"], "Category not provided");

    let add = format!("joke_id={joke_id}");
    let response = app
        .clone()
        .oneshot(form("/api/favorites/add", &add, cookie))
        .await
        .unwrap();
    let body = json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Added to favorites!");

    let response = app
        .clone()
        .oneshot(form("/api/favorites/check", &add, cookie))
        .await
        .unwrap();
    assert_eq!(json(response).await["is_favorite"], true);

    let response = app
        .clone()
        .oneshot(form("/api/favorites/add", "joke_id=abc", cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json(response).await["message"], "Joke id not provided");

    let response = app.clone().oneshot(get("/jokes", cookie)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = text(response).await;
    assert!(html.contains("Chuck Norris can divide by zero in dev."));
    assert!(html.contains("Remove from Favorites"));

    let response = app.clone().oneshot(get("/jokes?category=food", cookie)).await.unwrap();
    assert!(text(response).await.contains("No jokes found for the selected category."));

    let response = app.clone().oneshot(get("/favorites", cookie)).await.unwrap();
    let html = text(response).await;
    assert!(html.contains("Favorited on"));

    let response = app.clone().oneshot(get("/api/jokes?limit=3", cookie)).await.unwrap();
    let stored = json(response).await;
    assert_eq!(stored.as_array().map(Vec::len), Some(1));
    assert_eq!(stored[0]["category_name"], "dev");

    let response = app
        .clone()
        .oneshot(form("/api/favorites/remove", &add, cookie))
        .await
        .unwrap();
    assert_eq!(json(response).await["message"], "Removed from favorites!");
}

#[tokio::test]
async fn other_users_jokes_cannot_be_favorited() {
    let app = app().await;
    let alice = sign_in(&app, "alice").await;
    let bob = sign_in(&app, "bob").await;

    let response = app
        .clone()
        .oneshot(form("/api/jokes/random", "category=dev", Some(alice.as_str())))
        .await
        .unwrap();
    let joke_id = json(response).await["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(form("/api/favorites/add", &format!("joke_id={joke_id}"), Some(bob.as_str())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Joke not found or access denied.");
}

#[tokio::test]
async fn upstream_failure_is_bad_gateway() {
    let app = app().await;
    let cookie = sign_in(&app, "alice").await;

    let response = app
        .clone()
        .oneshot(form("/api/jokes/random", "category=offline", Some(cookie.as_str())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(json(response).await["success"], false);
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let app = app().await;
    let cookie = sign_in(&app, "alice").await;

    let response = app.clone().oneshot(get("/", Some(cookie.as_str()))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(text(response).await.contains("Welcome, alice!"));

    let response = app.clone().oneshot(form("/logout", "", Some(cookie.as_str()))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    let cleared = response.headers().get(header::SET_COOKIE).unwrap();
    assert!(cleared.to_str().unwrap().contains("Max-Age=0"));

    let response = app.clone().oneshot(get("/", Some(cookie.as_str()))).await.unwrap();
    assert_eq!(location(&response), "/login");

    let response = app.clone().oneshot(get("/login", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn huge_page_numbers_render_empty_pages() {
    let app = app().await;
    let cookie = sign_in(&app, "alice").await;
    let cookie = Some(cookie.as_str());

    app.clone()
        .oneshot(form("/api/jokes/random", "category=dev", cookie))
        .await
        .unwrap();

    for uri in [
        "/jokes?page=9223372036854775807",
        "/jokes?page=3000000000000000000&category=dev",
        "/favorites?page=3000000000000000000",
        "/favorites?page=9223372036854775807",
    ] {
        let response = app.clone().oneshot(get(uri, cookie)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
    }

    let response = app
        .clone()
        .oneshot(get("/jokes?page=9223372036854775807", cookie))
        .await
        .unwrap();
    let html = text(response).await;
    assert!(!html.contains("Chuck Norris can divide by zero in dev."));
}

#[tokio::test]
async fn malformed_api_input_is_json() {
    let app = app().await;
    let cookie = sign_in(&app, "alice").await;
    let cookie = Some(cookie.as_str());

    let response = app.clone().oneshot(get("/api/jokes?limit=abc", cookie)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid limit: abc");

    let response = app.clone().oneshot(get("/api/jokes?limit=", cookie)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(json(response).await.is_array());

    // 缺少 Content-Type 的表单请求
    let request = Request::builder()
        .method("POST")
        .uri("/api/favorites/add")
        .header(header::COOKIE, cookie.unwrap())
        .body(Body::from("joke_id=1"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
    let body = json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
}
