//! Chuck Norris 笑话 API 客户端
//!
//! 只用到两个接口：
//! - `GET jokes/categories` 返回分类名称数组
//! - `GET jokes/random?category=...` 返回单条笑话

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum JokeApiError {
    #[error("invalid API url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(StatusCode),
}

/// API 返回的笑话（只保留用到的字段，其余忽略）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiJoke {
    pub id: String,
    pub value: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
}

/// 笑话来源
///
/// 运行时使用 [`ChuckNorrisClient`]，测试中可替换为固定数据。
#[async_trait]
pub trait JokeSource: Send + Sync {
    async fn categories(&self) -> Result<Vec<String>, JokeApiError>;

    async fn random_joke(&self, category: &str) -> Result<ApiJoke, JokeApiError>;
}

pub struct ChuckNorrisClient {
    client: Client,
    base_url: Url,
}

impl ChuckNorrisClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, JokeApiError> {
        // 保证以 `/` 结尾，否则 join 会替换掉最后一段路径
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{base_url}/"))?
        };

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("chuck-jokes/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn categories_url(&self) -> Result<Url, JokeApiError> {
        Ok(self.base_url.join("jokes/categories")?)
    }

    pub fn random_joke_url(&self, category: &str) -> Result<Url, JokeApiError> {
        let mut url = self.base_url.join("jokes/random")?;
        url.query_pairs_mut().append_pair("category", category);
        Ok(url)
    }

    async fn get_json<T>(&self, url: Url) -> Result<T, JokeApiError>
    where
        T: for<'de> Deserialize<'de>,
    {
        log::debug!("请求笑话 API: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(JokeApiError::Status(status));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl JokeSource for ChuckNorrisClient {
    async fn categories(&self) -> Result<Vec<String>, JokeApiError> {
        self.get_json(self.categories_url()?).await
    }

    async fn random_joke(&self, category: &str) -> Result<ApiJoke, JokeApiError> {
        self.get_json(self.random_joke_url(category)?).await
    }
}
