//! 数据传输对象 (DTO)
//!
//! 表单、查询参数与 JSON 响应的结构定义。

use serde::{Deserialize, Deserializer, Serialize};

/// 辅助函数：空字符串按未提供处理
///
/// HTML 表单和查询字符串里的空值都是 `""`
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|s| {
        let trimmed = s.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }))
}

// ==================== 账户表单 ====================

#[derive(Clone, Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// `/login` 页面参数，注册成功后带 `registered=1`
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LoginPageQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub registered: Option<String>,
}

// ==================== 请求参数 ====================

/// 随机笑话请求
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RandomJokeForm {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category: Option<String>,
}

/// 收藏操作请求
///
/// `joke_id` 保留为字符串，由服务层决定如何处理非法值
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FavoriteForm {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub joke_id: Option<String>,
}

impl FavoriteForm {
    pub fn joke_id(&self) -> Option<i32> {
        self.joke_id.as_deref().and_then(|id| id.parse().ok())
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct StoredJokesQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub limit: Option<String>,
}

impl StoredJokesQuery {
    /// 未提供时为 `Ok(None)`，不是数字时返回原始值
    pub fn limit(&self) -> Result<Option<u64>, &str> {
        match self.limit.as_deref() {
            None => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|_| raw),
        }
    }
}

/// `/jokes` 页面参数
#[derive(Clone, Debug, Default, Deserialize)]
pub struct JokeListQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category: Option<String>,
}

/// `/favorites` 页面参数
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FavoritesQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<String>,
}

// ==================== JSON 响应 ====================

/// 新拉取的笑话
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JokePayload {
    /// 本地数据库中的 ID
    pub id: i32,
    pub api_id: String,
    pub value: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// 收藏操作结果
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FavoriteResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

impl FavoriteResponse {
    pub fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            is_favorite: None,
        }
    }

    pub fn status(is_favorite: bool) -> Self {
        Self {
            success: true,
            message: String::new(),
            is_favorite: Some(is_favorite),
        }
    }
}
