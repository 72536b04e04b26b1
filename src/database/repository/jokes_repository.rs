//! 笑话数据仓库
//!
//! 所有查询都限定在某个用户名下：一个用户看不到另一个用户保存的笑话。

use std::collections::HashSet;

use crate::entity::prelude::*;
use crate::entity::{categories, favorites, jokes};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use serde::{Deserialize, Serialize};

/// 笑话及其分类名称（jokes JOIN categories）
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize, Deserialize)]
pub struct JokeWithCategory {
    pub id: i32,
    pub joke_text: String,
    pub api_id: String,
    pub category_name: String,
    pub created_at: i64,
}

/// 用于插入笑话的数据
#[derive(Debug, Clone)]
pub struct NewJoke {
    pub user_id: i32,
    pub category_id: i32,
    pub api_id: String,
    pub joke_text: String,
}

pub struct JokesRepository;

impl JokesRepository {
    // ==================== 写入 ====================

    /// 为用户保存笑话
    ///
    /// 同一用户已保存过相同 `api_id` 时不再插入，直接返回已有记录
    pub async fn insert_for_user<C>(db: &C, joke: NewJoke) -> Result<jokes::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        if let Some(existing) = Self::find_by_api_id(db, joke.user_id, &joke.api_id).await? {
            return Ok(existing);
        }

        let now = chrono::Utc::now().timestamp();
        let active = jokes::ActiveModel {
            id: NotSet,
            joke_text: Set(joke.joke_text),
            category_id: Set(joke.category_id),
            api_id: Set(joke.api_id.clone()),
            user_id: Set(joke.user_id),
            created_at: Set(now),
        };

        // 并发请求可能同时通过上面的检查，由唯一索引兜底
        Jokes::insert(active)
            .on_conflict(
                OnConflict::columns([jokes::Column::UserId, jokes::Column::ApiId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;

        Self::find_by_api_id(db, joke.user_id, &joke.api_id)
            .await?
            .ok_or(DbErr::RecordNotInserted)
    }

    // ==================== 查询 ====================

    pub async fn find_by_api_id<C>(
        db: &C,
        user_id: i32,
        api_id: &str,
    ) -> Result<Option<jokes::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Jokes::find()
            .filter(jokes::Column::UserId.eq(user_id))
            .filter(jokes::Column::ApiId.eq(api_id))
            .one(db)
            .await
    }

    /// 查询属于该用户的笑话
    pub async fn find_owned(
        db: &DatabaseConnection,
        user_id: i32,
        joke_id: i32,
    ) -> Result<Option<jokes::Model>, DbErr> {
        Jokes::find_by_id(joke_id)
            .filter(jokes::Column::UserId.eq(user_id))
            .one(db)
            .await
    }

    /// 带分类名称的基础查询，按保存时间倒序（同一秒内按 ID 倒序）
    fn with_category(user_id: i32, category: Option<&str>) -> Select<Jokes> {
        let mut query = Jokes::find()
            .select_only()
            .column(jokes::Column::Id)
            .column(jokes::Column::JokeText)
            .column(jokes::Column::ApiId)
            .column(categories::Column::CategoryName)
            .column(jokes::Column::CreatedAt)
            .join(JoinType::InnerJoin, jokes::Relation::Categories.def())
            .filter(jokes::Column::UserId.eq(user_id));

        if let Some(name) = category {
            query = query.filter(categories::Column::CategoryName.eq(name));
        }

        query
            .order_by_desc(jokes::Column::CreatedAt)
            .order_by_desc(jokes::Column::Id)
    }

    /// 获取用户最近保存的笑话
    pub async fn find_recent(
        db: &DatabaseConnection,
        user_id: i32,
        limit: u64,
    ) -> Result<Vec<JokeWithCategory>, DbErr> {
        Self::with_category(user_id, None)
            .limit(limit)
            .into_model::<JokeWithCategory>()
            .all(db)
            .await
    }

    /// 统计用户的笑话数量，可按分类名称过滤
    pub async fn count_for_user(
        db: &DatabaseConnection,
        user_id: i32,
        category: Option<&str>,
    ) -> Result<u64, DbErr> {
        let mut query = Jokes::find()
            .join(JoinType::InnerJoin, jokes::Relation::Categories.def())
            .filter(jokes::Column::UserId.eq(user_id));

        if let Some(name) = category {
            query = query.filter(categories::Column::CategoryName.eq(name));
        }

        query.count(db).await
    }

    /// 分页获取用户的笑话，可按分类名称过滤
    pub async fn find_page(
        db: &DatabaseConnection,
        user_id: i32,
        category: Option<&str>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<JokeWithCategory>, DbErr> {
        Self::with_category(user_id, category)
            .offset(offset)
            .limit(limit)
            .into_model::<JokeWithCategory>()
            .all(db)
            .await
    }

    /// 返回 `joke_ids` 中已被该用户收藏的 ID
    pub async fn favorite_ids(
        db: &DatabaseConnection,
        user_id: i32,
        joke_ids: &[i32],
    ) -> Result<HashSet<i32>, DbErr> {
        if joke_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let rows = Favorites::find()
            .filter(favorites::Column::UserId.eq(user_id))
            .filter(favorites::Column::JokeId.is_in(joke_ids.iter().copied()))
            .all(db)
            .await?;

        Ok(rows.into_iter().map(|f| f.joke_id).collect())
    }
}
