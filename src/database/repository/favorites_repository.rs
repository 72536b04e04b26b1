use crate::entity::prelude::*;
use crate::entity::{categories, favorites, jokes};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use serde::{Deserialize, Serialize};

/// 收藏的笑话（favorites JOIN jokes JOIN categories）
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize, Deserialize)]
pub struct FavoriteJoke {
    pub id: i32,
    pub joke_text: String,
    pub category_name: String,
    pub created_at: i64,
    pub favorited_at: i64,
}

/// 收藏数据仓库
pub struct FavoritesRepository;

impl FavoritesRepository {
    /// 添加收藏，已收藏时什么也不做
    ///
    /// 返回是否新增了记录。调用方负责确认笑话属于该用户
    pub async fn add(db: &DatabaseConnection, user_id: i32, joke_id: i32) -> Result<bool, DbErr> {
        let now = chrono::Utc::now().timestamp();

        let favorite = favorites::ActiveModel {
            id: NotSet,
            user_id: Set(user_id),
            joke_id: Set(joke_id),
            created_at: Set(now),
        };

        let inserted = Favorites::insert(favorite)
            .on_conflict(
                OnConflict::columns([favorites::Column::UserId, favorites::Column::JokeId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;

        Ok(inserted > 0)
    }

    /// 取消收藏，返回删除的行数（未收藏时为 0）
    pub async fn remove(db: &DatabaseConnection, user_id: i32, joke_id: i32) -> Result<u64, DbErr> {
        Favorites::delete_many()
            .filter(
                favorites::Column::UserId
                    .eq(user_id)
                    .and(favorites::Column::JokeId.eq(joke_id)),
            )
            .exec(db)
            .await
            .map(|result| result.rows_affected)
    }

    /// 检查笑话是否已被收藏
    pub async fn is_favorite(
        db: &DatabaseConnection,
        user_id: i32,
        joke_id: i32,
    ) -> Result<bool, DbErr> {
        let count = Favorites::find()
            .filter(
                favorites::Column::UserId
                    .eq(user_id)
                    .and(favorites::Column::JokeId.eq(joke_id)),
            )
            .count(db)
            .await?;

        Ok(count > 0)
    }

    /// 统计用户的收藏数量
    pub async fn count_for_user(db: &DatabaseConnection, user_id: i32) -> Result<u64, DbErr> {
        Favorites::find()
            .join(JoinType::InnerJoin, favorites::Relation::Jokes.def())
            .join(JoinType::InnerJoin, jokes::Relation::Categories.def())
            .filter(favorites::Column::UserId.eq(user_id))
            .count(db)
            .await
    }

    /// 分页获取用户的收藏，按收藏时间倒序
    pub async fn find_page(
        db: &DatabaseConnection,
        user_id: i32,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<FavoriteJoke>, DbErr> {
        Favorites::find()
            .select_only()
            .column(jokes::Column::Id)
            .column(jokes::Column::JokeText)
            .column(categories::Column::CategoryName)
            .column(jokes::Column::CreatedAt)
            .column_as(favorites::Column::CreatedAt, "favorited_at")
            .join(JoinType::InnerJoin, favorites::Relation::Jokes.def())
            .join(JoinType::InnerJoin, jokes::Relation::Categories.def())
            .filter(favorites::Column::UserId.eq(user_id))
            .order_by_desc(favorites::Column::CreatedAt)
            .order_by_desc(favorites::Column::Id)
            .offset(offset)
            .limit(limit)
            .into_model::<FavoriteJoke>()
            .all(db)
            .await
    }
}
