use std::time::Duration;

use crate::entity::prelude::*;
use crate::entity::sessions;
use sea_orm::*;

/// 会话数据仓库
pub struct SessionsRepository;

impl SessionsRepository {
    /// 为用户创建会话，返回会话记录（ID 即 cookie token）
    pub async fn create(
        db: &DatabaseConnection,
        user_id: i32,
        ttl: Duration,
    ) -> Result<sessions::Model, DbErr> {
        let now = chrono::Utc::now().timestamp();
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);

        let session = sessions::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            user_id: Set(user_id),
            created_at: Set(now),
            expires_at: Set(now.saturating_add(ttl)),
        };

        session.insert(db).await
    }

    /// 查询未过期的会话
    ///
    /// 已过期的会话会被顺手删除
    pub async fn find_valid(
        db: &DatabaseConnection,
        token: &str,
    ) -> Result<Option<sessions::Model>, DbErr> {
        let Some(session) = Sessions::find_by_id(token.to_owned()).one(db).await? else {
            return Ok(None);
        };

        if session.expires_at <= chrono::Utc::now().timestamp() {
            Sessions::delete_by_id(session.id).exec(db).await?;
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// 删除会话（登出）
    pub async fn delete(db: &DatabaseConnection, token: &str) -> Result<u64, DbErr> {
        Sessions::delete_by_id(token.to_owned())
            .exec(db)
            .await
            .map(|result| result.rows_affected)
    }

    /// 清理所有过期会话
    pub async fn purge_expired(db: &DatabaseConnection) -> Result<u64, DbErr> {
        Sessions::delete_many()
            .filter(sessions::Column::ExpiresAt.lte(chrono::Utc::now().timestamp()))
            .exec(db)
            .await
            .map(|result| result.rows_affected)
    }
}
