use crate::entity::prelude::*;
use crate::entity::users;
use sea_orm::*;

/// 用户数据仓库
pub struct UsersRepository;

impl UsersRepository {
    /// 创建用户
    ///
    /// 用户名或邮箱重复时由唯一约束拒绝，返回的 `DbErr` 可用
    /// [`DbErr::sql_err`] 判断是否为 `UniqueConstraintViolation`
    pub async fn create(
        db: &DatabaseConnection,
        username: String,
        email: String,
        password_hash: String,
    ) -> Result<users::Model, DbErr> {
        let now = chrono::Utc::now().timestamp();

        let user = users::ActiveModel {
            id: NotSet,
            username: Set(username),
            email: Set(email),
            password_hash: Set(password_hash),
            created_at: Set(now),
        };

        user.insert(db).await
    }

    /// 根据 ID 查询用户
    pub async fn find_by_id(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<users::Model>, DbErr> {
        Users::find_by_id(id).one(db).await
    }

    /// 根据用户名查询用户
    pub async fn find_by_username(
        db: &DatabaseConnection,
        username: &str,
    ) -> Result<Option<users::Model>, DbErr> {
        Users::find()
            .filter(users::Column::Username.eq(username))
            .one(db)
            .await
    }

    /// 检查用户名是否已被占用
    pub async fn username_exists(db: &DatabaseConnection, username: &str) -> Result<bool, DbErr> {
        Ok(Users::find()
            .filter(users::Column::Username.eq(username))
            .count(db)
            .await?
            > 0)
    }

    /// 检查邮箱是否已被占用
    pub async fn email_exists(db: &DatabaseConnection, email: &str) -> Result<bool, DbErr> {
        Ok(Users::find()
            .filter(users::Column::Email.eq(email))
            .count(db)
            .await?
            > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::repository::test_support::{create_user, test_db};

    #[tokio::test]
    async fn create_and_find() {
        let db = test_db().await;
        let user = create_user(&db, "walker").await;

        let by_id = UsersRepository::find_by_id(&db, user.id).await.unwrap();
        assert_eq!(by_id.as_ref().map(|u| u.username.as_str()), Some("walker"));

        let by_name = UsersRepository::find_by_username(&db, "walker")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_name.id, user.id);
        assert!(UsersRepository::find_by_username(&db, "ranger").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn username_must_be_unique() {
        let db = test_db().await;
        create_user(&db, "walker").await;

        let err = UsersRepository::create(
            &db,
            "walker".to_string(),
            "other@example.com".to_string(),
            "hash".to_string(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err.sql_err(),
            Some(SqlErr::UniqueConstraintViolation(_))
        ));
    }

    #[tokio::test]
    async fn email_must_be_unique() {
        let db = test_db().await;
        create_user(&db, "walker").await;

        let result = UsersRepository::create(
            &db,
            "texas".to_string(),
            "walker@example.com".to_string(),
            "hash".to_string(),
        )
        .await;

        assert!(result.is_err());
        assert!(UsersRepository::email_exists(&db, "walker@example.com").await.unwrap());
        assert!(UsersRepository::username_exists(&db, "walker").await.unwrap());
        assert!(!UsersRepository::username_exists(&db, "texas").await.unwrap());
    }
}
