use crate::entity::categories;
use crate::entity::prelude::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;

/// 分类数据仓库
pub struct CategoriesRepository;

impl CategoriesRepository {
    /// 批量保存分类名称，已存在的忽略
    ///
    /// 返回实际新增的行数
    pub async fn insert_ignore_many<C>(db: &C, names: &[String]) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now().timestamp();

        let rows: Vec<categories::ActiveModel> = names
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(|name| categories::ActiveModel {
                id: NotSet,
                category_name: Set(name.to_string()),
                created_at: Set(now),
            })
            .collect();

        if rows.is_empty() {
            return Ok(0);
        }

        Categories::insert_many(rows)
            .on_conflict(
                OnConflict::column(categories::Column::CategoryName)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await
    }

    /// 根据名称查询分类
    pub async fn find_by_name<C>(db: &C, name: &str) -> Result<Option<categories::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Categories::find()
            .filter(categories::Column::CategoryName.eq(name))
            .one(db)
            .await
    }

    /// 查询分类，不存在则创建
    pub async fn find_or_create<C>(db: &C, name: &str) -> Result<categories::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::insert_ignore_many(db, &[name.to_string()]).await?;

        Self::find_by_name(db, name.trim())
            .await?
            .ok_or(DbErr::RecordNotFound(format!("Category {name} not found")))
    }

    /// 获取所有分类（按名称排序）
    pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<categories::Model>, DbErr> {
        Categories::find()
            .order_by_asc(categories::Column::CategoryName)
            .all(db)
            .await
    }
}
