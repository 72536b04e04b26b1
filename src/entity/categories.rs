//! 笑话分类实体
//!
//! 分类名称来自外部 API，首次拉取时惰性创建。

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub category_name: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::jokes::Entity")]
    Jokes,
}

impl Related<super::jokes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Jokes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
