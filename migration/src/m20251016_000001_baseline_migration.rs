//! 基线迁移：创建 users / categories / jokes / favorites 四张表
//!
//! 所有外键均为 ON DELETE CASCADE：
//! - 删除用户会连带删除其笑话与收藏
//! - 删除分类会连带删除该分类下的笑话
//! - 删除笑话会连带删除对应收藏

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. 用户表
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Email)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string_len(255).not_null())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 2. 分类表
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Categories::CategoryName)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Categories::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 3. 笑话表（属于某个用户和某个分类）
        manager
            .create_table(
                Table::create()
                    .table(Jokes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Jokes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Jokes::JokeText).text().not_null())
                    .col(ColumnDef::new(Jokes::CategoryId).integer().not_null())
                    .col(ColumnDef::new(Jokes::ApiId).string_len(255).not_null())
                    .col(ColumnDef::new(Jokes::UserId).integer().not_null())
                    .col(ColumnDef::new(Jokes::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_jokes_category")
                            .from(Jokes::Table, Jokes::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_jokes_user")
                            .from(Jokes::Table, Jokes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一用户不会重复保存同一个 API 笑话
        manager
            .create_index(
                Index::create()
                    .name("idx_jokes_user_api_id")
                    .table(Jokes::Table)
                    .col(Jokes::UserId)
                    .col(Jokes::ApiId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_jokes_user_created")
                    .table(Jokes::Table)
                    .col(Jokes::UserId)
                    .col(Jokes::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // 4. 收藏表（用户-笑话关联）
        manager
            .create_table(
                Table::create()
                    .table(Favorites::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Favorites::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Favorites::UserId).integer().not_null())
                    .col(ColumnDef::new(Favorites::JokeId).integer().not_null())
                    .col(ColumnDef::new(Favorites::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_favorites_user")
                            .from(Favorites::Table, Favorites::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_favorites_joke")
                            .from(Favorites::Table, Favorites::JokeId)
                            .to(Jokes::Table, Jokes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("unique_user_joke")
                    .table(Favorites::Table)
                    .col(Favorites::UserId)
                    .col(Favorites::JokeId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按依赖逆序删除
        manager
            .drop_table(Table::drop().table(Favorites::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Jokes::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    CategoryName,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Jokes {
    Table,
    Id,
    JokeText,
    CategoryId,
    ApiId,
    UserId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Favorites {
    Table,
    Id,
    UserId,
    JokeId,
    CreatedAt,
}
