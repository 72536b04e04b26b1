//! 数据实体模块
//!
//! 包含所有 SeaORM 实体定义。

pub mod prelude;

// === SeaORM 实体（对应数据库表）===
pub mod categories;
pub mod favorites;
pub mod jokes;
pub mod sessions;
pub mod users;
