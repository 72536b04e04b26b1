//! 预导入模块
//!
//! 提供常用类型的快捷导入。

pub use super::categories::Entity as Categories;
pub use super::favorites::Entity as Favorites;
pub use super::jokes::Entity as Jokes;
pub use super::sessions::Entity as Sessions;
pub use super::users::Entity as Users;
