pub mod logs;
pub mod pagination;
pub mod password;
