pub mod categories_repository;
pub mod favorites_repository;
pub mod jokes_repository;
pub mod sessions_repository;
pub mod users_repository;
