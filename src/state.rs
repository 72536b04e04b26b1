use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::joke_api::JokeSource;

/// 所有请求共享的状态
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jokes: Arc<dyn JokeSource>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, jokes: Arc<dyn JokeSource>, config: Config) -> Self {
        Self {
            db,
            jokes,
            config: Arc::new(config),
        }
    }
}
