use crate::config::Config;
use crate::submission::SubmissionService;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<Config>,
    pub submissions: Arc<SubmissionService>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let db = Arc::new(db);
        Self {
            submissions: Arc::new(SubmissionService::new(db.clone())),
            db,
            config: Arc::new(config),
        }
    }
}
