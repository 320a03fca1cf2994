use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::Db;
use crate::services::notifier::AdminNotifier;
use crate::services::upload_store::UploadStore;

/// Dependências criadas uma vez no main e compartilhadas pelos handlers
/// via `web::Data<AppState>`
pub struct AppState {
    pub db: Db,
    pub config: AppConfig,
    pub uploads: UploadStore,
    pub notifier: Arc<dyn AdminNotifier>,
}
