use crate::config::Config;
use crate::db::SqliteStore;
use crate::overlay::Overlay;
use crate::store::ScheduleStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ScheduleStore>,
    pub overlay: Arc<Overlay<SqliteStore>>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: ScheduleStore, overlay: Overlay<SqliteStore>, config: Config) -> Self {
        Self {
            store: Arc::new(store),
            overlay: Arc::new(overlay),
            config: Arc::new(config),
        }
    }
}
