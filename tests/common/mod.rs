use std::sync::Arc;

use bakeshop_api::{
    db::{self, DbConfig, DbPool},
    events::{self, EventSender},
    services::AppServices,
};
use tokio::sync::mpsc;

/// Test harness backed by an in-memory SQLite database with the full schema
/// applied.
///
/// The pool is pinned to a single connection: every pooled connection to
/// `sqlite::memory:` would otherwise see its own empty database.
pub struct TestContext {
    pub db: Arc<DbPool>,
    pub services: AppServices,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestContext {
    pub async fn new() -> Self {
        let cfg = DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..DbConfig::default()
        };

        let pool = db::establish_connection_with_config(&cfg)
            .await
            .expect("connect to in-memory sqlite");
        db::run_migrations(&pool).await.expect("apply migrations");

        let db = Arc::new(pool);

        let (tx, rx) = mpsc::channel(100);
        let sender = EventSender::new(tx);
        let event_task = tokio::spawn(events::process_events(rx));

        let services = AppServices::new(db.clone(), Arc::new(sender));

        Self {
            db,
            services,
            _event_task: event_task,
        }
    }
}
