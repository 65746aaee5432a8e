// Store facades. The two components are independent of each other; both
// depend only on the shared pool and the event channel.
pub mod accounts;
pub mod catalog;

use std::sync::Arc;

use crate::db::DbPool;
use crate::events::EventSender;

/// Container wiring every service to the shared pool and event channel.
#[derive(Clone)]
pub struct AppServices {
    pub accounts: Arc<accounts::AccountService>,
    pub catalog: Arc<catalog::CatalogService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        let accounts = Arc::new(accounts::AccountService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let catalog = Arc::new(catalog::CatalogService::new(db_pool, event_sender));

        Self { accounts, catalog }
    }
}
