//! Bakeshop back-office core.
//!
//! The data-consistency layer of a small bakery e-commerce shop: an account
//! directory (one login table fanning out to role-specific profile tables)
//! and a catalog store (products grouped into categories whose lifecycle is
//! bound to product existence). Route layers, presentation, and auth flows
//! live in the callers; this crate owns the multi-table invariants.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod logging;
pub mod migrator;
pub mod services;

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tokio::sync::mpsc;

const EVENT_CHANNEL_CAPACITY: usize = 100;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: services::AppServices,
}

impl AppState {
    /// Connects the pool and wires the service facades.
    ///
    /// Returns the event receiver alongside the state; the caller usually
    /// hands it to [`events::process_events`] on a spawned task. Pool
    /// teardown is the caller's job via [`db::close_pool`] at shutdown.
    pub async fn new(
        config: config::AppConfig,
    ) -> Result<(Self, mpsc::Receiver<events::Event>), errors::AppError> {
        let pool = db::establish_connection_from_app_config(&config).await?;
        let db = Arc::new(pool);

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let event_sender = events::EventSender::new(tx);

        let services = services::AppServices::new(db.clone(), Arc::new(event_sender.clone()));

        Ok((
            Self {
                db,
                config,
                event_sender,
                services,
            },
            rx,
        ))
    }
}
