//! Imageforge
//!
//! A credit-metered AI image generation service: authenticated users submit
//! prompts, a provider renders them, results are copied into durable object
//! storage and listed in a per-user gallery. Each successful generation
//! costs one credit, debited only after the image is durably stored.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod generation;
pub mod middleware;
pub mod store;

pub use error::{AppError, Result};

use std::sync::Arc;

use auth::Authenticator;
use gateway::GenerationGateway;
use generation::GenerationService;
use store::{CredentialStore, WorkLedger};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub authenticator: Arc<Authenticator>,
    pub generation: Arc<GenerationService>,
    pub ledger: Arc<dyn WorkLedger>,
}

impl AppState {
    /// Wire up the shared state from its collaborators
    pub fn new(
        settings: config::Settings,
        users: Arc<dyn CredentialStore>,
        ledger: Arc<dyn WorkLedger>,
        gateway: Arc<dyn GenerationGateway>,
    ) -> Self {
        let authenticator = Arc::new(Authenticator::new(users, settings.auth.clone()));
        let generation = Arc::new(GenerationService::new(
            ledger.clone(),
            gateway,
            &settings.provider,
        ));

        Self {
            settings,
            authenticator,
            generation,
            ledger,
        }
    }
}
