pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod htmx;
pub mod invitations;
pub mod middleware;
pub mod models;
pub mod services;
pub mod session;
pub mod signup;
pub mod startup;
pub mod utils;
pub mod validation;

use crate::config::Settings;
use crate::services::{ApiClient, SearchSequencer};
use std::sync::Arc;

/// Shared application state: the backend client and per-user search ordering.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<ApiClient>,
    pub search: Arc<SearchSequencer>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(settings: Settings) -> Result<Self, reqwest::Error> {
        let api = ApiClient::new(&settings.backend)?;

        Ok(Self {
            api: Arc::new(api),
            search: Arc::new(SearchSequencer::new()),
            settings: Arc::new(settings),
        })
    }
}
