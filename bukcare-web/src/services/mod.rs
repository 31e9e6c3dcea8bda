pub mod admin_api;
pub mod api_client;
pub mod auth_api;
pub mod metrics;
pub mod search;
pub mod signup_api;

pub use api_client::ApiClient;
pub use search::SearchSequencer;
