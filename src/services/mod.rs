pub mod api_client;
pub mod auth_service;

pub use api_client::{ApiError, CheckAuthResponse, HttpApiClient, StockApi};
pub use auth_service::{verify, AuthStatus};
