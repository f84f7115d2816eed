// ============================================================================
// API CLIENT - SOLO COMUNICACIÓN HTTP (Stateless)
// ============================================================================
// NO tiene lógica de negocio, solo hace requests HTTP.
// Los stores dependen del trait StockApi, no del cliente concreto, para
// poder inyectar un mock fuera del navegador.
// ============================================================================

use gloo_net::http::{Request, Response};
use serde::Deserialize;
use web_sys::RequestCredentials;

use crate::models::{FavoriteRow, SearchResult, Stock, TopStocksResponse, UserSettings};
use crate::utils::constants::BACKEND_URL;

/// Taxonomía de fallos de la frontera de red
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("recurso no encontrado")]
    NotFound,
    #[error("error del servidor (HTTP {0})")]
    Server(u16),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("error de red: {0}")]
    Network(String),
    #[error("respuesta inválida: {0}")]
    Decode(String),
}

/// Respuesta de GET /check-auth
#[derive(Deserialize, Debug, Clone, Default)]
pub struct CheckAuthResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Operaciones que el backend expone al dashboard
#[allow(async_fn_in_trait)]
pub trait StockApi {
    async fn check_auth(&self) -> Result<CheckAuthResponse, ApiError>;
    async fn logout(&self) -> Result<(), ApiError>;
    async fn fetch_top_stocks(&self) -> Result<Vec<Stock>, ApiError>;
    /// 404 no es un error: un usuario sin favoritos es un estado normal
    async fn fetch_favorites(&self, user_id: &str) -> Result<Vec<FavoriteRow>, ApiError>;
    async fn add_favorite(
        &self,
        user_id: &str,
        company_name: &str,
        ticker: &str,
        notification: bool,
    ) -> Result<(), ApiError>;
    async fn remove_favorite(&self, user_id: &str, ticker: &str) -> Result<(), ApiError>;
    async fn update_notification(
        &self,
        user_id: &str,
        company_name: &str,
        notification: bool,
    ) -> Result<(), ApiError>;
    async fn update_refresh_time(&self, user_id: &str, refresh_time: u32) -> Result<(), ApiError>;
    async fn mirror_settings(
        &self,
        user_id: &str,
        settings: &UserSettings,
    ) -> Result<(), ApiError>;
    async fn search_stock(&self, name: &str) -> Result<SearchResult, ApiError>;
}

/// Cliente real sobre gloo-net
#[derive(Clone)]
pub struct HttpApiClient {
    base_url: String,
}

impl HttpApiClient {
    pub fn new() -> Self {
        Self { base_url: BACKEND_URL.to_string() }
    }

    fn network(e: gloo_net::Error) -> ApiError {
        ApiError::Network(e.to_string())
    }

    fn decode(e: gloo_net::Error) -> ApiError {
        ApiError::Decode(e.to_string())
    }

    fn ensure_ok(response: &Response) -> Result<(), ApiError> {
        if response.ok() {
            Ok(())
        } else {
            Err(ApiError::Status(response.status()))
        }
    }
}

impl Default for HttpApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl StockApi for HttpApiClient {
    async fn check_auth(&self) -> Result<CheckAuthResponse, ApiError> {
        let url = format!("{}/check-auth", self.base_url);
        let response = Request::get(&url)
            .credentials(RequestCredentials::Include)
            .send()
            .await
            .map_err(Self::network)?;
        Self::ensure_ok(&response)?;
        response.json::<CheckAuthResponse>().await.map_err(Self::decode)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let url = format!("{}/logout", self.base_url);
        let response = Request::post(&url)
            .credentials(RequestCredentials::Include)
            .send()
            .await
            .map_err(Self::network)?;
        Self::ensure_ok(&response)
    }

    async fn fetch_top_stocks(&self) -> Result<Vec<Stock>, ApiError> {
        let url = format!("{}/top_stocks", self.base_url);
        let response = Request::get(&url)
            .credentials(RequestCredentials::Include)
            .send()
            .await
            .map_err(Self::network)?;
        Self::ensure_ok(&response)?;
        let body = response.json::<TopStocksResponse>().await.map_err(Self::decode)?;
        Ok(body.top_stocks.into_iter().map(Stock::from).collect())
    }

    async fn fetch_favorites(&self, user_id: &str) -> Result<Vec<FavoriteRow>, ApiError> {
        let url = format!("{}/favorites", self.base_url);
        let response = Request::get(&url)
            .query([("user_id", user_id)])
            .credentials(RequestCredentials::Include)
            .send()
            .await
            .map_err(Self::network)?;
        if response.status() == 404 {
            return Ok(Vec::new());
        }
        Self::ensure_ok(&response)?;
        // El backend a veces devuelve algo que no es un array; se trata
        // como lista vacía igual que hacía la página original
        match response.json::<Vec<FavoriteRow>>().await {
            Ok(rows) => Ok(rows),
            Err(e) => {
                log::warn!("⚠️ Respuesta de /favorites no es una lista: {}", e);
                Ok(Vec::new())
            }
        }
    }

    async fn add_favorite(
        &self,
        user_id: &str,
        company_name: &str,
        ticker: &str,
        notification: bool,
    ) -> Result<(), ApiError> {
        let url = format!("{}/update_subscription", self.base_url);
        let body = serde_json::json!({
            "user_id": user_id,
            "company_name": company_name,
            "subscription": ticker,
            "notification": notification,
        });
        let response = Request::post(&url)
            .credentials(RequestCredentials::Include)
            .json(&body)
            .map_err(Self::network)?
            .send()
            .await
            .map_err(Self::network)?;
        Self::ensure_ok(&response)
    }

    async fn remove_favorite(&self, user_id: &str, ticker: &str) -> Result<(), ApiError> {
        let url = format!("{}/update_subscription/{}", self.base_url, ticker);
        let response = Request::post(&url)
            .query([("user_id", user_id)])
            .credentials(RequestCredentials::Include)
            .send()
            .await
            .map_err(Self::network)?;
        Self::ensure_ok(&response)
    }

    async fn update_notification(
        &self,
        user_id: &str,
        company_name: &str,
        notification: bool,
    ) -> Result<(), ApiError> {
        let url = format!("{}/update_notification", self.base_url);
        let body = serde_json::json!({
            "user_id": user_id,
            "company_name": company_name,
            "notification": notification,
        });
        let response = Request::post(&url)
            .credentials(RequestCredentials::Include)
            .json(&body)
            .map_err(Self::network)?
            .send()
            .await
            .map_err(Self::network)?;
        Self::ensure_ok(&response)
    }

    async fn update_refresh_time(&self, user_id: &str, refresh_time: u32) -> Result<(), ApiError> {
        let url = format!("{}/update_refresh_time", self.base_url);
        let body = serde_json::json!({
            "user_id": user_id,
            "refresh_time": refresh_time,
        });
        let response = Request::post(&url)
            .credentials(RequestCredentials::Include)
            .json(&body)
            .map_err(Self::network)?
            .send()
            .await
            .map_err(Self::network)?;
        Self::ensure_ok(&response)
    }

    async fn mirror_settings(
        &self,
        user_id: &str,
        settings: &UserSettings,
    ) -> Result<(), ApiError> {
        let url = format!("{}/api/user/settings", self.base_url);
        let body = serde_json::json!({
            "userId": user_id,
            "settings": settings,
        });
        let response = Request::post(&url)
            .credentials(RequestCredentials::Include)
            .json(&body)
            .map_err(Self::network)?
            .send()
            .await
            .map_err(Self::network)?;
        Self::ensure_ok(&response)
    }

    async fn search_stock(&self, name: &str) -> Result<SearchResult, ApiError> {
        let url = format!("{}/stocks/search", self.base_url);
        let response = Request::get(&url)
            .query([("name", name)])
            .credentials(RequestCredentials::Include)
            .send()
            .await
            .map_err(Self::network)?;
        match response.status() {
            404 => return Err(ApiError::NotFound),
            s if s >= 500 => return Err(ApiError::Server(s)),
            s if !response.ok() => return Err(ApiError::Status(s)),
            _ => {}
        }
        response.json::<SearchResult>().await.map_err(Self::decode)
    }
}
