// ============================================================================
// TESTING - Dobles de prueba compartidos
// ============================================================================
// API guionizada, superficie que graba y ejecución de futuros sin navegador.
// Solo se compila bajo cfg(test).
// ============================================================================

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;

use futures::channel::oneshot;

use crate::models::{FavoriteRow, SearchResult, Stock, Theme, UserSettings};
use crate::services::api_client::{ApiError, CheckAuthResponse, StockApi};
use crate::surface::RenderSurface;

pub fn run<F: Future>(fut: F) -> F::Output {
    futures::executor::block_on(fut)
}

/// API guionizada. Registra cada llamada y permite inyectar fallos o
/// "puertas" (oneshot) para controlar el orden de llegada de respuestas.
#[derive(Default)]
pub struct MockApi {
    pub calls: RefCell<Vec<String>>,
    pub favorites: RefCell<Vec<FavoriteRow>>,
    pub favorites_error: RefCell<Option<ApiError>>,
    pub top_stocks: RefCell<Vec<Stock>>,
    pub check_auth_response: RefCell<Option<Result<CheckAuthResponse, ApiError>>>,
    pub fail_add: Cell<bool>,
    pub fail_remove: Cell<bool>,
    pub fail_notification: Cell<bool>,
    pub fail_mirror: Cell<bool>,
    pub fail_logout: Cell<bool>,
    pub search_response: RefCell<Option<Result<SearchResult, ApiError>>>,
    pub gates: RefCell<VecDeque<oneshot::Receiver<Result<(), ApiError>>>>,
}

impl MockApi {
    pub fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }

    pub fn calls_matching(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Encola una puerta; la siguiente mutación esperará a que el test
    /// complete el emisor correspondiente
    pub fn push_gate(&self) -> oneshot::Sender<Result<(), ApiError>> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().push_back(rx);
        tx
    }

    async fn pass_gate(&self, fallback: Result<(), ApiError>) -> Result<(), ApiError> {
        let gate = self.gates.borrow_mut().pop_front();
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(ApiError::Network("puerta cancelada".into()))),
            None => fallback,
        }
    }
}

impl StockApi for MockApi {
    async fn check_auth(&self) -> Result<CheckAuthResponse, ApiError> {
        self.record("check_auth");
        self.check_auth_response
            .borrow()
            .clone()
            .unwrap_or_else(|| Err(ApiError::Network("sin guion".into())))
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.record("logout");
        if self.fail_logout.get() {
            return Err(ApiError::Network("backend caído".into()));
        }
        Ok(())
    }

    async fn fetch_top_stocks(&self) -> Result<Vec<Stock>, ApiError> {
        self.record("fetch_top_stocks");
        Ok(self.top_stocks.borrow().clone())
    }

    async fn fetch_favorites(&self, user_id: &str) -> Result<Vec<FavoriteRow>, ApiError> {
        self.record(format!("fetch_favorites:{}", user_id));
        if let Some(err) = self.favorites_error.borrow().clone() {
            return Err(err);
        }
        Ok(self.favorites.borrow().clone())
    }

    async fn add_favorite(
        &self,
        _user_id: &str,
        company_name: &str,
        ticker: &str,
        notification: bool,
    ) -> Result<(), ApiError> {
        self.record(format!("add:{}:{}:{}", ticker, company_name, notification));
        let fallback = if self.fail_add.get() {
            Err(ApiError::Status(500))
        } else {
            Ok(())
        };
        self.pass_gate(fallback).await
    }

    async fn remove_favorite(&self, _user_id: &str, ticker: &str) -> Result<(), ApiError> {
        self.record(format!("remove:{}", ticker));
        let fallback = if self.fail_remove.get() {
            Err(ApiError::Status(500))
        } else {
            Ok(())
        };
        self.pass_gate(fallback).await
    }

    async fn update_notification(
        &self,
        _user_id: &str,
        company_name: &str,
        notification: bool,
    ) -> Result<(), ApiError> {
        self.record(format!("notify:{}:{}", company_name, notification));
        if self.fail_notification.get() {
            return Err(ApiError::Status(500));
        }
        Ok(())
    }

    async fn update_refresh_time(&self, _user_id: &str, refresh_time: u32) -> Result<(), ApiError> {
        self.record(format!("refresh_time:{}", refresh_time));
        Ok(())
    }

    async fn mirror_settings(
        &self,
        _user_id: &str,
        settings: &UserSettings,
    ) -> Result<(), ApiError> {
        self.record(format!(
            "mirror:{}",
            serde_json::to_string(settings).unwrap_or_default()
        ));
        if self.fail_mirror.get() {
            return Err(ApiError::Network("backend caído".into()));
        }
        Ok(())
    }

    async fn search_stock(&self, name: &str) -> Result<SearchResult, ApiError> {
        self.record(format!("search:{}", name));
        self.search_response
            .borrow()
            .clone()
            .unwrap_or(Err(ApiError::NotFound))
    }
}

/// Superficie que solo graba lo que le piden pintar
#[derive(Default)]
pub struct RecordingSurface {
    pub rerenders: Cell<u32>,
    pub errors: RefCell<Vec<String>>,
    pub successes: RefCell<Vec<String>>,
    pub themes: RefCell<Vec<Theme>>,
}

impl RenderSurface for RecordingSurface {
    fn rerender(&self) {
        self.rerenders.set(self.rerenders.get() + 1);
    }

    fn apply_theme(&self, theme: Theme) {
        self.themes.borrow_mut().push(theme);
    }

    fn notify_error(&self, message: &str) {
        self.errors.borrow_mut().push(message.to_string());
    }

    fn notify_success(&self, message: &str) {
        self.successes.borrow_mut().push(message.to_string());
    }
}
