// ============================================================================
// STOCK DASHBOARD - Núcleo WASM
// ============================================================================
// Punto de entrada wasm-bindgen. La página llama a estas funciones desde
// sus handlers y escucha los CustomEvents que emite DomSurface para
// repintar. Todo el estado vive en el contexto App; aquí solo hay cableado.
// ============================================================================

pub mod app;
pub mod models;
pub mod services;
pub mod state;
pub mod surface;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::app::{App, IntervalScheduler, SearchOutcome};
use crate::services::api_client::HttpApiClient;
use crate::surface::DomSurface;
use crate::utils::storage::LocalStorageBackend;

type DashboardApp = App<HttpApiClient, LocalStorageBackend, IntervalScheduler>;

thread_local! {
    static APP: RefCell<Option<DashboardApp>> = const { RefCell::new(None) };
}

fn with_app<R>(f: impl FnOnce(DashboardApp) -> R) -> Option<R> {
    let app = APP.with(|slot| slot.borrow().clone());
    match app {
        Some(app) => Some(f(app)),
        None => {
            log::error!("❌ La aplicación aún no ha arrancado");
            None
        }
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("🚀 Dashboard inicializado");

    let app = App::new(
        Rc::new(HttpApiClient::new()),
        LocalStorageBackend,
        Rc::new(DomSurface),
        Rc::new(IntervalScheduler::default()),
    );
    APP.with(|slot| *slot.borrow_mut() = Some(app.clone()));
    wasm_bindgen_futures::spawn_local(async move { app.boot().await });
}

/// La página de login llama aquí tras autenticar; registra la sesión
/// local y repite el arranque autenticado
#[wasm_bindgen]
pub fn record_login(identity: String) {
    with_app(move |app| {
        wasm_bindgen_futures::spawn_local(async move { app.login(&identity).await });
    });
}

#[wasm_bindgen]
pub fn logout() {
    with_app(move |app| {
        wasm_bindgen_futures::spawn_local(async move { app.logout().await });
    });
}

#[wasm_bindgen]
pub fn toggle_favorite(ticker: String) {
    with_app(move |app| {
        wasm_bindgen_futures::spawn_local(async move { app.toggle_favorite(&ticker).await });
    });
}

#[wasm_bindgen]
pub fn toggle_notification(ticker: String) {
    with_app(move |app| {
        wasm_bindgen_futures::spawn_local(async move { app.toggle_notification(&ticker).await });
    });
}

#[wasm_bindgen]
pub fn search(name: String) {
    with_app(move |app| {
        wasm_bindgen_futures::spawn_local(async move { app.search(&name).await });
    });
}

#[wasm_bindgen]
pub fn refresh_now() {
    with_app(move |app| {
        wasm_bindgen_futures::spawn_local(async move { app.refresh_stocks().await });
    });
}

#[wasm_bindgen]
pub fn toggle_theme() {
    with_app(move |app| {
        wasm_bindgen_futures::spawn_local(async move {
            app.settings().toggle_theme().await;
        });
    });
}

/// Override manual del intervalo de refresco (0 lo desactiva)
#[wasm_bindgen]
pub fn set_refresh_interval(secs: u32) {
    with_app(move |app| app.set_refresh_interval_override(secs));
}

#[wasm_bindgen]
pub fn set_default_refresh_interval(secs: u32) {
    with_app(move |app| {
        wasm_bindgen_futures::spawn_local(async move {
            app.set_default_refresh_interval(secs).await;
        });
    });
}

// --- Instantáneas de solo lectura para el render de la página ---

#[wasm_bindgen]
pub fn stocks_json() -> String {
    with_app(|app| serde_json::to_string(&app.stocks()).unwrap_or_else(|_| "[]".into()))
        .unwrap_or_else(|| "[]".into())
}

#[wasm_bindgen]
pub fn favorites_json() -> String {
    with_app(|app| {
        serde_json::to_string(&app.favorites().favorites()).unwrap_or_else(|_| "[]".into())
    })
    .unwrap_or_else(|| "[]".into())
}

#[wasm_bindgen]
pub fn is_favorited(ticker: String) -> bool {
    with_app(|app| app.favorites().is_favorited(&ticker)).unwrap_or(false)
}

#[wasm_bindgen]
pub fn session_identity() -> Option<String> {
    with_app(|app| app.session().identity()).flatten()
}

/// Último resultado de búsqueda: objeto JSON, `null` si no hay búsqueda
/// y `{"not_found": "<consulta>"}` si no hubo resultados
#[wasm_bindgen]
pub fn last_search_json() -> String {
    with_app(|app| match app.last_search() {
        Some(SearchOutcome::Found(result)) => {
            serde_json::to_string(&result).unwrap_or_else(|_| "null".into())
        }
        Some(SearchOutcome::NotFound(query)) => {
            serde_json::json!({ "not_found": query }).to_string()
        }
        None => "null".into(),
    })
    .unwrap_or_else(|| "null".into())
}
