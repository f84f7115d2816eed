// ============================================================================
// APP - Contexto raíz del dashboard
// ============================================================================
// Cablea stores y servicios, orquesta el arranque y el cierre de sesión y
// es el único dueño del temporizador de refresco automático.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use crate::models::{SearchResult, Stock, UserSettings};
use crate::services::api_client::{ApiError, StockApi};
use crate::services::auth_service::{self, AuthStatus};
use crate::state::{migrate_legacy_favorites, FavoritesCache, SessionStore, SettingsSync};
use crate::surface::RenderSurface;
use crate::utils::constants::KEY_REFRESH_INTERVAL;
use crate::utils::storage::KeyValueStorage;

/// Temporizador de refresco cancelable. `schedule(0, ..)` equivale a cancel.
pub trait TickScheduler {
    fn schedule(&self, secs: u32, tick: Box<dyn Fn()>);
    fn cancel(&self);
}

/// Implementación real sobre gloo Interval. Soltar el Interval anterior
/// lo cancela, así que reprogramar nunca deja dos temporizadores vivos.
#[derive(Default)]
pub struct IntervalScheduler {
    handle: RefCell<Option<gloo_timers::callback::Interval>>,
}

impl TickScheduler for IntervalScheduler {
    fn schedule(&self, secs: u32, tick: Box<dyn Fn()>) {
        if secs == 0 {
            self.cancel();
            return;
        }
        let interval = gloo_timers::callback::Interval::new(secs * 1_000, move || tick());
        *self.handle.borrow_mut() = Some(interval);
        log::info!("⏱️ Refresco automático cada {}s", secs);
    }

    fn cancel(&self) {
        if self.handle.borrow_mut().take().is_some() {
            log::info!("⏱️ Refresco automático cancelado");
        }
    }
}

/// Último resultado de búsqueda, listo para pintar
#[derive(Clone, Debug)]
pub enum SearchOutcome {
    Found(SearchResult),
    /// Consulta sin resultados: la UI pinta un aviso, no un error
    NotFound(String),
}

pub struct App<A: StockApi, S: KeyValueStorage + Clone, C: TickScheduler> {
    api: Rc<A>,
    surface: Rc<dyn RenderSurface>,
    session: SessionStore<S>,
    favorites: FavoritesCache<A>,
    settings: SettingsSync<A, S>,
    scheduler: Rc<C>,
    stocks: Rc<RefCell<Vec<Stock>>>,
    last_search: Rc<RefCell<Option<SearchOutcome>>>,
}

impl<A: StockApi, S: KeyValueStorage + Clone, C: TickScheduler> Clone for App<A, S, C> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            surface: self.surface.clone(),
            session: self.session.clone(),
            favorites: self.favorites.clone(),
            settings: self.settings.clone(),
            scheduler: self.scheduler.clone(),
            stocks: self.stocks.clone(),
            last_search: self.last_search.clone(),
        }
    }
}

impl<A, S, C> App<A, S, C>
where
    A: StockApi + 'static,
    S: KeyValueStorage + Clone + 'static,
    C: TickScheduler + 'static,
{
    pub fn new(api: Rc<A>, storage: S, surface: Rc<dyn RenderSurface>, scheduler: Rc<C>) -> Self {
        Self {
            favorites: FavoritesCache::new(api.clone(), surface.clone()),
            settings: SettingsSync::new(api.clone(), storage.clone(), surface.clone()),
            session: SessionStore::new(storage),
            api,
            surface,
            scheduler,
            stocks: Rc::new(RefCell::new(Vec::new())),
            last_search: Rc::new(RefCell::new(None)),
        }
    }

    pub fn stocks(&self) -> Vec<Stock> {
        self.stocks.borrow().clone()
    }

    pub fn favorites(&self) -> &FavoritesCache<A> {
        &self.favorites
    }

    pub fn settings(&self) -> &SettingsSync<A, S> {
        &self.settings
    }

    pub fn session(&self) -> &SessionStore<S> {
        &self.session
    }

    pub fn last_search(&self) -> Option<SearchOutcome> {
        self.last_search.borrow().clone()
    }

    /// Secuencia de arranque: verificación de sesión, lista pública de
    /// valores y, solo con sesión, migración + favoritos + ajustes.
    pub async fn boot(&self) {
        log::info!("🚀 Arrancando dashboard");
        let status = auth_service::verify(&*self.api, &self.session).await;
        self.refresh_stocks().await;

        let AuthStatus::Authenticated { identity } = status else {
            log::info!("👤 Sin sesión: solo lista pública");
            return;
        };

        let stocks = self.stocks.borrow().clone();
        migrate_legacy_favorites(
            self.session.storage(),
            &*self.api,
            &self.favorites,
            &identity,
            &stocks,
        )
        .await;
        self.favorites.load(&identity).await;
        self.settings.load(&identity);
        self.apply_refresh_interval();
    }

    /// Registra la sesión local recién creada y ejecuta el arranque
    /// autenticado completo
    pub async fn login(&self, identity: &str) {
        if let Err(e) = self.session.record_login(identity) {
            log::error!("❌ No se pudo registrar la sesión: {}", e);
            self.surface
                .notify_error("No se pudo guardar la sesión en este navegador.");
            return;
        }
        self.boot().await;
    }

    pub async fn refresh_stocks(&self) {
        match self.api.fetch_top_stocks().await {
            Ok(stocks) => {
                log::info!("📈 {} valores recibidos", stocks.len());
                *self.stocks.borrow_mut() = stocks;
                self.surface.rerender();
            }
            Err(e) => {
                log::error!("❌ Error cargando la lista de valores: {}", e);
                self.surface
                    .notify_error("No se pudo cargar la lista de valores.");
            }
        }
    }

    /// Alta/baja de favorito desde la tabla; el nombre de empresa sale de
    /// la lista cargada, con el ticker como último recurso
    pub async fn toggle_favorite(&self, ticker: &str) {
        let company_name = self
            .stocks
            .borrow()
            .iter()
            .find(|s| s.ticker == ticker)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| ticker.to_string());
        self.favorites.toggle(ticker, &company_name).await;
    }

    pub async fn toggle_notification(&self, ticker: &str) {
        self.favorites.toggle_notification(ticker).await;
    }

    pub async fn search(&self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        match self.api.search_stock(name).await {
            Ok(result) => {
                log::info!("🔍 Búsqueda '{}' -> {}", name, result.ticker);
                *self.last_search.borrow_mut() = Some(SearchOutcome::Found(result));
                self.surface.rerender();
            }
            Err(ApiError::NotFound) => {
                *self.last_search.borrow_mut() = Some(SearchOutcome::NotFound(name.to_string()));
                self.surface.rerender();
            }
            Err(e) => {
                log::error!("❌ Búsqueda '{}' fallida: {}", name, e);
                self.surface
                    .notify_error("La búsqueda no está disponible ahora mismo.");
            }
        }
    }

    /// Override manual del intervalo; pisa al valor de los ajustes
    pub fn set_refresh_interval_override(&self, secs: u32) {
        let result = self
            .session
            .storage()
            .set(KEY_REFRESH_INTERVAL, &secs.to_string());
        if result.is_err() {
            log::error!("❌ No se pudo persistir el intervalo de refresco");
        }
        self.apply_refresh_interval();
    }

    pub async fn set_default_refresh_interval(&self, secs: u32) {
        self.settings.set_default_refresh_interval(secs).await;
        self.apply_refresh_interval();
    }

    pub fn apply_refresh_interval(&self) {
        let secs = effective_refresh_secs(self.session.storage(), &self.settings.peek());
        if secs == 0 {
            self.scheduler.cancel();
            return;
        }
        let app = self.clone();
        self.scheduler.schedule(
            secs,
            Box::new(move || {
                let app = app.clone();
                wasm_bindgen_futures::spawn_local(async move { app.refresh_stocks().await });
            }),
        );
    }

    /// Cierre de sesión. Los pasos remotos son mejor esfuerzo; la limpieza
    /// local se ejecuta siempre.
    pub async fn logout(&self) {
        self.settings.flush().await;
        if let Err(e) = self.api.logout().await {
            log::warn!("⚠️ /logout falló ({}), se cierra en local igualmente", e);
        }

        self.session.clear_session();
        self.session.storage().remove(KEY_REFRESH_INTERVAL);
        self.favorites.invalidate();
        self.settings.reset();
        self.scheduler.cancel();
        *self.last_search.borrow_mut() = None;
        self.surface.rerender();
        self.surface.notify_success("Sesión cerrada.");
        log::info!("🗑️ Sesión cerrada y estado local limpio");
    }
}

/// El override manual de localStorage manda; si falta o no es un número
/// se usa el valor por defecto de los ajustes
pub fn effective_refresh_secs<S: KeyValueStorage>(storage: &S, settings: &UserSettings) -> u32 {
    storage
        .get(KEY_REFRESH_INTERVAL)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(settings.default_refresh_interval_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{run, MockApi, RecordingSurface};
    use crate::utils::constants::{
        KEY_IS_LOGGED_IN, KEY_LEGACY_FAVORITES, KEY_LOGIN_TIME, KEY_USER_EMAIL,
    };
    use crate::utils::storage::MemoryStorage;
    use std::cell::Cell;

    #[derive(Default)]
    struct RecordingScheduler {
        scheduled: RefCell<Vec<u32>>,
        cancels: Cell<u32>,
    }

    impl TickScheduler for RecordingScheduler {
        fn schedule(&self, secs: u32, _tick: Box<dyn Fn()>) {
            self.scheduled.borrow_mut().push(secs);
        }
        fn cancel(&self) {
            self.cancels.set(self.cancels.get() + 1);
        }
    }

    struct Fixture {
        api: Rc<MockApi>,
        storage: MemoryStorage,
        surface: Rc<RecordingSurface>,
        scheduler: Rc<RecordingScheduler>,
        app: App<MockApi, MemoryStorage, RecordingScheduler>,
    }

    fn fixture() -> Fixture {
        let api = Rc::new(MockApi::default());
        let storage = MemoryStorage::default();
        let surface = Rc::new(RecordingSurface::default());
        let scheduler = Rc::new(RecordingScheduler::default());
        let app = App::new(
            api.clone(),
            storage.clone(),
            surface.clone(),
            scheduler.clone(),
        );
        Fixture { api, storage, surface, scheduler, app }
    }

    fn seed_session(storage: &MemoryStorage, identity: &str) {
        let now = chrono::Utc::now().timestamp_millis();
        storage.set(KEY_IS_LOGGED_IN, "true").unwrap();
        storage.set(KEY_USER_EMAIL, identity).unwrap();
        storage
            .set(KEY_LOGIN_TIME, &(now - 1_000).to_string())
            .unwrap();
    }

    #[test]
    fn override_wins_over_settings_default() {
        let storage = MemoryStorage::default();
        let settings = UserSettings { default_refresh_interval_secs: 60, ..Default::default() };
        assert_eq!(effective_refresh_secs(&storage, &settings), 60);

        storage.set(KEY_REFRESH_INTERVAL, "15").unwrap();
        assert_eq!(effective_refresh_secs(&storage, &settings), 15);

        storage.set(KEY_REFRESH_INTERVAL, "abc").unwrap();
        assert_eq!(effective_refresh_secs(&storage, &settings), 60);
    }

    #[test]
    fn boot_without_session_only_loads_the_public_list() {
        let f = fixture();
        run(f.app.boot());
        assert_eq!(f.api.calls_matching("fetch_top_stocks"), 1);
        assert_eq!(f.api.calls_matching("fetch_favorites"), 0);
        assert_eq!(f.api.calls_matching("check_auth"), 0);
    }

    #[test]
    fn authenticated_boot_migrates_before_loading_favorites() {
        let f = fixture();
        seed_session(&f.storage, "a@x.com");
        f.storage
            .set(KEY_LEGACY_FAVORITES, r#"["TICK1"]"#)
            .unwrap();
        f.storage
            .set("settings_a@x.com", r#"{"theme":"dark","defaultRefreshInterval":30}"#)
            .unwrap();

        run(f.app.boot());

        let calls = f.api.calls.borrow().clone();
        let migrate_pos = calls.iter().position(|c| c.starts_with("add:TICK1")).unwrap();
        let load_pos = calls
            .iter()
            .rposition(|c| c.starts_with("fetch_favorites"))
            .unwrap();
        assert!(migrate_pos < load_pos);
        assert_eq!(f.storage.get(KEY_LEGACY_FAVORITES), None);
        assert_eq!(f.scheduler.scheduled.borrow().as_slice(), &[30]);
        assert_eq!(f.surface.themes.borrow().last(), Some(&crate::models::Theme::Dark));
    }

    #[test]
    fn zero_interval_means_no_timer() {
        let f = fixture();
        seed_session(&f.storage, "a@x.com");
        run(f.app.boot());
        assert!(f.scheduler.scheduled.borrow().is_empty());
    }

    #[test]
    fn interval_override_reprograms_the_timer() {
        let f = fixture();
        seed_session(&f.storage, "a@x.com");
        run(f.app.boot());
        f.app.set_refresh_interval_override(15);
        assert_eq!(f.scheduler.scheduled.borrow().as_slice(), &[15]);
        assert_eq!(f.storage.get(KEY_REFRESH_INTERVAL).as_deref(), Some("15"));
    }

    #[test]
    fn logout_clears_local_state_and_cancels_the_timer() {
        let f = fixture();
        seed_session(&f.storage, "a@x.com");
        *f.api.favorites.borrow_mut() = vec![serde_json::from_value(
            serde_json::json!({"subscription": "AAPL", "company_name": "Apple"}),
        )
        .unwrap()];
        f.storage.set(KEY_REFRESH_INTERVAL, "15").unwrap();
        run(f.app.boot());
        assert!(f.app.favorites().is_favorited("AAPL"));

        run(f.app.logout());

        assert_eq!(f.api.calls_matching("logout"), 1);
        assert_eq!(f.storage.get(KEY_USER_EMAIL), None);
        assert_eq!(f.storage.get(KEY_IS_LOGGED_IN), None);
        assert_eq!(f.storage.get(KEY_REFRESH_INTERVAL), None);
        assert!(f.app.favorites().favorites().is_empty());
        assert!(f.scheduler.cancels.get() >= 1);
        // el flush de ajustes sale antes de invalidar la sesión
        let calls = f.api.calls.borrow().clone();
        let mirror = calls.iter().position(|c| c.starts_with("mirror:")).unwrap();
        let logout = calls.iter().position(|c| c == "logout").unwrap();
        assert!(mirror < logout);
    }

    #[test]
    fn logout_failure_still_clears_local_state() {
        let f = fixture();
        seed_session(&f.storage, "a@x.com");
        run(f.app.boot());
        f.api.fail_logout.set(true);
        run(f.app.logout());
        assert_eq!(f.storage.get(KEY_USER_EMAIL), None);
        assert!(!f.app.session().is_session_valid_locally());
    }

    #[test]
    fn login_records_and_boots_authenticated() {
        let f = fixture();
        run(f.app.login("a@x.com"));
        assert!(f.app.session().is_session_valid_locally());
        assert_eq!(f.api.calls_matching("fetch_favorites:a@x.com"), 1);
    }

    #[test]
    fn search_not_found_is_a_placeholder_not_an_error() {
        let f = fixture();
        run(f.app.search("  Nokia  "));
        match f.app.last_search() {
            Some(SearchOutcome::NotFound(q)) => assert_eq!(q, "Nokia"),
            other => panic!("resultado inesperado: {:?}", other),
        }
        assert!(f.surface.errors.borrow().is_empty());
        assert_eq!(f.api.calls_matching("search:Nokia"), 1);
    }

    #[test]
    fn search_server_error_notifies() {
        let f = fixture();
        *f.api.search_response.borrow_mut() = Some(Err(ApiError::Server(503)));
        run(f.app.search("Apple"));
        assert!(f.app.last_search().is_none());
        assert_eq!(f.surface.errors.borrow().len(), 1);
    }

    #[test]
    fn empty_search_never_hits_the_network() {
        let f = fixture();
        run(f.app.search("   "));
        assert_eq!(f.api.calls_matching("search:"), 0);
    }

    #[test]
    fn toggle_favorite_uses_the_listed_company_name() {
        let f = fixture();
        seed_session(&f.storage, "a@x.com");
        *f.api.top_stocks.borrow_mut() = vec![Stock {
            ticker: "AAPL".into(),
            name: "Apple".into(),
            price: 191.0,
            volume: 1_000,
        }];
        run(f.app.boot());
        run(f.app.toggle_favorite("AAPL"));
        assert_eq!(f.api.calls_matching("add:AAPL:Apple:true"), 1);
        // ticker desconocido: el propio ticker hace de nombre
        run(f.app.toggle_favorite("ZZZZ"));
        assert_eq!(f.api.calls_matching("add:ZZZZ:ZZZZ:true"), 1);
    }
}
