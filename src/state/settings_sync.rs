// ============================================================================
// SETTINGS SYNC - Ajustes por identidad, local primero
// ============================================================================
// La copia de localStorage manda: leer y guardar nunca dependen de la red.
// Cada guardado intenta además replicarse al backend; si el espejo falla
// solo se deja constancia en el log.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use crate::models::{Theme, UserSettings};
use crate::services::api_client::StockApi;
use crate::surface::RenderSurface;
use crate::utils::constants::settings_key;
use crate::utils::storage::{load_json, save_json, KeyValueStorage};

pub struct SettingsSync<A: StockApi, S: KeyValueStorage> {
    api: Rc<A>,
    storage: S,
    surface: Rc<dyn RenderSurface>,
    current: Rc<RefCell<UserSettings>>,
    identity: Rc<RefCell<Option<String>>>,
}

impl<A: StockApi, S: KeyValueStorage + Clone> Clone for SettingsSync<A, S> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            storage: self.storage.clone(),
            surface: self.surface.clone(),
            current: self.current.clone(),
            identity: self.identity.clone(),
        }
    }
}

impl<A: StockApi, S: KeyValueStorage> SettingsSync<A, S> {
    pub fn new(api: Rc<A>, storage: S, surface: Rc<dyn RenderSurface>) -> Self {
        Self {
            api,
            storage,
            surface,
            current: Rc::new(RefCell::new(UserSettings::default())),
            identity: Rc::new(RefCell::new(None)),
        }
    }

    /// Carga los ajustes de la identidad desde local y aplica el tema.
    /// Un blob ausente o corrupto cae a los valores por defecto.
    pub fn load(&self, identity: &str) {
        let settings: UserSettings =
            load_json(&self.storage, &settings_key(identity)).unwrap_or_default();
        *self.identity.borrow_mut() = Some(identity.to_string());
        self.surface.apply_theme(settings.theme);
        *self.current.borrow_mut() = settings;
    }

    /// Copia actual sin tocar red ni storage
    pub fn peek(&self) -> UserSettings {
        self.current.borrow().clone()
    }

    /// Guarda en local (autoritativo) y replica al backend (mejor esfuerzo)
    pub async fn save(&self, settings: UserSettings) {
        let Some(identity) = self.identity.borrow().clone() else {
            self.surface
                .notify_error("Los ajustes requieren iniciar sesión.");
            return;
        };
        if let Err(e) = save_json(&self.storage, &settings_key(&identity), &settings) {
            log::error!("❌ No se pudieron persistir los ajustes: {}", e);
            self.surface
                .notify_error("No se pudieron guardar los ajustes.");
            return;
        }
        self.surface.apply_theme(settings.theme);
        *self.current.borrow_mut() = settings.clone();
        log::info!("💾 Ajustes guardados para {}", identity);

        if let Err(e) = self.api.mirror_settings(&identity, &settings).await {
            log::warn!("⚠️ Ajustes guardados en local; el espejo remoto falló: {}", e);
        }
    }

    pub async fn toggle_theme(&self) -> Theme {
        let mut settings = self.peek();
        settings.theme = match settings.theme {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        };
        let theme = settings.theme;
        self.save(settings).await;
        theme
    }

    /// Intervalo por defecto del refresco automático. Además del blob de
    /// ajustes, el backend tiene su propio endpoint para este valor.
    pub async fn set_default_refresh_interval(&self, secs: u32) {
        let mut settings = self.peek();
        settings.default_refresh_interval_secs = secs;
        self.save(settings).await;

        if let Some(identity) = self.identity.borrow().clone() {
            if let Err(e) = self.api.update_refresh_time(&identity, secs).await {
                log::warn!("⚠️ No se pudo replicar el intervalo de refresco: {}", e);
            }
        }
    }

    /// Último intento de espejo antes de cerrar sesión
    pub async fn flush(&self) {
        let Some(identity) = self.identity.borrow().clone() else {
            return;
        };
        let settings = self.peek();
        if let Err(e) = self.api.mirror_settings(&identity, &settings).await {
            log::warn!("⚠️ Espejo final de ajustes fallido: {}", e);
        }
    }

    /// Olvida la identidad activa; el blob local queda intacto
    pub fn reset(&self) {
        *self.identity.borrow_mut() = None;
        *self.current.borrow_mut() = UserSettings::default();
    }
}
