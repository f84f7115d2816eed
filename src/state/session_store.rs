// ============================================================================
// SESSION STORE - Estado de autenticación persistido
// ============================================================================
// Dueño exclusivo de las claves de sesión en localStorage. Ningún otro
// componente las toca directamente.
// ============================================================================

use chrono::Utc;

use crate::models::Session;
use crate::utils::constants::{KEY_IS_LOGGED_IN, KEY_LOGIN_TIME, KEY_USER_EMAIL, KEY_USER_ID};
use crate::utils::storage::KeyValueStorage;

#[derive(Clone)]
pub struct SessionStore<S: KeyValueStorage> {
    storage: S,
}

impl<S: KeyValueStorage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Identidad activa: `user_id` con fallback al email (orden original)
    pub fn identity(&self) -> Option<String> {
        self.storage
            .get(KEY_USER_ID)
            .filter(|v| !v.is_empty())
            .or_else(|| self.storage.get(KEY_USER_EMAIL).filter(|v| !v.is_empty()))
    }

    /// Sesión persistida, si las claves están completas
    pub fn session(&self) -> Option<Session> {
        let identity = self.storage.get(KEY_USER_EMAIL).filter(|v| !v.is_empty())?;
        let established_at_ms = self
            .storage
            .get(KEY_LOGIN_TIME)
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(0);
        Some(Session { identity, established_at_ms })
    }

    /// Veredicto local: flag activo + email presente + menos de 24h.
    /// Si algo no cuadra (o el storage no está disponible) se limpian
    /// todas las claves de sesión y se devuelve false: cerrado por defecto.
    pub fn is_session_valid_locally(&self) -> bool {
        let flag_ok = self
            .storage
            .get(KEY_IS_LOGGED_IN)
            .map(|v| v == "true")
            .unwrap_or(false);
        let now_ms = Utc::now().timestamp_millis();
        let session_ok = self
            .session()
            .map(|s| s.is_valid_at(now_ms))
            .unwrap_or(false);

        if flag_ok && session_ok {
            true
        } else {
            self.clear_session();
            false
        }
    }

    /// Persiste identidad + flag + instante de login
    pub fn record_login(&self, identity: &str) -> Result<(), String> {
        self.storage.set(KEY_USER_EMAIL, identity)?;
        self.storage.set(KEY_IS_LOGGED_IN, "true")?;
        self.storage
            .set(KEY_LOGIN_TIME, &Utc::now().timestamp_millis().to_string())?;
        log::info!("🔐 Sesión registrada para {}", identity);
        Ok(())
    }

    /// Elimina solo las claves de sesión; favoritos y ajustes de otras
    /// identidades quedan intactos
    pub fn clear_session(&self) {
        self.storage.remove(KEY_USER_EMAIL);
        self.storage.remove(KEY_IS_LOGGED_IN);
        self.storage.remove(KEY_LOGIN_TIME);
        self.storage.remove(KEY_USER_ID); // compatibilidad antigua
    }

    /// El servidor es la fuente de verdad en caso de discrepancia
    pub fn sync_identity_from_server(&self, email: Option<&str>, id: Option<&str>) {
        if let Some(email) = email {
            if self.storage.set(KEY_USER_EMAIL, email).is_err() {
                log::error!("❌ No se pudo sincronizar user_email desde el servidor");
            }
        }
        if let Some(id) = id {
            if self.storage.set(KEY_USER_ID, id).is_err() {
                log::error!("❌ No se pudo sincronizar user_id desde el servidor");
            }
        }
    }

    /// Backend compartido con migración y ajustes
    pub fn storage(&self) -> &S {
        &self.storage
    }
}
