/// URL base del backend
/// Configurada en tiempo de compilación:
/// - Desarrollo: el servidor de la demo (por defecto)
/// - Producción: via BACKEND_URL env var (ver build.rs)
pub const BACKEND_URL: &str = match option_env!("BACKEND_URL") {
    Some(url) => url,
    None => "http://61.109.236.163:8000",
};

// Claves de localStorage heredadas de las páginas originales.
// No cambiar: las páginas de login/signup escriben estas mismas claves.
pub const KEY_USER_EMAIL: &str = "user_email";
pub const KEY_USER_ID: &str = "user_id"; // alias de identidad antiguo
pub const KEY_IS_LOGGED_IN: &str = "isLoggedIn";
pub const KEY_LOGIN_TIME: &str = "loginTime";
pub const KEY_LEGACY_FAVORITES: &str = "favorites";
pub const KEY_REFRESH_INTERVAL: &str = "refreshInterval";

/// Clave del blob de ajustes, con ámbito por identidad
pub fn settings_key(identity: &str) -> String {
    format!("settings_{}", identity)
}

/// Duración máxima de la sesión local (24 horas)
pub const SESSION_DURATION_MS: i64 = 24 * 60 * 60 * 1000;

/// Marcador literal que devuelve `/check-auth` cuando la sesión es válida
pub const AUTH_OK_MARKER: &str = "인증됨";
