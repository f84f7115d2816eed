// ============================================================================
// AUTH SERVICE - Verificación remota de sesión
// ============================================================================
// El estado local se confía provisionalmente; la red solo puede mejorar el
// veredicto (resincronizar identidad), nunca degradarlo por estar caída.
// ============================================================================

use crate::services::api_client::StockApi;
use crate::state::session_store::SessionStore;
use crate::utils::constants::AUTH_OK_MARKER;
use crate::utils::storage::KeyValueStorage;

#[derive(Clone, Debug, PartialEq)]
pub enum AuthStatus {
    Authenticated { identity: String },
    Unauthenticated,
}

/// Confirma la sesión contra el backend.
/// 1. Veredicto local primero: si no es válido, no hay nada que verificar.
/// 2. /check-auth con credenciales; con el marcador explícito el servidor
///    puede sobrescribir la identidad local.
/// 3. Backend inalcanzable o respuesta sin marcador: se mantiene el
///    veredicto local.
pub async fn verify<A: StockApi, S: KeyValueStorage>(
    api: &A,
    session: &SessionStore<S>,
) -> AuthStatus {
    if !session.is_session_valid_locally() {
        return AuthStatus::Unauthenticated;
    }

    match api.check_auth().await {
        Ok(response) if response.message == AUTH_OK_MARKER => {
            session.sync_identity_from_server(
                response.user_email.as_deref(),
                response.user_id.as_deref(),
            );
            match session.identity() {
                Some(identity) => {
                    log::info!("✅ Sesión confirmada por el servidor: {}", identity);
                    AuthStatus::Authenticated { identity }
                }
                None => AuthStatus::Unauthenticated,
            }
        }
        Ok(_) => {
            log::warn!("⚠️ /check-auth respondió sin marcador, se usa el veredicto local");
            local_verdict(session)
        }
        Err(e) => {
            log::warn!("⚠️ /check-auth inalcanzable ({}), se usa el veredicto local", e);
            local_verdict(session)
        }
    }
}

fn local_verdict<S: KeyValueStorage>(session: &SessionStore<S>) -> AuthStatus {
    match session.identity() {
        Some(identity) => AuthStatus::Authenticated { identity },
        None => AuthStatus::Unauthenticated,
    }
}
