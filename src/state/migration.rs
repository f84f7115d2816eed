// ============================================================================
// MIGRATION - Volcado del buffer de favoritos previo al login
// ============================================================================
// Las páginas antiguas acumulaban tickers en la clave "favorites" cuando
// aún no había sesión. Al primer arranque autenticado ese buffer se sube
// al backend una sola vez y se elimina.
// ============================================================================

use crate::models::Stock;
use crate::services::api_client::StockApi;
use crate::state::favorites_cache::FavoritesCache;
use crate::utils::constants::KEY_LEGACY_FAVORITES;
use crate::utils::storage::{load_json, KeyValueStorage};

/// Sube el buffer heredado y lo vacía. Un fallo individual se registra y
/// no detiene el resto; la clave se elimina tras la pasada completa, así
/// que una segunda ejecución es un no-op.
pub async fn migrate_legacy_favorites<S, A>(
    storage: &S,
    api: &A,
    cache: &FavoritesCache<A>,
    identity: &str,
    stocks: &[Stock],
) where
    S: KeyValueStorage,
    A: StockApi,
{
    let buffer: Vec<String> = match storage.get(KEY_LEGACY_FAVORITES) {
        Some(_) => load_json(storage, KEY_LEGACY_FAVORITES).unwrap_or_else(|| {
            log::warn!("⚠️ Buffer de favoritos heredado ilegible, se descarta");
            Vec::new()
        }),
        None => return,
    };
    if buffer.is_empty() {
        storage.remove(KEY_LEGACY_FAVORITES);
        return;
    }

    log::info!("📦 Migrando {} favoritos heredados", buffer.len());
    for ticker in &buffer {
        let company_name = stocks
            .iter()
            .find(|s| &s.ticker == ticker)
            .map(|s| s.name.as_str())
            .unwrap_or(ticker);
        // los favoritos pre-login se suben con la campana apagada: el
        // usuario nunca llegó a pedir avisos
        if let Err(e) = api.add_favorite(identity, company_name, ticker, false).await {
            log::error!("❌ No se pudo migrar el favorito {}: {}", ticker, e);
        }
    }

    storage.remove(KEY_LEGACY_FAVORITES);
    // una única recarga al final en lugar de un toggle por entrada
    cache.load(identity).await;
}
