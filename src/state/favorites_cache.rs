// ============================================================================
// FAVORITES CACHE - Favoritos con actualización optimista
// ============================================================================
// Mapa ticker -> favorito con ámbito de una identidad. Cada mutación gira el
// estado en memoria de inmediato, confirma contra el backend y revierte si
// falla. Las confirmaciones se aplican en orden de emisión, nunca en orden
// de llegada, y una época invalidada ignora todo lo que siga en vuelo.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::models::{FavoriteEntry, FavoriteRow};
use crate::services::api_client::{ApiError, StockApi};
use crate::surface::RenderSurface;

pub struct FavoritesCache<A: StockApi> {
    api: Rc<A>,
    surface: Rc<dyn RenderSurface>,
    entries: Rc<RefCell<HashMap<String, FavoriteEntry>>>,
    identity: Rc<RefCell<Option<String>>>,
    // seq de la última petición emitida por clave: solo ella decide el
    // estado visible
    issued: Rc<RefCell<HashMap<String, u64>>>,
    // peticiones en vuelo por ticker: un reload no pisa estas entradas
    pending: Rc<RefCell<HashMap<String, u32>>>,
    next_seq: Rc<Cell<u64>>,
    epoch: Rc<Cell<u64>>,
}

// Clone manual: el derive exigiría A: Clone y aquí solo se clonan los Rc
impl<A: StockApi> Clone for FavoritesCache<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            surface: self.surface.clone(),
            entries: self.entries.clone(),
            identity: self.identity.clone(),
            issued: self.issued.clone(),
            pending: self.pending.clone(),
            next_seq: self.next_seq.clone(),
            epoch: self.epoch.clone(),
        }
    }
}

impl<A: StockApi> FavoritesCache<A> {
    pub fn new(api: Rc<A>, surface: Rc<dyn RenderSurface>) -> Self {
        Self {
            api,
            surface,
            entries: Rc::new(RefCell::new(HashMap::new())),
            identity: Rc::new(RefCell::new(None)),
            issued: Rc::new(RefCell::new(HashMap::new())),
            pending: Rc::new(RefCell::new(HashMap::new())),
            next_seq: Rc::new(Cell::new(0)),
            epoch: Rc::new(Cell::new(0)),
        }
    }

    pub fn identity(&self) -> Option<String> {
        self.identity.borrow().clone()
    }

    pub fn is_favorited(&self, ticker: &str) -> bool {
        self.entries.borrow().contains_key(ticker)
    }

    pub fn entry(&self, ticker: &str) -> Option<FavoriteEntry> {
        self.entries.borrow().get(ticker).cloned()
    }

    /// Instantánea para la superficie de render
    pub fn favorites(&self) -> Vec<FavoriteEntry> {
        self.entries.borrow().values().cloned().collect()
    }

    /// Descarta época, mapa y peticiones en vuelo (logout o cambio de
    /// identidad). Las confirmaciones que lleguen después se ignoran.
    pub fn invalidate(&self) {
        self.epoch.set(self.epoch.get() + 1);
        self.entries.borrow_mut().clear();
        self.issued.borrow_mut().clear();
        self.pending.borrow_mut().clear();
        *self.identity.borrow_mut() = None;
    }

    /// Carga completa desde el backend. Una lista vacía o inexistente es un
    /// estado normal; cualquier otro fallo se notifica y el caché queda
    /// vacío para que la UI siga siendo usable.
    pub async fn load(&self, identity: &str) {
        if self.identity.borrow().as_deref() != Some(identity) {
            self.invalidate();
            *self.identity.borrow_mut() = Some(identity.to_string());
        }
        let epoch = self.epoch.get();
        match self.api.fetch_favorites(identity).await {
            Ok(rows) => {
                if epoch != self.epoch.get() {
                    return;
                }
                log::info!("📥 {} favoritos cargados", rows.len());
                self.merge_rows(rows);
                self.surface.rerender();
            }
            Err(e) => {
                if epoch != self.epoch.get() {
                    return;
                }
                log::error!("❌ Error cargando favoritos: {}", e);
                self.merge_rows(Vec::new());
                self.surface.rerender();
                self.surface
                    .notify_error("No se pudo cargar la lista de favoritos.");
            }
        }
    }

    /// Fusión por clave de ticker: las entradas con una petición en vuelo
    /// conservan su estado optimista (presencia u ausencia), el resto se
    /// sustituye por lo que diga el servidor.
    fn merge_rows(&self, rows: Vec<FavoriteRow>) {
        let pending = self.pending.borrow();
        let mut entries = self.entries.borrow_mut();
        let mut next: HashMap<String, FavoriteEntry> = HashMap::new();

        for (ticker, entry) in entries.iter() {
            if pending.get(ticker).copied().unwrap_or(0) > 0 {
                next.insert(ticker.clone(), entry.clone());
            }
        }
        for row in rows {
            let entry = FavoriteEntry::from(row);
            if pending.get(&entry.ticker).copied().unwrap_or(0) > 0 {
                continue;
            }
            next.insert(entry.ticker.clone(), entry);
        }
        *entries = next;
    }

    /// Alta/baja de favorito con giro optimista y rollback
    pub async fn toggle(&self, ticker: &str, company_name: &str) {
        let Some(identity) = self.identity.borrow().clone() else {
            self.surface
                .notify_error("Los favoritos requieren iniciar sesión.");
            return;
        };

        let epoch = self.epoch.get();
        let seq = self.issue(ticker, ticker);
        let previous = self.entries.borrow().get(ticker).cloned();
        let adding = previous.is_none();

        {
            // giro optimista inmediato: la UI reacciona sin latencia
            let mut entries = self.entries.borrow_mut();
            if adding {
                entries.insert(
                    ticker.to_string(),
                    FavoriteEntry {
                        ticker: ticker.to_string(),
                        company_name: company_name.to_string(),
                        notify: true,
                    },
                );
            } else {
                entries.remove(ticker);
            }
        }
        self.surface.rerender();

        let result = if adding {
            self.api
                .add_favorite(&identity, company_name, ticker, true)
                .await
        } else {
            self.api.remove_favorite(&identity, ticker).await
        };
        self.settle_toggle(epoch, seq, ticker, previous, result);
    }

    fn settle_toggle(
        &self,
        epoch: u64,
        seq: u64,
        ticker: &str,
        previous: Option<FavoriteEntry>,
        result: Result<(), ApiError>,
    ) {
        // página o identidad ya desmontada: la confirmación se ignora
        if epoch != self.epoch.get() {
            return;
        }
        self.release(ticker);

        let latest = self.issued.borrow().get(ticker).copied().unwrap_or(seq);
        if seq < latest {
            // una petición más nueva posee ya el estado visible
            log::debug!(
                "Confirmación obsoleta de {} ignorada (seq {} < {})",
                ticker,
                seq,
                latest
            );
            return;
        }

        let adding = previous.is_none();
        match result {
            Ok(()) => {
                log::info!(
                    "✅ {} {} favoritos",
                    ticker,
                    if adding { "añadido a" } else { "quitado de" }
                );
            }
            Err(e) => {
                let direction = if adding { "añadir" } else { "quitar" };
                log::error!("❌ Error al {} favorito {}: {}", direction, ticker, e);
                {
                    // se restaura el valor previo al giro optimista
                    let mut entries = self.entries.borrow_mut();
                    match previous {
                        Some(entry) => {
                            entries.insert(entry.ticker.clone(), entry);
                        }
                        None => {
                            entries.remove(ticker);
                        }
                    }
                }
                self.surface.rerender();
                self.surface
                    .notify_error(&format!("No se pudo {} el favorito {}.", direction, ticker));
            }
        }
    }

    /// Campana de notificaciones de un favorito, misma disciplina optimista
    pub async fn toggle_notification(&self, ticker: &str) {
        let Some(identity) = self.identity.borrow().clone() else {
            self.surface
                .notify_error("Las notificaciones requieren iniciar sesión.");
            return;
        };
        let Some(entry) = self.entries.borrow().get(ticker).cloned() else {
            log::warn!("⚠️ Campana sobre un ticker que no es favorito: {}", ticker);
            return;
        };

        let epoch = self.epoch.get();
        let key = format!("{}#notify", ticker);
        let seq = self.issue(ticker, &key);
        let target = !entry.notify;

        if let Some(e) = self.entries.borrow_mut().get_mut(ticker) {
            e.notify = target;
        }
        self.surface.rerender();

        let result = self
            .api
            .update_notification(&identity, &entry.company_name, target)
            .await;

        if epoch != self.epoch.get() {
            return;
        }
        self.release(ticker);
        let latest = self.issued.borrow().get(&key).copied().unwrap_or(seq);
        if seq < latest {
            return;
        }

        match result {
            Ok(()) => {
                log::info!(
                    "🔔 Notificación de {} {}",
                    ticker,
                    if target { "activada" } else { "desactivada" }
                );
            }
            Err(e) => {
                log::error!("❌ Error actualizando notificación de {}: {}", ticker, e);
                if let Some(e) = self.entries.borrow_mut().get_mut(ticker) {
                    e.notify = entry.notify;
                }
                self.surface.rerender();
                self.surface.notify_error(&format!(
                    "No se pudo {} la notificación de {}.",
                    if target { "activar" } else { "desactivar" },
                    ticker
                ));
            }
        }
    }

    fn issue(&self, ticker: &str, key: &str) -> u64 {
        let seq = self.next_seq.get() + 1;
        self.next_seq.set(seq);
        self.issued.borrow_mut().insert(key.to_string(), seq);
        *self
            .pending
            .borrow_mut()
            .entry(ticker.to_string())
            .or_insert(0) += 1;
        seq
    }

    fn release(&self, ticker: &str) {
        if let Some(count) = self.pending.borrow_mut().get_mut(ticker) {
            *count = count.saturating_sub(1);
        }
    }
}
