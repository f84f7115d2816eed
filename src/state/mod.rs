// ============================================================================
// STATE - Stores con Rc<RefCell>, sin globals ambientales
// ============================================================================

pub mod favorites_cache;
pub mod migration;
pub mod session_store;
pub mod settings_sync;

pub use favorites_cache::FavoritesCache;
pub use migration::migrate_legacy_favorites;
pub use session_store::SessionStore;
pub use settings_sync::SettingsSync;
