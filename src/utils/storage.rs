// ============================================================================
// STORAGE - Acceso clave/valor a persistencia local
// ============================================================================
// localStorage detrás de un trait para poder ejecutar los stores con un
// backend en memoria fuera del navegador.
// ============================================================================

use serde::{de::DeserializeOwned, Serialize};
use web_sys::{window, Storage};

/// Persistencia clave/valor sobre cadenas crudas.
/// Un backend no disponible nunca hace panic: `get` devuelve None y
/// `set` devuelve Err (los stores tratan ambos como sesión cerrada).
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), String>;
    fn remove(&self, key: &str);
}

fn get_local_storage() -> Option<Storage> {
    window()?.local_storage().ok()?
}

/// Backend real: window.localStorage
#[derive(Clone, Copy, Default)]
pub struct LocalStorageBackend;

impl KeyValueStorage for LocalStorageBackend {
    fn get(&self, key: &str) -> Option<String> {
        get_local_storage()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        let storage = get_local_storage().ok_or("No se pudo acceder a localStorage")?;
        storage
            .set_item(key, value)
            .map_err(|_| "Error guardando en localStorage".to_string())
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = get_local_storage() {
            let _ = storage.remove_item(key);
        }
    }
}

pub fn save_json<S: KeyValueStorage, T: Serialize>(
    storage: &S,
    key: &str,
    value: &T,
) -> Result<(), String> {
    let json =
        serde_json::to_string(value).map_err(|e| format!("Error serializando datos: {}", e))?;
    storage.set(key, &json)
}

pub fn load_json<S: KeyValueStorage, T: DeserializeOwned>(storage: &S, key: &str) -> Option<T> {
    let json = storage.get(key)?;
    serde_json::from_str(&json).ok()
}

/// Backend en memoria para tests
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MemoryStorage {
    map: std::rc::Rc<std::cell::RefCell<std::collections::HashMap<String, String>>>,
}

#[cfg(test)]
impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.map.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        self.map
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.map.borrow_mut().remove(key);
    }
}
