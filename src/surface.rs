// ============================================================================
// SURFACE - Colaborador de render externo
// ============================================================================
// El núcleo no pinta HTML: notifica a la página a través de este trait.
// La implementación DOM despacha CustomEvents que el chrome de la página
// escucha, y conmuta la clase de tema sobre <body>.
// ============================================================================

use wasm_bindgen::JsValue;
use web_sys::{CustomEvent, CustomEventInit};

use crate::models::Theme;

pub const EVENT_RERENDER: &str = "stocks:rerender";
pub const EVENT_NOTICE_ERROR: &str = "stocks:notice-error";
pub const EVENT_NOTICE_SUCCESS: &str = "stocks:notice-success";

/// Superficie de render. Todas las notificaciones son no bloqueantes;
/// ninguna excepción debe llegar a la página.
pub trait RenderSurface {
    fn rerender(&self);
    fn apply_theme(&self, theme: Theme);
    fn notify_error(&self, message: &str);
    fn notify_success(&self, message: &str);
}

/// Implementación real sobre el DOM
#[derive(Clone, Copy, Default)]
pub struct DomSurface;

impl RenderSurface for DomSurface {
    fn rerender(&self) {
        dispatch_page_event(EVENT_RERENDER, None);
    }

    fn apply_theme(&self, theme: Theme) {
        let body = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.body());
        if let Some(body) = body {
            let class_list = body.class_list();
            let result = match theme {
                Theme::Dark => class_list.add_1("dark-mode"),
                Theme::Light => class_list.remove_1("dark-mode"),
            };
            if result.is_err() {
                log::error!("❌ No se pudo aplicar el tema al body");
            }
        }
    }

    fn notify_error(&self, message: &str) {
        log::error!("❌ {}", message);
        dispatch_page_event(EVENT_NOTICE_ERROR, Some(message));
    }

    fn notify_success(&self, message: &str) {
        log::info!("✅ {}", message);
        dispatch_page_event(EVENT_NOTICE_SUCCESS, Some(message));
    }
}

fn dispatch_page_event(name: &str, detail: Option<&str>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let event = match detail {
        Some(text) => {
            let init = CustomEventInit::new();
            init.set_detail(&JsValue::from_str(text));
            CustomEvent::new_with_event_init_dict(name, &init)
        }
        None => CustomEvent::new(name),
    };
    if let Ok(event) = event {
        let _ = window.dispatch_event(&event);
    }
}
