use std::env;
use std::fs;

// Vuelca las claves de .env (p. ej. BACKEND_URL) como variables de
// compilación para que constants.rs las recoja con option_env!.
fn main() {
    println!("cargo:rerun-if-changed=.env");
    println!("cargo:rerun-if-changed=build.rs");

    let Ok(contents) = fs::read_to_string(".env") else {
        return;
    };
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        // el entorno del proceso tiene prioridad sobre el fichero
        if env::var(key.trim()).is_err() {
            println!("cargo:rustc-env={}={}", key.trim(), value.trim());
        }
    }
}
