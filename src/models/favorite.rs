use serde::{Deserialize, Serialize};

/// Fila cruda de GET /favorites
#[derive(Deserialize, Debug, Clone)]
pub struct FavoriteRow {
    pub subscription: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub notification: Option<bool>,
}

/// Favorito de un usuario, clave única por ticker
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FavoriteEntry {
    pub ticker: String,
    pub company_name: String,
    pub notify: bool,
}

impl From<FavoriteRow> for FavoriteEntry {
    fn from(row: FavoriteRow) -> Self {
        Self {
            company_name: row.company_name.unwrap_or_else(|| row.subscription.clone()),
            notify: row.notification.unwrap_or(false),
            ticker: row.subscription,
        }
    }
}
