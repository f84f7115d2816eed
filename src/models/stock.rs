use serde::{Deserialize, Serialize};

/// Respuesta de GET /top_stocks
#[derive(Deserialize, Debug)]
pub struct TopStocksResponse {
    #[serde(default)]
    pub top_stocks: Vec<TopStockRow>,
}

/// Fila cruda del backend. `price` y `volume` llegan a veces como número
/// y a veces como cadena con separadores de miles; se decodifican una sola
/// vez aquí, en la frontera de red.
#[derive(Deserialize, Debug)]
pub struct TopStockRow {
    pub ticker: String,
    pub company_name: String,
    #[serde(default)]
    pub price: serde_json::Value,
    #[serde(default)]
    pub volume: serde_json::Value,
}

/// Valor bursátil ya tipado
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Stock {
    pub ticker: String,
    pub name: String,
    pub price: f64,
    pub volume: u64,
}

impl From<TopStockRow> for Stock {
    fn from(row: TopStockRow) -> Self {
        Self {
            price: parse_numeric(&row.price),
            volume: parse_volume(&row.volume),
            ticker: row.ticker,
            name: row.company_name,
        }
    }
}

fn parse_numeric(value: &serde_json::Value) -> f64 {
    match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn parse_volume(value: &serde_json::Value) -> u64 {
    match value {
        serde_json::Value::Number(n) => n.as_u64().unwrap_or(0),
        serde_json::Value::String(s) => s.replace(',', "").trim().parse().unwrap_or(0),
        _ => 0,
    }
}
