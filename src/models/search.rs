use serde::{Deserialize, Serialize};

/// Resultado de GET /stocks/search
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SearchResult {
    pub company_name: String,
    pub ticker: String,
    #[serde(default)]
    pub info: Option<StockInfo>,
}

/// Campos informativos del resultado de búsqueda. El backend los expone con
/// claves en coreano; cada campo es opcional y se decodifica una sola vez
/// aquí en lugar de encadenar accesos dinámicos en los handlers.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct StockInfo {
    #[serde(rename = "현재 주가", default)]
    pub price: Option<f64>,
    #[serde(rename = "전일 종가", default)]
    pub previous_close: Option<f64>,
    #[serde(rename = "시가", default)]
    pub open: Option<f64>,
    #[serde(rename = "고가", default)]
    pub high: Option<f64>,
    #[serde(rename = "저가", default)]
    pub low: Option<f64>,
    #[serde(rename = "52주 최고", default)]
    pub year_high: Option<f64>,
    #[serde(rename = "52주 최저", default)]
    pub year_low: Option<f64>,
    #[serde(rename = "시가총액", default)]
    pub market_cap: Option<f64>,
    #[serde(rename = "PER (Trailing)", default)]
    pub per_trailing: Option<f64>,
    #[serde(rename = "PER (Forward)", default)]
    pub per_forward: Option<f64>,
    #[serde(rename = "거래량", default)]
    pub volume: Option<f64>,
    #[serde(rename = "평균 거래량", default)]
    pub avg_volume: Option<f64>,
    #[serde(rename = "배당 수익률", default)]
    pub dividend_yield: Option<f64>,
}
