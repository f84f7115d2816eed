pub mod favorite;
pub mod search;
pub mod session;
pub mod settings;
pub mod stock;

pub use favorite::{FavoriteEntry, FavoriteRow};
pub use search::{SearchResult, StockInfo};
pub use session::Session;
pub use settings::{Theme, UserSettings};
pub use stock::{Stock, TopStockRow, TopStocksResponse};
