pub mod error;
pub mod provider;
pub mod types;

pub use error::FetchError;
pub use provider::{BinanceTickerSource, PriceSource};
pub use types::{current_prices, TickerRecord};
