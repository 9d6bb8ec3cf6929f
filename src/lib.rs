pub mod config;
pub mod debug;
pub mod envelope;
pub mod error;
pub mod export;
pub mod fetch;
pub mod models;
pub mod report;
pub mod resolve;
pub mod ticker;
pub mod utils;
pub mod window;

pub use config::Config;
pub use envelope::ResponseEnvelope;
pub use error::{AppError, ErrorKind, Result};
pub use models::{
    Candle, CandleSeries, CompanyInfo, CorporateEvent, CorporateEvents, EventCategory, NewsItem,
    NewsPage, ResolvedSymbol, Suggestion,
};
pub use resolve::Resolution;
pub use ticker::{Ticker, TickerBuilder};
pub use window::{HistoryOptions, LiveOptions, NewsOptions, RequestWindow};
