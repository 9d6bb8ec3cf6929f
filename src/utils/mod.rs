pub mod text;
pub mod time;

pub use text::{normalize_key, normalize_symbol};
pub use time::{format_exchange_time, format_window_bound, localize, start_of_day};
