pub mod cache;
pub mod rest;

pub use cache::load_or_fetch;
pub use rest::{BybitRest, Category, Kline, download_range};
