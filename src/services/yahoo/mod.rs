//! Yahoo Finance market data over its public JSON endpoints.

pub mod messages;
pub mod provider;

pub use provider::YahooMarketDataProvider;
