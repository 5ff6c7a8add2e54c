//! External collaborators: market data, positions, charts, alert sinks and
//! the market-hours gate.

pub mod chart;
pub mod market_data;
pub mod market_hours;
pub mod positions;
pub mod sink;
pub mod yahoo;

pub use chart::{ChartRenderer, NoopChartRenderer, ScriptChartRenderer};
pub use market_data::{MarketDataError, MarketDataProvider};
pub use market_hours::{AlwaysOpen, MarketHoursGate, SessionGate};
pub use positions::{MarkdownPositionStore, PositionStore, PositionStoreError, StaticPositionStore};
pub use sink::{AlertSink, MarkdownAlertSink, MemoryAlertSink, SinkError};
pub use yahoo::YahooMarketDataProvider;
