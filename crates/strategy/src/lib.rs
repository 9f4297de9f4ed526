pub mod config;
pub mod indicators;
pub mod signal;

pub use config::{IndicatorParams, SignalParams, StrategyFileConfig};
pub use indicators::{EmaWeighting, IndicatorEngine};
pub use signal::SignalGenerator;
