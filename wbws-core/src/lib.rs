//! WBWS Core: the "We Buy / We Sell" signal pipeline for one instrument.
//!
//! This crate contains:
//! - Domain types (bars, identifiers)
//! - Candle classification and higher-timeframe bias resolution
//! - The reversal trigger and its filters (session window, RSI momentum)
//! - Indicators (ATR, RSI, rolling annual range)
//! - The risk engine (ATR stop/target, annual-range cap)
//! - Pipeline orchestration with per-stage statistics
//! - Bar ingestion, validation and synthetic generation
//! - Strategy configuration

pub mod candles;
pub mod components;
pub mod config;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod pipeline;
pub mod risk;

pub use config::{ConfigError, StrategyConfig};
pub use domain::Bar;
pub use pipeline::{Pipeline, PipelineError, PipelineOutput};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: the types shared across rayon workers are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::SignalEventId>();
        require_sync::<domain::SignalEventId>();
        require_send::<domain::RunId>();
        require_sync::<domain::RunId>();

        // Component types
        require_send::<components::SignalEvent>();
        require_sync::<components::SignalEvent>();
        require_send::<components::SignalEvaluation>();
        require_sync::<components::SignalEvaluation>();
        require_send::<components::IndicatorValues>();
        require_sync::<components::IndicatorValues>();
        require_send::<components::WbwsTrigger>();
        require_sync::<components::WbwsTrigger>();
        require_send::<components::RsiFilter>();
        require_sync::<components::RsiFilter>();
        require_send::<components::SessionFilter>();
        require_sync::<components::SessionFilter>();

        // Risk and pipeline
        require_send::<risk::RiskEngine>();
        require_sync::<risk::RiskEngine>();
        require_send::<pipeline::Pipeline>();
        require_sync::<pipeline::Pipeline>();
        require_send::<pipeline::PipelineOutput>();
        require_sync::<pipeline::PipelineOutput>();

        // Configuration
        require_send::<config::StrategyConfig>();
        require_sync::<config::StrategyConfig>();
    }
}
