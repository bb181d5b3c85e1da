pub mod backtest;
pub mod config;
pub mod features;
pub mod models;
pub mod period;
pub mod predictor;
pub mod stats;
pub mod validation;

pub use config::EngineConfig;
pub use predictor::{generate_prediction, Predictor};
