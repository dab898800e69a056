//! Demand model inference
//!
//! This module owns the pretrained artifacts consumed at startup:
//! - the bidirectional LSTM weights ([`lstm`])
//! - the fitted feature scaler ([`scaler`])
//! - artifact loading with graceful degradation ([`loader`])
//! - the scale -> infer -> round pipeline ([`predictor`])

pub mod loader;
pub mod lstm;
pub mod predictor;
pub mod scaler;

pub use loader::load_artifacts;
pub use lstm::DemandLstm;
pub use predictor::{DemandPredictor, FeatureScaler, PredictError, SequenceModel};
pub use scaler::StandardScaler;
