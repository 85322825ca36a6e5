//! Single-record inference
//!
//! Scores one customer profile with a fitted model, reusing the encoders and
//! scaler frozen at training time, and attaches the profile's risk flags,
//! the gauge band and the matching recommended actions.

mod predictor;

pub use predictor::{
    predict_one, risk_flags, Prediction, RiskFlag, RiskLevel, LOW_RISK_BOUND, MEDIUM_RISK_BOUND,
};
