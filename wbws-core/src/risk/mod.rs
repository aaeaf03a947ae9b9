//! Trade risk: ATR stop/target sizing and the annual-range cap.

pub mod engine;
pub mod profile;

pub use engine::{RiskDecision, RiskEngine, RiskGate, RiskRejection, RiskValidation};
pub use profile::RiskProfile;
