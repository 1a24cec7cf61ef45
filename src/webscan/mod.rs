// src/webscan/mod.rs
pub mod fingerprint;

pub use fingerprint::{detect_framework, FrameworkResult, RiskLevel};
