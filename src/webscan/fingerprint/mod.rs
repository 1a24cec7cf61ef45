// src/webscan/fingerprint/mod.rs
pub mod cve;
pub mod detectors;
pub mod engine;
pub mod result;
pub mod version;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use lazy_static::lazy_static;
use log::debug;
use reqwest::header::HeaderMap;

pub use engine::{detect_framework, detect_framework_with, DETECTION_THRESHOLD};
pub use result::{FrameworkResult, RiskLevel};

/// Sigmoid slope; about half the signature weight must match before the
/// confidence crosses the detection threshold.
const SIGMOID_STEEPNESS: f32 = 6.0;

/// One weighted fingerprint pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signature {
    pub pattern: &'static str,
    pub weight: f32,
    /// Matched case-insensitively against header names and values instead of the body.
    pub header_only: bool,
}

impl Signature {
    pub const fn body(pattern: &'static str, weight: f32) -> Self {
        Self { pattern, weight, header_only: false }
    }

    pub const fn header(pattern: &'static str, weight: f32) -> Self {
        Self { pattern, weight, header_only: true }
    }
}

/// A framework/CMS classifier.
pub trait Detector: Send + Sync {
    fn name(&self) -> &str;

    fn signatures(&self) -> &[Signature];

    /// Returns the confidence in `[0, 1]` and, when confident, the version
    /// found in the body (`unknown` otherwise).
    fn detect(&self, body: &str, headers: &HeaderMap) -> (f32, String) {
        let confidence = weighted_confidence(self.signatures(), body, headers);
        let version = if confidence > DETECTION_THRESHOLD {
            version::extract_version(self.name(), body).version
        } else {
            version::UNKNOWN_VERSION.to_string()
        };
        (confidence, version)
    }
}

/// Matched weight over total weight, or 0 for an empty list.
pub fn match_signatures(signatures: &[Signature], body: &str, headers: &HeaderMap) -> f32 {
    let mut total_weight = 0.0f32;
    let mut matched_weight = 0.0f32;

    for sig in signatures {
        total_weight += sig.weight;
        let found = if sig.header_only {
            header_contains(headers, sig.pattern)
        } else {
            body.contains(sig.pattern)
        };
        if found {
            matched_weight += sig.weight;
        }
    }

    if total_weight <= 0.0 {
        return 0.0;
    }
    matched_weight / total_weight
}

pub fn sigmoid_confidence(score: f32) -> f32 {
    1.0 / (1.0 + (-SIGMOID_STEEPNESS * score).exp())
}

/// Sigmoid of the matched ratio. An empty signature list scores 0 rather than
/// the sigmoid midpoint.
pub fn weighted_confidence(signatures: &[Signature], body: &str, headers: &HeaderMap) -> f32 {
    if signatures.iter().map(|s| s.weight).sum::<f32>() <= 0.0 {
        return 0.0;
    }
    sigmoid_confidence(match_signatures(signatures, body, headers))
}

fn header_contains(headers: &HeaderMap, pattern: &str) -> bool {
    let needle = pattern.to_lowercase();
    headers.iter().any(|(name, value)| {
        name.as_str().contains(&needle) || String::from_utf8_lossy(value.as_bytes()).to_lowercase().contains(&needle)
    })
}

/// A detector defined entirely by its signature table.
#[derive(Debug, Clone)]
pub struct SignatureDetector {
    name: &'static str,
    signatures: Vec<Signature>,
}

impl SignatureDetector {
    pub fn new(name: &'static str, signatures: Vec<Signature>) -> Self {
        Self { name, signatures }
    }
}

impl Detector for SignatureDetector {
    fn name(&self) -> &str {
        self.name
    }

    fn signatures(&self) -> &[Signature] {
        &self.signatures
    }
}

/// Detector name -> detector, last registration wins.
#[derive(Default)]
pub struct DetectorRegistry {
    detectors: RwLock<HashMap<String, Arc<dyn Detector>>>,
}

impl DetectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in detector.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        register_defaults(&registry);
        registry
    }

    pub fn register(&self, detector: Arc<dyn Detector>) {
        let name = detector.name().to_string();
        let mut detectors = self.detectors.write().unwrap_or_else(|e| e.into_inner());
        if detectors.insert(name.clone(), detector).is_some() {
            debug!("Detector {} overridden", name);
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Detector>> {
        self.detectors.read().unwrap_or_else(|e| e.into_inner()).get(name).cloned()
    }

    pub fn all(&self) -> Vec<Arc<dyn Detector>> {
        self.detectors.read().unwrap_or_else(|e| e.into_inner()).values().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.detectors.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Removes every detector. Only meant for test harnesses.
    pub fn clear(&self) {
        self.detectors.write().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

pub fn register_defaults(registry: &DetectorRegistry) {
    for detector in detectors::all() {
        registry.register(Arc::new(detector));
    }
}

lazy_static! {
    static ref DETECTORS: DetectorRegistry = DetectorRegistry::with_defaults();
}

/// The process-wide detector registry, populated with the built-in detectors
/// on first use.
pub fn registry() -> &'static DetectorRegistry {
    &DETECTORS
}
