// src/webscan/fingerprint/detectors/mod.rs
pub mod backend;
pub mod cms;
pub mod frontend;
pub mod meta;

use super::SignatureDetector;

/// Every built-in detector.
pub fn all() -> Vec<SignatureDetector> {
    let mut detectors = backend::detectors();
    detectors.extend(cms::detectors());
    detectors.extend(frontend::detectors());
    detectors.extend(meta::detectors());
    detectors
}
