// src/webscan/fingerprint/detectors/cms.rs
use crate::webscan::fingerprint::{Signature, SignatureDetector};

/// Content management and e-commerce platforms.
pub fn detectors() -> Vec<SignatureDetector> {
    vec![
        SignatureDetector::new("WordPress", vec![
            Signature::body("wp-content", 0.4),
            Signature::body("wp-includes", 0.4),
            Signature::body("wp-json", 0.3),
            Signature::body("wordpress", 0.3),
            Signature::body("wp-emoji", 0.2),
        ]),
        SignatureDetector::new("Drupal", vec![
            Signature::header("Drupal", 0.4),
            Signature::body("drupal.js", 0.4),
            Signature::body("/sites/default/files", 0.3),
            Signature::body("Drupal.settings", 0.3),
        ]),
        SignatureDetector::new("Joomla", vec![
            Signature::body("Joomla", 0.4),
            Signature::body("/media/jui/", 0.4),
            Signature::body("/components/com_", 0.3),
            Signature::body("joomla.javascript", 0.3),
        ]),
        SignatureDetector::new("Magento", vec![
            Signature::body("Magento", 0.4),
            Signature::body("/static/frontend/", 0.4),
            Signature::body("mage/", 0.3),
            Signature::body("Mage.Cookies", 0.3),
        ]),
        SignatureDetector::new("Shopify", vec![
            Signature::body("Shopify", 0.5),
            Signature::body("cdn.shopify.com", 0.4),
            Signature::body("shopify-section", 0.4),
            Signature::body("myshopify.com", 0.3),
        ]),
        SignatureDetector::new("Ghost", vec![
            Signature::body("ghost-", 0.4),
            Signature::header("Ghost", 0.3),
            Signature::body("/ghost/api/", 0.4),
        ]),
    ]
}
