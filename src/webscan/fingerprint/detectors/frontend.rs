// src/webscan/fingerprint/detectors/frontend.rs
use crate::webscan::fingerprint::{Signature, SignatureDetector};

/// Client-side libraries, matched on the served markup and bundles.
pub fn detectors() -> Vec<SignatureDetector> {
    vec![
        SignatureDetector::new("React", vec![
            Signature::body("data-reactroot", 0.5),
            Signature::body("react-dom", 0.4),
            Signature::body("__REACT_DEVTOOLS", 0.4),
            Signature::body("react.production", 0.4),
            Signature::body("_reactRootContainer", 0.3),
        ]),
        SignatureDetector::new("Vue.js", vec![
            Signature::body("data-v-", 0.5),
            Signature::body("Vue.js", 0.4),
            Signature::body("vue.runtime", 0.4),
            Signature::body("vue.min.js", 0.4),
            Signature::body("__vue__", 0.3),
            Signature::body("v-cloak", 0.3),
        ]),
        SignatureDetector::new("Angular", vec![
            Signature::body("ng-version", 0.5),
            Signature::body("ng-app", 0.4),
            Signature::body("ng-controller", 0.4),
            Signature::body("angular.js", 0.4),
            Signature::body("angular.min.js", 0.4),
            Signature::body("ng-binding", 0.3),
            Signature::body("_nghost", 0.3),
            Signature::body("_ngcontent", 0.3),
        ]),
        SignatureDetector::new("Svelte", vec![
            Signature::body("svelte", 0.4),
            Signature::body("__svelte", 0.5),
            Signature::body("svelte-", 0.3),
        ]),
        SignatureDetector::new("Ember.js", vec![
            Signature::body("ember", 0.4),
            Signature::body("ember-cli", 0.4),
            Signature::body("data-ember", 0.3),
        ]),
        SignatureDetector::new("Backbone.js", vec![
            Signature::body("backbone", 0.4),
            Signature::body("Backbone.", 0.4),
        ]),
        SignatureDetector::new("Meteor", vec![
            Signature::body("__meteor_runtime_config__", 0.5),
            Signature::body("meteor", 0.3),
        ]),
    ]
}
