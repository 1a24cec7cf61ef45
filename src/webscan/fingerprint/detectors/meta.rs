// src/webscan/fingerprint/detectors/meta.rs
use crate::webscan::fingerprint::{Signature, SignatureDetector};

/// Full-stack meta-frameworks layered over the frontend libraries.
pub fn detectors() -> Vec<SignatureDetector> {
    vec![
        SignatureDetector::new("Next.js", vec![
            Signature::body("__NEXT_DATA__", 0.5),
            Signature::body("_next/static", 0.4),
            Signature::body("__next", 0.3),
            Signature::header("x-nextjs", 0.3),
        ]),
        SignatureDetector::new("Nuxt.js", vec![
            Signature::body("__NUXT__", 0.5),
            Signature::body("_nuxt/", 0.4),
            Signature::body("nuxt", 0.2),
        ]),
        SignatureDetector::new("SvelteKit", vec![
            Signature::body("__sveltekit", 0.5),
            Signature::body("_app/immutable", 0.4),
            Signature::body("sveltekit", 0.3),
        ]),
        SignatureDetector::new("Gatsby", vec![
            Signature::body("___gatsby", 0.5),
            Signature::body("gatsby-", 0.4),
            Signature::body("page-data.json", 0.3),
        ]),
        SignatureDetector::new("Remix", vec![
            Signature::body("__remixContext", 0.5),
            Signature::body("remix", 0.3),
            Signature::body("_remix", 0.4),
        ]),
        SignatureDetector::new("Astro", vec![
            Signature::body("<meta name=\"generator\" content=\"Astro", 0.5),
            Signature::body("astro-island", 0.5),
            Signature::body("data-astro-cid-", 0.4),
            Signature::body("/_astro/", 0.4),
            Signature::body("data-astro-transition", 0.3),
            Signature::body("data-astro-reload", 0.3),
            Signature::body("data-astro-history", 0.3),
        ]),
    ]
}
