// src/webscan/fingerprint/version.rs
use std::collections::HashMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

/// Reported when no pattern yields a plausible version.
pub const UNKNOWN_VERSION: &str = "unknown";

/// A version regex with the confidence of the place it reads from.
#[derive(Debug, Clone)]
pub struct VersionPattern {
    pub regex: Regex,
    pub confidence: f32,
    pub source: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionMatch {
    pub version: String,
    pub confidence: f32,
    pub source: String,
}

impl Default for VersionMatch {
    fn default() -> Self {
        Self {
            version: UNKNOWN_VERSION.to_string(),
            confidence: 0.0,
            source: String::new(),
        }
    }
}

fn p(regex: &str, confidence: f32, source: &'static str) -> VersionPattern {
    VersionPattern {
        regex: Regex::new(regex).unwrap_or_else(|e| panic!("invalid version pattern {}: {}", regex, e)),
        confidence,
        source,
    }
}

lazy_static! {
    // 每个框架的版本正则，按声明顺序尝试
    static ref VERSION_PATTERNS: HashMap<&'static str, Vec<VersionPattern>> = {
        let mut map = HashMap::new();

        map.insert("Laravel", vec![
            p(r"Laravel\s+[Vv]?(\d+\.\d+(?:\.\d+)?)", 0.9, "explicit version"),
            p(r"laravel/framework.*?(\d+\.\d+(?:\.\d+)?)", 0.8, "composer.json"),
        ]);
        map.insert("Django", vec![
            p(r"Django[/\s]+[Vv]?(\d+\.\d+(?:\.\d+)?)", 0.9, "explicit version"),
            p(r"django.*?(\d+\.\d+(?:\.\d+)?)", 0.7, "package reference"),
        ]);
        map.insert("Ruby on Rails", vec![
            p(r"Rails[/\s]+[Vv]?(\d+\.\d+(?:\.\d+)?)", 0.9, "explicit version"),
            p(r"rails.*?(\d+\.\d+(?:\.\d+)?)", 0.7, "gem reference"),
        ]);
        map.insert("Express.js", vec![
            p(r"Express[/\s]+[Vv]?(\d+\.\d+(?:\.\d+)?)", 0.9, "explicit version"),
            p(r#""express":\s*"[~^]?(\d+\.\d+(?:\.\d+)?)""#, 0.85, "package.json"),
        ]);
        map.insert("ASP.NET", vec![
            p(r"X-AspNet-Version:\s*(\d+\.\d+(?:\.\d+)?)", 0.95, "header"),
            p(r"ASP\.NET[/\s]+[Vv]?(\d+\.\d+(?:\.\d+)?)", 0.9, "explicit version"),
            p(r"X-AspNetMvc-Version:\s*(\d+\.\d+(?:\.\d+)?)", 0.9, "MVC header"),
        ]);
        map.insert("ASP.NET Core", vec![
            p(r"\.NET\s*(\d+\.\d+(?:\.\d+)?)", 0.8, "dotnet version"),
        ]);
        map.insert("Spring", vec![
            p(r"Spring[/\s]+[Vv]?(\d+\.\d+(?:\.\d+)?)", 0.9, "explicit version"),
            p(r"spring-core.*?(\d+\.\d+(?:\.\d+)?)", 0.8, "maven"),
        ]);
        map.insert("Spring Boot", vec![
            p(r"spring-boot.*?(\d+\.\d+(?:\.\d+)?)", 0.9, "maven"),
        ]);
        map.insert("Flask", vec![
            p(r"Flask[/\s]+[Vv]?(\d+\.\d+(?:\.\d+)?)", 0.9, "explicit version"),
            p(r"Werkzeug[/\s]+(\d+\.\d+(?:\.\d+)?)", 0.7, "werkzeug version"),
        ]);
        map.insert("Next.js", vec![
            p(r"Next\.js[/\s]+[Vv]?(\d{1,2}\.\d+(?:\.\d+)?)", 0.9, "explicit version"),
            p(r#""next":\s*"[~^]?(\d{1,2}\.\d+(?:\.\d+)?)""#, 0.85, "package.json"),
        ]);
        map.insert("Nuxt.js", vec![
            p(r"Nuxt[/\s]+[Vv]?(\d+\.\d+(?:\.\d+)?)", 0.9, "explicit version"),
            p(r#""nuxt":\s*"[~^]?(\d+\.\d+(?:\.\d+)?)""#, 0.85, "package.json"),
        ]);
        map.insert("Vue.js", vec![
            p(r"Vue\.js[/\s]+[Vv]?(\d+\.\d+(?:\.\d+)?)", 0.9, "explicit version"),
            p(r#""vue":\s*"[~^]?(\d+\.\d+(?:\.\d+)?)""#, 0.85, "package.json"),
            p(r"vue@(\d+\.\d+(?:\.\d+)?)", 0.8, "CDN reference"),
        ]);
        map.insert("Angular", vec![
            p(r#"ng-version="(\d+\.\d+(?:\.\d+)?)""#, 0.95, "ng-version attribute"),
            p(r"Angular[/\s]+[Vv]?(\d+\.\d+(?:\.\d+)?)", 0.9, "explicit version"),
            p(r#""@angular/core":\s*"[~^]?(\d+\.\d+(?:\.\d+)?)""#, 0.85, "package.json"),
        ]);
        map.insert("React", vec![
            p(r"React[/\s]+[Vv]?(\d+\.\d+(?:\.\d+)?)", 0.9, "explicit version"),
            p(r#""react":\s*"[~^]?(\d+\.\d+(?:\.\d+)?)""#, 0.85, "package.json"),
            p(r"react@(\d+\.\d+(?:\.\d+)?)", 0.8, "CDN reference"),
        ]);
        map.insert("Svelte", vec![
            p(r"Svelte[/\s]+[Vv]?(\d+\.\d+(?:\.\d+)?)", 0.9, "explicit version"),
            p(r#""svelte":\s*"[~^]?(\d+\.\d+(?:\.\d+)?)""#, 0.85, "package.json"),
        ]);
        map.insert("SvelteKit", vec![
            p(r#""@sveltejs/kit":\s*"[~^]?(\d+\.\d+(?:\.\d+)?)""#, 0.85, "package.json"),
        ]);
        map.insert("WordPress", vec![
            p(r#"<meta name="generator" content="WordPress (\d+\.\d+(?:\.\d+)?)""#, 0.95, "generator meta"),
            p(r"WordPress (\d+\.\d+(?:\.\d+)?)", 0.9, "explicit version"),
        ]);
        map.insert("Drupal", vec![
            p(r"Drupal[/\s]+[Vv]?(\d+\.\d+(?:\.\d+)?)", 0.9, "explicit version"),
            p(r#"<meta name="Generator" content="Drupal (\d+)"#, 0.9, "generator meta"),
        ]);
        map.insert("Joomla", vec![
            p(r"Joomla[!/\s]+[Vv]?(\d+\.\d+(?:\.\d+)?)", 0.9, "explicit version"),
            p(r#"<meta name="generator" content="Joomla! - Open Source Content Management - Version (\d+\.\d+(?:\.\d+)?)""#, 0.95, "generator meta"),
        ]);
        map.insert("Magento", vec![
            p(r"Magento[/\s]+[Vv]?(\d+\.\d+(?:\.\d+)?)", 0.9, "explicit version"),
        ]);
        map.insert("Symfony", vec![
            p(r"Symfony[/\s]+[Vv]?(\d+\.\d+(?:\.\d+)?)", 0.9, "explicit version"),
        ]);
        map.insert("FastAPI", vec![
            p(r"FastAPI[/\s]+[Vv]?(\d+\.\d+(?:\.\d+)?)", 0.9, "explicit version"),
        ]);
        map.insert("Gin", vec![
            p(r"Gin[/\s]+[Vv]?(\d+\.\d+(?:\.\d+)?)", 0.9, "explicit version"),
        ]);
        map.insert("Phoenix", vec![
            p(r"Phoenix[/\s]+[Vv]?(\d+\.\d+(?:\.\d+)?)", 0.9, "explicit version"),
        ]);
        map.insert("Ember.js", vec![
            p(r"Ember[/\s]+[Vv]?(\d+\.\d+(?:\.\d+)?)", 0.9, "explicit version"),
        ]);
        map.insert("Backbone.js", vec![
            p(r"Backbone[/\s]+[Vv]?(\d+\.\d+(?:\.\d+)?)", 0.9, "explicit version"),
        ]);
        map.insert("Meteor", vec![
            p(r"Meteor[/\s]+[Vv]?(\d+\.\d+(?:\.\d+)?)", 0.9, "explicit version"),
        ]);
        map.insert("Ghost", vec![
            p(r"Ghost[/\s]+[Vv]?(\d+\.\d+(?:\.\d+)?)", 0.9, "explicit version"),
        ]);
        map.insert("Shopify", vec![
            p(r"Shopify\.theme.*?(\d+\.\d+(?:\.\d+)?)", 0.7, "theme version"),
        ]);
        map.insert("Astro", vec![
            p(r#"<meta name="generator" content="Astro v?(\d+\.\d+(?:\.\d+)?)""#, 0.95, "generator meta"),
            p(r"Astro[/\s]+[Vv]?(\d+\.\d+(?:\.\d+)?)", 0.9, "explicit version"),
            p(r#""astro":\s*"[~^]?(\d+\.\d+(?:\.\d+)?)""#, 0.85, "package.json"),
        ]);

        map
    };
}

/// Version patterns registered for `framework`; empty when it has none.
pub fn patterns_for(framework: &str) -> &'static [VersionPattern] {
    VERSION_PATTERNS.get(framework).map(Vec::as_slice).unwrap_or(&[])
}

/// Best version for `framework` found in `body`.
pub fn extract_version(framework: &str, body: &str) -> VersionMatch {
    extract_version_with(patterns_for(framework), body)
}

/// Tries every pattern; the highest-confidence plausible capture wins and
/// ties keep the earlier pattern.
pub fn extract_version_with(patterns: &[VersionPattern], body: &str) -> VersionMatch {
    let mut best = VersionMatch::default();

    for pattern in patterns {
        let Some(version) = pattern.regex.captures(body).and_then(|caps| caps.get(1)) else {
            continue;
        };
        let version = version.as_str();
        if !is_valid_version_string(version) {
            continue;
        }
        if pattern.confidence > best.confidence {
            best = VersionMatch {
                version: version.to_string(),
                confidence: pattern.confidence,
                source: pattern.source.to_string(),
            };
        }
    }

    best
}

/// 1-20 characters of digits and dots with 1-3 dots.
pub fn is_valid_version_string(version: &str) -> bool {
    if version.is_empty() || version.len() > 20 {
        return false;
    }
    if !version.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return false;
    }
    let dots = version.matches('.').count();
    (1..=3).contains(&dots)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_confidence_pattern_wins() {
        let patterns = vec![
            p(r"(\d+\.\d+\.\d+)", 0.5, "generic"),
            p(r"Laravel\s+[Vv]?(\d+\.\d+(?:\.\d+)?)", 0.9, "explicit version"),
        ];
        let found = extract_version_with(&patterns, "Laravel 8.0.0");
        assert_eq!(found.version, "8.0.0");
        assert_eq!(found.source, "explicit version");
        assert_eq!(found.confidence, 0.9);
    }

    #[test]
    fn ties_keep_first_declared() {
        let patterns = vec![
            p(r"a-(\d+\.\d+)", 0.9, "first"),
            p(r"b-(\d+\.\d+)", 0.9, "second"),
        ];
        assert_eq!(extract_version_with(&patterns, "b-2.0 a-1.0").source, "first");
    }

    #[test]
    fn implausible_captures_are_ignored() {
        let patterns = vec![
            p(r"build (\S+)", 0.95, "build"),
            p(r"v(\d+\.\d+)", 0.5, "tag"),
        ];
        let found = extract_version_with(&patterns, "build 2023-10-01 v3.1");
        assert_eq!(found.version, "3.1");
        assert_eq!(found.source, "tag");
    }

    #[test]
    fn unknown_when_nothing_matches() {
        let found = extract_version("Laravel", "<html></html>");
        assert_eq!(found, VersionMatch::default());
        assert_eq!(found.version, UNKNOWN_VERSION);
        assert_eq!(extract_version("NoSuchFramework", "Laravel 8.0.0").version, UNKNOWN_VERSION);
    }

    #[test]
    fn generator_meta_beats_explicit_mention() {
        let body = r#"<meta name="generator" content="WordPress 6.1.1" /> WordPress 5.0"#;
        let found = extract_version("WordPress", body);
        assert_eq!(found.version, "6.1.1");
        assert_eq!(found.source, "generator meta");
    }

    #[test]
    fn version_string_sanity() {
        assert!(is_valid_version_string("8.0"));
        assert!(is_valid_version_string("7.0.4.1"));
        assert!(!is_valid_version_string("8"));
        assert!(!is_valid_version_string("1.2.3.4.5"));
        assert!(!is_valid_version_string("8.0-beta"));
        assert!(!is_valid_version_string(""));
        assert!(!is_valid_version_string("1.2222222222222222222"));
    }

    #[test]
    fn every_pattern_compiles() {
        assert!(!patterns_for("Astro").is_empty());
        assert!(VERSION_PATTERNS.values().all(|v| v.iter().all(|p| p.regex.captures_len() > 1)));
    }
}
