// src/modules/matcher.rs
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::RwLock;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use reqwest::header::HeaderMap;
use crate::modules::definition::{Condition, Extractor, ExtractorType, Matcher, MatcherType, Part};

/// Response bodies are cut at this size before any matching.
pub const MAX_BODY_SIZE: usize = 5 * 1024 * 1024;

/// Findings keep at most this many characters of evidence.
pub const MAX_EVIDENCE_LEN: usize = 500;

lazy_static! {
    // 模块里的正则会在每个请求上重复使用，编译一次即可。编译失败记为None
    static ref REGEX_CACHE: RwLock<HashMap<String, Option<Regex>>> = RwLock::new(HashMap::new());
}

fn compile(pattern: &str) -> Option<Regex> {
    // 先用读锁查找，未命中时才加写锁编译
    if let Some(cached) = REGEX_CACHE.read().unwrap_or_else(|e| e.into_inner()).get(pattern) {
        return cached.clone();
    }
    let mut cache = REGEX_CACHE.write().unwrap_or_else(|e| e.into_inner());
    cache
        .entry(pattern.to_string())
        .or_insert_with(|| match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                debug!("Skipping invalid pattern {:?}: {}", pattern, e);
                None
            },
        })
        .clone()
}

/// Everything a matcher or extractor can look at for one probe.
#[derive(Debug, Clone, Default)]
pub struct Evidence {
    /// HTTP status or process exit code; `None` for transports without one.
    pub status: Option<u16>,
    /// `Name: value\n` lines, one per header/value pair.
    pub headers: String,
    pub body: String,
}

impl Evidence {
    pub fn new(status: Option<u16>, headers: String, body: String) -> Self {
        Self { status, headers, body }
    }

    pub fn from_http(status: u16, headers: &HeaderMap, body: String) -> Self {
        Self::new(Some(status), header_block(headers), body)
    }

    /// Body-only evidence used by the DNS, TCP and script transports.
    pub fn from_body(body: String) -> Self {
        Self::new(None, String::new(), body)
    }

    pub fn part(&self, part: Part) -> Cow<'_, str> {
        match part {
            Part::Header => Cow::Borrowed(&self.headers),
            Part::Body => Cow::Borrowed(&self.body),
            Part::All => Cow::Owned(format!("{}\n{}", self.headers, self.body)),
        }
    }
}

/// Renders headers as `Name: value\n` lines with canonical name casing.
pub fn header_block(headers: &HeaderMap) -> String {
    let mut block = String::new();
    for (name, value) in headers.iter() {
        block.push_str(&canonical_header_name(name.as_str()));
        block.push_str(": ");
        block.push_str(&String::from_utf8_lossy(value.as_bytes()));
        block.push('\n');
    }
    block
}

/// `content-type` -> `Content-Type`
pub fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// True when every matcher passes after its own negation. An empty list never matches.
pub fn matches_all(matchers: &[Matcher], evidence: &Evidence) -> bool {
    if matchers.is_empty() {
        return false;
    }

    matchers.iter().all(|m| check_matcher(m, evidence) != m.negative)
}

/// Evaluates a single matcher, ignoring its `negative` flag.
pub fn check_matcher(matcher: &Matcher, evidence: &Evidence) -> bool {
    match matcher.kind {
        MatcherType::Status => match evidence.status {
            Some(code) => matcher.status.contains(&code),
            None => false,
        },
        MatcherType::Word => check_words(&evidence.part(matcher.part), &matcher.words, matcher.condition),
        MatcherType::Regex => check_regex(&evidence.part(matcher.part), &matcher.regex, matcher.condition),
        MatcherType::Unsupported => false,
    }
}

fn check_words(content: &str, words: &[String], condition: Condition) -> bool {
    if words.is_empty() {
        return false;
    }

    match condition {
        Condition::Or => words.iter().any(|word| content.contains(word.as_str())),
        Condition::And => words.iter().all(|word| content.contains(word.as_str())),
    }
}

// 无效的正则视为不匹配
fn check_regex(content: &str, patterns: &[String], condition: Condition) -> bool {
    if patterns.is_empty() {
        return false;
    }

    let is_match = |pattern: &String| compile(pattern).map_or(false, |re| re.is_match(content));
    match condition {
        Condition::Or => patterns.iter().any(is_match),
        Condition::And => patterns.iter().all(is_match),
    }
}

/// Runs every extractor independently; the first pattern with a non-empty
/// capture wins for that extractor's name.
pub fn run_extractors(extractors: &[Extractor], evidence: &Evidence) -> HashMap<String, String> {
    let mut extracted = HashMap::new();

    for extractor in extractors {
        if extractor.kind != ExtractorType::Regex {
            continue;
        }

        let content = evidence.part(extractor.part);
        for pattern in &extractor.regex {
            let Some(re) = compile(pattern) else {
                continue;
            };
            let Some(caps) = re.captures(&content) else {
                continue;
            };

            let index = match extractor.group {
                0 if re.captures_len() > 1 => 1,
                group => group,
            };
            if let Some(value) = caps.get(index).map(|m| m.as_str()).filter(|v| !v.is_empty()) {
                extracted.insert(extractor.name.clone(), value.to_string());
                break;
            }
        }
    }

    extracted
}

/// Cuts evidence to `MAX_EVIDENCE_LEN` characters, marking the cut with `...`.
pub fn truncate_evidence(s: &str) -> String {
    match s.char_indices().nth(MAX_EVIDENCE_LEN) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
