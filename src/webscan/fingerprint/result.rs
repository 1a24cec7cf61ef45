// src/webscan/fingerprint/result.rs
use std::fmt;
use serde::{Deserialize, Serialize};

/// Highest CVE severity attached to a detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// critical > high > medium; `Low` only when no CVE matched.
pub fn determine_risk_level(cves: &[String]) -> RiskLevel {
    if cves.is_empty() {
        return RiskLevel::Low;
    }
    if cves.iter().any(|c| c.contains("(critical)")) {
        RiskLevel::Critical
    } else if cves.iter().any(|c| c.contains("(high)")) {
        RiskLevel::High
    } else {
        RiskLevel::Medium
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkResult {
    pub name: String,
    pub version: String,
    pub confidence: f32,
    pub version_confidence: f32,
    pub cves: Vec<String>,
    pub suggestions: Vec<String>,
    pub risk_level: RiskLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_follows_worst_cve() {
        let cves = vec!["CVE-A (medium)".to_string(), "CVE-B (critical)".to_string()];
        assert_eq!(determine_risk_level(&cves), RiskLevel::Critical);

        let cves = vec!["CVE-A (medium)".to_string(), "CVE-B (high)".to_string()];
        assert_eq!(determine_risk_level(&cves), RiskLevel::High);

        assert_eq!(determine_risk_level(&["CVE-A (low)".to_string()]), RiskLevel::Medium);
        assert_eq!(determine_risk_level(&[]), RiskLevel::Low);
    }

    #[test]
    fn risk_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&RiskLevel::Critical).unwrap(), "\"critical\"");
        assert_eq!(RiskLevel::High.to_string(), "high");
        assert!(RiskLevel::Critical > RiskLevel::Medium);
    }
}
