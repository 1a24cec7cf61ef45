// src/output/report.rs
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::Path;
use chrono::Local;
use serde::Serialize;
use crate::error::Result;
use crate::modules::ModuleResult;
use crate::output::file;

#[derive(Serialize)]
struct Report<'a> {
    timestamp: String,
    summary: Summary,
    results: &'a [ModuleResult],
}

#[derive(Serialize)]
struct Summary {
    targets: usize,
    modules_run: usize,
    findings: usize,
    by_severity: BTreeMap<String, usize>,
}

/// Writes `results` to `output_path` as `json`, or as text for any other format.
pub fn generate(output_path: &Path, results: &[ModuleResult], format: &str) -> Result<()> {
    let report = build(results);

    // 根据格式生成报告
    let content = match format.to_lowercase().as_str() {
        "json" => serde_json::to_string_pretty(&report).map_err(io::Error::from)?,
        _ => render_text(&report),
    };
    file::write_to_file(output_path, &content)?;

    Ok(())
}

fn build(results: &[ModuleResult]) -> Report<'_> {
    let targets: BTreeSet<&str> = results.iter().map(|r| r.target.as_str()).collect();
    let mut by_severity = BTreeMap::new();
    for finding in results.iter().flat_map(|r| &r.findings) {
        *by_severity.entry(finding.severity.to_lowercase()).or_insert(0) += 1;
    }

    Report {
        timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        summary: Summary {
            targets: targets.len(),
            modules_run: results.len(),
            findings: by_severity.values().sum(),
            by_severity,
        },
        results,
    }
}

fn render_text(report: &Report<'_>) -> String {
    let mut content = String::new();

    // 标题
    content.push_str("# SIF-RS SCAN REPORT\n");
    content.push_str(&format!("Date: {}\n\n", report.timestamp));

    // 摘要
    content.push_str("## SUMMARY\n");
    content.push_str(&format!("Targets: {}\n", report.summary.targets));
    content.push_str(&format!("Modules Run: {}\n", report.summary.modules_run));
    content.push_str(&format!("Findings: {}\n", report.summary.findings));
    for (severity, count) in &report.summary.by_severity {
        content.push_str(&format!("  {}: {}\n", severity, count));
    }
    content.push('\n');

    // 发现
    content.push_str("## FINDINGS\n");
    for result in report.results.iter().filter(|r| !r.findings.is_empty()) {
        content.push_str(&format!("- [{}] {}\n", result.module_id, result.target));
        for finding in &result.findings {
            content.push_str(&format!("  [{}] {}\n", finding.severity, finding.url));

            let mut extracted: Vec<_> = finding.extracted.iter().collect();
            extracted.sort();
            for (key, value) in extracted {
                content.push_str(&format!("    {}: {}\n", key, value));
            }
            if !finding.evidence.is_empty() {
                let short: String = finding.evidence.chars().take(100).collect::<String>().replace('\n', " ");
                content.push_str(&format!("    Evidence: {}\n", short));
            }
        }
    }

    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::Finding;

    fn results() -> Vec<ModuleResult> {
        let mut hit = ModuleResult::new("git-config", "http://a");
        hit.findings.push(Finding {
            url: "http://a/.git/config".into(),
            severity: "High".into(),
            evidence: "[core]\nrepositoryformatversion = 0".into(),
            extracted: [("branch".to_string(), "main".to_string())].into_iter().collect(),
        });
        vec![hit, ModuleResult::new("env-file", "http://a"), ModuleResult::new("git-config", "http://b")]
    }

    #[test]
    fn text_report_lists_findings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        generate(&path, &results(), "text").unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("Targets: 2"));
        assert!(content.contains("Modules Run: 3"));
        assert!(content.contains("  high: 1"));
        assert!(content.contains("  [High] http://a/.git/config"));
        assert!(content.contains("    branch: main"));
        assert!(content.contains("Evidence: [core] repositoryformatversion = 0"));
    }

    #[test]
    fn json_report_round_trips_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        generate(&path, &results(), "JSON").unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["summary"]["findings"], 1);
        assert_eq!(value["results"][0]["findings"][0]["extracted"]["branch"], "main");
        assert!(value["results"][1]["findings"].as_array().unwrap().is_empty());
    }
}
