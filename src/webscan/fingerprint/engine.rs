// src/webscan/fingerprint/engine.rs
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use log::{debug, info};
use reqwest::header::USER_AGENT;
use crate::common::context::ScanContext;
use crate::common::{pool, utils};
use crate::error::Result;
use crate::modules::matcher::MAX_BODY_SIZE;
use crate::output::file;
use super::result::{determine_risk_level, FrameworkResult};
use super::{cve, version, DetectorRegistry};

/// Confidence a detector must strictly exceed to be reported.
pub const DETECTION_THRESHOLD: f32 = 0.5;

/// Fetches `target` once and identifies its framework with the built-in
/// detectors. `Ok(None)` means nothing was confident enough.
pub async fn detect_framework(target: &str, timeout: Duration, log_dir: Option<&Path>) -> Result<Option<FrameworkResult>> {
    let client = utils::build_client(timeout)?;
    detect_framework_with(&ScanContext::new(), &client, super::registry(), target, log_dir).await
}

/// Same as [`detect_framework`] with a caller-supplied client, context and
/// detector set. Only the page fetch can fail.
pub async fn detect_framework_with(
    ctx: &ScanContext,
    client: &reqwest::Client,
    detectors: &DetectorRegistry,
    target: &str,
    log_dir: Option<&Path>,
) -> Result<Option<FrameworkResult>> {
    // 获取页面
    let resp = client
        .get(target)
        .header(USER_AGENT, utils::DEFAULT_USER_AGENT)
        .send()
        .await?;
    let headers = Arc::new(resp.headers().clone());
    let body = Arc::new(utils::read_body_capped(resp, MAX_BODY_SIZE).await?);

    let detectors = detectors.all();
    let width = detectors.len();
    let scores = pool::run_bounded(ctx, width, detectors, |detector| {
        let body = body.clone();
        let headers = headers.clone();
        async move {
            let (confidence, version) = detector.detect(&body, &headers);
            Some((detector.name().to_string(), confidence, version))
        }
    })
    .await;

    // 取置信度最高的结果，相同置信度按到达顺序保留先到者
    let mut best: Option<(String, f32)> = None;
    for (name, confidence, _) in scores {
        debug!("Detector {} scored {:.3} on {}", name, confidence, target);
        if best.as_ref().map_or(true, |(_, c)| confidence > *c) {
            best = Some((name, confidence));
        }
    }

    let Some((name, confidence)) = best.filter(|(_, c)| *c > DETECTION_THRESHOLD) else {
        debug!("No framework detected on {}", target);
        return Ok(None);
    };

    let found = version::extract_version(&name, &body);
    let (cves, suggestions) = cve::lookup_vulnerabilities(&name, &found.version);
    let risk_level = determine_risk_level(&cves);

    info!(
        "Detected {} {} on {} (confidence {:.2}, risk {})",
        name, found.version, target, confidence, risk_level
    );

    if let Some(log_dir) = log_dir {
        let mut entry = format!(
            "Framework: {} (version: {}, confidence: {:.2}, version source: {})\n",
            name,
            found.version,
            confidence,
            if found.source.is_empty() { "none" } else { found.source.as_str() }
        );
        for cve in &cves {
            entry.push_str(&format!("  {}\n", cve));
        }
        file::write_target_log(target, log_dir, &entry);
    }

    Ok(Some(FrameworkResult {
        name,
        version: found.version,
        confidence,
        version_confidence: found.confidence,
        cves,
        suggestions,
        risk_level,
    }))
}
