// src/modules/builtin.rs
use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use crate::common::context::ScanContext;
use crate::common::utils;
use crate::error::Result;
use crate::modules::registry::ModuleRegistry;
use crate::modules::{Finding, Info, Module, ModuleResult, ModuleType, Options};
use crate::webscan::fingerprint::{self, DetectorRegistry, FrameworkResult, RiskLevel};

pub const FRAMEWORK_MODULE_ID: &str = "framework-detection";

/// Registers the natively implemented modules.
pub fn register_builtin(registry: &ModuleRegistry) {
    registry.register(Arc::new(FrameworksModule::new()));
}

/// Framework fingerprinting exposed through the generic module interface.
pub struct FrameworksModule {
    detectors: &'static DetectorRegistry,
}

impl Default for FrameworksModule {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameworksModule {
    pub fn new() -> Self {
        Self::with_detectors(fingerprint::registry())
    }

    pub fn with_detectors(detectors: &'static DetectorRegistry) -> Self {
        Self { detectors }
    }
}

#[async_trait]
impl Module for FrameworksModule {
    fn info(&self) -> Info {
        Info {
            id: FRAMEWORK_MODULE_ID.to_string(),
            name: "Web Framework Detection".to_string(),
            author: "sif".to_string(),
            severity: "info".to_string(),
            description: "Detects web frameworks with version and CVE mapping".to_string(),
            tags: vec!["recon".to_string(), "framework".to_string(), "cve".to_string()],
        }
    }

    fn module_type(&self) -> ModuleType {
        ModuleType::Http
    }

    async fn execute(&self, ctx: &ScanContext, target: &str, opts: &Options) -> Result<ModuleResult> {
        let mut result = ModuleResult::new(FRAMEWORK_MODULE_ID, target);

        let client = match &opts.http_client {
            Some(client) => client.clone(),
            None => utils::build_client(opts.timeout)?,
        };
        let detected =
            fingerprint::detect_framework_with(ctx, &client, self.detectors, target, opts.log_dir.as_deref()).await?;

        if let Some(framework) = detected {
            result.findings.push(to_finding(target, &framework));
        }
        Ok(result)
    }
}

/// Maps a detection onto the generic finding shape.
pub fn to_finding(target: &str, framework: &FrameworkResult) -> Finding {
    let mut extracted = HashMap::new();
    extracted.insert("framework".to_string(), framework.name.clone());
    extracted.insert("version".to_string(), framework.version.clone());
    extracted.insert("confidence".to_string(), format!("{:.2}", framework.confidence));
    extracted.insert("version_confidence".to_string(), format!("{:.2}", framework.version_confidence));
    if !framework.cves.is_empty() {
        extracted.insert("cves".to_string(), framework.cves.join(", "));
        extracted.insert("risk_level".to_string(), framework.risk_level.to_string());
    }
    if !framework.suggestions.is_empty() {
        extracted.insert("recommendations".to_string(), framework.suggestions.join("; "));
    }

    let severity = match framework.risk_level {
        RiskLevel::Low => "info".to_string(),
        level => level.to_string(),
    };

    Finding {
        url: target.to_string(),
        severity,
        evidence: format!(
            "Detected {} framework (version: {}, confidence: {:.2})",
            framework.name, framework.version, framework.confidence
        ),
        extracted,
    }
}
