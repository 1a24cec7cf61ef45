// src/modules/mod.rs
pub mod builtin;
pub mod definition;
pub mod executor;
pub mod loader;
pub mod matcher;
pub mod network;
pub mod registry;
pub mod script;

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::common::context::ScanContext;
use crate::error::Result;

pub use definition::{HttpConfig, Matcher, ModuleConfig, ModuleDefinition};
pub use loader::Loader;
pub use registry::ModuleRegistry;

/// Transport a module probes the target over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleType {
    Http,
    Dns,
    Tcp,
    Script,
}

impl ModuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleType::Http => "http",
            ModuleType::Dns => "dns",
            ModuleType::Tcp => "tcp",
            ModuleType::Script => "script",
        }
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Module metadata reported to the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub id: String,
    pub name: String,
    pub author: String,
    pub severity: String,
    pub description: String,
    pub tags: Vec<String>,
}

/// Settings shared by every module run against one target.
#[derive(Debug, Clone)]
pub struct Options {
    pub timeout: Duration,
    pub threads: usize,
    pub log_dir: Option<PathBuf>,
    /// 复用调用方的HTTP客户端，未设置时由执行器自行创建
    pub http_client: Option<reqwest::Client>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            threads: 10,
            log_dir: None,
            http_client: None,
        }
    }
}

/// One reported result unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub url: String,
    pub severity: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub evidence: String,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub extracted: HashMap<String, String>,
}

/// Outcome of one module run. An empty `findings` list means the module ran
/// and found nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleResult {
    pub module_id: String,
    pub target: String,
    pub findings: Vec<Finding>,
}

impl ModuleResult {
    pub fn new(module_id: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            module_id: module_id.into(),
            target: target.into(),
            findings: Vec::new(),
        }
    }
}

/// Executable scan probe.
#[async_trait]
pub trait Module: Send + Sync {
    fn info(&self) -> Info;

    fn module_type(&self) -> ModuleType;

    async fn execute(&self, ctx: &ScanContext, target: &str, opts: &Options) -> Result<ModuleResult>;
}
