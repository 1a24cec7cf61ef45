// src/modules/definition.rs
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::common::context::ScanContext;
use crate::error::{Error, Result};
use crate::modules::{executor, network, script, Info, Module, ModuleResult, ModuleType, Options};

// YAML文件的原始结构，校验后转换为 ModuleDefinition
#[derive(Debug, Deserialize)]
struct RawModule {
    #[serde(default)]
    id: String,
    #[serde(default)]
    info: DefinitionInfo,
    #[serde(rename = "type", default)]
    module_type: String,
    http: Option<HttpConfig>,
    dns: Option<DnsConfig>,
    tcp: Option<TcpConfig>,
    script: Option<ScriptConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DefinitionInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A validated declarative module: metadata plus exactly one transport config.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDefinition {
    pub id: String,
    pub info: DefinitionInfo,
    pub config: ModuleConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModuleConfig {
    Http(HttpConfig),
    Dns(DnsConfig),
    Tcp(TcpConfig),
    Script(ScriptConfig),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default)]
    pub payloads: Vec<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: String,
    /// Accepted for compatibility; every value expands as a full cross product.
    #[serde(default)]
    pub attack: Option<String>,
    #[serde(default)]
    pub threads: usize,
    #[serde(default)]
    pub matchers: Vec<Matcher>,
    #[serde(default)]
    pub extractors: Vec<Extractor>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DnsConfig {
    /// Record type (A, AAAA, MX, TXT, NS, CNAME...). Empty means A.
    #[serde(rename = "type", default)]
    pub record_type: String,
    /// Name to query. Empty means the target's host.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub matchers: Vec<Matcher>,
    #[serde(default)]
    pub extractors: Vec<Extractor>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TcpConfig {
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub matchers: Vec<Matcher>,
    #[serde(default)]
    pub extractors: Vec<Extractor>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ScriptConfig {
    /// Program followed by its arguments.
    #[serde(default)]
    pub command: Vec<String>,
    #[serde(default)]
    pub matchers: Vec<Matcher>,
    #[serde(default)]
    pub extractors: Vec<Extractor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatcherType {
    Status,
    Word,
    Regex,
    // size等未实现的类型可以解析，但永远不匹配
    #[serde(other)]
    Unsupported,
}

/// Which slice of the captured response a matcher or extractor looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum Part {
    Header,
    Body,
    #[default]
    All,
}

impl From<String> for Part {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "header" | "headers" => Part::Header,
            "all" | "" => Part::All,
            _ => Part::Body,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum Condition {
    #[default]
    And,
    Or,
}

impl From<String> for Condition {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("or") {
            Condition::Or
        } else {
            Condition::And
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Matcher {
    #[serde(rename = "type")]
    pub kind: MatcherType,
    #[serde(default)]
    pub part: Part,
    #[serde(default)]
    pub words: Vec<String>,
    #[serde(default)]
    pub regex: Vec<String>,
    #[serde(default)]
    pub status: Vec<u16>,
    #[serde(default)]
    pub condition: Condition,
    #[serde(default)]
    pub negative: bool,
}

impl Matcher {
    pub fn status(codes: &[u16]) -> Self {
        Self::new(MatcherType::Status).with_status(codes)
    }

    pub fn words(words: &[&str]) -> Self {
        let mut matcher = Self::new(MatcherType::Word);
        matcher.words = words.iter().map(|w| w.to_string()).collect();
        matcher
    }

    pub fn regex(patterns: &[&str]) -> Self {
        let mut matcher = Self::new(MatcherType::Regex);
        matcher.regex = patterns.iter().map(|p| p.to_string()).collect();
        matcher
    }

    fn new(kind: MatcherType) -> Self {
        Self {
            kind,
            part: Part::All,
            words: Vec::new(),
            regex: Vec::new(),
            status: Vec::new(),
            condition: Condition::And,
            negative: false,
        }
    }

    fn with_status(mut self, codes: &[u16]) -> Self {
        self.status = codes.to_vec();
        self
    }

    pub fn part(mut self, part: Part) -> Self {
        self.part = part;
        self
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    pub fn negative(mut self) -> Self {
        self.negative = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorType {
    Regex,
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Extractor {
    #[serde(rename = "type")]
    pub kind: ExtractorType,
    pub name: String,
    #[serde(default)]
    pub part: Part,
    #[serde(default)]
    pub regex: Vec<String>,
    /// Capture group to read. 0 selects the first capture group, or the whole
    /// match when the pattern has no groups.
    #[serde(default)]
    pub group: usize,
}

impl ModuleDefinition {
    /// Parses and validates one YAML module document.
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawModule = serde_yaml::from_str(content)?;
        Self::from_raw(raw)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    fn from_raw(raw: RawModule) -> Result<Self> {
        if raw.id.trim().is_empty() {
            return Err(Error::MissingField("id"));
        }

        let config = match raw.module_type.trim().to_lowercase().as_str() {
            "" => return Err(Error::MissingField("type")),
            "http" => ModuleConfig::Http(raw.http.ok_or(Error::MissingConfig(ModuleType::Http))?),
            "dns" => ModuleConfig::Dns(raw.dns.ok_or(Error::MissingConfig(ModuleType::Dns))?),
            "tcp" => ModuleConfig::Tcp(raw.tcp.ok_or(Error::MissingConfig(ModuleType::Tcp))?),
            "script" => ModuleConfig::Script(raw.script.ok_or(Error::MissingConfig(ModuleType::Script))?),
            other => return Err(Error::Unsupported(other.to_string())),
        };
        config.validate()?;

        Ok(Self {
            id: raw.id.trim().to_string(),
            info: raw.info,
            config,
        })
    }

    pub fn module_type(&self) -> ModuleType {
        self.config.module_type()
    }

    pub fn info(&self) -> Info {
        Info {
            id: self.id.clone(),
            name: self.info.name.clone(),
            author: self.info.author.clone(),
            severity: self.info.severity.clone(),
            description: self.info.description.clone(),
            tags: self.info.tags.clone(),
        }
    }

    /// Severity stamped on findings; unset severities report as `info`.
    pub fn severity(&self) -> &str {
        if self.info.severity.is_empty() {
            "info"
        } else {
            &self.info.severity
        }
    }
}

impl ModuleConfig {
    pub fn module_type(&self) -> ModuleType {
        match self {
            ModuleConfig::Http(_) => ModuleType::Http,
            ModuleConfig::Dns(_) => ModuleType::Dns,
            ModuleConfig::Tcp(_) => ModuleType::Tcp,
            ModuleConfig::Script(_) => ModuleType::Script,
        }
    }

    fn matchers(&self) -> &[Matcher] {
        match self {
            ModuleConfig::Http(c) => &c.matchers,
            ModuleConfig::Dns(c) => &c.matchers,
            ModuleConfig::Tcp(c) => &c.matchers,
            ModuleConfig::Script(c) => &c.matchers,
        }
    }

    // 配置块不能为空，没有匹配器的模块永远不会产生结果
    fn validate(&self) -> Result<()> {
        let kind = self.module_type();
        match self {
            ModuleConfig::Http(c) if c.paths.is_empty() => {
                return Err(Error::Invalid(format!("{} module requires at least one path", kind)));
            },
            ModuleConfig::Tcp(c) if c.port == 0 => {
                return Err(Error::Invalid(format!("{} module requires a port", kind)));
            },
            ModuleConfig::Script(c) if c.command.is_empty() => {
                return Err(Error::Invalid(format!("{} module requires a command", kind)));
            },
            _ => {},
        }

        if self.matchers().is_empty() {
            return Err(Error::Invalid(format!("{} module requires at least one matcher", kind)));
        }
        Ok(())
    }
}

/// Wraps a parsed definition so it can sit in the registry next to native modules.
pub struct DeclarativeModule {
    def: Arc<ModuleDefinition>,
    path: Option<PathBuf>,
}

impl DeclarativeModule {
    pub fn new(def: ModuleDefinition, path: Option<PathBuf>) -> Self {
        Self {
            def: Arc::new(def),
            path,
        }
    }

    pub fn definition(&self) -> &ModuleDefinition {
        &self.def
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[async_trait]
impl Module for DeclarativeModule {
    fn info(&self) -> Info {
        self.def.info()
    }

    fn module_type(&self) -> ModuleType {
        self.def.module_type()
    }

    async fn execute(&self, ctx: &ScanContext, target: &str, opts: &Options) -> Result<ModuleResult> {
        match &self.def.config {
            ModuleConfig::Http(_) => executor::execute_http_module(ctx, target, self.def.clone(), opts).await,
            ModuleConfig::Dns(_) => network::execute_dns_module(ctx, target, &self.def, opts).await,
            ModuleConfig::Tcp(_) => network::execute_tcp_module(ctx, target, &self.def, opts).await,
            ModuleConfig::Script(_) => script::execute_script_module(ctx, target, &self.def, opts).await,
        }
    }
}
