// src/modules/network.rs
use std::str::FromStr;
use std::time::Duration;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::proto::rr::RecordType;
use hickory_resolver::TokioAsyncResolver;
use log::debug;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use crate::common::context::ScanContext;
use crate::common::utils;
use crate::error::{Error, Result};
use crate::modules::definition::{Extractor, Matcher, ModuleConfig, ModuleDefinition};
use crate::modules::executor::substitute_variables;
use crate::modules::matcher::{self, Evidence, MAX_BODY_SIZE};
use crate::modules::{Finding, ModuleResult, ModuleType, Options};

/// Resolves one record set for the target and matches against the answers,
/// one record per line.
pub async fn execute_dns_module(
    ctx: &ScanContext,
    target: &str,
    def: &ModuleDefinition,
    opts: &Options,
) -> Result<ModuleResult> {
    let ModuleConfig::Dns(cfg) = &def.config else {
        return Err(Error::MissingConfig(ModuleType::Dns));
    };
    let mut result = ModuleResult::new(def.id.as_str(), target);

    let record_type = parse_record_type(&cfg.record_type)?;
    let name = query_name(target, &cfg.name);
    if ctx.is_cancelled() {
        return Ok(result);
    }

    let mut resolver_opts = ResolverOpts::default();
    resolver_opts.timeout = opts.timeout;
    let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), resolver_opts);

    let lookup = tokio::select! {
        _ = ctx.cancelled() => return Ok(result),
        res = timeout(opts.timeout, resolver.lookup(name.as_str(), record_type)) => res,
    };
    let records: Vec<String> = match lookup {
        Ok(Ok(lookup)) => lookup.iter().map(|rdata| rdata.to_string()).collect(),
        Ok(Err(e)) => {
            debug!("[{}] {} lookup for {} failed: {}", def.id, record_type, name, e);
            return Ok(result);
        },
        Err(_) => {
            debug!("[{}] {} lookup for {} timed out", def.id, record_type, name);
            return Ok(result);
        },
    };

    let evidence = Evidence::from_body(records.join("\n"));
    if let Some(finding) = evaluate(def, name, &cfg.matchers, &cfg.extractors, &evidence) {
        result.findings.push(finding);
    }
    Ok(result)
}

/// Connects to `host:port`, optionally sends a probe, and matches against
/// whatever the peer returns before closing or timing out.
pub async fn execute_tcp_module(
    ctx: &ScanContext,
    target: &str,
    def: &ModuleDefinition,
    opts: &Options,
) -> Result<ModuleResult> {
    let ModuleConfig::Tcp(cfg) = &def.config else {
        return Err(Error::MissingConfig(ModuleType::Tcp));
    };
    let mut result = ModuleResult::new(def.id.as_str(), target);

    let host = utils::hostname(target);
    if host.is_empty() {
        return Err(Error::NoRequests(def.id.clone()));
    }
    let address = if host.contains(':') {
        format!("[{}]:{}", host, cfg.port)
    } else {
        format!("{}:{}", host, cfg.port)
    };
    let data = unescape(&substitute_variables(&cfg.data, target.trim_end_matches('/'), ""));

    let received = tokio::select! {
        _ = ctx.cancelled() => return Ok(result),
        res = probe_tcp(&address, data.as_bytes(), opts.timeout) => res,
    };
    let body = match received {
        Ok(body) => body,
        Err(e) => {
            debug!("[{}] tcp probe of {} failed: {}", def.id, address, e);
            return Ok(result);
        },
    };

    let evidence = Evidence::from_body(body);
    if let Some(finding) = evaluate(def, address, &cfg.matchers, &cfg.extractors, &evidence) {
        result.findings.push(finding);
    }
    Ok(result)
}

async fn probe_tcp(address: &str, data: &[u8], limit: Duration) -> std::io::Result<String> {
    let mut stream = timeout(limit, TcpStream::connect(address))
        .await
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::TimedOut, "connect timed out"))??;

    if !data.is_empty() {
        stream.write_all(data).await?;
    }

    // 读取到对端关闭、超时或达到上限为止
    let mut received = Vec::new();
    let mut buf = [0u8; 4096];
    let deadline = tokio::time::Instant::now() + limit;
    while received.len() < MAX_BODY_SIZE {
        match tokio::time::timeout_at(deadline, stream.read(&mut buf)).await {
            Ok(Ok(0)) | Err(_) => break,
            Ok(Ok(n)) => {
                let take = n.min(MAX_BODY_SIZE - received.len());
                received.extend_from_slice(&buf[..take]);
            },
            Ok(Err(e)) if received.is_empty() => return Err(e),
            Ok(Err(_)) => break,
        }
    }

    Ok(String::from_utf8_lossy(&received).into_owned())
}

pub(crate) fn evaluate(
    def: &ModuleDefinition,
    url: String,
    matchers: &[Matcher],
    extractors: &[Extractor],
    evidence: &Evidence,
) -> Option<Finding> {
    if !matcher::matches_all(matchers, evidence) {
        return None;
    }

    Some(Finding {
        url,
        severity: def.severity().to_string(),
        evidence: matcher::truncate_evidence(&evidence.body),
        extracted: matcher::run_extractors(extractors, evidence),
    })
}

fn parse_record_type(value: &str) -> Result<RecordType> {
    if value.trim().is_empty() {
        return Ok(RecordType::A);
    }
    RecordType::from_str(&value.trim().to_uppercase())
        .map_err(|_| Error::Invalid(format!("unknown dns record type {:?}", value)))
}

// 未指定名称时查询目标主机名
fn query_name(target: &str, template: &str) -> String {
    let base_url = target.trim_end_matches('/');
    if template.trim().is_empty() {
        utils::hostname(base_url)
    } else {
        let name = substitute_variables(template, base_url, "");
        // 查询名中不能带端口
        match name.rsplit_once(':') {
            Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) && !host.contains(':') => host.to_string(),
            _ => name,
        }
    }
}

/// Expands `\n`, `\r`, `\t` and `\\` escapes in probe data.
pub fn unescape(data: &str) -> String {
    let mut out = String::with_capacity(data.len());
    let mut chars = data.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            },
            None => out.push('\\'),
        }
    }
    out
}
