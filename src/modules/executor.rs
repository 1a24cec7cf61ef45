// src/modules/executor.rs
use std::sync::Arc;
use log::{debug, info};
use reqwest::header::USER_AGENT;
use reqwest::{Method, Url};
use crate::common::context::ScanContext;
use crate::common::{pool, utils};
use crate::error::{Error, Result};
use crate::modules::definition::{HttpConfig, ModuleConfig, ModuleDefinition};
use crate::modules::matcher::{self, Evidence, MAX_BODY_SIZE};
use crate::modules::{Finding, ModuleResult, ModuleType, Options};
use crate::output::file;

/// Worker count when neither the module nor the caller sets one.
pub const DEFAULT_THREADS: usize = 10;

/// One concrete request expanded from a module's templates.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub payload: String,
    /// Path template the URL came from.
    pub original: String,
}

/// Replaces `{{BaseURL}}`, `{{Hostname}}` and `{{payload}}` placeholders.
pub fn substitute_variables(template: &str, base_url: &str, payload: &str) -> String {
    template
        .replace("{{BaseURL}}", base_url)
        .replace("{{baseurl}}", base_url)
        .replace("{{Hostname}}", &utils::host_port(base_url))
        .replace("{{payload}}", payload)
        .replace("{{Payload}}", payload)
}

// 没有scheme的路径按目标地址解析，如 "/admin"
fn resolve_url(base_url: &str, url: String) -> String {
    if Url::parse(&url).is_ok() {
        return url;
    }
    match Url::parse(&format!("{}/", base_url)).and_then(|base| base.join(&url)) {
        Ok(joined) => joined.to_string(),
        Err(_) => url,
    }
}

/// Expands paths x payloads. Without payloads every path is used once.
pub fn generate_requests(target: &str, cfg: &HttpConfig) -> Vec<HttpRequest> {
    let base_url = target.trim_end_matches('/');
    let method = if cfg.method.is_empty() {
        "GET".to_string()
    } else {
        cfg.method.to_uppercase()
    };

    // 没有payload时用空字符串代替，每个路径生成一个请求
    let payloads: Vec<&str> = if cfg.payloads.is_empty() {
        vec![""]
    } else {
        cfg.payloads.iter().map(String::as_str).collect()
    };

    let mut requests = Vec::with_capacity(cfg.paths.len() * payloads.len());
    for path in &cfg.paths {
        for payload in &payloads {
            requests.push(HttpRequest {
                method: method.clone(),
                url: resolve_url(base_url, substitute_variables(path, base_url, payload)),
                headers: cfg
                    .headers
                    .iter()
                    .map(|(k, v)| (k.clone(), substitute_variables(v, base_url, payload)))
                    .collect(),
                body: substitute_variables(&cfg.body, base_url, payload),
                payload: payload.to_string(),
                original: path.clone(),
            });
        }
    }

    requests
}

/// Module setting first, then the caller's, then `DEFAULT_THREADS`.
pub fn effective_threads(cfg: &HttpConfig, opts: &Options) -> usize {
    if cfg.threads > 0 {
        cfg.threads
    } else if opts.threads > 0 {
        opts.threads
    } else {
        DEFAULT_THREADS
    }
}

/// Runs an HTTP module against `target`.
///
/// Requests run on a pool bounded by [`effective_threads`]. Failed requests
/// are skipped; cancellation stops dispatch and returns what was collected.
pub async fn execute_http_module(
    ctx: &ScanContext,
    target: &str,
    def: Arc<ModuleDefinition>,
    opts: &Options,
) -> Result<ModuleResult> {
    let ModuleConfig::Http(cfg) = &def.config else {
        return Err(Error::MissingConfig(ModuleType::Http));
    };
    let mut result = ModuleResult::new(def.id.as_str(), target);

    let requests: Vec<HttpRequest> = generate_requests(target, cfg)
        .into_iter()
        .filter(|r| match Url::parse(&r.url) {
            Ok(_) => true,
            Err(e) => {
                debug!("[{}] skipping malformed url {}: {}", def.id, r.url, e);
                false
            },
        })
        .collect();
    if requests.is_empty() {
        return Err(Error::NoRequests(def.id.clone()));
    }

    let method = Method::from_bytes(requests[0].method.as_bytes())
        .map_err(|_| Error::Invalid(format!("invalid http method {:?}", requests[0].method)))?;

    let client = match &opts.http_client {
        Some(client) => client.clone(),
        None => utils::build_client(opts.timeout)?,
    };
    let threads = effective_threads(cfg, opts);

    debug!("[{}] dispatching {} requests with {} workers", def.id, requests.len(), threads);

    result.findings = pool::run_bounded(ctx, threads, requests, |request| {
        let client = client.clone();
        let method = method.clone();
        let def = def.clone();
        async move { execute_request(&client, method, request, &def).await }
    })
    .await;

    if !result.findings.is_empty() {
        info!("[{}] {} findings on {}", def.id, result.findings.len(), target);
    }

    if let Some(log_dir) = &opts.log_dir {
        let mut entry = format!("Module {}: {} findings\n", def.id, result.findings.len());
        for finding in &result.findings {
            entry.push_str(&format!("  [{}] {}\n", finding.severity, finding.url));
        }
        file::write_target_log(target, log_dir, &entry);
    }

    Ok(result)
}

// 执行单个请求并检查匹配器，网络错误直接跳过
async fn execute_request(
    client: &reqwest::Client,
    method: Method,
    request: HttpRequest,
    def: &ModuleDefinition,
) -> Option<Finding> {
    let ModuleConfig::Http(cfg) = &def.config else {
        return None;
    };

    let mut req = client.request(method, &request.url);
    let mut has_user_agent = false;
    for (key, value) in &request.headers {
        has_user_agent |= key.eq_ignore_ascii_case(USER_AGENT.as_str());
        req = req.header(key.as_str(), value.as_str());
    }
    if !has_user_agent {
        req = req.header(USER_AGENT, utils::DEFAULT_USER_AGENT);
    }
    if !request.body.is_empty() {
        req = req.body(request.body.clone());
    }

    let resp = match req.send().await {
        Ok(resp) => resp,
        Err(e) => {
            debug!("[{}] request to {} failed: {}", def.id, request.url, e);
            return None;
        },
    };

    let status = resp.status().as_u16();
    let headers = resp.headers().clone();
    let body = match utils::read_body_capped(resp, MAX_BODY_SIZE).await {
        Ok(body) => body,
        Err(e) => {
            debug!("[{}] reading body of {} failed: {}", def.id, request.url, e);
            return None;
        },
    };

    let evidence = Evidence::from_http(status, &headers, body);
    if !matcher::matches_all(&cfg.matchers, &evidence) {
        return None;
    }

    Some(Finding {
        url: request.url,
        severity: def.severity().to_string(),
        evidence: matcher::truncate_evidence(&evidence.body),
        extracted: matcher::run_extractors(&cfg.extractors, &evidence),
    })
}
