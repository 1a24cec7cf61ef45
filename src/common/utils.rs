use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::time::Duration;
use reqwest::Url;

/// Default User-Agent for probes that do not set one.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; sif-rs/0.1)";

/// 从文件中读取行，跳过空行和注释
pub fn read_lines_from_file(file_path: impl AsRef<Path>) -> io::Result<Vec<String>> {
    let file = File::open(file_path)?;
    let reader = BufReader::new(file);
    let mut lines = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() && !line.starts_with('#') {
            lines.push(line.to_string());
        }
    }

    Ok(lines)
}

/// Builds the shared HTTP client used when the caller supplies none.
pub fn build_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .danger_accept_invalid_certs(true) // 忽略SSL证书错误
        .user_agent(DEFAULT_USER_AGENT)
        .build()
}

/// Reads a response body, keeping at most `limit` bytes. Larger bodies are
/// truncated rather than rejected.
pub async fn read_body_capped(mut resp: reqwest::Response, limit: usize) -> reqwest::Result<String> {
    let mut buf: Vec<u8> = Vec::new();

    while let Some(chunk) = resp.chunk().await? {
        let remaining = limit - buf.len();
        if chunk.len() >= remaining {
            buf.extend_from_slice(&chunk[..remaining]);
            break;
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

// 解析目标地址，没有scheme时按http处理
fn parse_target(target: &str) -> Option<Url> {
    Url::parse(target)
        .ok()
        .filter(Url::has_host)
        .or_else(|| Url::parse(&format!("http://{}", target)).ok())
        .filter(Url::has_host)
}

/// `https://user:pw@example.com:8443/app` -> `example.com:8443`. Default
/// ports are left out; IPv6 literals keep their brackets.
pub fn host_port(target: &str) -> String {
    let Some(url) = parse_target(target) else {
        return String::new();
    };
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

/// Host without port or credentials; IPv6 literals lose their brackets.
pub fn hostname(target: &str) -> String {
    parse_target(target)
        .and_then(|url| url.host_str().map(|h| h.trim_start_matches('[').trim_end_matches(']').to_string()))
        .unwrap_or_default()
}

/// Whether the target carries an http(s) scheme.
pub fn is_http_target(target: &str) -> bool {
    target.starts_with("http://") || target.starts_with("https://")
}
