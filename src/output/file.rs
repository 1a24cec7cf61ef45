// src/output/file.rs
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use chrono::Local;
use log::warn;
use reqwest::Url;
use crate::common::utils;

pub fn write_to_file(path: &Path, content: &str) -> io::Result<()> {
    // 确保目录存在
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}

pub fn append_to_file(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    // 以追加模式打开，文件不存在时创建
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}

/// `https://example.com:8443/app` -> `<log_dir>/example.com_8443_app.log`
pub fn target_log_path(target: &str, log_dir: &Path) -> PathBuf {
    // 文件名不含scheme和用户信息
    let stripped = match Url::parse(target) {
        Ok(url) if url.has_host() => {
            let mut name = utils::host_port(target);
            name.push_str(url.path());
            if let Some(query) = url.query() {
                name.push('?');
                name.push_str(query);
            }
            name
        },
        _ => target.to_string(),
    };
    let name: String = stripped
        .trim_end_matches('/')
        .chars()
        .map(|c| match c {
            '/' | ':' | '\\' | '?' | '*' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect();
    log_dir.join(format!("{}.log", name))
}

/// Starts the per-target log with a header line. Existing logs are appended to.
pub fn create_target_log(target: &str, log_dir: &Path) {
    let header = format!(
        "==== sif-rs scan of {} started {} ====\n",
        target,
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    if let Err(e) = append_to_file(&target_log_path(target, log_dir), &header) {
        warn!("Failed to create log for {}: {}", target, e);
    }
}

/// Appends timestamped lines to the target's log. Write failures are logged
/// and otherwise ignored.
pub fn write_target_log(target: &str, log_dir: &Path, text: &str) {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    let mut entry = String::new();
    for line in text.lines() {
        entry.push_str(&format!("[{}] {}\n", timestamp, line));
    }
    if let Err(e) = append_to_file(&target_log_path(target, log_dir), &entry) {
        warn!("Failed to write log for {}: {}", target, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_path_is_sanitised() {
        let dir = Path::new("/tmp/logs");
        assert_eq!(target_log_path("https://example.com:8443/app/", dir), dir.join("example.com_8443_app.log"));
        assert_eq!(target_log_path("http://example.com", dir), dir.join("example.com.log"));
        assert_eq!(target_log_path("http://user:pw@example.com/a?b=1", dir), dir.join("example.com_a_b=1.log"));
    }

    #[test]
    fn target_log_appends() {
        let dir = tempfile::tempdir().unwrap();
        create_target_log("http://example.com", dir.path());
        write_target_log("http://example.com", dir.path(), "first\nsecond");
        write_target_log("http://example.com", dir.path(), "third");

        let content = fs::read_to_string(dir.path().join("example.com.log")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("scan of http://example.com"));
        assert!(lines[1].ends_with("first"));
        assert!(lines[3].ends_with("third"));
    }

    #[test]
    fn write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.txt");
        write_to_file(&path, "x").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "x");
    }
}
