// src/modules/script.rs
use std::process::Stdio;
use log::debug;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::timeout;
use crate::common::context::ScanContext;
use crate::error::{Error, Result};
use crate::modules::definition::{ModuleConfig, ModuleDefinition};
use crate::modules::executor::substitute_variables;
use crate::modules::matcher::{Evidence, MAX_BODY_SIZE};
use crate::modules::network::evaluate;
use crate::modules::{ModuleResult, ModuleType, Options};

/// Runs the module's command against the target. The exit code is matched as
/// the status and stdout as the body.
pub async fn execute_script_module(
    ctx: &ScanContext,
    target: &str,
    def: &ModuleDefinition,
    opts: &Options,
) -> Result<ModuleResult> {
    let ModuleConfig::Script(cfg) = &def.config else {
        return Err(Error::MissingConfig(ModuleType::Script));
    };
    let mut result = ModuleResult::new(def.id.as_str(), target);

    let base_url = target.trim_end_matches('/');
    let argv: Vec<String> = cfg
        .command
        .iter()
        .map(|arg| substitute_variables(arg, base_url, ""))
        .collect();
    let Some((program, args)) = argv.split_first() else {
        return Err(Error::NoRequests(def.id.clone()));
    };

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let output = tokio::select! {
        _ = ctx.cancelled() => return Ok(result),
        res = timeout(opts.timeout, run_capped(&mut command)) => res,
    };
    let (status, stdout) = match output {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            debug!("[{}] failed to run {}: {}", def.id, program, e);
            return Ok(result);
        },
        Err(_) => {
            debug!("[{}] {} timed out", def.id, program);
            return Ok(result);
        },
    };

    let evidence = Evidence::new(status, String::new(), String::from_utf8_lossy(&stdout).into_owned());

    if let Some(finding) = evaluate(def, base_url.to_string(), &cfg.matchers, &cfg.extractors, &evidence) {
        result.findings.push(finding);
    }
    Ok(result)
}

// 只读取上限以内的stdout，超出部分随管道关闭丢弃
async fn run_capped(command: &mut Command) -> std::io::Result<(Option<u16>, Vec<u8>)> {
    let mut child = command.spawn()?;
    let mut stdout = Vec::new();
    if let Some(pipe) = child.stdout.take() {
        pipe.take(MAX_BODY_SIZE as u64).read_to_end(&mut stdout).await?;
    }
    let status = child.wait().await?;

    // 被信号终止的进程没有退出码
    Ok((status.code().and_then(|code| u16::try_from(code).ok()), stdout))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn script_module(command: &[&str], matchers: &str) -> ModuleDefinition {
        let yaml = format!(
            "id: script-check\ntype: script\nscript:\n  command: {:?}\n  matchers:\n{}",
            command, matchers
        );
        ModuleDefinition::parse(&yaml).unwrap()
    }

    #[tokio::test]
    async fn stdout_and_exit_code_are_matched() {
        let def = script_module(
            &["sh", "-c", "echo checked {{Hostname}}"],
            "    - type: status\n      status: [0]\n    - type: word\n      words: [\"checked example.com:8080\"]\n",
        );
        let res = execute_script_module(&ScanContext::new(), "http://example.com:8080/", &def, &Options::default())
            .await
            .unwrap();

        assert_eq!(res.findings.len(), 1);
        assert_eq!(res.findings[0].url, "http://example.com:8080");
        assert_eq!(res.findings[0].severity, "info");
    }

    #[tokio::test]
    async fn non_zero_exit_fails_status_matcher() {
        let def = script_module(&["sh", "-c", "exit 3"], "    - type: status\n      status: [0]\n");
        let res = execute_script_module(&ScanContext::new(), "http://example.com", &def, &Options::default())
            .await
            .unwrap();
        assert!(res.findings.is_empty());
    }

    #[tokio::test]
    async fn missing_program_yields_no_findings() {
        let def = script_module(&["/nonexistent/sif-missing"], "    - type: status\n      status: [0]\n");
        let res = execute_script_module(&ScanContext::new(), "http://example.com", &def, &Options::default())
            .await
            .unwrap();
        assert!(res.findings.is_empty());
    }

    #[tokio::test]
    async fn stdout_is_capped() {
        let yaml = r#"
id: noisy
type: script
script:
  command: ["sh", "-c", "head -c 6000000 /dev/zero | tr -c a a"]
  matchers:
    - type: word
      part: body
      words: ["aaaa"]
  extractors:
    - type: regex
      name: output
      part: body
      regex: ["a+"]
"#;
        let def = ModuleDefinition::parse(yaml).unwrap();
        let opts = Options {
            timeout: std::time::Duration::from_secs(30),
            ..Default::default()
        };
        let res = execute_script_module(&ScanContext::new(), "http://example.com", &def, &opts)
            .await
            .unwrap();

        assert_eq!(res.findings.len(), 1);
        assert_eq!(res.findings[0].extracted["output"].len(), MAX_BODY_SIZE);
    }
}
