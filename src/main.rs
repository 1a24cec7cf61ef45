// src/main.rs
mod cli;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use anyhow::{bail, Context};
use clap::Parser;
use colored::*;
use log::{error, info, warn};
use sif_rs::common::{banner, logger, utils};
use sif_rs::modules::builtin::{self, FRAMEWORK_MODULE_ID};
use sif_rs::modules::{registry, Loader, Module, ModuleResult, Options};
use sif_rs::output::{file, report};
use sif_rs::ScanContext;

use crate::cli::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init(args.verbose, args.silent, args.log_file.as_deref())?;
    if !args.silent {
        banner::show();
    }

    // 注册内置模块并加载模块目录
    builtin::register_builtin(registry::global());
    let mut loader = Loader::new();
    if let Some(dir) = &args.module_dir {
        loader.add_dir(dir);
    }
    loader.load_all();

    if args.list_modules {
        list_modules();
        return Ok(());
    }

    let targets = collect_targets(&args)?;
    let modules = select_modules(&args)?;
    info!("Running {} modules against {} targets", modules.len(), targets.len());

    let timeout = Duration::from_secs(args.timeout);
    let opts = Options {
        timeout,
        threads: args.threads,
        log_dir: args.log_dir.clone(),
        http_client: Some(utils::build_client(timeout)?),
    };

    // Ctrl-C 停止派发新请求，已有结果照常输出
    let ctx = ScanContext::new();
    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing in-flight requests");
            interrupt.cancel();
        }
    });

    let start = Instant::now();
    let mut results = Vec::new();

    // 逐个目标顺序扫描
    for target in &targets {
        if ctx.is_cancelled() {
            break;
        }
        info!("Scanning {}", target);
        if let Some(log_dir) = &opts.log_dir {
            file::create_target_log(target, log_dir);
        }

        for module in &modules {
            let id = module.info().id;
            match module.execute(&ctx, target, &opts).await {
                Ok(result) => {
                    print_result(&result);
                    results.push(result);
                },
                Err(e) => warn!("Module {} failed on {}: {}", id, target, e),
            }
        }
    }

    let findings: usize = results.iter().map(|r| r.findings.len()).sum();
    info!("Scan finished in {:.2?}: {} findings", start.elapsed(), findings);

    if let Some(output) = &args.output {
        report::generate(output, &results, args.output_format.as_str())
            .with_context(|| format!("writing report to {}", output.display()))?;
        info!("Report written to {}", output.display());
    }

    Ok(())
}

fn collect_targets(args: &Args) -> anyhow::Result<Vec<String>> {
    let mut targets: Vec<String> = args.target.iter().map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect();
    if let Some(path) = &args.target_file {
        let lines = utils::read_lines_from_file(path)
            .with_context(|| format!("reading targets from {}", path.display()))?;
        targets.extend(lines);
    }

    let mut valid = Vec::new();
    for target in targets {
        if utils::is_http_target(&target) {
            if !valid.contains(&target) {
                valid.push(target);
            }
        } else {
            error!("Target {} must start with http:// or https://", target);
        }
    }

    if valid.is_empty() {
        bail!("no valid targets given (use --target or --target-file)");
    }
    Ok(valid)
}

fn select_modules(args: &Args) -> anyhow::Result<Vec<Arc<dyn Module>>> {
    // 按ID去重并排序，保证执行顺序稳定
    let mut selected: BTreeMap<String, Arc<dyn Module>> = BTreeMap::new();

    if args.framework {
        if let Some(module) = registry::get(FRAMEWORK_MODULE_ID) {
            selected.insert(FRAMEWORK_MODULE_ID.to_string(), module);
        }
    } else if args.all_modules {
        for module in registry::all() {
            selected.insert(module.info().id, module);
        }
    } else {
        for id in &args.modules {
            match registry::get(id) {
                Some(module) => {
                    selected.insert(id.clone(), module);
                },
                None => warn!("Unknown module: {}", id),
            }
        }
        for tag in &args.module_tags {
            for module in registry::by_tag(tag) {
                selected.insert(module.info().id, module);
            }
        }
    }

    if selected.is_empty() {
        bail!("no modules selected (use --modules, --module-tags, --all-modules or --framework)");
    }
    Ok(selected.into_values().collect())
}

fn list_modules() {
    let mut modules: Vec<_> = registry::all().into_iter().map(|m| (m.info(), m.module_type())).collect();
    modules.sort_by(|a, b| a.0.id.cmp(&b.0.id));

    println!("{}", format!("Available modules ({}):", modules.len()).bright_green());
    for (info, module_type) in modules {
        println!(
            "  {:<28} {:<6} {:<36} [{}]",
            info.id.bright_cyan(),
            module_type.as_str(),
            info.name,
            info.tags.join(", ")
        );
    }
}

fn print_result(result: &ModuleResult) {
    for finding in &result.findings {
        let severity = match finding.severity.to_lowercase().as_str() {
            "critical" => finding.severity.bright_red().bold(),
            "high" => finding.severity.red(),
            "medium" => finding.severity.yellow(),
            "low" => finding.severity.blue(),
            _ => finding.severity.normal(),
        };
        println!("[{}] [{}] {}", severity, result.module_id.bright_cyan(), finding.url);

        let mut extracted: Vec<_> = finding.extracted.iter().collect();
        extracted.sort();
        for (key, value) in extracted {
            println!("    {}: {}", key, value);
        }
    }
}
