// src/common/banner.rs
use colored::*;

pub fn show() {
    let banner = r#"
    ███████╗██╗███████╗      ██████╗ ███████╗
    ██╔════╝██║██╔════╝      ██╔══██╗██╔════╝
    ███████╗██║█████╗  █████╗██████╔╝███████╗
    ╚════██║██║██╔══╝  ╚════╝██╔══██╗╚════██║
    ███████║██║██║           ██║  ██║███████║
    ╚══════╝╚═╝╚═╝           ╚═╝  ╚═╝╚══════╝
    "#;

    println!("{}", banner.bright_red());
    println!("    {}", "Modular web reconnaissance and framework fingerprinting".bright_yellow());
    println!("    {}", format!("Version: {}", env!("CARGO_PKG_VERSION")).bright_yellow());
    println!();
}
