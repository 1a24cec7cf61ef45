// src/lib.rs
pub mod common;
pub mod error;
pub mod modules;
pub mod output;
pub mod webscan;

// 导出公共结构体和函数
pub use common::context::ScanContext;
pub use error::{Error, Result};
pub use modules::{Finding, Info, Module, ModuleResult, ModuleType, Options};
