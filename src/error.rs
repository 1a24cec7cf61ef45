// src/error.rs
use thiserror::Error;
use crate::modules::ModuleType;

/// Errors surfaced by module loading, module execution and framework detection.
///
/// Transport failures of individual probe requests and malformed patterns never
/// reach this type; they are skipped where they happen.
#[derive(Error, Debug)]
pub enum Error {
    /// 模块定义缺少必填字段
    #[error("module missing required field: {0}")]
    MissingField(&'static str),

    /// 声明的类型没有对应的配置块
    #[error("{0} module missing {0} configuration")]
    MissingConfig(ModuleType),

    #[error("invalid module definition: {0}")]
    Invalid(String),

    #[error("parse yaml: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no request could be built for module {0}")]
    NoRequests(String),

    #[error("unsupported module type: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, Error>;
