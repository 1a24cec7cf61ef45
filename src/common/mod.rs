// src/common/mod.rs
pub mod banner;
pub mod context;
pub mod logger;
pub mod pool;
pub mod utils;
