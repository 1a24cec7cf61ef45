// src/output/mod.rs
pub mod file;
pub mod report;
