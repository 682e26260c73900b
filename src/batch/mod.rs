//! # 批量处理模块
//!
//! 文件收集与并行处理。
//!
//! ## 依赖关系
//! - 被 `workflow/volume.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;

pub use collector::FileCollector;
pub use runner::{BatchResult, BatchRunner, ProcessResult};
