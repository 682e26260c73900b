//! # cutoff 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/cutoff.rs`

use super::TemplateArgs;
use crate::sqs::cutoff::{DEFAULT_PAIR_SHELLS, DEFAULT_SHELL_TOLERANCE, DEFAULT_TRANSLATION_RANGE};

use clap::Args;

/// cutoff 子命令参数
#[derive(Args, Debug)]
pub struct CutoffArgs {
    #[command(flatten)]
    pub template: TemplateArgs,

    /// Number of neighbour shells included in pair clusters
    #[arg(long, default_value_t = DEFAULT_PAIR_SHELLS)]
    pub shells: usize,

    /// Distance tolerance for grouping shells
    #[arg(long, default_value_t = DEFAULT_SHELL_TOLERANCE)]
    pub tolerance: f64,

    /// Periodic images searched along each axis
    #[arg(long, default_value_t = DEFAULT_TRANSLATION_RANGE)]
    pub range: i32,

    /// Number of shells to list
    #[arg(long, default_value_t = 8)]
    pub show: usize,
}
