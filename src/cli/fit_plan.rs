//! # fit-plan 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/fit_plan.rs`

use clap::Args;
use std::path::PathBuf;

/// fit-plan 子命令参数
#[derive(Args, Debug)]
pub struct FitPlanArgs {
    /// Workflow TOML file
    #[arg(long)]
    pub config: PathBuf,

    /// Root directory for per-composition folders
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Base phase names (default: [fit].phases, else the prototype name)
    #[arg(long, value_delimiter = ',')]
    pub phases: Vec<String>,

    /// Include the LIQUID phase
    #[arg(long, default_value_t = false)]
    pub liquid: bool,

    /// Create the composition folders
    #[arg(long, default_value_t = false)]
    pub mkdir: bool,
}
