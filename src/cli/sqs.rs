//! # sqs 子命令 CLI 定义
//!
//! 生成 SQS 输入并运行 ATAT 工具链
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/sqs.rs`

use clap::Args;
use std::path::PathBuf;

/// sqs 子命令参数
#[derive(Args, Debug)]
pub struct SqsArgs {
    /// Workflow TOML file
    #[arg(long)]
    pub config: PathBuf,

    /// System sizes to generate (default: sizes of the enumerated compositions)
    #[arg(long, value_delimiter = ',')]
    pub sizes: Vec<usize>,

    /// Root directory for <phase>_<n> folders
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Highest sqsgen level to include
    #[arg(long)]
    pub level: Option<usize>,

    /// Seconds to run mcsqs before writing stopsqs
    #[arg(long)]
    pub time: Option<u64>,

    /// Derive corrdump cluster cutoffs from neighbour shells
    #[arg(long, default_value_t = false)]
    pub auto_cutoff: bool,

    /// Print the planned jobs without running anything
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}
