//! # volume 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/volume.rs`

use clap::Args;
use std::path::PathBuf;

/// volume 子命令参数
#[derive(Args, Debug)]
pub struct VolumeArgs {
    /// Composition directories (each holding phase folders)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output CSV file
    #[arg(short, long, default_value = "volumes.csv")]
    pub output: PathBuf,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,
}
