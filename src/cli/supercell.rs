//! # supercell 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/supercell.rs`

use super::TemplateArgs;

use clap::Args;

/// supercell 子命令参数
#[derive(Args, Debug)]
pub struct SupercellArgs {
    #[command(flatten)]
    pub template: TemplateArgs,

    /// Target fractions on the mixed sublattice (e.g., '0.75,0.125,0.125')
    #[arg(long, value_delimiter = ',', required = true)]
    pub fractions: Vec<f64>,

    /// Minimum number of mixed sites in the supercell
    #[arg(long)]
    pub min_sites: Option<usize>,

    /// Largest denominator used to rationalise the fractions
    #[arg(long)]
    pub max_denominator: Option<u64>,
}
