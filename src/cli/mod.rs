//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `compositions`: 成分枚举
//! - `supercell`: SQS 超胞尺寸
//! - `cutoff`: 近邻壳层与团簇截断半径
//! - `sqs`: 运行 sqs2tdb / corrdump / mcsqs 流程
//! - `fit-plan`: 拟合目录与相列表
//! - `volume`: POSCAR 体积统计
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: compositions, supercell, cutoff, sqs, fit_plan, volume

pub mod compositions;
pub mod cutoff;
pub mod fit_plan;
pub mod sqs;
pub mod supercell;
pub mod volume;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// BLADE - 合金 SQS / CALPHAD 工作流工具
#[derive(Parser)]
#[command(name = "blade")]
#[command(author = "BLADE Developers")]
#[command(version)]
#[command(about = "Composition enumeration and SQS workflow driver for alloy CALPHAD studies", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Enumerate element combinations from primary/secondary pools
    Compositions(compositions::CompositionsArgs),

    /// Size an SQS supercell for target sublattice fractions
    Supercell(supercell::SupercellArgs),

    /// Print neighbour shells and corrdump cluster cutoffs
    Cutoff(cutoff::CutoffArgs),

    /// Generate SQS structures with sqs2tdb, corrdump and mcsqs
    Sqs(sqs::SqsArgs),

    /// Plan per-composition fitting directories and phase lists
    FitPlan(fit_plan::FitPlanArgs),

    /// Collect volumes and cell parameters of relaxed POSCARs into CSV
    Volume(volume::VolumeArgs),
}

/// 原胞模板来源：rndstr 文件或配置文件中的 `[prototype]`
#[derive(Args, Debug)]
pub struct TemplateArgs {
    /// rndstr.in / rndstr.skel file describing the unit cell
    #[arg(long, conflicts_with = "config")]
    pub template: Option<PathBuf>,

    /// Workflow TOML file providing the [prototype] table
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Sublattice label of the mixed sites (default: from config, else 'a')
    #[arg(long)]
    pub label: Option<String>,
}
