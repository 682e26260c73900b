//! # BLADE - 合金 SQS / CALPHAD 工作流工具
//!
//! 枚举多主元合金成分，计算 SQS 超胞尺寸，驱动 ATAT 生成 SQS，
//! 并整理拟合目录与弛豫结构体积。
//!
//! ## 子命令
//! - `compositions` - 成分枚举
//! - `supercell`    - SQS 超胞尺寸
//! - `cutoff`       - 近邻壳层与团簇截断半径
//! - `sqs`          - sqs2tdb / corrdump / mcsqs 流程
//! - `fit-plan`     - 拟合目录、相列表与 TDB 文件
//! - `volume`       - POSCAR 体积统计
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── config.rs  (TOML 工作流配置)
//!   │     └── workflow/  (文件系统与外部程序)
//!   │           ├── sqs/      (核心计算)
//!   │           ├── parsers/  (格式解析器)
//!   │           ├── batch/    (并行文件处理)
//!   │           └── models/   (数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod config;
mod error;
mod models;
mod parsers;
mod sqs;
mod utils;
mod workflow;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
