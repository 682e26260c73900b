//! # SQS 核心计算模块
//!
//! 纯计算，无 I/O：
//! - 成分枚举（组合生成与去重）
//! - 超胞尺寸（有理逼近 + 最小公倍数）
//! - 近邻壳层与团簇截断半径
//!
//! ## 依赖关系
//! - 被 `workflow/` 与 `commands/` 使用
//! - 使用 `models/`
//! - 子模块: compositions, supercell, rational, cutoff

pub mod compositions;
pub mod cutoff;
pub mod rational;
pub mod supercell;

pub use compositions::generate_compositions;
pub use cutoff::{ClusterCutoffs, ShellFinder};
pub use supercell::{SupercellResult, SupercellSizer};
