//! # 工作流模块
//!
//! 把核心计算与文件系统、外部 ATAT 程序连接起来。
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `sqs/`, `parsers/`, `batch/`
//! - 子模块: sqs_run, phases, volume

pub mod phases;
pub mod sqs_run;
pub mod volume;

pub use sqs_run::{AtatTools, ClusterArgs, SqsRunSettings, SqsRunner};
pub use volume::{scan_composition, write_volume_csv};
