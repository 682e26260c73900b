//! # 解析器模块
//!
//! 提供 ATAT 输入、SQS 目录名和 POSCAR 头部的解析器。
//!
//! ## 依赖关系
//! - 被 `sqs/`, `workflow/`, `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: rndstr, sqs_meta, poscar

pub mod poscar;
pub mod rndstr;
pub mod sqs_meta;
