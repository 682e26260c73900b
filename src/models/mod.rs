//! # 数据模型模块
//!
//! 定义原胞模板、晶格与成分的统一数据结构。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `sqs/`, `workflow/` 和 `commands/` 使用
//! - 子模块: structure, composition

pub mod composition;
pub mod structure;

pub use composition::{Composition, CompositionRequest, CountRange};
pub use structure::{Lattice, LatticeParameters, SiteRecord, SublatticeCounts, UnitCellTemplate};
