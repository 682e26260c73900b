//! # 拟合准备：目录、相列表与 TDB 文件名
//!
//! 每个成分对应 `<root>/<成分名>` 目录，相列表为 `<相>_<元素数>`，可附加 `LIQUID`。
//! 拟合产物的 TDB 文件名是大写元素符号任意排列后用 `_` 连接。
//!
//! ## 依赖关系
//! - 被 `commands/fit_plan.rs` 调用
//! - 使用 `models/composition.rs`
//! - 使用 `itertools` 生成排列

use crate::error::{BladeError, Result};
use crate::models::Composition;

use itertools::Itertools;
use std::fs;
use std::path::{Path, PathBuf};

pub const LIQUID_PHASE: &str = "LIQUID";

/// 成分输出目录
pub fn composition_dir(root: &Path, composition: &Composition) -> PathBuf {
    root.join(composition.to_string())
}

/// 相列表，例如 `["HEDB1_3", "HEDB2_3", "LIQUID"]`
pub fn phase_list(phases: &[String], liquid: bool, system_size: usize) -> Vec<String> {
    let mut list: Vec<String> = phases
        .iter()
        .map(|p| format!("{}_{}", p, system_size))
        .collect();
    if liquid {
        list.push(LIQUID_PHASE.to_string());
    }
    list
}

/// 候选 TDB 文件基名（不含扩展名）
pub fn tdb_file_names(composition: &Composition) -> Vec<String> {
    let upper: Vec<String> = composition
        .elements()
        .iter()
        .map(|el| el.to_uppercase())
        .collect();

    upper
        .iter()
        .permutations(upper.len())
        .map(|p| p.into_iter().join("_"))
        .collect()
}

/// 目录中第一个存在的 `<name>.tdb`
pub fn find_tdb(dir: &Path, composition: &Composition) -> Option<PathBuf> {
    tdb_file_names(composition)
        .into_iter()
        .map(|name| dir.join(format!("{}.tdb", name)))
        .find(|p| p.is_file())
}

/// 单个成分的拟合计划
#[derive(Debug, Clone)]
pub struct FitPlan {
    pub composition: Composition,
    pub directory: PathBuf,
    pub phases: Vec<String>,
    pub existing_tdb: Option<PathBuf>,
}

/// 为全部成分生成拟合计划
pub fn plan_fits(
    root: &Path,
    compositions: &[Composition],
    phases: &[String],
    liquid: bool,
) -> Vec<FitPlan> {
    compositions
        .iter()
        .filter(|c| !c.is_empty())
        .map(|comp| {
            let directory = composition_dir(root, comp);
            FitPlan {
                composition: comp.clone(),
                phases: phase_list(phases, liquid, comp.len()),
                existing_tdb: find_tdb(&directory, comp),
                directory,
            }
        })
        .collect()
}

/// 创建计划中的成分目录
pub fn create_fit_dirs(plans: &[FitPlan]) -> Result<()> {
    for plan in plans {
        fs::create_dir_all(&plan.directory).map_err(|e| BladeError::FileWriteError {
            path: plan.directory.display().to_string(),
            source: e,
        })?;
    }
    Ok(())
}
