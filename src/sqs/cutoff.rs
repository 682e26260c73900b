//! # 近邻壳层与团簇截断半径
//!
//! 在 `[-R, R]^3` 的平移范围内计算所有格点对的距离，按容差归并为近邻壳层，
//! 再取相邻壳层的中点作为 corrdump 的二体 / 三体团簇截断半径。
//!
//! ## 依赖关系
//! - 被 `commands/cutoff.rs`, `workflow/sqs_run.rs` 使用
//! - 使用 `models/structure.rs`
//! - 使用 `itertools` 生成平移向量

use crate::error::{BladeError, Result};
use crate::models::UnitCellTemplate;

use itertools::iproduct;

/// 默认壳层归并容差 (与晶格参数同单位)
pub const DEFAULT_SHELL_TOLERANCE: f64 = 1e-3;
/// 默认平移范围 R
pub const DEFAULT_TRANSLATION_RANGE: i32 = 2;
/// 默认二体团簇包含的壳层数
pub const DEFAULT_PAIR_SHELLS: usize = 3;

/// 团簇截断半径
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterCutoffs {
    pub pair: f64,
    pub triplet: f64,
    pub shells: Vec<f64>,
}

/// 近邻壳层计算器
#[derive(Debug, Clone)]
pub struct ShellFinder<'a> {
    template: &'a UnitCellTemplate,
    tolerance: f64,
    translation_range: i32,
}

impl<'a> ShellFinder<'a> {
    pub fn new(template: &'a UnitCellTemplate) -> Self {
        ShellFinder {
            template,
            tolerance: DEFAULT_SHELL_TOLERANCE,
            translation_range: DEFAULT_TRANSLATION_RANGE,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_translation_range(mut self, range: i32) -> Self {
        self.translation_range = range;
        self
    }

    /// 升序排列的壳层距离
    pub fn shells(&self) -> Vec<f64> {
        let lattice = self.template.lattice();
        let r = self.translation_range;

        let cart: Vec<[f64; 3]> = self
            .template
            .sites
            .iter()
            .map(|s| lattice.frac_to_cart(s.position))
            .collect();

        let mut dists = Vec::new();
        for (i, ri) in cart.iter().enumerate() {
            for (j, site) in self.template.sites.iter().enumerate() {
                for (tx, ty, tz) in iproduct!(-r..=r, -r..=r, -r..=r) {
                    if i == j && (tx, ty, tz) == (0, 0, 0) {
                        continue;
                    }
                    let fj = site.position;
                    let rj = lattice.frac_to_cart([
                        fj[0] + tx as f64,
                        fj[1] + ty as f64,
                        fj[2] + tz as f64,
                    ]);
                    let d = ((rj[0] - ri[0]).powi(2)
                        + (rj[1] - ri[1]).powi(2)
                        + (rj[2] - ri[2]).powi(2))
                    .sqrt();
                    if d > 1e-8 {
                        dists.push(d);
                    }
                }
            }
        }

        dists.sort_by(|a, b| a.total_cmp(b));

        let mut shells: Vec<f64> = Vec::new();
        for d in dists {
            match shells.last() {
                Some(last) if (d - last).abs() <= self.tolerance => {}
                _ => shells.push(d),
            }
        }
        shells
    }

    /// 二体截断取第 `pair_shells` 与下一壳层的中点，三体截断再外推一层
    pub fn cluster_cutoffs(&self, pair_shells: usize) -> Result<ClusterCutoffs> {
        if pair_shells == 0 {
            return Err(BladeError::InvalidArgument(
                "pair shell count must be at least 1".to_string(),
            ));
        }

        let shells = self.shells();
        if shells.len() < pair_shells + 2 {
            return Err(BladeError::InvalidArgument(format!(
                "only {} neighbour shells found, need {}; increase the translation range",
                shells.len(),
                pair_shells + 2
            )));
        }

        Ok(ClusterCutoffs {
            pair: 0.5 * (shells[pair_shells - 1] + shells[pair_shells]),
            triplet: 0.5 * (shells[pair_shells] + shells[pair_shells + 1]),
            shells,
        })
    }
}
