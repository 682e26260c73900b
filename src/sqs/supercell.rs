//! # SQS 超胞尺寸计算
//!
//! 给定原胞模板与混合亚晶格上的目标成分分数，求出 mcsqs 所需的总原子数
//! 以及混合亚晶格上每个组元的整数原子数。
//!
//! ## 算法
//! 1. 分数 -> 分母不超过 `max_denominator` 的有理数
//! 2. `n0 = lcm(混合格点数, lcm(全部分母))`
//! 3. `n0 < min_mixed_sites` 时乘以 `ceil(min_mixed_sites / n0)`
//! 4. `k = n_mixed / 混合格点数`，`n_total = k * 原胞格点数`
//! 5. `counts[i] = floor(n_mixed * f_i)`，余数全部加给第一个组元
//!
//! ## 依赖关系
//! - 被 `workflow/sqs_run.rs`, `commands/supercell.rs` 使用
//! - 使用 `sqs/rational.rs`, `models/structure.rs`
//! - 使用 `num-integer` 求最小公倍数

use crate::error::{BladeError, Result};
use crate::models::{SublatticeCounts, UnitCellTemplate};
use crate::sqs::rational::{Rational, MAX_DENOMINATOR};

use num_integer::Integer;

/// 默认混合亚晶格标签
pub const DEFAULT_MIXED_LABEL: &str = "a";
/// 默认最少混合格点数
pub const DEFAULT_MIN_MIXED_SITES: usize = 16;
/// 默认分母上限
pub const DEFAULT_MAX_DENOMINATOR: u64 = 96;

/// 分数之和与 1 的允许偏差
const FRACTION_SUM_TOLERANCE: f64 = 1e-3;

/// 超胞计算结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupercellResult {
    /// 两个亚晶格的总原子数
    pub total_atoms: usize,
    /// 超胞中混合亚晶格格点数
    pub mixed_sites: usize,
    /// 原胞复制倍数
    pub replication: usize,
    /// 混合亚晶格上各组元原子数，与输入分数一一对应
    pub counts: Vec<usize>,
    /// 输入分数的有理逼近
    pub fractions: Vec<Rational>,
}

/// 超胞尺寸计算器
#[derive(Debug, Clone)]
pub struct SupercellSizer<'a> {
    template: &'a UnitCellTemplate,
    mixed_label: String,
    min_mixed_sites: usize,
    max_denominator: u64,
}

impl<'a> SupercellSizer<'a> {
    pub fn new(template: &'a UnitCellTemplate) -> Self {
        SupercellSizer {
            template,
            mixed_label: DEFAULT_MIXED_LABEL.to_string(),
            min_mixed_sites: DEFAULT_MIN_MIXED_SITES,
            max_denominator: DEFAULT_MAX_DENOMINATOR,
        }
    }

    pub fn with_mixed_label(mut self, label: impl Into<String>) -> Self {
        self.mixed_label = label.into();
        self
    }

    pub fn with_min_mixed_sites(mut self, min_mixed_sites: usize) -> Self {
        self.min_mixed_sites = min_mixed_sites;
        self
    }

    pub fn with_max_denominator(mut self, max_denominator: u64) -> Self {
        self.max_denominator = max_denominator;
        self
    }

    pub fn site_counts(&self) -> SublatticeCounts {
        self.template.count_sites(&self.mixed_label)
    }

    /// 计算超胞尺寸与各组元原子数
    pub fn supercell_size(&self, fractions: &[f64]) -> Result<SupercellResult> {
        let fracs = rationalize(fractions, self.max_denominator)?;

        let sites = self.site_counts();
        if sites.mixed == 0 {
            return Err(BladeError::EmptyLattice {
                label: self.mixed_label.clone(),
            });
        }

        let too_large = || BladeError::InvalidFraction {
            fractions: fractions.to_vec(),
            reason: format!(
                "supercell exceeds the representable size (max denominator {})",
                self.max_denominator
            ),
        };

        let denom_lcm = fracs
            .iter()
            .try_fold(1u64, |acc, f| checked_lcm(acc, f.denom()))
            .ok_or_else(too_large)?;

        let n0 = checked_lcm(sites.mixed as u64, denom_lcm).ok_or_else(too_large)?;
        let n_mixed = if n0 < self.min_mixed_sites as u64 {
            n0.checked_mul((self.min_mixed_sites as u64).div_ceil(n0))
                .ok_or_else(too_large)?
        } else {
            n0
        };

        let replication = n_mixed / sites.mixed as u64;
        let total_atoms = replication
            .checked_mul(sites.total() as u64)
            .ok_or_else(too_large)?;
        let n_mixed_signed = i64::try_from(n_mixed).map_err(|_| too_large())?;

        let mut counts = fracs
            .iter()
            .map(|f| i64::try_from(f.floor_mul(n_mixed)).map_err(|_| too_large()))
            .collect::<Result<Vec<i64>>>()?;
        let assigned: i64 = counts.iter().sum();
        counts[0] += n_mixed_signed - assigned;

        if counts[0] < 0 {
            return Err(BladeError::InvalidFraction {
                fractions: fractions.to_vec(),
                reason: format!(
                    "rounded fractions exceed {} sites on sublattice '{}'",
                    n_mixed, self.mixed_label
                ),
            });
        }

        Ok(SupercellResult {
            total_atoms: usize::try_from(total_atoms).map_err(|_| too_large())?,
            mixed_sites: usize::try_from(n_mixed).map_err(|_| too_large())?,
            replication: usize::try_from(replication).map_err(|_| too_large())?,
            counts: counts.into_iter().map(|c| c as usize).collect(),
            fractions: fracs,
        })
    }
}

/// `lcm(a, b)`，溢出 u64 时返回 `None`
fn checked_lcm(a: u64, b: u64) -> Option<u64> {
    if a == 0 || b == 0 {
        return Some(0);
    }
    (a / a.gcd(&b)).checked_mul(b)
}

/// 校验分数并转换为有理数
fn rationalize(fractions: &[f64], max_denominator: u64) -> Result<Vec<Rational>> {
    let invalid = |reason: String| BladeError::InvalidFraction {
        fractions: fractions.to_vec(),
        reason,
    };

    if fractions.is_empty() {
        return Err(invalid("no fractions given".to_string()));
    }
    if max_denominator == 0 || max_denominator > MAX_DENOMINATOR {
        return Err(invalid(format!(
            "max denominator must be in 1..={}, got {}",
            MAX_DENOMINATOR, max_denominator
        )));
    }
    if let Some(f) = fractions
        .iter()
        .find(|f| !f.is_finite() || **f < 0.0 || **f > 1.0)
    {
        return Err(invalid(format!("{} is outside [0, 1]", f)));
    }

    let sum: f64 = fractions.iter().sum();
    if (sum - 1.0).abs() > FRACTION_SUM_TOLERANCE {
        return Err(invalid(format!("fractions sum to {}", sum)));
    }

    Ok(fractions
        .iter()
        .map(|&f| Rational::limit_denominator(f, max_denominator))
        .collect())
}
