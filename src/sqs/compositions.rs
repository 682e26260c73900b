//! # 成分枚举
//!
//! 在主元素池与次元素池之间生成全部满足计数范围与体系大小约束的元素组合。
//!
//! ## 枚举规则
//! - 主元素计数 `i`：`i == 0` 时直接收集次元素组合（`j == 0` 为空成分），
//!   否则收集主元素的 `i` 组合
//! - 次元素计数 `j`：`j == 0` 时并入纯主元素组合，否则收集次元素的 `j` 组合
//! - 主、次组合两两拼接
//! - 超过最大体系大小的组合被丢弃，元素重复的拼接同样丢弃
//!
//! ## 依赖关系
//! - 被 `commands/compositions.rs`, `workflow/` 使用
//! - 使用 `models/composition.rs`
//! - 使用 `itertools` 生成组合

use crate::models::{Composition, CompositionRequest};

use itertools::Itertools;
use std::collections::BTreeSet;

/// 成分枚举结果
#[derive(Debug, Clone)]
pub struct CompositionSet {
    /// 去重并排序后的成分
    compositions: Vec<Composition>,
    /// 去重前的组合数
    generated: usize,
}

impl CompositionSet {
    pub fn compositions(&self) -> &[Composition] {
        &self.compositions
    }

    pub fn into_compositions(self) -> Vec<Composition> {
        self.compositions
    }

    /// 去重前生成的组合数
    pub fn generated(&self) -> usize {
        self.generated
    }

    pub fn len(&self) -> usize {
        self.compositions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compositions.is_empty()
    }

    /// 出现过的体系大小
    pub fn unique_system_sizes(&self) -> BTreeSet<usize> {
        get_systems(&self.compositions)
    }
}

fn combinations_of(pool: &[String], k: usize) -> impl Iterator<Item = Vec<String>> + '_ {
    pool.iter().cloned().combinations(k)
}

/// 枚举全部成分
pub fn generate_compositions(request: &CompositionRequest) -> CompositionSet {
    let mut primary_combos: Vec<Vec<String>> = Vec::new();
    let mut secondary_combos: Vec<Vec<String>> = Vec::new();
    let mut combined: Vec<Vec<String>> = Vec::new();
    let mut compositions: Vec<Composition> = Vec::new();

    for i in request.primary_range.iter() {
        if i == 0 {
            for j in request.secondary_range.iter() {
                if j == 0 {
                    compositions.push(Composition::empty());
                } else {
                    combined.extend(combinations_of(&request.secondary, j));
                }
            }
        } else {
            primary_combos.extend(combinations_of(&request.primary, i));
        }
    }

    for j in request.secondary_range.iter() {
        if j == 0 {
            combined.extend(primary_combos.iter().cloned());
        } else {
            secondary_combos.extend(combinations_of(&request.secondary, j));
        }
    }

    combined.extend(
        primary_combos
            .iter()
            .cartesian_product(secondary_combos.iter())
            .map(|(p, s)| p.iter().chain(s.iter()).cloned().collect()),
    );

    compositions.extend(
        combined
            .into_iter()
            .filter(|c| c.len() <= request.max_size)
            .filter_map(Composition::from_elements),
    );

    if !request.allow_lower_order {
        compositions.retain(|c| c.len() == request.max_size);
    }

    compositions.sort();
    let generated = compositions.len();
    compositions.dedup();

    CompositionSet {
        compositions,
        generated,
    }
}

/// 统计成分中出现的体系大小（元素个数）
pub fn get_systems(compositions: &[Composition]) -> BTreeSet<usize> {
    compositions.iter().map(Composition::len).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CountRange;

    fn pool(elements: &[&str]) -> Vec<String> {
        elements.iter().map(|s| s.to_string()).collect()
    }

    fn request(
        primary: &[&str],
        secondary: &[&str],
        max_size: usize,
        primary_range: (usize, usize),
        secondary_range: (usize, usize),
        allow_lower_order: bool,
    ) -> CompositionRequest {
        CompositionRequest::new(
            pool(primary),
            pool(secondary),
            max_size,
            CountRange::new(primary_range.0, primary_range.1).unwrap(),
            CountRange::new(secondary_range.0, secondary_range.1).unwrap(),
            allow_lower_order,
        )
        .unwrap()
    }

    fn names(set: &CompositionSet) -> Vec<String> {
        set.compositions().iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_binary_transition_metals() {
        let req = request(&["Hf", "Mo", "Cr"], &[], 2, (2, 2), (0, 0), true);
        let set = generate_compositions(&req);

        let expected: Vec<Vec<&str>> = vec![vec!["Cr", "Hf"], vec!["Cr", "Mo"], vec!["Hf", "Mo"]];
        let actual: Vec<&[String]> = set.compositions().iter().map(|c| c.elements()).collect();
        assert_eq!(actual, expected);
        assert_eq!(set.unique_system_sizes(), BTreeSet::from([2]));
    }

    #[test]
    fn test_mixed_pools() {
        let req = request(&["Hf", "Zr"], &["Y", "La"], 3, (1, 2), (0, 1), true);
        let set = generate_compositions(&req);

        assert_eq!(
            names(&set),
            vec!["Hf", "HfLa", "HfLaZr", "HfY", "HfYZr", "HfZr", "LaZr", "YZr", "Zr"]
        );
        assert_eq!(set.unique_system_sizes(), BTreeSet::from([1, 2, 3]));
    }

    #[test]
    fn test_primary_zero_includes_secondary_only() {
        let req = request(&["Hf"], &["Y", "La"], 2, (0, 1), (0, 1), true);
        let set = generate_compositions(&req);

        // 空成分、纯次元素、纯主元素以及主次拼接
        assert_eq!(names(&set), vec!["", "Hf", "HfLa", "HfY", "La", "Y"]);
        assert!(set.compositions()[0].is_empty());
    }

    #[test]
    fn test_both_ranges_zero_yields_empty_composition() {
        let req = request(&["Hf"], &["Y"], 2, (0, 0), (0, 0), true);
        let set = generate_compositions(&req);

        assert_eq!(set.len(), 1);
        assert!(set.compositions()[0].is_empty());
        assert_eq!(set.unique_system_sizes(), BTreeSet::from([0]));

        let req = request(&["Hf"], &["Y"], 2, (0, 0), (0, 0), false);
        assert!(generate_compositions(&req).is_empty());
    }

    #[test]
    fn test_oversized_combinations_dropped() {
        let req = request(&["Hf", "Mo", "Cr"], &["Y"], 2, (1, 3), (0, 1), true);
        let set = generate_compositions(&req);

        assert!(set.compositions().iter().all(|c| c.len() <= 2));
        assert!(names(&set).contains(&"HfY".to_string()));
        assert!(!names(&set).contains(&"CrHfMo".to_string()));
    }

    #[test]
    fn test_lower_order_filter() {
        let req = request(&["Hf", "Mo", "Cr"], &["Y"], 3, (1, 3), (0, 1), false);
        let set = generate_compositions(&req);

        assert!(set.compositions().iter().all(|c| c.len() == 3));
        assert_eq!(names(&set), vec!["CrHfMo", "CrHfY", "CrMoY", "HfMoY"]);
        assert_eq!(set.unique_system_sizes(), BTreeSet::from([3]));
    }

    #[test]
    fn test_overlapping_pools_deduplicated() {
        // Sc 同时出现在两个元素池
        let req = request(&["Hf", "Sc"], &["Sc", "Y"], 2, (1, 1), (0, 1), true);
        let set = generate_compositions(&req);

        assert_eq!(names(&set), vec!["Hf", "HfSc", "HfY", "Sc", "ScY"]);
        // Sc+Sc 被丢弃；Hf+Sc 由主次拼接产生一次
        assert_eq!(set.generated(), set.len());

        let req = request(&["Hf", "Sc"], &["Hf", "Sc"], 2, (0, 2), (0, 2), true);
        let set = generate_compositions(&req);
        assert!(set.generated() > set.len());
        let unique: BTreeSet<_> = set.compositions().iter().collect();
        assert_eq!(unique.len(), set.len());
    }

    #[test]
    fn test_get_systems() {
        let comps = vec![
            Composition::from_elements(["Cr", "Hf"]).unwrap(),
            Composition::from_elements(["Cr", "Hf", "Mo"]).unwrap(),
            Composition::from_elements(["Hf", "Mo"]).unwrap(),
        ];
        assert_eq!(get_systems(&comps), BTreeSet::from([2, 3]));
        assert_eq!(get_systems(&comps[..1]), BTreeSet::from([2]));
        assert!(get_systems(&[]).is_empty());
    }
}
