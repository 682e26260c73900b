//! # 成分数据模型
//!
//! 元素池、计数范围、成分请求以及单个成分（元素集合）。
//!
//! ## 依赖关系
//! - 被 `sqs/compositions.rs`, `workflow/phases.rs`, `config.rs` 使用
//! - 使用 `error.rs`

use crate::error::{BladeError, Result};
use serde::Serialize;
use std::fmt;

/// 闭区间计数范围 [min, max]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountRange {
    min: usize,
    max: usize,
}

impl CountRange {
    pub fn new(min: usize, max: usize) -> Result<Self> {
        Self::named("count", min, max)
    }

    /// 同 `new`，错误信息中带上范围名（如 `primary`）
    pub fn named(name: &str, min: usize, max: usize) -> Result<Self> {
        if min > max {
            return Err(BladeError::RequestRange {
                name: name.to_string(),
                min,
                max,
            });
        }
        Ok(CountRange { min, max })
    }

    /// 单值范围 [n, n]
    pub fn exactly(n: usize) -> Self {
        CountRange { min: n, max: n }
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn iter(&self) -> std::ops::RangeInclusive<usize> {
        self.min..=self.max
    }
}

/// 成分枚举请求
#[derive(Debug, Clone)]
pub struct CompositionRequest {
    /// 主元素池（如过渡金属）
    pub primary: Vec<String>,
    /// 次元素池（如稀土）
    pub secondary: Vec<String>,
    /// 最大体系大小（元素个数）
    pub max_size: usize,
    pub primary_range: CountRange,
    pub secondary_range: CountRange,
    /// 是否保留小于 `max_size` 的低阶成分
    pub allow_lower_order: bool,
}

impl CompositionRequest {
    pub fn new(
        primary: Vec<String>,
        secondary: Vec<String>,
        max_size: usize,
        primary_range: CountRange,
        secondary_range: CountRange,
        allow_lower_order: bool,
    ) -> Result<Self> {
        if max_size == 0 {
            return Err(BladeError::InvalidArgument(
                "maximum system size must be at least 1".to_string(),
            ));
        }

        Ok(CompositionRequest {
            primary,
            secondary,
            max_size,
            primary_range,
            secondary_range,
            allow_lower_order,
        })
    }
}

/// 单个成分：排序、无重复的元素符号序列
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Composition(Vec<String>);

impl Composition {
    /// 从元素列表创建；元素重复时返回 `None`
    pub fn from_elements<I, S>(elements: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut elements: Vec<String> = elements.into_iter().map(Into::into).collect();
        elements.sort();

        let before = elements.len();
        elements.dedup();
        if elements.len() != before {
            return None;
        }

        Some(Composition(elements))
    }

    /// 空成分（纯基体晶格）
    pub fn empty() -> Self {
        Composition(Vec::new())
    }

    pub fn elements(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// 元素直接拼接，如 `CrHf`，用作目录名
impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for el in &self.0 {
            write!(f, "{}", el)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_range_rejects_inverted() {
        assert!(CountRange::new(2, 3).is_ok());
        assert!(matches!(
            CountRange::new(3, 2),
            Err(BladeError::RequestRange { min: 3, max: 2, .. })
        ));

        let err = CountRange::named("secondary", 3, 1).unwrap_err();
        assert!(matches!(err, BladeError::RequestRange { ref name, .. } if name == "secondary"));
        assert_eq!(err.to_string(), "Invalid secondary range: min 3 > max 1");
    }

    #[test]
    fn test_request_rejects_zero_size() {
        let result = CompositionRequest::new(
            vec!["Hf".to_string()],
            vec![],
            0,
            CountRange::exactly(1),
            CountRange::exactly(0),
            true,
        );
        assert!(matches!(result, Err(BladeError::InvalidArgument(_))));
    }

    #[test]
    fn test_composition_sorted_and_displayed() {
        let comp = Composition::from_elements(["Mo", "Hf", "Cr"]).unwrap();
        assert_eq!(comp.elements(), ["Cr", "Hf", "Mo"]);
        assert_eq!(comp.to_string(), "CrHfMo");
        assert_eq!(comp.len(), 3);
    }

    #[test]
    fn test_composition_rejects_repeated_element() {
        assert!(Composition::from_elements(["Sc", "Hf", "Sc"]).is_none());
    }

    #[test]
    fn test_composition_ordering_is_lexical() {
        let a = Composition::from_elements(["Cr", "Hf"]).unwrap();
        let b = Composition::from_elements(["Cr", "Hf", "Mo"]).unwrap();
        let c = Composition::from_elements(["Cr", "Mo"]).unwrap();
        assert!(a < b);
        assert!(b < c);
        assert!(Composition::empty() < a);
    }
}
