//! # compositions 子命令 CLI 定义
//!
//! 从主 / 次元素池枚举成分
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/compositions.rs`

use crate::models::CountRange;

use clap::Args;
use std::path::PathBuf;

/// compositions 子命令参数
#[derive(Args, Debug)]
pub struct CompositionsArgs {
    /// Workflow TOML file providing the [elements] table
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Primary element pool (e.g., 'Hf,Mo,Cr')
    #[arg(long, value_delimiter = ',')]
    pub primary: Vec<String>,

    /// Secondary element pool (e.g., 'Y,La')
    #[arg(long, value_delimiter = ',')]
    pub secondary: Vec<String>,

    /// Maximum number of elements per composition
    #[arg(long)]
    pub size: Option<usize>,

    /// Count range drawn from the primary pool (e.g., '2-3' or '2')
    #[arg(long, value_parser = parse_primary_range)]
    pub primary_range: Option<CountRange>,

    /// Count range drawn from the secondary pool
    #[arg(long, value_parser = parse_secondary_range)]
    pub secondary_range: Option<CountRange>,

    /// Keep only compositions of exactly --size elements
    #[arg(long, default_value_t = false)]
    pub no_lower_order: bool,

    /// Write the compositions to a CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

fn parse_primary_range(s: &str) -> Result<CountRange, String> {
    parse_count_range("primary", s)
}

fn parse_secondary_range(s: &str) -> Result<CountRange, String> {
    parse_count_range("secondary", s)
}

/// 解析 `min-max` 或单个数字
pub fn parse_count_range(name: &str, s: &str) -> Result<CountRange, String> {
    let parse = |v: &str| {
        v.trim()
            .parse::<usize>()
            .map_err(|_| format!("invalid count '{}'", v.trim()))
    };

    match s.split_once('-') {
        Some((min, max)) => CountRange::named(name, parse(min)?, parse(max)?).map_err(|e| e.to_string()),
        None => Ok(CountRange::exactly(parse(s)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count_range() {
        assert_eq!(
            parse_count_range("primary", "2-3").unwrap(),
            CountRange::new(2, 3).unwrap()
        );
        assert_eq!(parse_count_range("primary", " 2 ").unwrap(), CountRange::exactly(2));
        assert!(parse_count_range("primary", "a-2").is_err());

        let err = parse_count_range("secondary", "3-2").unwrap_err();
        assert!(err.contains("secondary range"));
    }
}
