//! # ATAT rndstr 格式解析器
//!
//! 解析与生成 ATAT `rndstr.in` / `rndstr.skel` 以及 `sqsgen.in`。
//!
//! ## rndstr 格式说明
//! ```text
//! a b c alpha beta gamma     # 晶格参数
//! 1 0 0                      # 坐标轴 (3 行)
//! 0 1 0
//! 0 0 1
//! x y z label                # 分数坐标 + 亚晶格标签
//! ...
//! ```
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs`, `config.rs`, `workflow/sqs_run.rs` 使用
//! - 使用 `models/structure.rs`

use crate::error::{BladeError, Result};
use crate::models::{LatticeParameters, SiteRecord, UnitCellTemplate};

use itertools::Itertools;
use std::fs;
use std::path::Path;

/// 解析坐标块：每行 `x y z label`，其余列数的行忽略
pub fn parse_sites(block: &str) -> Result<Vec<SiteRecord>> {
    let mut sites = Vec::new();

    for (i, line) in block.lines().enumerate() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 4 {
            continue;
        }

        let coords: Vec<f64> = parts[..3]
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();

        if coords.len() != 3 {
            return Err(BladeError::ParseError {
                format: "rndstr".to_string(),
                path: "coords".to_string(),
                reason: format!("Invalid site coordinates at line {}: '{}'", i + 1, line.trim()),
            });
        }

        sites.push(SiteRecord::new([coords[0], coords[1], coords[2]], parts[3]));
    }

    Ok(sites)
}

/// 解析 rndstr 文件
pub fn parse_rndstr_file(path: &Path) -> Result<UnitCellTemplate> {
    let content = fs::read_to_string(path).map_err(|e| BladeError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_rndstr_content(&content, &path.display().to_string())
}

/// 从字符串内容解析 rndstr 格式
pub fn parse_rndstr_content(content: &str, source_name: &str) -> Result<UnitCellTemplate> {
    let parse_error = |reason: String| BladeError::ParseError {
        format: "rndstr".to_string(),
        path: source_name.to_string(),
        reason,
    };

    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if lines.len() < 4 {
        return Err(parse_error("File too short".to_string()));
    }

    let params: Vec<f64> = lines[0]
        .split_whitespace()
        .filter_map(|s| s.parse().ok())
        .collect();
    if params.len() != 6 {
        return Err(parse_error(
            "First line must hold a b c alpha beta gamma".to_string(),
        ));
    }

    for (i, line) in lines[1..4].iter().enumerate() {
        let axis: Vec<f64> = line
            .split_whitespace()
            .filter_map(|s| s.parse().ok())
            .collect();
        if axis.len() != 3 {
            return Err(parse_error(format!("Invalid axis vector at line {}", i + 2)));
        }
    }

    let sites = parse_sites(&lines[4..].join("\n"))?;

    Ok(UnitCellTemplate::new(
        LatticeParameters::new(params[0], params[1], params[2], params[3], params[4], params[5]),
        sites,
    ))
}

/// 生成 rndstr.skel 内容
pub fn to_rndstr_string(template: &UnitCellTemplate) -> String {
    let mut result = template.parameters.as_array().iter().join(" ");
    result.push_str("\n1 0 0\n0 1 0\n0 0 1\n");

    for site in &template.sites {
        result.push_str(&format!(
            "{:.6} {:.6} {:.6} {}\n",
            site.position[0], site.position[1], site.position[2], site.label
        ));
    }

    result
}

/// 生成 sqsgen.in 内容：包含 0..=level 的所有层级
pub fn sqsgen_text(levels: &[String], level: usize) -> Result<String> {
    if level >= levels.len() {
        return Err(BladeError::InvalidArgument(format!(
            "SQS level {} requested but only {} levels are defined",
            level,
            levels.len()
        )));
    }

    let mut text = String::new();
    for entry in &levels[..=level] {
        text.push_str(entry);
        text.push('\n');
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX_RNDSTR: &str = r#"
1 1 1.63299 90 90 120
1 0 0
0 1 0
0 0 1
0.000000 0.000000 0.000000  a
0.333333 0.666667 0.000000  a
0.166667 0.833333 0.5       B
"#;

    #[test]
    fn test_parse_sites_skips_other_line_shapes() {
        let block = "1 1 1 90 90 90\n0 0 0 a\n\n0.5 0.5 0.5 B\n1 0 0\n";
        let sites = parse_sites(block).unwrap();

        assert_eq!(sites.len(), 2);
        assert_eq!(sites[0].label, "a");
        assert_eq!(sites[1].position, [0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_parse_sites_rejects_bad_coordinates() {
        let result = parse_sites("0.0 x 0.0 a\n");
        assert!(matches!(result, Err(BladeError::ParseError { .. })));
    }

    #[test]
    fn test_parse_rndstr_content() {
        let template = parse_rndstr_content(HEX_RNDSTR, "rndstr.in").unwrap();

        assert!((template.parameters.c - 1.63299).abs() < 1e-12);
        assert!((template.parameters.gamma - 120.0).abs() < 1e-12);
        assert_eq!(template.sites.len(), 3);
        assert_eq!(template.count_sites("a").mixed, 2);
    }

    #[test]
    fn test_parse_rndstr_missing_parameters() {
        let result = parse_rndstr_content("1 1 1\n1 0 0\n0 1 0\n0 0 1\n0 0 0 a\n", "bad");
        assert!(matches!(result, Err(BladeError::ParseError { .. })));
    }

    #[test]
    fn test_rndstr_string_reparses() {
        let template = parse_rndstr_content(HEX_RNDSTR, "rndstr.in").unwrap();
        let text = to_rndstr_string(&template);

        assert!(text.starts_with("1 1 1.63299 90 90 120\n1 0 0\n0 1 0\n0 0 1\n"));
        assert_eq!(parse_rndstr_content(&text, "skel").unwrap(), template);
    }

    #[test]
    fn test_sqsgen_text_levels() {
        let levels = vec![
            "level=0         a=1".to_string(),
            "level=1         a=0.5,0.5".to_string(),
            "level=2         a=0.75,0.25".to_string(),
        ];

        assert_eq!(
            sqsgen_text(&levels, 1).unwrap(),
            "level=0         a=1\nlevel=1         a=0.5,0.5\n"
        );
        assert!(sqsgen_text(&levels, 3).is_err());
    }
}
