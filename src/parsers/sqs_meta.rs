//! # SQS 目录名元数据解析
//!
//! `sqs2tdb -mk` 生成的目录名编码了 SQS 层级与亚晶格成分：
//! ```text
//! sqsdb_lev=1_a=0.5,0.5          # 层级 1，a 亚晶格两组元各 0.5
//! sqs_lev=2_a_Cr=0.75,a_Hf=0.25  # 拟合后的结构目录，带元素名
//! ```
//!
//! ## 依赖关系
//! - 被 `workflow/sqs_run.rs`, `workflow/volume.rs` 使用
//! - 使用 `regex` crate

use crate::error::{BladeError, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

/// `sqsdb_lev=*` 目录信息
#[derive(Debug, Clone, PartialEq)]
pub struct SqsdbFolder {
    pub level: usize,
    pub fractions: Vec<f64>,
}

impl SqsdbFolder {
    /// 单组元目录无需混合
    pub fn is_pure(&self) -> bool {
        self.fractions.len() == 1
    }
}

/// 解析 `sqsdb_lev=<L>_<sub>=<f1>,<f2>,...`
pub fn parse_sqsdb_folder(name: &str) -> Result<SqsdbFolder> {
    let parse_error = |reason: &str| BladeError::ParseError {
        format: "sqsdb folder".to_string(),
        path: name.to_string(),
        reason: reason.to_string(),
    };

    let mut fields = name.split('=');
    if fields.next() != Some("sqsdb_lev") {
        return Err(parse_error("Expected 'sqsdb_lev=' prefix"));
    }

    let level = fields
        .next()
        .and_then(|s| s.split('_').next())
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or_else(|| parse_error("Missing SQS level"))?;

    // 成分取最后一个 '=' 之后的部分
    let comp_str = name.rsplit('=').next().unwrap_or_default();
    let fractions = comp_str
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| parse_error("Invalid fraction list"))?;

    Ok(SqsdbFolder { level, fractions })
}

fn level_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"sqs_lev=(\d+)").expect("valid level regex"))
}

fn fraction_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"a_([A-Za-z]+)=([0-9]*\.?[0-9]+)").expect("valid fraction regex")
    })
}

/// 拟合结构的 SQS 元数据
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqsMeta {
    pub level: Option<usize>,
    /// a 亚晶格上各元素的分数
    pub fractions: BTreeMap<String, f64>,
}

impl SqsMeta {
    /// 以 `El=x;El=y` 形式输出，便于写入 CSV
    pub fn fractions_label(&self) -> String {
        self.fractions
            .iter()
            .map(|(el, x)| format!("{}={}", el, x))
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// 从 POSCAR 的祖先目录中查找第一个含 `sqs_lev=` 的目录名并解析
pub fn parse_sqs_meta(poscar_path: &Path) -> SqsMeta {
    let mut meta = SqsMeta::default();

    for ancestor in poscar_path.ancestors().skip(1) {
        let name = match ancestor.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => continue,
        };
        if !name.contains("sqs_lev=") {
            continue;
        }

        meta.level = level_regex()
            .captures(name)
            .and_then(|c| c[1].parse().ok());

        for cap in fraction_regex().captures_iter(name) {
            if let Ok(x) = cap[2].parse::<f64>() {
                meta.fractions.insert(cap[1].to_string(), x);
            }
        }
        break;
    }

    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_sqsdb_folder() {
        let folder = parse_sqsdb_folder("sqsdb_lev=6_a=0.75,0.125,0.125").unwrap();
        assert_eq!(folder.level, 6);
        assert_eq!(folder.fractions, vec![0.75, 0.125, 0.125]);
        assert!(!folder.is_pure());
    }

    #[test]
    fn test_parse_sqsdb_folder_pure() {
        let folder = parse_sqsdb_folder("sqsdb_lev=0_a=1").unwrap();
        assert_eq!(folder.level, 0);
        assert!(folder.is_pure());
    }

    #[test]
    fn test_parse_sqsdb_folder_rejects_garbage() {
        assert!(parse_sqsdb_folder("rndstr.skel").is_err());
        assert!(parse_sqsdb_folder("sqsdb_lev=x_a=0.5,0.5").is_err());
        assert!(parse_sqsdb_folder("sqsdb_lev=1_a=0.5,half").is_err());
    }

    #[test]
    fn test_parse_sqs_meta_from_ancestors() {
        let path: PathBuf = [
            "CrHf",
            "HEDB1_2",
            "sqs_lev=2_a_Cr=0.75,a_Hf=0.25",
            "relax",
            "POSCAR",
        ]
        .iter()
        .collect();

        let meta = parse_sqs_meta(&path);
        assert_eq!(meta.level, Some(2));
        assert_eq!(meta.fractions.get("Cr"), Some(&0.75));
        assert_eq!(meta.fractions.get("Hf"), Some(&0.25));
        assert_eq!(meta.fractions_label(), "Cr=0.75;Hf=0.25");
    }

    #[test]
    fn test_parse_sqs_meta_absent() {
        let meta = parse_sqs_meta(Path::new("CrHf/HEDB1_2/POSCAR"));
        assert_eq!(meta, SqsMeta::default());
    }
}
