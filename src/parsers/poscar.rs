//! # VASP POSCAR 头部解析器
//!
//! 只读取晶格与各元素原子数，不解析原子坐标。
//!
//! ## POSCAR 格式说明
//! ```text
//! Comment line (structure name)
//! 1.0                    # scaling factor
//! a1 a2 a3               # lattice vector a
//! b1 b2 b3               # lattice vector b
//! c1 c2 c3               # lattice vector c
//! Element1 Element2 ...  # element symbols (VASP 5+, optional)
//! n1 n2 ...              # number of atoms per element
//! ...
//! ```
//!
//! ## 依赖关系
//! - 被 `workflow/volume.rs` 使用
//! - 使用 `models/structure.rs`

use crate::error::{BladeError, Result};
use crate::models::Lattice;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// POSCAR 头部信息
#[derive(Debug, Clone)]
pub struct PoscarHeader {
    pub lattice: Lattice,
    /// 元素符号（VASP 4 格式时为空）
    pub elements: Vec<String>,
    pub counts: Vec<usize>,
}

impl PoscarHeader {
    pub fn natoms(&self) -> usize {
        self.counts.iter().sum()
    }

    /// 元素 -> 原子数
    pub fn counts_by_element(&self) -> BTreeMap<String, usize> {
        self.elements
            .iter()
            .cloned()
            .zip(self.counts.iter().copied())
            .collect()
    }
}

/// 解析 POSCAR/CONTCAR 文件
pub fn parse_poscar_file(path: &Path) -> Result<PoscarHeader> {
    let content = fs::read_to_string(path).map_err(|e| BladeError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_poscar_content(&content, &path.display().to_string())
}

/// 从字符串内容解析 POSCAR 头部
pub fn parse_poscar_content(content: &str, source_name: &str) -> Result<PoscarHeader> {
    let parse_error = |reason: String| BladeError::ParseError {
        format: "poscar".to_string(),
        path: source_name.to_string(),
        reason,
    };

    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if lines.len() < 6 {
        return Err(parse_error("File too short".to_string()));
    }

    // Line 1: Scaling factor
    let scale: f64 = lines[1]
        .split_whitespace()
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| parse_error("Invalid scaling factor".to_string()))?;

    // Lines 2-4: Lattice vectors
    let mut matrix = [[0.0; 3]; 3];
    for (i, row) in matrix.iter_mut().enumerate() {
        let parts: Vec<f64> = lines[2 + i]
            .split_whitespace()
            .filter_map(|s| s.parse().ok())
            .collect();
        if parts.len() < 3 {
            return Err(parse_error(format!("Invalid lattice vector at line {}", 3 + i)));
        }
        *row = [parts[0] * scale, parts[1] * scale, parts[2] * scale];
    }

    // Line 5: Element symbols (VASP 5+) or atom counts (VASP 4)
    let line5: Vec<&str> = lines[5].split_whitespace().collect();
    let (elements, counts_line) = if line5.iter().all(|s| s.parse::<usize>().is_ok()) {
        (Vec::new(), lines[5])
    } else {
        let counts_line = lines
            .get(6)
            .ok_or_else(|| parse_error("Missing atom counts line".to_string()))?;
        (line5.iter().map(|s| s.to_string()).collect(), *counts_line)
    };

    let counts = counts_line
        .split_whitespace()
        .map(|s| s.parse::<usize>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| parse_error(format!("Invalid atom counts: '{}'", counts_line)))?;

    if !elements.is_empty() && elements.len() != counts.len() {
        return Err(parse_error(format!(
            "{} element symbols but {} counts",
            elements.len(),
            counts.len()
        )));
    }

    Ok(PoscarHeader {
        lattice: Lattice::from_vectors(matrix),
        elements,
        counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_poscar_vasp5() {
        let content = r#"HfB2 SQS
1.0
  3.0 0.0 0.0
  0.0 3.0 0.0
  0.0 0.0 3.5
  Cr Hf B
  1 3 8
Direct
  0.0 0.0 0.0
"#;
        let header = parse_poscar_content(content, "POSCAR").unwrap();

        assert_eq!(header.natoms(), 12);
        assert_eq!(header.counts_by_element().get("Hf"), Some(&3));
        assert!((header.lattice.volume() - 31.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_poscar_vasp4_counts_only() {
        let content = "sqs\n2.0\n1 0 0\n0 1 0\n0 0 1\n48 7 49\nDirect\n";
        let header = parse_poscar_content(content, "POSCAR").unwrap();

        assert!(header.elements.is_empty());
        assert_eq!(header.counts, vec![48, 7, 49]);
        assert!((header.lattice.volume() - 8.0).abs() < 1e-9);
        assert!(header.counts_by_element().is_empty());
    }

    #[test]
    fn test_parse_poscar_too_short() {
        let result = parse_poscar_content("name\n1.0\n1 0 0\n", "POSCAR");
        assert!(matches!(result, Err(BladeError::ParseError { .. })));
    }

    #[test]
    fn test_parse_poscar_mismatched_counts() {
        let content = "x\n1.0\n1 0 0\n0 1 0\n0 0 1\nCr Hf\n4\n";
        assert!(parse_poscar_content(content, "POSCAR").is_err());
    }
}
