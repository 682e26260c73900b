//! # 文件收集器
//!
//! 在目录树中按文件名模式收集待处理文件，结果按路径排序。
//!
//! ## 依赖关系
//! - 被 `workflow/volume.rs` 调用
//! - 使用 `walkdir` 遍历目录
//! - 使用 `glob::Pattern` 匹配文件名

use crate::error::{BladeError, Result};

use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 文件收集器
pub struct FileCollector {
    /// 输入路径
    input: PathBuf,
    /// 匹配模式列表
    patterns: Vec<Pattern>,
    /// 是否递归
    recursive: bool,
}

impl FileCollector {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            patterns: Vec::new(),
            recursive: false,
        }
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        self.patterns = pattern
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                Pattern::new(s).map_err(|e| {
                    BladeError::InvalidArgument(format!("Invalid pattern '{}': {}", s, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self)
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有匹配的文件
    pub fn collect(&self) -> Vec<PathBuf> {
        if self.input.is_file() {
            return vec![self.input.clone()];
        }

        if !self.input.is_dir() {
            return vec![];
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let mut files: Vec<PathBuf> = WalkDir::new(&self.input)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|entry| self.matches_patterns(entry.path()))
            .map(|e| e.path().to_path_buf())
            .collect();

        files.sort();
        files
    }

    /// 无模式时匹配全部文件
    fn matches_patterns(&self, path: &Path) -> bool {
        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };

        self.patterns.is_empty() || self.patterns.iter().any(|p| p.matches(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_collect_recursive_poscars() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("sqs_lev=1_a_Cr=0.5,a_Hf=0.5").join("relax");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("POSCAR"), "").unwrap();
        fs::write(nested.join("POSCAR"), "").unwrap();
        fs::write(nested.join("OUTCAR"), "").unwrap();

        let flat = FileCollector::new(dir.path())
            .with_pattern("POSCAR")
            .unwrap()
            .collect();
        assert_eq!(flat.len(), 1);

        let deep = FileCollector::new(dir.path())
            .with_pattern("POSCAR")
            .unwrap()
            .recursive(true)
            .collect();
        assert_eq!(deep.len(), 2);
        assert!(deep.iter().all(|p| p.ends_with("POSCAR")));

        let all = FileCollector::new(dir.path()).recursive(true).collect();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_pattern_list() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["POSCAR", "CONTCAR", "POSCAR_001", "notes.txt"] {
            fs::write(dir.path().join(name), "").unwrap();
        }

        let files = FileCollector::new(dir.path())
            .with_pattern("POSCAR*, CONTCAR")
            .unwrap()
            .collect();
        assert_eq!(files.len(), 3);

        assert!(FileCollector::new(dir.path()).with_pattern("[").is_err());
    }

    #[test]
    fn test_missing_input() {
        assert!(FileCollector::new("/nonexistent/dir").collect().is_empty());
    }
}
