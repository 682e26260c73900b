//! # 弛豫结构体积统计
//!
//! 扫描 `<成分目录>/<相目录>/**/POSCAR`，提取晶胞体积、每原子体积、晶格参数，
//! 并从祖先目录名解析 SQS 层级与 a 亚晶格成分，结果写入 CSV。
//!
//! ## 依赖关系
//! - 被 `commands/volume.rs` 调用
//! - 使用 `batch/` 收集与并行读取文件
//! - 使用 `parsers/poscar.rs`, `parsers/sqs_meta.rs`
//! - 使用 `serde` + `csv` 输出

use crate::batch::{BatchResult, BatchRunner, FileCollector, ProcessResult};
use crate::error::{BladeError, Result};
use crate::parsers::{poscar, sqs_meta};

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// CSV 中的一行
#[derive(Debug, Clone, Serialize)]
pub struct VolumeRow {
    pub composition_folder: String,
    pub phase_folder: String,
    pub sqs_level: Option<usize>,
    pub sqs_a_fracs: String,
    pub poscar_path: String,
    #[serde(rename = "volume_A3")]
    pub volume: f64,
    pub natoms: usize,
    #[serde(rename = "volume_per_atom_A3")]
    pub volume_per_atom: Option<f64>,
    #[serde(rename = "a_A")]
    pub a: f64,
    #[serde(rename = "b_A")]
    pub b: f64,
    #[serde(rename = "c_A")]
    pub c: f64,
    #[serde(rename = "alpha_deg")]
    pub alpha: f64,
    #[serde(rename = "beta_deg")]
    pub beta: f64,
    #[serde(rename = "gamma_deg")]
    pub gamma: f64,
    pub poscar_counts: String,
}

/// 读取单个 POSCAR 生成一行
pub fn read_volume_row(composition: &str, phase: &str, poscar_path: &Path) -> Result<VolumeRow> {
    let header = poscar::parse_poscar_file(poscar_path)?;
    let meta = sqs_meta::parse_sqs_meta(poscar_path);

    let volume = header.lattice.volume().abs();
    let natoms = header.natoms();
    let params = header.lattice.parameters();

    let counts = header
        .counts_by_element()
        .iter()
        .map(|(el, n)| format!("{}={}", el, n))
        .collect::<Vec<_>>()
        .join(";");

    Ok(VolumeRow {
        composition_folder: composition.to_string(),
        phase_folder: phase.to_string(),
        sqs_level: meta.level,
        sqs_a_fracs: meta.fractions_label(),
        poscar_path: poscar_path.display().to_string(),
        volume,
        natoms,
        volume_per_atom: (natoms > 0).then(|| volume / natoms as f64),
        a: params.a,
        b: params.b,
        c: params.c,
        alpha: params.alpha,
        beta: params.beta,
        gamma: params.gamma,
        poscar_counts: counts,
    })
}

/// 成分目录下的相目录，按名称排序
fn phase_dirs(comp_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(comp_dir).map_err(|e| BladeError::FileReadError {
        path: comp_dir.display().to_string(),
        source: e,
    })?;

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// 扫描一个成分目录
pub fn scan_composition(comp_dir: &Path, jobs: usize) -> Result<BatchResult<VolumeRow>> {
    if !comp_dir.is_dir() {
        return Err(BladeError::DirectoryNotFound {
            path: comp_dir.display().to_string(),
        });
    }

    let composition = dir_name(comp_dir);

    let mut files = Vec::new();
    for phase_dir in phase_dirs(comp_dir)? {
        files.extend(
            FileCollector::new(&phase_dir)
                .with_pattern("POSCAR")?
                .recursive(true)
                .collect(),
        );
    }

    BatchRunner::new(jobs).run(&files, |path| {
        let phase = path
            .strip_prefix(comp_dir)
            .ok()
            .and_then(|rel| rel.components().next())
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .unwrap_or_default();

        match read_volume_row(&composition, &phase, path) {
            Ok(row) => ProcessResult::Success(row),
            Err(e) => ProcessResult::Failed(path.display().to_string(), e.to_string()),
        }
    })
}

/// 写出 CSV
pub fn write_volume_csv(rows: &[VolumeRow], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| BladeError::FileWriteError {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|e| BladeError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const POSCAR: &str = "CrHf SQS
1.0
  4.0 0.0 0.0
  0.0 4.0 0.0
  0.0 0.0 5.0
Cr Hf B
2 2 8
Direct
";

    fn write_poscar(dir: &Path) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join("POSCAR"), POSCAR).unwrap();
    }

    #[test]
    fn test_read_volume_row() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("sqs_lev=1_a_Cr=0.5,a_Hf=0.5");
        write_poscar(&dir);

        let row = read_volume_row("CrHf", "HEDB1_2", &dir.join("POSCAR")).unwrap();
        assert!((row.volume - 80.0).abs() < 1e-9);
        assert_eq!(row.natoms, 12);
        assert!((row.volume_per_atom.unwrap() - 80.0 / 12.0).abs() < 1e-9);
        assert!((row.gamma - 90.0).abs() < 1e-9);
        assert_eq!(row.sqs_level, Some(1));
        assert_eq!(row.sqs_a_fracs, "Cr=0.5;Hf=0.5");
        assert_eq!(row.poscar_counts, "B=8;Cr=2;Hf=2");
    }

    #[test]
    fn test_scan_and_write_csv() {
        let root = tempfile::tempdir().unwrap();
        let comp = root.path().join("CrHf");
        write_poscar(&comp.join("HEDB1_2").join("sqs_lev=1_a_Cr=0.5,a_Hf=0.5"));
        write_poscar(&comp.join("HEDB1_2").join("sqs_lev=2_a_Cr=0.75,a_Hf=0.25"));
        write_poscar(&comp.join("LIQUID"));
        // 直接位于成分目录下的 POSCAR 不属于任何相
        fs::write(comp.join("POSCAR"), POSCAR).unwrap();
        // 损坏的文件记为失败
        fs::create_dir_all(comp.join("BROKEN")).unwrap();
        fs::write(comp.join("BROKEN").join("POSCAR"), "garbage").unwrap();

        let result = scan_composition(&comp, 2).unwrap();
        assert_eq!(result.success(), 3);
        assert_eq!(result.failures.len(), 1);

        let phases: Vec<&str> = result.outputs.iter().map(|r| r.phase_folder.as_str()).collect();
        assert_eq!(phases, vec!["HEDB1_2", "HEDB1_2", "LIQUID"]);
        assert!(result.outputs.iter().all(|r| r.composition_folder == "CrHf"));

        let csv_path = root.path().join("out").join("volumes.csv");
        write_volume_csv(&result.outputs, &csv_path).unwrap();
        let text = fs::read_to_string(&csv_path).unwrap();
        let header = text.lines().next().unwrap();
        assert!(header.starts_with("composition_folder,phase_folder,sqs_level"));
        assert!(header.contains("volume_per_atom_A3"));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn test_missing_composition_dir() {
        let result = scan_composition(Path::new("/nonexistent/CrHf"), 1);
        assert!(matches!(result, Err(BladeError::DirectoryNotFound { .. })));
    }
}
