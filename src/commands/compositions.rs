//! # compositions 命令实现
//!
//! 枚举成分，打印表格与体系大小，可选写出 CSV。
//!
//! ## 依赖关系
//! - 使用 `cli/compositions.rs` 定义的参数
//! - 使用 `config.rs`, `sqs/compositions.rs`
//! - 使用 `utils/output.rs` 输出

use crate::cli::compositions::CompositionsArgs;
use crate::config::WorkflowConfig;
use crate::error::{BladeError, Result};
use crate::models::{Composition, CompositionRequest, CountRange};
use crate::sqs::generate_compositions;
use crate::utils::output;

use itertools::Itertools;
use std::path::Path;
use tabled::{Table, Tabled};

/// 表格行
#[derive(Debug, Clone, Tabled)]
struct CompositionRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Composition")]
    name: String,
    #[tabled(rename = "Elements")]
    elements: String,
    #[tabled(rename = "Size")]
    size: usize,
}

/// 执行 compositions 命令
pub fn execute(args: CompositionsArgs) -> Result<()> {
    output::print_header("Enumerating Compositions");

    let config = args.config.as_deref().map(WorkflowConfig::load).transpose()?;
    let request = build_request(&args, config.as_ref())?;

    output::print_info(&format!(
        "Primary pool [{}] x {}..={}, secondary pool [{}] x {}..={}, max size {}",
        request.primary.join(","),
        request.primary_range.min(),
        request.primary_range.max(),
        request.secondary.join(","),
        request.secondary_range.min(),
        request.secondary_range.max(),
        request.max_size
    ));

    let set = generate_compositions(&request);
    if set.generated() > set.len() {
        output::print_skip(&format!(
            "Removed {} duplicate compositions",
            set.generated() - set.len()
        ));
    }

    if set.is_empty() {
        output::print_warning("No compositions match the request");
        return Ok(());
    }

    let rows: Vec<CompositionRow> = set
        .compositions()
        .iter()
        .enumerate()
        .map(|(i, c)| CompositionRow {
            index: i + 1,
            name: display_name(c),
            elements: c.elements().join(", "),
            size: c.len(),
        })
        .collect();

    println!("{}", Table::new(&rows));

    output::print_separator();
    output::print_success(&format!(
        "Unique system sizes: {{{}}}",
        set.unique_system_sizes().iter().join(", ")
    ));

    if let Some(ref path) = args.csv {
        save_compositions_csv(set.compositions(), path)?;
        output::print_success(&format!("Compositions saved to '{}'", path.display()));
    }

    output::print_done(&format!("{} compositions", set.len()));
    Ok(())
}

fn display_name(composition: &Composition) -> String {
    if composition.is_empty() {
        "(empty)".to_string()
    } else {
        composition.to_string()
    }
}

/// 命令行参数覆盖配置文件中的 `[elements]`
pub(crate) fn build_request(
    args: &CompositionsArgs,
    config: Option<&WorkflowConfig>,
) -> Result<CompositionRequest> {
    let elements = config.and_then(|c| c.elements.as_ref());

    let pick_pool = |cli: &[String], from_config: Option<&Vec<String>>| -> Vec<String> {
        if cli.is_empty() {
            from_config.cloned().unwrap_or_default()
        } else {
            cli.to_vec()
        }
    };

    let primary = pick_pool(&args.primary, elements.map(|e| &e.primary));
    let secondary = pick_pool(&args.secondary, elements.map(|e| &e.secondary));

    if primary.is_empty() && secondary.is_empty() {
        return Err(BladeError::InvalidArgument(
            "no elements given; use --primary or a config with [elements]".to_string(),
        ));
    }

    let max_size = args
        .size
        .or(elements.map(|e| e.system_size))
        .ok_or_else(|| BladeError::InvalidArgument("--size is required".to_string()))?;

    let primary_range = match args.primary_range.or(elements.map(|e| e.primary_range)) {
        Some(range) => range,
        None => CountRange::named("primary", 1, max_size)?,
    };
    let secondary_range = args
        .secondary_range
        .or(elements.map(|e| e.secondary_range))
        .unwrap_or_else(|| CountRange::exactly(0));

    let allow_lower_order =
        !args.no_lower_order && elements.map_or(true, |e| e.allow_lower_order);

    CompositionRequest::new(
        primary,
        secondary,
        max_size,
        primary_range,
        secondary_range,
        allow_lower_order,
    )
}

/// 保存成分列表到 CSV
fn save_compositions_csv(compositions: &[Composition], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["index", "composition", "size", "elements"])?;
    for (i, c) in compositions.iter().enumerate() {
        wtr.write_record([
            (i + 1).to_string(),
            c.to_string(),
            c.len().to_string(),
            c.elements().join(" "),
        ])?;
    }

    wtr.flush().map_err(|e| BladeError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn args() -> CompositionsArgs {
        CompositionsArgs {
            config: None,
            primary: vec![],
            secondary: vec![],
            size: None,
            primary_range: None,
            secondary_range: None,
            no_lower_order: false,
            csv: None,
        }
    }

    #[test]
    fn test_build_request_from_cli_only() {
        let mut a = args();
        a.primary = vec!["Hf".into(), "Mo".into(), "Cr".into()];
        a.size = Some(2);

        let request = build_request(&a, None).unwrap();
        assert_eq!(request.primary_range, CountRange::new(1, 2).unwrap());
        assert_eq!(request.secondary_range, CountRange::exactly(0));
        assert!(request.allow_lower_order);

        a.size = None;
        assert!(build_request(&a, None).is_err());
        assert!(build_request(&args(), None).is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let config = WorkflowConfig::from_toml(
            "[elements]\nprimary = [\"Zr\", \"Ta\"]\nsecondary = [\"Y\"]\nsystem_size = 3\nprimary_range = [2, 2]\nsecondary_range = [0, 1]\n",
            "blade.toml",
        )
        .unwrap();

        let request = build_request(&args(), Some(&config)).unwrap();
        assert_eq!(request.primary, vec!["Zr", "Ta"]);
        assert_eq!(request.max_size, 3);
        assert_eq!(request.secondary_range, CountRange::new(0, 1).unwrap());

        let mut a = args();
        a.primary = vec!["Hf".into()];
        a.size = Some(2);
        a.no_lower_order = true;
        let request = build_request(&a, Some(&config)).unwrap();
        assert_eq!(request.primary, vec!["Hf"]);
        assert_eq!(request.secondary, vec!["Y"]);
        assert_eq!(request.max_size, 2);
        assert!(!request.allow_lower_order);
    }

    #[test]
    fn test_save_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("comps.csv");
        let comps = vec![
            Composition::from_elements(["Hf", "Cr"]).unwrap(),
            Composition::from_elements(["Mo", "Cr"]).unwrap(),
        ];

        save_compositions_csv(&comps, &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "index,composition,size,elements");
        assert_eq!(lines[1], "1,CrHf,2,Cr Hf");
        assert_eq!(lines.len(), 3);
    }
}
