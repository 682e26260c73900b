//! # fit-plan 命令实现
//!
//! 列出每个成分的拟合目录、相列表与已存在的 TDB 文件。
//!
//! ## 依赖关系
//! - 使用 `cli/fit_plan.rs` 定义的参数
//! - 使用 `config.rs`, `sqs/compositions.rs`, `workflow/phases.rs`

use crate::cli::fit_plan::FitPlanArgs;
use crate::config::WorkflowConfig;
use crate::error::{BladeError, Result};
use crate::sqs::generate_compositions;
use crate::utils::output;
use crate::workflow::phases;

use tabled::{Table, Tabled};

#[derive(Debug, Clone, Tabled)]
struct PlanRow {
    #[tabled(rename = "Composition")]
    composition: String,
    #[tabled(rename = "Directory")]
    directory: String,
    #[tabled(rename = "Phases")]
    phases: String,
    #[tabled(rename = "TDB")]
    tdb: String,
}

/// 执行 fit-plan 命令
pub fn execute(args: FitPlanArgs) -> Result<()> {
    output::print_header("Fitting Plan");

    let config = WorkflowConfig::load(&args.config)?;
    let request = config.elements()?.to_request()?;
    let compositions = generate_compositions(&request).into_compositions();

    let base_phases = base_phases(&args, &config)?;
    let liquid = args.liquid || config.fit.liquid;
    let root = args.output.clone().unwrap_or_else(|| config.fit.output_dir.clone());

    let plans = phases::plan_fits(&root, &compositions, &base_phases, liquid);

    let rows: Vec<PlanRow> = plans
        .iter()
        .map(|plan| PlanRow {
            composition: plan.composition.to_string(),
            directory: plan.directory.display().to_string(),
            phases: plan.phases.join(", "),
            tdb: plan
                .existing_tdb
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    println!("{}", Table::new(&rows));

    if args.mkdir {
        phases::create_fit_dirs(&plans)?;
        output::print_success(&format!(
            "Created {} folders under '{}'",
            plans.len(),
            root.display()
        ));
    }

    let fitted = plans.iter().filter(|p| p.existing_tdb.is_some()).count();
    output::print_done(&format!(
        "{} compositions, {} with an existing TDB",
        plans.len(),
        fitted
    ));

    Ok(())
}

/// `--phases` 优先，其次 `[fit].phases`，最后使用原型名
fn base_phases(args: &FitPlanArgs, config: &WorkflowConfig) -> Result<Vec<String>> {
    if !args.phases.is_empty() {
        return Ok(args.phases.clone());
    }
    if !config.fit.phases.is_empty() {
        return Ok(config.fit.phases.clone());
    }

    config
        .prototype
        .as_ref()
        .map(|p| vec![p.name.clone()])
        .ok_or_else(|| {
            BladeError::InvalidArgument(
                "no phases given; use --phases, [fit].phases or [prototype]".to_string(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(phases: Vec<String>) -> FitPlanArgs {
        FitPlanArgs {
            config: PathBuf::from("blade.toml"),
            output: None,
            phases,
            liquid: false,
            mkdir: false,
        }
    }

    #[test]
    fn test_base_phase_precedence() {
        let config = WorkflowConfig::from_toml(
            "[fit]\nphases = [\"HEDB1\", \"HEDB2\"]\n",
            "blade.toml",
        )
        .unwrap();

        assert_eq!(base_phases(&args(vec![]), &config).unwrap(), vec!["HEDB1", "HEDB2"]);
        assert_eq!(
            base_phases(&args(vec!["FCC".to_string()]), &config).unwrap(),
            vec!["FCC"]
        );

        let empty = WorkflowConfig::from_toml("", "blade.toml").unwrap();
        assert!(base_phases(&args(vec![]), &empty).is_err());
    }
}
