//! # sqs 命令实现
//!
//! 读取工作流配置，确定体系大小，生成 SQS 输入并运行 ATAT 工具链。
//!
//! ## 依赖关系
//! - 使用 `cli/sqs.rs` 定义的参数
//! - 使用 `config.rs`, `sqs/`, `workflow/sqs_run.rs`
//! - 使用 `utils/output.rs` 输出

use crate::cli::sqs::SqsArgs;
use crate::config::WorkflowConfig;
use crate::error::{BladeError, Result};
use crate::sqs::cutoff::DEFAULT_PAIR_SHELLS;
use crate::sqs::{generate_compositions, ShellFinder};
use crate::utils::output;
use crate::workflow::{AtatTools, ClusterArgs, SqsRunSettings, SqsRunner};

use itertools::Itertools;
use std::collections::BTreeSet;
use std::time::Duration;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Tabled)]
struct PlanRow {
    #[tabled(rename = "Directory")]
    directory: String,
    #[tabled(rename = "Level")]
    level: usize,
    #[tabled(rename = "Fractions")]
    fractions: String,
    #[tabled(rename = "Counts")]
    counts: String,
    #[tabled(rename = "Atoms")]
    atoms: usize,
}

/// 执行 sqs 命令
pub fn execute(args: SqsArgs) -> Result<()> {
    output::print_header("SQS Generation");

    let config = WorkflowConfig::load(&args.config)?;
    let prototype = config.prototype()?;
    let template = prototype.template()?;

    let sizes = system_sizes(&args, &config)?;
    output::print_info(&format!(
        "Phase {}: system sizes {{{}}}",
        prototype.name,
        sizes.iter().join(", ")
    ));

    let clusters = if args.auto_cutoff {
        let cutoffs = ShellFinder::new(&template).cluster_cutoffs(DEFAULT_PAIR_SHELLS)?;
        output::print_info(&format!(
            "Cluster cutoffs: pair {:.4}, triplet {:.4}",
            cutoffs.pair, cutoffs.triplet
        ));
        ClusterArgs::from_cutoffs(&cutoffs)
    } else {
        ClusterArgs {
            pairs: config.sqs.pair_clusters.clone(),
            triplets: config.sqs.triplet_clusters.clone(),
        }
    };

    let settings = SqsRunSettings {
        root: args.output.clone().unwrap_or_else(|| config.sqs.output_dir.clone()),
        phase: prototype.name.clone(),
        levels: config.sqs.levels.clone(),
        level: args.level.unwrap_or(config.sqs.level),
        time: Duration::from_secs(args.time.unwrap_or(config.sqs.time)),
        mixed_label: prototype.mixed_label.clone(),
        min_mixed_sites: config.sqs.min_mixed_sites,
        max_denominator: config.sqs.max_denominator,
        clusters,
    };
    let mut runner = SqsRunner::new(&template, settings);
    if let Some(ref bin) = config.sqs.atat_bin {
        runner = runner.with_tools(AtatTools::in_dir(bin));
    }

    if args.dry_run {
        let jobs = runner.plan(&sizes)?;
        let rows: Vec<PlanRow> = jobs
            .iter()
            .map(|job| PlanRow {
                directory: job.directory.display().to_string(),
                level: job.level,
                fractions: job.fractions.iter().join(","),
                counts: job.supercell.counts.iter().join(","),
                atoms: job.supercell.total_atoms,
            })
            .collect();

        println!("{}", Table::new(&rows));
        output::print_done(&format!("[DRY] {} mcsqs jobs planned", jobs.len()));
        return Ok(());
    }

    let report = runner.run(&sizes)?;

    output::print_separator();
    for (path, err) in &report.failures {
        output::print_error(&format!("{}: {}", path, err.trim()));
    }
    output::print_done(&format!(
        "{} SQS folders processed: {} succeeded, {} skipped, {} failed",
        report.total(),
        report.success(),
        report.skipped.len(),
        report.failures.len()
    ));

    Ok(())
}

/// `--sizes` 优先，否则取枚举成分的体系大小
fn system_sizes(args: &SqsArgs, config: &WorkflowConfig) -> Result<BTreeSet<usize>> {
    let sizes: BTreeSet<usize> = if args.sizes.is_empty() {
        let request = config.elements()?.to_request()?;
        generate_compositions(&request).unique_system_sizes()
    } else {
        args.sizes.iter().copied().collect()
    };

    let sizes: BTreeSet<usize> = sizes.into_iter().filter(|&n| n > 0).collect();
    if sizes.is_empty() {
        return Err(BladeError::InvalidArgument(
            "no non-empty system sizes to generate".to_string(),
        ));
    }
    Ok(sizes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(sizes: Vec<usize>) -> SqsArgs {
        SqsArgs {
            config: PathBuf::from("blade.toml"),
            sizes,
            output: None,
            level: None,
            time: None,
            auto_cutoff: false,
            dry_run: true,
        }
    }

    #[test]
    fn test_system_sizes() {
        let config = WorkflowConfig::from_toml(
            "[elements]\nprimary = [\"Hf\", \"Mo\", \"Cr\"]\nsystem_size = 3\nprimary_range = [0, 3]\n",
            "blade.toml",
        )
        .unwrap();

        let sizes = system_sizes(&args(vec![]), &config).unwrap();
        assert_eq!(sizes, BTreeSet::from([1, 2, 3]));

        let sizes = system_sizes(&args(vec![3, 2, 3]), &config).unwrap();
        assert_eq!(sizes, BTreeSet::from([2, 3]));

        assert!(system_sizes(&args(vec![0]), &config).is_err());

        let empty = WorkflowConfig::from_toml("", "blade.toml").unwrap();
        assert!(system_sizes(&args(vec![]), &empty).is_err());
    }
}
