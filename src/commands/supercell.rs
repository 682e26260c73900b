//! # supercell 命令实现
//!
//! ## 依赖关系
//! - 使用 `cli/supercell.rs` 定义的参数
//! - 使用 `sqs/supercell.rs`
//! - 使用 `utils/output.rs` 输出

use super::load_template;
use crate::cli::supercell::SupercellArgs;
use crate::config::SqsConfig;
use crate::error::Result;
use crate::models::UnitCellTemplate;
use crate::sqs::SupercellSizer;
use crate::utils::output;

use tabled::{Table, Tabled};

#[derive(Debug, Clone, Tabled)]
struct SpeciesRow {
    #[tabled(rename = "Species")]
    species: String,
    #[tabled(rename = "Target")]
    target: f64,
    #[tabled(rename = "Rational")]
    rational: String,
    #[tabled(rename = "Atoms")]
    count: usize,
    #[tabled(rename = "Actual")]
    actual: String,
}

/// 执行 supercell 命令
pub fn execute(args: SupercellArgs) -> Result<()> {
    output::print_header("SQS Supercell Size");

    let loaded = load_template(&args.template)?;
    let defaults = loaded
        .config
        .as_ref()
        .map(|c| c.sqs.clone())
        .unwrap_or_default();
    let sizer = configure_sizer(&loaded.template, &loaded.mixed_label, &args, &defaults);

    let sites = sizer.site_counts();
    output::print_info(&format!(
        "Unit cell: {} mixed sites ('{}'), {} fixed sites",
        sites.mixed, loaded.mixed_label, sites.fixed
    ));

    let result = sizer.supercell_size(&args.fractions)?;

    let rows: Vec<SpeciesRow> = args
        .fractions
        .iter()
        .zip(result.counts.iter().zip(result.fractions.iter()))
        .enumerate()
        .map(|(i, (&f, (&n, r)))| SpeciesRow {
            species: format!("#{}", i + 1),
            target: f,
            rational: r.to_string(),
            count: n,
            actual: format!("{:.5}", n as f64 / result.mixed_sites as f64),
        })
        .collect();

    println!("{}", Table::new(&rows));

    output::print_separator();
    output::print_success(&format!(
        "{} unit cells, {} mixed sites, {} atoms in total (mcsqs -n={})",
        result.replication, result.mixed_sites, result.total_atoms, result.total_atoms
    ));

    Ok(())
}

fn configure_sizer<'a>(
    template: &'a UnitCellTemplate,
    mixed_label: &str,
    args: &SupercellArgs,
    defaults: &SqsConfig,
) -> SupercellSizer<'a> {
    SupercellSizer::new(template)
        .with_mixed_label(mixed_label)
        .with_min_mixed_sites(args.min_sites.unwrap_or(defaults.min_mixed_sites))
        .with_max_denominator(args.max_denominator.unwrap_or(defaults.max_denominator))
}
