//! # cutoff 命令实现
//!
//! ## 依赖关系
//! - 使用 `cli/cutoff.rs` 定义的参数
//! - 使用 `sqs/cutoff.rs`

use super::load_template;
use crate::cli::cutoff::CutoffArgs;
use crate::error::Result;
use crate::sqs::ShellFinder;
use crate::utils::output;

use tabled::{Table, Tabled};

#[derive(Debug, Clone, Tabled)]
struct ShellRow {
    #[tabled(rename = "Shell")]
    index: usize,
    #[tabled(rename = "Distance")]
    distance: String,
}

/// 执行 cutoff 命令
pub fn execute(args: CutoffArgs) -> Result<()> {
    output::print_header("Neighbour Shells and Cluster Cutoffs");

    let loaded = load_template(&args.template)?;
    let finder = ShellFinder::new(&loaded.template)
        .with_tolerance(args.tolerance)
        .with_translation_range(args.range);

    let cutoffs = finder.cluster_cutoffs(args.shells)?;

    let rows: Vec<ShellRow> = cutoffs
        .shells
        .iter()
        .take(args.show)
        .enumerate()
        .map(|(i, d)| ShellRow {
            index: i + 1,
            distance: format!("{:.5}", d),
        })
        .collect();

    println!("{}", Table::new(&rows));

    output::print_separator();
    output::print_success(&format!(
        "Pair cutoff ({} shells): {:.4}",
        args.shells, cutoffs.pair
    ));
    output::print_success(&format!("Triplet cutoff: {:.4}", cutoffs.triplet));
    output::print_info(&format!(
        "corrdump -2={:.4} -3={:.4}",
        cutoffs.pair, cutoffs.triplet
    ));

    Ok(())
}
