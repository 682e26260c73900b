//! # volume 命令实现
//!
//! ## 依赖关系
//! - 使用 `cli/volume.rs` 定义的参数
//! - 使用 `workflow/volume.rs`

use crate::cli::volume::VolumeArgs;
use crate::error::Result;
use crate::utils::output;
use crate::workflow::{scan_composition, write_volume_csv};

/// 执行 volume 命令
pub fn execute(args: VolumeArgs) -> Result<()> {
    output::print_header("Collecting Cell Volumes");

    let mut rows = Vec::new();
    let mut failed = 0;

    for input in &args.inputs {
        output::print_info(&format!("Checking for POSCARs in: {}", input.display()));

        let result = scan_composition(input, args.jobs)?;
        for (path, err) in &result.failures {
            output::print_warning(&format!("Read failed: {} -> {}", path, err));
        }
        failed += result.failures.len();

        output::print_success(&format!(
            "{}: {} POSCARs read",
            input.display(),
            result.success()
        ));
        rows.extend(result.outputs);
    }

    if rows.is_empty() {
        output::print_warning("No POSCAR files found");
        return Ok(());
    }

    write_volume_csv(&rows, &args.output)?;

    output::print_separator();
    output::print_done(&format!(
        "{} rows written to '{}' ({} failed)",
        rows.len(),
        args.output.display(),
        failed
    ));

    Ok(())
}
