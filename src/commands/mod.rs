//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `config.rs`, `sqs/`, `workflow/`, `utils/`
//! - 子模块: compositions, supercell, cutoff, sqs, fit_plan, volume

pub mod compositions;
pub mod cutoff;
pub mod fit_plan;
pub mod sqs;
pub mod supercell;
pub mod volume;

use crate::cli::{Commands, TemplateArgs};
use crate::config::WorkflowConfig;
use crate::error::{BladeError, Result};
use crate::models::UnitCellTemplate;
use crate::parsers::rndstr;
use crate::sqs::supercell::DEFAULT_MIXED_LABEL;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Compositions(args) => compositions::execute(args),
        Commands::Supercell(args) => supercell::execute(args),
        Commands::Cutoff(args) => cutoff::execute(args),
        Commands::Sqs(args) => sqs::execute(args),
        Commands::FitPlan(args) => fit_plan::execute(args),
        Commands::Volume(args) => volume::execute(args),
    }
}

/// 已加载的原胞模板
pub(crate) struct LoadedTemplate {
    pub template: UnitCellTemplate,
    pub mixed_label: String,
    pub config: Option<WorkflowConfig>,
}

/// 从 `--template` 或 `--config` 加载原胞模板；`--label` 优先
pub(crate) fn load_template(args: &TemplateArgs) -> Result<LoadedTemplate> {
    let (template, config_label, config) = match (&args.template, &args.config) {
        (Some(path), _) => (rndstr::parse_rndstr_file(path)?, None, None),
        (None, Some(path)) => {
            let config = WorkflowConfig::load(path)?;
            let prototype = config.prototype()?;
            let template = prototype.template()?;
            let label = prototype.mixed_label.clone();
            (template, Some(label), Some(config))
        }
        (None, None) => {
            return Err(BladeError::InvalidArgument(
                "either --template or --config is required".to_string(),
            ))
        }
    };

    let mixed_label = args
        .label
        .clone()
        .or(config_label)
        .unwrap_or_else(|| DEFAULT_MIXED_LABEL.to_string());

    Ok(LoadedTemplate {
        template,
        mixed_label,
        config,
    })
}
