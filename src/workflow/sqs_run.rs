//! # SQS 生成流程
//!
//! 对每个体系大小 `n`：
//! 1. 创建 `<root>/<phase>_<n>/`，写入 `rndstr.skel` 与 `sqsgen.in`
//! 2. 运行 `sqs2tdb -mk` 生成 `sqsdb_lev=*` 子目录
//! 3. 对每个非纯组元子目录计算超胞尺寸，依次运行 `corrdump` 与 `mcsqs`
//! 4. `mcsqs` 运行 `time` 秒后在其目录写入 `stopsqs` 使其退出
//!
//! 外部程序一律显式设置工作目录，不修改进程的当前目录。
//!
//! ## 依赖关系
//! - 被 `commands/sqs.rs` 调用
//! - 使用 `sqs/supercell.rs`, `sqs/cutoff.rs`
//! - 使用 `parsers/rndstr.rs`, `parsers/sqs_meta.rs`
//! - 使用 `batch/runner.rs` 的结果汇总类型
//! - 使用 `glob` 查找 `sqsdb_lev=*` 目录

use crate::batch::{BatchResult, ProcessResult};
use crate::error::{BladeError, Result};
use crate::models::UnitCellTemplate;
use crate::parsers::{rndstr, sqs_meta};
use crate::sqs::{ClusterCutoffs, SupercellResult, SupercellSizer};
use crate::utils::{output, progress};

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

pub const RNDSTR_SKEL: &str = "rndstr.skel";
pub const SQSGEN_IN: &str = "sqsgen.in";
pub const STOP_FILE: &str = "stopsqs";

/// corrdump 的团簇参数
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterArgs {
    pub pairs: String,
    pub triplets: String,
}

impl Default for ClusterArgs {
    fn default() -> Self {
        ClusterArgs {
            pairs: "1,2,3".to_string(),
            triplets: "1".to_string(),
        }
    }
}

impl ClusterArgs {
    /// 使用计算得到的截断半径
    pub fn from_cutoffs(cutoffs: &ClusterCutoffs) -> Self {
        ClusterArgs {
            pairs: format!("{:.4}", cutoffs.pair),
            triplets: format!("{:.4}", cutoffs.triplet),
        }
    }

    fn corrdump_args(&self) -> Vec<String> {
        vec![
            "-l=rndstr.in".to_string(),
            "-ro".to_string(),
            "-noe".to_string(),
            "-nop".to_string(),
            "-clus".to_string(),
            format!("-2={}", self.pairs),
            format!("-3={}", self.triplets),
        ]
    }
}

/// ATAT 可执行文件
#[derive(Debug, Clone)]
pub struct AtatTools {
    pub sqs2tdb: PathBuf,
    pub corrdump: PathBuf,
    pub mcsqs: PathBuf,
}

impl Default for AtatTools {
    fn default() -> Self {
        AtatTools {
            sqs2tdb: PathBuf::from("sqs2tdb"),
            corrdump: PathBuf::from("corrdump"),
            mcsqs: PathBuf::from("mcsqs"),
        }
    }
}

impl AtatTools {
    /// 使用指定目录下的可执行文件，而不是 PATH 中的
    pub fn in_dir(bin: &Path) -> Self {
        AtatTools {
            sqs2tdb: bin.join("sqs2tdb"),
            corrdump: bin.join("corrdump"),
            mcsqs: bin.join("mcsqs"),
        }
    }
}

/// 运行参数
#[derive(Debug, Clone)]
pub struct SqsRunSettings {
    pub root: PathBuf,
    pub phase: String,
    pub levels: Vec<String>,
    pub level: usize,
    /// mcsqs 运行时长
    pub time: Duration,
    pub mixed_label: String,
    pub min_mixed_sites: usize,
    pub max_denominator: u64,
    pub clusters: ClusterArgs,
}

/// 单个 SQS 任务
#[derive(Debug, Clone)]
pub struct SqsJob {
    pub directory: PathBuf,
    pub level: usize,
    pub fractions: Vec<f64>,
    pub supercell: SupercellResult,
}

/// mcsqs 运行结束的方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// 计时前自行退出
    Finished,
    /// 计时到期，已写入 stopsqs
    Stopped,
}

/// SQS 流程执行器
pub struct SqsRunner<'a> {
    template: &'a UnitCellTemplate,
    settings: SqsRunSettings,
    tools: AtatTools,
}

impl<'a> SqsRunner<'a> {
    pub fn new(template: &'a UnitCellTemplate, settings: SqsRunSettings) -> Self {
        SqsRunner {
            template,
            settings,
            tools: AtatTools::default(),
        }
    }

    pub fn with_tools(mut self, tools: AtatTools) -> Self {
        self.tools = tools;
        self
    }

    fn sizer(&self) -> SupercellSizer<'a> {
        SupercellSizer::new(self.template)
            .with_mixed_label(self.settings.mixed_label.clone())
            .with_min_mixed_sites(self.settings.min_mixed_sites)
            .with_max_denominator(self.settings.max_denominator)
    }

    /// `<root>/<phase>_<n>`
    pub fn phase_dir(&self, system_size: usize) -> PathBuf {
        self.settings
            .root
            .join(format!("{}_{}", self.settings.phase, system_size))
    }

    /// 写入 rndstr.skel 与 sqsgen.in
    pub fn write_inputs(&self, dir: &Path) -> Result<()> {
        let sqsgen = rndstr::sqsgen_text(&self.settings.levels, self.settings.level)?;

        fs::create_dir_all(dir).map_err(|e| BladeError::FileWriteError {
            path: dir.display().to_string(),
            source: e,
        })?;

        for (name, content) in [
            (RNDSTR_SKEL, rndstr::to_rndstr_string(self.template)),
            (SQSGEN_IN, sqsgen),
        ] {
            let path = dir.join(name);
            fs::write(&path, content).map_err(|e| BladeError::FileWriteError {
                path: path.display().to_string(),
                source: e,
            })?;
        }

        Ok(())
    }

    /// 不运行外部程序，仅根据 sqsgen 层级列出将要生成的任务
    pub fn plan(&self, sizes: &BTreeSet<usize>) -> Result<Vec<SqsJob>> {
        let levels = level_fractions(
            &self.settings.levels,
            self.settings.level,
            &self.settings.mixed_label,
        )?;
        let sizer = self.sizer();

        let mut jobs = Vec::new();
        for &n in sizes {
            let dir = self.phase_dir(n);
            for (level, fractions) in &levels {
                if fractions.len() < 2 {
                    continue;
                }
                jobs.push(SqsJob {
                    directory: dir.clone(),
                    level: *level,
                    fractions: fractions.clone(),
                    supercell: sizer.supercell_size(fractions)?,
                });
            }
        }
        Ok(jobs)
    }

    /// 执行完整流程
    pub fn run(&self, sizes: &BTreeSet<usize>) -> Result<BatchResult<SqsJob>> {
        let mut report = BatchResult::default();

        for &n in sizes {
            let dir = self.phase_dir(n);
            self.write_inputs(&dir)?;
            output::print_success(&format!("Prepared {}", dir.display()));

            match run_tool(&self.tools.sqs2tdb, &["-mk".to_string()], &dir) {
                Ok(_) => {}
                Err(BladeError::CommandFailed { command, stderr }) => {
                    output::print_warning(&format!("{} failed: {}", command, stderr.trim()));
                }
                Err(e) => return Err(e),
            }

            for folder in sqsdb_folders(&dir)? {
                report.merge(self.run_folder(&folder)?);
            }
        }

        Ok(report)
    }

    /// 处理单个 `sqsdb_lev=*` 目录；外部程序缺失时返回错误
    fn run_folder(&self, folder: &Path) -> Result<ProcessResult<SqsJob>> {
        let name = folder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let label = folder.display().to_string();

        let parsed = match sqs_meta::parse_sqsdb_folder(&name) {
            Ok(parsed) => parsed,
            Err(e) => return Ok(ProcessResult::Failed(label, e.to_string())),
        };

        if parsed.is_pure() {
            output::print_skip(&format!("Pure species directory: {}", label));
            return Ok(ProcessResult::Skipped(label));
        }

        let supercell = match self.sizer().supercell_size(&parsed.fractions) {
            Ok(s) => s,
            Err(e) => return Ok(ProcessResult::Failed(label, e.to_string())),
        };

        output::print_info(&format!("Running corrdump in {}", name));
        match run_tool(
            &self.tools.corrdump,
            &self.settings.clusters.corrdump_args(),
            folder,
        ) {
            Ok(_) => {}
            Err(BladeError::CommandFailed { stderr, .. }) => {
                output::print_warning(&format!("corrdump failed in {}, continuing", name));
                return Ok(ProcessResult::Failed(label, stderr));
            }
            Err(e) => return Err(e),
        }

        let spinner = progress::create_spinner(&format!(
            "mcsqs -n={} in {}",
            supercell.total_atoms, name
        ));
        let outcome = run_until_stopped(
            &self.tools.mcsqs,
            &[format!("-n={}", supercell.total_atoms)],
            folder,
            self.settings.time,
        );
        spinner.finish_and_clear();

        match outcome {
            Ok(_) => {
                output::print_success(&format!(
                    "mcsqs finished: {} ({} atoms)",
                    name, supercell.total_atoms
                ));
                Ok(ProcessResult::Success(SqsJob {
                    directory: folder.to_path_buf(),
                    level: parsed.level,
                    fractions: parsed.fractions,
                    supercell,
                }))
            }
            Err(BladeError::CommandFailed { stderr, .. }) => {
                output::print_warning(&format!("mcsqs failed in {}, continuing", name));
                Ok(ProcessResult::Failed(label, stderr))
            }
            Err(e) => Err(e),
        }
    }
}

/// 解析 sqsgen 层级行中混合亚晶格的分数，如 `level=2  a=0.75,0.25`
pub fn level_fractions(
    levels: &[String],
    level: usize,
    mixed_label: &str,
) -> Result<Vec<(usize, Vec<f64>)>> {
    let text = rndstr::sqsgen_text(levels, level)?;
    let prefix = format!("{}=", mixed_label);

    let mut result = Vec::new();
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let invalid = || BladeError::ParseError {
            format: "sqsgen".to_string(),
            path: SQSGEN_IN.to_string(),
            reason: format!("Invalid level line: '{}'", line.trim()),
        };

        let mut lev = None;
        let mut fractions = None;
        for token in line.split_whitespace() {
            if let Some(v) = token.strip_prefix("level=") {
                lev = v.parse::<usize>().ok();
            } else if let Some(v) = token.strip_prefix(&prefix) {
                fractions = v
                    .split(',')
                    .map(|x| x.parse::<f64>())
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .ok();
            }
        }

        match (lev, fractions) {
            (Some(l), Some(f)) => result.push((l, f)),
            _ => return Err(invalid()),
        }
    }

    Ok(result)
}

/// `dir` 下的 `sqsdb_lev=*` 目录，按名称排序
pub fn sqsdb_folders(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/sqsdb_lev=*",
        glob::Pattern::escape(&dir.to_string_lossy())
    );

    let entries = glob::glob(&pattern).map_err(|e| {
        BladeError::InvalidArgument(format!("Invalid glob pattern '{}': {}", pattern, e))
    })?;

    let mut folders: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|p| p.is_dir())
        .collect();
    folders.sort();
    Ok(folders)
}

fn program_name(program: &Path) -> String {
    program.display().to_string()
}

/// 只有 NotFound 视为程序缺失；权限不足、路径是目录等归为运行失败
fn spawn_error(program: &Path, err: io::Error) -> BladeError {
    if err.kind() == io::ErrorKind::NotFound {
        BladeError::CommandNotFound {
            command: program_name(program),
        }
    } else {
        BladeError::CommandFailed {
            command: program_name(program),
            stderr: err.to_string(),
        }
    }
}

/// 在 `dir` 中运行外部程序并等待结束
pub fn run_tool(program: &Path, args: &[String], dir: &Path) -> Result<Output> {
    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| spawn_error(program, e))?;

    if output.status.success() {
        Ok(output)
    } else {
        Err(BladeError::CommandFailed {
            command: format!("{} {}", program_name(program), args.join(" ")),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// 运行程序，`timeout` 后在 `dir` 中写入 stopsqs；程序先结束则取消计时
pub fn run_until_stopped(
    program: &Path,
    args: &[String],
    dir: &Path,
    timeout: Duration,
) -> Result<StopOutcome> {
    let stop_path = dir.join(STOP_FILE);
    // 旧的 stopsqs 会让 mcsqs 立即退出
    if stop_path.exists() {
        fs::remove_file(&stop_path).map_err(|e| BladeError::FileWriteError {
            path: stop_path.display().to_string(),
            source: e,
        })?;
    }

    let mut child = Command::new(program)
        .args(args)
        .current_dir(dir)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| spawn_error(program, e))?;

    let (cancel_tx, cancel_rx) = mpsc::channel::<()>();
    let timer_path = stop_path.clone();
    let timer = thread::spawn(move || match cancel_rx.recv_timeout(timeout) {
        Err(RecvTimeoutError::Timeout) => fs::write(&timer_path, "").is_ok(),
        _ => false,
    });

    let status = child.wait();
    // 计时线程可能已退出，发送失败无妨
    let _ = cancel_tx.send(());
    let stopped = timer.join().unwrap_or(false);

    let command = format!("{} {}", program_name(program), args.join(" "));
    let status = status.map_err(|e| BladeError::CommandFailed {
        command: command.clone(),
        stderr: e.to_string(),
    })?;

    if !status.success() {
        return Err(BladeError::CommandFailed {
            command,
            stderr: format!("exited with {}", status),
        });
    }

    Ok(if stopped {
        StopOutcome::Stopped
    } else {
        StopOutcome::Finished
    })
}
