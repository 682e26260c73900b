//! # 美化输出工具
//!
//! 统一的终端状态行：`[OK]`、`[*]`、`[WARN]`、`[ERR]`、`[SKIP]`、`[DONE]`。
//! 核心计算模块不输出，只有命令层与工作流层调用这里。
//!
//! ## 依赖关系
//! - 被 `commands/`, `workflow/sqs_run.rs` 使用
//! - 使用 `colored` crate

use colored::{ColoredString, Colorize};

const RULE_WIDTH: usize = 60;

fn status(tag: ColoredString, msg: &str) {
    println!("{} {}", tag, msg);
}

pub fn print_success(msg: &str) {
    status("[OK]".green().bold(), msg);
}

/// 错误写到 stderr
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

pub fn print_warning(msg: &str) {
    status("[WARN]".yellow().bold(), msg);
}

pub fn print_info(msg: &str) {
    status("[*]".blue().bold(), msg);
}

pub fn print_skip(msg: &str) {
    status("[SKIP]".dimmed(), msg);
}

pub fn print_done(msg: &str) {
    status("[DONE]".green().bold(), msg);
}

/// 打印标题栏
pub fn print_header(title: &str) {
    let line = "─".repeat(RULE_WIDTH);
    println!("\n{}", line.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", line.dimmed());
}

pub fn print_separator() {
    println!("{}", "─".repeat(RULE_WIDTH).dimmed());
}
