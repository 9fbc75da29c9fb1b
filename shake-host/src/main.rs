//! Shake Host - 无界面的参数震动驱动器
//!
//! 加载场景配置，以固定步长运行，并把参数变化输出为表格或 JSON。

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use shake_host::{ConfigOverrides, HostConfig, report, run};
use tracing::level_filters::LevelFilter;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "shake-host", about = "以固定步长运行参数震动场景")]
struct Args {
    /// 配置文件路径（JSON）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 固定步长频率（Hz）
    #[arg(long)]
    tick_rate: Option<f64>,

    /// 模拟总时长（秒）
    #[arg(long)]
    duration: Option<f64>,

    /// 日志级别
    #[arg(long)]
    log_level: Option<String>,

    /// 每隔多少步采样一次
    #[arg(long)]
    sample_every: Option<u32>,

    /// 把运行记录写入 JSON 文件，而不是打印表格
    #[arg(long)]
    dump_json: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            tick_rate_hz: self.tick_rate,
            duration_seconds: self.duration,
            log_level: self.log_level.clone(),
            sample_every: self.sample_every,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => HostConfig::load(path)
            .with_context(|| format!("无法加载配置 {}", path.display()))?,
        None => HostConfig::default(),
    }
    .with_overrides(&args.overrides());

    let level: LevelFilter = config
        .log_level
        .parse()
        .with_context(|| format!("无效的日志级别: {}", config.log_level))?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let trace = run(&config)?;

    match &args.dump_json {
        Some(path) => {
            report::dump_json(&trace, path)?;
            tracing::info!(path = %path.display(), "运行记录已写入");
        }
        None => print!("{}", report::render_table(&trace)),
    }
    Ok(())
}
