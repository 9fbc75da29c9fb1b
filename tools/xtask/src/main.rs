//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-runtime`: 运行 shake-runtime 覆盖率
//! - `cov-workspace`: 运行 workspace 覆盖率
//! - `scene-check`: 检查场景文件（JSON 结构、引用关系、属性绑定）

use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use shake_host::{HostConfig, Scene};
use walkdir::WalkDir;

fn run(step: &str, cmd: &mut Command) -> anyhow::Result<()> {
    eprintln!("\n==> {step}");
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("{step} failed with {status}");
    }
    Ok(())
}

fn cargo(args: &[&str]) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(args);
    cmd
}

fn ensure_cargo_llvm_cov_available() -> anyhow::Result<()> {
    match cargo(&["llvm-cov", "--version"]).status() {
        Ok(s) if s.success() => Ok(()),
        _ => anyhow::bail!(
            "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
        ),
    }
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let sub = args.next().unwrap_or_else(|| "help".to_string());

    match sub.as_str() {
        "check-all" => {
            for step in [
                &["fmt", "--all", "--", "--check"][..],
                &["clippy", "--workspace", "--all-targets"][..],
                &["test", "--workspace"][..],
            ] {
                run(&format!("cargo {}", step.join(" ")), &mut cargo(step))?;
            }
        }
        "cov-runtime" => {
            ensure_cargo_llvm_cov_available()?;

            let step = ["llvm-cov", "-p", "shake-runtime", "--html"];
            run(&format!("cargo {}", step.join(" ")), &mut cargo(&step))?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "cov-workspace" => {
            ensure_cargo_llvm_cov_available()?;

            // 排除 xtask，避免稀释信号
            let step = ["llvm-cov", "--workspace", "--exclude", "xtask", "--html"];
            run(&format!("cargo {}", step.join(" ")), &mut cargo(&step))?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "scene-check" => {
            let path = args.next();
            scene_check(path.as_deref())?;
        }
        "help" | "-h" | "--help" => {
            print_help();
        }
        other => anyhow::bail!("unknown xtask subcommand: {other}"),
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        r#"xtask - 开发辅助工具

USAGE:
  cargo xtask <command>

COMMANDS:
  check-all       运行 fmt、clippy、test 门禁检查
  cov-runtime     运行 shake-runtime 覆盖率报告
  cov-workspace   运行 workspace 覆盖率报告
  scene-check     检查场景文件

SCENE-CHECK:
  cargo xtask scene-check [path]

  不带参数：检查 scenes/ 下所有 .json 文件
  带路径参数：检查指定文件或目录

  检查内容：
    - JSON 结构与曲线关键帧
    - 时间线引用的反馈是否存在、名称是否重复
    - 震动器/自动对焦绑定的参数是否存在
"#
    );
}

//=============================================================================
// scene-check 命令实现
//=============================================================================

/// 默认场景目录（相对于 workspace root）
const SCENES_DIR: &str = "scenes";

/// 执行场景检查
fn scene_check(path: Option<&str>) -> anyhow::Result<()> {
    let files = match path {
        Some(p) => {
            let path = PathBuf::from(p);
            if path.is_file() {
                vec![path]
            } else if path.is_dir() {
                collect_scene_files(&path)
            } else {
                anyhow::bail!("路径不存在: {}", p);
            }
        }
        None => {
            let dir = Path::new(SCENES_DIR);
            if !dir.exists() {
                anyhow::bail!(
                    "默认场景目录不存在: {}\n请在 workspace 根目录运行，或指定场景路径",
                    dir.display()
                );
            }
            collect_scene_files(dir)
        }
    };

    if files.is_empty() {
        eprintln!("未找到场景文件（.json）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个场景文件...\n", files.len());

    let mut errors = 0;
    for file in &files {
        if let Err(e) = check_scene_file(file) {
            eprintln!("[ERROR] {}: {e:#}", file.display());
            errors += 1;
        }
    }

    eprintln!("─────────────────────────────────────────────────────");
    eprintln!("检查完成: {} 个场景", files.len());
    if errors > 0 {
        eprintln!("❌ {} 个错误", errors);
        anyhow::bail!("场景检查发现错误");
    }
    eprintln!("✅ 检查通过，无错误");
    Ok(())
}

/// 收集目录下的所有场景文件
fn collect_scene_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

/// 检查单个场景文件：解析、校验并实际装配一次
fn check_scene_file(file: &Path) -> anyhow::Result<()> {
    let config = HostConfig::load(file)?;
    config.validate()?;
    let scene = Scene::build(&config.scene)?;
    eprintln!(
        "[OK] {}: {} 个参数, {} 个震动器, {} 条时间线",
        file.display(),
        scene.table().len(),
        scene.shakers().len(),
        config.scene.timeline.len()
    );
    Ok(())
}
