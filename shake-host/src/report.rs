//! 运行记录输出：终端表格或 JSON 文件。

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;

use crate::scene::Trace;

/// 渲染为文本表格
///
/// 第一行为表头，之后每个采样一行；冻结中的行以 `*` 标记。
pub fn render_table(trace: &Trace) -> String {
    let mut out = String::new();
    let names: Vec<&String> = trace
        .frames
        .first()
        .map(|f| f.values.keys().collect())
        .unwrap_or_default();

    // 末尾空格对应数据行的冻结标记列
    let _ = write!(out, "{:>6} {:>9} {:>9} ", "step", "time", "sim");
    for name in &names {
        let _ = write!(out, " {:>width$}", name, width = column_width(name));
    }
    out.push('\n');

    for frame in &trace.frames {
        let marker = if frame.frozen { '*' } else { ' ' };
        let _ = write!(
            out,
            "{:>6} {:>9.4} {:>9.4}{marker}",
            frame.step, frame.time, frame.sim_time
        );
        for name in &names {
            let value = frame.values.get(*name).copied().unwrap_or_default();
            let _ = write!(out, " {:>width$.4}", value, width = column_width(name));
        }
        out.push('\n');
    }
    out
}

fn column_width(name: &str) -> usize {
    name.len().max(10)
}

/// 写出 JSON 运行记录
pub fn dump_json(trace: &Trace, path: &Path) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("无法创建文件 {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, trace)
        .with_context(|| format!("写入运行记录失败 {}", path.display()))?;
    writer.flush()?;
    Ok(())
}
