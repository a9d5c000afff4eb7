use std::path::Path;
use std::process::{Command, Output, Stdio};

use crate::foundation::error::{ReelError, ReelResult};

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    tool_responds("ffmpeg")
}

/// Return `true` when `ffprobe` can be invoked from `PATH`.
pub fn is_ffprobe_on_path() -> bool {
    tool_responds("ffprobe")
}

fn tool_responds(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Base `ffmpeg` invocation: quiet, overwrite, no stdin interaction.
pub(crate) fn ffmpeg_command() -> Command {
    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-hide_banner", "-nostdin", "-loglevel", "error", "-y"]);
    cmd
}

/// Run a fully configured command to completion, capturing stdout/stderr.
///
/// Spawn failures and non-zero exits are handed to `on_err` so each stage can attach its own
/// error kind and offending path.
pub(crate) fn run_captured(
    mut cmd: Command,
    on_err: impl FnOnce(String) -> ReelError,
) -> ReelResult<Output> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    let out = match cmd.stdin(Stdio::null()).output() {
        Ok(out) => out,
        Err(e) => {
            return Err(on_err(format!(
                "failed to run {program} (is it installed and on PATH?): {e}"
            )));
        }
    };
    if !out.status.success() {
        let stderr = String::from_utf8_lossy(&out.stderr);
        return Err(on_err(format!(
            "{program} exited with status {}: {}",
            out.status,
            stderr.trim()
        )));
    }
    Ok(out)
}

/// Format seconds the way ffmpeg time options expect.
pub(crate) fn ff_secs(secs: f64) -> String {
    format!("{secs:.6}")
}

pub(crate) fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let mut parts = s.split('/');
    let a = parts.next()?.trim().parse::<u32>().ok()?;
    let b = match parts.next() {
        Some(b) => b.trim().parse::<u32>().ok()?,
        None => 1,
    };
    if b == 0 {
        return None;
    }
    Some((a, b))
}

#[cfg(test)]
#[path = "../../tests/unit/media/ffmpeg.rs"]
mod tests;
