//! Running the HTML Help compiler on a saved project.

use crate::error::{MirrorError, Result};
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{info, warn};

/// What the compiler printed.
#[derive(Debug, Clone, Default)]
pub struct CompileReport {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

/// Run `compiler manifest` inside `dir`, streaming its output to the log.
///
/// The run succeeds only when the compiler exits with `success_code`.
pub async fn compile_project(
    compiler: &Path,
    success_code: i32,
    dir: &Path,
    manifest: &str,
) -> Result<CompileReport> {
    info!(compiler = %compiler.display(), manifest, "compiling project");

    let mut child = Command::new(compiler)
        .arg(manifest)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| MirrorError::compile(compiler, format!("failed to start: {e}")))?;

    let (stdout, stderr) = tokio::join!(
        forward_lines(child.stdout.take(), false),
        forward_lines(child.stderr.take(), true)
    );
    let status = child
        .wait()
        .await
        .map_err(|e| MirrorError::compile(compiler, e))?;

    let report = CompileReport {
        stdout: stdout.map_err(|e| MirrorError::compile(compiler, e))?,
        stderr: stderr.map_err(|e| MirrorError::compile(compiler, e))?,
    };

    match status.code() {
        Some(code) if code == success_code => Ok(report),
        Some(code) => Err(MirrorError::compile(compiler, format!("exit status {code}"))),
        None => Err(MirrorError::compile(compiler, "terminated by a signal")),
    }
}

async fn forward_lines<R: AsyncRead + Unpin>(
    pipe: Option<R>,
    is_stderr: bool,
) -> std::io::Result<Vec<String>> {
    let Some(pipe) = pipe else {
        return Ok(Vec::new());
    };

    let mut lines = BufReader::new(pipe).lines();
    let mut seen = Vec::new();
    while let Some(line) = lines.next_line().await? {
        if is_stderr {
            warn!(target: "help_mirror::compiler", "{line}");
        } else {
            info!(target: "help_mirror::compiler", "{line}");
        }
        seen.push(line);
    }
    Ok(seen)
}
