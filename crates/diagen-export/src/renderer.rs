//! External renderer invocation.
//!
//! Every invocation runs inside its own scratch directory that is removed
//! when the call returns, whether the renderer succeeded, failed, or was
//! killed on timeout.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use diagen_config::ExportConfig;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{info, warn};

use crate::error::ExportError;

/// Input filename inside the scratch directory.
const INPUT_FILE: &str = "diagram.mmd";

/// What the renderer should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RenderTarget {
    /// Vector output on a transparent background.
    Svg,
    /// Raster output on a white background at the given scale factor.
    Png { scale: u32 },
}

impl RenderTarget {
    fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png { .. } => "png",
        }
    }

    fn background(self) -> &'static str {
        match self {
            Self::Svg => "transparent",
            Self::Png { .. } => "white",
        }
    }
}

/// Command-line diagram renderer (mermaid-cli compatible).
#[derive(Debug, Clone)]
pub struct Renderer {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    temp_root: Option<PathBuf>,
}

impl Renderer {
    /// Create a renderer from export configuration.
    #[must_use]
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            program: config.renderer.clone(),
            args: config.renderer_args.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            temp_root: config.temp_dir.clone(),
        }
    }

    /// Replace the wall-clock bound for a single invocation.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Wall-clock bound for a single invocation.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Render `source` and return the output file's bytes.
    pub(crate) async fn render(
        &self,
        source: &str,
        target: RenderTarget,
    ) -> Result<Vec<u8>, ExportError> {
        let scratch = scratch_dir(self.temp_root.as_deref())?;
        let input = scratch.path().join(INPUT_FILE);
        let output = scratch
            .path()
            .join(format!("diagram.{}", target.extension()));
        tokio::fs::write(&input, source).await?;

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg("-i")
            .arg(&input)
            .arg("-o")
            .arg(&output)
            .arg("-b")
            .arg(target.background());
        if let RenderTarget::Png { scale } = target {
            command.arg("-s").arg(scale.to_string());
        }

        info!(
            renderer = %self.program,
            format = target.extension(),
            "Rendering diagram"
        );
        run(command, &self.program, self.timeout).await?;
        read_output(&output).await
    }

    /// Directory under which scratch directories are created.
    pub(crate) fn temp_root(&self) -> Option<&Path> {
        self.temp_root.as_deref()
    }
}

/// Create a fresh scratch directory, under `root` if given.
pub(crate) fn scratch_dir(root: Option<&Path>) -> Result<TempDir, ExportError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("diagen-");
    let dir = match root {
        Some(root) => builder.tempdir_in(root)?,
        None => builder.tempdir()?,
    };
    Ok(dir)
}

/// Run `command` to completion within `timeout`.
///
/// The child is killed if the timeout elapses. A non-zero exit status is
/// reported with the child's stderr.
pub(crate) async fn run(
    mut command: Command,
    program: &str,
    timeout: Duration,
) -> Result<(), ExportError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = command
        .spawn()
        .map_err(|e| ExportError::Render(format!("failed to start {program}: {e}")))?;

    let Ok(result) = tokio::time::timeout(timeout, child.wait_with_output()).await else {
        warn!(program, timeout_secs = timeout.as_secs_f64(), "Renderer timed out");
        return Err(ExportError::Timeout(timeout));
    };
    let output = result?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
        let message = if stderr.is_empty() {
            format!("{program} exited with {}", output.status)
        } else {
            stderr
        };
        warn!(program, status = %output.status, "Renderer failed");
        return Err(ExportError::Render(message));
    }
    Ok(())
}

/// Read a file the child was expected to write.
pub(crate) async fn read_output(path: &Path) -> Result<Vec<u8>, ExportError> {
    match tokio::fs::read(path).await {
        Ok(bytes) if !bytes.is_empty() => Ok(bytes),
        Ok(_) => Err(ExportError::Render("no output".to_owned())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ExportError::Render("no output".to_owned()))
        }
        Err(e) => Err(e.into()),
    }
}
