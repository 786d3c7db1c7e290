//! Fake renderers for export tests.
//!
//! Scripts are run through `sh` rather than executed directly so a test never
//! executes a file that another thread may still hold open for writing.

use std::path::{Path, PathBuf};

use diagen_config::ExportConfig;
use tempfile::TempDir;

use crate::renderer::Renderer;

/// Collects `-i` and `-o` values into `$input` and `$output`.
const PARSE_ARGS: &str = r#"
while [ $# -gt 0 ]; do
  case "$1" in
    -i) input="$2"; shift 2 ;;
    -o) output="$2"; shift 2 ;;
    *) shift ;;
  esac
done
"#;

/// Shell script standing in for the renderer, with its own temp root.
pub(crate) struct FakeRenderer {
    scripts: TempDir,
    temp_root: TempDir,
    script: PathBuf,
}

impl FakeRenderer {
    fn new(body: &str) -> Self {
        let scripts = TempDir::new().unwrap();
        let temp_root = TempDir::new().unwrap();
        let script = write_script(scripts.path(), "render.sh", body);
        Self {
            scripts,
            temp_root,
            script,
        }
    }

    /// Copies the input file to the output file.
    pub(crate) fn copy() -> Self {
        Self::new(&format!("{PARSE_ARGS}cp \"$input\" \"$output\"\n"))
    }

    /// Writes its own argument list to the output file.
    pub(crate) fn echo_args() -> Self {
        Self::new(&format!(
            "args=\"$*\"\n{PARSE_ARGS}printf '%s' \"$args\" > \"$output\"\n"
        ))
    }

    /// Writes `bytes` to the output file regardless of input.
    pub(crate) fn emitting(bytes: &[u8]) -> Self {
        let fake = Self::new("exit 1\n");
        let fixture = fake.scripts.path().join("fixture.bin");
        std::fs::write(&fixture, bytes).unwrap();
        write_script(
            fake.scripts.path(),
            "render.sh",
            &format!("{PARSE_ARGS}cp \"{}\" \"$output\"\n", fixture.display()),
        );
        fake
    }

    /// Prints `message` to stderr and exits non-zero.
    pub(crate) fn failing(message: &str) -> Self {
        Self::new(&format!("echo '{message}' >&2\nexit 1\n"))
    }

    /// Exits successfully without writing anything.
    pub(crate) fn silent() -> Self {
        Self::new("exit 0\n")
    }

    /// Never finishes on its own.
    pub(crate) fn hanging() -> Self {
        Self::new("exec sleep 30\n")
    }

    pub(crate) fn config(&self) -> ExportConfig {
        ExportConfig {
            renderer: "sh".to_owned(),
            renderer_args: vec![self.script.display().to_string()],
            temp_dir: Some(self.temp_root.path().to_path_buf()),
            ..ExportConfig::default()
        }
    }

    pub(crate) fn renderer(&self) -> Renderer {
        Renderer::from_config(&self.config())
    }

    pub(crate) fn temp_root(&self) -> &Path {
        self.temp_root.path()
    }

    pub(crate) fn script_dir(&self) -> &Path {
        self.scripts.path()
    }
}

/// Write a shell script into `dir`.
pub(crate) fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
}

/// Assert that `dir` contains no entries.
pub(crate) fn assert_empty(dir: &Path) {
    let leftovers: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert!(leftovers.is_empty(), "leftover temp files: {leftovers:?}");
}
