//! Toolchain abstraction.
//!
//! The nim compiler is treated as a black box: the scanner only ever sees
//! the exit code and the combined stdout+stderr of an invocation. Everything
//! that talks to the compiler goes through the [`Toolchain`] trait so the
//! pipeline can be driven by a mock in tests.
//!
//! Program resolution priority:
//! 1. `--nim <path>` / `nim = "..."` in the config file
//! 2. `NIM` environment variable
//! 3. `nim` on PATH

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::util::errors::ProbeError;
use crate::util::process::{combined_output, find_executable, ProcessBuilder};

mod probe;

pub use probe::{detection_invocations, is_available, probe};

/// Result of a finished toolchain invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` if the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Stdout followed by stderr.
    pub text: String,
}

impl ToolOutput {
    pub fn new(exit_code: Option<i32>, text: impl Into<String>) -> Self {
        ToolOutput {
            exit_code,
            text: text.into(),
        }
    }

    /// Whether the process exited with status zero.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Something that can run toolchain invocations.
///
/// Implementations must be shareable across verification workers.
pub trait Toolchain: Send + Sync {
    /// Run the toolchain with `args`, optionally feeding `stdin`, and wait at
    /// most `timeout` for it to finish.
    ///
    /// A non-zero exit is returned as a normal [`ToolOutput`]; only failures
    /// to run or finish the process are errors.
    fn run(
        &self,
        args: &[String],
        stdin: Option<&[u8]>,
        timeout: Duration,
    ) -> Result<ToolOutput, ProbeError>;

    /// Human-readable command prefix for log messages.
    fn display_name(&self) -> String;
}

/// The real nim compiler, run as a subprocess.
#[derive(Debug, Clone)]
pub struct NimToolchain {
    program: PathBuf,
}

impl NimToolchain {
    /// Use `program` as given, resolving bare names through PATH.
    pub fn new(program: impl AsRef<Path>) -> Self {
        NimToolchain {
            program: resolve_program(program.as_ref()),
        }
    }
}

impl Toolchain for NimToolchain {
    fn run(
        &self,
        args: &[String],
        stdin: Option<&[u8]>,
        timeout: Duration,
    ) -> Result<ToolOutput, ProbeError> {
        let mut cmd = ProcessBuilder::new(&self.program).args(args);
        if let Some(data) = stdin {
            cmd = cmd.stdin(data);
        }

        tracing::trace!("running `{}`", cmd.display_command());
        let output = cmd.exec_with_timeout(timeout)?;

        Ok(ToolOutput::new(
            output.status.code(),
            combined_output(&output),
        ))
    }

    fn display_name(&self) -> String {
        self.program.display().to_string()
    }
}

/// Resolve a bare program name through PATH.
///
/// Explicit paths are returned unchanged. A bare name that is not on PATH is
/// also returned unchanged; spawning it fails later and the scan degrades to
/// hardcoded-only mode.
fn resolve_program(program: &Path) -> PathBuf {
    let is_bare = program.components().count() == 1 && !program.is_absolute();
    if !is_bare {
        return program.to_path_buf();
    }

    program
        .to_str()
        .and_then(find_executable)
        .unwrap_or_else(|| program.to_path_buf())
}
