//! Subprocess execution utilities.

use std::ffi::OsStr;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crate::util::errors::ProbeError;

/// How often a running child is polled for exit while a timeout is pending.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    stdin: Option<Vec<u8>>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            stdin: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set stdin data.
    pub fn stdin(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(data.into());
        self
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.stdin(if self.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        // Own process group, so a timeout can take down helpers the child
        // spawned along with the child itself.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        cmd
    }

    /// Execute the command, killing it if it runs longer than `timeout`.
    ///
    /// A non-zero exit status is not an error here; callers decide what the
    /// status means. Stdout and stderr are drained on background threads so a
    /// chatty child cannot block on a full pipe while we wait for it.
    ///
    /// The deadline covers the whole run, including collecting output: a
    /// child that exits but leaves a background process holding its pipes
    /// open still times out.
    pub fn exec_with_timeout(&self, timeout: Duration) -> Result<Output, ProbeError> {
        let mut child = self
            .build_command()
            .spawn()
            .map_err(|source| ProbeError::Spawn {
                command: self.display_command(),
                source,
            })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        // Stdin is fed from its own thread; a child that never reads it must
        // still be subject to the timeout.
        if let (Some(data), Some(mut pipe)) = (self.stdin.clone(), child.stdin.take()) {
            thread::spawn(move || {
                let _ = pipe.write_all(&data);
            });
        }

        let deadline = Instant::now() + timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    kill(&mut child);
                    return Err(self.timed_out(timeout));
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(source) => {
                    kill(&mut child);
                    return Err(ProbeError::Io {
                        command: self.display_command(),
                        source,
                    });
                }
            }
        };

        match (collect(stdout, deadline), collect(stderr, deadline)) {
            (Some(stdout), Some(stderr)) => Ok(Output {
                status,
                stdout,
                stderr,
            }),
            _ => {
                // Reader threads are left behind; they finish once the
                // killed group releases the pipes.
                kill(&mut child);
                Err(self.timed_out(timeout))
            }
        }
    }

    /// Display the command for log and error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }

    fn timed_out(&self, timeout: Duration) -> ProbeError {
        ProbeError::Timeout {
            command: self.display_command(),
            timeout,
        }
    }
}

fn drain<R>(pipe: Option<R>) -> Option<Receiver<Vec<u8>>>
where
    R: Read + Send + 'static,
{
    pipe.map(|mut pipe| {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            let _ = tx.send(buf);
        });
        rx
    })
}

/// Wait until `deadline` for a drained pipe. `None` if it is still open.
fn collect(rx: Option<Receiver<Vec<u8>>>, deadline: Instant) -> Option<Vec<u8>> {
    let Some(rx) = rx else {
        return Some(Vec::new());
    };
    match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(buf) => Some(buf),
        Err(RecvTimeoutError::Timeout) => None,
        Err(RecvTimeoutError::Disconnected) => Some(Vec::new()),
    }
}

/// Kill the child and everything left in its process group.
fn kill(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        let _ = killpg(Pid::from_raw(child.id() as i32), Signal::SIGKILL);
    }
    let _ = child.kill();
    let _ = child.wait();
}

/// Combine stdout and stderr of a finished process into one lossy string.
pub fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    if !output.stderr.is_empty() {
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&String::from_utf8_lossy(&output.stderr));
    }
    text
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_command() {
        let pb = ProcessBuilder::new("nim").args(["--os:linux", "--cpu:amd64", "-"]);

        assert_eq!(pb.display_command(), "nim --os:linux --cpu:amd64 -");
    }

    #[test]
    fn test_spawn_failure_is_reported() {
        let err = ProcessBuilder::new("definitely-not-a-real-program-xyz")
            .exec_with_timeout(Duration::from_secs(1))
            .unwrap_err();

        assert!(matches!(err, ProbeError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_exec_captures_output() {
        let output = ProcessBuilder::new("echo")
            .arg("hello")
            .exec_with_timeout(Duration::from_secs(5))
            .unwrap();

        assert!(output.status.success());
        assert!(combined_output(&output).contains("hello"));
    }

    #[cfg(unix)]
    #[test]
    fn test_exec_feeds_stdin() {
        let output = ProcessBuilder::new("cat")
            .stdin("echo \"Hello, World!\"")
            .exec_with_timeout(Duration::from_secs(5))
            .unwrap();

        assert_eq!(
            String::from_utf8_lossy(&output.stdout),
            "echo \"Hello, World!\""
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_exec_times_out() {
        let start = Instant::now();
        let err = ProcessBuilder::new("sleep")
            .arg("5")
            .exec_with_timeout(Duration::from_millis(100))
            .unwrap_err();

        assert!(matches!(err, ProbeError::Timeout { .. }));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_background_holding_pipes_times_out() {
        let start = Instant::now();
        let err = ProcessBuilder::new("sh")
            .args(["-c", "sleep 3 & exit 0"])
            .exec_with_timeout(Duration::from_millis(100))
            .unwrap_err();

        assert!(matches!(err, ProbeError::Timeout { .. }));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_whole_process_group() {
        let tmp = tempfile::TempDir::new().unwrap();
        let marker = tmp.path().join("survived");
        let script = format!("(sleep 1; touch '{}') & exec sleep 5", marker.display());

        let err = ProcessBuilder::new("sh")
            .args(["-c", script.as_str()])
            .exec_with_timeout(Duration::from_millis(100))
            .unwrap_err();
        assert!(matches!(err, ProbeError::Timeout { .. }));

        thread::sleep(Duration::from_millis(1500));
        assert!(!marker.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_quick_background_helper_is_collected() {
        // Helper finishes well inside the deadline, so output is complete
        let output = ProcessBuilder::new("sh")
            .args(["-c", "(sleep 1; echo late) & echo early"])
            .exec_with_timeout(Duration::from_secs(5))
            .unwrap();

        let text = combined_output(&output);
        assert!(text.contains("early"));
        assert!(text.contains("late"));
    }

    #[test]
    fn test_combined_output_joins_streams() {
        #[cfg(unix)]
        use std::os::unix::process::ExitStatusExt;
        #[cfg(windows)]
        use std::os::windows::process::ExitStatusExt;

        let output = Output {
            status: std::process::ExitStatus::from_raw(0),
            stdout: b"out".to_vec(),
            stderr: b"err".to_vec(),
        };

        assert_eq!(combined_output(&output), "out\nerr");
    }
}
