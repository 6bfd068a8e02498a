//! Test utilities for scanner unit tests.
//!
//! Provides [`MockToolchain`], a programmable stand-in for the nim compiler
//! that implements [`Toolchain`] without spawning processes.
//!
//! # Example
//!
//! ```rust,ignore
//! use nim_targets::test_support::{MockResponse, MockToolchain};
//!
//! #[test]
//! fn test_example() {
//!     let nim = MockToolchain::new();
//!     nim.respond("--version", MockResponse::success("Nim Compiler v2.0.0"));
//!     nim.respond_prefix("--os:linux", MockResponse::success(""));
//!
//!     // Pass `&nim` wherever a `&dyn Toolchain` is expected...
//! }
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use crate::toolchain::{ToolOutput, Toolchain};
use crate::util::errors::ProbeError;

/// What a mocked invocation does.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Exit with a code and combined output.
    Exit { code: i32, text: String },
    /// Run past any timeout.
    Timeout,
    /// Fail to start, as if the program were missing.
    SpawnFailure,
}

/// Canned response for a mocked invocation.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub behavior: MockBehavior,
    /// Simulated run time before the response is produced.
    pub delay: Duration,
}

impl MockResponse {
    /// Exit zero with the given output.
    pub fn success(text: impl Into<String>) -> Self {
        MockResponse::exit(0, text)
    }

    /// Exit with `code` and the given output.
    pub fn exit(code: i32, text: impl Into<String>) -> Self {
        MockResponse {
            behavior: MockBehavior::Exit {
                code,
                text: text.into(),
            },
            delay: Duration::ZERO,
        }
    }

    pub fn timeout() -> Self {
        MockResponse {
            behavior: MockBehavior::Timeout,
            delay: Duration::ZERO,
        }
    }

    pub fn spawn_failure() -> Self {
        MockResponse {
            behavior: MockBehavior::SpawnFailure,
            delay: Duration::ZERO,
        }
    }

    /// Take `delay` to respond. A delay longer than the caller's timeout
    /// turns into a timeout.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Pattern for matching invocations in [`MockToolchain`].
#[derive(Debug, Clone)]
enum ArgsPattern {
    /// Exact match on the space-joined arguments.
    Exact(String),
    /// Match if the joined arguments start with a prefix.
    StartsWith(String),
}

impl ArgsPattern {
    fn matches(&self, args: &str) -> bool {
        match self {
            ArgsPattern::Exact(s) => args == s,
            ArgsPattern::StartsWith(s) => args.starts_with(s.as_str()),
        }
    }
}

/// Mock toolchain.
///
/// Responses are matched against the space-joined argument list in the
/// order they were registered. Unmatched invocations use the default
/// response, which is a spawn failure unless changed. Every invocation is
/// recorded, and the peak number of concurrent invocations is tracked.
#[derive(Debug)]
pub struct MockToolchain {
    responses: Mutex<Vec<(ArgsPattern, MockResponse)>>,
    default: Mutex<MockResponse>,
    calls: Mutex<Vec<String>>,
    stdin: Mutex<Vec<Vec<u8>>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockToolchain {
    /// A toolchain with no responses; unmatched calls fail to spawn.
    pub fn new() -> Self {
        MockToolchain {
            responses: Mutex::new(Vec::new()),
            default: Mutex::new(MockResponse::spawn_failure()),
            calls: Mutex::new(Vec::new()),
            stdin: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// A toolchain that is not installed.
    pub fn unavailable() -> Self {
        MockToolchain::new()
    }

    /// A toolchain that answers `--version` and compiles anything cleanly.
    pub fn accepting_everything() -> Self {
        let nim = MockToolchain::new();
        nim.respond("--version", MockResponse::success("Nim Compiler v2.0.0"));
        nim.set_default(MockResponse::success(""));
        nim
    }

    /// Respond to an exact argument list.
    pub fn respond(&self, args: &str, response: MockResponse) -> &Self {
        self.push(ArgsPattern::Exact(args.to_string()), response)
    }

    /// Respond to any argument list starting with `prefix`.
    pub fn respond_prefix(&self, prefix: &str, response: MockResponse) -> &Self {
        self.push(ArgsPattern::StartsWith(prefix.to_string()), response)
    }

    /// Response for invocations that match nothing.
    pub fn set_default(&self, response: MockResponse) -> &Self {
        *self.default.lock().unwrap() = response;
        self
    }

    fn push(&self, pattern: ArgsPattern, response: MockResponse) -> &Self {
        self.responses.lock().unwrap().push((pattern, response));
        self
    }

    /// All invocations so far, as space-joined argument lists.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Stdin payloads received so far.
    pub fn stdin_payloads(&self) -> Vec<Vec<u8>> {
        self.stdin.lock().unwrap().clone()
    }

    /// Highest number of invocations that were running at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn lookup(&self, args: &str) -> MockResponse {
        self.responses
            .lock()
            .unwrap()
            .iter()
            .find(|(pattern, _)| pattern.matches(args))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| self.default.lock().unwrap().clone())
    }
}

impl Default for MockToolchain {
    fn default() -> Self {
        MockToolchain::new()
    }
}

impl Toolchain for MockToolchain {
    fn run(
        &self,
        args: &[String],
        stdin: Option<&[u8]>,
        timeout: Duration,
    ) -> Result<ToolOutput, ProbeError> {
        let joined = args.join(" ");
        let command = format!("nim {}", joined);
        self.calls.lock().unwrap().push(joined.clone());
        if let Some(data) = stdin {
            self.stdin.lock().unwrap().push(data.to_vec());
        }

        let response = self.lookup(&joined);

        if let MockBehavior::SpawnFailure = response.behavior {
            return Err(ProbeError::Spawn {
                command,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "mock: not installed"),
            });
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let timed_out = matches!(response.behavior, MockBehavior::Timeout)
            || response.delay > timeout;
        thread::sleep(if timed_out {
            timeout.min(response.delay.max(Duration::from_millis(1)))
        } else {
            response.delay
        });

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match response.behavior {
            MockBehavior::Exit { code, text } if !timed_out => {
                Ok(ToolOutput::new(Some(code), text))
            }
            _ => Err(ProbeError::Timeout { command, timeout }),
        }
    }

    fn display_name(&self) -> String {
        "nim".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &str) -> Vec<String> {
        s.split(' ').map(str::to_string).collect()
    }

    #[test]
    fn test_exact_and_prefix_matching() {
        let nim = MockToolchain::new();
        nim.respond("--version", MockResponse::success("v2"));
        nim.respond_prefix("--os:linux", MockResponse::exit(1, "error: nope"));

        let out = nim.run(&args("--version"), None, Duration::from_secs(1)).unwrap();
        assert_eq!(out, ToolOutput::new(Some(0), "v2"));

        let out = nim
            .run(&args("--os:linux --cpu:arm -"), None, Duration::from_secs(1))
            .unwrap();
        assert_eq!(out.exit_code, Some(1));

        assert_eq!(nim.calls(), ["--version", "--os:linux --cpu:arm -"]);
    }

    #[test]
    fn test_unmatched_call_fails_to_spawn() {
        let nim = MockToolchain::unavailable();
        let err = nim.run(&args("--help"), None, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ProbeError::Spawn { .. }));
    }

    #[test]
    fn test_delay_beyond_timeout_times_out() {
        let nim = MockToolchain::new();
        nim.set_default(MockResponse::success("").with_delay(Duration::from_secs(10)));

        let err = nim
            .run(&args("--os:linux"), None, Duration::from_millis(20))
            .unwrap_err();
        assert!(matches!(err, ProbeError::Timeout { .. }));
    }

    #[test]
    fn test_records_stdin() {
        let nim = MockToolchain::accepting_everything();
        nim.run(&args("-"), Some(b"echo 1".as_slice()), Duration::from_secs(1))
            .unwrap();

        assert_eq!(nim.stdin_payloads(), [b"echo 1".to_vec()]);
    }
}
