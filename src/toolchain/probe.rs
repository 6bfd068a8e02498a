//! Availability check and the detection probe orchestrator.

use crate::core::Axis;
use crate::extract::extract;
use crate::util::config::{AVAILABILITY_TIMEOUT, DETECTION_TIMEOUT};

use super::Toolchain;

/// Whether the toolchain responds to `--version` with a zero exit.
pub fn is_available(toolchain: &dyn Toolchain) -> bool {
    match toolchain.run(&["--version".to_string()], None, AVAILABILITY_TIMEOUT) {
        Ok(output) => output.success(),
        Err(e) => {
            tracing::debug!("availability check failed: {}", e);
            false
        }
    }
}

/// Invocations tried for `axis`, most targeted first.
///
/// A bad `--os:`/`--cpu:` value makes nim print the accepted values, so those
/// come first; general help, version output and a dump follow.
pub fn detection_invocations(axis: Axis) -> Vec<Vec<String>> {
    let targeted = |value: &str| vec![axis.flag(value), "c".to_string()];

    vec![
        targeted("invalid"),
        targeted("help"),
        targeted("?"),
        plain(&["--help"]),
        plain(&["-h"]),
        plain(&["help"]),
        plain(&["--version"]),
        plain(&["-v"]),
        plain(&["dump", "--dump.format:json", "dummy"]),
    ]
}

fn plain(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}

/// Detect target names for `axis` from toolchain output.
///
/// Invocations run in order and the first one whose output yields any
/// names wins; later, noisier sources never override it. A failing
/// invocation (timeout, spawn error, empty output) falls through to the
/// next. Returns an empty list when every variant is exhausted.
pub fn probe(toolchain: &dyn Toolchain, axis: Axis) -> Vec<String> {
    for args in detection_invocations(axis) {
        let command = format!("{} {}", toolchain.display_name(), args.join(" "));

        let output = match toolchain.run(&args, None, DETECTION_TIMEOUT) {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!("detection invocation failed: {}", e);
                continue;
            }
        };

        // Usage text often comes with a non-zero exit; only a silent failure
        // is skipped.
        if !output.success() && output.text.is_empty() {
            continue;
        }

        let names = extract(&output.text, axis);
        if !names.is_empty() {
            tracing::info!(
                "Found {} {} targets using `{}`",
                names.len(),
                axis,
                command
            );
            return names;
        }
        tracing::debug!("no {} targets in output of `{}`", axis, command);
    }

    Vec::new()
}
