//! Target records and the axes they are built from.

use std::fmt;

use serde::Serialize;

/// One of the two independent target dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Operating system (`--os:`)
    Os,
    /// Processor architecture (`--cpu:`)
    Cpu,
}

impl Axis {
    /// The name nim uses for this axis on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Os => "os",
            Axis::Cpu => "cpu",
        }
    }

    /// Render the `--os:name` / `--cpu:name` flag for a value.
    pub fn flag(&self, value: &str) -> String {
        format!("--{}:{}", self.as_str(), value)
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a single axis name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    /// Extracted from live toolchain output.
    Detected,
    /// Taken from the static reference list.
    Hardcoded,
}

/// Where an (os, cpu) pair came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Both names were detected.
    Detected,
    /// Neither name was detected.
    Hardcoded,
    /// Exactly one name was detected.
    Mixed,
}

impl Source {
    /// Combine the provenance of the two axis entries of a pair.
    pub fn combine(os: Provenance, cpu: Provenance) -> Self {
        match (os, cpu) {
            (Provenance::Detected, Provenance::Detected) => Source::Detected,
            (Provenance::Hardcoded, Provenance::Hardcoded) => Source::Hardcoded,
            _ => Source::Mixed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Detected => "detected",
            Source::Hardcoded => "hardcoded",
            Source::Mixed => "mixed",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single (os, cpu) pair in the target matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetRecord {
    pub os: String,
    pub cpu: String,
    /// Only ever set by a successful verification compile.
    pub verified: bool,
    pub source: Source,
    /// How a user would select this target; informational only.
    pub command: String,
}

impl TargetRecord {
    /// Create an unverified record for a pair.
    pub fn new(os: impl Into<String>, cpu: impl Into<String>, source: Source) -> Self {
        let os = os.into();
        let cpu = cpu.into();
        let command = invocation_hint(&os, &cpu);
        TargetRecord {
            os,
            cpu,
            verified: false,
            source,
            command,
        }
    }
}

/// The two-flag command line that selects a target.
pub fn invocation_hint(os: &str, cpu: &str) -> String {
    format!("nim {} {}", Axis::Os.flag(os), Axis::Cpu.flag(cpu))
}
