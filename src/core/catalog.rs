//! Axis catalogs and the target matrix.
//!
//! Each scan builds one [`AxisCatalog`] per axis from the detected names,
//! fills in the static reference list, and then takes the cross product.
//! Catalogs are plain values; nothing here is process-wide.

use std::collections::BTreeMap;

use super::record::{Provenance, Source, TargetRecord};

/// Operating systems nim is known to accept.
pub const REFERENCE_OSES: &[&str] = &[
    "dos", "windows", "os2", "linux", "morphos", "skyos", "solaris", "irix", "netbsd", "freebsd",
    "openbsd", "dragonfly", "crossos", "aix", "palmos", "qnx", "amiga", "atari", "netware",
    "macos", "macosx", "ios", "haiku", "android", "vxworks", "genode", "js", "nimvm",
    "standalone", "nintendoswitch", "freertos", "zephyr", "nuttx", "any",
];

/// CPUs nim is known to accept.
pub const REFERENCE_CPUS: &[&str] = &[
    "i386", "m68k", "alpha", "powerpc", "powerpc64", "powerpc64el", "sparc", "vm", "hppa",
    "ia64", "amd64", "mips", "mipsel", "arm", "arm64", "js", "nimvm", "avr", "msp430", "sparc64",
    "mips64", "mips64el", "riscv32", "riscv64", "esp", "wasm32", "e2k", "loongarch64",
];

/// Known names for one axis, each tagged with where it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AxisCatalog {
    entries: BTreeMap<String, Provenance>,
}

impl AxisCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        AxisCatalog::default()
    }

    /// Start a catalog from detected names.
    pub fn from_detected<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut catalog = AxisCatalog::new();
        for name in names {
            catalog.insert_detected(name.as_ref());
        }
        catalog
    }

    /// Record a detected name. Detection always wins over the reference list.
    pub fn insert_detected(&mut self, name: &str) {
        self.entries
            .insert(normalize(name), Provenance::Detected);
    }

    /// Add reference names that are not already present.
    ///
    /// Existing entries keep their tag; a detected name is never downgraded.
    pub fn merge_reference<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.entries
                .entry(normalize(name.as_ref()))
                .or_insert(Provenance::Hardcoded);
        }
    }

    /// Provenance of a name, if known.
    pub fn source_of(&self, name: &str) -> Option<Provenance> {
        self.entries.get(&normalize(name)).copied()
    }

    /// Names in lexicographic order with their provenance.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Provenance)> {
        self.entries.iter().map(|(name, tag)| (name.as_str(), *tag))
    }

    /// Number of detected entries.
    pub fn detected_count(&self) -> usize {
        self.entries
            .values()
            .filter(|tag| **tag == Provenance::Detected)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Cross product of two catalogs, sorted on (os, cpu).
pub fn build_matrix(oses: &AxisCatalog, cpus: &AxisCatalog) -> Vec<TargetRecord> {
    let mut records = Vec::with_capacity(oses.len() * cpus.len());

    for (os, os_tag) in oses.iter() {
        for (cpu, cpu_tag) in cpus.iter() {
            records.push(TargetRecord::new(os, cpu, Source::combine(os_tag, cpu_tag)));
        }
    }

    records
}

/// Merge detected names with reference lists and build the matrix.
pub fn merge<D, R>(
    detected_os: D,
    detected_cpu: D,
    reference_os: R,
    reference_cpu: R,
) -> Vec<TargetRecord>
where
    D: IntoIterator,
    D::Item: AsRef<str>,
    R: IntoIterator,
    R::Item: AsRef<str>,
{
    let mut oses = AxisCatalog::from_detected(detected_os);
    oses.merge_reference(reference_os);

    let mut cpus = AxisCatalog::from_detected(detected_cpu);
    cpus.merge_reference(reference_cpu);

    build_matrix(&oses, &cpus)
}
