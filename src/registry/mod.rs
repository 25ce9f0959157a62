// Mission registry — name resolution over the static kernel source tables.

pub mod tables;

use crate::error::{Error, Result};

/// Where a mission's ephemeris data comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelSource {
    /// No mission-specific kernels configured; coverage, if any, comes
    /// from the generic planetary ephemeris.
    Generic,
    /// A fixed set of kernel files. Most missions have one; a few carry
    /// several (HELIOS_1 ships two trajectory arcs).
    SingleFile { files: Vec<KernelFile> },
    /// Coverage spans many files indexed by a bundled segment manifest.
    Segmented { manifest: &'static str },
}

/// One kernel file and the ordered candidate URLs that serve it. The
/// downloader walks the list in order; adding a mirror is a data edit in
/// `tables`, not a code change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelFile {
    pub name: String,
    pub urls: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MissionDescriptor {
    /// Canonical key, e.g. "PSP" or "VOYAGER_1".
    pub key: String,
    /// NAIF integer id. Negative ids are spacecraft, positive are bodies.
    pub naif_id: i32,
    pub aliases: Vec<String>,
    pub kernels: KernelSource,
}

impl MissionDescriptor {
    pub fn has_kernels(&self) -> bool {
        !matches!(self.kernels, KernelSource::Generic)
    }

    pub fn is_segmented(&self) -> bool {
        matches!(self.kernels, KernelSource::Segmented { .. })
    }

    pub fn is_spacecraft(&self) -> bool {
        self.naif_id < 0
    }
}

/// Static mission table with case-insensitive, alias-aware lookup. Also
/// owns the ordered generic kernel set every query needs.
pub struct MissionRegistry {
    missions: Vec<MissionDescriptor>,
    generic: Vec<KernelFile>,
}

impl MissionRegistry {
    pub fn new(missions: Vec<MissionDescriptor>) -> Self {
        Self {
            missions,
            generic: tables::generic_kernels(),
        }
    }

    /// The full builtin mission set.
    pub fn builtin() -> Self {
        Self::new(tables::builtin_missions())
    }

    /// Replace the generic kernel set (ordered; leapseconds first).
    pub fn with_generic(mut self, generic: Vec<KernelFile>) -> Self {
        self.generic = generic;
        self
    }

    /// All descriptors in stable registration order.
    pub fn list(&self) -> &[MissionDescriptor] {
        &self.missions
    }

    /// The ordered mission-independent kernel set.
    pub fn generic_kernels(&self) -> &[KernelFile] {
        &self.generic
    }

    /// Resolve a mission or body name to its descriptor.
    ///
    /// Tries the normalized key, then each alias, then a compact form with
    /// underscores and whitespace stripped, so "psp", "Parker Solar Probe",
    /// "STEREO-A", and "Voyager 1" all land on their canonical entries.
    pub fn resolve(&self, name: &str) -> Result<&MissionDescriptor> {
        let norm = normalize(name);

        if let Some(m) = self.missions.iter().find(|m| m.key == norm) {
            return Ok(m);
        }

        if let Some(m) = self
            .missions
            .iter()
            .find(|m| m.aliases.iter().any(|a| normalize(a) == norm))
        {
            return Ok(m);
        }

        let wanted = compact(&norm);
        if let Some(m) = self.missions.iter().find(|m| {
            compact(&m.key) == wanted
                || m.aliases.iter().any(|a| compact(&normalize(a)) == wanted)
        }) {
            return Ok(m);
        }

        Err(Error::UnknownMission {
            name: name.to_string(),
        })
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_uppercase().replace('-', "_")
}

fn compact(key: &str) -> String {
    key.chars().filter(|c| !matches!(c, '_' | ' ')).collect()
}
