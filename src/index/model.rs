use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::repo::control::PackageRecord;
use crate::repo::scan::Coordinate;
use crate::repo::version::compare_versions;

/// version string -> record
pub type VersionMap = HashMap<String, PackageRecord>;
/// package name -> version string -> record
pub type PackageVersions = HashMap<String, VersionMap>;

/// release -> distribution -> architecture -> one metadata file's packages.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct DistIndex {
    releases: HashMap<String, ReleaseSlice>,
}

#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct ReleaseSlice {
    distributions: HashMap<String, DistributionSlice>,
}

#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct DistributionSlice {
    architectures: HashMap<String, ArchSlot>,
}

/// Contents of a single metadata file, keyed by package name. The last
/// record for a given name within the file wins.
#[derive(Debug, Serialize)]
pub struct ArchSlot {
    pub file: String,
    pub packages: HashMap<String, PackageRecord>,
}

impl DistIndex {
    pub fn release(&self, name: &str) -> Option<&ReleaseSlice> {
        self.releases.get(name)
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    pub(crate) fn slot(&mut self, coordinate: &Coordinate) -> &mut ArchSlot {
        self.releases
            .entry(coordinate.release.clone())
            .or_default()
            .distributions
            .entry(coordinate.distribution.clone())
            .or_default()
            .architectures
            .entry(coordinate.architecture.clone())
            .or_insert_with(|| ArchSlot {
                file: coordinate.file.clone(),
                packages: HashMap::new(),
            })
    }
}

impl ReleaseSlice {
    pub fn distribution(&self, name: &str) -> Option<&DistributionSlice> {
        self.distributions.get(name)
    }
}

impl DistributionSlice {
    pub fn architecture(&self, name: &str) -> Option<&ArchSlot> {
        self.architectures.get(name)
    }
}

/// architecture -> package -> version -> record, across all metadata files.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct ArchIndex {
    architectures: HashMap<String, PackageVersions>,
}

impl ArchIndex {
    pub fn architecture(&self, name: &str) -> Option<&PackageVersions> {
        self.architectures.get(name)
    }

    pub fn len(&self) -> usize {
        self.architectures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.architectures.is_empty()
    }

    pub(crate) fn insert(
        &mut self,
        architecture: &str,
        package: &str,
        version: &str,
        record: &PackageRecord,
    ) {
        self.architectures
            .entry(architecture.to_string())
            .or_default()
            .entry(package.to_string())
            .or_default()
            .insert(version.to_string(), record.clone());
    }
}

/// package -> version -> record, architecture-independent.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct PackageIndex {
    packages: PackageVersions,
}

impl PackageIndex {
    pub fn versions(&self, package: &str) -> Option<&VersionMap> {
        self.packages.get(package)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub(crate) fn insert(&mut self, package: &str, version: &str, record: &PackageRecord) {
        self.packages
            .entry(package.to_string())
            .or_default()
            .insert(version.to_string(), record.clone());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatestEntry {
    pub version: String,
    pub info: String,
    pub deb: String,
}

/// package -> the single highest-versioned record seen for it.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct LatestVersionIndex {
    packages: HashMap<String, LatestEntry>,
}

impl LatestVersionIndex {
    pub fn entry(&self, package: &str) -> Option<&LatestEntry> {
        self.packages.get(package)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// The candidate only advances on a strictly newer version; among equal
    /// versions the record seen first is kept.
    pub(crate) fn offer(&mut self, package: &str, candidate: LatestEntry) {
        match self.packages.get_mut(package) {
            None => {
                self.packages.insert(package.to_string(), candidate);
            }
            Some(current) => {
                if compare_versions(&current.version, &candidate.version) == Ordering::Less {
                    *current = candidate;
                }
            }
        }
    }
}

/// The finished, immutable result of one index build. Constructed once at
/// startup and shared read-only with the serving layer.
#[derive(Debug)]
pub struct IndexSnapshot {
    pub dist: DistIndex,
    pub arch: ArchIndex,
    pub packages: PackageIndex,
    pub latest: LatestVersionIndex,
    pub built_at: DateTime<Utc>,
    pub source_files: usize,
}

impl IndexSnapshot {
    /// All known versions of one package, or the whole package index.
    pub fn query_packages(&self, package: Option<&str>) -> Value {
        match package {
            Some(name) => match self.packages.versions(name) {
                Some(versions) => to_json(versions),
                None => json!({}),
            },
            None => to_json(&self.packages),
        }
    }

    /// The dist-index subtree under any prefix of (release, distribution,
    /// architecture). Unknown segments resolve to an empty object.
    pub fn query_dist(
        &self,
        release: Option<&str>,
        distribution: Option<&str>,
        architecture: Option<&str>,
    ) -> Value {
        let Some(release) = release else {
            return json!({});
        };
        let Some(slice) = self.dist.release(release) else {
            return json!({});
        };
        let Some(distribution) = distribution else {
            return to_json(slice);
        };
        let Some(slice) = slice.distribution(distribution) else {
            return json!({});
        };
        let Some(architecture) = architecture else {
            return to_json(slice);
        };
        match slice.architecture(architecture) {
            Some(slot) => to_json(slot),
            None => json!({}),
        }
    }

    /// All packages known for one architecture, or the whole arch index.
    pub fn query_arch(&self, architecture: Option<&str>) -> Value {
        match architecture {
            Some(name) => match self.arch.architecture(name) {
                Some(packages) => to_json(packages),
                None => json!({}),
            },
            None => to_json(&self.arch),
        }
    }

    /// The latest-version entry for one package, or the whole index.
    pub fn query_latest(&self, package: Option<&str>) -> Value {
        match package {
            Some(name) => match self.latest.entry(name) {
                Some(entry) => json!({
                    "current_version": entry.version,
                    "info_url": entry.info,
                    "deb_url": entry.deb,
                }),
                None => json!({}),
            },
            None => to_json(&self.latest),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|_| json!({}))
}
