use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Exact name of the per-architecture metadata file, matched case-sensitively.
pub const PACKAGES_FILE: &str = "Packages";

const BINARY_PREFIX: &str = "binary-";

/// Where a metadata file sits in the release/distribution/architecture tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinate {
    pub release: String,
    pub distribution: String,
    pub architecture: String,
    /// Path of the metadata file relative to the repository root.
    pub file: String,
}

#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    /// None when the file does not sit exactly four segments below the root
    /// (e.g. a debian-installer subtree); such files stay out of the dist
    /// index but their records still feed the other indices.
    pub coordinate: Option<Coordinate>,
}

/// Collects every metadata file beneath `root`. A missing root yields an
/// empty list so the service degrades to "no packages" instead of failing.
pub fn scan_repository(root: &Path) -> Vec<ScannedFile> {
    if !root.is_dir() {
        warn!(
            "Repository root {} is missing or not a directory, index will be empty",
            root.display()
        );
        return Vec::new();
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };

        if entry.file_type().is_file() && entry.file_name() == OsStr::new(PACKAGES_FILE) {
            let path = entry.into_path();
            let coordinate = decode_coordinate(root, &path);
            files.push(ScannedFile { path, coordinate });
        }
    }

    info!("Found {} metadata files under {}", files.len(), root.display());
    files
}

fn decode_coordinate(root: &Path, path: &Path) -> Option<Coordinate> {
    let relative = path.strip_prefix(root).ok()?;

    let mut segments = Vec::new();
    for component in relative.components() {
        segments.push(component.as_os_str().to_str()?);
    }

    if segments.len() != 4 {
        return None;
    }

    let architecture = segments[2]
        .strip_prefix(BINARY_PREFIX)
        .unwrap_or(segments[2]);

    Some(Coordinate {
        release: segments[0].to_string(),
        distribution: segments[1].to_string(),
        architecture: architecture.to_string(),
        file: segments.join("/"),
    })
}
