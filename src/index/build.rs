use chrono::Utc;
use tracing::{info, warn};

use crate::index::model::{
    ArchIndex, DistIndex, IndexSnapshot, LatestEntry, LatestVersionIndex, PackageIndex,
};
use crate::repo::control::ControlParser;
use crate::repo::scan::ScannedFile;

/// Folds scanned metadata files into the four indices in one batch pass.
/// Each file is parsed once; its records feed every index the file is
/// eligible for. Unreadable files are skipped, never fatal.
pub struct IndexBuilder {
    info_base: String,
    deb_base: String,
    dist: DistIndex,
    arch: ArchIndex,
    packages: PackageIndex,
    latest: LatestVersionIndex,
    source_files: usize,
}

impl IndexBuilder {
    pub fn new(info_base: impl Into<String>, deb_base: impl Into<String>) -> Self {
        Self {
            info_base: info_base.into(),
            deb_base: deb_base.into(),
            dist: DistIndex::default(),
            arch: ArchIndex::default(),
            packages: PackageIndex::default(),
            latest: LatestVersionIndex::default(),
            source_files: 0,
        }
    }

    pub fn build(mut self, files: &[ScannedFile]) -> IndexSnapshot {
        for file in files {
            self.fold_file(file);
        }

        info!(
            "Index built from {} of {} metadata files: {} packages, {} architectures, {} releases",
            self.source_files,
            files.len(),
            self.packages.len(),
            self.arch.len(),
            self.dist.len()
        );

        IndexSnapshot {
            dist: self.dist,
            arch: self.arch,
            packages: self.packages,
            latest: self.latest,
            built_at: Utc::now(),
            source_files: self.source_files,
        }
    }

    fn fold_file(&mut self, file: &ScannedFile) {
        let parser = match ControlParser::open(&file.path) {
            Ok(parser) => parser,
            Err(e) => {
                warn!(
                    "Skipping unreadable metadata file {}: {}",
                    file.path.display(),
                    e
                );
                return;
            }
        };

        // The dist slot exists as soon as its file does, even when the file
        // holds no usable records.
        if let Some(coordinate) = &file.coordinate {
            self.dist.slot(coordinate);
        }

        for record in parser {
            let (package, version) = match (record.package(), record.version()) {
                (Some(package), Some(version)) => (package.to_string(), version.to_string()),
                // unusable without both fields, dropped from every index
                _ => continue,
            };

            if let Some(coordinate) = &file.coordinate {
                self.dist
                    .slot(coordinate)
                    .packages
                    .insert(package.clone(), record.clone());
            }

            let architecture = record.architecture().unwrap_or("");
            self.arch.insert(architecture, &package, &version, &record);
            self.packages.insert(&package, &version, &record);

            let candidate = LatestEntry {
                version: version.clone(),
                info: format!("{}{}", self.info_base, package),
                deb: format!("{}{}", self.deb_base, record.filename().unwrap_or_default()),
            };
            self.latest.offer(&package, candidate);
        }

        self.source_files += 1;
    }
}
