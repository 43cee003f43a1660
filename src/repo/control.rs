use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::Path;

/// One parsed control-file paragraph. Field names keep their original case
/// and encounter order; continuation lines are joined with newlines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageRecord {
    fields: IndexMap<String, String>,
}

impl PackageRecord {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn package(&self) -> Option<&str> {
        self.get("Package")
    }

    pub fn version(&self) -> Option<&str> {
        self.get("Version")
    }

    pub fn architecture(&self) -> Option<&str> {
        self.get("Architecture")
    }

    pub fn filename(&self) -> Option<&str> {
        self.get("Filename")
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn insert(&mut self, field: &str, value: &str) {
        self.fields.insert(field.to_string(), value.to_string());
    }

    fn append(&mut self, field: &str, continuation: &str) {
        if let Some(value) = self.fields.get_mut(field) {
            value.push('\n');
            value.push_str(continuation);
        }
    }
}

/// Streaming parser over an RFC822-style control file. Yields one
/// `PackageRecord` per paragraph; paragraphs are separated by one or more
/// blank lines. Lines that are neither fields nor continuations are ignored.
pub struct ControlParser<R: BufRead> {
    lines: Lines<R>,
    done: bool,
}

impl ControlParser<BufReader<File>> {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(ControlParser::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ControlParser<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for ControlParser<R> {
    type Item = PackageRecord;

    fn next(&mut self) -> Option<PackageRecord> {
        if self.done {
            return None;
        }

        let mut record = PackageRecord::default();
        // field currently accepting continuation lines
        let mut current: Option<String> = None;

        loop {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                // a read error mid-file ends the stream like EOF would
                Some(Err(_)) | None => {
                    self.done = true;
                    break;
                }
            };

            if line.trim().is_empty() {
                if record.is_empty() {
                    current = None;
                    continue;
                }
                break;
            }

            if line.starts_with(' ') || line.starts_with('\t') {
                // continuation without a preceding field is dropped
                if let Some(field) = &current {
                    record.append(field, line.trim_start());
                }
                continue;
            }

            if let Some((field, value)) = line.split_once(':') {
                let field = field.trim_end();
                record.insert(field, value.trim());
                current = Some(field.to_string());
            }
        }

        if record.is_empty() {
            None
        } else {
            Some(record)
        }
    }
}
