//! [`Filesystem`] backed by the host operating system.

use std::fs;

use crate::{DirectoryEntry, Error, FileType, Filesystem};

/// Reads and writes the real filesystem through [`std::fs`].
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFilesystem;

impl RealFilesystem {
    pub fn new() -> Self {
        RealFilesystem
    }
}

impl Filesystem for RealFilesystem {
    fn list_dir(&self, path: &str) -> Result<Vec<DirectoryEntry>, Error> {
        let reader = match fs::read_dir(path) {
            Ok(reader) => reader,
            Err(err) => {
                tracing::debug!(%path, ?err, "could not list directory, treating as empty");
                return Ok(Vec::new());
            }
        };

        let mut entries = Vec::new();
        for entry in reader {
            let entry = entry.map_err(|err| Error::from_io(path, err))?;
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                tracing::warn!(%path, name = ?entry.file_name(), "skipping non UTF-8 entry");
                continue;
            };
            if DirectoryEntry::is_hidden_name(&name) {
                continue;
            }

            // Follow symlinks so a linked directory is scanned like a real one. Entries we can't
            // stat are skipped.
            let Ok(metadata) = fs::metadata(entry.path()) else {
                continue;
            };
            let kind = if metadata.is_dir() {
                FileType::Directory
            } else {
                FileType::File
            };
            entries.push(DirectoryEntry { name, kind });
        }

        // `read_dir` order is platform dependent, sort for deterministic output.
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read_to_string(&self, path: &str) -> Result<String, Error> {
        fs::read_to_string(path).map_err(|err| Error::from_io(path, err))
    }

    fn create_dir_all(&self, path: &str) -> Result<(), Error> {
        fs::create_dir_all(path).map_err(|err| Error::from_io(path, err))
    }

    fn write(&self, path: &str, contents: &str) -> Result<(), Error> {
        tracing::debug!(%path, bytes = contents.len(), "writing file");
        fs::write(path, contents).map_err(|err| Error::from_io(path, err))
    }

    fn is_file(&self, path: &str) -> bool {
        fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
    }
}
