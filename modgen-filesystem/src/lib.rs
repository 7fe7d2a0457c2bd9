//! The filesystem boundary for `modgen`.
//!
//! Everything the generator needs from disk goes through the [`Filesystem`] trait: listing a
//! directory, reading a text file, and writing the emitted projects. Paths are `/`-separated
//! strings (see [`modgen_ore::path`]).
//!
//! [`RealFilesystem`] talks to the host, [`MemoryFilesystem`] keeps a tree in memory so the
//! resolver can be tested without touching disk.

pub mod memory;
pub mod real;


pub use memory::MemoryFilesystem;
pub use real::RealFilesystem;

/// Kind of an entry returned from [`Filesystem::list_dir`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
}

/// A single child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Name of the entry, no directory components.
    pub name: String,
    /// Whether this is a file or a directory.
    pub kind: FileType,
}

impl DirectoryEntry {
    pub fn file(name: impl Into<String>) -> Self {
        DirectoryEntry {
            name: name.into(),
            kind: FileType::File,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        DirectoryEntry {
            name: name.into(),
            kind: FileType::Directory,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == FileType::Directory
    }

    /// Hidden entries (a leading `.`) are never reported by a [`Filesystem`].
    pub fn is_hidden_name(name: &str) -> bool {
        name.starts_with('.')
    }
}

/// Filesystem operations the generator relies on.
pub trait Filesystem {
    /// List the immediate children of `path`, skipping hidden entries.
    ///
    /// A directory that doesn't exist or can't be opened lists as empty, matching how the
    /// scanner treats "nothing here".
    fn list_dir(&self, path: &str) -> Result<Vec<DirectoryEntry>, Error>;

    /// Read the entire file at `path` as UTF-8 text.
    fn read_to_string(&self, path: &str) -> Result<String, Error>;

    /// Create `path` and any missing parents.
    fn create_dir_all(&self, path: &str) -> Result<(), Error>;

    /// Write `contents` to `path`, replacing anything that was there.
    fn write(&self, path: &str, contents: &str) -> Result<(), Error>;

    /// Returns true if `path` exists and is a file.
    fn is_file(&self, path: &str) -> bool;
}

/// Errors from the filesystem boundary. Each carries the offending path.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{path} is not present")]
    NotFound { path: String },
    #[error("failed while accessing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not valid UTF-8")]
    InvalidUtf8 { path: String },
}

impl Error {
    pub(crate) fn from_io(path: &str, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound {
                path: path.to_string(),
            },
            std::io::ErrorKind::InvalidData => Error::InvalidUtf8 {
                path: path.to_string(),
            },
            _ => Error::Io {
                path: path.to_string(),
                source,
            },
        }
    }

    /// The path this error is about.
    pub fn path(&self) -> &str {
        match self {
            Error::NotFound { path } | Error::Io { path, .. } | Error::InvalidUtf8 { path } => path,
        }
    }
}
