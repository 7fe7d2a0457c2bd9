//! An in-memory [`Filesystem`].

use std::cell::RefCell;
use std::collections::BTreeMap;

use modgen_ore::path;

use crate::{DirectoryEntry, Error, FileType, Filesystem};

/// A [`Filesystem`] that lives entirely in memory.
///
/// Paths are used verbatim as keys, parents of every inserted file are created implicitly.
#[derive(Debug, Default)]
pub struct MemoryFilesystem {
    nodes: RefCell<BTreeMap<String, MemoryNode>>,
}

#[derive(Debug, Clone)]
enum MemoryNode {
    File(String),
    Directory,
}

impl MemoryFilesystem {
    pub fn new() -> Self {
        MemoryFilesystem::default()
    }

    /// Add a file with `contents` at `path`, creating parent directories.
    pub fn add_file(&self, path: &str, contents: &str) -> &Self {
        let mut nodes = self.nodes.borrow_mut();
        Self::ensure_parents(&mut nodes, path);
        nodes.insert(path.to_string(), MemoryNode::File(contents.to_string()));
        self
    }

    /// Add an empty directory at `path`, creating parent directories.
    pub fn add_dir(&self, path: &str) -> &Self {
        let mut nodes = self.nodes.borrow_mut();
        Self::ensure_parents(&mut nodes, path);
        nodes.insert(path.to_string(), MemoryNode::Directory);
        self
    }

    /// Contents of the file at `path`, if there is one.
    pub fn contents(&self, path: &str) -> Option<String> {
        match self.nodes.borrow().get(path) {
            Some(MemoryNode::File(contents)) => Some(contents.clone()),
            _ => None,
        }
    }

    fn ensure_parents(nodes: &mut BTreeMap<String, MemoryNode>, path: &str) {
        let mut parent = path::parent(path);
        while !parent.is_empty() {
            nodes
                .entry(parent.to_string())
                .or_insert(MemoryNode::Directory);
            parent = path::parent(parent);
        }
    }
}

impl Filesystem for MemoryFilesystem {
    fn list_dir(&self, dir: &str) -> Result<Vec<DirectoryEntry>, Error> {
        let nodes = self.nodes.borrow();
        let entries = nodes
            .iter()
            .filter(|(child, _)| path::parent(child) == dir && child.as_str() != dir)
            .map(|(child, node)| {
                let kind = match node {
                    MemoryNode::File(_) => FileType::File,
                    MemoryNode::Directory => FileType::Directory,
                };
                DirectoryEntry {
                    name: path::last_component(child).to_string(),
                    kind,
                }
            })
            .filter(|entry| !DirectoryEntry::is_hidden_name(&entry.name))
            .collect();
        Ok(entries)
    }

    fn read_to_string(&self, file: &str) -> Result<String, Error> {
        self.contents(file).ok_or_else(|| Error::NotFound {
            path: file.to_string(),
        })
    }

    fn create_dir_all(&self, dir: &str) -> Result<(), Error> {
        self.add_dir(dir);
        Ok(())
    }

    fn write(&self, file: &str, contents: &str) -> Result<(), Error> {
        self.add_file(file, contents);
        Ok(())
    }

    fn is_file(&self, file: &str) -> bool {
        matches!(self.nodes.borrow().get(file), Some(MemoryNode::File(_)))
    }
}
