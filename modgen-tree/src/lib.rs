//! An owned tree of files and directories.
//!
//! A [`FileNode`] with no children is a file, anything else is a directory. Every parent owns
//! its children outright, traversal is always top-down, so there are no back references.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use compact_str::CompactString;
use smallvec::SmallVec;

/// Single node within a file tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    /// Path segment of this node, no separators.
    pub name: CompactString,
    /// Children of this node. Empty if and only if this node is a file.
    pub children: Vec<FileNode>,
}

impl FileNode {
    /// Create a leaf (file) node.
    pub fn file(name: impl Into<CompactString>) -> Self {
        FileNode {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Create a directory node, sorting `children` with [`compare_nodes`].
    ///
    /// Returns `None` when `children` is empty, an empty directory is never part of a tree.
    pub fn directory(name: impl Into<CompactString>, mut children: Vec<FileNode>) -> Option<Self> {
        if children.is_empty() {
            return None;
        }
        children.sort_by(compare_nodes);
        Some(FileNode {
            name: name.into(),
            children,
        })
    }

    /// Returns true if this node is a file.
    pub fn is_file(&self) -> bool {
        self.children.is_empty()
    }

    /// Total number of files underneath this node.
    pub fn file_count(&self) -> usize {
        if self.is_file() {
            return 1;
        }
        self.children.iter().map(FileNode::file_count).sum()
    }

    /// Depth-first iterator over every file beneath this node, in child order.
    ///
    /// Each [`FileEntry`] carries the directory names between this node (exclusive) and the
    /// file. Calling this on a file node yields nothing.
    pub fn files(&self) -> Files<'_> {
        let mut stack = SmallVec::new();
        stack.push(self.children.iter());
        Files {
            stack,
            dirs: SmallVec::new(),
        }
    }

    /// Return a [`PrettyFileNode`] which can be pretty printed.
    pub fn pretty(&self) -> PrettyFileNode<'_> {
        PrettyFileNode { node: self }
    }
}

/// Strict weak order for sibling nodes: directories sort before files, then by name.
pub fn compare_nodes(l: &FileNode, r: &FileNode) -> Ordering {
    match (l.is_file(), r.is_file()) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => l.name.cmp(&r.name),
    }
}

/// A file yielded from [`FileNode::files`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry<'a> {
    /// Directory segments from the walk root down to the file.
    pub dirs: SmallVec<[&'a str; 8]>,
    /// Name of the file.
    pub name: &'a str,
}

impl FileEntry<'_> {
    /// Path of the file relative to the walk root, `/`-separated.
    pub fn relative_path(&self) -> String {
        let mut path = String::new();
        for dir in &self.dirs {
            path.push_str(dir);
            path.push('/');
        }
        path.push_str(self.name);
        path
    }
}

/// Iterator returned from [`FileNode::files`].
#[derive(Debug)]
pub struct Files<'a> {
    stack: SmallVec<[std::slice::Iter<'a, FileNode>; 8]>,
    dirs: SmallVec<[&'a str; 8]>,
}

impl<'a> Iterator for Files<'a> {
    type Item = FileEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let children = self.stack.last_mut()?;
            match children.next() {
                None => {
                    self.stack.pop();
                    self.dirs.pop();
                }
                Some(node) if node.is_file() => {
                    return Some(FileEntry {
                        dirs: self.dirs.clone(),
                        name: node.name.as_str(),
                    });
                }
                Some(node) => {
                    self.dirs.push(node.name.as_str());
                    self.stack.push(node.children.iter());
                }
            }
        }
    }
}

/// Helper struct for implementing [`ptree`]'s traits.
#[derive(Debug, Clone)]
pub struct PrettyFileNode<'a> {
    node: &'a FileNode,
}

impl<'a> ptree::TreeItem for PrettyFileNode<'a> {
    type Child = PrettyFileNode<'a>;

    fn write_self<W: std::io::Write>(
        &self,
        f: &mut W,
        _style: &ptree::Style,
    ) -> std::io::Result<()> {
        if self.node.is_file() {
            write!(f, "{}", self.node.name)
        } else {
            write!(f, "{}/", self.node.name)
        }
    }

    fn children(&self) -> Cow<'_, [Self::Child]> {
        let children: Vec<_> = self
            .node
            .children
            .iter()
            .map(|node| PrettyFileNode { node })
            .collect();
        Cow::Owned(children)
    }
}

impl fmt::Display for PrettyFileNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Vec::new();
        ptree::write_tree(self, &mut buf).map_err(|_| fmt::Error)?;
        write!(f, "{}", String::from_utf8_lossy(&buf[..]))
    }
}
