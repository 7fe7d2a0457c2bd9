//! Walking a module directory down to the files a build actually uses.

use modgen_filesystem::Filesystem;
use modgen_ore::path;
use modgen_tree::FileNode;

use crate::duplicates::produces_object;
use crate::error::Error;
use crate::module_list::ModuleList;

/// Returns true if `file_name`, inside `dir`, is named by an entry of `list`.
///
/// Files that compile to an object, and headers, match on their stem: `gob.cpp` matches a listed
/// `gob.o`. Anything else must be listed by its exact name.
pub fn is_in_list(dir: &str, file_name: &str, list: &[String]) -> bool {
    let (stem, ext) = path::split_filename(file_name);
    let by_stem = produces_object(file_name) || ext == "h";

    list.iter()
        .filter(|entry| path::parent(entry) == dir)
        .map(|entry| path::last_component(entry))
        .any(|listed| {
            if by_stem {
                listed
                    .strip_prefix(stem)
                    .is_some_and(|rest| rest.starts_with('.'))
            } else {
                listed == file_name
            }
        })
}

/// Returns true if any entry of `list` lies underneath `dir`.
pub fn is_dir_in_list(dir: &str, list: &[String]) -> bool {
    list.iter().any(|entry| path::is_under(entry, dir))
}

/// Builds a [`FileNode`] tree of the files a [`ModuleList`] makes relevant.
pub struct FileTreeScanner<'a> {
    filesystem: &'a dyn Filesystem,
}

impl<'a> FileTreeScanner<'a> {
    pub fn new(filesystem: &'a dyn Filesystem) -> Self {
        FileTreeScanner { filesystem }
    }

    /// Scan `dir`, returning `None` if nothing in it is relevant.
    ///
    /// * Hidden entries are skipped.
    /// * A subdirectory is only descended into if an include entry lies beneath it.
    /// * Excluded files are dropped, headers are kept, everything else must be included.
    pub fn scan(&self, dir: &str, list: &ModuleList) -> Result<Option<FileNode>, Error> {
        let children = self.scan_children(dir, list)?;
        Ok(FileNode::directory(dir, children))
    }

    fn scan_children(&self, dir: &str, list: &ModuleList) -> Result<Vec<FileNode>, Error> {
        let mut children = Vec::new();

        for entry in self.filesystem.list_dir(dir)? {
            let entry_path = path::join(dir, &entry.name);
            if entry.is_dir() {
                if !is_dir_in_list(&entry_path, &list.include) {
                    continue;
                }
                let grandchildren = self.scan_children(&entry_path, list)?;
                if let Some(node) = FileNode::directory(entry.name.as_str(), grandchildren) {
                    children.push(node);
                }
            } else {
                if is_in_list(dir, &entry.name, &list.exclude) {
                    continue;
                }
                let (_, ext) = path::split_filename(&entry.name);
                if ext == "h" || is_in_list(dir, &entry.name, &list.include) {
                    children.push(FileNode::file(entry.name.as_str()));
                }
            }
        }

        Ok(children)
    }
}

#[cfg(test)]
mod tests {
    use modgen_filesystem::memory::MemoryFilesystem;

    use super::*;

    fn strings(entries: &[&str]) -> Vec<String> {
        entries.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn smoketest_is_in_list() {
        let list = strings(&["eng/x/module.mk", "eng/x/gob.o", "eng/x/sub/inner.o"]);
        assert!(is_in_list("eng/x", "gob.cpp", &list));
        assert!(is_in_list("eng/x", "gob.h", &list));
        assert!(is_in_list("eng/x", "module.mk", &list));
        assert!(!is_in_list("eng/x", "gob2.cpp", &list));
        assert!(!is_in_list("eng/x", "inner.cpp", &list));
        assert!(!is_in_list("eng/x", "gob.txt", &list));
        assert!(is_in_list("eng/x/sub", "inner.cpp", &list));
    }

    #[test]
    fn smoketest_is_dir_in_list() {
        let list = strings(&["eng/x/sub/inner.o"]);
        assert!(is_dir_in_list("eng/x", &list));
        assert!(is_dir_in_list("eng/x/sub", &list));
        assert!(!is_dir_in_list("eng/x/su", &list));
        assert!(!is_dir_in_list("eng/y", &list));
    }

    #[test]
    fn smoketest_scan() {
        let fs = MemoryFilesystem::new();
        fs.add_file("src/x/module.mk", "")
            .add_file("src/x/a.cpp", "")
            .add_file("src/x/a.h", "")
            .add_file("src/x/b.cpp", "")
            .add_file("src/x/c.cpp", "")
            .add_file("src/x/notes.txt", "")
            .add_file("src/x/.hidden.cpp", "")
            .add_file("src/x/sub/d.cpp", "")
            .add_file("src/x/sub/e.h", "")
            .add_file("src/x/other/f.h", "");

        let list = ModuleList {
            include: strings(&["src/x/module.mk", "src/x/a.o", "src/x/sub/d.o"]),
            exclude: strings(&["src/x/b.o"]),
        };
        let tree = FileTreeScanner::new(&fs).scan("src/x", &list).unwrap().unwrap();
        let files: Vec<_> = tree.files().map(|entry| entry.relative_path()).collect();
        assert_eq!(files, ["sub/d.cpp", "sub/e.h", "a.cpp", "a.h", "module.mk"]);
    }

    #[test]
    fn excluded_headers_are_dropped() {
        let fs = MemoryFilesystem::new();
        fs.add_file("x/a.h", "").add_file("x/b.h", "");
        let list = ModuleList {
            include: Vec::new(),
            exclude: strings(&["x/b.o"]),
        };
        let tree = FileTreeScanner::new(&fs).scan("x", &list).unwrap().unwrap();
        let files: Vec<_> = tree.files().map(|entry| entry.relative_path()).collect();
        assert_eq!(files, ["a.h"]);
    }

    #[test]
    fn empty_scan_is_none() {
        let fs = MemoryFilesystem::new();
        fs.add_dir("x/empty").add_file("x/readme.txt", "");
        let scanner = FileTreeScanner::new(&fs);
        assert!(scanner.scan("x", &ModuleList::new()).unwrap().is_none());
        assert!(scanner.scan("x/empty", &ModuleList::new()).unwrap().is_none());
    }
}
