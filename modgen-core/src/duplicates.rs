//! Detection of object files that would collide in a flat output directory.

use std::collections::{BTreeMap, BTreeSet};

use compact_str::{format_compact, CompactString};
use modgen_ore::path;

/// Extensions of files that compile into an object file.
pub const OBJECT_PRODUCING_EXTENSIONS: &[&str] = &["c", "cpp", "asm"];

/// Returns true if `filename` is compiled into an object file.
pub fn produces_object(filename: &str) -> bool {
    let (_, ext) = path::split_filename(filename);
    OBJECT_PRODUCING_EXTENSIONS.contains(&ext)
}

/// Name of the object file produced for `filename`, if any.
///
/// Module descriptors list objects (`foo.o`) while the tree holds sources (`foo.cpp`), both map
/// to the same object.
pub fn object_name(filename: &str) -> Option<CompactString> {
    let (stem, ext) = path::split_filename(path::last_component(filename));
    (ext == "o" || OBJECT_PRODUCING_EXTENSIONS.contains(&ext)).then(|| format_compact!("{stem}.o"))
}

/// Object basenames produced in more than one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateSet {
    names: BTreeSet<CompactString>,
}

impl DuplicateSet {
    /// Find every object basename that more than one directory in `include` produces.
    pub fn find(include: &[String]) -> Self {
        let mut first_seen: BTreeMap<CompactString, &str> = BTreeMap::new();
        let mut names = BTreeSet::new();

        for entry in include {
            let Some(object) = object_name(entry) else {
                continue;
            };
            let dir = path::parent(entry);
            match first_seen.get(&object) {
                Some(first_dir) if *first_dir != dir => {
                    names.insert(object);
                }
                Some(_) => (),
                None => {
                    first_seen.insert(object, dir);
                }
            }
        }

        if !names.is_empty() {
            tracing::debug!(?names, "found duplicate object names");
        }
        DuplicateSet { names }
    }

    /// Returns true if the object built from `filename` needs a qualified name.
    pub fn needs_qualifying(&self, filename: &str) -> bool {
        object_name(filename).is_some_and(|object| self.names.contains(&object))
    }

    pub fn contains(&self, object: &str) -> bool {
        self.names.contains(object)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(CompactString::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(entries: &[&str]) -> Vec<String> {
        entries.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn smoketest_duplicates() {
        let include = strings(&["dirA/foo.o", "dirB/foo.o", "dirA/bar.o"]);
        let duplicates = DuplicateSet::find(&include);
        assert_eq!(duplicates.iter().collect::<Vec<_>>(), ["foo.o"]);
        assert!(duplicates.needs_qualifying("foo.cpp"));
        assert!(!duplicates.needs_qualifying("bar.cpp"));
    }

    #[test]
    fn colliding_sources() {
        let include = strings(&["dirA/foo.cpp", "dirB/foo.cpp", "dirC/bar.cpp"]);
        let duplicates = DuplicateSet::find(&include);
        assert_eq!(duplicates.iter().collect::<Vec<_>>(), ["foo.o"]);
        assert!(!duplicates.contains("bar.o"));
    }

    #[test]
    fn same_directory_is_not_a_duplicate() {
        let include = strings(&["dirA/foo.o", "dirA/foo.o", "dirA/module.mk", "dirB/module.mk"]);
        assert!(DuplicateSet::find(&include).is_empty());
    }

    #[test]
    fn sources_and_objects_collide() {
        let include = strings(&["a/x.cpp", "b/x.o", "c/y.asm", "d/y.c", "e/z.h", "f/z.h"]);
        let duplicates = DuplicateSet::find(&include);
        assert_eq!(duplicates.iter().collect::<Vec<_>>(), ["x.o", "y.o"]);
    }

    #[test]
    fn object_names() {
        assert_eq!(object_name("engines/gob/gob.cpp").as_deref(), Some("gob.o"));
        assert_eq!(object_name("video.o").as_deref(), Some("video.o"));
        assert_eq!(object_name("readme.txt"), None);
        assert!(produces_object("scale.asm"));
        assert!(!produces_object("scale.h"));
    }
}
