//! Components, the top level units of a build, and where they're declared.
//!
//! Components are declared in a shell style list, one per line:
//!
//! ```text
//! add_engine scumm "SCUMM based games" yes "scumm_7_8 he"
//! add_engine scumm_7_8 "v7 & v8 games" yes
//! ```
//!
//! Only lines starting with `add_engine` and carrying at least a name, a description and a
//! default are considered, everything else in the file is ignored.

use std::collections::BTreeMap;

use compact_str::CompactString;
use modgen_filesystem::Filesystem;

use crate::error::{Error, StructuralError};
use crate::tokenize::tokenize;

/// Keyword that starts a component declaration.
const DECLARATION_KEYWORD: &str = "add_engine";

/// A single selectable component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDescriptor {
    pub name: CompactString,
    pub description: String,
    pub enabled_by_default: bool,
    /// Names of components that can only be built as part of this one.
    pub sub_components: Vec<CompactString>,
}

impl ComponentDescriptor {
    pub fn new(name: &str, description: &str, enabled_by_default: bool) -> Self {
        ComponentDescriptor {
            name: name.into(),
            description: description.to_string(),
            enabled_by_default,
            sub_components: Vec::new(),
        }
    }

    pub fn with_sub_components<'a>(mut self, subs: impl IntoIterator<Item = &'a str>) -> Self {
        self.sub_components.extend(subs.into_iter().map(CompactString::from));
        self
    }

    /// Parse a single declaration line, returning `None` if the line isn't one.
    pub fn parse_line(line: &str) -> Option<Self> {
        let tokens = tokenize(line);
        if tokens.len() < 4 || tokens[0] != DECLARATION_KEYWORD {
            return None;
        }

        let descriptor = ComponentDescriptor::new(tokens[1], tokens[2], tokens[3] == "yes");
        let descriptor = match tokens.get(4) {
            Some(subs) => descriptor.with_sub_components(tokenize(subs)),
            None => descriptor,
        };
        Some(descriptor)
    }
}

/// Parse every declaration in `text`, in order of appearance.
pub fn parse_declarations(text: &str) -> Vec<ComponentDescriptor> {
    text.lines().filter_map(ComponentDescriptor::parse_line).collect()
}

/// Something that can produce the list of declared components.
pub trait ConfigurationSource {
    fn components(&self) -> Result<Vec<ComponentDescriptor>, Error>;
}

/// The component list stored as a file in the source tree.
pub struct ConfigureFile<'a> {
    filesystem: &'a dyn Filesystem,
    path: String,
}

impl<'a> ConfigureFile<'a> {
    pub fn new(filesystem: &'a dyn Filesystem, path: impl Into<String>) -> Self {
        ConfigureFile {
            filesystem,
            path: path.into(),
        }
    }
}

impl ConfigurationSource for ConfigureFile<'_> {
    fn components(&self) -> Result<Vec<ComponentDescriptor>, Error> {
        if !self.filesystem.is_file(&self.path) {
            tracing::debug!(path = %self.path, "no component list");
            return Ok(Vec::new());
        }
        let text = self.filesystem.read_to_string(&self.path)?;
        Ok(parse_declarations(&text))
    }
}

/// Every declared component, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    components: Vec<ComponentDescriptor>,
    by_name: BTreeMap<CompactString, usize>,
    /// Sub-component index to the index of the first component that lists it.
    parents: BTreeMap<usize, usize>,
}

impl ComponentRegistry {
    /// Build a registry, validating that names are unique and every listed sub-component exists.
    ///
    /// `source` only names where the descriptors came from, for errors.
    pub fn new(components: Vec<ComponentDescriptor>, source: &str) -> Result<Self, Error> {
        let mut by_name = BTreeMap::new();
        for (idx, component) in components.iter().enumerate() {
            if by_name.insert(component.name.clone(), idx).is_some() {
                let kind = StructuralError::DuplicateComponent {
                    name: component.name.to_string(),
                };
                return Err(Error::structural(source, kind));
            }
        }

        let mut parents = BTreeMap::new();
        for (idx, component) in components.iter().enumerate() {
            for sub in &component.sub_components {
                let Some(sub_idx) = by_name.get(sub) else {
                    let kind = StructuralError::UnknownSubComponent {
                        parent: component.name.to_string(),
                        child: sub.to_string(),
                    };
                    return Err(Error::structural(source, kind));
                };
                parents.entry(*sub_idx).or_insert(idx);
            }
        }

        Ok(ComponentRegistry {
            components,
            by_name,
            parents,
        })
    }

    /// Load a registry from a [`ConfigurationSource`].
    pub fn load(source: &dyn ConfigurationSource, name: &str) -> Result<Self, Error> {
        let components = source.components()?;
        tracing::debug!(count = components.len(), source = name, "loaded components");
        ComponentRegistry::new(components, name)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentDescriptor> + '_ {
        self.components.iter()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn by_index(&self, idx: usize) -> &ComponentDescriptor {
        &self.components[idx]
    }

    /// Returns true if any component lists `name` as one of its sub-components.
    pub fn is_sub_component(&self, name: &str) -> bool {
        self.index_of(name)
            .is_some_and(|idx| self.parents.contains_key(&idx))
    }

    /// Index of the first component, in declaration order, that lists the component at `idx`.
    pub fn parent_of(&self, idx: usize) -> Option<usize> {
        self.parents.get(&idx).copied()
    }
}

#[cfg(test)]
mod tests {
    use modgen_filesystem::memory::MemoryFilesystem;

    use super::*;

    const CONFIGURE: &str = r#"#!/bin/sh
# Engines

add_engine scumm "SCUMM based games" yes "scumm_7_8 he"
add_engine scumm_7_8 "v7 & v8 games" yes
add_engine he "HE71+ games" no
add_engine gob "Gobli*ns" yes
add_engine broken "missing default"
echo add_engine nope "not a declaration" yes
"#;

    #[test]
    fn smoketest_parse() {
        let components = parse_declarations(CONFIGURE);
        let names: Vec<_> = components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["scumm", "scumm_7_8", "he", "gob"]);

        let scumm = &components[0];
        assert_eq!(scumm.description, "SCUMM based games");
        assert!(scumm.enabled_by_default);
        assert_eq!(scumm.sub_components, ["scumm_7_8", "he"]);
        assert!(!components[2].enabled_by_default);
    }

    #[test]
    fn registry_lookups() {
        let registry = ComponentRegistry::new(parse_declarations(CONFIGURE), "configure").unwrap();
        assert_eq!(registry.len(), 4);
        assert!(registry.is_sub_component("he"));
        assert!(registry.is_sub_component("scumm_7_8"));
        assert!(!registry.is_sub_component("scumm"));
        assert!(!registry.is_sub_component("unknown"));

        let he = registry.index_of("he").unwrap();
        assert_eq!(registry.parent_of(he), registry.index_of("scumm"));
    }

    #[test]
    fn registry_rejects_unknown_sub_component() {
        let components = vec![ComponentDescriptor::new("a", "A", true).with_sub_components(["b"])];
        let err = ComponentRegistry::new(components, "configure").unwrap_err();
        assert!(matches!(
            err,
            Error::Structural {
                kind: StructuralError::UnknownSubComponent { .. },
                ..
            }
        ));
    }

    #[test]
    fn registry_rejects_duplicates() {
        let components = vec![
            ComponentDescriptor::new("a", "A", true),
            ComponentDescriptor::new("a", "again", false),
        ];
        assert!(ComponentRegistry::new(components, "configure").is_err());
    }

    #[test]
    fn missing_configure_is_empty() {
        let fs = MemoryFilesystem::new();
        let source = ConfigureFile::new(&fs, "src/configure");
        let registry = ComponentRegistry::load(&source, "src/configure").unwrap();
        assert!(registry.is_empty());

        fs.add_file("src/configure", CONFIGURE);
        let registry = ComponentRegistry::load(&source, "src/configure").unwrap();
        assert_eq!(registry.len(), 4);
    }
}
