//! The user's choice of components and features for one build.

use std::collections::BTreeSet;
use std::fmt;

use compact_str::{format_compact, CompactString};

use crate::component::{ComponentDescriptor, ComponentRegistry};
use crate::error::Error;
use crate::feature::{Feature, FeatureRegistry};

/// Prefix of the symbol defined for every enabled component.
const COMPONENT_SYMBOL_PREFIX: &str = "ENABLE_";

/// Returned when a selection setter is given a name its registry doesn't know.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no {kind} named '{name}'")]
pub struct NotFound {
    pub kind: &'static str,
    pub name: String,
}

/// Enabled state for every component and feature, starting from their defaults.
///
/// Invariants maintained by the setters:
/// * An enabled sub-component has its first listing parent enabled too.
/// * A disabled component has all of its sub-components disabled.
#[derive(Debug, Clone)]
pub struct BuildSelection<'r> {
    components: &'r ComponentRegistry,
    features: &'r FeatureRegistry,
    component_enabled: Vec<bool>,
    feature_enabled: Vec<bool>,
}

impl<'r> BuildSelection<'r> {
    pub fn new(components: &'r ComponentRegistry, features: &'r FeatureRegistry) -> Self {
        BuildSelection {
            component_enabled: components.iter().map(|c| c.enabled_by_default).collect(),
            feature_enabled: features.iter().map(Feature::enabled_by_default).collect(),
            components,
            features,
        }
    }

    pub fn is_component_enabled(&self, name: &str) -> bool {
        self.components
            .index_of(name)
            .is_some_and(|idx| self.component_enabled[idx])
    }

    /// Enable or disable a single component.
    ///
    /// Enabling a sub-component also enables the component that lists it. Disabling any component
    /// also disables everything beneath it.
    pub fn set_component_enabled(&mut self, name: &str, enabled: bool) -> Result<(), NotFound> {
        let idx = self.components.index_of(name).ok_or_else(|| NotFound {
            kind: "component",
            name: name.to_string(),
        })?;

        if enabled {
            // Walk up the parent chain, a cyclic listing stops once we revisit a component.
            let mut seen = BTreeSet::new();
            let mut current = Some(idx);
            while let Some(idx) = current.filter(|idx| seen.insert(*idx)) {
                self.component_enabled[idx] = true;
                current = self.components.parent_of(idx);
            }
        } else {
            let mut seen = BTreeSet::new();
            let mut pending = vec![idx];
            while let Some(idx) = pending.pop() {
                if !seen.insert(idx) {
                    continue;
                }
                self.component_enabled[idx] = false;
                let subs = &self.components.by_index(idx).sub_components;
                pending.extend(subs.iter().filter_map(|sub| self.components.index_of(sub)));
            }
        }

        Ok(())
    }

    pub fn set_feature_enabled(&mut self, name: &str, enabled: bool) -> Result<(), NotFound> {
        let idx = self.features.index_of(name).ok_or_else(|| NotFound {
            kind: "feature",
            name: name.to_string(),
        })?;
        self.feature_enabled[idx] = enabled;
        Ok(())
    }

    /// Set every component, sub-components included, to `enabled`.
    pub fn set_all_components(&mut self, enabled: bool) {
        self.component_enabled.fill(enabled);
    }

    /// Apply a single user override, trying components first and then features.
    pub fn apply_override(&mut self, name: &str, enabled: bool) -> Result<(), Error> {
        if self.set_component_enabled(name, enabled).is_ok() {
            return Ok(());
        }
        self.set_feature_enabled(name, enabled)
            .map_err(|_| Error::Lookup {
                name: name.to_string(),
            })
    }

    /// Symbols for every enabled component followed by every enabled feature, each group in
    /// registry order.
    pub fn active_symbols(&self) -> Vec<CompactString> {
        let components = self
            .components()
            .filter(|(_, enabled)| *enabled)
            .map(|(component, _)| {
                format_compact!("{COMPONENT_SYMBOL_PREFIX}{}", component.name.to_uppercase())
            });
        let features = self
            .features()
            .filter(|(_, enabled)| *enabled)
            .map(|(feature, _)| CompactString::from(feature.symbol()));
        components.chain(features).collect()
    }

    /// Libraries of every enabled feature, in registry order, followed by `base`.
    pub fn link_dependencies(&self, base: &[String]) -> Vec<String> {
        self.features()
            .filter(|(_, enabled)| *enabled)
            .flat_map(|(feature, _)| feature.libraries().iter().map(|lib| lib.to_string()))
            .chain(base.iter().cloned())
            .collect()
    }

    /// Enabled components that get a project of their own, ordered by name.
    pub fn project_components(&self) -> Vec<&'r ComponentDescriptor> {
        let mut projects: Vec<_> = self
            .components()
            .filter(|(component, enabled)| {
                *enabled && !self.components.is_sub_component(&component.name)
            })
            .map(|(component, _)| component)
            .collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        projects
    }

    /// Every component with its current state, in declaration order.
    pub fn components(&self) -> impl Iterator<Item = (&'r ComponentDescriptor, bool)> + '_ {
        self.components.iter().zip(self.component_enabled.iter().copied())
    }

    /// Every feature with its current state, in registry order.
    pub fn features(&self) -> impl Iterator<Item = (&'static Feature, bool)> + '_ {
        self.features.iter().zip(self.feature_enabled.iter().copied())
    }

    /// A human readable overview of the selection.
    pub fn summary(&self) -> SelectionSummary<'_, 'r> {
        SelectionSummary { selection: self }
    }
}

/// [`fmt::Display`] for a [`BuildSelection`], see [`BuildSelection::summary`].
pub struct SelectionSummary<'s, 'r> {
    selection: &'s BuildSelection<'r>,
}

impl fmt::Display for SelectionSummary<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let selection = self.selection;
        for enabled in [true, false] {
            let title = if enabled { "Enabled" } else { "Disabled" };
            writeln!(f, "{title} components:")?;
            for (component, _) in selection.components().filter(|(_, e)| *e == enabled) {
                let indent = if selection.components.is_sub_component(&component.name) {
                    "      "
                } else {
                    "    "
                };
                writeln!(f, "{indent}{}", component.description)?;
            }
        }
        for enabled in [true, false] {
            let title = if enabled { "Enabled" } else { "Disabled" };
            writeln!(f, "{title} features:")?;
            for (feature, _) in selection.features().filter(|(_, e)| *e == enabled) {
                writeln!(f, "    {}", feature.desc())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentDescriptor;

    static ZLIB: Feature = Feature::new("zlib", "USE_ZLIB", &["zlib.lib"], true, "zlib");
    static MPEG2: Feature = Feature::new("mpeg2", "USE_MPEG2", &["libmpeg2.lib"], false, "mpeg2");

    fn features() -> FeatureRegistry {
        let mut builder = FeatureRegistry::builder();
        builder.register(&ZLIB).register(&MPEG2);
        builder.build()
    }

    fn components() -> ComponentRegistry {
        let components = vec![
            ComponentDescriptor::new("scumm", "SCUMM", true).with_sub_components(["he"]),
            ComponentDescriptor::new("he", "HE", false),
            ComponentDescriptor::new("gob", "Gob", true),
        ];
        ComponentRegistry::new(components, "configure").unwrap()
    }

    #[test]
    fn smoketest_active_symbols() {
        let core = vec![ComponentDescriptor::new("core", "Core", true)];
        let components = ComponentRegistry::new(core, "configure").unwrap();
        let features = features();
        let selection = BuildSelection::new(&components, &features);
        assert_eq!(selection.active_symbols(), ["ENABLE_CORE", "USE_ZLIB"]);
        assert_eq!(
            selection.link_dependencies(&["sdl.lib".to_string()]),
            ["zlib.lib", "sdl.lib"]
        );
    }

    #[test]
    fn enabling_sub_component_enables_parent() {
        let (components, features) = (components(), features());
        let mut selection = BuildSelection::new(&components, &features);
        selection.set_component_enabled("scumm", false).unwrap();
        assert!(!selection.is_component_enabled("scumm"));

        selection.set_component_enabled("he", true).unwrap();
        assert!(selection.is_component_enabled("he"));
        assert!(selection.is_component_enabled("scumm"));
    }

    #[test]
    fn disabling_parent_disables_subs() {
        let (components, features) = (components(), features());
        let mut selection = BuildSelection::new(&components, &features);
        selection.set_component_enabled("he", true).unwrap();
        selection.set_component_enabled("scumm", false).unwrap();
        assert!(!selection.is_component_enabled("scumm"));
        assert!(!selection.is_component_enabled("he"));
        // Unrelated components are untouched.
        assert!(selection.is_component_enabled("gob"));
    }

    #[test]
    fn unknown_names() {
        let (components, features) = (components(), features());
        let mut selection = BuildSelection::new(&components, &features);
        let err = selection.set_component_enabled("nope", true).unwrap_err();
        assert_eq!(err.kind, "component");
        assert!(selection.set_feature_enabled("nope", true).is_err());
        assert!(matches!(
            selection.apply_override("nope", true),
            Err(Error::Lookup { .. })
        ));
    }

    #[test]
    fn overrides_fall_back_to_features() {
        let (components, features) = (components(), features());
        let mut selection = BuildSelection::new(&components, &features);
        selection.apply_override("mpeg2", true).unwrap();
        selection.apply_override("zlib", false).unwrap();
        selection.apply_override("gob", false).unwrap();
        assert_eq!(selection.active_symbols(), ["ENABLE_SCUMM", "USE_MPEG2"]);
        assert_eq!(selection.link_dependencies(&[]), ["libmpeg2.lib"]);
    }

    #[test]
    fn project_components_sorted_without_subs() {
        let (components, features) = (components(), features());
        let mut selection = BuildSelection::new(&components, &features);
        selection.set_all_components(true);
        let names: Vec<_> = selection
            .project_components()
            .into_iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, ["gob", "scumm"]);

        selection.set_all_components(false);
        assert!(selection.project_components().is_empty());
        assert!(selection.active_symbols().iter().all(|s| !s.starts_with("ENABLE_")));
    }

    #[test]
    fn smoketest_summary() {
        let (components, features) = (components(), features());
        let selection = BuildSelection::new(&components, &features);
        let summary = selection.summary().to_string();
        let expected = "\
Enabled components:
    SCUMM
    Gob
Disabled components:
      HE
Enabled features:
    zlib
Disabled features:
    mpeg2
";
        assert_eq!(summary, expected);
    }
}
