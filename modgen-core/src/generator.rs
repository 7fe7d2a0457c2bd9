//! A single generation run, from a source tree to emitted projects.

use std::collections::BTreeMap;

use compact_str::CompactString;
use derivative::Derivative;
use modgen_cfg::ConfigSet;
use modgen_filesystem::Filesystem;
use modgen_ore::path;

use crate::component::{ComponentRegistry, ConfigureFile};
use crate::defs::{
    WorkspaceSpec, COMPONENTS_DIR, CONFIGURE_FILENAME, EMIT_TREE, FILE_PREFIX, MODULE_FILENAME,
    WORKSPACE_FILENAME,
};
use crate::duplicates::DuplicateSet;
use crate::emit::{Project, ProjectEmitter, WorkspaceIndex};
use crate::error::Error;
use crate::feature::FeatureRegistry;
use crate::module_list::{ModuleList, ModuleListResolver};
use crate::scanner::FileTreeScanner;
use crate::selection::BuildSelection;

/// Configuration for creating a [`Generator`].
pub struct GeneratorConfig {
    /// Root of the source tree, `/`-separated without a trailing `/`.
    pub src_dir: String,
    /// Dynamic configs for the run.
    pub configs: ConfigSet,
}

#[derive(Derivative)]
#[derivative(Debug)]
pub struct Generator<'f> {
    /// Root of the source tree.
    src_dir: String,
    /// Layout of the workspace being generated.
    spec: WorkspaceSpec,
    /// Dynamic configs for the run.
    configs: ConfigSet,

    components: ComponentRegistry,
    features: FeatureRegistry,

    /// Our interface to the filesystem.
    #[derivative(Debug = "ignore")]
    filesystem: &'f dyn Filesystem,
}

/// Outcome of [`Generator::generate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Every emitted project, in emission order.
    pub projects: Vec<ProjectSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    pub name: String,
    pub files: usize,
    pub duplicates: usize,
}

impl<'f> Generator<'f> {
    /// Load the component list and workspace spec of the source tree in `config`.
    pub fn new(config: GeneratorConfig, filesystem: &'f dyn Filesystem) -> Result<Self, Error> {
        let GeneratorConfig { src_dir, configs } = config;

        let components = {
            let configure = path::join(&src_dir, &CONFIGURE_FILENAME.read(&configs));
            tracing::info!(path = %configure, "reading component list");
            let source = ConfigureFile::new(filesystem, configure.as_str());
            ComponentRegistry::load(&source, &configure)?
        };
        let spec = WorkspaceSpec::load(filesystem, &src_dir, &WORKSPACE_FILENAME.read(&configs))?;

        Ok(Generator {
            src_dir,
            spec,
            configs,
            components,
            features: FeatureRegistry::catalogue(),
            filesystem,
        })
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    pub fn features(&self) -> &FeatureRegistry {
        &self.features
    }

    pub fn spec(&self) -> &WorkspaceSpec {
        &self.spec
    }

    /// A [`BuildSelection`] with every component and feature at its default.
    pub fn selection(&self) -> BuildSelection<'_> {
        BuildSelection::new(&self.components, &self.features)
    }

    /// Prefix for file paths inside emitted projects.
    pub fn file_prefix(&self) -> String {
        let prefix = FILE_PREFIX.read(&self.configs);
        if prefix.is_empty() {
            self.src_dir.clone()
        } else {
            path::unify_dir(&prefix)
        }
    }

    /// Resolve and emit every project for `selection`.
    pub fn generate(
        &self,
        selection: &BuildSelection<'_>,
        emitter: &mut dyn ProjectEmitter,
    ) -> Result<GenerationReport, Error> {
        self.generate_with_progress(selection, emitter, &mut |_| ())
    }

    /// [`Generator::generate`], calling `progress` with the name of each project before it's
    /// resolved.
    pub fn generate_with_progress(
        &self,
        selection: &BuildSelection<'_>,
        emitter: &mut dyn ProjectEmitter,
        progress: &mut dyn FnMut(&str),
    ) -> Result<GenerationReport, Error> {
        let symbols = selection.active_symbols();
        let module_filename = MODULE_FILENAME.read(&self.configs);
        let resolver = ModuleListResolver::new(self.filesystem, &symbols, &module_filename);
        let components_dir = path::join(&self.src_dir, &COMPONENTS_DIR.read(&self.configs));
        tracing::info!(?symbols, "generating projects");

        let mut report = GenerationReport::default();
        let mut dependencies = Vec::new();

        for component in selection.project_components() {
            progress(&component.name);
            let module_dir = path::join(&components_dir, &component.name);
            let list = resolver.resolve(&module_dir)?;
            let project =
                self.build_project(&component.name, &module_dir, &list, &symbols, Vec::new())?;

            emitter.emit_project(&project)?;
            report.projects.push(ProjectSummary::new(&project));
            dependencies.push(project.name);
        }

        let main_name = &self.spec.main_project;
        progress(main_name);
        let mut list = ModuleList::new();
        for module in &self.spec.modules {
            resolver.resolve_into(&path::join(&self.src_dir, module), &mut list)?;
        }
        list.include.extend(
            self.spec
                .extra_files
                .iter()
                .map(|extra| path::join(&self.src_dir, &path::unify_path(extra))),
        );
        let libraries = selection.link_dependencies(&self.spec.libraries);
        let project = self.build_project(main_name, &self.src_dir, &list, &symbols, libraries)?;
        emitter.emit_project(&project)?;
        report.projects.push(ProjectSummary::new(&project));

        let mut variants = BTreeMap::new();
        for variant in &self.spec.variants {
            let mut variant_selection = selection.clone();
            for feature in &variant.disable {
                variant_selection
                    .set_feature_enabled(feature, false)
                    .map_err(|_| Error::Lookup {
                        name: feature.clone(),
                    })?;
            }
            variants.insert(variant.name.clone(), variant_selection.active_symbols());
        }

        let index = WorkspaceIndex {
            main_project: main_name.clone(),
            dependencies,
            symbols,
            variants,
        };
        emitter.emit_workspace(&index)?;

        Ok(report)
    }

    fn build_project(
        &self,
        name: &str,
        module_dir: &str,
        list: &ModuleList,
        symbols: &[CompactString],
        libraries: Vec<String>,
    ) -> Result<Project, Error> {
        let duplicates = DuplicateSet::find(&list.include);
        let tree = FileTreeScanner::new(self.filesystem).scan(module_dir, list)?;

        match &tree {
            None => tracing::warn!(%name, %module_dir, "project has no files"),
            Some(tree) if EMIT_TREE.read(&self.configs) => {
                tracing::info!("{name}\n{}", tree.pretty());
            }
            Some(_) => (),
        }

        let relative = module_dir
            .strip_prefix(self.src_dir.as_str())
            .unwrap_or(module_dir)
            .trim_start_matches('/');
        let file_prefix = path::join(&self.file_prefix(), relative);

        Ok(Project {
            name: name.to_string(),
            module_dir: module_dir.to_string(),
            file_prefix,
            tree,
            duplicates,
            libraries,
            symbols: symbols.to_vec(),
        })
    }
}

impl ProjectSummary {
    fn new(project: &Project) -> Self {
        ProjectSummary {
            name: project.name.clone(),
            files: project.tree.as_ref().map_or(0, |tree| tree.file_count()),
            duplicates: project.duplicates.len(),
        }
    }
}
