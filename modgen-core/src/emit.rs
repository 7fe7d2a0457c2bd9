//! Handing resolved projects to something that writes them out.
//!
//! [`Project`] is the fully resolved description of a single project, [`ProjectEmitter`] turns
//! it into whatever a downstream build tool consumes. [`ManifestEmitter`] writes neutral TOML
//! manifests, [`MemoryEmitter`] just keeps everything around.

use std::collections::BTreeMap;

use compact_str::CompactString;
use modgen_filesystem::Filesystem;
use modgen_ore::path;
use modgen_tree::FileNode;
use serde::Serialize;

use crate::duplicates::{object_name, produces_object, DuplicateSet};
use crate::error::Error;

/// Everything needed to emit a single project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    /// Directory the project was scanned from.
    pub module_dir: String,
    /// Prepended to every file path in the emitted project.
    pub file_prefix: String,
    /// `None` when nothing in the module directory is relevant.
    pub tree: Option<FileNode>,
    pub duplicates: DuplicateSet,
    pub libraries: Vec<String>,
    pub symbols: Vec<CompactString>,
}

impl Project {
    /// Every file of the project, depth-first in tree order.
    pub fn files(&self) -> Vec<ProjectFile> {
        let Some(tree) = &self.tree else {
            return Vec::new();
        };

        tree.files()
            .map(|entry| {
                let relative = entry.relative_path();
                let object = if produces_object(entry.name) {
                    object_name(entry.name).map(|object| {
                        let qualify = self.duplicates.needs_qualifying(entry.name);
                        if qualify && !entry.dirs.is_empty() {
                            format!("{}_{object}", entry.dirs.join("_"))
                        } else {
                            object.to_string()
                        }
                    })
                } else {
                    None
                };
                ProjectFile {
                    path: path::join(&self.file_prefix, &relative),
                    kind: if object.is_some() {
                        FileKind::Compile
                    } else {
                        FileKind::Other
                    },
                    object,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Compile,
    Other,
}

/// A single file inside an emitted project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectFile {
    pub path: String,
    pub kind: FileKind,
    /// Output object name for compile units, qualified when its basename is a duplicate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
}

/// Ties all of the emitted projects together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceIndex {
    pub main_project: String,
    /// Component projects the main project depends on, in emission order.
    pub dependencies: Vec<String>,
    pub symbols: Vec<CompactString>,
    /// Symbol set of every build variant, by variant name.
    pub variants: BTreeMap<String, Vec<CompactString>>,
}

/// Writes resolved projects somewhere.
pub trait ProjectEmitter {
    fn emit_project(&mut self, project: &Project) -> Result<(), Error>;
    fn emit_workspace(&mut self, index: &WorkspaceIndex) -> Result<(), Error>;
}

/// Writes a `<name>.project.toml` per project and a `<main>.workspace.toml` index.
pub struct ManifestEmitter<'a> {
    filesystem: &'a dyn Filesystem,
    output_dir: String,
}

impl<'a> ManifestEmitter<'a> {
    pub fn new(filesystem: &'a dyn Filesystem, output_dir: impl Into<String>) -> Self {
        ManifestEmitter {
            filesystem,
            output_dir: output_dir.into(),
        }
    }

    fn write<T: Serialize>(&self, filename: &str, manifest: &T) -> Result<(), Error> {
        let manifest_path = path::join(&self.output_dir, filename);
        let contents = toml::to_string_pretty(manifest).map_err(|err| Error::Emit {
            path: manifest_path.clone(),
            message: err.to_string(),
        })?;

        self.filesystem.create_dir_all(&self.output_dir)?;
        self.filesystem.write(&manifest_path, &contents)?;
        tracing::info!(path = %manifest_path, "wrote manifest");

        Ok(())
    }
}

#[derive(Serialize)]
struct ProjectManifest<'a> {
    project: ProjectHeader<'a>,
    files: Vec<ProjectFile>,
}

#[derive(Serialize)]
struct ProjectHeader<'a> {
    name: &'a str,
    root: &'a str,
    symbols: Vec<&'a str>,
    libraries: &'a [String],
}

#[derive(Serialize)]
struct WorkspaceManifest<'a> {
    workspace: WorkspaceHeader<'a>,
    variants: BTreeMap<&'a str, VariantManifest<'a>>,
}

#[derive(Serialize)]
struct WorkspaceHeader<'a> {
    main: &'a str,
    dependencies: &'a [String],
    symbols: Vec<&'a str>,
}

#[derive(Serialize)]
struct VariantManifest<'a> {
    symbols: Vec<&'a str>,
}

fn as_strs(symbols: &[CompactString]) -> Vec<&str> {
    symbols.iter().map(CompactString::as_str).collect()
}

impl ProjectEmitter for ManifestEmitter<'_> {
    fn emit_project(&mut self, project: &Project) -> Result<(), Error> {
        let manifest = ProjectManifest {
            project: ProjectHeader {
                name: &project.name,
                root: &project.file_prefix,
                symbols: as_strs(&project.symbols),
                libraries: &project.libraries,
            },
            files: project.files(),
        };
        self.write(&format!("{}.project.toml", project.name), &manifest)
    }

    fn emit_workspace(&mut self, index: &WorkspaceIndex) -> Result<(), Error> {
        let manifest = WorkspaceManifest {
            workspace: WorkspaceHeader {
                main: &index.main_project,
                dependencies: &index.dependencies,
                symbols: as_strs(&index.symbols),
            },
            variants: index
                .variants
                .iter()
                .map(|(name, symbols)| {
                    let symbols = as_strs(symbols);
                    (name.as_str(), VariantManifest { symbols })
                })
                .collect(),
        };
        self.write(&format!("{}.workspace.toml", index.main_project), &manifest)
    }
}

/// Keeps every emitted project in memory.
#[derive(Debug, Default)]
pub struct MemoryEmitter {
    pub projects: Vec<Project>,
    pub workspace: Option<WorkspaceIndex>,
}

impl MemoryEmitter {
    pub fn new() -> Self {
        MemoryEmitter::default()
    }

    pub fn project(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|project| project.name == name)
    }
}

impl ProjectEmitter for MemoryEmitter {
    fn emit_project(&mut self, project: &Project) -> Result<(), Error> {
        self.projects.push(project.clone());
        Ok(())
    }

    fn emit_workspace(&mut self, index: &WorkspaceIndex) -> Result<(), Error> {
        self.workspace = Some(index.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use modgen_filesystem::memory::MemoryFilesystem;

    use super::*;

    fn project() -> Project {
        let tree = FileNode::directory(
            "src/x",
            vec![
                FileNode::directory(
                    "dirA",
                    vec![FileNode::file("foo.cpp"), FileNode::file("foo.h")],
                )
                .unwrap(),
                FileNode::directory("dirB", vec![FileNode::file("foo.cpp")]).unwrap(),
                FileNode::file("main.cpp"),
                FileNode::file("module.mk"),
            ],
        );
        let include: Vec<String> = ["src/x/dirA/foo.o", "src/x/dirB/foo.o", "src/x/main.o"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        Project {
            name: "x".to_string(),
            module_dir: "src/x".to_string(),
            file_prefix: "../src/x".to_string(),
            tree,
            duplicates: DuplicateSet::find(&include),
            libraries: vec!["sdl.lib".to_string()],
            symbols: vec![CompactString::from("ENABLE_X")],
        }
    }

    #[test]
    fn smoketest_files() {
        let files = project().files();
        let summary: Vec<_> = files
            .iter()
            .map(|file| (file.path.as_str(), file.object.as_deref()))
            .collect();
        assert_eq!(
            summary,
            [
                ("../src/x/dirA/foo.cpp", Some("dirA_foo.o")),
                ("../src/x/dirA/foo.h", None),
                ("../src/x/dirB/foo.cpp", Some("dirB_foo.o")),
                ("../src/x/main.cpp", Some("main.o")),
                ("../src/x/module.mk", None),
            ]
        );
        assert_eq!(files[1].kind, FileKind::Other);
        assert_eq!(files[3].kind, FileKind::Compile);
    }

    #[test]
    fn root_level_duplicates_stay_unqualified() {
        let tree = FileNode::directory(
            "src/x",
            vec![
                FileNode::directory("sub", vec![FileNode::file("foo.cpp")]).unwrap(),
                FileNode::file("foo.cpp"),
            ],
        );
        let include = vec!["src/x/foo.o".to_string(), "src/x/sub/foo.o".to_string()];
        let project = Project {
            tree,
            duplicates: DuplicateSet::find(&include),
            ..project()
        };

        let objects: Vec<_> = project.files().into_iter().map(|file| file.object).collect();
        assert_eq!(
            objects,
            [Some("sub_foo.o".to_string()), Some("foo.o".to_string())]
        );
    }

    #[test]
    fn empty_project_has_no_files() {
        let project = Project {
            tree: None,
            ..project()
        };
        assert!(project.files().is_empty());
    }

    #[test]
    fn smoketest_manifest() {
        let fs = MemoryFilesystem::new();
        let mut emitter = ManifestEmitter::new(&fs, "out");
        emitter.emit_project(&project()).unwrap();

        let manifest = fs.contents("out/x.project.toml").unwrap();
        let value: toml::Value = toml::from_str(&manifest).unwrap();
        assert_eq!(value["project"]["name"].as_str(), Some("x"));
        assert_eq!(value["project"]["libraries"][0].as_str(), Some("sdl.lib"));
        let files = value["files"].as_array().unwrap();
        assert_eq!(files.len(), 5);
        assert_eq!(files[0]["object"].as_str(), Some("dirA_foo.o"));
        assert_eq!(files[1]["kind"].as_str(), Some("other"));
        assert!(files[1].get("object").is_none());

        let mut index = WorkspaceIndex {
            main_project: "main".to_string(),
            dependencies: vec!["x".to_string()],
            symbols: vec![CompactString::from("ENABLE_X"), CompactString::from("HAVE_NASM")],
            variants: BTreeMap::new(),
        };
        index
            .variants
            .insert("x64".to_string(), vec![CompactString::from("ENABLE_X")]);
        emitter.emit_workspace(&index).unwrap();

        let manifest = fs.contents("out/main.workspace.toml").unwrap();
        let value: toml::Value = toml::from_str(&manifest).unwrap();
        assert_eq!(value["workspace"]["dependencies"][0].as_str(), Some("x"));
        assert_eq!(value["variants"]["x64"]["symbols"].as_array().map(Vec::len), Some(1));
    }
}
