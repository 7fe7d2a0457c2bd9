use modgen_cfg::{Config, ConfigSetBuilder};
use modgen_filesystem::Filesystem;
use modgen_ore::path;
use serde::Deserialize;

use crate::error::{Error, StructuralError};

pub static OUTPUT_DIR: Config<&'static str> = Config::new(
    "output_dir",
    "Directory the generated project manifests are written to.",
    ".",
);

pub static FILE_PREFIX: Config<&'static str> = Config::new(
    "file_prefix",
    "Prefix for file paths inside generated projects, empty means the source directory.",
    "",
);

pub static WORKSPACE_FILENAME: Config<&'static str> = Config::new(
    "workspace_filename",
    "The filename, at the root of the source tree, that describes the generated workspace.",
    "modgen.toml",
);

pub static CONFIGURE_FILENAME: Config<&'static str> = Config::new(
    "configure_filename",
    "The filename, at the root of the source tree, that declares every component.",
    "configure",
);

pub static MODULE_FILENAME: Config<&'static str> = Config::new(
    "module_filename",
    "The filename of the descriptor inside every module directory.",
    "module.mk",
);

pub static COMPONENTS_DIR: Config<&'static str> = Config::new(
    "components_dir",
    "Directory, relative to the source tree, holding one module directory per component.",
    "engines",
);

pub static EMIT_TREE: Config<bool> = Config::new(
    "emit_tree",
    "Log the file tree of every generated project.",
    false,
);

pub(crate) fn register_configs(builder: &mut ConfigSetBuilder) {
    builder
        .register(&OUTPUT_DIR)
        .register(&FILE_PREFIX)
        .register(&WORKSPACE_FILENAME)
        .register(&CONFIGURE_FILENAME)
        .register(&MODULE_FILENAME)
        .register(&COMPONENTS_DIR)
        .register(&EMIT_TREE);
}

/// Layout of the generated workspace, parsed from a [`WORKSPACE_FILENAME`].
///
/// Every key is optional, a missing file means [`WorkspaceSpec::default`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkspaceSpec {
    /// Name of the project that builds the shared code and links everything.
    pub main_project: String,
    /// Module directories, relative to the source tree, resolved into the main project.
    pub modules: Vec<String>,
    /// Files, relative to the source tree, added to the main project without a descriptor.
    pub extra_files: Vec<String>,
    /// Libraries linked after those of the enabled features.
    pub libraries: Vec<String>,
    /// Extra symbol sets, each derived from the selection with some features turned off.
    pub variants: Vec<VariantSpec>,
}

impl Default for WorkspaceSpec {
    fn default() -> Self {
        fn strings(values: &[&str]) -> Vec<String> {
            values.iter().map(|value| value.to_string()).collect()
        }

        WorkspaceSpec {
            main_project: "scummvm".to_string(),
            modules: strings(&[
                "backends",
                "backends/platform/sdl",
                "base",
                "common",
                "engines",
                "graphics",
                "gui",
                "sound",
                "sound/softsynth/mt32",
            ]),
            extra_files: strings(&[
                "icons/scummvm.ico",
                "dists/scummvm.rc",
                "AUTHORS",
                "COPYING",
                "COPYING.LGPL",
                "COPYRIGHT",
                "NEWS",
                "README",
                "TODO",
            ]),
            libraries: strings(&["winmm.lib", "sdl.lib"]),
            variants: vec![VariantSpec {
                name: "x64".to_string(),
                disable: strings(&["nasm"]),
            }],
        }
    }
}

impl WorkspaceSpec {
    pub fn from_toml(raw: &str) -> Result<Self, anyhow::Error> {
        let workspace = toml::from_str(raw)?;
        Ok(workspace)
    }

    /// Load the spec at `<src_dir>/<filename>`, falling back to the default if there isn't one.
    pub fn load(filesystem: &dyn Filesystem, src_dir: &str, filename: &str) -> Result<Self, Error> {
        let spec_path = path::join(src_dir, filename);
        if !filesystem.is_file(&spec_path) {
            return Ok(WorkspaceSpec::default());
        }

        let raw = filesystem.read_to_string(&spec_path)?;
        let spec = WorkspaceSpec::from_toml(&raw).map_err(|err| {
            let kind = StructuralError::MalformedWorkspace {
                message: err.to_string(),
            };
            Error::structural(&spec_path, kind)
        })?;
        tracing::info!(path = %spec_path, "loaded workspace spec");

        Ok(spec)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariantSpec {
    pub name: String,
    /// Features disabled in this variant.
    #[serde(default)]
    pub disable: Vec<String>,
}
