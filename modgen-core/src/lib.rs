//! Build configuration resolver and project generator.
//!
//! Given a source tree annotated with a component list (`configure`) and per-directory module
//! descriptors (`module.mk`), `modgen` works out exactly which files a chosen configuration
//! compiles and hands that to a [`ProjectEmitter`].
//!
//! The pipeline, leaves first:
//!
//! 1. [`ComponentRegistry`] and [`FeatureRegistry`] describe what can be selected.
//! 2. [`BuildSelection`] records what _is_ selected and derives the active symbols.
//! 3. [`ModuleListResolver`] evaluates a module descriptor against those symbols into an include
//!    and exclude list.
//! 4. [`FileTreeScanner`] walks a directory, keeping only what the lists make relevant.
//! 5. [`DuplicateSet`] finds object files that would collide by basename.
//! 6. [`Generator`] strings it all together for one run.
//!
//! [`ProjectEmitter`]: crate::emit::ProjectEmitter

pub mod cfgs;
pub mod component;
pub mod defs;
pub mod duplicates;
pub mod emit;
pub mod error;
pub mod feature;
pub mod generator;
pub mod module_list;
pub mod scanner;
pub mod selection;
pub mod tokenize;


pub use component::{ComponentDescriptor, ComponentRegistry};
pub use duplicates::DuplicateSet;
pub use error::{Error, StructuralError};
pub use feature::{Feature, FeatureRegistry};
pub use generator::{GenerationReport, Generator, GeneratorConfig};
pub use module_list::{ModuleList, ModuleListResolver};
pub use scanner::FileTreeScanner;
pub use selection::BuildSelection;
