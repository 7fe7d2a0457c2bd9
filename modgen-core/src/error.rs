//! Errors for a generation run.
//!
//! Every [`Error`] is fatal to the run it came from. An inconsistent include list would silently
//! miscompile the generated project, so there is no best-effort fallback.

/// Top-level error for resolving and generating projects.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configuration input is malformed.
    #[error("{kind} in {path}")]
    Structural { path: String, kind: StructuralError },
    /// Reading an input or writing an output failed.
    #[error(transparent)]
    Io(#[from] modgen_filesystem::Error),
    /// A selection override named something no registry knows about.
    #[error("\"{name}\" is neither a component nor a feature")]
    Lookup { name: String },
    /// A [`ProjectEmitter`] couldn't render its output.
    ///
    /// [`ProjectEmitter`]: crate::emit::ProjectEmitter
    #[error("failed to emit {path}: {message}")]
    Emit { path: String, message: String },
}

impl Error {
    pub fn structural(path: impl Into<String>, kind: StructuralError) -> Self {
        Error::Structural {
            path: path.into(),
            kind,
        }
    }
}

/// The ways a configuration input can be malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuralError {
    #[error("malformed MODULE definition")]
    MalformedModule,
    #[error("more than one MODULE definition")]
    DuplicateModule,
    #[error("no MODULE definition")]
    MissingModule,
    #[error("MODULE root {root} does not match base dir {dir}")]
    ModuleRootMismatch { root: String, dir: String },
    #[error("malformed MODULE_OBJS definition")]
    MalformedModuleObjs,
    #[error("malformed {directive}")]
    MalformedConditional { directive: String },
    #[error("unsupported operation '{directive}'")]
    UnsupportedConstruct { directive: String },
    #[error("endif without ifdef")]
    UnmatchedEndif,
    #[error("else outside of any ifdef/ifndef block, a bare else is rejected")]
    UnmatchedElse,
    #[error("{open} conditional block(s) left open")]
    UnbalancedConditionals { open: usize },
    #[error("component '{name}' declared more than once")]
    DuplicateComponent { name: String },
    #[error("component '{parent}' lists unknown sub-component '{child}'")]
    UnknownSubComponent { parent: String, child: String },
    #[error("malformed workspace spec: {message}")]
    MalformedWorkspace { message: String },
}
