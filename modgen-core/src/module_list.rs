//! Evaluation of module descriptors (`module.mk`) into include and exclude lists.
//!
//! A descriptor is a tiny subset of make:
//!
//! ```text
//! MODULE := engines/gob
//!
//! MODULE_OBJS := \
//!     gob.o \
//!     video.o
//!
//! ifdef ENABLE_GOB_EXTRA
//! MODULE_OBJS += extra.o
//! else
//! MODULE_OBJS += stub.o
//! endif
//! ```
//!
//! Object entries inside an active conditional block are included, everything else is excluded.
//! Paths are rooted at the directory that holds the descriptor.

use compact_str::CompactString;
use modgen_filesystem::Filesystem;
use modgen_ore::path;
use smallvec::SmallVec;

use crate::error::{Error, StructuralError};
use crate::tokenize::tokenize;

/// Paths selected, and rejected, by one or more module descriptors.
///
/// The include list always starts with the descriptor file itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleList {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl ModuleList {
    pub fn new() -> Self {
        ModuleList::default()
    }
}

#[derive(Debug, Clone, Copy)]
struct ConditionalFrame {
    /// Whether the block enclosing this one is active.
    enclosing: bool,
    active: bool,
}

/// Nesting of `ifdef`/`ifndef`/`else`/`endif` blocks.
///
/// The bottom frame is the file itself, which is always active.
#[derive(Debug, Clone)]
pub struct ConditionalStack {
    frames: SmallVec<[ConditionalFrame; 8]>,
}

impl Default for ConditionalStack {
    fn default() -> Self {
        ConditionalStack::new()
    }
}

impl ConditionalStack {
    pub fn new() -> Self {
        let mut frames = SmallVec::new();
        frames.push(ConditionalFrame {
            enclosing: true,
            active: true,
        });
        ConditionalStack { frames }
    }

    /// Whether entries at the current position are included.
    pub fn is_active(&self) -> bool {
        self.frames.last().is_some_and(|frame| frame.active)
    }

    /// Open a block whose own condition is `condition`.
    pub fn push(&mut self, condition: bool) {
        let enclosing = self.is_active();
        self.frames.push(ConditionalFrame {
            enclosing,
            active: enclosing && condition,
        });
    }

    /// Handle an `else`.
    pub fn flip(&mut self) -> Result<(), StructuralError> {
        if self.frames.len() <= 1 {
            return Err(StructuralError::UnmatchedElse);
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.active = frame.enclosing && !frame.active;
        }
        Ok(())
    }

    /// Handle an `endif`.
    pub fn pop(&mut self) -> Result<(), StructuralError> {
        if self.frames.len() <= 1 {
            return Err(StructuralError::UnmatchedEndif);
        }
        self.frames.pop();
        Ok(())
    }

    /// Check that every opened block was closed.
    pub fn finish(&self) -> Result<(), StructuralError> {
        match self.frames.len() {
            1 => Ok(()),
            depth => Err(StructuralError::UnbalancedConditionals { open: depth - 1 }),
        }
    }
}

/// Evaluates module descriptors against a set of active symbols.
pub struct ModuleListResolver<'a> {
    filesystem: &'a dyn Filesystem,
    symbols: &'a [CompactString],
    descriptor_filename: &'a str,
}

impl<'a> ModuleListResolver<'a> {
    pub fn new(
        filesystem: &'a dyn Filesystem,
        symbols: &'a [CompactString],
        descriptor_filename: &'a str,
    ) -> Self {
        ModuleListResolver {
            filesystem,
            symbols,
            descriptor_filename,
        }
    }

    /// Resolve the descriptor in `module_dir` into a fresh [`ModuleList`].
    pub fn resolve(&self, module_dir: &str) -> Result<ModuleList, Error> {
        let mut list = ModuleList::new();
        self.resolve_into(module_dir, &mut list)?;
        Ok(list)
    }

    /// Resolve the descriptor in `module_dir`, appending to `list`.
    pub fn resolve_into(&self, module_dir: &str, list: &mut ModuleList) -> Result<(), Error> {
        let descriptor = path::join(module_dir, self.descriptor_filename);
        tracing::debug!(%descriptor, "resolving module");
        let text = self.filesystem.read_to_string(&descriptor)?;
        evaluate(module_dir, &descriptor, &text, self.symbols, list)
    }
}

/// Evaluate the descriptor `text`, stored at `descriptor`, for the module rooted at `module_dir`.
pub fn evaluate(
    module_dir: &str,
    descriptor: &str,
    text: &str,
    symbols: &[CompactString],
    list: &mut ModuleList,
) -> Result<(), Error> {
    let structural = |kind: StructuralError| Error::structural(descriptor, kind);
    let is_defined = |symbol: &str| symbols.iter().any(|s| s.as_str() == symbol);

    list.include.push(descriptor.to_string());

    let mut conditionals = ConditionalStack::new();
    let mut has_module = false;
    let mut lines = text.lines();

    while let Some(line) = lines.next() {
        let tokens = tokenize(line);
        let Some(&directive) = tokens.first() else {
            continue;
        };

        match directive {
            "MODULE" => {
                if has_module {
                    return Err(structural(StructuralError::DuplicateModule));
                }
                if tokens.len() < 3 || tokens[1] != ":=" {
                    return Err(structural(StructuralError::MalformedModule));
                }
                let root = path::unify_dir(tokens[2]);
                let matches = module_dir == root || module_dir.ends_with(&format!("/{root}"));
                if !matches {
                    return Err(structural(StructuralError::ModuleRootMismatch {
                        root,
                        dir: module_dir.to_string(),
                    }));
                }
                has_module = true;
            }
            "MODULE_OBJS" => {
                if tokens.len() < 3 || !matches!(tokens[1], ":=" | "+=" | "=") {
                    return Err(structural(StructuralError::MalformedModuleObjs));
                }
                let target = if conditionals.is_active() {
                    &mut list.include
                } else {
                    &mut list.exclude
                };

                let mut current = tokens[2..].to_vec();
                let mut idx = 0;
                while idx < current.len() {
                    let token = current[idx];
                    idx += 1;

                    let (entry, continues) = match token.strip_suffix('\\') {
                        Some(entry) => (entry, true),
                        None => (token, false),
                    };
                    if !entry.is_empty() {
                        target.push(path::join(module_dir, &path::unify_path(entry)));
                    }
                    if continues {
                        current = lines.next().map(tokenize).unwrap_or_default();
                        idx = 0;
                    }
                }
            }
            "ifdef" | "ifndef" => {
                let Some(&symbol) = tokens.get(1) else {
                    return Err(structural(StructuralError::MalformedConditional {
                        directive: directive.to_string(),
                    }));
                };
                let defined = is_defined(symbol);
                conditionals.push(if directive == "ifdef" { defined } else { !defined });
            }
            // Value comparisons are never evaluated, their blocks are always inactive.
            "ifeq" | "ifneq" => conditionals.push(false),
            "else" => conditionals.flip().map_err(structural)?,
            "endif" => conditionals.pop().map_err(structural)?,
            "elif" => {
                return Err(structural(StructuralError::UnsupportedConstruct {
                    directive: directive.to_string(),
                }));
            }
            _ => (),
        }
    }

    conditionals.finish().map_err(structural)?;
    if !has_module {
        return Err(structural(StructuralError::MissingModule));
    }
    Ok(())
}
