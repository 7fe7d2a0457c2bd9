//! String based path helpers.
//!
//! Paths flowing through `modgen` are plain `/`-separated strings, rooted at whatever the user
//! passed as the source directory. Keeping them as strings makes prefix matching against module
//! lists exact and independent of the host's path conventions.

/// Converts every `\` in `path` into a `/`.
pub fn unify_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// [`unify_path`], additionally removing a single trailing `/`.
pub fn unify_dir(path: &str) -> String {
    let mut unified = unify_path(path);
    if unified.len() > 1 && unified.ends_with('/') {
        unified.pop();
    }
    unified
}

/// Returns the last component of a `/`-separated path.
pub fn last_component(path: &str) -> &str {
    match path.rfind('/') {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

/// Returns everything before the last `/`, or an empty string when there is none.
pub fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(pos) => &path[..pos],
        None => "",
    }
}

/// Splits a filename (no directories) into `(stem, extension)` at the last `.`.
///
/// The extension does not include the dot and is empty when there is no dot.
pub fn split_filename(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(dot) => (&filename[..dot], &filename[dot + 1..]),
        None => (filename, ""),
    }
}

/// Joins `base` and `rest` with a single `/`.
pub fn join(base: &str, rest: &str) -> String {
    if base.is_empty() {
        return rest.to_string();
    }
    if rest.is_empty() {
        return base.to_string();
    }
    let base = base.strip_suffix('/').unwrap_or(base);
    let rest = rest.strip_prefix('/').unwrap_or(rest);
    format!("{base}/{rest}")
}

/// Returns true if `path` lies strictly underneath `dir`, i.e. `path` starts with `dir` followed
/// by a `/`.
pub fn is_under(path: &str, dir: &str) -> bool {
    path.len() > dir.len() && path.starts_with(dir) && path.as_bytes()[dir.len()] == b'/'
}
