//! Utilities for reading environment variables.

use std::ffi::OsStr;

/// Returns true if the environment variable is set, and is _not_ one of the following:
/// `'0', '', 'no', 'false'`.
pub fn is_truthy<K: AsRef<OsStr>>(var: K) -> bool {
    static FALSEY: &[&str] = &["0", "", "no", "false"];

    let Some(mut value) = std::env::var_os(var) else {
        return false;
    };

    value.make_ascii_lowercase();
    !FALSEY.iter().any(|falsey| value == *falsey)
}
