//! Utilities for `assert!`s.

/// Asserts that the provided expression, that returns an `Option`, is `None`.
///
/// Used when registering entries into a catalogue, where a `Some` means the
/// same key was registered twice.
#[macro_export]
macro_rules! assert_none {
    ($val:expr, $($msg:tt)+) => {{
        if let Some(prev) = &$val {
            panic!("assertion failed: expected None found Some({prev:?}), {}", format!($($msg)+));
        }
    }};
    ($val:expr) => {{
        if let Some(prev) = &$val {
            panic!("assertion failed: expected None found Some({prev:?})");
        }
    }}
}

#[cfg(test)]
mod tests {
    #[test]
    fn none_passes() {
        let val: Option<u8> = None;
        assert_none!(val, "value {} should be empty", 1);
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn some_panics() {
        let val = Some("libz");
        assert_none!(val, "registered twice");
    }
}
