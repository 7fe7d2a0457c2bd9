//! Line tokenizer shared by the component list and module descriptors.

/// Split `input` into tokens.
///
/// Tokens are separated by runs of spaces and tabs. A `"` starts a quoted token that runs to the
/// next `"` (or the end of the line) and may contain whitespace; the quotes are removed.
///
/// ```
/// use modgen_core::tokenize::tokenize;
///
/// let tokens = tokenize(r#"add_engine gob "Gobliiins" yes"#);
/// assert_eq!(tokens, vec!["add_engine", "gob", "Gobliiins", "yes"]);
/// ```
pub fn tokenize(input: &str) -> Vec<&str> {
    let is_sep = |c: char| c == ' ' || c == '\t';
    let mut tokens = Vec::new();
    let mut rest = input.trim_start_matches(is_sep);

    while !rest.is_empty() {
        if let Some(quoted) = rest.strip_prefix('"') {
            match quoted.find('"') {
                Some(end) => {
                    tokens.push(&quoted[..end]);
                    rest = &quoted[end + 1..];
                }
                None => {
                    tokens.push(quoted);
                    rest = "";
                }
            }
        } else {
            let end = rest.find(is_sep).unwrap_or(rest.len());
            tokens.push(&rest[..end]);
            rest = &rest[end..];
        }
        rest = rest.trim_start_matches(is_sep);
    }

    tokens
}
