//! Account pattern matching.
//!
//! A pattern either names an account family literally (`Expenses:Food`, which
//! covers the account itself and every `:`-delimited descendant) or carries a
//! shell-style wildcard (`Expenses:*`), where `*` matches any run of
//! characters including the `:` delimiter.

/// Checks whether `account` falls under `pattern`.
///
/// Wildcard patterns are glob-matched against the full account name. Literal
/// patterns match the account itself and any descendant reached through a
/// `:` segment boundary.
pub fn account_matches(account: &str, pattern: &str) -> bool {
    if pattern.contains('*') {
        return glob_match(account, pattern);
    }
    account == pattern
        || account
            .strip_prefix(pattern)
            .is_some_and(|rest| rest.starts_with(':'))
}

/// Checks whether the `child` pattern is structurally contained in `parent`.
///
/// A wildcard parent contains every pattern its glob matches (the child is
/// compared as a literal string). A literal parent contains only strict
/// descendants; a pattern is never its own subset.
pub fn is_subset(child: &str, parent: &str) -> bool {
    if parent.contains('*') {
        return glob_match(child, parent);
    }
    child
        .strip_prefix(parent)
        .is_some_and(|rest| rest.starts_with(':'))
}

/// Strips a trailing `:*` or `*` so the pattern can be shown (and linked) as
/// a plain account name.
pub fn display_name(pattern: &str) -> &str {
    if let Some(stripped) = pattern.strip_suffix(":*") {
        stripped
    } else if let Some(stripped) = pattern.strip_suffix('*') {
        stripped
    } else {
        pattern
    }
}

/// Glob matching over `*` segments: the first segment anchors at the start,
/// the last at the end, and interior segments are located left to right.
fn glob_match(text: &str, pattern: &str) -> bool {
    let mut segments = pattern.split('*');

    let first = segments.next().unwrap_or("");
    if !text.starts_with(first) {
        return false;
    }
    let mut pos = first.len();

    let mut interior: Vec<&str> = segments.collect();
    let Some(last) = interior.pop() else {
        // No '*' in the pattern at all.
        return text == pattern;
    };

    for segment in interior {
        if segment.is_empty() {
            continue;
        }
        match text[pos..].find(segment) {
            Some(offset) => pos += offset + segment.len(),
            None => return false,
        }
    }

    last.is_empty() || text[pos..].ends_with(last)
}
