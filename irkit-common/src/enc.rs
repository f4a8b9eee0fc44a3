//! Identifier and string encoding
//!
//! Pure formatting helpers producing the sigils, escapes and quoted strings
//! of the textual assembly. Names are passed in bare (without sigil).

use std::fmt::Write;

/// Global identifier, e.g. `@main` or `@"foo bar"`
pub fn global(name: &str) -> String {
    format!("@{}", escape_ident(name))
}

/// Local identifier, e.g. `%x`, `%0` or `%"a b"`
pub fn local(name: &str) -> String {
    format!("%{}", escape_ident(name))
}

/// Label definition, e.g. `entry:` or `1:`
pub fn label(name: &str) -> String {
    format!("{}:", escape_ident(name))
}

/// Comdat identifier, e.g. `$foo`
pub fn comdat(name: &str) -> String {
    format!("${}", escape_ident(name))
}

/// Double-quoted string with `\XX` escapes for quotes, backslashes and
/// non-printable bytes
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    escape_into(&mut out, s);
    out.push('"');
    out
}

/// Identifier body without sigil; quoted when it contains characters
/// outside `[-a-zA-Z$._0-9]` or starts with a digit without being numeric
pub fn escape_ident(name: &str) -> String {
    if is_local_id(name) || is_plain_ident(name) {
        return name.to_string();
    }
    quote(name)
}

/// Reports whether `name` is a bare decimal ID such as `0` or `17`
pub fn is_local_id(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit())
}

fn is_plain_ident(name: &str) -> bool {
    let mut bytes = name.bytes();
    match bytes.next() {
        Some(first) if is_ident_head(first) => {
            bytes.all(|b| is_ident_head(b) || b.is_ascii_digit())
        }
        _ => false,
    }
}

fn is_ident_head(b: u8) -> bool {
    b.is_ascii_alphabetic() || matches!(b, b'$' | b'-' | b'.' | b'_')
}

fn escape_into(out: &mut String, s: &str) {
    for b in s.bytes() {
        if b == b'"' || b == b'\\' || !(0x20..0x7f).contains(&b) {
            // Writing into a String never fails.
            let _ = write!(out, "\\{:02X}", b);
        } else {
            out.push(b as char);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_identifiers() {
        assert_eq!(global("main"), "@main");
        assert_eq!(local("x.addr"), "%x.addr");
        assert_eq!(local("$tmp-1_a"), "%$tmp-1_a");
        assert_eq!(comdat("foo"), "$foo");
        assert_eq!(label("entry"), "entry:");
    }

    #[test]
    fn test_numeric_identifiers() {
        assert_eq!(local("0"), "%0");
        assert_eq!(global("42"), "@42");
        assert_eq!(label("3"), "3:");
    }

    #[test]
    fn test_quoted_identifiers() {
        assert_eq!(local("a b"), "%\"a b\"");
        assert_eq!(global("1abc"), "@\"1abc\"");
        assert_eq!(local(""), "%\"\"");
        assert_eq!(local("q\"t"), "%\"q\\22t\"");
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote(".text.hot"), "\".text.hot\"");
        assert_eq!(quote("a\\b"), "\"a\\5Cb\"");
        assert_eq!(quote("line\n"), "\"line\\0A\"");
        assert_eq!(quote("é"), "\"\\C3\\A9\"");
    }

    #[test]
    fn test_is_local_id() {
        assert!(is_local_id("0"));
        assert!(is_local_id("0012"));
        assert!(!is_local_id(""));
        assert!(!is_local_id("-1"));
        assert!(!is_local_id("x1"));
    }
}
