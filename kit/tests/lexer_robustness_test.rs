//! The lexer and parser must survive any prefix of a document: every byte is
//! covered by exactly one token and nothing panics.

use tomltree::*;

const DOCUMENT: &str = r#"# header comment
title = "TOML \"Example\" é"
[owner]
dob = 1979-05-27 07:32:00-08:00 # trailing
lines = """
  two \
  lines"""
raw = '''x'y'''
[database]
ports = [ 8000, 8001, [1.5e3, -inf], { a.b = 'c' } ]
"quoted key" = { x = 0xff, y = [true, false] }
[[products]]
name = "日本語"
"#;

fn assert_covers(source: &str) {
    let tokens = tokenize(source);
    let start = if source.starts_with('\u{feff}') { 3 } else { 0 };
    let mut expected = start;
    for tok in &tokens {
        assert_eq!(tok.span.start, expected, "gap before {tok:?} in {source:?}");
        assert!(tok.span.end > tok.span.start, "empty token {tok:?} in {source:?}");
        expected = tok.span.end;
    }
    assert_eq!(expected, source.len(), "uncovered tail in {source:?}");
}

#[test]
fn every_prefix_is_covered() {
    let mut prefix = DOCUMENT;
    loop {
        assert_covers(prefix);
        let _ = parse(prefix);
        let Some((last, _)) = prefix.char_indices().next_back() else {
            break;
        };
        prefix = &prefix[..last];
    }
}

#[test]
fn every_suffix_is_covered() {
    for (index, _) in DOCUMENT.char_indices() {
        let suffix = &DOCUMENT[index..];
        assert_covers(suffix);
        let _ = parse(suffix);
    }
}

#[test]
fn complete_document_is_valid() {
    let toml = parse(DOCUMENT);
    assert!(toml.is_valid(), "{:?}", toml.errors());
    assert!(toml.get_string("database/quoted key/y/1").is_none());
    assert_eq!(toml.get_bool("database/quoted key/y/1"), Some(false));
    assert_eq!(toml.get_string("owner/lines"), Some("  two lines"));
    assert_eq!(toml.get_string("owner/raw"), Some("x'y"));
    assert_eq!(toml.get_string("products/0/name"), Some("日本語"));
}

#[test]
fn stray_bytes_do_not_panic() {
    for source in [
        "\u{feff}",
        "\"",
        "'''",
        "[[",
        "]]",
        "a = [[[[",
        "a = {{{{",
        "a = \"\\",
        "a = \"\"\"\\",
        "a = 1979-",
        "= = =",
        "\r",
        "a = \r",
        "\u{0}",
        "😀 = 1",
    ] {
        assert_covers(source);
        let _ = parse(source);
    }
}
