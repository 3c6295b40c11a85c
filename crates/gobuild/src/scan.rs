//! Import clause scanning for Go source files.
//!
//! Only the file header matters: the package clause followed by import
//! declarations. Scanning stops at the first top-level declaration, and
//! comments are removed first so commented-out imports do not count.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static FIRST_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?:func|type|var|const)\b").expect("declaration pattern is valid")
});

#[allow(clippy::expect_used)]
static SINGLE_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*import\s+(?:[\p{L}_.][\p{L}\p{N}_]*\s+)?(?:"([^"\n]*)"|`([^`]*)`)"#)
        .expect("single import pattern is valid")
});

#[allow(clippy::expect_used)]
static GROUPED_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*import\s*\(([^)]*)\)").expect("grouped import pattern is valid")
});

#[allow(clippy::expect_used)]
static IMPORT_SPEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:[\p{L}_.][\p{L}\p{N}_]*\s+)?(?:"([^"\n]*)"|`([^`]*)`)"#)
        .expect("import spec pattern is valid")
});

/// Import paths declared in one Go source file, sorted and deduplicated.
#[must_use]
pub fn imports_in_source(src: &str) -> BTreeSet<String> {
    let stripped = strip_comments(src);
    let header = FIRST_DECL
        .find(&stripped)
        .map_or(stripped.as_str(), |m| &stripped[..m.start()]);

    let mut imports = BTreeSet::new();
    for caps in SINGLE_IMPORT.captures_iter(header) {
        if let Some(path) = caps.get(1).or_else(|| caps.get(2)) {
            imports.insert(path.as_str().to_string());
        }
    }
    for group in GROUPED_IMPORT.captures_iter(header) {
        let Some(body) = group.get(1) else {
            continue;
        };
        for caps in IMPORT_SPEC.captures_iter(body.as_str()) {
            if let Some(path) = caps.get(1).or_else(|| caps.get(2)) {
                imports.insert(path.as_str().to_string());
            }
        }
    }
    imports.retain(|path| !path.is_empty());
    imports
}

/// Replaces comments with whitespace, keeping string literals intact.
///
/// Line comments keep their newline and block comments are replaced by a
/// single space, so `^`-anchored patterns still line up with declarations.
fn strip_comments(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut chars = src.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    if next == '\n' {
                        out.push('\n');
                    }
                    prev = next;
                }
                out.push(' ');
            }
            '"' | '`' | '\'' => {
                out.push(c);
                let mut escaped = false;
                for next in chars.by_ref() {
                    out.push(next);
                    if c != '`' && next == '\\' && !escaped {
                        escaped = true;
                        continue;
                    }
                    if next == c && !escaped {
                        break;
                    }
                    escaped = false;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imports(src: &str) -> Vec<String> {
        imports_in_source(src).into_iter().collect()
    }

    #[test]
    fn test_single_imports() {
        let src = r#"package main

import "fmt"
import alias "example.com/lib"
import _ "example.com/sideeffect"
import . "example.com/dot"
"#;
        assert_eq!(
            imports(src),
            vec![
                "example.com/dot",
                "example.com/lib",
                "example.com/sideeffect",
                "fmt",
            ]
        );
    }

    #[test]
    fn test_grouped_imports() {
        let src = r#"package main

import (
	"fmt"
	stdlog "log"

	"github.com/example/pkg"
	_ "github.com/example/driver"; "os"
)

func main() {}
"#;
        assert_eq!(
            imports(src),
            vec![
                "fmt",
                "github.com/example/driver",
                "github.com/example/pkg",
                "log",
                "os",
            ]
        );
    }

    #[test]
    fn test_cgo_preamble_and_comments() {
        let src = r#"package native

/*
#include <stdio.h>
import "not/an/import"
*/
import "C"

// import "commented/out"
import (
	"unsafe" // trailing comment
	/* "also/commented" */
)
"#;
        assert_eq!(imports(src), vec!["C", "unsafe"]);
    }

    #[test]
    fn test_stops_at_first_declaration() {
        let src = r#"package main

import "fmt"

const doc = `
import "inside/raw/string"
`

func main() { fmt.Println(doc) }
"#;
        assert_eq!(imports(src), vec!["fmt"]);
    }

    #[test]
    fn test_raw_string_import_path() {
        assert_eq!(imports("package p\nimport `example.com/raw`\n"), vec!["example.com/raw"]);
    }

    #[test]
    fn test_comment_markers_inside_strings_are_kept() {
        let src = "package p\nimport \"example.com/a//b\"\n";
        assert_eq!(imports(src), vec!["example.com/a//b"]);
    }

    #[test]
    fn test_no_imports() {
        assert!(imports_in_source("package empty\n").is_empty());
    }
}
