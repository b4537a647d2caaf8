//! Offline content bundle.
//!
//! Pages normally `fetch()` their Markdown, which browsers refuse for
//! `file://` URLs. The bundle embeds every document in one script so the
//! site also works when opened straight from disk:
//!
//! ```js
//! if (!location.protocol.startsWith('http')) {
//!   window.projectsContent = {
//!     'chair': `# Chair ...`,
//!     'lamp': `# Lamp ...`,
//!   };
//! }
//! ```
//!
//! Served deployments never install the table. Content is copied verbatim
//! and escaped for a JavaScript template literal.
//!
//! Keys are filename stems, so `2023/chair.md` and `2024/chair.md` collide.
//! The later file in traversal order (see [`crate::scan`]) replaces the
//! earlier one's content; the entry keeps its original position. Each
//! collision is recorded in the [`BundleReport`].

use crate::scan;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("IO error writing {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Insertion-ordered key → content table.
#[derive(Debug, Clone, Default)]
pub struct BundleTable {
    entries: Vec<(String, String)>,
    /// key → position in `entries`
    index: HashMap<String, usize>,
}

impl BundleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. Returns the previous content for a repeated key.
    pub fn insert(&mut self, key: String, content: String) -> Option<String> {
        match self.index.get(&key) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, content)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, content));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&pos| self.entries[pos].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Escape text for a JavaScript template literal (`` `...` ``).
///
/// Backslashes go first so the escapes added for `` ` `` and `${` are not
/// themselves doubled. A raw `\r` would be read back as `\n` (template
/// literals normalize line endings), so it is written as `\\r`.
pub fn escape_template_literal(content: &str) -> String {
    content
        .replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
        .replace('\r', "\\r")
}

/// Escape a key for a single-quoted JavaScript string.
///
/// Line terminators are not allowed inside such a string, so file names
/// containing them are written with escapes.
pub fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for c in key.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out
}

/// Render the table as the guarded assignment script.
pub fn render_script(table: &BundleTable, global_name: &str) -> String {
    let mut js = String::from("if (!location.protocol.startsWith('http')) {\n");
    js.push_str(&format!("  window.{global_name} = {{\n"));
    for (key, content) in table.iter() {
        js.push_str(&format!(
            "    '{}': `{}`,\n",
            escape_key(key),
            escape_template_literal(content)
        ));
    }
    js.push_str("  };\n");
    js.push_str("}\n");
    js
}

/// A key that was bundled from one file and then replaced by another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCollision {
    pub key: String,
    pub replaced: PathBuf,
    pub winner: PathBuf,
}

#[derive(Debug, Default)]
pub struct BundleReport {
    pub source: PathBuf,
    pub output: PathBuf,
    /// False when the source directory did not exist.
    pub source_found: bool,
    pub table: BundleTable,
    /// Path each key currently comes from.
    pub origins: HashMap<String, PathBuf>,
    pub collisions: Vec<KeyCollision>,
    pub unreadable: Vec<(PathBuf, String)>,
}

/// Read every document under `source` into a table.
///
/// A missing `source` gives an empty table; unreadable files are skipped
/// and recorded.
pub fn collect(source: &Path, extensions: &[String]) -> BundleReport {
    let mut report = BundleReport {
        source: source.to_path_buf(),
        source_found: source.is_dir(),
        ..BundleReport::default()
    };

    for path in scan::markdown_files(source, extensions) {
        let doc = match scan::read_document(&path, extensions) {
            Ok(doc) => doc,
            Err(e) => {
                report.unreadable.push((path, e.to_string()));
                continue;
            }
        };
        if let Some(previous) = report.origins.insert(doc.key.clone(), doc.path.clone()) {
            report.collisions.push(KeyCollision {
                key: doc.key.clone(),
                replaced: previous,
                winner: doc.path.clone(),
            });
        }
        report.table.insert(doc.key, doc.content);
    }

    report
}

/// Collect `source` and write the script to `output`.
pub fn bundle(
    source: &Path,
    output: &Path,
    extensions: &[String],
    global_name: &str,
) -> Result<BundleReport, BundleError> {
    let mut report = collect(source, extensions);
    report.output = output.to_path_buf();

    let write_err = |source: std::io::Error| BundleError::Write {
        path: output.to_path_buf(),
        source,
    };
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(output, render_script(&report.table, global_name)).map_err(write_err)?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{md_extensions, write_file};
    use tempfile::TempDir;

    /// Undo [`escape_template_literal`]. A raw `\r` is rejected because a
    /// JS engine would turn it (or `\r\n`) into `\n`.
    fn decode_template_literal(literal: &str) -> String {
        let mut out = String::with_capacity(literal.len());
        let mut chars = literal.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                match chars.next() {
                    Some(next @ ('\\' | '`' | '$')) => out.push(next),
                    Some('r') => out.push('\r'),
                    other => panic!("unexpected escape: \\{other:?}"),
                }
            } else {
                assert_ne!(c, '`', "unescaped backtick in literal");
                assert_ne!(c, '\r', "raw carriage return in literal");
                out.push(c);
            }
        }
        out
    }

    /// Check that no `${` survives unescaped.
    fn has_live_substitution(literal: &str) -> bool {
        let bytes = literal.as_bytes();
        (0..bytes.len().saturating_sub(1)).any(|i| {
            bytes[i] == b'$' && bytes[i + 1] == b'{' && (i == 0 || bytes[i - 1] != b'\\')
        })
    }

    // =========================================================================
    // Escaping
    // =========================================================================

    #[test]
    fn escape_backtick() {
        assert_eq!(escape_template_literal("B`C"), "B\\`C");
    }

    #[test]
    fn escape_backslash_first() {
        assert_eq!(escape_template_literal("a\\`b"), "a\\\\\\`b");
        assert_eq!(escape_template_literal("\\${x}"), "\\\\\\${x}");
    }

    #[test]
    fn escape_substitution_marker() {
        assert_eq!(escape_template_literal("cost: ${price}"), "cost: \\${price}");
        // A lone `$` or `{` is harmless
        assert_eq!(escape_template_literal("$5 {x}"), "$5 {x}");
    }

    #[test]
    fn escaping_round_trips() {
        let samples = [
            "plain",
            "B`C",
            "C:\\path\\to\\file",
            "```rust\nlet x = `${y}`;\n```",
            "\\`\\${}\\\\",
            "trailing backslash \\",
            "$${{}}",
            "line1\nline2\r\n\ttab",
            "unicode ✓ — ü",
        ];
        for sample in samples {
            let escaped = escape_template_literal(sample);
            assert!(!has_live_substitution(&escaped), "live ${{ in {escaped:?}");
            assert_eq!(decode_template_literal(&escaped), sample);
        }
    }

    #[test]
    fn escape_key_quotes() {
        assert_eq!(escape_key("it's"), "it\\'s");
        assert_eq!(escape_key("a\\b"), "a\\\\b");
        assert_eq!(escape_key("chair"), "chair");
        assert_eq!(escape_key("a\nb"), "a\\nb");
        assert_eq!(escape_key("a\r\nb"), "a\\r\\nb");
        assert_eq!(escape_key("a\u{2028}b\u{2029}"), "a\\u2028b\\u2029");
    }

    #[test]
    fn escape_carriage_return() {
        assert_eq!(escape_template_literal("a\r\nb"), "a\\r\nb");
        assert_eq!(escape_template_literal("\\r"), "\\\\r");
    }

    // =========================================================================
    // Table
    // =========================================================================

    #[test]
    fn table_keeps_insertion_order() {
        let mut table = BundleTable::new();
        table.insert("zeta".into(), "z".into());
        table.insert("alpha".into(), "a".into());
        let keys: Vec<&str> = table.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn table_replace_keeps_position() {
        let mut table = BundleTable::new();
        table.insert("a".into(), "1".into());
        table.insert("b".into(), "2".into());
        let previous = table.insert("a".into(), "3".into());

        assert_eq!(previous.as_deref(), Some("1"));
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("a"), Some("3"));
        let entries: Vec<(&str, &str)> = table.iter().collect();
        assert_eq!(entries, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn empty_table_script() {
        let js = render_script(&BundleTable::new(), "projectsContent");
        assert_eq!(
            js,
            "if (!location.protocol.startsWith('http')) {\n  window.projectsContent = {\n  };\n}\n"
        );
    }

    #[test]
    fn script_scenario() {
        let mut table = BundleTable::new();
        table.insert("foo".into(), "A".into());
        table.insert("bar".into(), "B`C".into());

        let js = render_script(&table, "projectsContent");
        assert_eq!(
            js,
            "if (!location.protocol.startsWith('http')) {\n  \
             window.projectsContent = {\n    \
             'foo': `A`,\n    \
             'bar': `B\\`C`,\n  \
             };\n}\n"
        );
    }

    #[test]
    fn script_uses_global_name() {
        let js = render_script(&BundleTable::new(), "docs");
        assert!(js.contains("window.docs = {"));
    }

    // =========================================================================
    // Collect / bundle
    // =========================================================================

    #[test]
    fn collect_reads_all_documents() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write_file(&root.join("foo.md"), "A");
        write_file(&root.join("sub/bar.md"), "B`C");
        write_file(&root.join("skip.txt"), "nope");

        let report = collect(root, &md_extensions());
        assert!(report.source_found);
        assert_eq!(report.table.len(), 2);
        assert_eq!(report.table.get("foo"), Some("A"));
        assert_eq!(report.table.get("bar"), Some("B`C"));
        assert!(report.collisions.is_empty());
    }

    #[test]
    fn later_file_wins_key_collision() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write_file(&root.join("a/chair.md"), "first");
        write_file(&root.join("b/chair.md"), "second");
        write_file(&root.join("lamp.md"), "lamp");

        let report = collect(root, &md_extensions());

        // Traversal: lamp.md, a/chair.md, b/chair.md
        assert_eq!(report.table.get("chair"), Some("second"));
        let keys: Vec<&str> = report.table.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["lamp", "chair"]);
        assert_eq!(
            report.collisions,
            vec![KeyCollision {
                key: "chair".to_string(),
                replaced: root.join("a/chair.md"),
                winner: root.join("b/chair.md"),
            }]
        );
        assert_eq!(report.origins["chair"], root.join("b/chair.md"));
    }

    #[test]
    #[cfg(unix)]
    fn newline_in_file_name_stays_on_one_script_line() {
        let tmp = TempDir::new().unwrap();
        write_file(&tmp.path().join("a\nb.md"), "x");

        let report = collect(tmp.path(), &md_extensions());
        assert_eq!(report.table.get("a\nb"), Some("x"));

        let js = render_script(&report.table, "projectsContent");
        assert!(js.contains("    'a\\nb': `x`,\n"), "{js}");
        assert_eq!(js.lines().count(), 5);
    }

    #[test]
    fn content_is_copied_verbatim() {
        let tmp = TempDir::new().unwrap();
        let content = "# Title\n\n<img src=\"/a.png\" width=\"1\" height=\"1\">\r\n\ttabs\n";
        write_file(&tmp.path().join("doc.md"), content);

        let report = collect(tmp.path(), &md_extensions());
        assert_eq!(report.table.get("doc"), Some(content));
    }

    #[test]
    fn missing_source_gives_empty_table() {
        let tmp = TempDir::new().unwrap();
        let report = collect(&tmp.path().join("nope"), &md_extensions());
        assert!(!report.source_found);
        assert!(report.table.is_empty());
    }

    #[test]
    fn unreadable_file_is_skipped() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("bad.md"), [0xff, 0xfe]).unwrap();
        write_file(&tmp.path().join("good.md"), "ok");

        let report = collect(tmp.path(), &md_extensions());
        assert_eq!(report.table.len(), 1);
        assert_eq!(report.unreadable.len(), 1);
        assert_eq!(report.unreadable[0].0, tmp.path().join("bad.md"));
    }

    #[test]
    fn bundle_writes_script_and_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("projects");
        write_file(&source.join("foo.md"), "A");
        write_file(&source.join("bar.md"), "B`C");
        let output = tmp.path().join("out/js/cache.js");

        let report = bundle(&source, &output, &md_extensions(), "projectsContent").unwrap();

        let js = fs::read_to_string(&output).unwrap();
        // Files in one directory are visited by name: bar before foo.
        assert_eq!(
            js,
            "if (!location.protocol.startsWith('http')) {\n  \
             window.projectsContent = {\n    \
             'bar': `B\\`C`,\n    \
             'foo': `A`,\n  \
             };\n}\n"
        );
        assert_eq!(report.output, output);
        assert_eq!(report.table.len(), 2);
    }

    #[test]
    fn bundle_overwrites_previous_output() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("projects");
        write_file(&source.join("a.md"), "new");
        let output = tmp.path().join("cache.js");
        fs::write(&output, "stale").unwrap();

        bundle(&source, &output, &md_extensions(), "c").unwrap();
        assert!(fs::read_to_string(&output).unwrap().contains("'a': `new`"));
    }

    #[test]
    fn bundle_write_failure_is_error() {
        let tmp = TempDir::new().unwrap();
        // Output "directory" is a regular file.
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let result = bundle(tmp.path(), &blocker.join("cache.js"), &md_extensions(), "c");
        assert!(matches!(result, Err(BundleError::Write { .. })));
    }
}
