//! Builds the document tree from the syntax tree.
//!
//! The builder walks expressions in order while tracking the current
//! insertion table: the path of the last table header, re-resolved from the
//! root on every key/value and descending into the last element of arrays of
//! tables. Every table remembers how it was created, which is all TOML needs
//! to decide whether a later header or dotted key may reopen it:
//!
//! | Created by | `[header]` on it | dotted key through it | `[header.sub]` through it |
//! |---|---|---|---|
//! | deeper header (implicit) | becomes a header table | yes | yes |
//! | `[header]` | duplicate | no | yes |
//! | dotted key | error | yes | yes |
//! | inline table / array literal | error | error | error |

use std::borrow::Cow;

use indexmap::IndexMap;
use indexmap::map::Entry;
use tomltree_core::{LineIndex, ParseConfig, SpannedError};

use crate::ast::{self, Document, Expression, Key, TableHeader};
use crate::coerce;
use crate::diagnostics;
use crate::error::TomlError;
use crate::span::Spanned;
use crate::unescape;
use crate::value::{Table, Value};

// ANCHOR: nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableKind {
    Implicit,
    Header,
    Dotted,
}

#[derive(Debug)]
struct TableNode {
    kind: TableKind,
    entries: IndexMap<String, Node>,
}

/// An entry while the tree is being built. Inline tables and array literals
/// are plain [`Value`]s and therefore closed to extension.
#[derive(Debug)]
enum Node {
    Value(Value),
    Table(TableNode),
    ArrayOfTables(Vec<TableNode>),
}

impl TableNode {
    fn new(kind: TableKind) -> Self {
        Self {
            kind,
            entries: IndexMap::new(),
        }
    }

    fn into_table(self) -> Table {
        self.entries
            .into_iter()
            .map(|(key, node)| (key, node.into_value()))
            .collect()
    }
}

impl Node {
    fn into_value(self) -> Value {
        match self {
            Node::Value(value) => value,
            Node::Table(table) => Value::Table(table.into_table()),
            Node::ArrayOfTables(tables) => Value::Array(
                tables
                    .into_iter()
                    .map(|t| Value::Table(t.into_table()))
                    .collect(),
            ),
        }
    }
}
// ANCHOR_END: nodes

fn join(path: &[String]) -> String {
    path.join(".")
}

/// Error for a segment that exists but cannot be descended.
fn not_a_table(node: &Node, key: &str, walked: &[String], full: &[String]) -> TomlError {
    match node {
        Node::Value(Value::Table(_)) => TomlError::FrozenTable {
            path: join(walked),
        },
        Node::Value(Value::Array(_)) => TomlError::StaticArray {
            path: join(walked),
        },
        _ => TomlError::NotATable {
            key: key.to_string(),
            path: join(full),
        },
    }
}

// ANCHOR: tables
/// Steps into `key` on the way to a table header.
fn descend_for_header<'t>(
    table: &'t mut TableNode,
    index: usize,
    path: &[String],
) -> Result<&'t mut TableNode, TomlError> {
    let walked = path.get(..=index).unwrap_or(path);
    let Some(segment) = walked.last() else {
        return Err(TomlError::Unknown);
    };

    let node = table
        .entries
        .entry(segment.clone())
        .or_insert_with(|| Node::Table(TableNode::new(TableKind::Implicit)));
    match node {
        Node::Table(table) => Ok(table),
        Node::ArrayOfTables(tables) => tables.last_mut().ok_or(TomlError::Unknown),
        other => Err(not_a_table(other, segment, walked, path)),
    }
}

/// Walks every segment but the last, returning the parent table.
fn header_parent<'t>(
    root: &'t mut TableNode,
    path: &[String],
) -> Result<&'t mut TableNode, TomlError> {
    let mut table = root;
    for index in 0..path.len().saturating_sub(1) {
        table = descend_for_header(table, index, path)?;
    }
    Ok(table)
}

/// `[path]`
fn open_table(root: &mut TableNode, path: &[String]) -> Result<(), TomlError> {
    let Some(last) = path.last() else {
        return Err(TomlError::Unknown);
    };
    let parent = header_parent(root, path)?;

    match parent.entries.get_mut(last) {
        None => {
            parent
                .entries
                .insert(last.clone(), Node::Table(TableNode::new(TableKind::Header)));
            Ok(())
        }
        Some(Node::Table(table)) => match table.kind {
            TableKind::Implicit => {
                table.kind = TableKind::Header;
                Ok(())
            }
            TableKind::Header => Err(TomlError::DuplicateTable { path: join(path) }),
            TableKind::Dotted => Err(TomlError::DottedTableRedefinition { path: join(path) }),
        },
        Some(Node::ArrayOfTables(_)) => Err(TomlError::DuplicateTable { path: join(path) }),
        Some(node) => Err(not_a_table(node, last, path, path)),
    }
}

/// `[[path]]`
fn push_array_table(root: &mut TableNode, path: &[String]) -> Result<(), TomlError> {
    let Some(last) = path.last() else {
        return Err(TomlError::Unknown);
    };
    let parent = header_parent(root, path)?;

    match parent.entries.get_mut(last) {
        None => {
            parent.entries.insert(
                last.clone(),
                Node::ArrayOfTables(vec![TableNode::new(TableKind::Header)]),
            );
            Ok(())
        }
        Some(Node::ArrayOfTables(tables)) => {
            tables.push(TableNode::new(TableKind::Header));
            Ok(())
        }
        Some(Node::Table(_) | Node::Value(Value::Table(_))) => {
            Err(TomlError::RedefineAsArray { path: join(path) })
        }
        Some(node) => Err(not_a_table(node, last, path, path)),
    }
}

/// The table a header path currently points at.
fn resolve<'t>(mut table: &'t mut TableNode, path: &[String]) -> Option<&'t mut TableNode> {
    for key in path {
        table = match table.entries.get_mut(key)? {
            Node::Table(table) => table,
            Node::ArrayOfTables(tables) => tables.last_mut()?,
            Node::Value(_) => return None,
        };
    }
    Some(table)
}
// ANCHOR_END: tables

// ANCHOR: insert
/// Inserts `value` at the dotted `path` below `table`, creating dotted
/// tables on the way. Never overwrites.
fn insert_dotted(table: &mut TableNode, path: &[String], value: Value) -> Result<(), TomlError> {
    let Some((last, parents)) = path.split_last() else {
        return Err(TomlError::Unknown);
    };

    let mut table = table;
    for (index, segment) in parents.iter().enumerate() {
        let walked = path.get(..=index).unwrap_or(path);
        let node = table
            .entries
            .entry(segment.clone())
            .or_insert_with(|| Node::Table(TableNode::new(TableKind::Dotted)));
        table = match node {
            Node::Table(inner) => {
                if inner.kind == TableKind::Header {
                    return Err(TomlError::HeaderTableExtension {
                        key: segment.clone(),
                        path: join(path),
                    });
                }
                inner
            }
            other => return Err(not_a_table(other, segment, walked, path)),
        };
    }

    match table.entries.entry(last.clone()) {
        Entry::Occupied(_) => Err(TomlError::DuplicateKey { key: join(path) }),
        Entry::Vacant(slot) => {
            slot.insert(Node::Value(value));
            Ok(())
        }
    }
}
// ANCHOR_END: insert

// ANCHOR: values
fn key_path(key: &Spanned<Key>) -> Result<Vec<String>, TomlError> {
    key.value
        .segments()
        .into_iter()
        .map(|segment| {
            unescape::simple_key(&segment.value)
                .map(Cow::into_owned)
                .map_err(|err| TomlError::from(err).with_span(segment.span))
        })
        .collect()
}

fn build_value(value: &Spanned<ast::Value>) -> Result<Value, TomlError> {
    let built = match &value.value {
        ast::Value::String(s) => unescape::unescape(&s.raw, s.kind)
            .map(|s| Value::String(s.into_owned()))
            .map_err(TomlError::from),
        ast::Value::Integer(text) => coerce::integer(text).map(Value::Integer),
        ast::Value::Float(text) => coerce::float(text).map(Value::Float),
        ast::Value::Boolean(b) => Ok(Value::Boolean(*b)),
        ast::Value::OffsetDateTime(text) => {
            coerce::offset_date_time(text).map(Value::OffsetDateTime)
        }
        ast::Value::LocalDateTime(text) => coerce::local_date_time(text).map(Value::LocalDateTime),
        ast::Value::LocalDate(text) => coerce::local_date(text).map(Value::LocalDate),
        ast::Value::LocalTime(text) => coerce::local_time(text).map(Value::LocalTime),
        ast::Value::Array(array) => array
            .items
            .iter()
            .map(build_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        ast::Value::InlineTable(table) => build_inline_table(table).map(Value::Table),
    };
    built.map_err(|err| err.or_span(value.span))
}

fn is_prefix(prefix: &[String], path: &[String]) -> bool {
    path.starts_with(prefix)
}

/// Builds an inline table as a closed value. Keys may not repeat or be a
/// prefix of one another.
fn build_inline_table(table: &ast::InlineTable) -> Result<Table, TomlError> {
    let mut node = TableNode::new(TableKind::Dotted);
    let mut seen: Vec<Vec<String>> = Vec::with_capacity(table.entries.len());

    for entry in &table.entries {
        let spanned = |err: TomlError| err.or_span(entry.span);
        let path = key_path(&entry.value.key).map_err(spanned)?;

        for other in &seen {
            let error = if *other == path {
                Some(TomlError::DuplicateKey { key: join(&path) })
            } else if is_prefix(other, &path) {
                Some(TomlError::InlineTableOverlap {
                    prefix: join(other),
                    path: join(&path),
                })
            } else if is_prefix(&path, other) {
                Some(TomlError::InlineTableOverlap {
                    prefix: join(&path),
                    path: join(other),
                })
            } else {
                None
            };
            if let Some(err) = error {
                return Err(spanned(err));
            }
        }

        let value = build_value(&entry.value.value)?;
        insert_dotted(&mut node, &path, value).map_err(spanned)?;
        seen.push(path);
    }
    Ok(node.into_table())
}
// ANCHOR_END: values

// ANCHOR: builder
/// Walks a [`Document`] and collects the tree plus semantic diagnostics.
pub struct TreeBuilder<'a> {
    lines: &'a LineIndex,
    config: ParseConfig,
    root: TableNode,
    /// Header path of the current insertion table. `None` after a header
    /// failed, in which case key/values land in `scratch`.
    current: Option<Vec<String>>,
    scratch: TableNode,
    errors: Vec<String>,
    stopped: bool,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(lines: &'a LineIndex, config: ParseConfig) -> Self {
        Self {
            lines,
            config,
            root: TableNode::new(TableKind::Header),
            current: Some(Vec::new()),
            scratch: TableNode::new(TableKind::Header),
            errors: Vec::new(),
            stopped: false,
        }
    }

    pub fn visit_document(&mut self, doc: &Document) {
        for expr in &doc.expressions {
            if self.stopped {
                log::debug!("stopping at the first semantic error");
                break;
            }
            let result = match &expr.value {
                Expression::KeyValue(kv) => self.visit_key_value(kv),
                Expression::Table(header) => self.visit_table(header),
                Expression::ArrayTable(header) => self.visit_array_table(header),
                Expression::Error { header: true } => {
                    self.detach();
                    Ok(())
                }
                Expression::Error { header: false } => Ok(()),
            };
            if let Err(err) = result {
                self.report(err.or_span(expr.span));
            }
        }
    }

    /// The finished tree and the semantic diagnostics, in document order.
    pub fn finish(self) -> (Table, Vec<String>) {
        (self.root.into_table(), self.errors)
    }

    fn report(&mut self, err: TomlError) {
        let message = diagnostics::semantic(self.lines, &err);
        log::debug!("semantic error: {message}");
        self.errors.push(message);
        if self.config.first_error_only {
            self.stopped = true;
        }
    }

    fn detach(&mut self) {
        self.current = None;
        self.scratch = TableNode::new(TableKind::Header);
    }

    fn visit_header(
        &mut self,
        header: &TableHeader,
        open: fn(&mut TableNode, &[String]) -> Result<(), TomlError>,
    ) -> Result<(), TomlError> {
        let result = key_path(&header.key).and_then(|path| {
            log::debug!("entering table '{}'", join(&path));
            open(&mut self.root, &path)?;
            Ok(path)
        });
        match result {
            Ok(path) => {
                self.current = Some(path);
                Ok(())
            }
            Err(err) => {
                self.detach();
                Err(err)
            }
        }
    }

    fn visit_table(&mut self, header: &TableHeader) -> Result<(), TomlError> {
        self.visit_header(header, open_table)
    }

    fn visit_array_table(&mut self, header: &TableHeader) -> Result<(), TomlError> {
        self.visit_header(header, push_array_table)
    }

    fn visit_key_value(&mut self, kv: &ast::KeyValue) -> Result<(), TomlError> {
        let path = key_path(&kv.key)?;
        let value = build_value(&kv.value)?;
        log::trace!("inserting '{}' ({})", join(&path), value.type_name());
        insert_dotted(self.current_table(), &path, value)
    }

    fn current_table(&mut self) -> &mut TableNode {
        match &self.current {
            Some(path) => resolve(&mut self.root, path).unwrap_or(&mut self.scratch),
            None => &mut self.scratch,
        }
    }
}
// ANCHOR_END: builder

/// Builds the tree for `doc`, returning it with its semantic diagnostics.
pub fn build(doc: &Document, lines: &LineIndex, config: ParseConfig) -> (Table, Vec<String>) {
    let mut builder = TreeBuilder::new(lines, config);
    builder.visit_document(doc);
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::TokenStream;
    use crate::traits::Parse;

    fn build_with(source: &str, config: ParseConfig) -> (Table, Vec<String>) {
        let mut stream = TokenStream::lex(source).unwrap();
        let doc = Document::parse(&mut stream).unwrap();
        assert!(doc.errors.is_empty(), "syntax errors: {:?}", doc.errors);
        build(&doc, stream.lines(), config)
    }

    fn build_str(source: &str) -> (Table, Vec<String>) {
        build_with(source, ParseConfig::default())
    }

    fn table<'t>(table: &'t Table, key: &str) -> &'t Table {
        table[key].as_table().unwrap()
    }

    #[test]
    fn flat_key_values() {
        let (root, errors) = build_str("a = 1\nb = 2\n");
        assert!(errors.is_empty());
        assert_eq!(root["a"], Value::Integer(1));
        assert_eq!(root["b"], Value::Integer(2));
    }

    #[test]
    fn quoted_key_with_dot_stays_one_segment() {
        let (root, errors) = build_str("[dog.\"tater.man\"]\ntype.name = \"pug\"");
        assert!(errors.is_empty(), "{errors:?}");
        let tater = table(table(&root, "dog"), "tater.man");
        assert_eq!(table(tater, "type")["name"], Value::from("pug"));
    }

    #[test]
    fn implicit_table_can_be_defined_later() {
        let (root, errors) = build_str("[a.b]\nx = 1\n[a]\ny = 2");
        assert!(errors.is_empty(), "{errors:?}");
        let a = table(&root, "a");
        assert_eq!(a["y"], Value::Integer(2));
        assert_eq!(table(a, "b")["x"], Value::Integer(1));
    }

    #[test]
    fn duplicate_header() {
        let (_, errors) = build_str("[a]\n[a]");
        assert_eq!(
            errors,
            ["Table 'a' is defined more than once from line:col 2:1 to 2:4"]
        );
    }

    #[test]
    fn array_of_tables_with_sub_tables() {
        let source = "[[fruits]]\nname = 'apple'\n[fruits.physical]\ncolor = 'red'\n\
                      [[fruits]]\nname = 'banana'";
        let (root, errors) = build_str(source);
        assert!(errors.is_empty(), "{errors:?}");
        let fruits = root["fruits"].as_array().unwrap();
        assert_eq!(fruits.len(), 2);
        let apple = fruits[0].as_table().unwrap();
        assert_eq!(table(apple, "physical")["color"], Value::from("red"));
        assert_eq!(fruits[1].as_table().unwrap()["name"], Value::from("banana"));
    }

    #[test]
    fn table_then_array_of_tables_is_an_error() {
        let (_, errors) = build_str("[fruits.physical]\ncolor = 'red'\n[[fruits]]");
        assert_eq!(
            errors,
            ["Table 'fruits' cannot be redefined as an array of tables from line:col 3:1 to 3:11"]
        );
    }

    #[test]
    fn dotted_keys_cannot_reopen_header_tables() {
        let (_, errors) = build_str("[a.b]\nc = 1\n[a]\nb.d = 2");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Key 'b' in 'b.d' is a table defined by a header"));
    }

    #[test]
    fn header_cannot_redefine_dotted_table() {
        let (_, errors) = build_str("a.b.c = 1\n[a.b]");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Table 'a.b' was already created by dotted keys"));
    }

    #[test]
    fn header_may_add_sub_table_to_dotted_table() {
        let (root, errors) = build_str("[fruit]\napple.color = 'red'\n[fruit.apple.texture]\nsmooth = true");
        assert!(errors.is_empty(), "{errors:?}");
        let apple = table(table(&root, "fruit"), "apple");
        assert_eq!(table(apple, "texture")["smooth"], Value::Boolean(true));
    }

    #[test_case::test_case("a = {x = 1}\na.y = 2", "Inline table 'a' cannot be extended" ; "dotted key")]
    #[test_case::test_case("a = {x = 1}\n[a.b]", "Inline table 'a' cannot be extended" ; "sub table header")]
    #[test_case::test_case("a = [1]\n[[a]]", "Array 'a' is a static array and cannot be extended" ; "array table")]
    #[test_case::test_case("a = 1\na.b = 2", "Key 'a' in 'a.b' is already used for a non-table object" ; "scalar")]
    #[test_case::test_case("a = 1\n[a.b]", "Key 'a' in 'a.b' is already used for a non-table object" ; "scalar under header")]
    fn frozen_and_scalar_values(source: &str, message: &str) {
        let (_, errors) = build_str(source);
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(errors[0].starts_with(message), "{}", errors[0]);
    }

    #[test]
    fn inline_table_keys_may_not_overlap() {
        let (_, errors) = build_str("t = {a = 1, a.b = 2}");
        assert_eq!(
            errors,
            ["Key 'a' and 'a.b' overlap inside one inline table from line:col 1:13 to 1:20"]
        );
    }

    #[test]
    fn inline_table_dotted_siblings_are_fine() {
        let (root, errors) = build_str("t = {a.b = 1, a.c = 2}");
        assert!(errors.is_empty(), "{errors:?}");
        let a = table(table(&root, "t"), "a");
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn semantic_errors_are_cumulative_by_default() {
        let source = "a = 1\na = 2\nb = 1\nb = 2";
        let (_, errors) = build_str(source);
        assert_eq!(errors.len(), 2);

        let config = ParseConfig::new().with_first_error_only(true);
        let (_, errors) = build_with(source, config);
        assert_eq!(
            errors,
            ["Key 'a' is defined more than once from line:col 2:1 to 2:6"]
        );
    }

    #[test]
    fn failed_header_does_not_leak_keys() {
        let (root, errors) = build_str("a = 1\n[a]\nx = 1\n[b]\ny = 2");
        assert_eq!(errors.len(), 1);
        assert_eq!(root.len(), 2);
        assert_eq!(table(&root, "b")["y"], Value::Integer(2));
    }

    #[test]
    fn keys_are_insertion_ordered() {
        let (root, _) = build_str("z = 1\na = 2\nm = 3");
        let keys: Vec<_> = root.keys().map(String::as_str).collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn coercion_errors_point_at_the_value() {
        let (_, errors) = build_str("x = 1979-13-27");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Invalid date-time '1979-13-27'"));
        assert!(errors[0].ends_with("from line:col 1:5 to 1:15"));
    }

    #[test]
    fn string_errors_inside_arrays() {
        let (_, errors) = build_str(r#"x = ["ok", "\q"]"#);
        assert_eq!(
            errors,
            [r"Bad escape sequence '\q' from line:col 1:12 to 1:16"]
        );
    }
}
