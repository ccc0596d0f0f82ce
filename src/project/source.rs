//! One parsed source file.
//!
//! A [`SourceTree`] is built from a single tree-sitter parse and holds
//! everything the analysis asks about afterwards: named declarations with
//! their export visibility, test/suite declarations, and every identifier
//! site for name-based reference resolution. The tree itself is not
//! retained; all queries run against the extracted records.

use crate::model::TestDeclaration;
use anyhow::{Result, anyhow};
use std::collections::{HashMap, HashSet};
use tree_sitter::{Node, Parser};

/// Call-expression callees treated as test or suite declarations.
const TEST_KEYWORDS: &[&str] = &["test", "it", "describe"];

/// A named declaration (function, method, class, or variable) with its
/// source range and visibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub path: String,
    pub name: String,
    pub kind: &'static str,
    pub start_line: i64,
    pub end_line: i64,
    /// Start byte of the declaration node; used as the visited-set key
    /// during reference tracing.
    pub start_byte: i64,
    /// Start byte of the name identifier; reference lookups exclude it.
    pub name_byte: i64,
    /// Exported, or a member of an exported class.
    pub exported: bool,
}

/// One identifier occurrence, recorded for reference resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentSite {
    pub line: i64,
    pub byte: i64,
    /// The occurrence sits inside an import statement.
    pub in_import: bool,
}

pub struct SourceTree {
    path: String,
    declarations: Vec<Declaration>,
    tests: Vec<TestDeclaration>,
    idents: HashMap<String, Vec<IdentSite>>,
}

/// Walk context threaded through extraction.
#[derive(Clone, Copy, Default)]
struct WalkCtx {
    in_export: bool,
    class_exported: bool,
    in_import: bool,
}

struct Extractor<'a> {
    path: &'a str,
    source: &'a str,
    declarations: Vec<Declaration>,
    tests: Vec<TestDeclaration>,
    idents: HashMap<String, Vec<IdentSite>>,
    /// Names listed in `export { ... }` clauses; their declarations are
    /// marked exported in a post-pass.
    reexported: HashSet<String>,
}

impl SourceTree {
    /// Parse `source` with the given grammar parser and extract all records.
    ///
    /// Fails only when tree-sitter produces no tree at all (bad language
    /// setup, interrupted parse); syntactically broken input still yields a
    /// best-effort tree.
    pub fn parse(parser: &mut Parser, path: &str, source: &str) -> Result<Self> {
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow!("tree-sitter produced no tree for {path}"))?;

        let mut extractor = Extractor {
            path,
            source,
            declarations: Vec::new(),
            tests: Vec::new(),
            idents: HashMap::new(),
            reexported: HashSet::new(),
        };
        extractor.walk(tree.root_node(), WalkCtx::default());

        let mut declarations = extractor.declarations;
        for decl in &mut declarations {
            if !decl.exported && extractor.reexported.contains(&decl.name) {
                decl.exported = true;
            }
        }

        Ok(Self {
            path: path.to_string(),
            declarations,
            tests: extractor.tests,
            idents: extractor.idents,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn test_declarations(&self) -> &[TestDeclaration] {
        &self.tests
    }

    /// Smallest named declaration whose range contains `line`.
    pub fn declaration_at(&self, line: i64) -> Option<&Declaration> {
        self.declarations
            .iter()
            .filter(|d| d.start_line <= line && line <= d.end_line)
            .max_by_key(|d| d.start_byte)
    }

    /// Nearest externally visible declaration containing `line`, widening
    /// outward from the smallest enclosing one.
    pub fn exported_declaration_at(&self, line: i64) -> Option<&Declaration> {
        self.declarations
            .iter()
            .filter(|d| d.exported && d.start_line <= line && line <= d.end_line)
            .max_by_key(|d| d.start_byte)
    }

    /// Innermost test declaration whose range contains `line`.
    pub fn enclosing_test(&self, line: i64) -> Option<&TestDeclaration> {
        self.tests
            .iter()
            .filter(|t| t.contains_line(line))
            .max_by_key(|t| (t.start_line, -t.end_line))
    }

    /// All identifier occurrences of `name` in this file.
    pub fn ident_sites(&self, name: &str) -> &[IdentSite] {
        self.idents.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Extractor<'_> {
    fn walk(&mut self, node: Node<'_>, ctx: WalkCtx) {
        match node.kind() {
            "import_statement" => {
                let inner = WalkCtx {
                    in_import: true,
                    ..ctx
                };
                self.walk_children(node, inner);
                return;
            }
            "export_statement" => {
                let inner = WalkCtx {
                    in_export: true,
                    ..ctx
                };
                self.walk_children(node, inner);
                return;
            }
            "export_specifier" => {
                if let Some(name_node) = node.child_by_field_name("name") {
                    self.reexported.insert(self.text(name_node));
                }
                self.walk_children(node, ctx);
                return;
            }
            "function_declaration" | "generator_function_declaration" => {
                self.record_declaration(node, "function", ctx.in_export);
                // Export visibility does not reach into the body.
                self.walk_children(node, WalkCtx { in_export: false, class_exported: false, ..ctx });
                return;
            }
            "class_declaration" | "abstract_class_declaration" => {
                self.record_declaration(node, "class", ctx.in_export);
                let inner = WalkCtx {
                    class_exported: ctx.in_export,
                    in_export: false,
                    ..ctx
                };
                self.walk_children(node, inner);
                return;
            }
            "method_definition" => {
                self.record_declaration(node, "method", ctx.class_exported);
                self.walk_children(node, WalkCtx { in_export: false, class_exported: false, ..ctx });
                return;
            }
            "variable_declarator" => {
                self.record_declaration(node, "variable", ctx.in_export);
                self.walk_children(node, WalkCtx { in_export: false, class_exported: false, ..ctx });
                return;
            }
            "call_expression" => {
                if let Some(test) = self.test_from_call(node) {
                    self.tests.push(test);
                }
            }
            "identifier" | "property_identifier" | "shorthand_property_identifier" => {
                let text = self.text(node);
                if !text.is_empty() {
                    self.idents.entry(text).or_default().push(IdentSite {
                        line: node.start_position().row as i64 + 1,
                        byte: node.start_byte() as i64,
                        in_import: ctx.in_import,
                    });
                }
            }
            _ => {}
        }
        self.walk_children(node, ctx);
    }

    fn walk_children(&mut self, node: Node<'_>, ctx: WalkCtx) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.walk(child, ctx);
        }
    }

    fn record_declaration(&mut self, node: Node<'_>, kind: &'static str, exported: bool) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = self.text(name_node);
        if name.is_empty() {
            return;
        }
        self.declarations.push(Declaration {
            path: self.path.to_string(),
            name,
            kind,
            start_line: node.start_position().row as i64 + 1,
            end_line: node.end_position().row as i64 + 1,
            start_byte: node.start_byte() as i64,
            name_byte: name_node.start_byte() as i64,
            exported,
        });
    }

    /// `test('name', ...)`, `it.skip("name", ...)`, `test.describe.serial(
    /// `name`, ...)` and friends. The callee must bottom out in a bare test
    /// keyword; the first argument must be a string or template literal.
    fn test_from_call(&self, node: Node<'_>) -> Option<TestDeclaration> {
        let callee = node.child_by_field_name("function")?;
        if !self.is_test_callee(callee) {
            return None;
        }
        let args = node.child_by_field_name("arguments")?;
        let first = args.named_child(0)?;
        let test_name = match first.kind() {
            "string" | "template_string" => strip_quotes(&self.text(first)),
            _ => return None,
        };
        Some(TestDeclaration {
            test_name,
            start_line: node.start_position().row as i64 + 1,
            end_line: node.end_position().row as i64 + 1,
        })
    }

    fn is_test_callee(&self, node: Node<'_>) -> bool {
        let mut current = node;
        // Peel dotted modifier access (test.skip, test.describe.serial)
        // down to the base identifier.
        loop {
            match current.kind() {
                "member_expression" => {
                    let Some(object) = current.child_by_field_name("object") else {
                        return false;
                    };
                    current = object;
                }
                "identifier" => {
                    let text = self.text(current);
                    return TEST_KEYWORDS.contains(&text.as_str());
                }
                _ => return false,
            }
        }
    }

    fn text(&self, node: Node<'_>) -> String {
        node.utf8_text(self.source.as_bytes())
            .unwrap_or("")
            .to_string()
    }
}

/// Drop the surrounding quote or backtick pair, keeping the raw inner text
/// (template substitutions included, uninterpreted).
fn strip_quotes(raw: &str) -> String {
    let bytes = raw.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if first == last && matches!(first, b'\'' | b'"' | b'`') {
            return raw[1..raw.len() - 1].to_string();
        }
    }
    raw.to_string()
}
