//! Run-scoped parsing collaborator.
//!
//! A [`Project`] owns the parsed-file cache for exactly one analysis run:
//! it is constructed fresh per commit, populated file-by-file as files are
//! first referenced, and discarded afterwards. Reference resolution is
//! name-based over identifier sites in every loaded file, so the whole
//! repository is walked (gitignore-aware) before the first reference query.

pub mod source;

use crate::model::TestDeclaration;
use crate::util;
use anyhow::Result;
use ignore::WalkBuilder;
use source::{Declaration, SourceTree};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tree_sitter::Parser;

/// Extensions treated as analyzable source.
const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"];

/// Suffix convention for test-declaration files.
const TEST_FILE_SUFFIXES: &[&str] = &[
    ".spec.ts", ".spec.tsx", ".spec.js", ".test.ts", ".test.tsx", ".test.js",
];

/// True for files holding test declarations (spec-file naming convention).
pub fn is_test_file(path: &str) -> bool {
    let path_lower = path.to_lowercase();
    TEST_FILE_SUFFIXES
        .iter()
        .any(|suffix| path_lower.ends_with(suffix))
}

/// True for files with a recognized source extension.
pub fn is_source_file(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SOURCE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// A reference to a symbol name, somewhere in the loaded project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub path: String,
    pub line: i64,
    pub byte: i64,
    pub in_import: bool,
}

pub struct Project {
    repo_root: PathBuf,
    typescript: Parser,
    tsx: Parser,
    javascript: Parser,
    /// Keyed by normalized repo-relative path. `None` marks a file that
    /// failed to load; it stays a no-op for the rest of the run.
    files: HashMap<String, Option<SourceTree>>,
    fully_loaded: bool,
}

impl Project {
    pub fn new(repo_root: &Path) -> Result<Self> {
        let mut typescript = Parser::new();
        typescript.set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())?;
        let mut tsx = Parser::new();
        tsx.set_language(&tree_sitter_typescript::LANGUAGE_TSX.into())?;
        let mut javascript = Parser::new();
        javascript.set_language(&tree_sitter_javascript::LANGUAGE.into())?;
        Ok(Self {
            repo_root: repo_root.to_path_buf(),
            typescript,
            tsx,
            javascript,
            files: HashMap::new(),
            fully_loaded: false,
        })
    }

    /// Load one file into the cache. Idempotent; a missing or unreadable
    /// file is a warning plus no-op, never a fatal error.
    pub fn load_file(&mut self, rel_path: &str) {
        if self.files.contains_key(rel_path) {
            return;
        }
        let abs = self.repo_root.join(rel_path);
        let tree = match util::read_to_string(&abs) {
            Ok(content) => {
                let parser = match Path::new(rel_path)
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(str::to_lowercase)
                    .as_deref()
                {
                    Some("tsx" | "jsx") => &mut self.tsx,
                    Some("ts" | "mts" | "cts") => &mut self.typescript,
                    _ => &mut self.javascript,
                };
                match SourceTree::parse(parser, rel_path, &content) {
                    Ok(tree) => Some(tree),
                    Err(err) => {
                        eprintln!("tia: parse error {rel_path}: {err}");
                        None
                    }
                }
            }
            Err(err) => {
                eprintln!("tia: could not load {rel_path}: {err}");
                None
            }
        };
        self.files.insert(rel_path.to_string(), tree);
    }

    /// Drop a file from the cache; the next query re-reads it from disk.
    pub fn invalidate(&mut self, rel_path: &str) {
        self.files.remove(rel_path);
    }

    /// Walk the repository and load every source file, so reference
    /// resolution sees the whole project. Runs at most once per Project.
    fn ensure_all_loaded(&mut self) {
        if self.fully_loaded {
            return;
        }
        self.fully_loaded = true;

        let mut rel_paths = Vec::new();
        for entry in WalkBuilder::new(&self.repo_root).build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    eprintln!("tia: walk error: {err}");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let Ok(rel) = util::normalize_rel_path(&self.repo_root, entry.path()) else {
                continue;
            };
            if is_source_file(&rel) {
                rel_paths.push(rel);
            }
        }
        rel_paths.sort();
        for rel in rel_paths {
            self.load_file(&rel);
        }
    }

    fn tree(&mut self, rel_path: &str) -> Option<&SourceTree> {
        self.load_file(rel_path);
        self.files.get(rel_path).and_then(Option::as_ref)
    }

    /// Test/suite declarations of a file, in document order.
    pub fn test_declarations(&mut self, rel_path: &str) -> Vec<TestDeclaration> {
        self.tree(rel_path)
            .map(|tree| tree.test_declarations().to_vec())
            .unwrap_or_default()
    }

    /// Smallest named declaration containing `line`.
    pub fn declaration_at(&mut self, rel_path: &str, line: i64) -> Option<Declaration> {
        self.tree(rel_path)?.declaration_at(line).cloned()
    }

    /// Nearest externally visible declaration containing `line`.
    pub fn exported_declaration_at(&mut self, rel_path: &str, line: i64) -> Option<Declaration> {
        self.tree(rel_path)?.exported_declaration_at(line).cloned()
    }

    /// Innermost test declaration containing `line`.
    pub fn enclosing_test(&mut self, rel_path: &str, line: i64) -> Option<TestDeclaration> {
        self.tree(rel_path)?.enclosing_test(line).cloned()
    }

    /// Every occurrence of `name` across the loaded project, excluding the
    /// declaration's own name site. A name that resolves nowhere yields an
    /// empty list, never an error.
    pub fn references(&mut self, decl: &Declaration) -> Vec<Reference> {
        self.ensure_all_loaded();
        let mut refs = Vec::new();
        let mut paths: Vec<&String> = self.files.keys().collect();
        paths.sort();
        for path in paths {
            let Some(Some(tree)) = self.files.get(path.as_str()) else {
                continue;
            };
            for site in tree.ident_sites(&decl.name) {
                if *path == decl.path && site.byte == decl.name_byte {
                    continue;
                }
                refs.push(Reference {
                    path: path.clone(),
                    line: site.line,
                    byte: site.byte,
                    in_import: site.in_import,
                });
            }
        }
        refs
    }

    /// Non-import occurrences of `name` within one file; used to map an
    /// imported symbol to the tests that actually use it.
    pub fn local_references(&mut self, rel_path: &str, name: &str) -> Vec<Reference> {
        let Some(tree) = self.tree(rel_path) else {
            return Vec::new();
        };
        tree.ident_sites(name)
            .iter()
            .filter(|site| !site.in_import)
            .map(|site| Reference {
                path: rel_path.to_string(),
                line: site.line,
                byte: site.byte,
                in_import: false,
            })
            .collect()
    }
}
