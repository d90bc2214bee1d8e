//! # C++ Front End
//!
//! A `ParserAdapter` built on tree-sitter.
//!
//! Parsing happens in two phases:
//!
//! 1. **Load**: the root file and, preprocessor style, every `#include` that
//!    resolves to a file on disk are parsed once each. Any syntax error
//!    fails the whole unit.
//! 2. **Convert**: the type names declared across all loaded files are
//!    collected first, so that unqualified type spellings can be
//!    namespace-qualified, then every tree is converted into `AstNode`s.
//!
//! Macros are not expanded; a file that only parses after preprocessing is
//! reported as a parse failure. Of each `#if` / `#ifdef` only the first
//! branch is read. Includes that resolve to no file are left out of the
//! unit's include edges.

mod convert;

use crate::FerryError;
use crate::ast::{Inclusion, ParserAdapter, TranslationUnit};
use crate::primitives::{MAX_INCLUDE_DEPTH, MAX_PARSE_DIAGNOSTICS};
use convert::{Converter, KnownTypes};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser, Tree};

/// tree-sitter C++ front end.
#[derive(Debug, Clone, Copy, Default)]
pub struct CppParser;

impl CppParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ParserAdapter for CppParser {
    fn parse(&self, path: &Path, include_dirs: &[PathBuf]) -> Result<TranslationUnit, FerryError> {
        let root = path
            .canonicalize()
            .map_err(|e| FerryError::Io(format!("{}: {}", path.display(), e)))?;

        let mut loader = Loader::new(include_dirs)?;
        loader.load(&root, 0)?;

        let mut known = KnownTypes::default();
        for file in &loader.files {
            known.collect(file.tree.root_node(), &file.source);
        }

        let mut unit = TranslationUnit::new(root);
        for file in &loader.files {
            let converter = Converter::new(&file.path, &file.source, &known);
            unit.nodes.extend(converter.convert_unit(file.tree.root_node()));
        }
        unit.includes = loader.includes;

        tracing::debug!(
            path = %unit.path.display(),
            files = loader.files.len(),
            nodes = unit.nodes.len(),
            "C++ unit parsed"
        );
        Ok(unit)
    }
}

// =============================================================================
// LOADING
// =============================================================================

/// One parsed file of a unit.
struct SourceFile {
    path: PathBuf,
    source: String,
    tree: Tree,
}

struct Loader<'a> {
    parser: Parser,
    include_dirs: &'a [PathBuf],
    files: Vec<SourceFile>,
    includes: Vec<Inclusion>,
    seen: BTreeSet<PathBuf>,
}

impl<'a> Loader<'a> {
    fn new(include_dirs: &'a [PathBuf]) -> Result<Self, FerryError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_cpp::LANGUAGE.into())
            .map_err(|e| FerryError::Parse {
                path: PathBuf::new(),
                diagnostics: vec![format!("tree-sitter init: {}", e)],
            })?;
        Ok(Self {
            parser,
            include_dirs,
            files: Vec::new(),
            includes: Vec::new(),
            seen: BTreeSet::new(),
        })
    }

    /// Parse `path` (canonical) and recurse into its includes.
    fn load(&mut self, path: &Path, depth: usize) -> Result<(), FerryError> {
        if !self.seen.insert(path.to_path_buf()) {
            return Ok(());
        }
        if depth > MAX_INCLUDE_DEPTH {
            tracing::debug!(path = %path.display(), "Include depth limit reached");
            return Ok(());
        }

        let source = std::fs::read_to_string(path)
            .map_err(|e| FerryError::Io(format!("{}: {}", path.display(), e)))?;
        let tree = self.parser.parse(&source, None).ok_or_else(|| FerryError::Parse {
            path: path.to_path_buf(),
            diagnostics: vec!["parser produced no tree".to_string()],
        })?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(FerryError::Parse {
                path: path.to_path_buf(),
                diagnostics: syntax_errors(path, root, &source),
            });
        }

        let mut directives = Vec::new();
        collect_includes(root, &source, &mut directives);
        self.files.push(SourceFile {
            path: path.to_path_buf(),
            source,
            tree,
        });

        for directive in directives {
            match self.resolve(path, &directive) {
                Some(target) => {
                    self.includes.push(Inclusion {
                        from: path.to_path_buf(),
                        target: target.clone(),
                    });
                    self.load(&target, depth + 1)?;
                }
                None => {
                    tracing::debug!(from = %path.display(), include = %directive.name, "Include not resolved");
                }
            }
        }
        Ok(())
    }

    /// Quoted includes search the including file's directory first.
    fn resolve(&self, from: &Path, directive: &IncludeDirective) -> Option<PathBuf> {
        let local = if directive.quoted {
            from.parent().map(Path::to_path_buf)
        } else {
            None
        };
        local
            .into_iter()
            .chain(self.include_dirs.iter().cloned())
            .map(|dir| dir.join(&directive.name))
            .find(|candidate| candidate.is_file())
            .and_then(|candidate| candidate.canonicalize().ok())
    }
}

struct IncludeDirective {
    name: String,
    quoted: bool,
}

fn collect_includes(node: Node, source: &str, out: &mut Vec<IncludeDirective>) {
    if node.kind() == "preproc_include" {
        if let Some(path) = node.child_by_field_name("path") {
            let text = path.utf8_text(source.as_bytes()).unwrap_or("");
            match path.kind() {
                "string_literal" => out.push(IncludeDirective {
                    name: text.trim_matches('"').to_string(),
                    quoted: true,
                }),
                "system_lib_string" => out.push(IncludeDirective {
                    name: text.trim_start_matches('<').trim_end_matches('>').to_string(),
                    quoted: false,
                }),
                _ => {}
            }
        }
        return;
    }
    // `#else` / `#elif` arms are not followed.
    let alternative = node.child_by_field_name("alternative").map(|n| n.id());
    let mut cursor = node.walk();
    let children: Vec<Node> = node.named_children(&mut cursor).collect();
    for child in children {
        if Some(child.id()) != alternative {
            collect_includes(child, source, out);
        }
    }
}

/// `file:line:col: message` for the first ERROR / MISSING nodes.
fn syntax_errors(path: &Path, root: Node, source: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if out.len() >= MAX_PARSE_DIAGNOSTICS {
            break;
        }
        let position = node.start_position();
        let at = format!("{}:{}:{}", path.display(), position.row + 1, position.column + 1);
        if node.is_missing() {
            out.push(format!("{}: error: missing '{}'", at, node.kind()));
        } else if node.is_error() {
            let text = node.utf8_text(source.as_bytes()).unwrap_or("");
            let snippet: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
            let snippet: String = snippet.chars().take(40).collect();
            out.push(format!("{}: error: unexpected '{}'", at, snippet));
        } else if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<Node> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    if out.is_empty() {
        out.push(format!("{}: error: syntax error", path.display()));
    }
    out
}
