//! # AST Capability Surface
//!
//! The parser-agnostic tree the rest of the core consumes.
//!
//! A `ParserAdapter` turns one root file into a `TranslationUnit`: every
//! declaration it saw (including those of transitively included headers),
//! classified into the closed `NodeKind` set, plus the resolved include
//! edges. Nothing downstream ever looks at front-end specific data.

use crate::FerryError;
use std::path::{Path, PathBuf};

// =============================================================================
// LEAF TYPES
// =============================================================================

/// Member or base access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Access {
    Public,
    Protected,
    Private,
}

impl Access {
    #[must_use]
    pub fn is_public(self) -> bool {
        self == Self::Public
    }
}

/// Canonical file path and 1-based line of a declaration's name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub line: u32,
}

impl SourceLocation {
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

/// A function, method or constructor parameter as spelled by the front end.
///
/// `name` is empty for unnamed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub type_spelling: String,
}

impl Parameter {
    #[must_use]
    pub fn new(name: impl Into<String>, type_spelling: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_spelling: type_spelling.into(),
        }
    }
}

// =============================================================================
// NODE KINDS
// =============================================================================

/// Classification of one declaration.
///
/// The set is closed. Front ends map anything they cannot classify to
/// `Other`, which the struct builder turns into `has_other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// `namespace name { ... }`; `name` is empty for anonymous namespaces.
    Namespace { name: String },
    /// A struct or class. Children are its direct members; a forward
    /// declaration has none.
    Record { name: String },
    /// A free function declaration or definition.
    Function {
        name: String,
        return_type: String,
        parameters: Vec<Parameter>,
        has_body: bool,
    },
    Field {
        name: String,
        type_spelling: String,
        access: Access,
    },
    Constructor {
        parameters: Vec<Parameter>,
        access: Access,
        is_move: bool,
        is_copy: bool,
    },
    Method {
        name: String,
        parameters: Vec<Parameter>,
        access: Access,
    },
    BaseSpecifier { name: String, access: Access },
    /// `typedef underlying name;` or `using name = underlying;`.
    Alias { name: String, underlying: String },
    AccessSpecifier,
    Other { description: String },
}

/// One declaration with its location, raw tokens and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstNode {
    pub kind: NodeKind,
    pub location: SourceLocation,
    /// Raw token spellings, without a trailing `;`.
    pub tokens: Vec<String>,
    pub children: Vec<AstNode>,
}

impl AstNode {
    /// Create a leaf node with no tokens.
    #[must_use]
    pub fn new(kind: NodeKind, location: SourceLocation) -> Self {
        Self {
            kind,
            location,
            tokens: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<AstNode>) -> Self {
        self.children = children;
        self
    }

    #[must_use]
    pub fn with_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    /// True when the token stream ends in `= <specifier>`, e.g. `= delete`.
    #[must_use]
    pub fn ends_with_specifier(&self, specifier: &str) -> bool {
        match self.tokens.as_slice() {
            [.., eq, last] => eq == "=" && last == specifier,
            _ => false,
        }
    }
}

// =============================================================================
// TRANSLATION UNIT
// =============================================================================

/// One resolved `#include` edge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Inclusion {
    /// Canonical path of the including file.
    pub from: PathBuf,
    /// Canonical path of the included file.
    pub target: PathBuf,
}

/// Everything a front end produced for one root file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TranslationUnit {
    /// Canonical path of the root file.
    pub path: PathBuf,
    /// Top-level declarations of the root and of every traversed header.
    pub nodes: Vec<AstNode>,
    /// Every include edge the front end resolved, at any depth.
    pub includes: Vec<Inclusion>,
}

impl TranslationUnit {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            nodes: Vec::new(),
            includes: Vec::new(),
        }
    }

    /// Targets of the includes performed directly by `file`, in order.
    pub fn includes_of<'a>(&'a self, file: &'a Path) -> impl Iterator<Item = &'a PathBuf> + 'a {
        self.includes
            .iter()
            .filter(move |edge| edge.from == file)
            .map(|edge| &edge.target)
    }
}

// =============================================================================
// PARSER ADAPTER
// =============================================================================

/// The external front end.
///
/// Implementations return canonical paths and fail with
/// `FerryError::Parse` when the front end reports any diagnostic.
pub trait ParserAdapter: Sync {
    fn parse(&self, path: &Path, include_dirs: &[PathBuf]) -> Result<TranslationUnit, FerryError>;
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ctor() -> AstNode {
        AstNode::new(
            NodeKind::Constructor {
                parameters: vec![Parameter::new("", "const S &")],
                access: Access::Public,
                is_move: false,
                is_copy: true,
            },
            SourceLocation::new("/tmp/s.h", 3),
        )
    }

    #[test]
    fn detects_trailing_delete() {
        let node = ctor().with_tokens(["S", "(", "const", "S", "&", ")", "=", "delete"]);
        assert!(node.ends_with_specifier("delete"));
        assert!(!node.ends_with_specifier("default"));
    }

    #[test]
    fn specifier_requires_equals_sign() {
        let node = ctor().with_tokens(["delete"]);
        assert!(!node.ends_with_specifier("delete"));

        let empty = ctor();
        assert!(!empty.ends_with_specifier("delete"));
    }

    #[test]
    fn includes_of_filters_by_source() {
        let mut unit = TranslationUnit::new("/src/a.cpp");
        unit.includes.push(Inclusion {
            from: PathBuf::from("/src/a.cpp"),
            target: PathBuf::from("/src/b.h"),
        });
        unit.includes.push(Inclusion {
            from: PathBuf::from("/src/b.h"),
            target: PathBuf::from("/src/c.h"),
        });

        let direct: Vec<_> = unit.includes_of(Path::new("/src/a.cpp")).collect();
        assert_eq!(direct, vec![&PathBuf::from("/src/b.h")]);
    }

    #[test]
    fn only_public_is_public() {
        assert!(Access::Public.is_public());
        assert!(!Access::Protected.is_public());
        assert!(!Access::Private.is_public());
    }
}
