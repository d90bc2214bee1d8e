//! # Core Type Definitions
//!
//! This module contains the entity records produced by one pass over a
//! translation unit:
//! - Typed variables (`Variable`)
//! - Free functions and their merge identity (`Function`, `FunctionIdentity`)
//! - Value types (`Struct`, `Constructor`)
//! - Error types (`FerryError`)
//!
//! ## Immutability
//!
//! Records are built by the `builder` module and never change once they are
//! handed to the resolver. Ordering traits are derived so every index over
//! them can be a `BTreeMap`/`BTreeSet`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// VARIABLE
// =============================================================================

/// A named, typed slot: a struct field, a function parameter or a
/// constructor argument.
///
/// `raw_type` is alias-resolved with the `struct` keyword stripped.
/// `simple_type` additionally drops `const` and references and is the key
/// every policy lookup uses.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub raw_type: String,
    pub simple_type: String,
}

impl Variable {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        raw_type: impl Into<String>,
        simple_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            raw_type: raw_type.into(),
            simple_type: simple_type.into(),
        }
    }
}

// =============================================================================
// FUNCTION
// =============================================================================

/// The merge key of a function.
///
/// Two AST occurrences with the same qualified name, raw return type and
/// ordered raw parameter types are the same function. Overloads differ in at
/// least one component.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FunctionIdentity {
    pub name: String,
    pub raw_return_type: String,
    pub raw_param_types: Vec<String>,
}

/// A free function extracted from the file being processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    /// Fully namespace-qualified name.
    pub name: String,
    pub raw_return_type: String,
    pub simple_return_type: String,
    pub params: Vec<Variable>,
    /// Line of the first sighting, updated by later prototypes.
    pub declaration_line: Option<u32>,
    /// Line of the occurrence that carried a body.
    pub definition_line: Option<u32>,
}

impl Function {
    /// Compute the merge identity of this function.
    #[must_use]
    pub fn identity(&self) -> FunctionIdentity {
        FunctionIdentity {
            name: self.name.clone(),
            raw_return_type: self.raw_return_type.clone(),
            raw_param_types: self.params.iter().map(|p| p.raw_type.clone()).collect(),
        }
    }

    /// The line a rejection of this function is reported at.
    ///
    /// Prototype-only functions have no definition line, so they fall back
    /// to the declaration.
    #[must_use]
    pub fn report_line(&self) -> Option<u32> {
        self.definition_line.or(self.declaration_line)
    }
}

// =============================================================================
// STRUCT & CONSTRUCTOR
// =============================================================================

/// A non-deleted constructor of a struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constructor {
    pub params: Vec<Variable>,
    pub definition_line: u32,
}

/// A struct or class that was *defined* (not merely forward declared).
///
/// The four flags record the shapes the resolver refuses to export:
/// a missing public move constructor, a public copy constructor, any
/// non-public member or base, and any member kind other than fields,
/// constructors and a move-assignment operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Struct {
    /// Fully namespace-qualified name.
    pub name: String,
    /// Canonical path of the declaring file.
    pub file: PathBuf,
    pub definition_line: u32,
    pub fields: Vec<Variable>,
    pub constructors: Vec<Constructor>,
    pub base_structs: Vec<String>,
    pub has_move_constructor: bool,
    pub has_copy_constructor: bool,
    pub has_private: bool,
    pub has_other: bool,
}

impl Struct {
    /// Create an empty struct record.
    #[must_use]
    pub fn new(name: impl Into<String>, file: impl Into<PathBuf>, definition_line: u32) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            definition_line,
            fields: Vec::new(),
            constructors: Vec::new(),
            base_structs: Vec::new(),
            has_move_constructor: false,
            has_copy_constructor: false,
            has_private: false,
            has_other: false,
        }
    }

    /// The last `::` segment of the qualified name.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.name.rsplit("::").next().unwrap_or(&self.name)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that abort an extraction run.
///
/// - No silent failures
/// - Use `Result<T, FerryError>` for fallible operations
/// - Unsupported functions and structs are NOT errors; they are reported
///   through a `DiagnosticSink` and simply left out of the catalog
#[derive(Debug, Error)]
pub enum FerryError {
    /// The front end reported diagnostics for a file.
    #[error("Failed to parse {path}:\n{}", .diagnostics.join("\n"))]
    Parse {
        path: PathBuf,
        diagnostics: Vec<String>,
    },

    /// The same qualified alias name was defined twice.
    #[error("Duplicate alias definition: {0}")]
    DuplicateAlias(String),

    /// The scratch file for inline source could not be created, written or removed.
    #[error("Temporary resource error: {0}")]
    TemporaryResource(String),

    /// An include filter pattern did not compile.
    #[error("Invalid include pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),

    /// A configuration file was unreadable or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A report could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

// =============================================================================
// TESTS
// =============================================================================
