//! # ferry-core
//!
//! C++ declaration extraction for the Ferry code generators.
//!
//! Given a C++ source file (or an inline snippet), this crate produces a
//! catalog of the functions and structs whose types can be marshalled
//! across a language boundary, plus a diagnostic for every entity that was
//! rejected and why.
//!
//! ## Pipeline
//!
//! ```text
//! SourceInput → ParserAdapter → TranslationUnit
//!             → AliasTable → EntityBuilder → Resolver → Catalog
//! ```
//!
//! - `ParserAdapter` is the only seam to a real C++ front end. The
//!   `cpp-frontend` feature provides one built on tree-sitter.
//! - `Policy` decides which type names are acceptable; the resolver
//!   answers its struct callbacks recursively.
//! - Results are deterministic: every collection is ordered.

// =============================================================================
// MODULES
// =============================================================================

pub mod aggregator;
pub mod ast;
pub mod builder;
pub mod catalog;
pub mod diagnostics;
#[cfg(feature = "cpp-frontend")]
pub mod frontend;
pub mod normalize;
pub mod policy;
pub mod primitives;
pub mod resolver;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{Constructor, FerryError, Function, FunctionIdentity, Struct, Variable};

// =============================================================================
// RE-EXPORTS: Parser Interface
// =============================================================================

pub use ast::{
    Access, AstNode, Inclusion, NodeKind, Parameter, ParserAdapter, SourceLocation,
    TranslationUnit,
};
#[cfg(feature = "cpp-frontend")]
pub use frontend::CppParser;

// =============================================================================
// RE-EXPORTS: Extraction
// =============================================================================

pub use aggregator::{Aggregator, AggregatorOptions, SourceInput};
pub use builder::{Entities, EntityBuilder};
pub use catalog::{Catalog, ConstructorEntry, FileCatalog, FunctionEntry, Origin, StructEntry};
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, Reason};
pub use normalize::{AliasTable, simple_var_type};
pub use policy::{Policy, RejectStructs, StandardPolicy, StructResolver};
pub use resolver::{Resolution, ResolutionSession, Resolver};
