//! # Diagnostics Reporter
//!
//! One `Diagnostic` per rejected entity, never one per use site.
//!
//! The rendered message text is consumed by downstream tooling and must stay
//! byte-for-byte stable:
//!
//! ```text
//! The struct ns::R2 is not supported:
//! 	- Invalid base struct ns::R.
//! 	- Struct doesn't have a move constructor.
//! ```

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

// =============================================================================
// REASONS
// =============================================================================

/// Why an entity was rejected. `Display` yields the exact sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Reason {
    InvalidField { name: String, type_name: String },
    InvalidConstructorArgument { type_name: String },
    InvalidBaseStruct { name: String },
    MissingMoveConstructor,
    HasCopyConstructor,
    HasPrivate,
    HasUnsupportedDefinition,
    InvalidArgument { name: String, type_name: String },
    InvalidReturnType { type_name: String },
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidField { name, type_name } => {
                write!(f, "Invalid var {} of type {}.", name, type_name)
            }
            Self::InvalidConstructorArgument { type_name } => {
                write!(f, "Invalid type {} on constructor argument.", type_name)
            }
            Self::InvalidBaseStruct { name } => write!(f, "Invalid base struct {}.", name),
            Self::MissingMoveConstructor => f.write_str("Struct doesn't have a move constructor."),
            Self::HasCopyConstructor => f.write_str("Struct has a copy constructor."),
            Self::HasPrivate => {
                f.write_str("Struct has a private variable or inherits from a private struct.")
            }
            Self::HasUnsupportedDefinition => f.write_str("Struct has an unsupported definition."),
            Self::InvalidArgument { name, type_name } => {
                write!(f, "Invalid argument {} of type {}.", name, type_name)
            }
            Self::InvalidReturnType { type_name } => {
                write!(f, "Invalid return type {}.", type_name)
            }
        }
    }
}

// =============================================================================
// DIAGNOSTIC
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    UnsupportedStruct,
    UnsupportedFunction,
}

impl DiagnosticKind {
    fn noun(self) -> &'static str {
        match self {
            Self::UnsupportedStruct => "struct",
            Self::UnsupportedFunction => "function",
        }
    }
}

/// A rejected entity with every reason, in evaluation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Qualified name of the rejected struct or function.
    pub entity: String,
    pub reasons: Vec<Reason>,
    /// Declaring file, `None` for inline source.
    pub origin: Option<PathBuf>,
    pub line: Option<u32>,
}

impl Diagnostic {
    /// Render the stable message block. Every line ends with `\n`.
    #[must_use]
    pub fn message(&self) -> String {
        let mut out = format!(
            "The {} {} is not supported:\n",
            self.kind.noun(),
            self.entity
        );
        for reason in &self.reasons {
            out.push_str(&format!("\t- {}\n", reason));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

// =============================================================================
// SINK
// =============================================================================

/// Receives each diagnostic exactly once, as soon as it is produced.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: &Diagnostic);
}

impl<F> DiagnosticSink for F
where
    F: FnMut(&Diagnostic),
{
    fn report(&mut self, diagnostic: &Diagnostic) {
        self(diagnostic);
    }
}

// =============================================================================
// TESTS
// =============================================================================
