//! # Innate Primitives
//!
//! Hardcoded runtime constants for the Ferry core.
//!
//! These are compiled into the binary and are immutable at runtime.

/// Suffix given to the scratch file that holds inline source text.
///
/// The front end picks its language mode from the extension, so inline
/// source is always treated as C++.
pub const INLINE_SOURCE_SUFFIX: &str = ".cpp";

/// Prefix given to the scratch file that holds inline source text.
pub const INLINE_SOURCE_PREFIX: &str = "ferry-inline-";

/// Name given to the unnamed parameter of a move constructor.
///
/// `S(S&&) = default;`-style declarations often omit it, but downstream
/// generators need a name to forward.
pub const MOVE_PARAMETER_NAME: &str = "other";

/// Trailing specifier that removes a constructor or method from the struct.
pub const DELETE_SPECIFIER: &str = "delete";

/// Maximum number of front-end diagnostics carried by one `FerryError::Parse`.
///
/// A broken file usually produces a cascade; the first few locate the problem.
pub const MAX_PARSE_DIAGNOSTICS: usize = 10;

/// Maximum `#include` nesting followed by the C++ front end in one unit.
///
/// - Guards against include cycles that slip past the per-unit visited set
///   (e.g. through symlinked directories).
pub const MAX_INCLUDE_DEPTH: usize = 64;
