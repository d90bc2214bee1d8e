//! # Acceptance Policy
//!
//! The embedder decides which bare type names may cross the boundary.
//!
//! A `Policy` answers for primitives and opaque names directly and calls
//! back into the supplied `StructResolver` for compound names. The resolver
//! passed in is either the live `Resolver` (struct acceptance allowed) or
//! `RejectStructs` (function parameters and alias keys).

use crate::normalize::simple_var_type;
use std::collections::BTreeSet;

// =============================================================================
// TRAITS
// =============================================================================

/// Callback through which a policy asks whether a struct name is acceptable.
pub trait StructResolver {
    fn resolve(&mut self, name: &str) -> bool;
}

/// A struct resolver that rejects every name.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectStructs;

impl StructResolver for RejectStructs {
    fn resolve(&mut self, _name: &str) -> bool {
        false
    }
}

/// Decides whether a simple type name is exposable.
///
/// Implemented for any `Fn(&str, &mut dyn StructResolver) -> bool + Sync`,
/// so a closure is a complete policy.
pub trait Policy: Sync {
    fn accept(&self, type_name: &str, structs: &mut dyn StructResolver) -> bool;
}

impl<F> Policy for F
where
    F: Fn(&str, &mut dyn StructResolver) -> bool + Sync,
{
    fn accept(&self, type_name: &str, structs: &mut dyn StructResolver) -> bool {
        self(type_name, structs)
    }
}

// =============================================================================
// STANDARD POLICY
// =============================================================================

/// Scalar names accepted as-is.
const SCALAR_TYPES: &[&str] = &[
    "void",
    "bool",
    "char",
    "std::int8_t",
    "std::int16_t",
    "std::int32_t",
    "std::int64_t",
    "std::uint8_t",
    "std::uint16_t",
    "std::uint32_t",
    "std::uint64_t",
    "std::float_t",
    "std::double_t",
    "float",
    "double",
    "float32",
    "float64",
    "complex64",
    "complex128",
    "bfloat16",
    "std::string",
];

/// The built-in policy: fixed-width scalars, strings, and the standard
/// containers over them.
///
/// - `const` and references are stripped before any check.
/// - Any pointer rejects.
/// - Names outside the known set go to the struct resolver when
///   `resolve_structs` is set.
#[derive(Debug, Clone)]
pub struct StandardPolicy {
    extra_types: BTreeSet<String>,
    resolve_structs: bool,
}

impl Default for StandardPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self {
            extra_types: BTreeSet::new(),
            resolve_structs: true,
        }
    }

    /// Accept additional opaque type names verbatim.
    #[must_use]
    pub fn with_extra_types<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_types.extend(names.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_struct_resolution(mut self, enabled: bool) -> Self {
        self.resolve_structs = enabled;
        self
    }

    fn accept_simple(&self, name: &str, structs: &mut dyn StructResolver) -> bool {
        let name = name.trim();
        if name.is_empty() || name.contains('*') {
            return false;
        }
        if SCALAR_TYPES.contains(&name) || self.extra_types.contains(name) {
            return true;
        }
        if let Some((template, args)) = split_template(name) {
            return self.accept_template(name, template, &args, structs);
        }
        self.resolve_structs && structs.resolve(name)
    }

    fn accept_template(
        &self,
        name: &str,
        template: &str,
        args: &[&str],
        structs: &mut dyn StructResolver,
    ) -> bool {
        match (template, args) {
            ("std::vector" | "std::optional", [inner]) => self.accept(inner, structs),
            ("std::array", [inner, extent]) => {
                is_integral_literal(extent) && self.accept(inner, structs)
            }
            ("std::map", [key, value]) => {
                self.accept(key, structs) && self.accept(value, structs)
            }
            ("std::function", [signature]) => match split_signature(signature) {
                Some((ret, params)) => {
                    self.accept(ret, structs) && params.iter().all(|p| self.accept(p, structs))
                }
                None => false,
            },
            ("std::vector" | "std::optional" | "std::array" | "std::map" | "std::function", _) => {
                false
            }
            _ => self.resolve_structs && structs.resolve(name),
        }
    }
}

impl Policy for StandardPolicy {
    fn accept(&self, type_name: &str, structs: &mut dyn StructResolver) -> bool {
        self.accept_simple(&simple_var_type(type_name), structs)
    }
}

// =============================================================================
// SPELLING HELPERS
// =============================================================================

/// Split `name<a, b>` into `("name", ["a", "b"])`.
///
/// Returns `None` when the spelling is not a single template instance.
fn split_template(spelling: &str) -> Option<(&str, Vec<&str>)> {
    let open = spelling.find('<')?;
    let inner = spelling.strip_suffix('>')?.get(open + 1..)?;
    let template = spelling[..open].trim();
    if template.is_empty() {
        return None;
    }
    let args = split_top_level(inner, ',')?;
    Some((template, args))
}

/// Split `R(A, B)` into `("R", ["A", "B"])`.
fn split_signature(signature: &str) -> Option<(&str, Vec<&str>)> {
    let open = signature.find('(')?;
    let inner = signature.trim_end().strip_suffix(')')?.get(open + 1..)?;
    let ret = signature[..open].trim();
    if ret.is_empty() {
        return None;
    }
    let params = if inner.trim().is_empty() {
        Vec::new()
    } else {
        split_top_level(inner, ',')?
    };
    Some((ret, params))
}

/// Split on `separator` where it is not nested in `<>` or `()`.
///
/// Returns `None` on unbalanced brackets.
fn split_top_level(text: &str, separator: char) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth: usize = 0;
    let mut start = 0;
    for (index, ch) in text.char_indices() {
        match ch {
            '<' | '(' => depth += 1,
            '>' | ')' => depth = depth.checked_sub(1)?,
            c if c == separator && depth == 0 => {
                parts.push(text[start..index].trim());
                start = index + c.len_utf8();
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(text[start..].trim());
    Some(parts)
}

fn is_integral_literal(text: &str) -> bool {
    let digits = text.trim_end_matches(['u', 'U', 'l', 'L']);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

// =============================================================================
// TESTS
// =============================================================================
