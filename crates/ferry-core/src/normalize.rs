//! # Type Normalizer
//!
//! Turns front-end type spellings into the two forms the rest of the core
//! works with.
//!
//! - **raw**: aliases substituted to a fixed point, `struct ` keyword removed
//!   (`AliasTable::full_var_type`)
//! - **simple**: raw with `const` and `&` removed, pointers kept
//!   (`simple_var_type`)
//!
//! Both are implemented as lexical scans over identifier runs rather than
//! regular expressions, so a key never matches inside a longer identifier
//! or a qualified name.

use crate::ast::{NodeKind, TranslationUnit};
use crate::policy::{Policy, RejectStructs};
use crate::{AstNode, FerryError};
use std::collections::BTreeMap;

// =============================================================================
// LEXICAL HELPERS
// =============================================================================

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_name_char(c: char) -> bool {
    is_word_char(c) || c == ':'
}

/// Split `text` into alternating runs: `(true, run)` for maximal runs
/// matching `in_run`, `(false, run)` for everything in between.
fn runs(text: &str, in_run: fn(char) -> bool) -> Vec<(bool, &str)> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;
    for (index, ch) in text.char_indices() {
        let kind = in_run(ch);
        match current {
            Some(previous) if previous == kind => {}
            Some(previous) => {
                out.push((previous, &text[start..index]));
                start = index;
                current = Some(kind);
            }
            None => current = Some(kind),
        }
    }
    if let Some(kind) = current {
        out.push((kind, &text[start..]));
    }
    out
}

/// Append `piece` to `out`, separating two identifiers that would otherwise fuse.
fn push_separated(out: &mut String, piece: &str) {
    let fuses = out.chars().next_back().is_some_and(is_word_char)
        && piece.chars().next().is_some_and(is_word_char);
    if fuses {
        out.push(' ');
    }
    out.push_str(piece);
}

/// Remove every `struct` keyword that is followed by whitespace, together
/// with that one whitespace character.
fn strip_struct_keyword(spelling: &str) -> String {
    let mut out = String::with_capacity(spelling.len());
    let mut skip_space = false;
    for (is_word, run) in runs(spelling, is_word_char) {
        if skip_space {
            skip_space = false;
            if let Some(rest) = run.strip_prefix(char::is_whitespace) {
                push_separated(&mut out, rest);
                continue;
            }
            push_separated(&mut out, "struct");
        }
        if is_word && run == "struct" {
            skip_space = true;
            continue;
        }
        push_separated(&mut out, run);
    }
    if skip_space {
        // `struct` at the very end has no trailing whitespace to pair with.
        push_separated(&mut out, "struct");
    }
    out
}

// =============================================================================
// SIMPLE FORM
// =============================================================================

/// Remove `const` words and `&` characters, keeping pointer markers and
/// template structure, then trim.
///
/// Identifiers on either side of a removed token never fuse, which makes
/// the function idempotent.
#[must_use]
pub fn simple_var_type(spelling: &str) -> String {
    let mut out = String::with_capacity(spelling.len());
    for (is_word, run) in runs(spelling, is_word_char) {
        if is_word {
            if run != "const" {
                push_separated(&mut out, run);
            }
        } else {
            let kept: String = run.chars().filter(|&c| c != '&').collect();
            push_separated(&mut out, &kept);
        }
    }
    out.trim().to_string()
}

// =============================================================================
// ALIAS TABLE
// =============================================================================

/// Qualified alias name → underlying spelling, for one translation unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: BTreeMap<String, String>,
}

impl AliasTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every top-level and namespace-nested alias of `unit`.
    ///
    /// An alias whose qualified name the policy already accepts is left out,
    /// as is `typedef struct Foo Foo;`.
    pub fn build(unit: &TranslationUnit, policy: &dyn Policy) -> Result<Self, FerryError> {
        let mut table = Self::new();
        table.collect(&unit.nodes, "", policy)?;
        tracing::debug!(path = %unit.path.display(), aliases = table.len(), "Alias table built");
        Ok(table)
    }

    fn collect(
        &mut self,
        nodes: &[AstNode],
        prefix: &str,
        policy: &dyn Policy,
    ) -> Result<(), FerryError> {
        for node in nodes {
            match &node.kind {
                NodeKind::Namespace { name } => {
                    let nested = qualify(prefix, name);
                    self.collect(&node.children, &nested, policy)?;
                }
                NodeKind::Alias { name, underlying } => {
                    let key = qualify(prefix, name);
                    if policy.accept(&key, &mut RejectStructs) {
                        continue;
                    }
                    let target = strip_struct_keyword(underlying);
                    let target = target.trim();
                    if target == name || target == key {
                        continue;
                    }
                    self.insert(key, underlying.clone())?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Register one alias.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        underlying: impl Into<String>,
    ) -> Result<(), FerryError> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(FerryError::DuplicateAlias(name));
        }
        self.entries.insert(name, underlying.into());
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The raw form of a spelling.
    ///
    /// Whole qualified-name runs equal to an alias key are replaced until no
    /// replacement fires. A cyclic alias set stops after one pass per entry.
    #[must_use]
    pub fn full_var_type(&self, spelling: &str) -> String {
        let mut current = spelling.to_string();
        for _ in 0..=self.entries.len() {
            let (next, changed) = self.substitute_once(&current);
            current = next;
            if !changed {
                break;
            }
        }
        strip_struct_keyword(&current)
    }

    fn substitute_once(&self, spelling: &str) -> (String, bool) {
        if self.entries.is_empty() {
            return (spelling.to_string(), false);
        }
        let mut out = String::with_capacity(spelling.len());
        let mut changed = false;
        for (is_name, run) in runs(spelling, is_name_char) {
            match self.entries.get(run) {
                Some(underlying) if is_name => {
                    out.push_str(underlying);
                    changed = true;
                }
                _ => out.push_str(run),
            }
        }
        (out, changed)
    }
}

/// `prefix::name`, or `name` at global scope. Anonymous namespaces add nothing.
pub(crate) fn qualify(prefix: &str, name: &str) -> String {
    match (prefix.is_empty(), name.is_empty()) {
        (_, true) => prefix.to_string(),
        (true, false) => name.to_string(),
        (false, false) => format!("{prefix}::{name}"),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SourceLocation;
    use crate::policy::StructResolver;

    fn alias(name: &str, underlying: &str) -> AstNode {
        AstNode::new(
            NodeKind::Alias {
                name: name.to_string(),
                underlying: underlying.to_string(),
            },
            SourceLocation::new("/src/a.h", 1),
        )
    }

    fn namespace(name: &str, children: Vec<AstNode>) -> AstNode {
        AstNode::new(
            NodeKind::Namespace {
                name: name.to_string(),
            },
            SourceLocation::new("/src/a.h", 1),
        )
        .with_children(children)
    }

    fn reject_all(_: &str, _: &mut dyn StructResolver) -> bool {
        false
    }

    fn table(entries: &[(&str, &str)]) -> AliasTable {
        let mut table = AliasTable::new();
        for (name, underlying) in entries {
            table.insert(*name, *underlying).expect("unique alias");
        }
        table
    }

    #[test]
    fn simple_strips_references() {
        assert_eq!(simple_var_type("int &&"), "int");
        assert_eq!(simple_var_type("const std::string &"), "std::string");
    }

    #[test]
    fn simple_keeps_pointer_levels() {
        assert_eq!(simple_var_type("const int ***"), "int ***");
        assert_eq!(simple_var_type("int *const *"), "int * *");
    }

    #[test]
    fn simple_only_strips_whole_const_words() {
        assert_eq!(simple_var_type("constexpr_t"), "constexpr_t");
        assert_eq!(simple_var_type("my_const"), "my_const");
    }

    #[test]
    fn simple_never_fuses_identifiers() {
        assert_eq!(simple_var_type("a&b"), "a b");
        assert_eq!(simple_var_type("unsigned const int"), "unsigned  int");
    }

    #[test]
    fn simple_is_idempotent_on_samples() {
        for sample in ["const int &", "a&b", "std::vector<const T &>", " const  ", "x"] {
            let once = simple_var_type(sample);
            assert_eq!(simple_var_type(&once), once, "sample {sample:?}");
        }
    }

    #[test]
    fn full_resolves_alias_chains() {
        let aliases = table(&[("A", "B"), ("B", "C")]);
        assert_eq!(aliases.full_var_type("A"), "C");
        assert_eq!(aliases.full_var_type("const A &"), "const C &");
    }

    #[test]
    fn full_ignores_partial_and_qualified_matches() {
        let aliases = table(&[("A", "B")]);
        assert_eq!(aliases.full_var_type("AA"), "AA");
        assert_eq!(aliases.full_var_type("ns::A"), "ns::A");
        assert_eq!(aliases.full_var_type("A::x"), "A::x");
        assert_eq!(aliases.full_var_type("std::vector<A>"), "std::vector<B>");
    }

    #[test]
    fn full_strips_struct_keyword() {
        let aliases = AliasTable::new();
        assert_eq!(aliases.full_var_type("struct Point"), "Point");
        assert_eq!(aliases.full_var_type("const struct Point &"), "const Point &");
        assert_eq!(aliases.full_var_type("structure"), "structure");
        assert_eq!(aliases.full_var_type("my_struct x"), "my_struct x");
        assert_eq!(aliases.full_var_type("struct*"), "struct*");
    }

    #[test]
    fn full_terminates_on_cycles() {
        let aliases = table(&[("A", "B"), ("B", "A")]);
        let resolved = aliases.full_var_type("A");
        assert!(resolved == "A" || resolved == "B");
    }

    #[test]
    fn build_qualifies_namespaced_aliases() {
        let mut unit = TranslationUnit::new("/src/a.h");
        unit.nodes = vec![
            alias("Top", "int"),
            namespace("ns", vec![alias("Inner", "float"), namespace("", vec![alias("Anon", "bool")])]),
        ];

        let aliases = AliasTable::build(&unit, &reject_all).expect("aliases");
        assert_eq!(aliases.get("Top"), Some("int"));
        assert_eq!(aliases.get("ns::Inner"), Some("float"));
        assert_eq!(aliases.get("ns::Anon"), Some("bool"));
    }

    #[test]
    fn build_rejects_duplicates() {
        let mut unit = TranslationUnit::new("/src/a.h");
        unit.nodes = vec![alias("T", "int"), alias("T", "float")];

        let error = AliasTable::build(&unit, &reject_all).expect_err("duplicate");
        assert!(matches!(error, FerryError::DuplicateAlias(name) if name == "T"));
    }

    #[test]
    fn build_skips_policy_accepted_and_self_aliases() {
        let mut unit = TranslationUnit::new("/src/a.h");
        unit.nodes = vec![alias("float32", "float"), alias("Foo", "struct Foo"), alias("Bar", "Baz")];
        let accept_float32 = |name: &str, _: &mut dyn StructResolver| name == "float32";

        let aliases = AliasTable::build(&unit, &accept_float32).expect("aliases");
        assert_eq!(aliases.len(), 1);
        assert_eq!(aliases.get("Bar"), Some("Baz"));
    }

    #[test]
    fn qualify_handles_anonymous_scopes() {
        assert_eq!(qualify("", "a"), "a");
        assert_eq!(qualify("ns", "a"), "ns::a");
        assert_eq!(qualify("ns", ""), "ns");
    }
}
