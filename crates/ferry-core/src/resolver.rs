//! # Acceptance Resolver
//!
//! Decides which functions and structs may cross the boundary.
//!
//! Evaluation is demand-driven: functions are checked one by one, and a
//! struct is only evaluated when a policy asks about it while checking a
//! function (or another struct). Results are memoized in the
//! `ResolutionSession`, so each struct is evaluated and reported at most once
//! per session.
//!
//! ## Cycles
//!
//! A struct that is already being evaluated further up the stack resolves
//! optimistically. If the outer evaluation then fails, every acceptance
//! recorded while it ran is rolled back, so dependants are re-evaluated (and
//! rejected) the next time they are demanded.

use crate::diagnostics::{Diagnostic, DiagnosticKind, Reason};
use crate::normalize::AliasTable;
use crate::policy::{Policy, RejectStructs, StructResolver};
use crate::{Function, Struct};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

// =============================================================================
// SESSION
// =============================================================================

/// Memo state of one top-level invocation.
///
/// Nothing here is shared between sessions, so independent invocations can
/// run on separate threads.
#[derive(Debug, Clone, Default)]
pub struct ResolutionSession {
    aliases: AliasTable,
    needed: BTreeSet<String>,
    invalid: BTreeSet<String>,
}

impl ResolutionSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Replace the alias table with the one of the next translation unit.
    pub fn set_aliases(&mut self, aliases: AliasTable) {
        self.aliases = aliases;
    }

    /// Structs verified acceptable so far.
    #[must_use]
    pub fn needed(&self) -> &BTreeSet<String> {
        &self.needed
    }

    /// Structs verified unacceptable so far.
    #[must_use]
    pub fn invalid(&self) -> &BTreeSet<String> {
        &self.invalid
    }
}

// =============================================================================
// RESOLVER
// =============================================================================

/// Outcome of resolving one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Structs newly accepted while resolving this file, in acceptance order.
    pub accepted_structs: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Verifies the entities of one processed file against a policy.
pub struct Resolver<'a> {
    session: &'a mut ResolutionSession,
    structs: &'a BTreeMap<String, Struct>,
    policy: &'a dyn Policy,
    file: &'a Path,
    inline_root: Option<&'a Path>,
    diagnostics: Vec<Diagnostic>,
    accepted: Vec<String>,
    pending: Vec<String>,
}

impl<'a> Resolver<'a> {
    /// `structs` maps qualified names to candidates; `file` is the file whose
    /// functions are being verified.
    pub fn new(
        session: &'a mut ResolutionSession,
        structs: &'a BTreeMap<String, Struct>,
        policy: &'a dyn Policy,
        file: &'a Path,
    ) -> Self {
        Self {
            session,
            structs,
            policy,
            file,
            inline_root: None,
            diagnostics: Vec::new(),
            accepted: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Mark `path` as the scratch file of inline source. Diagnostics for
    /// entities declared there carry no origin.
    #[must_use]
    pub fn with_inline_root(mut self, path: &'a Path) -> Self {
        self.inline_root = Some(path);
        self
    }

    fn origin(&self, path: &Path) -> Option<PathBuf> {
        match self.inline_root {
            Some(root) if root == path => None,
            _ => Some(path.to_path_buf()),
        }
    }

    /// Verify a struct and, transitively, everything it depends on.
    ///
    /// A name with no candidate is rejected silently.
    pub fn verify_struct(&mut self, name: &str) -> bool {
        let structs = self.structs;
        let Some(record) = structs.get(name) else {
            return false;
        };
        if self.session.invalid.contains(name) {
            return false;
        }
        if self.session.needed.contains(name) || self.pending.iter().any(|p| p == name) {
            return true;
        }

        self.pending.push(name.to_string());
        let mark = self.accepted.len();
        let reasons = self.struct_reasons(record);
        self.pending.pop();

        if reasons.is_empty() {
            tracing::debug!(name, "Struct accepted");
            self.session.needed.insert(name.to_string());
            self.accepted.push(name.to_string());
            return true;
        }

        for rolled_back in self.accepted.drain(mark..) {
            self.session.needed.remove(&rolled_back);
        }
        tracing::debug!(name, reasons = reasons.len(), "Struct rejected");
        self.session.invalid.insert(name.to_string());
        let diagnostic = Diagnostic {
            kind: DiagnosticKind::UnsupportedStruct,
            entity: record.name.clone(),
            reasons,
            origin: self.origin(&record.file),
            line: Some(record.definition_line),
        };
        self.diagnostics.push(diagnostic);
        false
    }

    fn struct_reasons(&mut self, record: &Struct) -> Vec<Reason> {
        let policy = self.policy;
        let mut reasons = Vec::new();

        for field in &record.fields {
            if field.simple_type != record.name && !policy.accept(&field.simple_type, self) {
                reasons.push(Reason::InvalidField {
                    name: field.name.clone(),
                    type_name: field.simple_type.clone(),
                });
            }
        }

        for constructor in &record.constructors {
            for arg in &constructor.params {
                if arg.simple_type != record.name && !policy.accept(&arg.simple_type, self) {
                    reasons.push(Reason::InvalidConstructorArgument {
                        type_name: arg.simple_type.clone(),
                    });
                }
            }
        }

        for base in &record.base_structs {
            if !self.verify_struct(base) {
                reasons.push(Reason::InvalidBaseStruct { name: base.clone() });
            }
        }

        if !record.has_move_constructor {
            reasons.push(Reason::MissingMoveConstructor);
        }
        if record.has_copy_constructor {
            reasons.push(Reason::HasCopyConstructor);
        }
        if record.has_private {
            reasons.push(Reason::HasPrivate);
        }
        if record.has_other {
            reasons.push(Reason::HasUnsupportedDefinition);
        }
        reasons
    }

    /// Verify a function of the processed file.
    ///
    /// Parameters never resolve through struct acceptance; only the return
    /// type may demand a struct.
    pub fn verify_function(&mut self, function: &Function) -> bool {
        let policy = self.policy;
        let mut reasons = Vec::new();

        for param in &function.params {
            if !policy.accept(&param.simple_type, &mut RejectStructs) {
                reasons.push(Reason::InvalidArgument {
                    name: param.name.clone(),
                    type_name: param.simple_type.clone(),
                });
            }
        }
        if !policy.accept(&function.simple_return_type, self) {
            reasons.push(Reason::InvalidReturnType {
                type_name: function.simple_return_type.clone(),
            });
        }

        if reasons.is_empty() {
            return true;
        }

        tracing::debug!(name = %function.name, reasons = reasons.len(), "Function rejected");
        let diagnostic = Diagnostic {
            kind: DiagnosticKind::UnsupportedFunction,
            entity: function.name.clone(),
            reasons,
            origin: self.origin(self.file),
            line: function.report_line(),
        };
        self.diagnostics.push(diagnostic);
        false
    }

    /// Consume the resolver, returning accepted structs and diagnostics.
    #[must_use]
    pub fn finish(self) -> Resolution {
        Resolution {
            accepted_structs: self.accepted,
            diagnostics: self.diagnostics,
        }
    }
}

impl StructResolver for Resolver<'_> {
    fn resolve(&mut self, name: &str) -> bool {
        self.verify_struct(name)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Constructor, Variable};

    const FILE: &str = "/src/a.cpp";

    /// Accepts `int` and defers everything else to the struct resolver.
    fn int_policy(name: &str, structs: &mut dyn StructResolver) -> bool {
        name == "int" || structs.resolve(name)
    }

    fn good(name: &str) -> Struct {
        let mut record = Struct::new(name, FILE, 1);
        record.has_move_constructor = true;
        record
    }

    fn with_field(mut record: Struct, name: &str, ty: &str) -> Struct {
        record.fields.push(Variable::new(name, ty, ty));
        record
    }

    fn index(records: Vec<Struct>) -> BTreeMap<String, Struct> {
        records.into_iter().map(|r| (r.name.clone(), r)).collect()
    }

    fn returning(ty: &str) -> Function {
        Function {
            name: "f".to_string(),
            raw_return_type: ty.to_string(),
            simple_return_type: ty.to_string(),
            params: Vec::new(),
            declaration_line: Some(4),
            definition_line: None,
        }
    }

    #[test]
    fn accepts_valid_struct_once() {
        let structs = index(vec![with_field(good("P"), "x", "int")]);
        let mut session = ResolutionSession::new();
        let mut resolver = Resolver::new(&mut session, &structs, &int_policy, Path::new(FILE));

        assert!(resolver.verify_struct("P"));
        assert!(resolver.verify_struct("P"));
        let resolution = resolver.finish();
        assert_eq!(resolution.accepted_structs, vec!["P"]);
        assert!(resolution.diagnostics.is_empty());
        assert!(session.needed().contains("P"));
    }

    #[test]
    fn unknown_names_fail_silently() {
        let structs = BTreeMap::new();
        let mut session = ResolutionSession::new();
        let mut resolver = Resolver::new(&mut session, &structs, &int_policy, Path::new(FILE));

        assert!(!resolver.verify_struct("Missing"));
        assert!(resolver.finish().diagnostics.is_empty());
    }

    #[test]
    fn collects_reasons_in_order() {
        let mut bad = with_field(good("B"), "p", "int *");
        bad.has_move_constructor = false;
        bad.has_copy_constructor = true;
        bad.has_private = true;
        bad.has_other = true;
        bad.constructors.push(Constructor {
            params: vec![Variable::new("q", "float", "float")],
            definition_line: 2,
        });
        bad.base_structs.push("Nope".to_string());
        let structs = index(vec![bad]);
        let mut session = ResolutionSession::new();
        let mut resolver = Resolver::new(&mut session, &structs, &int_policy, Path::new(FILE));

        assert!(!resolver.verify_struct("B"));
        let diagnostics = resolver.finish().diagnostics;
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message(),
            "The struct B is not supported:\n\
             \t- Invalid var p of type int *.\n\
             \t- Invalid type float on constructor argument.\n\
             \t- Invalid base struct Nope.\n\
             \t- Struct doesn't have a move constructor.\n\
             \t- Struct has a copy constructor.\n\
             \t- Struct has a private variable or inherits from a private struct.\n\
             \t- Struct has an unsupported definition.\n"
        );
        assert_eq!(diagnostics[0].origin, Some(PathBuf::from(FILE)));
        assert_eq!(diagnostics[0].line, Some(1));
    }

    #[test]
    fn self_reference_is_a_base_case() {
        let structs = index(vec![with_field(good("Node"), "next", "Node")]);
        let mut session = ResolutionSession::new();
        let mut resolver = Resolver::new(&mut session, &structs, &int_policy, Path::new(FILE));
        assert!(resolver.verify_struct("Node"));
    }

    #[test]
    fn mutual_recursion_terminates() {
        let a = with_field(good("A"), "b", "B");
        let b = with_field(good("B"), "a", "A");
        let structs = index(vec![a, b]);
        let mut session = ResolutionSession::new();
        let mut resolver = Resolver::new(&mut session, &structs, &int_policy, Path::new(FILE));

        assert!(resolver.verify_struct("A"));
        assert_eq!(resolver.finish().accepted_structs, vec!["B", "A"]);
    }

    #[test]
    fn failed_cycle_rolls_back_dependants() {
        let mut a = with_field(good("A"), "b", "B");
        a.has_copy_constructor = true;
        let b = with_field(good("B"), "a", "A");
        let structs = index(vec![a, b]);
        let mut session = ResolutionSession::new();
        let mut resolver = Resolver::new(&mut session, &structs, &int_policy, Path::new(FILE));

        assert!(!resolver.verify_struct("A"));
        assert!(!resolver.verify_struct("B"));
        let resolution = resolver.finish();
        assert!(resolution.accepted_structs.is_empty());
        let rejected: Vec<_> = resolution.diagnostics.iter().map(|d| d.entity.as_str()).collect();
        assert_eq!(rejected, vec!["A", "B"]);
    }

    #[test]
    fn function_parameters_never_resolve_structs() {
        let structs = index(vec![good("P")]);
        let mut session = ResolutionSession::new();
        let mut resolver = Resolver::new(&mut session, &structs, &int_policy, Path::new(FILE));
        let mut function = returning("int");
        function.params.push(Variable::new("p", "P", "P"));

        assert!(!resolver.verify_function(&function));
        let resolution = resolver.finish();
        assert!(resolution.accepted_structs.is_empty());
        assert_eq!(
            resolution.diagnostics[0].message(),
            "The function f is not supported:\n\t- Invalid argument p of type P.\n"
        );
        assert_eq!(resolution.diagnostics[0].line, Some(4));
    }

    #[test]
    fn return_type_demands_struct() {
        let structs = index(vec![good("P")]);
        let mut session = ResolutionSession::new();
        let mut resolver = Resolver::new(&mut session, &structs, &int_policy, Path::new(FILE));

        assert!(resolver.verify_function(&returning("P")));
        assert_eq!(resolver.finish().accepted_structs, vec!["P"]);
    }

    #[test]
    fn inline_root_drops_origin() {
        let mut bad = good("B");
        bad.has_other = true;
        let structs = index(vec![bad]);
        let mut session = ResolutionSession::new();
        let mut resolver = Resolver::new(&mut session, &structs, &int_policy, Path::new(FILE))
            .with_inline_root(Path::new(FILE));

        assert!(!resolver.verify_function(&returning("B")));
        let diagnostics = resolver.finish().diagnostics;
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.origin.is_none()));
    }

    #[test]
    fn memo_spans_resolvers_of_one_session() {
        let mut bad = good("B");
        bad.has_other = true;
        let structs = index(vec![bad]);
        let mut session = ResolutionSession::new();

        let first = {
            let mut resolver = Resolver::new(&mut session, &structs, &int_policy, Path::new(FILE));
            resolver.verify_struct("B");
            resolver.finish()
        };
        let second = {
            let mut resolver = Resolver::new(&mut session, &structs, &int_policy, Path::new(FILE));
            resolver.verify_struct("B");
            resolver.finish()
        };
        assert_eq!(first.diagnostics.len(), 1);
        assert!(second.diagnostics.is_empty());
        assert!(session.invalid().contains("B"));
    }
}
