//! # Entity Builders
//!
//! Walks a `TranslationUnit` and produces `Function` and `Struct` records.
//!
//! - Structs are collected from every file the unit traversed, because a
//!   function in the processed file may depend on a struct from a header.
//! - Functions are collected only from the processed file and merged by
//!   identity, so a prototype and its definition become one record.

use crate::ast::{Access, AstNode, NodeKind, Parameter, TranslationUnit};
use crate::normalize::{AliasTable, qualify, simple_var_type};
use crate::primitives::{DELETE_SPECIFIER, MOVE_PARAMETER_NAME};
use crate::{Constructor, Function, FunctionIdentity, Struct, Variable};
use std::collections::BTreeMap;
use std::path::Path;

/// Everything one pass over a unit produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entities {
    /// Defined structs in source order. Names may repeat across headers.
    pub structs: Vec<Struct>,
    /// Merged functions of the processed file, in first-seen order.
    pub functions: Vec<Function>,
}

/// Builds entity records, normalizing every type spelling through an alias table.
pub struct EntityBuilder<'a> {
    aliases: &'a AliasTable,
}

impl<'a> EntityBuilder<'a> {
    #[must_use]
    pub fn new(aliases: &'a AliasTable) -> Self {
        Self { aliases }
    }

    /// Collect structs from the whole unit and functions declared in `file`.
    #[must_use]
    pub fn collect(&self, unit: &TranslationUnit, file: &Path) -> Entities {
        let mut walk = Walk {
            builder: self,
            file,
            entities: Entities::default(),
            index: BTreeMap::new(),
        };
        walk.visit_all(&unit.nodes, "");
        tracing::debug!(
            file = %file.display(),
            structs = walk.entities.structs.len(),
            functions = walk.entities.functions.len(),
            "Entities collected"
        );
        walk.entities
    }

    fn variable(&self, name: &str, type_spelling: &str) -> Variable {
        let raw = self.aliases.full_var_type(type_spelling);
        let simple = simple_var_type(&raw);
        Variable::new(name, raw, simple)
    }

    fn variables(&self, parameters: &[Parameter]) -> Vec<Variable> {
        parameters
            .iter()
            .map(|p| self.variable(&p.name, &p.type_spelling))
            .collect()
    }

    /// Build a struct from a defining record node.
    ///
    /// Returns `None` for a forward declaration (a record with no members).
    pub fn build_struct(&self, node: &AstNode, name: &str) -> Option<Struct> {
        if node.children.is_empty() {
            return None;
        }

        let mut record = Struct::new(name, node.location.file.clone(), node.location.line);
        let own_simple = record.simple_name().to_string();
        let move_targets = [
            format!("{} &&", self.aliases.full_var_type(name)),
            format!("{} &&", self.aliases.full_var_type(&own_simple)),
        ];

        for child in &node.children {
            match &child.kind {
                NodeKind::Field {
                    name,
                    type_spelling,
                    access,
                } => {
                    record.fields.push(self.variable(name, type_spelling));
                    if !access.is_public() {
                        record.has_private = true;
                    }
                }
                NodeKind::Constructor {
                    parameters,
                    access,
                    is_move,
                    is_copy,
                } => {
                    if child.ends_with_specifier(DELETE_SPECIFIER) {
                        continue;
                    }
                    let mut params = self.variables(parameters);
                    if *is_move {
                        for param in params.iter_mut().filter(|p| p.name.is_empty()) {
                            param.name = MOVE_PARAMETER_NAME.to_string();
                        }
                    }
                    if *is_move && access.is_public() {
                        record.has_move_constructor = true;
                    } else if *is_copy && access.is_public() {
                        record.has_copy_constructor = true;
                    }
                    record.constructors.push(Constructor {
                        params,
                        definition_line: child.location.line,
                    });
                }
                NodeKind::Method {
                    name,
                    parameters,
                    access,
                } => {
                    if child.ends_with_specifier(DELETE_SPECIFIER) {
                        continue;
                    }
                    let move_assignment = name == "operator="
                        && *access == Access::Public
                        && parameters.iter().all(|p| {
                            let raw = self.aliases.full_var_type(&p.type_spelling);
                            move_targets.contains(&raw)
                        });
                    if !move_assignment {
                        record.has_other = true;
                    }
                }
                NodeKind::BaseSpecifier { name, access } => {
                    if !access.is_public() {
                        record.has_private = true;
                    }
                    let base = self.aliases.full_var_type(name);
                    record.base_structs.push(base.trim().to_string());
                }
                NodeKind::AccessSpecifier => {}
                NodeKind::Namespace { .. }
                | NodeKind::Record { .. }
                | NodeKind::Function { .. }
                | NodeKind::Alias { .. }
                | NodeKind::Other { .. } => record.has_other = true,
            }
        }

        Some(record)
    }
}

// =============================================================================
// UNIT WALK
// =============================================================================

struct Walk<'b, 'a> {
    builder: &'b EntityBuilder<'a>,
    file: &'b Path,
    entities: Entities,
    index: BTreeMap<FunctionIdentity, usize>,
}

impl Walk<'_, '_> {
    fn visit_all(&mut self, nodes: &[AstNode], prefix: &str) {
        for node in nodes {
            self.visit(node, prefix);
        }
    }

    fn visit(&mut self, node: &AstNode, prefix: &str) {
        match &node.kind {
            NodeKind::Namespace { name } => {
                let nested = qualify(prefix, name);
                self.visit_all(&node.children, &nested);
            }
            NodeKind::Record { name } => {
                let qualified = qualify(prefix, name);
                if let Some(record) = self.builder.build_struct(node, &qualified) {
                    self.entities.structs.push(record);
                }
            }
            NodeKind::Function {
                name,
                return_type,
                parameters,
                has_body,
            } if node.location.file == self.file => {
                let raw_return_type = self.builder.aliases.full_var_type(return_type);
                let function = Function {
                    name: qualify(prefix, name),
                    simple_return_type: simple_var_type(&raw_return_type),
                    raw_return_type,
                    params: self.builder.variables(parameters),
                    declaration_line: None,
                    definition_line: None,
                };
                self.merge(function, node.location.line, *has_body);
            }
            _ => {}
        }
    }

    /// Fold one occurrence into the record of its identity.
    fn merge(&mut self, function: Function, line: u32, has_body: bool) {
        let identity = function.identity();
        let slot = match self.index.get(&identity) {
            Some(&slot) => {
                if !has_body {
                    self.entities.functions[slot].declaration_line = Some(line);
                }
                slot
            }
            None => {
                let slot = self.entities.functions.len();
                self.entities.functions.push(Function {
                    declaration_line: Some(line),
                    ..function
                });
                self.index.insert(identity, slot);
                slot
            }
        };
        if has_body {
            self.entities.functions[slot].definition_line = Some(line);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
