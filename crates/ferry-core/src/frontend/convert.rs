//! tree-sitter node conversion and type spelling.
//!
//! Type spellings follow the clang pretty-printer shape so that catalogs do
//! not depend on how the source was formatted:
//!
//! - qualifiers first: `int const x` → `const int`
//! - declarator operators after one space, in source order: `int ***`,
//!   `S &&`, `int *const *`
//! - template arguments joined with `", "`, no space before `>`
//! - an unqualified type name declared in an enclosing namespace is
//!   namespace-qualified

use crate::ast::{Access, AstNode, NodeKind, Parameter, SourceLocation};
use std::collections::BTreeSet;
use std::path::Path;
use tree_sitter::Node;

/// Preprocessor conditionals; only their first branch is read.
const CONDITIONAL_KINDS: &[&str] = &["preproc_ifdef", "preproc_if"];

const RECORD_KINDS: &[&str] = &["struct_specifier", "class_specifier"];

/// Declarator names that make a function declarator a real function
/// rather than a function pointer.
const FUNCTION_NAME_KINDS: &[&str] = &[
    "identifier",
    "field_identifier",
    "type_identifier",
    "qualified_identifier",
    "operator_name",
    "destructor_name",
];

// =============================================================================
// NODE HELPERS
// =============================================================================

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Named children, reading only the first branch of a preprocessor
/// conditional.
///
/// `#else` and `#elif` arms are skipped, so a platform-switched declaration
/// is seen once.
fn branch_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    if !CONDITIONAL_KINDS.contains(&node.kind()) {
        return named_children(node);
    }
    let skipped: Vec<usize> = ["name", "condition", "alternative"]
        .iter()
        .filter_map(|field| node.child_by_field_name(field))
        .map(|child| child.id())
        .collect();
    named_children(node)
        .into_iter()
        .filter(|child| !skipped.contains(&child.id()))
        .collect()
}

fn all_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

fn field_children<'t>(node: Node<'t>, field: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor).collect()
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_access(text: &str) -> Option<Access> {
    match text.trim().trim_end_matches(':').trim() {
        "public" => Some(Access::Public),
        "protected" => Some(Access::Protected),
        "private" => Some(Access::Private),
        _ => None,
    }
}

fn line_of(node: Node<'_>) -> u32 {
    u32::try_from(node.start_position().row + 1).unwrap_or(u32::MAX)
}

// =============================================================================
// KNOWN TYPES
// =============================================================================

/// Qualified names of every type declared in the loaded files.
#[derive(Debug, Clone, Default)]
pub(super) struct KnownTypes {
    names: BTreeSet<String>,
}

impl KnownTypes {
    pub(super) fn collect(&mut self, root: Node<'_>, source: &str) {
        self.walk(root, source, &mut Vec::new());
    }

    fn insert(&mut self, scope: &[String], name: &str) {
        let name = collapse(name);
        if name.is_empty() {
            return;
        }
        let mut qualified = scope.join("::");
        if !qualified.is_empty() {
            qualified.push_str("::");
        }
        qualified.push_str(&name);
        self.names.insert(qualified);
    }

    fn walk(&mut self, node: Node<'_>, source: &str, scope: &mut Vec<String>) {
        let text = |n: Node<'_>| n.utf8_text(source.as_bytes()).unwrap_or("").to_string();
        for child in branch_children(node) {
            match child.kind() {
                "namespace_definition" => {
                    let mark = scope.len();
                    if let Some(name) = child.child_by_field_name("name") {
                        scope.extend(split_scope(&text(name)));
                    }
                    if let Some(body) = child.child_by_field_name("body") {
                        self.walk(body, source, scope);
                    }
                    scope.truncate(mark);
                }
                "struct_specifier" | "class_specifier" | "union_specifier" | "enum_specifier" => {
                    if let Some(name) = child.child_by_field_name("name") {
                        self.insert(scope, &text(name));
                    }
                }
                "declaration" | "type_definition" => {
                    if let Some(ty) = child.child_by_field_name("type") {
                        if let Some(name) = ty.child_by_field_name("name") {
                            if ty.kind().ends_with("_specifier") {
                                self.insert(scope, &text(name));
                            }
                        }
                    }
                    if child.kind() == "type_definition" {
                        for declarator in field_children(child, "declarator") {
                            if let Some(name) = innermost_name(declarator) {
                                self.insert(scope, &text(name));
                            }
                        }
                    }
                }
                "alias_declaration" => {
                    if let Some(name) = child.child_by_field_name("name") {
                        self.insert(scope, &text(name));
                    }
                }
                "linkage_specification" => match child.child_by_field_name("body") {
                    Some(body) if body.kind() == "declaration_list" => self.walk(body, source, scope),
                    _ => self.walk(child, source, scope),
                },
                "template_declaration" => self.walk(child, source, scope),
                kind if CONDITIONAL_KINDS.contains(&kind) => self.walk(child, source, scope),
                _ => {}
            }
        }
    }

    /// Innermost-scope-first lookup of `name` from `scope`.
    fn lookup(&self, name: &str, scope: &[String]) -> Option<String> {
        (0..=scope.len()).rev().find_map(|depth| {
            let candidate = if depth == 0 {
                name.to_string()
            } else {
                format!("{}::{}", scope[..depth].join("::"), name)
            };
            self.names.contains(&candidate).then_some(candidate)
        })
    }

    fn qualify(&self, name: &str, scope: &[String]) -> String {
        self.lookup(name, scope).unwrap_or_else(|| name.to_string())
    }
}

fn split_scope(name: &str) -> Vec<String> {
    name.split("::")
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(String::from)
        .collect()
}

/// The identifier a declarator declares, through any pointer/reference/array wrapping.
fn innermost_name(declarator: Node<'_>) -> Option<Node<'_>> {
    let mut node = declarator;
    loop {
        match node.kind() {
            "identifier" | "field_identifier" | "type_identifier" | "qualified_identifier"
            | "operator_name" | "destructor_name" => return Some(node),
            "pointer_declarator" | "array_declarator" | "init_declarator"
            | "function_declarator" => node = node.child_by_field_name("declarator")?,
            "reference_declarator" | "parenthesized_declarator" | "attributed_declarator" => {
                node = named_children(node).into_iter().next()?;
            }
            _ => return None,
        }
    }
}

// =============================================================================
// DECLARATORS
// =============================================================================

/// A declarator taken apart into what the spelling needs.
#[derive(Default)]
struct DeclaratorParts<'t> {
    /// `*`, `*const`, `&`, `&&`, outermost first.
    ops: Vec<String>,
    /// `[N]` array extents.
    suffix: String,
    name: Option<Node<'t>>,
    /// Function-pointer declarators are spelled from source text.
    raw: Option<String>,
}

fn pointer_op(node: Node<'_>, source: &str) -> String {
    let mut op = String::from("*");
    for child in all_children(node) {
        if child.kind() == "type_qualifier" {
            op.push_str(child.utf8_text(source.as_bytes()).unwrap_or(""));
        }
    }
    op
}

fn reference_op(node: Node<'_>, source: &str) -> String {
    all_children(node)
        .into_iter()
        .find(|child| !child.is_named())
        .map(|child| child.utf8_text(source.as_bytes()).unwrap_or("&").to_string())
        .unwrap_or_else(|| "&".to_string())
}

fn declarator_parts<'t>(declarator: Option<Node<'t>>, source: &str) -> DeclaratorParts<'t> {
    let mut parts = DeclaratorParts::default();
    let mut current = declarator;
    while let Some(node) = current {
        current = match node.kind() {
            "identifier" | "field_identifier" | "type_identifier" | "qualified_identifier"
            | "operator_name" => {
                parts.name = Some(node);
                None
            }
            "pointer_declarator" | "abstract_pointer_declarator" => {
                parts.ops.push(pointer_op(node, source));
                node.child_by_field_name("declarator")
            }
            "reference_declarator" | "abstract_reference_declarator" => {
                parts.ops.push(reference_op(node, source));
                named_children(node).into_iter().next()
            }
            "array_declarator" | "abstract_array_declarator" => {
                let size = node
                    .child_by_field_name("size")
                    .and_then(|size| size.utf8_text(source.as_bytes()).ok())
                    .unwrap_or("");
                parts.suffix.push_str(&format!("[{}]", collapse(size)));
                node.child_by_field_name("declarator")
            }
            "init_declarator" => node.child_by_field_name("declarator"),
            "parenthesized_declarator" | "attributed_declarator" => {
                named_children(node).into_iter().next()
            }
            "function_declarator" | "abstract_function_declarator" => {
                parts.name = innermost_name(node);
                parts.raw = Some(collapse(node.utf8_text(source.as_bytes()).unwrap_or("")));
                None
            }
            _ => None,
        };
    }
    parts
}

/// Unwrap a declarator down to its function declarator, collecting the
/// return-type operators on the way.
///
/// Returns `None` for variables and for function pointers.
fn unwrap_function<'t>(declarator: Node<'t>, source: &str) -> Option<(Node<'t>, Vec<String>)> {
    let mut ops = Vec::new();
    let mut node = declarator;
    loop {
        match node.kind() {
            "function_declarator" => {
                let name = node.child_by_field_name("declarator")?;
                return FUNCTION_NAME_KINDS
                    .contains(&name.kind())
                    .then_some((node, ops));
            }
            "pointer_declarator" => {
                ops.push(pointer_op(node, source));
                node = node.child_by_field_name("declarator")?;
            }
            "reference_declarator" => {
                ops.push(reference_op(node, source));
                node = named_children(node).into_iter().next()?;
            }
            "attributed_declarator" => node = named_children(node).into_iter().next()?,
            _ => return None,
        }
    }
}

fn join_ops(spelling: &mut String, ops: &[String]) {
    if ops.is_empty() {
        return;
    }
    spelling.push(' ');
    for (index, op) in ops.iter().enumerate() {
        let after_word = spelling
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '_');
        if index > 0 && after_word {
            spelling.push(' ');
        }
        spelling.push_str(op);
    }
}

// =============================================================================
// CONVERTER
// =============================================================================

/// Converts the tree of one loaded file.
pub(super) struct Converter<'a> {
    path: &'a Path,
    source: &'a str,
    known: &'a KnownTypes,
}

impl<'a> Converter<'a> {
    pub(super) fn new(path: &'a Path, source: &'a str, known: &'a KnownTypes) -> Self {
        Self {
            path,
            source,
            known,
        }
    }

    fn text(&self, node: Node<'_>) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn location(&self, node: Node<'_>) -> SourceLocation {
        SourceLocation::new(self.path, line_of(node))
    }

    /// Leaf token spellings, without comments and trailing `;`.
    fn tokens(&self, node: Node<'_>) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if current.kind() == "comment" {
                continue;
            }
            if current.child_count() == 0 {
                out.push(self.text(current).to_string());
            } else {
                stack.extend(all_children(current).into_iter().rev());
            }
        }
        while out.last().is_some_and(|t| t == ";") {
            out.pop();
        }
        out
    }

    pub(super) fn convert_unit(&self, root: Node<'_>) -> Vec<AstNode> {
        let mut out = Vec::new();
        self.items(root, &mut Vec::new(), &mut out);
        out
    }

    fn items(&self, node: Node<'_>, scope: &mut Vec<String>, out: &mut Vec<AstNode>) {
        for child in branch_children(node) {
            self.item(child, scope, out);
        }
    }

    fn item(&self, node: Node<'_>, scope: &mut Vec<String>, out: &mut Vec<AstNode>) {
        match node.kind() {
            "namespace_definition" => {
                let name_node = node.child_by_field_name("name");
                let name = name_node.map(|n| collapse(self.text(n))).unwrap_or_default();
                let mark = scope.len();
                scope.extend(split_scope(&name));
                let mut inner = Vec::new();
                if let Some(body) = node.child_by_field_name("body") {
                    self.items(body, scope, &mut inner);
                }
                scope.truncate(mark);
                let location = self.location(name_node.unwrap_or(node));
                out.push(AstNode::new(NodeKind::Namespace { name }, location).with_children(inner));
            }
            "struct_specifier" | "class_specifier" => {
                out.extend(self.record(node, None, scope));
            }
            "declaration" => self.declaration(node, scope, out),
            "function_definition" => {
                if let Some(declarator) = node.child_by_field_name("declarator") {
                    let has_body = node.child_by_field_name("body").is_some();
                    self.function(node, declarator, scope, has_body, out);
                }
            }
            "type_definition" => self.type_definition(node, scope, out),
            "alias_declaration" => {
                let name = node.child_by_field_name("name");
                let ty = node.child_by_field_name("type");
                if let (Some(name), Some(ty)) = (name, ty) {
                    let underlying = self.descriptor(ty, scope);
                    out.push(AstNode::new(
                        NodeKind::Alias {
                            name: collapse(self.text(name)),
                            underlying,
                        },
                        self.location(name),
                    ));
                }
            }
            "linkage_specification" => match node.child_by_field_name("body") {
                Some(body) if body.kind() == "declaration_list" => self.items(body, scope, out),
                Some(body) => self.item(body, scope, out),
                None => {}
            },
            kind if CONDITIONAL_KINDS.contains(&kind) => self.items(node, scope, out),
            _ => {}
        }
    }

    fn declaration(&self, node: Node<'_>, scope: &mut Vec<String>, out: &mut Vec<AstNode>) {
        if let Some(ty) = node.child_by_field_name("type") {
            if RECORD_KINDS.contains(&ty.kind()) && ty.child_by_field_name("body").is_some() {
                out.extend(self.record(ty, None, scope));
            }
        }
        for declarator in field_children(node, "declarator") {
            self.function(node, declarator, scope, false, out);
        }
    }

    /// A free function declaration or definition.
    fn function(
        &self,
        owner: Node<'_>,
        declarator: Node<'_>,
        scope: &[String],
        has_body: bool,
        out: &mut Vec<AstNode>,
    ) {
        let Some((function, ret_ops)) = unwrap_function(declarator, self.source) else {
            return;
        };
        let Some(name_node) = function.child_by_field_name("declarator") else {
            return;
        };
        let name = self.function_name(name_node);
        let location = self.location(name_node);

        // `ns::f` resolves its types from inside `ns`; `S::f` is a member.
        let mut lookup_scope = scope.to_vec();
        if let Some((qualifier, _)) = name.rsplit_once("::") {
            if self.known.lookup(qualifier, scope).is_some() {
                out.push(AstNode::new(
                    NodeKind::Other {
                        description: "out-of-line member definition".to_string(),
                    },
                    location,
                ));
                return;
            }
            lookup_scope.extend(split_scope(qualifier));
        }

        let Some(ty) = owner.child_by_field_name("type") else {
            return;
        };
        let return_type = self.spell(owner, ty, &ret_ops, "", &lookup_scope);
        let parameters = self.parameters(function, &lookup_scope);
        out.push(
            AstNode::new(
                NodeKind::Function {
                    name,
                    return_type,
                    parameters,
                    has_body,
                },
                location,
            )
            .with_tokens(self.tokens(owner)),
        );
    }

    fn function_name(&self, name_node: Node<'_>) -> String {
        let text = self.text(name_node);
        if name_node.kind() == "operator_name" {
            text.split_whitespace().collect()
        } else {
            collapse(text)
        }
    }

    fn type_definition(&self, node: Node<'_>, scope: &mut Vec<String>, out: &mut Vec<AstNode>) {
        let Some(ty) = node.child_by_field_name("type") else {
            return;
        };
        let declarators = field_children(node, "declarator");

        if RECORD_KINDS.contains(&ty.kind()) && ty.child_by_field_name("body").is_some() {
            if ty.child_by_field_name("name").is_some() {
                out.extend(self.record(ty, None, scope));
            } else {
                // `typedef struct { ... } Name;` names the struct itself.
                let name = declarators
                    .first()
                    .filter(|d| d.kind() == "type_identifier")
                    .map(|d| self.text(*d));
                out.extend(self.record(ty, name, scope));
                return;
            }
        }

        for declarator in declarators {
            let (underlying, name) = self.declared(node, ty, Some(declarator), scope);
            if name.is_empty() {
                continue;
            }
            let location = innermost_name(declarator).unwrap_or(declarator);
            out.push(AstNode::new(
                NodeKind::Alias { name, underlying },
                self.location(location),
            ));
        }
    }

    // -------------------------------------------------------------------------
    // Records
    // -------------------------------------------------------------------------

    fn record(&self, node: Node<'_>, name_override: Option<&str>, scope: &[String]) -> Option<AstNode> {
        let name_node = node.child_by_field_name("name");
        let name = match name_override {
            Some(name) => name.to_string(),
            None => collapse(self.text(name_node?)),
        };
        if name.is_empty() {
            return None;
        }
        let location = self.location(name_node.unwrap_or(node));
        let record = AstNode::new(NodeKind::Record { name: name.clone() }, location);

        let Some(body) = node.child_by_field_name("body") else {
            return Some(record);
        };

        let default_access = if node.kind() == "class_specifier" {
            Access::Private
        } else {
            Access::Public
        };
        let mut qualified = scope.join("::");
        if !qualified.is_empty() {
            qualified.push_str("::");
        }
        qualified.push_str(&name);
        let context = RecordContext {
            name: &name,
            qualified: &qualified,
            scope,
        };

        let mut members = Vec::new();
        for child in all_children(node) {
            if child.kind() == "base_class_clause" {
                self.bases(child, default_access, scope, &mut members);
            }
        }
        let mut access = default_access;
        self.members(body, &context, &mut access, &mut members);

        Some(record.with_children(members))
    }

    fn bases(&self, clause: Node<'_>, default: Access, scope: &[String], out: &mut Vec<AstNode>) {
        let mut access = None;
        for child in all_children(clause) {
            match child.kind() {
                "access_specifier" | "public" | "protected" | "private" => {
                    access = parse_access(self.text(child));
                }
                "," => access = None,
                "type_identifier" | "qualified_type_identifier" | "qualified_identifier"
                | "template_type" => {
                    out.push(AstNode::new(
                        NodeKind::BaseSpecifier {
                            name: self.type_name(child, scope),
                            access: access.unwrap_or(default),
                        },
                        self.location(child),
                    ));
                }
                _ => {}
            }
        }
    }

    fn members(
        &self,
        body: Node<'_>,
        record: &RecordContext<'_>,
        access: &mut Access,
        out: &mut Vec<AstNode>,
    ) {
        for child in branch_children(body) {
            match child.kind() {
                "comment" => {}
                "access_specifier" => {
                    if let Some(parsed) = parse_access(self.text(child)) {
                        *access = parsed;
                    }
                    out.push(AstNode::new(NodeKind::AccessSpecifier, self.location(child)));
                }
                "field_declaration" => self.field_declaration(child, record, *access, out),
                "function_definition" | "declaration" => match child.child_by_field_name("declarator") {
                    Some(declarator) => self.member_function(child, declarator, record, *access, out),
                    None => out.push(self.other(child)),
                },
                kind if CONDITIONAL_KINDS.contains(&kind) => self.members(child, record, access, out),
                kind if kind.starts_with("preproc_") => {}
                _ => out.push(self.other(child)),
            }
        }
    }

    fn other(&self, node: Node<'_>) -> AstNode {
        AstNode::new(
            NodeKind::Other {
                description: node.kind().to_string(),
            },
            self.location(node),
        )
        .with_tokens(self.tokens(node))
    }

    fn field_declaration(
        &self,
        node: Node<'_>,
        record: &RecordContext<'_>,
        access: Access,
        out: &mut Vec<AstNode>,
    ) {
        let is_static = all_children(node)
            .into_iter()
            .any(|c| c.kind() == "storage_class_specifier" && self.text(c) == "static");
        let declarators = field_children(node, "declarator");
        let ty = node.child_by_field_name("type");
        let (Some(ty), false, false) = (ty, is_static, declarators.is_empty()) else {
            out.push(self.other(node));
            return;
        };

        for declarator in declarators {
            if unwrap_function(declarator, self.source).is_some() {
                self.member_function(node, declarator, record, access, out);
                continue;
            }
            let (type_spelling, name) = self.declared(node, ty, Some(declarator), record.scope);
            let location = innermost_name(declarator).unwrap_or(declarator);
            out.push(AstNode::new(
                NodeKind::Field {
                    name,
                    type_spelling,
                    access,
                },
                self.location(location),
            ));
        }
    }

    fn member_function(
        &self,
        owner: Node<'_>,
        declarator: Node<'_>,
        record: &RecordContext<'_>,
        access: Access,
        out: &mut Vec<AstNode>,
    ) {
        let Some((function, _)) = unwrap_function(declarator, self.source) else {
            out.push(self.other(owner));
            return;
        };
        let Some(name_node) = function.child_by_field_name("declarator") else {
            out.push(self.other(owner));
            return;
        };
        let tokens = self.tokens(owner);
        let location = self.location(name_node);
        let parameters = self.parameters(function, record.scope);
        let name = self.function_name(name_node);

        let kind = match name_node.kind() {
            "identifier" | "field_identifier" | "type_identifier"
                if owner.child_by_field_name("type").is_none() && name == record.name =>
            {
                let (is_move, is_copy) = record.special_constructor(&parameters);
                NodeKind::Constructor {
                    parameters,
                    access,
                    is_move,
                    is_copy,
                }
            }
            "identifier" | "field_identifier" | "type_identifier" | "operator_name" => {
                NodeKind::Method {
                    name,
                    parameters,
                    access,
                }
            }
            other => NodeKind::Other {
                description: other.to_string(),
            },
        };
        out.push(AstNode::new(kind, location).with_tokens(tokens));
    }

    // -------------------------------------------------------------------------
    // Parameters & types
    // -------------------------------------------------------------------------

    fn parameters(&self, function: Node<'_>, scope: &[String]) -> Vec<Parameter> {
        let Some(list) = function.child_by_field_name("parameters") else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for child in all_children(list) {
            match child.kind() {
                "parameter_declaration" | "optional_parameter_declaration" => {
                    let Some(ty) = child.child_by_field_name("type") else {
                        continue;
                    };
                    let declarator = child.child_by_field_name("declarator");
                    let (type_spelling, name) = self.declared(child, ty, declarator, scope);
                    out.push(Parameter::new(name, type_spelling));
                }
                "variadic_parameter_declaration" | "..." => out.push(Parameter::new("", "...")),
                _ => {}
            }
        }
        // `f(void)` takes no arguments.
        if let [only] = out.as_slice() {
            if only.name.is_empty() && only.type_spelling == "void" {
                out.clear();
            }
        }
        out
    }

    /// Spelling and declared name of `type declarator`.
    fn declared(
        &self,
        owner: Node<'_>,
        ty: Node<'_>,
        declarator: Option<Node<'_>>,
        scope: &[String],
    ) -> (String, String) {
        let parts = declarator_parts(declarator, self.source);
        let name = parts.name.map(|n| collapse(self.text(n))).unwrap_or_default();
        let spelling = match parts.raw {
            Some(raw) => {
                let base = self.spell(owner, ty, &[], "", scope);
                let stripped = if name.is_empty() {
                    raw
                } else {
                    raw.replacen(&name, "", 1)
                };
                format!("{} {}", base, stripped.replace(' ', ""))
            }
            None => self.spell(owner, ty, &parts.ops, &parts.suffix, scope),
        };
        (spelling, name)
    }

    /// Qualifiers, base type, operators, array suffix.
    fn spell(
        &self,
        owner: Node<'_>,
        ty: Node<'_>,
        ops: &[String],
        suffix: &str,
        scope: &[String],
    ) -> String {
        let mut qualifiers: Vec<&str> = Vec::new();
        for child in all_children(owner) {
            if child.kind() == "type_qualifier" {
                let qualifier = self.text(child);
                if matches!(qualifier, "const" | "volatile") && !qualifiers.contains(&qualifier) {
                    qualifiers.push(qualifier);
                }
            }
        }

        let mut spelling = qualifiers.join(" ");
        if !spelling.is_empty() {
            spelling.push(' ');
        }
        spelling.push_str(&self.type_name(ty, scope));
        join_ops(&mut spelling, ops);
        if !suffix.is_empty() {
            if ops.is_empty() {
                spelling.push(' ');
            }
            spelling.push_str(suffix);
        }
        spelling
    }

    fn descriptor(&self, node: Node<'_>, scope: &[String]) -> String {
        match node.child_by_field_name("type") {
            Some(ty) => {
                let declarator = node.child_by_field_name("declarator");
                self.declared(node, ty, declarator, scope).0
            }
            None => collapse(self.text(node)),
        }
    }

    /// The spelling of a bare type node.
    fn type_name(&self, node: Node<'_>, scope: &[String]) -> String {
        match node.kind() {
            "type_identifier" => self.known.qualify(self.text(node), scope),
            "qualified_identifier" | "qualified_type_identifier" => {
                let written: String = self.text(node).split_whitespace().collect();
                if !written.contains('<') {
                    return self.known.qualify(written.trim_start_matches("::"), scope);
                }
                let prefix = node
                    .child_by_field_name("scope")
                    .map(|s| self.type_name(s, scope));
                match (prefix, node.child_by_field_name("name")) {
                    (Some(prefix), Some(name)) => {
                        format!("{}::{}", prefix, self.type_name(name, scope))
                    }
                    (None, Some(name)) => self.type_name(name, scope),
                    _ => collapse(self.text(node)),
                }
            }
            "template_type" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| collapse(self.text(n)))
                    .unwrap_or_default();
                let args: Vec<String> = node
                    .child_by_field_name("arguments")
                    .map(named_children)
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|arg| arg.kind() != "comment")
                    .map(|arg| match arg.kind() {
                        "type_descriptor" => self.descriptor(arg, scope),
                        _ => collapse(self.text(arg)),
                    })
                    .collect();
                format!("{}<{}>", name, args.join(", "))
            }
            "struct_specifier" | "class_specifier" | "union_specifier" | "enum_specifier" => {
                let keyword = node.kind().trim_end_matches("_specifier");
                match node.child_by_field_name("name") {
                    Some(name) => format!("{} {}", keyword, self.type_name(name, scope)),
                    None => format!("{} (anonymous)", keyword),
                }
            }
            "type_descriptor" => self.descriptor(node, scope),
            _ => collapse(self.text(node)),
        }
    }
}

/// The record whose members are being converted.
struct RecordContext<'r> {
    name: &'r str,
    qualified: &'r str,
    scope: &'r [String],
}

impl RecordContext<'_> {
    /// `(is_move, is_copy)` for a constructor with these parameters.
    fn special_constructor(&self, parameters: &[Parameter]) -> (bool, bool) {
        let [only] = parameters else {
            return (false, false);
        };
        let spelling = only.type_spelling.as_str();
        let own = |suffix: &str| {
            spelling == format!("{} {}", self.name, suffix)
                || spelling == format!("{} {}", self.qualified, suffix)
        };
        let is_move = own("&&");
        let unconst = spelling.strip_prefix("const ").unwrap_or(spelling);
        let is_copy = unconst == format!("{} &", self.name) || unconst == format!("{} &", self.qualified);
        (is_move, is_copy)
    }
}
