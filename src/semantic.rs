//! Single-file semantic model over the tree-sitter C# syntax tree.
//!
//! The model is an immutable snapshot built once per linted file: an arena of
//! class declarations with raw base-list entries, the interfaces and delegate
//! types declared in the unit, and the fields/methods of each class. Lint
//! rules resolve identifiers against this snapshot instead of touching the
//! syntax tree directly.
//!
//! Resolution is deliberately scoped to the compilation unit being linted.
//! Anything the model cannot see (types from other assemblies, members of
//! foreign objects) resolves to `None`, and callers are expected to fail
//! open: produce no finding rather than guess.

use std::collections::{HashMap, HashSet};
use tree_sitter::Node;

/// Upper bound on ancestor-chain traversal. Inheritance chains deeper than
/// this are treated as unresolved, which also guards against cyclic base
/// lists in malformed input.
pub const MAX_ANCESTOR_DEPTH: usize = 32;

/// A class declared in the linted file.
#[derive(Debug)]
pub struct ClassDecl<'a> {
    pub name: String,
    pub namespace: Option<String>,
    /// Raw base-list entries in source order (base class and/or interfaces).
    pub base_types: Vec<String>,
    pub fields: Vec<FieldDecl<'a>>,
    pub methods: Vec<MethodDecl<'a>>,
    pub node: Node<'a>,
}

/// A field, event field, or auto-property usable as stored delegate storage.
#[derive(Debug)]
pub struct FieldDecl<'a> {
    pub name: String,
    pub type_name: String,
    pub is_event: bool,
    pub node: Node<'a>,
}

/// A method declared directly on a class.
#[derive(Debug)]
pub struct MethodDecl<'a> {
    pub name: String,
    pub is_static: bool,
    pub params: Vec<ParamDecl>,
    pub body: Option<Node<'a>>,
    pub node: Node<'a>,
    pub name_node: Node<'a>,
}

#[derive(Debug)]
pub struct ParamDecl {
    pub name: String,
    pub type_name: String,
}

/// An interface declared in the linted file, with its inherited interfaces.
#[derive(Debug)]
pub struct InterfaceDecl {
    pub name: String,
    pub bases: Vec<String>,
}

/// Declaration an identifier resolves to within a method scope.
#[derive(Debug)]
pub enum Resolved<'m, 'a> {
    Local { type_name: &'m str },
    Field(&'m FieldDecl<'a>),
    Method(&'m MethodDecl<'a>),
}

/// Locals visible inside one method body (parameters plus declarations).
#[derive(Debug, Default)]
pub struct MethodScope {
    locals: HashMap<String, String>,
}

impl MethodScope {
    pub fn local_type(&self, name: &str) -> Option<&str> {
        self.locals.get(name).map(String::as_str)
    }
}

/// Immutable semantic snapshot of one C# source file.
pub struct ScriptModel<'a> {
    source: &'a str,
    usings: Vec<String>,
    classes: Vec<ClassDecl<'a>>,
    class_index: HashMap<String, usize>,
    interfaces: Vec<InterfaceDecl>,
    interface_index: HashMap<String, usize>,
    delegate_types: HashSet<String>,
}

impl<'a> ScriptModel<'a> {
    pub fn build(root: Node<'a>, source: &'a str) -> Self {
        let mut model = Self {
            source,
            usings: Vec::new(),
            classes: Vec::new(),
            class_index: HashMap::new(),
            interfaces: Vec::new(),
            interface_index: HashMap::new(),
            delegate_types: HashSet::new(),
        };
        model.collect_declarations(root, None);
        model
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Source text of a node; empty on out-of-range offsets.
    pub fn text(&self, node: Node<'a>) -> &'a str {
        self.source.get(node.start_byte()..node.end_byte()).unwrap_or("")
    }

    pub fn classes(&self) -> impl Iterator<Item = (usize, &ClassDecl<'a>)> {
        self.classes.iter().enumerate()
    }

    pub fn class(&self, idx: usize) -> &ClassDecl<'a> {
        &self.classes[idx]
    }

    pub fn class_named(&self, name: &str) -> Option<usize> {
        self.class_index.get(name).copied()
    }

    pub fn interface_named(&self, name: &str) -> Option<&InterfaceDecl> {
        self.interface_index.get(name).map(|&i| &self.interfaces[i])
    }

    pub fn is_declared_delegate(&self, name: &str) -> bool {
        self.delegate_types.contains(name)
    }

    /// Whether the file imports the given namespace (`using UnityEngine;`).
    pub fn has_using(&self, namespace: &str) -> bool {
        self.usings.iter().any(|u| u == namespace)
    }

    /// In-unit ancestor classes of `idx`, nearest first.
    ///
    /// The walk is iterative and depth-capped; it stops at the first base
    /// entry that is not a class declared in this file. A visited set keeps
    /// cyclic base lists (a provider contract violation) from looping.
    pub fn ancestor_chain(&self, idx: usize) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([idx]);
        let mut cur = idx;

        for _ in 0..MAX_ANCESTOR_DEPTH {
            let Some(next) = self.in_unit_base(cur) else {
                break;
            };
            if !seen.insert(next) {
                break;
            }
            chain.push(next);
            cur = next;
        }

        chain
    }

    /// First base-list entry of `idx` that names a class declared in this file.
    pub fn in_unit_base(&self, idx: usize) -> Option<usize> {
        self.classes[idx]
            .base_types
            .iter()
            .find_map(|name| self.class_named(crate::type_classifier::simple_type_name(name)))
    }

    /// Build the local scope for a method: parameters plus every
    /// `variable_declaration` in its body.
    pub fn method_scope(&self, method: &MethodDecl<'a>) -> MethodScope {
        let mut scope = MethodScope::default();
        for param in &method.params {
            scope
                .locals
                .insert(param.name.clone(), param.type_name.clone());
        }

        if let Some(body) = method.body {
            walk(body, &mut |node| {
                if node.kind() != "variable_declaration" {
                    return;
                }
                let Some(ty) = node.child_by_field_name("type") else {
                    return;
                };
                let type_name = self.text(ty).to_string();
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    if child.kind() == "variable_declarator"
                        && let Some(name) = declarator_name(self.source, child)
                    {
                        scope.locals.insert(name.to_string(), type_name.clone());
                    }
                }
            });
        }

        scope
    }

    /// Resolve a bare identifier within a method of `class_idx`.
    ///
    /// Resolution order follows C# lookup for the shapes we care about:
    /// locals shadow fields, fields shadow nothing (a member name cannot be
    /// both a field and a method). Fields and methods are searched on the
    /// class itself and then up its in-unit ancestor chain.
    pub fn resolve_identifier<'m>(
        &'m self,
        class_idx: usize,
        scope: &'m MethodScope,
        name: &str,
    ) -> Option<Resolved<'m, 'a>> {
        if let Some(type_name) = scope.local_type(name) {
            return Some(Resolved::Local { type_name });
        }
        self.resolve_member(class_idx, name)
    }

    /// Resolve a member name (field or method) on a class or its in-unit
    /// ancestors.
    pub fn resolve_member<'m>(&'m self, class_idx: usize, name: &str) -> Option<Resolved<'m, 'a>> {
        for idx in std::iter::once(class_idx).chain(self.ancestor_chain(class_idx)) {
            let class = &self.classes[idx];
            if let Some(field) = class.fields.iter().find(|f| f.name == name) {
                return Some(Resolved::Field(field));
            }
            if let Some(method) = class.methods.iter().find(|m| m.name == name) {
                return Some(Resolved::Method(method));
            }
        }
        None
    }

    /// Resolve an invocation callee declared in this unit, matching by name
    /// and parameter count. The nearest class in the ancestor chain with a
    /// match wins; if that class declares more than one same-arity overload
    /// the callee is ambiguous and resolves to `None`. Overload resolution
    /// beyond arity is out of scope; foreign callees resolve to `None` too.
    pub fn resolve_method_by_arity<'m>(
        &'m self,
        class_idx: usize,
        name: &str,
        arity: usize,
    ) -> Option<&'m MethodDecl<'a>> {
        for idx in std::iter::once(class_idx).chain(self.ancestor_chain(class_idx)) {
            let mut matches = self.classes[idx]
                .methods
                .iter()
                .filter(|m| m.name == name && m.params.len() == arity);
            if let Some(first) = matches.next() {
                return if matches.next().is_none() {
                    Some(first)
                } else {
                    None
                };
            }
        }
        None
    }

    fn collect_declarations(&mut self, node: Node<'a>, namespace: Option<&str>) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "using_directive" => {
                    if let Some(name) = using_target(self.source, child) {
                        self.usings.push(name);
                    }
                }
                "namespace_declaration" => {
                    let ns = child
                        .child_by_field_name("name")
                        .map(|n| self.text(n).to_string());
                    if let Some(body) = child.child_by_field_name("body") {
                        self.collect_declarations(body, ns.as_deref());
                    }
                }
                "class_declaration" | "struct_declaration" => {
                    self.collect_class(child, namespace);
                }
                "interface_declaration" => {
                    self.collect_interface(child);
                }
                "delegate_declaration" => {
                    if let Some(name) = child.child_by_field_name("name") {
                        self.delegate_types.insert(self.text(name).to_string());
                    }
                }
                _ => {}
            }
        }
    }

    fn collect_class(&mut self, node: Node<'a>, namespace: Option<&str>) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = self.text(name_node).to_string();
        let base_types = base_list_entries(self.source, node);

        let mut class = ClassDecl {
            name: name.clone(),
            namespace: namespace.map(str::to_string),
            base_types,
            fields: Vec::new(),
            methods: Vec::new(),
            node,
        };

        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for member in body.children(&mut cursor) {
                match member.kind() {
                    "method_declaration" => {
                        if let Some(method) = self.collect_method(member) {
                            class.methods.push(method);
                        }
                    }
                    "field_declaration" => {
                        self.collect_variable_fields(member, false, &mut class.fields);
                    }
                    "event_field_declaration" => {
                        self.collect_variable_fields(member, true, &mut class.fields);
                    }
                    "event_declaration" => {
                        if let (Some(ty), Some(ev_name)) = (
                            member.child_by_field_name("type"),
                            member.child_by_field_name("name"),
                        ) {
                            class.fields.push(FieldDecl {
                                name: self.text(ev_name).to_string(),
                                type_name: self.text(ty).to_string(),
                                is_event: true,
                                node: member,
                            });
                        }
                    }
                    "property_declaration" => {
                        if let (Some(ty), Some(prop_name)) = (
                            member.child_by_field_name("type"),
                            member.child_by_field_name("name"),
                        ) {
                            class.fields.push(FieldDecl {
                                name: self.text(prop_name).to_string(),
                                type_name: self.text(ty).to_string(),
                                is_event: false,
                                node: member,
                            });
                        }
                    }
                    // Nested delegate types are usable as parameter/field types.
                    "delegate_declaration" => {
                        if let Some(dn) = member.child_by_field_name("name") {
                            self.delegate_types.insert(self.text(dn).to_string());
                        }
                    }
                    _ => {}
                }
            }
        }

        let idx = self.classes.len();
        self.classes.push(class);
        self.class_index.entry(name).or_insert(idx);
    }

    fn collect_method(&self, node: Node<'a>) -> Option<MethodDecl<'a>> {
        let name_node = node.child_by_field_name("name")?;
        let is_static = has_modifier(self.source, node, "static");

        let mut params = Vec::new();
        if let Some(list) = node.child_by_field_name("parameters") {
            let mut cursor = list.walk();
            for param in list.children(&mut cursor) {
                if param.kind() != "parameter" {
                    continue;
                }
                let Some(pname) = param.child_by_field_name("name") else {
                    continue;
                };
                let type_name = param
                    .child_by_field_name("type")
                    .map(|t| self.text(t).to_string())
                    .unwrap_or_default();
                params.push(ParamDecl {
                    name: self.text(pname).to_string(),
                    type_name,
                });
            }
        }

        let body = node
            .child_by_field_name("body")
            .filter(|b| b.kind() == "block");

        Some(MethodDecl {
            name: self.text(name_node).to_string(),
            is_static,
            params,
            body,
            node,
            name_node,
        })
    }

    fn collect_variable_fields(
        &self,
        node: Node<'a>,
        is_event: bool,
        out: &mut Vec<FieldDecl<'a>>,
    ) {
        let Some(decl) = first_child_of_kind(node, "variable_declaration") else {
            return;
        };
        let Some(ty) = decl.child_by_field_name("type") else {
            return;
        };
        let type_name = self.text(ty).to_string();

        let mut cursor = decl.walk();
        for child in decl.children(&mut cursor) {
            if child.kind() == "variable_declarator"
                && let Some(name) = declarator_name(self.source, child)
            {
                out.push(FieldDecl {
                    name: name.to_string(),
                    type_name: type_name.clone(),
                    is_event,
                    node: child,
                });
            }
        }
    }

    fn collect_interface(&mut self, node: Node<'a>) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = self.text(name_node).to_string();
        let bases = base_list_entries(self.source, node);

        let idx = self.interfaces.len();
        self.interfaces.push(InterfaceDecl {
            name: name.clone(),
            bases,
        });
        self.interface_index.entry(name).or_insert(idx);
    }
}

/// Pre-order traversal over all nodes, including unnamed ones.
pub fn walk<'a>(node: Node<'a>, f: &mut impl FnMut(Node<'a>)) {
    f(node);
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(child, f);
    }
}

fn first_child_of_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|c| c.kind() == kind)
}

fn has_modifier(source: &str, node: Node<'_>, modifier: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|c| {
        c.kind() == "modifier"
            && source.get(c.start_byte()..c.end_byte()) == Some(modifier)
    })
}

fn declarator_name<'a>(source: &'a str, declarator: Node<'_>) -> Option<&'a str> {
    let name = declarator
        .child_by_field_name("name")
        .or_else(|| first_child_of_kind(declarator, "identifier"))?;
    source.get(name.start_byte()..name.end_byte())
}

fn base_list_entries(source: &str, type_decl: Node<'_>) -> Vec<String> {
    let Some(bases) = type_decl
        .child_by_field_name("bases")
        .or_else(|| first_child_of_kind(type_decl, "base_list"))
    else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut cursor = bases.walk();
    for child in bases.named_children(&mut cursor) {
        if let Some(text) = source.get(child.start_byte()..child.end_byte()) {
            out.push(text.to_string());
        }
    }
    out
}

fn using_target(source: &str, directive: Node<'_>) -> Option<String> {
    let mut cursor = directive.walk();
    let target = directive
        .named_children(&mut cursor)
        .find(|c| matches!(c.kind(), "identifier" | "qualified_name"))?;
    source
        .get(target.start_byte()..target.end_byte())
        .map(str::to_string)
}
