// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The usage tree: a trie keyed by field-access path recording how each
//! parameter and nested field is consumed.
//!
//! All nodes live in one flat arena owned by [`Params`] and reference each
//! other by [`ParamId`]. Template-call graphs may be cyclic, but the arena
//! keeps ownership acyclic: scopes and variable bindings hold ids, never
//! node pointers.

use core::fmt;
use std::collections::BTreeMap;

use crate::ast::NodeRef;

/// Classification of one observed consumption of a field.
///
/// Ordering is extraction strength: a stronger type forces more data to be
/// retained. `Reference` is the bottom: it records that a value was passed
/// along (call argument, `let` alias, data forward) without being consumed
/// itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UsageType {
    /// Passed along without direct consumption; carries no extraction
    /// weight. The eventual consumption is recorded where the value is
    /// dereferenced.
    Reference,
    /// Used only in a truthiness test.
    Exists,
    /// Only metadata was probed: length, loop position, key existence.
    Meta,
    /// The whole value was consumed, e.g. printed.
    Full,
    /// Passed to an opaque function; nothing can be assumed about which
    /// parts were consumed.
    Unknown,
}

/// One recorded observation of how a field was touched.
#[derive(Debug, Clone)]
pub struct Usage {
    pub usage_type: UsageType,
    /// Name of the template containing the consuming node.
    pub template: String,
    node: NodeRef,
}

impl Usage {
    pub(crate) fn new(usage_type: UsageType, template: &str, node: &NodeRef) -> Usage {
        Usage {
            usage_type,
            template: template.to_string(),
            node: node.clone(),
        }
    }

    /// The AST node where the usage occurred. Combined with the template
    /// name and the registry this identifies a source location.
    pub fn node(&self) -> &NodeRef {
        &self.node
    }
}

/// Key of a child within a Param node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ParamKey {
    /// A literal field name.
    Field(String),
    /// All numeric/list-index accesses collapse onto this one symbolic
    /// child; list shape is not modeled per index.
    Element,
    /// A dynamic access whose key could not be resolved statically.
    Wildcard,
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParamKey::Field(name) => f.write_str(name),
            ParamKey::Element => f.write_str("[]"),
            ParamKey::Wildcard => f.write_str("[?]"),
        }
    }
}

/// A compile-time literal attached to a constant Param.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Constant {
    Str(String),
    Int(i64),
    /// A literal map; its entries are constant child Params.
    Map,
}

impl Constant {
    /// The literal rendered as a map key.
    pub(crate) fn key_string(&self) -> Option<String> {
        match self {
            Constant::Str(s) => Some(s.clone()),
            Constant::Int(i) => Some(i.to_string()),
            Constant::Map => None,
        }
    }
}

/// Index of a Param node within its owning [`Params`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParamId(u32);

#[derive(Debug, Default)]
struct ParamNode {
    children: BTreeMap<ParamKey, ParamId>,
    usages: Vec<Usage>,
    constant: Option<Constant>,
}

/// The usage tree produced by one analysis run.
///
/// Mutable only inside the analyzer; callers traverse it through ids.
#[derive(Debug)]
pub struct Params {
    nodes: Vec<ParamNode>,
    root: ParamId,
}

impl Params {
    pub(crate) fn new() -> Params {
        Params {
            nodes: vec![ParamNode::default()],
            root: ParamId(0),
        }
    }

    /// The node whose `Field` children are the entry template's declared
    /// parameters.
    pub fn root(&self) -> ParamId {
        self.root
    }

    /// Declared top-level parameter names with recorded state.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.node(self.root).children.keys().filter_map(|k| match k {
            ParamKey::Field(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Look up a top-level parameter by name.
    pub fn param(&self, name: &str) -> Option<ParamId> {
        self.child(self.root, &ParamKey::Field(name.to_string()))
    }

    pub fn child(&self, id: ParamId, key: &ParamKey) -> Option<ParamId> {
        self.node(id).children.get(key).copied()
    }

    pub fn children(&self, id: ParamId) -> impl Iterator<Item = (&ParamKey, ParamId)> {
        self.node(id).children.iter().map(|(k, v)| (k, *v))
    }

    pub fn usages(&self, id: ParamId) -> &[Usage] {
        &self.node(id).usages
    }

    pub fn constant(&self, id: ParamId) -> Option<&Constant> {
        self.node(id).constant.as_ref()
    }

    pub fn is_constant(&self, id: ParamId) -> bool {
        self.node(id).constant.is_some()
    }

    /// True when any usage on this node forces verbatim retention of the
    /// whole subtree during extraction.
    pub fn has_full_usage(&self, id: ParamId) -> bool {
        self.node(id)
            .usages
            .iter()
            .any(|u| matches!(u.usage_type, UsageType::Full | UsageType::Unknown))
    }

    fn node(&self, id: ParamId) -> &ParamNode {
        &self.nodes[id.0 as usize]
    }

    fn node_mut(&mut self, id: ParamId) -> &mut ParamNode {
        &mut self.nodes[id.0 as usize]
    }

    /// Allocate a detached node, e.g. the parameter frame of a call that
    /// forwards no caller data.
    pub(crate) fn alloc(&mut self) -> ParamId {
        let id = ParamId(self.nodes.len() as u32);
        self.nodes.push(ParamNode::default());
        id
    }

    pub(crate) fn alloc_constant(&mut self, constant: Constant) -> ParamId {
        let id = self.alloc();
        self.node_mut(id).constant = Some(constant);
        id
    }

    /// Child lookup, creating the node on first access so repeated accesses
    /// accumulate onto one node.
    pub(crate) fn child_or_create(&mut self, id: ParamId, key: ParamKey) -> ParamId {
        if let Some(child) = self.node(id).children.get(&key) {
            return *child;
        }
        let child = self.alloc();
        self.node_mut(id).children.insert(key, child);
        child
    }

    pub(crate) fn insert_child(&mut self, id: ParamId, key: ParamKey, child: ParamId) {
        self.node_mut(id).children.insert(key, child);
    }

    /// Record a usage, ignoring an identical `{type, template, node}`
    /// triple already present on the node.
    pub(crate) fn record(&mut self, id: ParamId, usage: Usage) {
        let node = self.node_mut(id);
        if node.constant.is_some() {
            return;
        }
        let duplicate = node.usages.iter().any(|u| {
            u.usage_type == usage.usage_type
                && u.template == usage.template
                && u.node == usage.node
        });
        if !duplicate {
            node.usages.push(usage);
        }
    }

    /// Push a usage onto every currently-childless Param beneath `id`.
    /// Non-leaf nodes recurse into children instead of recording; constant
    /// nodes are skipped entirely. Used to blanket-mark an unresolved
    /// subtree at a recursion cutoff.
    pub(crate) fn add_usage_to_leaves(&mut self, id: ParamId, usage: &Usage) {
        if self.node(id).constant.is_some() {
            return;
        }
        let children: Vec<ParamId> = self.node(id).children.values().copied().collect();
        if children.is_empty() {
            self.record(id, usage.clone());
            return;
        }
        for child in children {
            self.add_usage_to_leaves(child, usage);
        }
    }

    /// Keep only the declared entry-template parameters at the root,
    /// discarding state recorded for undeclared names.
    pub(crate) fn retain_declared(&mut self, declared: &[String]) {
        let root = self.root;
        self.node_mut(root).children.retain(|key, _| match key {
            ParamKey::Field(name) => declared.iter().any(|d| d == name),
            _ => false,
        });
    }
}
