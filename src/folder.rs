// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Constant folding, scoped to what dynamic map-key resolution needs.
//! This is not a general optimizer: anything it cannot fold yields an
//! empty candidate set, and the caller falls back to wildcard handling.

use crate::analyzer::Analyzer;
use crate::ast::{Access, BinaryOp, Node, NodeRef};
use crate::error::Result;
use crate::scope::Scope;
use crate::usage::{Constant, ParamId, ParamKey};

/// Ranges longer than this degrade to wildcard handling.
const MAX_RANGE: i64 = 1000;

impl Analyzer<'_> {
    /// Statically evaluate an expression to a finite set of literal
    /// values. Empty means "not foldable".
    pub(crate) fn constant_values(&self, scope: &Scope, node: &NodeRef) -> Result<Vec<Constant>> {
        Ok(match node.as_ref() {
            Node::Str { value, .. } => vec![Constant::Str(value.clone())],
            Node::Int { value, .. } => vec![Constant::Int(*value)],

            // Concatenation folds when both sides fold and at least one
            // side is a string; candidates combine as a cross product.
            Node::Binary {
                op: BinaryOp::Add,
                lhs,
                rhs,
                ..
            } => {
                let lhs = self.constant_values(scope, lhs)?;
                let rhs = self.constant_values(scope, rhs)?;
                if lhs.is_empty() || rhs.is_empty() {
                    return Ok(vec![]);
                }
                if !lhs
                    .iter()
                    .chain(rhs.iter())
                    .any(|c| matches!(c, Constant::Str(_)))
                {
                    return Ok(vec![]);
                }
                let mut out = Vec::new();
                for a in &lhs {
                    for b in &rhs {
                        let (Some(a), Some(b)) = (a.key_string(), b.key_string()) else {
                            continue;
                        };
                        let joined = Constant::Str(a + &b);
                        if !out.contains(&joined) {
                            out.push(joined);
                        }
                    }
                }
                out
            }

            Node::FunctionCall { name, args, .. } if name == "range" => {
                self.fold_range(scope, args)?
            }

            Node::FunctionCall { name, args, .. } if name == "keys" => {
                match args.first().map(|a| a.as_ref()) {
                    Some(Node::Map { entries, .. }) => entries
                        .iter()
                        .map(|(k, _)| Constant::Str(k.clone()))
                        .collect(),
                    _ => vec![],
                }
            }

            // A reference that resolved to constant-marked Params
            // propagates their literals.
            Node::DataRef { key, access, .. } => {
                let mut out = Vec::new();
                for id in self.constant_refs(scope, key, access) {
                    if let Some(constant) = self.params.constant(id) {
                        if constant.key_string().is_some() && !out.contains(constant) {
                            out.push(constant.clone());
                        }
                    }
                }
                out
            }

            _ => vec![],
        })
    }

    fn fold_range(&self, scope: &Scope, args: &[NodeRef]) -> Result<Vec<Constant>> {
        let mut bounds = Vec::new();
        for arg in args {
            match self.constant_values(scope, arg)?.as_slice() {
                [Constant::Int(i)] => bounds.push(*i),
                _ => return Ok(vec![]),
            }
        }
        let (start, end, step) = match bounds[..] {
            [end] => (0, end, 1),
            [start, end] => (start, end, 1),
            [start, end, step] if step > 0 => (start, end, step),
            _ => return Ok(vec![]),
        };
        if end.saturating_sub(start) > MAX_RANGE.saturating_mul(step) {
            return Ok(vec![]);
        }
        let mut out = Vec::new();
        let mut i = start;
        while i < end {
            out.push(Constant::Int(i));
            i += step;
        }
        Ok(out)
    }

    /// Resolve a reference against constant bindings only. Never creates
    /// nodes; frame parameters are runtime data and never constant, so
    /// only variables are consulted.
    fn constant_refs(&self, scope: &Scope, key: &str, access: &[Access]) -> Vec<ParamId> {
        let Some(candidates) = scope.variables.get(key) else {
            return vec![];
        };
        let mut current: Vec<ParamId> = candidates
            .iter()
            .copied()
            .filter(|id| self.params.is_constant(*id))
            .collect();
        for step in access {
            let key = match step {
                Access::Key(k) => ParamKey::Field(k.clone()),
                // only named fields occur under literal maps
                _ => return vec![],
            };
            current = current
                .iter()
                .filter_map(|id| self.params.child(*id, &key))
                .filter(|id| self.params.is_constant(*id))
                .collect();
        }
        current
    }

    /// Materialize constant Params from a binding-position expression:
    /// list literals contribute one candidate per element, map literals a
    /// constant node with constant children, and content blocks their
    /// statically known text. Empty means "nothing statically known".
    pub(crate) fn constant_params(&mut self, scope: &Scope, node: &NodeRef) -> Result<Vec<ParamId>> {
        Ok(match node.as_ref() {
            Node::List { items, .. } => {
                let mut out = Vec::new();
                for item in items {
                    out.extend(self.constant_params(scope, item)?);
                }
                out
            }

            Node::Map { entries, .. } => {
                let map_id = self.params.alloc_constant(Constant::Map);
                for (key, value) in entries {
                    // an entry folds only when its value resolves to a
                    // single candidate
                    if let [child] = self.constant_params(scope, value)?[..] {
                        self.params
                            .insert_child(map_id, ParamKey::Field(key.clone()), child);
                    }
                }
                vec![map_id]
            }

            Node::Text { text, .. } => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    vec![]
                } else {
                    vec![self
                        .params
                        .alloc_constant(Constant::Str(trimmed.to_string()))]
                }
            }

            Node::Block { nodes, .. } => self.fold_content_sequence(scope, nodes)?,

            Node::Msg { body, .. } | Node::Placeholder { body, .. } => {
                self.constant_params(scope, body)?
            }

            // Branches contribute independent candidates.
            Node::If { arms, .. } => {
                let mut out = Vec::new();
                for arm in arms {
                    out.extend(self.constant_params(scope, &arm.body)?);
                }
                out
            }

            Node::Switch { cases, default, .. } => {
                let mut out = Vec::new();
                for case in cases {
                    out.extend(self.constant_params(scope, &case.body)?);
                }
                if let Some(default) = default {
                    out.extend(self.constant_params(scope, default)?);
                }
                out
            }

            // A bare print folds to whatever its expression folds to;
            // directives transform output and defeat folding.
            Node::Print {
                arg, directives, ..
            } => {
                if directives.is_empty() {
                    self.constant_params(scope, arg)?
                } else {
                    vec![]
                }
            }

            // Aliases share the constant nodes they refer to, keeping map
            // constants and their children intact.
            Node::DataRef { key, access, .. } => self.constant_refs(scope, key, access),

            _ => {
                let mut out = Vec::new();
                for constant in self.constant_values(scope, node)? {
                    out.push(self.params.alloc_constant(constant));
                }
                out
            }
        })
    }

    /// Fold a sequence of content nodes. Whitespace-only text is ignored;
    /// one substantive part passes through; several substantive parts
    /// concatenate as a cross product of their scalar candidates. Any
    /// unfoldable part poisons the whole sequence.
    fn fold_content_sequence(&mut self, scope: &Scope, nodes: &[NodeRef]) -> Result<Vec<ParamId>> {
        let mut sets: Vec<Vec<ParamId>> = Vec::new();
        for node in nodes {
            if let Node::Text { text, .. } = node.as_ref() {
                if text.trim().is_empty() {
                    continue;
                }
            }
            let set = self.constant_params(scope, node)?;
            if set.is_empty() {
                return Ok(vec![]);
            }
            sets.push(set);
        }

        match sets.len() {
            0 => Ok(vec![]),
            1 => Ok(sets.remove(0)),
            _ => {
                let mut combined = vec![String::new()];
                for set in &sets {
                    let mut parts = Vec::new();
                    for id in set {
                        match self.params.constant(*id).and_then(|c| c.key_string()) {
                            Some(s) => parts.push(s),
                            None => return Ok(vec![]),
                        }
                    }
                    let mut next = Vec::new();
                    for prefix in &combined {
                        for part in &parts {
                            let joined = format!("{prefix}{part}");
                            if !next.contains(&joined) {
                                next.push(joined);
                            }
                        }
                    }
                    combined = next;
                }
                Ok(combined
                    .into_iter()
                    .map(|s| self.params.alloc_constant(Constant::Str(s)))
                    .collect())
            }
        }
    }
}
