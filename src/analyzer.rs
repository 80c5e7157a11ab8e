// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::{Access, Node, NodeRef};
use crate::builtins::{self, BuiltinClass};
use crate::error::{Error, Location, Result};
use crate::registry::Registry;
use crate::scope::Scope;
use crate::usage::{Constant, ParamId, ParamKey, Params, Usage, UsageType};

/// Analysis options.
#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    /// Maximum number of times a template may reappear in its own call
    /// ancestry before the analysis stops descending and conservatively
    /// marks everything reachable as fully used.
    pub recursion_depth: usize,
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self { recursion_depth: 2 }
    }
}

/// Analyze the usage of parameters within the named template and every
/// template it transitively calls.
///
/// The returned tree contains one entry per parameter the entry template
/// declares; fields discovered for undeclared names are filtered out.
pub fn analyze_template(
    name: &str,
    registry: &Registry,
    config: &AnalyzeConfig,
) -> Result<Params> {
    let template = registry
        .template(name)
        .ok_or_else(|| Error::TemplateNotFound(name.to_string()))?;
    let body = template.body.clone();
    let declared = template.params.clone();

    let mut analyzer = Analyzer {
        registry,
        config,
        params: Params::new(),
    };
    let mut scope = Scope::root(name, analyzer.params.root());
    analyzer.analyze_node(&mut scope, None, &body)?;
    analyzer.params.retain_declared(&declared);
    Ok(analyzer.params)
}

pub(crate) struct Analyzer<'a> {
    pub(crate) registry: &'a Registry,
    pub(crate) config: &'a AnalyzeConfig,
    pub(crate) params: Params,
}

impl Analyzer<'_> {
    pub(crate) fn location(&self, scope: &Scope, node: &NodeRef) -> Location {
        let file = self
            .registry
            .filename(&scope.template_name)
            .unwrap_or_default()
            .to_string();
        let pos = node.pos();
        Location {
            template: scope.template_name.clone(),
            file,
            line: pos.line,
            col: pos.col,
        }
    }

    /// A condition consumes its expression whole, except a bare data
    /// reference, where only truthiness matters.
    fn condition_usage(cond: &NodeRef) -> UsageType {
        match cond.as_ref() {
            Node::DataRef { .. } => UsageType::Exists,
            _ => UsageType::Full,
        }
    }

    /// Analyze `node` in a fresh inner scope so bindings made inside it do
    /// not escape.
    pub(crate) fn analyze_inner(
        &mut self,
        scope: &Scope,
        usage: Option<UsageType>,
        node: &NodeRef,
    ) -> Result<()> {
        let mut cs = scope.inner();
        self.analyze_node(&mut cs, usage, node)
    }

    pub(crate) fn analyze_node(
        &mut self,
        scope: &mut Scope,
        usage: Option<UsageType>,
        node: &NodeRef,
    ) -> Result<()> {
        match node.as_ref() {
            Node::Text { .. }
            | Node::Str { .. }
            | Node::Int { .. }
            | Node::Float { .. }
            | Node::Bool { .. }
            | Node::Null { .. } => Ok(()),

            Node::Global { .. } => {
                Err(Error::UnsupportedNode(node.kind()).at(self.location(scope, node)))
            }

            Node::DataRef { .. } => {
                self.record_data_ref(scope, usage, node)?;
                Ok(())
            }

            Node::Not { arg, .. } | Node::Neg { arg, .. } => {
                self.analyze_inner(scope, Some(UsageType::Full), arg)
            }

            Node::Binary { lhs, rhs, .. } => {
                self.analyze_inner(scope, Some(UsageType::Full), lhs)?;
                self.analyze_inner(scope, Some(UsageType::Full), rhs)
            }

            Node::Elvis { lhs, rhs, .. } => {
                self.analyze_inner(scope, usage, lhs)?;
                self.analyze_inner(scope, usage, rhs)
            }

            Node::Ternary {
                cond,
                then,
                otherwise,
                ..
            } => {
                self.analyze_inner(scope, Some(Self::condition_usage(cond)), cond)?;
                self.analyze_inner(scope, usage, then)?;
                self.analyze_inner(scope, usage, otherwise)
            }

            Node::List { items, .. } => {
                for item in items {
                    self.analyze_inner(scope, usage, item)?;
                }
                Ok(())
            }

            Node::Map { entries, .. } => {
                for (_, value) in entries {
                    self.analyze_inner(scope, usage, value)?;
                }
                Ok(())
            }

            Node::FunctionCall { name, args, .. } => {
                let arg_usage = match builtins::lookup(name) {
                    Some(BuiltinClass::Meta) => Some(UsageType::Meta),
                    Some(BuiltinClass::Consumes) => Some(UsageType::Full),
                    Some(BuiltinClass::Passthrough) => usage,
                    None => Some(UsageType::Unknown),
                };
                for arg in args {
                    self.analyze_inner(scope, arg_usage, arg)?;
                }
                Ok(())
            }

            // Transparent containers: recurse into structural children in
            // one shared block scope so sequential bindings stay visible
            // to later siblings.
            Node::Block { .. } | Node::Msg { .. } | Node::Placeholder { .. } => {
                let mut cs = scope.inner();
                for child in node.children() {
                    self.analyze_node(&mut cs, usage, &child)?;
                }
                Ok(())
            }

            Node::If { arms, .. } => {
                for arm in arms {
                    if let Some(cond) = &arm.cond {
                        self.analyze_inner(scope, Some(Self::condition_usage(cond)), cond)?;
                    }
                    self.analyze_inner(scope, usage, &arm.body)?;
                }
                Ok(())
            }

            Node::Switch {
                value,
                cases,
                default,
                ..
            } => {
                self.analyze_inner(scope, Some(Self::condition_usage(value)), value)?;
                for case in cases {
                    for candidate in &case.values {
                        self.analyze_inner(scope, Some(UsageType::Full), candidate)?;
                    }
                    self.analyze_inner(scope, usage, &case.body)?;
                }
                if let Some(default) = default {
                    self.analyze_inner(scope, usage, default)?;
                }
                Ok(())
            }

            Node::For {
                var,
                collection,
                body,
                if_empty,
                ..
            } => {
                let candidates = self.bind_candidates(scope, collection)?;
                let mut bound = Vec::new();
                for id in candidates {
                    let target = if self.params.is_constant(id) {
                        id
                    } else {
                        self.params.child_or_create(id, ParamKey::Element)
                    };
                    if !bound.contains(&target) {
                        bound.push(target);
                    }
                }
                let mut loop_scope = scope.inner();
                loop_scope.variables.insert(var.clone(), bound);
                self.analyze_node(&mut loop_scope, usage, body)?;
                if let Some(if_empty) = if_empty {
                    self.analyze_inner(scope, usage, if_empty)?;
                }
                Ok(())
            }

            Node::LetValue { name, value, .. } => {
                let candidates = self.bind_candidates(scope, value)?;
                // overwrite, never accumulate: lexical shadowing
                scope.variables.insert(name.clone(), candidates);
                Ok(())
            }

            Node::LetContent { name, body, .. } => {
                self.analyze_inner(scope, Some(UsageType::Full), body)?;
                let constants = self.constant_params(scope, body)?;
                scope.variables.insert(name.clone(), constants);
                Ok(())
            }

            Node::Print {
                arg, directives, ..
            } => {
                self.analyze_inner(scope, Some(UsageType::Full), arg)?;
                for directive in directives {
                    for arg in &directive.args {
                        self.analyze_inner(scope, Some(UsageType::Unknown), arg)?;
                    }
                }
                Ok(())
            }

            Node::Call { .. } => self.analyze_call(scope, node),

            Node::Plural {
                value,
                cases,
                default,
                ..
            } => {
                self.analyze_inner(scope, Some(UsageType::Full), value)?;
                for case in cases {
                    self.analyze_inner(scope, usage, &case.body)?;
                }
                if let Some(default) = default {
                    self.analyze_inner(scope, usage, default)?;
                }
                Ok(())
            }
        }
    }

    /// Resolve a data reference, creating Param nodes along its access
    /// chain, and record one usage of the ambient type on every leaf
    /// reached. Constant candidates are skipped: literals bound to
    /// variables are not runtime data.
    pub(crate) fn record_data_ref(
        &mut self,
        scope: &Scope,
        usage: Option<UsageType>,
        node: &NodeRef,
    ) -> Result<Vec<ParamId>> {
        let Node::DataRef { key, access, .. } = node.as_ref() else {
            return Err(
                Error::InvariantViolation("expected a data reference".to_string())
                    .at(self.location(scope, node)),
            );
        };
        let Some(usage_type) = usage else {
            return Err(Error::InvariantViolation(format!(
                "no usage context at reference to ${key}"
            ))
            .at(self.location(scope, node)));
        };

        let candidates = self.find_params(scope, key);
        let mut out = Vec::new();
        for id in candidates {
            if self.params.is_constant(id) {
                continue;
            }
            let leaves = self.resolve_access(scope, id, access)?;
            for leaf in &leaves {
                self.params
                    .record(*leaf, Usage::new(usage_type, &scope.template_name, node));
            }
            out.extend(leaves);
        }
        Ok(out)
    }

    /// Candidate Params for a name: local bindings shadow frame
    /// parameters; an unseen parameter is created on first access.
    fn find_params(&mut self, scope: &Scope, name: &str) -> Vec<ParamId> {
        if let Some(candidates) = scope.variables.get(name) {
            return candidates.clone();
        }
        vec![self
            .params
            .child_or_create(scope.parameters, ParamKey::Field(name.to_string()))]
    }

    fn resolve_access(
        &mut self,
        scope: &Scope,
        id: ParamId,
        access: &[Access],
    ) -> Result<Vec<ParamId>> {
        let Some((head, rest)) = access.split_first() else {
            return Ok(vec![id]);
        };

        let mut next = Vec::new();
        match head {
            Access::Key(key) => {
                next.push(self.params.child_or_create(id, ParamKey::Field(key.clone())));
            }
            Access::Index(_) => {
                next.push(self.params.child_or_create(id, ParamKey::Element));
            }
            Access::Expr(expr) => {
                let folded = self.constant_values(scope, expr)?;
                // computing the key consumes the key expression whole
                self.analyze_inner(scope, Some(UsageType::Full), expr)?;
                if folded.is_empty() {
                    next.push(self.params.child_or_create(id, ParamKey::Wildcard));
                } else {
                    for constant in folded {
                        let key = match constant {
                            Constant::Str(s) => ParamKey::Field(s),
                            Constant::Int(_) => ParamKey::Element,
                            Constant::Map => continue,
                        };
                        let child = self.params.child_or_create(id, key);
                        if !next.contains(&child) {
                            next.push(child);
                        }
                    }
                }
            }
        }

        let mut out = Vec::new();
        for id in next {
            out.extend(self.resolve_access(scope, id, rest)?);
        }
        Ok(out)
    }

    /// Candidates for a binding-position expression: reference-resolved
    /// Params plus any constants the folder can materialize.
    pub(crate) fn bind_candidates(&mut self, scope: &Scope, node: &NodeRef) -> Result<Vec<ParamId>> {
        let mut out = self.extract_variables(scope, node)?;
        out.extend(self.constant_params(scope, node)?);
        Ok(out)
    }

    /// Resolve the runtime Params an expression may alias. Conditional
    /// expressions contribute candidates from every branch; anything else
    /// is analyzed as a full consumption since its parts flow into a
    /// computed value.
    pub(crate) fn extract_variables(
        &mut self,
        scope: &Scope,
        node: &NodeRef,
    ) -> Result<Vec<ParamId>> {
        match node.as_ref() {
            Node::DataRef { .. } => {
                self.record_data_ref(scope, Some(UsageType::Reference), node)
            }
            Node::Elvis { lhs, rhs, .. } => {
                let mut out = self.extract_variables(scope, lhs)?;
                out.extend(self.extract_variables(scope, rhs)?);
                Ok(out)
            }
            Node::Ternary {
                cond,
                then,
                otherwise,
                ..
            } => {
                self.analyze_inner(scope, Some(Self::condition_usage(cond)), cond)?;
                let mut out = self.extract_variables(scope, then)?;
                out.extend(self.extract_variables(scope, otherwise)?);
                Ok(out)
            }
            Node::FunctionCall { name, args, .. }
                if builtins::lookup(name) == Some(BuiltinClass::Passthrough) =>
            {
                let mut out = Vec::new();
                for arg in args {
                    out.extend(self.extract_variables(scope, arg)?);
                }
                Ok(out)
            }
            Node::Text { .. }
            | Node::Str { .. }
            | Node::Int { .. }
            | Node::Float { .. }
            | Node::Bool { .. }
            | Node::Null { .. } => Ok(vec![]),
            _ => {
                self.analyze_inner(scope, Some(UsageType::Full), node)?;
                Ok(vec![])
            }
        }
    }
}
