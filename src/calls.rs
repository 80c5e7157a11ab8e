// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Template-call analysis: parameter binding, data forwarding, and the
//! recursion cutoff that keeps cyclic call graphs terminating.

use crate::analyzer::Analyzer;
use crate::ast::{CallData, CallParam, Node, NodeRef};
use crate::error::{Error, Result};
use crate::scope::Scope;
use crate::usage::{ParamId, Usage, UsageType};

impl Analyzer<'_> {
    pub(crate) fn analyze_call(&mut self, scope: &Scope, node: &NodeRef) -> Result<()> {
        let Node::Call {
            template,
            data,
            params,
            ..
        } = node.as_ref()
        else {
            return Err(
                Error::InvariantViolation("expected a call node".to_string())
                    .at(self.location(scope, node)),
            );
        };

        let registry = self.registry;
        let Some(callee) = registry.template(template) else {
            return Err(Error::TemplateNotFound(template.clone()).at(self.location(scope, node)));
        };
        let body = callee.body.clone();
        let declared = callee.params.clone();

        if scope.call(template, scope.parameters).cycle_count() > self.config.recursion_depth {
            return self.analyze_recursive_call(scope, node, data, params);
        }

        // Explicit parameters become callee-scope variables, resolved once
        // against the caller. Variable lookup precedes frame-parameter
        // lookup, so explicit parameters shadow anything a data forward
        // supplies under the same name.
        let bindings = self.resolve_call_params(scope, params)?;

        // One callee walk per parameter source. A plain call gets a fresh
        // detached frame; data="all" shares the caller's frame node;
        // data="$expr" additionally walks once per resolved candidate with
        // that candidate as the callee frame, so the callee's reads chain
        // onto the caller's paths.
        let mut frames: Vec<ParamId> = Vec::new();
        match data {
            CallData::None => frames.push(self.params.alloc()),
            CallData::All => frames.push(scope.parameters),
            CallData::Expr(expr) => {
                frames.push(self.params.alloc());
                for id in self.extract_variables(scope, expr)? {
                    if !self.params.is_constant(id) && !frames.contains(&id) {
                        frames.push(id);
                    }
                }
            }
        }

        for frame in frames {
            let mut callee_scope = scope.call(template, frame);
            // data="all" also forwards caller variables that match a
            // declared callee formal, unless set explicitly
            if matches!(data, CallData::All) {
                for (name, candidates) in &scope.variables {
                    if declared.contains(name) && !bindings.iter().any(|(key, _)| key == name) {
                        callee_scope
                            .variables
                            .insert(name.clone(), candidates.clone());
                    }
                }
            }
            for (key, candidates) in &bindings {
                callee_scope
                    .variables
                    .entry(key.clone())
                    .or_default()
                    .extend(candidates.iter().copied());
            }
            self.analyze_node(&mut callee_scope, None, &body)
                .map_err(|e| e.at(self.location(scope, node)))?;
        }
        Ok(())
    }

    fn resolve_call_params(
        &mut self,
        scope: &Scope,
        params: &[CallParam],
    ) -> Result<Vec<(String, Vec<ParamId>)>> {
        let mut bindings = Vec::new();
        for param in params {
            match param {
                CallParam::Content { key, body, .. } => {
                    self.analyze_inner(scope, Some(UsageType::Full), body)?;
                    // a literal content block may later serve as a map key
                    bindings.push((key.clone(), self.constant_params(scope, body)?));
                }
                CallParam::Value { key, value, .. } => {
                    bindings.push((key.clone(), self.bind_candidates(scope, value)?));
                }
            }
        }
        Ok(bindings)
    }

    /// The cutoff for unbounded recursion. Call-site arguments are still
    /// resolved so their paths exist, then every Param reachable from the
    /// caller's parameters and variables is marked fully used; truncation
    /// must never drop a possible usage.
    fn analyze_recursive_call(
        &mut self,
        scope: &Scope,
        node: &NodeRef,
        data: &CallData,
        params: &[CallParam],
    ) -> Result<()> {
        // The forwarded subtree must still be childless when the blanket
        // lands, so the whole unresolved remainder is retained wholesale.
        if let CallData::Expr(expr) = data {
            self.extract_variables(scope, expr)?;
        }

        let usage = Usage::new(UsageType::Full, &scope.template_name, node);
        self.params.add_usage_to_leaves(scope.parameters, &usage);
        let bound: Vec<ParamId> = scope.variables.values().flatten().copied().collect();
        for id in bound {
            self.params.add_usage_to_leaves(id, &usage);
        }

        // Explicit parameters resolve after the blanket; the paths they
        // create sit under already-marked nodes.
        for param in params {
            match param {
                CallParam::Content { body, .. } => {
                    self.analyze_inner(scope, Some(UsageType::Full), body)?;
                }
                CallParam::Value { value, .. } => {
                    self.bind_candidates(scope, value)?;
                }
            }
        }
        Ok(())
    }
}
