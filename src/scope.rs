// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::BTreeMap;

use crate::usage::ParamId;

/// The analysis position within one template-call frame.
///
/// `parameters` designates the tree node whose children form the frame's
/// parameter namespace; every scope within one frame shares it, so usages
/// recorded deep in a subtree stay visible to the frame. `variables` is
/// copied on each descent: bindings introduced in an inner block never
/// escape back up.
#[derive(Debug)]
pub(crate) struct Scope {
    pub template_name: String,
    /// Ancestor template names, outermost first. Compared by value; cycles
    /// in the call graph show up as repeated names.
    pub call_stack: Vec<String>,
    pub parameters: ParamId,
    pub variables: BTreeMap<String, Vec<ParamId>>,
}

impl Scope {
    pub fn root(template_name: &str, parameters: ParamId) -> Scope {
        Scope {
            template_name: template_name.to_string(),
            call_stack: vec![],
            parameters,
            variables: BTreeMap::new(),
        }
    }

    /// A scope "inside" the current one: same frame, snapshot of the
    /// current bindings.
    pub fn inner(&self) -> Scope {
        Scope {
            template_name: self.template_name.clone(),
            call_stack: self.call_stack.clone(),
            parameters: self.parameters,
            variables: self.variables.clone(),
        }
    }

    /// The child scope for a call into `callee`: fresh bindings, this
    /// frame pushed onto the ancestry.
    pub fn call(&self, callee: &str, parameters: ParamId) -> Scope {
        let mut call_stack = self.call_stack.clone();
        call_stack.push(self.template_name.clone());
        Scope {
            template_name: callee.to_string(),
            call_stack,
            parameters,
            variables: BTreeMap::new(),
        }
    }

    /// How many times this scope's own template already appears in its
    /// ancestry.
    pub fn cycle_count(&self) -> usize {
        self.call_stack
            .iter()
            .filter(|name| **name == self.template_name)
            .count()
    }
}
