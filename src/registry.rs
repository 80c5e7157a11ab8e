// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::BTreeMap;

use crate::ast::NodeRef;

/// A compiled template as produced by the external template compiler: its
/// body AST, the formal parameters its doc block declares, and the source
/// file it came from.
#[derive(Debug)]
pub struct CompiledTemplate {
    pub name: String,
    pub file: String,
    pub params: Vec<String>,
    pub body: NodeRef,
}

impl CompiledTemplate {
    pub fn new(name: &str, file: &str, params: &[&str], body: NodeRef) -> CompiledTemplate {
        CompiledTemplate {
            name: name.to_string(),
            file: file.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            body,
        }
    }
}

/// All templates visible to one analysis, keyed by fully qualified name.
#[derive(Debug, Default)]
pub struct Registry {
    templates: BTreeMap<String, CompiledTemplate>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    /// Register a compiled template, replacing any previous template of the
    /// same name.
    pub fn add_template(&mut self, template: CompiledTemplate) {
        self.templates.insert(template.name.clone(), template);
    }

    pub fn template(&self, name: &str) -> Option<&CompiledTemplate> {
        self.templates.get(name)
    }

    /// Source file of a template, if registered.
    pub fn filename(&self, template: &str) -> Option<&str> {
        self.templates.get(template).map(|t| t.file.as_str())
    }

    /// Diagnostic position of a node: `(filename, line, column)`.
    pub fn position(&self, template: &str, node: &NodeRef) -> Option<(&str, u32, u32)> {
        let file = self.filename(template)?;
        let pos = node.pos();
        Some((file, pos.line, pos.col))
    }
}
