// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(dead_code)]

use tplusage::ast::NodeRef;
use tplusage::{
    analyze_template, AnalyzeConfig, CompiledTemplate, ParamId, Params, Registry, UsageType,
};

pub fn registry<const N: usize>(templates: [(&str, &[&str], NodeRef); N]) -> Registry {
    let mut registry = Registry::new();
    for (name, params, body) in templates {
        registry.add_template(CompiledTemplate::new(name, "test.tpl", params, body));
    }
    registry
}

pub fn analyze(registry: &Registry, name: &str) -> anyhow::Result<Params> {
    Ok(analyze_template(name, registry, &AnalyzeConfig::default())?)
}

pub fn analyze_with_depth(
    registry: &Registry,
    name: &str,
    recursion_depth: usize,
) -> anyhow::Result<Params> {
    Ok(analyze_template(
        name,
        registry,
        &AnalyzeConfig { recursion_depth },
    )?)
}

/// Render the usage tree in a compact comparable form: `"?"` unknown,
/// `"*"` full, `"m"` meta (leaves only), `"e"` exists (leaves only), and a
/// nested object for nodes whose own usage carries no extraction weight.
/// The strongest applicable marker wins and hides weaker ones.
pub fn shape(params: &Params) -> serde_json::Value {
    let mut out = serde_json::Map::new();
    for name in params.names() {
        let id = params.param(name).unwrap();
        out.insert(name.to_string(), shape_node(params, id));
    }
    serde_json::Value::Object(out)
}

fn shape_node(params: &Params, id: ParamId) -> serde_json::Value {
    let children: serde_json::Map<String, serde_json::Value> = params
        .children(id)
        .map(|(key, child)| (key.to_string(), shape_node(params, child)))
        .collect();
    let is_leaf = children.is_empty();

    let mut marker: Option<(UsageType, &str)> = None;
    for usage in params.usages(id) {
        let rendered = match usage.usage_type {
            UsageType::Unknown => Some("?"),
            UsageType::Full => Some("*"),
            UsageType::Meta if is_leaf => Some("m"),
            UsageType::Exists if is_leaf => Some("e"),
            _ => None,
        };
        if let Some(rendered) = rendered {
            if marker.is_none() || usage.usage_type > marker.unwrap().0 {
                marker = Some((usage.usage_type, rendered));
            }
        }
    }

    match marker {
        Some((_, rendered)) => serde_json::Value::String(rendered.to_string()),
        None => serde_json::Value::Object(children),
    }
}
