// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::BTreeMap;

use crate::usage::{ParamId, ParamKey, Params, UsageType};
use crate::value::Value;

/// Project `value` down to the parts the usage analysis marked as needed.
///
/// Keys absent from the input are never fabricated; inputs that are not
/// object-shaped where an object was expected pass through unchanged. This
/// function never fails: projection of mismatched data degrades to keeping
/// the value.
pub fn extract(value: &Value, params: &Params) -> Value {
    extract_fields(value, params, params.root())
}

fn extract_fields(value: &Value, params: &Params, id: ParamId) -> Value {
    let Some(fields) = value.as_object() else {
        return value.clone();
    };
    let wildcard = params.child(id, &ParamKey::Wildcard);
    let mut out = BTreeMap::new();
    for (key, field_value) in fields.iter() {
        // explicit fields win; a wildcard covers the rest; anything else
        // was never referenced and is dropped
        let child = params
            .child(id, &ParamKey::Field(key.clone()))
            .or(wildcard);
        if let Some(child) = child {
            out.insert(key.clone(), extract_param(field_value, params, child));
        }
    }
    Value::from(out)
}

fn extract_param(value: &Value, params: &Params, id: ParamId) -> Value {
    // Full or Unknown usage anywhere on this node retains the subtree
    // verbatim, including structure the tree never modeled. Recursion
    // cutoffs blanket-mark leaves with Full, so truncated analyses land
    // here as well.
    if params.has_full_usage(id) {
        return value.clone();
    }

    // Lists project element-wise through the symbolic element child. A
    // list consumed without element accesses falls back to the node
    // itself, which also covers map-style access to list-shaped data.
    if let Some(items) = value.as_array() {
        let element = params.child(id, &ParamKey::Element).unwrap_or(id);
        return Value::from(
            items
                .iter()
                .map(|item| extract_param(item, params, element))
                .collect::<Vec<_>>(),
        );
    }

    // A leaf probed only for truthiness keeps its key but not its
    // content: non-empty values collapse to an empty placeholder.
    let usages = params.usages(id);
    let is_leaf = params.children(id).next().is_none();
    if is_leaf
        && usages
            .iter()
            .any(|u| u.usage_type == UsageType::Exists)
        && usages
            .iter()
            .all(|u| matches!(u.usage_type, UsageType::Exists | UsageType::Reference))
    {
        return if value.is_truthy() {
            Value::from("")
        } else {
            value.clone()
        };
    }

    extract_fields(value, params, id)
}
