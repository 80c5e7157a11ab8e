// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Projection of concrete data through an analyzed usage tree.

mod common;

use anyhow::Result;
use common::{analyze, analyze_with_depth, registry};
use tplusage::ast::build::*;
use tplusage::ast::CallData;
use tplusage::{extract, Value};

fn value(json: &str) -> Value {
    Value::from_json_str(json).unwrap()
}

#[test]
fn missing_params_are_ignored() -> Result<()> {
    // {$a.b}
    let body = block([print(data_ref("a", [key("b")]))]);
    let registry = registry([("test.main", &["a"][..], body)]);
    let params = analyze(&registry, "test.main")?;
    assert_eq!(
        extract(&value(r#"{"a": {}}"#), &params),
        value(r#"{"a": {}}"#)
    );
    Ok(())
}

#[test]
fn unused_parameters_are_removed() -> Result<()> {
    // {$a.b}
    let body = block([print(data_ref("a", [key("b")]))]);
    let registry = registry([("test.main", &["a"][..], body)]);
    let params = analyze(&registry, "test.main")?;
    assert_eq!(
        extract(
            &value(r#"{"a": {"b": "value", "c": "not used"}, "d": "also not used"}"#),
            &params
        ),
        value(r#"{"a": {"b": "value"}}"#)
    );
    Ok(())
}

#[test]
fn printed_values_keep_their_whole_structure() -> Result<()> {
    // {$a}
    let body = block([print(var("a"))]);
    let registry = registry([("test.main", &["a"][..], body)]);
    let params = analyze(&registry, "test.main")?;
    assert_eq!(
        extract(
            &value(r#"{"a": {"b": "value", "c": "another"}, "d": "not used"}"#),
            &params
        ),
        value(r#"{"a": {"b": "value", "c": "another"}}"#)
    );
    Ok(())
}

#[test]
fn unknown_usage_keeps_the_argument() -> Result<()> {
    // {$a.b}{myFunc($a.c)}
    let body = block([
        print(data_ref("a", [key("b")])),
        print(function("myFunc", [data_ref("a", [key("c")])])),
    ]);
    let registry = registry([("test.main", &["a"][..], body)]);
    let params = analyze(&registry, "test.main")?;
    assert_eq!(
        extract(&value(r#"{"a": {"b": 1, "c": 2, "d": 3}}"#), &params),
        value(r#"{"a": {"b": 1, "c": 2}}"#)
    );
    Ok(())
}

#[test]
fn iteration_projects_each_element() -> Result<()> {
    // {foreach $item in $list}{$item.value}{/foreach}
    let body = block([for_loop(
        "item",
        var("list"),
        block([print(data_ref("item", [key("value")]))]),
    )]);
    let registry = registry([("test.main", &["list"][..], body)]);
    let params = analyze(&registry, "test.main")?;
    assert_eq!(
        extract(
            &value(
                r#"{"list": [
                    {"value": 1, "unused": "ignore1"},
                    {"value": 2, "unused": "ignore2"}
                ]}"#
            ),
            &params
        ),
        value(r#"{"list": [{"value": 1}, {"value": 2}]}"#)
    );
    Ok(())
}

#[test]
fn truthiness_checks_keep_presence_but_not_content() -> Result<()> {
    // {if $a}{$b}{/if}
    let body = block([if_node([if_arm(var("a"), block([print(var("b"))]))])]);
    let registry = registry([("test.main", &["a", "b"][..], body)]);
    let params = analyze(&registry, "test.main")?;
    assert_eq!(
        extract(&value(r#"{"a": {"x": 1, "y": 2}, "b": "v"}"#), &params),
        value(r#"{"a": "", "b": "v"}"#)
    );
    // falsy values pass through so emptiness is never upgraded
    assert_eq!(
        extract(&value(r#"{"a": "", "b": "v"}"#), &params),
        value(r#"{"a": "", "b": "v"}"#)
    );
    Ok(())
}

#[test]
fn meta_only_usage_keeps_shape_but_drops_fields() -> Result<()> {
    // {length($list)}: only the length is consumed
    let body = block([print(function("length", [var("list")]))]);
    let registry = registry([("test.main", &["list"][..], body)]);
    let params = analyze(&registry, "test.main")?;
    assert_eq!(
        extract(&value(r#"{"list": [{"x": 1}, {"y": 2}]}"#), &params),
        value(r#"{"list": [{}, {}]}"#)
    );
    Ok(())
}

#[test]
fn wildcard_children_apply_to_unmatched_keys() -> Result<()> {
    // {$a[$b].d}
    let body = block([print(data_ref("a", [expr_key(var("b")), key("d")]))]);
    let registry = registry([("test.main", &["a", "b"][..], body)]);
    let params = analyze(&registry, "test.main")?;
    assert_eq!(
        extract(
            &value(r#"{"a": {"k1": {"d": 1, "e": 2}, "k2": {"d": 3}}, "b": "k1"}"#),
            &params
        ),
        value(r#"{"a": {"k1": {"d": 1}, "k2": {"d": 3}}, "b": "k1"}"#)
    );
    Ok(())
}

#[test]
fn applies_recursion_up_to_limit() -> Result<()> {
    // {$x}{call .callee data="$data"}{param x: $data.value /}{/call}
    let callee = block([
        print(var("x")),
        call(
            "test.callee",
            CallData::Expr(var("data")),
            [param_value("x", data_ref("data", [key("value")]))],
        ),
    ]);
    let registry = registry([("test.callee", &["data", "x"][..], callee)]);
    let params = analyze(&registry, "test.callee")?;

    let input = value(
        r#"{
            "data": {
                "data": {
                    "data": {
                        "data": {"value": "level 4", "unused": "4th unused"},
                        "value": "level 3",
                        "unused": "3rd unused"
                    },
                    "value": "level 2",
                    "unused": "2nd unused"
                }
            },
            "x": "another value"
        }"#,
    );
    // beyond the last resolved level the blanket keeps subtrees verbatim
    let expected = value(
        r#"{
            "data": {
                "data": {
                    "data": {
                        "data": {"value": "level 4", "unused": "4th unused"},
                        "value": "level 3",
                        "unused": "3rd unused"
                    },
                    "value": "level 2"
                }
            },
            "x": "another value"
        }"#,
    );
    assert_eq!(extract(&input, &params), expected);
    Ok(())
}

#[test]
fn recurses_to_full_depth_with_a_larger_bound() -> Result<()> {
    let callee = block([
        print(var("x")),
        call(
            "test.callee",
            CallData::Expr(var("data")),
            [param_value("x", data_ref("data", [key("value")]))],
        ),
    ]);
    let registry = registry([("test.callee", &["data", "x"][..], callee)]);
    let params = analyze_with_depth(&registry, "test.callee", 5)?;

    let input = value(
        r#"{
            "data": {
                "data": {
                    "data": {
                        "data": {"value": "level 4", "unused": "4th unused"},
                        "value": "level 3",
                        "unused": "3rd unused"
                    },
                    "value": "level 2",
                    "unused": "2nd unused"
                }
            },
            "x": "another value"
        }"#,
    );
    let expected = value(
        r#"{
            "data": {
                "data": {
                    "data": {
                        "data": {"value": "level 4"},
                        "value": "level 3"
                    },
                    "value": "level 2"
                }
            },
            "x": "another value"
        }"#,
    );
    assert_eq!(extract(&input, &params), expected);
    Ok(())
}

#[test]
fn extraction_is_idempotent() -> Result<()> {
    let body = block([
        print(data_ref("a", [key("b")])),
        if_node([if_arm(var("flag"), block([print(var("c"))]))]),
        for_loop(
            "item",
            var("list"),
            block([print(data_ref("item", [key("value")]))]),
        ),
    ]);
    let registry = registry([("test.main", &["a", "flag", "c", "list"][..], body)]);
    let params = analyze(&registry, "test.main")?;

    let input = value(
        r#"{
            "a": {"b": 1, "z": 9},
            "flag": {"deep": true},
            "c": [1, 2],
            "list": [{"value": "v", "w": 0}],
            "extra": "drop me"
        }"#,
    );
    let once = extract(&input, &params);
    let twice = extract(&once, &params);
    assert_eq!(once, twice);
    Ok(())
}

#[test]
fn non_object_inputs_pass_through() -> Result<()> {
    let body = block([print(data_ref("a", [key("b")]))]);
    let registry = registry([("test.main", &["a"][..], body)]);
    let params = analyze(&registry, "test.main")?;

    // scalar where an object was analyzed: kept unchanged
    assert_eq!(
        extract(&value(r#"{"a": 17}"#), &params),
        value(r#"{"a": 17}"#)
    );
    // the whole input may be non-object data
    assert_eq!(extract(&value("[1, 2]"), &params), value("[1, 2]"));
    Ok(())
}

#[test]
fn no_keys_are_fabricated() -> Result<()> {
    let body = block([
        print(data_ref("a", [key("b")])),
        print(data_ref("missing", [key("x")])),
    ]);
    let registry = registry([("test.main", &["a", "missing"][..], body)]);
    let params = analyze(&registry, "test.main")?;

    let out = extract(&value(r#"{"a": {"b": 1}}"#), &params);
    assert_eq!(out, value(r#"{"a": {"b": 1}}"#));
    Ok(())
}
