// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::analyzer::{AnalyzeConfig, Analyzer};
use crate::ast::build::*;
use crate::ast::NodeRef;
use crate::registry::Registry;
use crate::scope::Scope;
use crate::usage::{Constant, Params};

fn fold(node: &NodeRef) -> Vec<Constant> {
    let registry = Registry::new();
    let config = AnalyzeConfig::default();
    let analyzer = Analyzer {
        registry: &registry,
        config: &config,
        params: Params::new(),
    };
    let scope = Scope::root("test", analyzer.params.root());
    analyzer.constant_values(&scope, node).unwrap()
}

#[test]
fn literals_fold_to_themselves() {
    assert_eq!(
        fold(&str_lit("field")),
        vec![Constant::Str("field".to_string())]
    );
    assert_eq!(fold(&int_lit(7)), vec![Constant::Int(7)]);
}

#[test]
fn concatenation_requires_a_string_side() {
    assert_eq!(
        fold(&add(str_lit("field"), int_lit(0))),
        vec![Constant::Str("field0".to_string())]
    );
    // arithmetic on two integers is not key material
    assert_eq!(fold(&add(int_lit(1), int_lit(2))), vec![]);
}

#[test]
fn concatenation_with_unfoldable_side_yields_nothing() {
    assert_eq!(fold(&add(str_lit("field"), var("i"))), vec![]);
}

#[test]
fn range_enumerates_integers() {
    assert_eq!(
        fold(&function("range", [int_lit(3)])),
        vec![Constant::Int(0), Constant::Int(1), Constant::Int(2)]
    );
    assert_eq!(
        fold(&function("range", [int_lit(2), int_lit(8), int_lit(3)])),
        vec![Constant::Int(2), Constant::Int(5)]
    );
    // non-literal bounds are not foldable
    assert_eq!(fold(&function("range", [var("n")])), vec![]);
}

#[test]
fn oversized_ranges_degrade_to_unfoldable() {
    assert_eq!(fold(&function("range", [int_lit(1_000_000)])), vec![]);
}

#[test]
fn keys_folds_literal_maps_only() {
    assert_eq!(
        fold(&function(
            "keys",
            [map([("x", int_lit(1)), ("y", int_lit(2))])]
        )),
        vec![
            Constant::Str("x".to_string()),
            Constant::Str("y".to_string())
        ]
    );
    assert_eq!(fold(&function("keys", [var("m")])), vec![]);
}

#[test]
fn runtime_references_are_not_foldable() {
    assert_eq!(fold(&var("a")), vec![]);
    assert_eq!(fold(&data_ref("a", [key("b")])), vec![]);
}

#[test]
fn constant_bindings_fold_through_references() {
    let registry = Registry::new();
    let config = AnalyzeConfig::default();
    let mut analyzer = Analyzer {
        registry: &registry,
        config: &config,
        params: Params::new(),
    };
    let mut scope = Scope::root("test", analyzer.params.root());

    let lit = analyzer
        .params
        .alloc_constant(Constant::Str("c_other".to_string()));
    scope.variables.insert("textField".to_string(), vec![lit]);

    assert_eq!(
        analyzer.constant_values(&scope, &var("textField")).unwrap(),
        vec![Constant::Str("c_other".to_string())]
    );
}

#[test]
fn map_literal_bindings_fold_field_access() {
    let registry = Registry::new();
    let config = AnalyzeConfig::default();
    let mut analyzer = Analyzer {
        registry: &registry,
        config: &config,
        params: Params::new(),
    };
    let scope = Scope::root("test", analyzer.params.root());

    let candidates = analyzer
        .constant_params(&scope, &map([("field", str_lit("c_education"))]))
        .unwrap();
    assert_eq!(candidates.len(), 1);

    let mut bound = Scope::root("test", analyzer.params.root());
    bound.variables.insert("item".to_string(), candidates);
    assert_eq!(
        analyzer
            .constant_values(&bound, &data_ref("item", [key("field")]))
            .unwrap(),
        vec![Constant::Str("c_education".to_string())]
    );
}

#[test]
fn content_sequences_trim_and_concatenate() {
    let registry = Registry::new();
    let config = AnalyzeConfig::default();
    let mut analyzer = Analyzer {
        registry: &registry,
        config: &config,
        params: Params::new(),
    };
    let scope = Scope::root("test", analyzer.params.root());

    // whitespace around a single text part is trimmed away
    let single = analyzer
        .constant_params(&scope, &block([text("\n\t c_lifeAbout \n")]))
        .unwrap();
    let values: Vec<_> = single
        .iter()
        .map(|id| analyzer.params.constant(*id).cloned().unwrap())
        .collect();
    assert_eq!(values, vec![Constant::Str("c_lifeAbout".to_string())]);

    // a part that cannot fold poisons the sequence
    let poisoned = analyzer
        .constant_params(&scope, &block([text("prefix"), print(var("x"))]))
        .unwrap();
    assert!(poisoned.is_empty());
}

#[test]
fn branch_bodies_contribute_independent_candidates() {
    let registry = Registry::new();
    let config = AnalyzeConfig::default();
    let mut analyzer = Analyzer {
        registry: &registry,
        config: &config,
        params: Params::new(),
    };
    let scope = Scope::root("test", analyzer.params.root());

    let body = block([switch(
        var("category"),
        [
            case([str_lit("Auto")], block([text("c_autoAbout")])),
            case([str_lit("Home")], block([text("c_homeAbout")])),
        ],
        Some(block([text("c_lifeAbout")])),
    )]);
    let candidates = analyzer.constant_params(&scope, &body).unwrap();
    let mut values: Vec<_> = candidates
        .iter()
        .filter_map(|id| analyzer.params.constant(*id))
        .filter_map(|c| c.key_string())
        .collect();
    values.sort();
    assert_eq!(values, vec!["c_autoAbout", "c_homeAbout", "c_lifeAbout"]);
}
