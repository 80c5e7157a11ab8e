// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::HashMap;

use lazy_static::lazy_static;

/// How a recognized builtin consumes its arguments. Functions outside the
/// registry are opaque: their arguments get `Unknown` usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BuiltinClass {
    /// Probes only metadata (length, loop position, key existence); the
    /// argument's content is not consumed.
    Meta,
    /// Consumes argument values whole (numeric and string utilities).
    Consumes,
    /// Structure-preserving combinator: the result exposes the arguments'
    /// own fields, so usage passes through to them.
    Passthrough,
}

#[rustfmt::skip]
lazy_static! {
    static ref BUILTINS: HashMap<&'static str, BuiltinClass> = {
	let mut m: HashMap<&'static str, BuiltinClass> = HashMap::new();

	m.insert("length", BuiltinClass::Meta);
	m.insert("isFirst", BuiltinClass::Meta);
	m.insert("isLast", BuiltinClass::Meta);
	m.insert("index", BuiltinClass::Meta);
	m.insert("isNonnull", BuiltinClass::Meta);
	m.insert("keys", BuiltinClass::Meta);

	m.insert("augmentMap", BuiltinClass::Passthrough);
	m.insert("quoteKeysIfJs", BuiltinClass::Passthrough);

	m.insert("round", BuiltinClass::Consumes);
	m.insert("floor", BuiltinClass::Consumes);
	m.insert("ceiling", BuiltinClass::Consumes);
	m.insert("min", BuiltinClass::Consumes);
	m.insert("max", BuiltinClass::Consumes);
	m.insert("randomInt", BuiltinClass::Consumes);
	m.insert("strContains", BuiltinClass::Consumes);
	m.insert("range", BuiltinClass::Consumes);

	m
    };
}

pub(crate) fn lookup(name: &str) -> Option<BuiltinClass> {
    BUILTINS.get(name).copied()
}
