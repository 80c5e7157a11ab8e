// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Use README.md as crate documentation.
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

mod analyzer;
pub mod ast;
mod builtins;
mod calls;
mod error;
mod extract;
mod folder;
mod registry;
mod scope;
mod usage;
mod value;

pub use analyzer::{analyze_template, AnalyzeConfig};
pub use error::{Error, Location, Result};
pub use extract::extract;
pub use registry::{CompiledTemplate, Registry};
pub use usage::{Constant, ParamId, ParamKey, Params, Usage, UsageType};
pub use value::{Number, Value};

#[cfg(test)]
mod tests;
