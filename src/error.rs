// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use core::fmt;

use thiserror::Error;

/// Where an error originated: the template being analyzed and the source
/// position of the offending node.
#[derive(Debug, Clone)]
pub struct Location {
    pub template: String,
    pub file: String,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} ({}:{}:{})",
            self.template, self.file, self.line, self.col
        )
    }
}

/// Error type for usage analysis. Analysis is deterministic; an error
/// reproduces identically on unchanged input and never yields a partial
/// tree.
#[derive(Debug, Error)]
pub enum Error {
    /// The entry template or a call-site target is not in the registry.
    #[error("template not found: {0}")]
    TemplateNotFound(String),
    /// The walker reached an AST node kind it cannot analyze.
    #[error("unsupported node kind: {0}")]
    UnsupportedNode(&'static str),
    /// An internal analysis contract was broken; indicates a bug in the
    /// analyzer, not in the template.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    /// Frame annotation added as an error propagates out of a template
    /// call; the chain of contexts reads as a call stack.
    #[error("{location}: {source}")]
    Context {
        location: Location,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap with a location, annotating the propagation path.
    pub(crate) fn at(self, location: Location) -> Error {
        Error::Context {
            location,
            source: Box::new(self),
        }
    }

    /// The underlying taxonomy error beneath any context frames.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Context { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
