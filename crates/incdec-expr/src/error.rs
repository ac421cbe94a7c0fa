use miette::Diagnostic;

pub mod build;
pub mod runtime;

use build::BuildError;
use runtime::RuntimeError;

/// Top-level error returned by the [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq, thiserror::Error, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(
        code(incdec::build),
        help("the expression tree was rejected before execution")
    )]
    Build(#[from] BuildError),
    #[error(transparent)]
    #[diagnostic(code(incdec::runtime))]
    Runtime(#[from] RuntimeError),
}

impl Error {
    pub fn is_build(&self) -> bool {
        matches!(self, Error::Build(_))
    }

    pub fn is_runtime(&self) -> bool {
        matches!(self, Error::Runtime(_))
    }
}
