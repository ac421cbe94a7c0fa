use crate::{
    IncDecResult,
    ast::node::Node,
    compiler::{Compiler, compiled::CompiledExpr},
    error::Error,
    eval::{Evaluator, env::Host},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Lower nodes into closures instead of walking them.
    pub use_compiler: bool,
}

/// Runs nodes with the execution strategy selected in [`Options`].
#[derive(Debug, Clone, Default)]
pub struct Engine {
    pub(crate) evaluator: Evaluator,
    pub(crate) compiler: Compiler,
    pub(crate) options: Options,
}

impl Engine {
    pub fn new(options: Options) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn set_use_compiler(&mut self, use_compiler: bool) {
        self.options.use_compiler = use_compiler;
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn compile(&self, node: &Node) -> Result<CompiledExpr, Error> {
        Ok(self.compiler.compile(node)?)
    }

    /// Executes `node` against `host` and returns its value.
    pub fn eval(&self, node: &Node, host: &mut dyn Host) -> IncDecResult {
        if self.options.use_compiler {
            let compiled = self.compile(node)?;
            compiled(host).map_err(Into::into)
        } else {
            self.evaluator.eval(node, host)
        }
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
