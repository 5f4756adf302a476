//! Per-method compilation driver.
//!
//! [`SsaCompiler`] takes a decoded [`MethodBody`], assembles its
//! [`ControlFlowGraph`], runs the SSA pipeline and hands the converted graph back.
//! A method either converts completely or is rejected with an [`Error`](crate::Error); the
//! caller never sees a partially annotated graph.
//!
//! Methods are independent of each other, so [`SsaCompiler::compile_all`]
//! converts a batch on the rayon thread pool, one graph per task.

use log::{debug, log_enabled, trace, warn, Level};
use rayon::prelude::*;

use crate::{
    analysis::{ControlFlowGraph, MethodBody},
    Result,
};

/// Options controlling the compilation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct SsaOptions {
    /// Re-check the converted graph with the SSA verifier
    pub verify: bool,
    /// Log the DOT dump of every converted graph at `trace` level
    pub dump_dot: bool,
    /// Convert batches on the rayon thread pool
    pub parallel: bool,
}

impl Default for SsaOptions {
    fn default() -> Self {
        Self {
            verify: cfg!(debug_assertions),
            dump_dot: false,
            parallel: true,
        }
    }
}

impl SsaOptions {
    /// Creates a configuration for maximum throughput
    ///
    /// Skips verification and dumping.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            verify: false,
            dump_dot: false,
            parallel: true,
        }
    }

    /// Creates a configuration for debugging conversions
    ///
    /// Verifies every graph, dumps it, and compiles batches sequentially so log
    /// output of different methods does not interleave.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            verify: true,
            dump_dot: true,
            parallel: false,
        }
    }
}

/// Converts decoded methods into SSA form.
///
/// # Examples
///
/// ```rust
/// use regssa::{BlockRecord, InstructionRecord, MethodBody, MethodRef, SsaCompiler, SsaOptions};
///
/// let body = MethodBody::new(MethodRef::new(1, 4), 0)
///     .with_parameter(0)
///     .with_block(BlockRecord::new(0).with_instruction(InstructionRecord::new("return").uses([0])));
///
/// let compiler = SsaCompiler::new(SsaOptions::strict());
/// let cfg = compiler.compile(body)?;
/// assert_eq!(cfg.method(), MethodRef::new(1, 4));
/// # Ok::<(), regssa::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct SsaCompiler {
    options: SsaOptions,
}

impl SsaCompiler {
    /// Creates a compiler with the given options.
    #[must_use]
    pub fn new(options: SsaOptions) -> Self {
        SsaCompiler { options }
    }

    /// Returns the options of this compiler.
    #[must_use]
    pub fn options(&self) -> &SsaOptions {
        &self.options
    }

    /// Converts one method.
    ///
    /// # Errors
    ///
    /// Returns the assembly error for malformed bodies, the renaming error for
    /// registers without reaching definition, and [`Error::SsaError`](crate::Error::SsaError) if
    /// verification is enabled and fails.
    pub fn compile(&self, body: MethodBody) -> Result<ControlFlowGraph> {
        let method = body.method;
        match self.run(body) {
            Ok(cfg) => Ok(cfg),
            Err(error) => {
                warn!("rejected {method}: {error}");
                Err(error)
            }
        }
    }

    /// Converts a batch of independent methods, preserving their order.
    ///
    /// Each method succeeds or fails on its own; one rejected method does not
    /// affect the others.
    pub fn compile_all(&self, bodies: Vec<MethodBody>) -> Vec<Result<ControlFlowGraph>> {
        debug!(
            "compiling {} methods{}",
            bodies.len(),
            if self.options.parallel { " in parallel" } else { "" }
        );

        if self.options.parallel {
            bodies.into_par_iter().map(|body| self.compile(body)).collect()
        } else {
            bodies.into_iter().map(|body| self.compile(body)).collect()
        }
    }

    fn run(&self, body: MethodBody) -> Result<ControlFlowGraph> {
        let mut cfg = ControlFlowGraph::from_method_body(body)?;
        cfg.convert_to_ssa()?;

        if self.options.verify {
            cfg.verify_ssa()?;
        }
        if self.options.dump_dot && log_enabled!(Level::Trace) {
            trace!("{}", cfg.to_dot());
        }

        debug!(
            "converted {}: {} regions, {} instructions",
            cfg.method(),
            cfg.rpo_order().len(),
            cfg.instructions().len()
        );
        Ok(cfg)
    }
}
