use thiserror::Error;

use crate::{
    analysis::{InstrId, Register},
    utils::graph::NodeId,
};

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every variant describes a *precondition* violation: the method handed to the compiler
/// cannot be converted into SSA form, and its compilation is rejected as a whole. Internal
/// invariant violations (a pass executed out of order, a fixed point that fails to converge)
/// are not represented here; those indicate a bug in the pass pipeline and abort with a panic.
///
/// # Error Categories
///
/// ## CFG Assembly Errors
/// - [`Error::Malformed`] - Structurally invalid method body
/// - [`Error::Empty`] - Method body without any blocks
/// - [`Error::UnknownBlock`] - Branch target that starts no block
/// - [`Error::DuplicateBlock`] - Two blocks claiming the same offset
///
/// ## SSA Construction Errors
/// - [`Error::UndefinedRegister`] - Register use without any reaching definition
/// - [`Error::MissingPhiOperand`] - Phi-function without a definition along one edge
/// - [`Error::SsaError`] - The verifier rejected the finished SSA graph
///
/// # Examples
///
/// ```rust
/// use regssa::{Error, MethodBody, MethodRef, SsaCompiler};
///
/// let body = MethodBody::new(MethodRef::new(0, 1), 0);
/// match SsaCompiler::default().compile(body) {
///     Ok(_) => println!("converted"),
///     Err(Error::Empty) => println!("nothing to compile"),
///     Err(e) => println!("rejected: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The method body is damaged and could not be assembled into a graph.
    ///
    /// The error includes the source location where the malformation was detected
    /// for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Provided method body contained no blocks.
    #[error("Provided method body was empty")]
    Empty,

    /// A successor record names an offset at which no block starts.
    ///
    /// The associated value is the offending branch target.
    #[error("Branch target {0:#06x} does not start a block")]
    UnknownBlock(u32),

    /// Two blocks of the same method start at the same offset.
    #[error("Block {0:#06x} is defined more than once")]
    DuplicateBlock(u32),

    /// A register is read without any definition reaching the read.
    ///
    /// Neither an instruction of the method nor a signature placeholder defines the
    /// register on the path to the use, so the use cannot be renamed.
    #[error("Register {register} used by {instruction} in region {region} has no reaching definition")]
    UndefinedRegister {
        /// The register being read
        register: Register,
        /// The instruction reading it
        instruction: InstrId,
        /// The region holding the instruction
        region: NodeId,
    },

    /// A phi-function receives no definition along one of its incoming edges.
    #[error("Phi for {register} in region {region} has no definition along the edge from {predecessor}")]
    MissingPhiOperand {
        /// The register merged by the phi-function
        register: Register,
        /// The region holding the phi-function
        region: NodeId,
        /// The predecessor whose edge carries no definition
        predecessor: NodeId,
    },

    /// The SSA verifier found a violated property in the converted graph.
    #[error("{0}")]
    SsaError(String),
}
