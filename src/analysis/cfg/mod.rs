//! Control flow graph of the register IR.
//!
//! This module contains the data model the SSA passes operate on:
//!
//! - [`ControlFlowGraph`] - Arena owning every region and instruction of a method
//! - [`Region`] - Basic block with its dataflow annotations
//! - [`InstructionNode`] - Ordinary instruction, phi-function or signature placeholder
//! - [`MethodBody`], [`BlockRecord`], [`InstructionRecord`] - Decoder input records
//!
//! Graphs are assembled once from a [`MethodBody`] and never change shape
//! afterwards; the passes in [`crate::analysis`] only fill in annotations.

mod builder;
mod graph;
mod instruction;
mod region;

pub use builder::{BlockRecord, EdgeKind, InstructionRecord, MethodBody, MethodRef, SuccessorRecord};
pub use graph::{ControlFlowGraph, Stage};
pub use instruction::{InstrId, InstructionKind, InstructionNode, Register};
pub use region::Region;
