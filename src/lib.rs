// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Netlist description of digital circuits
//!
//! This library describes digital circuits as a netlist of logic
//! operations, centred on the addressable-memory abstraction: read/write
//! memories and read-only memories are declared against a [Context] and
//! accessed through ports, each lowered into one validated netlist node at
//! build time. The accompanying [sim] module implements the cycle-accurate
//! timing model the memories are built against.

#[cfg(test)]
#[macro_use]
extern crate quickcheck_macros;

pub mod cond;
pub mod context;
pub mod error;
pub mod ident;
pub mod memory;
pub mod netlist;
pub mod signal;
pub mod sim;
pub mod value;

#[cfg(test)]
mod tests;

pub use context::Context;
pub use error::Error;
pub use memory::{Assignment, Contents, Memory, MemoryConfig, ReadHandle, RomConfig, WriteSource, WriteTarget};
pub use netlist::{MemoryId, Netlist, Node, NodeId};
pub use signal::{Address, BitWidth, Signal, SignalKind, SignalRef};
pub use sim::{MemorySim, Store, Valuation};
pub use value::Literal;
