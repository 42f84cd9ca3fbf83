// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Netlist container

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::error::Error;
use crate::ident::{Identity, Named};
use crate::memory::Memory;
use crate::signal::SignalRef;


/// Index of a registered memory within its netlist
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemoryId(pub(crate) usize);


/// Index of a logic node within its netlist
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);


/// A logic node
///
/// A node is one operation in the netlist. The memory component contributes
/// two operations: a read port, producing a data signal, and a write port,
/// a purely side-effecting node without outputs. Nodes refer to their memory
/// by identity, so that memories of identical shape are never confused.
#[derive(Clone, Debug)]
pub enum Node {
    /// A memory read port
    ReadPort{memory: Identity, address: SignalRef, data: SignalRef},
    /// A memory write port
    WritePort{memory: Identity, address: SignalRef, data: SignalRef, enable: SignalRef},
}

impl Node {
    /// Retrieve the identity of the memory the port belongs to
    pub fn memory(&self) -> Identity {
        match self {
            Self::ReadPort{memory, ..}  => *memory,
            Self::WritePort{memory, ..} => *memory,
        }
    }

    /// Retrieve the address signal feeding the port
    pub fn address(&self) -> &SignalRef {
        match self {
            Self::ReadPort{address, ..}  => address,
            Self::WritePort{address, ..} => address,
        }
    }

    /// Retrieve the data signal of the port
    ///
    /// For a read port this is the port's output, for a write port the
    /// value to be stored.
    pub fn data(&self) -> &SignalRef {
        match self {
            Self::ReadPort{data, ..}  => data,
            Self::WritePort{data, ..} => data,
        }
    }

    /// Retrieve the enable signal, present only on write ports
    pub fn enable(&self) -> Option<&SignalRef> {
        match self {
            Self::ReadPort{..}         => None,
            Self::WritePort{enable, ..} => Some(enable),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadPort{memory, address, data} =>
                write!(f, "read {}[{}] -> {}", memory, address, data),
            Self::WritePort{memory, address, data, enable} =>
                write!(f, "write {}[{}] <- {} when {}", memory, address, data, enable),
        }
    }
}


/// A netlist of logic operations
///
/// The netlist owns every declared memory and every logic node. Both are
/// kept in insertion order, which is the order simulation and export will
/// process them in. Memories are registered once at declaration and only
/// ever accumulate ports afterwards; nothing is ever removed.
#[derive(Clone, Debug, Default)]
pub struct Netlist {
    pub(crate) names: NameSource,
    pub(crate) memories: Vec<Memory>,
    pub(crate) nodes: Vec<Node>,
}

impl Netlist {
    /// Create an empty netlist
    pub fn new() -> Self {
        Default::default()
    }

    /// Register a memory, transferring ownership to the netlist
    pub(crate) fn register_memory(&mut self, memory: Memory) -> MemoryId {
        debug!("registering memory '{}' as {}", memory.name_ref(), memory.identity());
        let res = MemoryId(self.memories.len());
        self.memories.push(memory);
        res
    }

    /// Retrieve a registered memory
    pub fn memory(&self, id: MemoryId) -> &Memory {
        &self.memories[id.0]
    }

    /// Retrieve a registered memory by its identity
    pub fn memory_by_identity(&self, identity: Identity) -> Option<&Memory> {
        self.memories.iter().find(|m| m.identity() == identity)
    }

    /// Retrieve the registered memories
    ///
    /// The returned iterator yields the memories in registration order.
    pub fn memories(&self) -> impl Iterator<Item = &Memory> {
        self.memories.iter()
    }

    /// Retrieve a logic node
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Retrieve the logic nodes
    ///
    /// The returned iterator yields the nodes in the order they were built.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }
}

impl fmt::Display for Netlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "netlist:")?;
        self.memories().try_for_each(|m| writeln!(f, "  {}", m))?;
        self.nodes().try_for_each(|n| writeln!(f, "  {}", n))
    }
}


/// Allocator of netlist-unique names
///
/// Auto-generated names use the `mem` prefix for memories and the `tmp`
/// prefix for wires carrying node outputs, numbered from one shared
/// counter. Explicitly requested names must not collide with any name
/// handed out before.
#[derive(Clone, Debug, Default)]
pub(crate) struct NameSource {
    taken: HashSet<Arc<str>>,
    next: usize,
}

impl NameSource {
    /// Turn a requested name into a unique one, or generate a fresh one
    pub fn memory_name(&mut self, requested: Option<String>) -> Result<Arc<str>, Error> {
        match requested {
            Some(name) => {
                let name: Arc<str> = name.into();
                if !self.taken.insert(name.clone()) {
                    return Err(Error::DuplicateName(name))
                }
                Ok(name)
            },
            None => Ok(self.generated("mem")),
        }
    }

    /// Generate a fresh name for a wire
    pub fn wire_name(&mut self) -> Arc<str> {
        self.generated("tmp")
    }

    fn generated(&mut self, prefix: &str) -> Arc<str> {
        loop {
            let name: Arc<str> = format!("{}{}", prefix, self.next).into();
            self.next += 1;
            if self.taken.insert(name.clone()) {
                return name
            }
        }
    }
}
