// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Memory component
//!
//! Memories are declared against a construction context and accessed through
//! read and write ports, each of which is lowered into one logic node at the
//! moment it is built. Port counts, address widths and write semantics are
//! validated at construction time; the stored data itself only exists at
//! simulation time.

pub(crate) mod parsers;

pub mod access;
pub mod rom;


use std::fmt;
use std::sync::Arc;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use log::trace;

use crate::error::Error;
use crate::ident::{Identity, Named};
use crate::netlist::{NameSource, Node, NodeId};
use crate::signal::{BitWidth, Signal, SignalRef};

pub use access::{Assignment, ReadHandle, WriteSource, WriteTarget};
pub use rom::{Contents, RomConfig};


/// Configuration of a read/write memory
///
/// A configuration carries everything a declaration needs apart from the
/// owning context: element and address-bus widths, an optional explicit
/// name and the port-capacity limits. The default limits of two read ports
/// and one write port keep designs mappable to common block RAMs; either
/// limit can be raised or lifted entirely.
#[derive(Clone, Debug, PartialEq)]
pub struct MemoryConfig {
    pub(crate) name: Option<String>,
    pub(crate) bit_width: BitWidth,
    pub(crate) address_width: BitWidth,
    pub(crate) asynchronous: bool,
    pub(crate) max_read_ports: Option<usize>,
    pub(crate) max_write_ports: Option<usize>,
}

impl MemoryConfig {
    /// Create a new configuration
    ///
    /// The memory will store `2^address_width` elements of `bit_width` bits
    /// each. Both widths must be at least one bit. Note that the element
    /// count is never preallocated anywhere; storage is realised sparsely
    /// by the simulator.
    pub fn new(bit_width: BitWidth, address_width: BitWidth) -> Result<Self, Error> {
        if bit_width == 0 {
            return Err(Error::InvalidWidth("bit width"))
        }
        if address_width == 0 {
            return Err(Error::InvalidWidth("address width"))
        }

        Ok(Self {
            name: None,
            bit_width,
            address_width,
            asynchronous: false,
            max_read_ports: Some(2),
            max_write_ports: Some(1),
        })
    }

    /// Request an explicit name
    ///
    /// Without an explicit name, the netlist generates a unique one.
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {name: Some(name.into()), ..self}
    }

    /// Mark the memory as asynchronous
    ///
    /// Inputs of an asynchronous memory's ports need not be settled at the
    /// start of a cycle. Asynchronous memories rarely map to physical
    /// memory hardware; the flag is recorded for the timing pass to consult.
    pub fn asynchronous(self) -> Self {
        Self {asynchronous: true, ..self}
    }

    /// Set the read-port capacity, `None` meaning unbounded
    pub fn with_max_read_ports(self, limit: Option<usize>) -> Self {
        Self {max_read_ports: limit, ..self}
    }

    /// Set the write-port capacity, `None` meaning unbounded
    pub fn with_max_write_ports(self, limit: Option<usize>) -> Self {
        Self {max_write_ports: limit, ..self}
    }

    /// Retrieve the width of a stored element
    pub fn bit_width(&self) -> BitWidth {
        self.bit_width
    }

    /// Retrieve the width of the address bus
    pub fn address_width(&self) -> BitWidth {
        self.address_width
    }
}

#[cfg(test)]
impl Arbitrary for MemoryConfig {
    fn arbitrary(g: &mut Gen) -> Self {
        Self {
            name: None,
            bit_width: BitWidth::arbitrary(g) % 128 + 1,
            address_width: BitWidth::arbitrary(g) % 48 + 1,
            asynchronous: bool::arbitrary(g),
            max_read_ports: Option::<usize>::arbitrary(g).map(|l| l % 8 + 1),
            max_write_ports: Option::<usize>::arbitrary(g).map(|l| l % 8 + 1),
        }
    }
}


/// A block memory
///
/// A memory is exclusively owned by the netlist it was registered into and
/// lives exactly as long as that netlist. After declaration it only ever
/// accumulates ports; its configuration is immutable. The port counters
/// grow monotonically and are never decremented, not even when a build
/// fails its capacity check.
#[derive(Clone, Debug)]
pub struct Memory {
    identity: Identity,
    name: Arc<str>,
    bit_width: BitWidth,
    address_width: BitWidth,
    asynchronous: bool,
    max_read_ports: Option<usize>,
    max_write_ports: Option<usize>,
    read_port_count: usize,
    write_port_count: usize,
    read_ports: Vec<NodeId>,
    write_ports: Vec<NodeId>,
    rom: Option<rom::Rom>,
}

impl Memory {
    pub(crate) fn new(
        identity: Identity,
        name: Arc<str>,
        config: &MemoryConfig,
        rom: Option<rom::Rom>,
    ) -> Self {
        Self {
            identity,
            name,
            bit_width: config.bit_width,
            address_width: config.address_width,
            asynchronous: config.asynchronous,
            max_read_ports: config.max_read_ports,
            max_write_ports: config.max_write_ports,
            read_port_count: 0,
            write_port_count: 0,
            read_ports: Default::default(),
            write_ports: Default::default(),
            rom,
        }
    }

    /// Retrieve the memory's identity
    pub fn identity(&self) -> Identity {
        self.identity
    }

    /// Retrieve the width of a stored element
    pub fn bit_width(&self) -> BitWidth {
        self.bit_width
    }

    /// Retrieve the width of the address bus
    pub fn address_width(&self) -> BitWidth {
        self.address_width
    }

    /// Check whether the memory was declared asynchronous
    pub fn is_asynchronous(&self) -> bool {
        self.asynchronous
    }

    /// Check whether the memory is read-only
    pub fn is_read_only(&self) -> bool {
        self.rom.is_some()
    }

    /// Retrieve the read-only payload, if the memory is a ROM
    pub fn rom(&self) -> Option<&rom::Rom> {
        self.rom.as_ref()
    }

    pub(crate) fn rom_mut(&mut self) -> Option<&mut rom::Rom> {
        self.rom.as_mut()
    }

    /// Retrieve the read-port capacity, `None` meaning unbounded
    pub fn max_read_ports(&self) -> Option<usize> {
        self.max_read_ports
    }

    /// Retrieve the write-port capacity, `None` meaning unbounded
    pub fn max_write_ports(&self) -> Option<usize> {
        self.max_write_ports
    }

    /// Retrieve the number of read-port builds counted against the capacity
    pub fn read_port_count(&self) -> usize {
        self.read_port_count
    }

    /// Retrieve the number of write-port builds counted against the capacity
    pub fn write_port_count(&self) -> usize {
        self.write_port_count
    }

    /// Retrieve the read ports, in the order they were built
    pub fn read_ports(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.read_ports.iter().copied()
    }

    /// Retrieve the write ports, in the order they were built
    pub fn write_ports(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.write_ports.iter().copied()
    }

    /// Build a read port for the given address
    ///
    /// The address must not be wider than the address bus. Every call
    /// builds a distinct port with a fresh output signal of the element
    /// width, even for identical address expressions; reads are never
    /// deduplicated here. If the capacity check fails, the counter keeps
    /// its incremented value and no port is appended, so a later retry
    /// against the same memory cannot succeed either.
    pub(crate) fn build_read_port(
        &mut self,
        names: &mut NameSource,
        nodes: &mut Vec<Node>,
        address: SignalRef,
    ) -> Result<SignalRef, Error> {
        self.check_address(&address)?;

        if let Some(limit) = self.max_read_ports {
            self.read_port_count += 1;
            if self.read_port_count > limit {
                return Err(Error::ReadPortLimitExceeded{memory: self.name.clone(), limit})
            }
        }

        let data = Signal::wire(names.wire_name(), self.bit_width)?;
        trace!("read port {} on '{}' -> {}", self.read_ports.len(), self.name, data);

        let node = NodeId(nodes.len());
        nodes.push(Node::ReadPort{memory: self.identity, address, data: data.clone()});
        self.read_ports.push(node);
        Ok(data)
    }

    /// Build a write port for the given address, data and enable
    ///
    /// The signals are expected to have passed [Memory::check_write]
    /// already; this function only performs the capacity bookkeeping and
    /// appends the node. Like read ports, a failed capacity check leaves
    /// the counter incremented.
    pub(crate) fn build_write_port(
        &mut self,
        nodes: &mut Vec<Node>,
        address: SignalRef,
        data: SignalRef,
        enable: SignalRef,
    ) -> Result<(), Error> {
        if let Some(limit) = self.max_write_ports {
            self.write_port_count += 1;
            if self.write_port_count > limit {
                return Err(Error::WritePortLimitExceeded{memory: self.name.clone(), limit})
            }
        }

        trace!("write port {} on '{}'", self.write_ports.len(), self.name);

        let node = NodeId(nodes.len());
        nodes.push(Node::WritePort{memory: self.identity, address, data, enable});
        self.write_ports.push(node);
        Ok(())
    }

    /// Check a write's signals against the memory's widths
    ///
    /// Data must match the element width exactly and the enable must be
    /// exactly one bit; there is no implicit truncation or extension. The
    /// checks apply to conditional and unconditional writes alike, before
    /// any routing happens.
    pub(crate) fn check_write(
        &self,
        address: &SignalRef,
        data: &SignalRef,
        enable: &SignalRef,
    ) -> Result<(), Error> {
        if data.width() != self.bit_width {
            return Err(Error::DataWidthMismatch{
                memory: self.name.clone(),
                width: data.width(),
                bit_width: self.bit_width,
            })
        }
        if enable.width() != 1 {
            return Err(Error::EnableWidthMismatch{width: enable.width()})
        }
        self.check_address(address)
    }

    fn check_address(&self, address: &SignalRef) -> Result<(), Error> {
        if address.width() > self.address_width {
            return Err(Error::AddressWidthExceeded{
                memory: self.name.clone(),
                width: address.width(),
                address_width: self.address_width,
            })
        }
        Ok(())
    }
}

impl Named for Memory {
    type Name = Arc<str>;

    fn name(&self) -> &Self::Name {
        &self.name
    }
}

impl fmt::Display for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_read_only() { "rom" } else { "memory" };
        write!(
            f,
            "{} {} ({}): {} bits x 2^{}",
            kind,
            self.name,
            self.identity,
            self.bit_width,
            self.address_width,
        )?;
        if self.asynchronous {
            write!(f, ", asynchronous")?;
        }
        Ok(())
    }
}
