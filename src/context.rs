// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Construction context

use log::debug;

use crate::cond::{Arbiter, GuardedWrite, SingleWriteArbiter};
use crate::error::Error;
use crate::ident::{IdentitySource, Named};
use crate::memory::rom::{Rom, RomConfig};
use crate::memory::{Memory, MemoryConfig, WriteSource};
use crate::netlist::{MemoryId, Netlist};
use crate::signal::{Address, Signal, SignalRef};


/// A netlist-construction context
///
/// The context bundles the netlist being built with the identity counter
/// and the write arbiter. There is no hidden process-wide state: every
/// declaration and every port build goes through a context, and two
/// contexts never interfere. Construction is strictly single-threaded.
pub struct Context {
    netlist: Netlist,
    identities: IdentitySource,
    arbiter: Box<dyn Arbiter>,
}

impl Context {
    /// Create a new context with the default write arbiter
    pub fn new() -> Self {
        Self::with_arbiter(Box::new(SingleWriteArbiter::new()))
    }

    /// Create a new context using the given write arbiter
    pub fn with_arbiter(arbiter: Box<dyn Arbiter>) -> Self {
        Self {netlist: Netlist::new(), identities: IdentitySource::new(), arbiter}
    }

    /// Retrieve the netlist built so far
    pub fn netlist(&self) -> &Netlist {
        &self.netlist
    }

    /// Discard the netlist and restart the identity sequence
    ///
    /// This is the boundary between independent construction sessions.
    /// Memory handles and signals obtained before the reset are dangling
    /// afterwards and must not be used again.
    pub fn reset(&mut self) {
        debug!("resetting construction context");
        self.netlist = Netlist::new();
        self.identities = IdentitySource::new();
        self.arbiter.reset();
    }

    /// Declare a read/write memory
    pub fn declare_memory(&mut self, config: MemoryConfig) -> Result<MemoryId, Error> {
        let name = self.netlist.names.memory_name(config.name.clone())?;
        let identity = self.identities.next_identity();
        Ok(self.netlist.register_memory(Memory::new(identity, name, &config, None)))
    }

    /// Declare a read-only memory
    pub fn declare_rom(&mut self, config: RomConfig) -> Result<MemoryId, Error> {
        let name = self.netlist.names.memory_name(config.memory.name.clone())?;
        let identity = self.identities.next_identity();
        let id = MemoryId(self.netlist.memories.len());
        let rom = Rom::new(
            name.clone(),
            config.memory.bit_width,
            config.memory.address_width,
            config.contents,
            config.pad_missing_with_zero,
            config.duplicate_on_overflow,
            id,
        );
        Ok(self.netlist.register_memory(Memory::new(identity, name, &config.memory, Some(rom))))
    }

    /// Build a read port, returning its data signal
    ///
    /// A bare literal address is promoted to a constant signal of the
    /// memory's address width, except on read-only memories, where indexing
    /// with a literal is rejected: the result would be a compile-time
    /// constant, not a memory read. For a read-only memory with the
    /// duplication policy, the build goes to the pool's active copy,
    /// spawning a fresh twin first if the active one is out of read ports.
    pub fn read(&mut self, memory: MemoryId, address: impl Into<Address>) -> Result<SignalRef, Error> {
        let address = address.into();

        let mem = self.netlist.memory(memory);
        let address_width = mem.address_width();
        let rom = mem.rom().map(|r| (r.duplicates_on_overflow(), r.pool().active()));

        let address = match address {
            Address::Signal(signal) => signal,
            Address::Literal(literal) => {
                if rom.is_some() {
                    return Err(Error::PointlessRomIndex)
                }
                Signal::constant(literal, address_width)?
            },
        };

        let target = match rom {
            None => memory,
            Some((duplicate, active)) => {
                let active_mem = self.netlist.memory(active);
                let exhausted = active_mem
                    .max_read_ports()
                    .map(|limit| active_mem.read_port_count() >= limit)
                    .unwrap_or(false);
                if duplicate && exhausted {
                    self.spawn_rom_copy(memory)?
                } else {
                    active
                }
            },
        };

        let Netlist {names, memories, nodes} = &mut self.netlist;
        memories[target.0].build_read_port(names, nodes, address)
    }

    /// Route a write request to the given memory
    ///
    /// The request's signals are width-checked here, whether the write is
    /// conditional or not. An unconditional write builds its port
    /// directly; a conditional one is accepted by the arbiter and built
    /// during [Context::resolve_conditional_writes].
    pub fn write(
        &mut self,
        memory: MemoryId,
        address: impl Into<Address>,
        source: WriteSource,
        conditional: bool,
    ) -> Result<(), Error> {
        let address = address.into();

        let mem = self.netlist.memory(memory);
        let name = mem.name().clone();
        if mem.is_read_only() {
            return Err(Error::WriteToReadOnly(name))
        }
        let address_width = mem.address_width();

        let address = match address {
            Address::Signal(signal)   => signal,
            Address::Literal(literal) => Signal::constant(literal, address_width)?,
        };
        let (data, enable) = match source {
            WriteSource::Plain(data)           => (data, Signal::constant(true, 1)?),
            WriteSource::Enabled{data, enable} => (data, enable),
        };

        self.netlist.memory(memory).check_write(&address, &data, &enable)?;

        if conditional {
            self.arbiter.guarded_write(GuardedWrite{memory, memory_name: name, address, data, enable})
        } else {
            let Netlist {memories, nodes, ..} = &mut self.netlist;
            memories[memory.0].build_write_port(nodes, address, data, enable)
        }
    }

    /// Build the write ports for all resolved conditional writes
    ///
    /// The arbiter is drained; each resolved write becomes exactly one
    /// write port, in resolution order. Capacity checks apply at this
    /// point, not at acceptance.
    pub fn resolve_conditional_writes(&mut self) -> Result<(), Error> {
        for write in self.arbiter.resolve() {
            let GuardedWrite {memory, address, data, enable, ..} = write;
            let Netlist {memories, nodes, ..} = &mut self.netlist;
            memories[memory.0].build_write_port(nodes, address, data, enable)?;
        }
        Ok(())
    }

    /// Spawn a twin of the given read-only memory and make it active
    fn spawn_rom_copy(&mut self, original: MemoryId) -> Result<MemoryId, Error> {
        let mem = self.netlist.memory(original);
        let config = MemoryConfig {
            name: None,
            bit_width: mem.bit_width(),
            address_width: mem.address_width(),
            asynchronous: mem.is_asynchronous(),
            max_read_ports: mem.max_read_ports(),
            max_write_ports: Some(0),
        };
        let payload = mem.rom().map(|r| (r.contents().clone(), r.pads_missing_with_zero()));
        let (contents, pad) = match payload {
            Some(payload) => payload,
            None          => return Ok(original),
        };

        let name = self.netlist.names.memory_name(None)?;
        debug!(
            "read ports of '{}' exhausted, spawning twin '{}'",
            self.netlist.memory(original).name_ref(),
            name,
        );

        let identity = self.identities.next_identity();
        let copy = MemoryId(self.netlist.memories.len());
        let rom = Rom::new(
            name.clone(),
            config.bit_width,
            config.address_width,
            contents,
            pad,
            false,
            copy,
        );
        let id = self.netlist.register_memory(Memory::new(identity, name, &config, Some(rom)));
        if let Some(rom) = self.netlist.memories[original.0].rom_mut() {
            rom.pool_mut().activate(id);
        }
        Ok(id)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
