// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Memory access handles
//!
//! Indexing a memory does not touch the netlist by itself. A read is
//! represented by a [ReadHandle], which only builds its port once it is
//! forced into a signal; a write is represented by a [WriteTarget], which
//! turns an [Assignment] into a structured write request. The two are
//! distinct types on purpose: a read handle cannot be assigned to and a
//! write target cannot be forwarded as a value.

use std::cell::RefCell;

use crate::context::Context;
use crate::error::Error;
use crate::netlist::MemoryId;
use crate::signal::{Address, SignalRef};


/// Handle to a pending memory read
///
/// Creating a handle is free: it does not count against the memory's
/// read-port capacity. The port is built the first time the handle is
/// forced via [ReadHandle::signal], and exactly once per handle; forcing
/// it again returns the memoised output signal.
#[derive(Debug)]
pub struct ReadHandle {
    memory: MemoryId,
    address: Address,
    signal: RefCell<Option<SignalRef>>,
}

impl ReadHandle {
    /// Create a new read handle
    pub fn new(memory: MemoryId, address: impl Into<Address>) -> Self {
        Self {memory, address: address.into(), signal: Default::default()}
    }

    /// Retrieve the memory the handle reads from
    pub fn memory(&self) -> MemoryId {
        self.memory
    }

    /// Retrieve the address the handle reads at
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Check whether the read port was already built
    pub fn is_materialised(&self) -> bool {
        self.signal.borrow().is_some()
    }

    /// Force the handle into a data signal
    ///
    /// On the first call this builds the read port, consuming one unit of
    /// the memory's read-port capacity. Read-only memories may route the
    /// build to a twin copy if their own capacity is exhausted.
    pub fn signal(&self, context: &mut Context) -> Result<SignalRef, Error> {
        if let Some(signal) = self.signal.borrow().as_ref() {
            return Ok(signal.clone())
        }

        let signal = context.read(self.memory, self.address.clone())?;
        *self.signal.borrow_mut() = Some(signal.clone());
        Ok(signal)
    }
}


/// Handle to a memory location being written
///
/// A write target accepts the two store spellings and nothing else; in
/// particular the plain connection used for wiring signals to each other
/// is rejected, since a memory write without an explicit store is almost
/// always a mistake.
#[derive(Clone, Debug)]
pub struct WriteTarget {
    memory: MemoryId,
    address: Address,
}

impl WriteTarget {
    /// Create a new write target
    pub fn new(memory: MemoryId, address: impl Into<Address>) -> Self {
        Self {memory, address: address.into()}
    }

    /// Retrieve the memory the target writes to
    pub fn memory(&self) -> MemoryId {
        self.memory
    }

    /// Retrieve the address the target writes at
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Carry out an assignment against this target
    ///
    /// An unconditional store builds a write port directly. A conditional
    /// store is handed to the context's write arbiter, which builds the
    /// port once the guards are resolved. A plain connection fails with
    /// [Error::InvalidAssignment] regardless of its operand.
    pub fn assign(&self, context: &mut Context, assignment: Assignment) -> Result<(), Error> {
        match assignment {
            Assignment::Connect(_)        => Err(Error::InvalidAssignment),
            Assignment::Store(source)     => context.write(self.memory, self.address.clone(), source, false),
            Assignment::StoreWhen(source) => context.write(self.memory, self.address.clone(), source, true),
        }
    }
}


/// An assignment, as routed to a memory
///
/// Only the two store spellings actually write to a memory. `Connect` is
/// the ordinary value-copy assignment shared with the signal subsystem; it
/// exists here so that routing it at a memory can be rejected explicitly
/// rather than silently building a port.
#[derive(Clone, Debug)]
pub enum Assignment {
    /// A plain value copy, invalid for memories
    Connect(SignalRef),
    /// An unconditional store
    Store(WriteSource),
    /// A store guarded by the surrounding conditional scope
    StoreWhen(WriteSource),
}

impl Assignment {
    /// Create an unconditional store
    pub fn store(source: impl Into<WriteSource>) -> Self {
        Self::Store(source.into())
    }

    /// Create a conditional store
    pub fn store_when(source: impl Into<WriteSource>) -> Self {
        Self::StoreWhen(source.into())
    }
}


/// The right-hand side of a store
///
/// A plain source is written unconditionally each cycle; it receives an
/// implicit constant-one enable when the port is built. An enabled source
/// carries its own one-bit enable signal gating the write per cycle.
#[derive(Clone, Debug)]
pub enum WriteSource {
    /// Data written every cycle
    Plain(SignalRef),
    /// Data written only in cycles where `enable` is high
    Enabled{data: SignalRef, enable: SignalRef},
}

impl WriteSource {
    /// Create an enabled source
    pub fn enabled(data: SignalRef, enable: SignalRef) -> Self {
        Self::Enabled{data, enable}
    }
}

impl From<SignalRef> for WriteSource {
    fn from(data: SignalRef) -> Self {
        Self::Plain(data)
    }
}

impl From<&SignalRef> for WriteSource {
    fn from(data: &SignalRef) -> Self {
        Self::Plain(data.clone())
    }
}
