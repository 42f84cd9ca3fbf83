// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Memory-timing simulation
//!
//! This module implements the timing contract memories are built against,
//! for the memory portion of a netlist: within a cycle, every read port
//! observes the state the memory had at the start of the cycle, and all
//! enabled writes commit atomically at the cycle boundary, in port
//! registration order. Evaluation of general logic is not this library's
//! business; port input values are supplied per cycle via a [Valuation].

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::sync::Arc;

use log::trace;

use num_bigint::BigUint;
use num_traits::Zero;

use crate::error::Error;
use crate::ident::{Identity, Named};
use crate::netlist::{Netlist, Node};
use crate::signal::{SignalKind, SignalRef};
use crate::value::Literal;


/// Backing store of one memory
///
/// Storage is a sparse mapping from address to value, both of arbitrary
/// precision: address spaces of 32 and more bits must never be enumerated,
/// and elements wider than a machine word must be exact. Addresses never
/// written read as zero.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Store {
    cells: BTreeMap<BigUint, BigUint>,
}

impl Store {
    /// Create an empty store
    pub fn new() -> Self {
        Default::default()
    }

    /// Retrieve the value at the given address
    pub fn get(&self, address: &BigUint) -> BigUint {
        self.cells.get(address).cloned().unwrap_or_default()
    }

    /// Replace the value at the given address
    pub fn set(&mut self, address: BigUint, value: BigUint) {
        self.cells.insert(address, value);
    }

    /// Retrieve the populated cells, in address order
    pub fn cells(&self) -> impl Iterator<Item = (&BigUint, &BigUint)> {
        self.cells.iter()
    }

    /// Retrieve the number of populated cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check whether any cell was ever written
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}


/// Signal values for one cycle
///
/// A valuation supplies the value of every non-constant signal feeding a
/// memory port in the cycle being stepped. Constants resolve from the
/// signal itself. Values must fit their signal's width; nothing is
/// truncated on the way into a port.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Valuation {
    values: BTreeMap<Arc<str>, BigUint>,
}

impl Valuation {
    /// Create an empty valuation
    pub fn new() -> Self {
        Default::default()
    }

    /// Set a signal's value
    pub fn set(&mut self, name: impl Into<Arc<str>>, value: impl Into<BigUint>) {
        self.values.insert(name.into(), value.into());
    }

    /// Set a signal's value, builder style
    pub fn with(mut self, name: impl Into<Arc<str>>, value: impl Into<BigUint>) -> Self {
        self.set(name, value);
        self
    }

    /// Resolve the value of the given signal
    pub fn value_of(&self, signal: &SignalRef) -> Result<BigUint, Error> {
        if let SignalKind::Constant(bits) = signal.kind() {
            return Ok(bits.clone())
        }

        let value = self
            .values
            .get(signal.name_ref())
            .ok_or_else(|| Error::UnknownSignal(signal.name().clone()))?;
        if value.bits() > signal.width().into() {
            return Err(Error::ValueExceedsWidth{
                signal: signal.name().clone(),
                width: signal.width(),
            })
        }
        Ok(value.clone())
    }
}


/// Simulator for the memory portion of a netlist
///
/// The simulator owns one [Store] per memory identity and advances in
/// whole cycles. Read-only memories have no store; their contents are
/// resolved per access, so a fixed address yields the same value in every
/// cycle.
#[derive(Clone, Debug, Default)]
pub struct MemorySim {
    stores: BTreeMap<Identity, Store>,
    cycle: u64,
}

impl MemorySim {
    /// Create a new simulator with all memories zeroed
    pub fn new() -> Self {
        Default::default()
    }

    /// Preload a value, as if written before the first cycle
    pub fn preload(
        &mut self,
        memory: Identity,
        address: impl Into<BigUint>,
        value: impl Into<BigUint>,
    ) {
        self.stores
            .entry(memory)
            .or_default()
            .set(address.into(), value.into());
    }

    /// Retrieve the store of the given memory
    ///
    /// Memories never written to, and all read-only memories, have no
    /// store.
    pub fn store(&self, memory: Identity) -> Option<&Store> {
        self.stores.get(&memory)
    }

    /// Retrieve the number of completed cycles
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Advance the netlist's memories by one cycle
    ///
    /// Ports are processed in netlist order. Every read port resolves
    /// against the start-of-cycle state, even if a write port targeting
    /// the same address was already processed this cycle. Writes whose
    /// enable is high are committed only after every port was processed;
    /// within a cycle, a later write port wins over an earlier one
    /// targeting the same address. The returned map carries the value of
    /// each read port's data signal.
    pub fn step(
        &mut self,
        netlist: &Netlist,
        inputs: &Valuation,
    ) -> Result<BTreeMap<Arc<str>, BigUint>, Error> {
        let mut outputs: BTreeMap<Arc<str>, BigUint> = Default::default();
        let mut writes: Vec<(Identity, BigUint, BigUint)> = Default::default();

        for node in netlist.nodes() {
            let memory = node.memory();
            let mem = netlist
                .memory_by_identity(memory)
                .ok_or(Error::UnknownMemory(memory))?;

            match node {
                Node::ReadPort{address, data, ..} => {
                    let address = inputs.value_of(address)?;
                    let value = match mem.rom() {
                        Some(rom) => rom.resolve(&Literal::Unsigned(address))?,
                        None => self.stores.get(&memory).map(|s| s.get(&address)).unwrap_or_default(),
                    };
                    outputs.insert(data.name().clone(), value);
                },
                Node::WritePort{address, data, enable, ..} => {
                    let enable = inputs.value_of(enable)?;
                    if !enable.is_zero() {
                        let address = inputs.value_of(address)?;
                        let value = inputs.value_of(data)?;
                        writes.push((memory, address, value));
                    }
                },
            }
        }

        trace!("cycle {}: committing {} writes", self.cycle, writes.len());
        for (memory, address, value) in writes {
            self.stores.entry(memory).or_default().set(address, value);
        }
        self.cycle += 1;
        Ok(outputs)
    }
}
