// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Conditional write arbitration
//!
//! Writes issued under a conditional scope are not built directly; they
//! are handed to an arbiter, which merges guarded writes sharing a
//! destination into one arbitrated write port per memory and calls back
//! into the direct port builder once guards are resolved. The scope
//! machinery itself lives outside this library; this module only fixes the
//! contract and ships a deliberately small default implementation.

use std::collections::BTreeSet;
use std::mem;
use std::sync::Arc;

use log::debug;

use crate::error::Error;
use crate::netlist::MemoryId;
use crate::signal::SignalRef;


/// A guarded write accepted for arbitration
///
/// The signals have already passed the width checks of the destination
/// memory when the write reaches an arbiter; resolution must not alter
/// their widths.
#[derive(Clone, Debug)]
pub struct GuardedWrite {
    /// Destination memory
    pub memory: MemoryId,
    /// Name of the destination memory, for error reporting
    pub memory_name: Arc<str>,
    /// Address written at
    pub address: SignalRef,
    /// Data written
    pub data: SignalRef,
    /// Enable gating the write
    pub enable: SignalRef,
}


/// Arbiter of guarded writes
///
/// An arbiter accepts guarded writes as they are declared and later
/// resolves them into concrete writes, each of which the context turns
/// into exactly one write port. Resolution order must preserve acceptance
/// order per memory.
pub trait Arbiter {
    /// Accept a guarded write
    fn guarded_write(&mut self, write: GuardedWrite) -> Result<(), Error>;

    /// Resolve the accepted writes
    ///
    /// Each returned write becomes one physical write port. The arbiter
    /// must not return a write it has already resolved before.
    fn resolve(&mut self) -> Vec<GuardedWrite>;

    /// Discard all state, for a context reset
    fn reset(&mut self);
}


/// The default arbiter: one guarded write per memory
///
/// Merging several guarded writes into one port requires select logic,
/// which is the conditional subsystem's business. This arbiter instead
/// makes the historically implicit assumption explicit and hard: the
/// single arbitrated write port of a memory belongs to the first guarded
/// write, and any later one is rejected. Each accepted write resolves
/// as-is, its enable being the guard.
#[derive(Debug, Default)]
pub struct SingleWriteArbiter {
    claimed: BTreeSet<MemoryId>,
    pending: Vec<GuardedWrite>,
}

impl SingleWriteArbiter {
    /// Create a new arbiter
    pub fn new() -> Self {
        Default::default()
    }
}

impl Arbiter for SingleWriteArbiter {
    fn guarded_write(&mut self, write: GuardedWrite) -> Result<(), Error> {
        if !self.claimed.insert(write.memory) {
            return Err(Error::ConditionalWriteConflict(write.memory_name))
        }

        debug!("guarded write on '{}' accepted for arbitration", write.memory_name);
        self.pending.push(write);
        Ok(())
    }

    fn resolve(&mut self) -> Vec<GuardedWrite> {
        mem::take(&mut self.pending)
    }

    fn reset(&mut self) {
        *self = Default::default();
    }
}
