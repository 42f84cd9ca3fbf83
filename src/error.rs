// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Error types

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use num_bigint::BigUint;

use crate::ident::Identity;
use crate::signal::BitWidth;


/// Construction and simulation error type
///
/// Every failure in this library is synchronous and fatal to the operation
/// that raised it. A failed operation leaves the affected netlist otherwise
/// consistent, but port counters incremented before a capacity check are
/// deliberately not rolled back.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// A width parameter was zero
    InvalidWidth(&'static str),
    /// An explicit name is already taken within the netlist
    DuplicateName(Arc<str>),
    /// A memory ran out of read-port capacity
    ReadPortLimitExceeded{memory: Arc<str>, limit: usize},
    /// A memory ran out of write-port capacity
    WritePortLimitExceeded{memory: Arc<str>, limit: usize},
    /// An address signal is wider than the memory's address bus
    AddressWidthExceeded{memory: Arc<str>, width: BitWidth, address_width: BitWidth},
    /// Write data does not match the memory's element width exactly
    DataWidthMismatch{memory: Arc<str>, width: BitWidth, bit_width: BitWidth},
    /// A write-enable signal is not exactly one bit wide
    EnableWidthMismatch{width: BitWidth},
    /// A memory was assigned to with the plain value-copy spelling
    InvalidAssignment,
    /// A read-only memory was indexed with a bare literal address
    PointlessRomIndex,
    /// A write was directed at a read-only memory
    WriteToReadOnly(Arc<str>),
    /// A second guarded write claimed a memory's arbitrated write port
    ConditionalWriteConflict(Arc<str>),
    /// An address lies outside the memory's address space
    InvalidAddress{address: BigUint, address_width: BitWidth},
    /// A value of a non-address shape was used as an address
    InvalidAddressType,
    /// A read-only memory's content function reported a failure
    RomEvaluationError(String),
    /// A read-only memory has no content for the given address
    RomAddressUnmapped(BigUint),
    /// A read-only memory's content does not fit its element width
    InvalidRomValueType{memory: Arc<str>, address: BigUint},
    /// A supplied value does not fit the signal it is supplied for
    ValueExceedsWidth{signal: Arc<str>, width: BitWidth},
    /// A signal has no value in the current cycle's valuation
    UnknownSignal(Arc<str>),
    /// A port node refers to a memory the netlist does not know
    UnknownMemory(Identity),
    /// A memory image could not be parsed
    ImageSyntax(String),
}

impl StdError for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidWidth(what) =>
                write!(f, "{} must be at least one bit", what),
            Self::DuplicateName(name) =>
                write!(f, "name '{}' is already taken in this netlist", name),
            Self::ReadPortLimitExceeded{memory, limit} =>
                write!(f, "memory '{}' exceeded its maximum of {} read ports", memory, limit),
            Self::WritePortLimitExceeded{memory, limit} =>
                write!(f, "memory '{}' exceeded its maximum of {} write ports", memory, limit),
            Self::AddressWidthExceeded{memory, width, address_width} =>
                write!(f, "address of {} bits exceeds the {} bit address bus of memory '{}'",
                    width, address_width, memory),
            Self::DataWidthMismatch{memory, width, bit_width} =>
                write!(f, "write data of {} bits does not match the {} bit elements of memory '{}'",
                    width, bit_width, memory),
            Self::EnableWidthMismatch{width} =>
                write!(f, "write-enable signal of {} bits is not exactly one bit", width),
            Self::InvalidAssignment =>
                write!(f, "memories must be assigned via a store, not a plain connection"),
            Self::PointlessRomIndex =>
                write!(f, "indexing a read-only memory with a literal address reads a known \
                    constant; use a constant signal if this is intended"),
            Self::WriteToReadOnly(name) =>
                write!(f, "memory '{}' is read-only", name),
            Self::ConditionalWriteConflict(name) =>
                write!(f, "the arbitrated write port of memory '{}' is already claimed", name),
            Self::InvalidAddress{address, address_width} =>
                write!(f, "address {} lies outside the {} bit address space", address, address_width),
            Self::InvalidAddressType =>
                write!(f, "addresses must be plain unsigned values"),
            Self::RomEvaluationError(msg) =>
                write!(f, "content function failed: {}", msg),
            Self::RomAddressUnmapped(address) =>
                write!(f, "no content mapped at address {}", address),
            Self::InvalidRomValueType{memory, address} =>
                write!(f, "content of memory '{}' at address {} does not fit its element width",
                    memory, address),
            Self::ValueExceedsWidth{signal, width} =>
                write!(f, "value does not fit the {} bit signal '{}'", width, signal),
            Self::UnknownSignal(name) =>
                write!(f, "signal '{}' has no value in this cycle", name),
            Self::UnknownMemory(identity) =>
                write!(f, "no memory with identity {} is registered", identity),
            Self::ImageSyntax(msg) =>
                write!(f, "malformed memory image: {}", msg),
        }
    }
}
