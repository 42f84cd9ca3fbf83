// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Signals

use std::fmt;
use std::sync::Arc;

use num_bigint::BigUint;

use crate::error::Error;
use crate::ident::Named;
use crate::value::Literal;


/// Bit-width of a signal, i.e. the number of "physical" wires
///
/// Widths are always known in this library. A width can never be zero.
pub type BitWidth = u16;


/// Shared handle to a signal
pub type SignalRef = Arc<Signal>;


/// A bit-vector signal
///
/// Signals are the values flowing through the netlist. This library only
/// needs to know a signal's name, width and kind; slicing, arithmetic and
/// boolean composition are the business of a separate subsystem and
/// deliberately absent here.
#[derive(Clone, Debug, PartialEq)]
pub struct Signal {
    name: Arc<str>,
    width: BitWidth,
    kind: SignalKind,
}

impl Signal {
    /// Create a new primary input signal
    pub fn input(name: impl Into<Arc<str>>, width: BitWidth) -> Result<SignalRef, Error> {
        Self::new(name, width, SignalKind::Input)
    }

    /// Create a new register output signal
    pub fn register(name: impl Into<Arc<str>>, width: BitWidth) -> Result<SignalRef, Error> {
        Self::new(name, width, SignalKind::Register)
    }

    /// Create a new constant signal
    ///
    /// The value must fit the given width exactly as encoded; constants are
    /// never silently truncated or extended.
    pub fn constant(value: impl Into<Literal>, width: BitWidth) -> Result<SignalRef, Error> {
        let name: Arc<str> = "const".into();
        let bits = value
            .into()
            .bits(width)
            .ok_or_else(|| Error::ValueExceedsWidth{signal: name.clone(), width})?;
        Self::new(name, width, SignalKind::Constant(bits))
    }

    /// Create a new wire signal, carrying the output of a logic node
    pub(crate) fn wire(name: impl Into<Arc<str>>, width: BitWidth) -> Result<SignalRef, Error> {
        Self::new(name, width, SignalKind::Wire)
    }

    fn new(
        name: impl Into<Arc<str>>,
        width: BitWidth,
        kind: SignalKind,
    ) -> Result<SignalRef, Error> {
        if width == 0 {
            return Err(Error::InvalidWidth("signal width"))
        }
        Ok(Arc::new(Self {name: name.into(), width, kind}))
    }

    /// Retrieve the width of the signal
    pub fn width(&self) -> BitWidth {
        self.width
    }

    /// Retrieve the kind of the signal
    pub fn kind(&self) -> &SignalKind {
        &self.kind
    }

    /// Check whether the signal is settled at the start of a cycle
    ///
    /// Synchronous memories require every port input to resolve to a
    /// register output, a primary input or a constant. The timing pass
    /// consults this predicate; this library merely records the data.
    pub fn is_synchronous_input(&self) -> bool {
        match self.kind {
            SignalKind::Wire => false,
            _                => true,
        }
    }
}

impl Named for Signal {
    type Name = Arc<str>;

    fn name(&self) -> &Self::Name {
        &self.name
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.width)
    }
}


/// The kind of a signal
#[derive(Clone, Debug, PartialEq)]
pub enum SignalKind {
    /// A primary input
    Input,
    /// The output of a register
    Register,
    /// A constant bit pattern
    Constant(BigUint),
    /// The output of a logic node
    Wire,
}

impl SignalKind {
    /// Retrieve the keyword associated with the signal kind
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Input       => "input",
            Self::Register    => "register",
            Self::Constant(_) => "const",
            Self::Wire        => "wire",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.keyword(), f)
    }
}


/// An address fed to a memory port
///
/// Addresses are symbolic during construction: they are signals. A bare
/// literal is accepted for convenience when indexing a read/write memory,
/// where it is promoted to a constant signal of the memory's address width.
/// Read-only memories reject bare literals, since reading a known content
/// at a known address is a constant, not a memory access.
#[derive(Clone, Debug, PartialEq)]
pub enum Address {
    /// A symbolic address
    Signal(SignalRef),
    /// A bare literal address
    Literal(Literal),
}

impl From<SignalRef> for Address {
    fn from(signal: SignalRef) -> Self {
        Self::Signal(signal)
    }
}

impl From<&SignalRef> for Address {
    fn from(signal: &SignalRef) -> Self {
        Self::Signal(signal.clone())
    }
}

impl From<Literal> for Address {
    fn from(literal: Literal) -> Self {
        Self::Literal(literal)
    }
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Self::Literal(value.into())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signal(signal)   => fmt::Display::fmt(signal, f),
            Self::Literal(literal) => fmt::Display::fmt(literal, f),
        }
    }
}
