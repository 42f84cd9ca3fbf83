// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Read-only memories
//!
//! A ROM is a memory whose write-port capacity is fixed at zero and whose
//! data comes from declared contents instead of write ports. Contents are
//! resolved per access at simulation time; at construction time addresses
//! are symbolic and the contents are never consulted.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use crate::error::Error;
use crate::netlist::MemoryId;
use crate::signal::BitWidth;
use crate::value::Literal;

use super::MemoryConfig;


/// Configuration of a read-only memory
///
/// This wraps an ordinary [MemoryConfig] whose write-port capacity is
/// forced to zero, together with the contents and the two ROM-specific
/// policies: padding unmapped addresses with zero, and transparently
/// duplicating the whole ROM when its read-port capacity is exhausted.
#[derive(Clone, Debug)]
pub struct RomConfig {
    pub(crate) memory: MemoryConfig,
    pub(crate) contents: Contents,
    pub(crate) pad_missing_with_zero: bool,
    pub(crate) duplicate_on_overflow: bool,
}

impl RomConfig {
    /// Create a new configuration
    pub fn new(
        bit_width: BitWidth,
        address_width: BitWidth,
        contents: impl Into<Contents>,
    ) -> Result<Self, Error> {
        Ok(Self {
            memory: MemoryConfig::new(bit_width, address_width)?.with_max_write_ports(Some(0)),
            contents: contents.into(),
            pad_missing_with_zero: false,
            duplicate_on_overflow: false,
        })
    }

    /// Request an explicit name
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {memory: self.memory.with_name(name), ..self}
    }

    /// Mark the memory as asynchronous
    pub fn asynchronous(self) -> Self {
        Self {memory: self.memory.asynchronous(), ..self}
    }

    /// Set the read-port capacity, `None` meaning unbounded
    pub fn with_max_read_ports(self, limit: Option<usize>) -> Self {
        Self {memory: self.memory.with_max_read_ports(limit), ..self}
    }

    /// Resolve unmapped addresses to zero instead of failing
    pub fn pad_missing_with_zero(self) -> Self {
        Self {pad_missing_with_zero: true, ..self}
    }

    /// Duplicate the ROM instead of failing when out of read ports
    ///
    /// With this policy a single declared ROM may fan out into several
    /// physical instances sharing the same contents, each with its own
    /// read-port capacity. Callers needing a hard cap on instances must
    /// leave the policy off and handle the capacity error instead.
    pub fn duplicate_on_overflow(self) -> Self {
        Self {duplicate_on_overflow: true, ..self}
    }
}


/// Contents of a read-only memory
///
/// Contents map addresses to values. They may be given as a total
/// function, as a dense table indexed from address zero, or as a sparse
/// map. Tables and maps may leave addresses unmapped; whether that is an
/// error or reads as zero is the declaring ROM's padding policy.
#[derive(Clone)]
pub enum Contents {
    /// A function computing the value for each address
    Function(Arc<dyn Fn(&BigUint) -> Result<Literal, String> + Send + Sync>),
    /// A dense table starting at address zero
    Table(Vec<Literal>),
    /// A sparse map from address to value
    Map(BTreeMap<BigUint, Literal>),
}

impl Contents {
    /// Create contents computed by a function
    ///
    /// The function must be deterministic and side-effect free: it is
    /// re-invoked for every single access, and the simulator relies on a
    /// fixed address always resolving to the same value.
    pub fn function(
        f: impl Fn(&BigUint) -> Result<Literal, String> + Send + Sync + 'static,
    ) -> Self {
        Self::Function(Arc::new(f))
    }

    /// Create contents from a dense table
    pub fn table<V: Into<Literal>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::Table(values.into_iter().map(Into::into).collect())
    }

    /// Create contents from sparse address/value pairs
    pub fn map<A, V>(entries: impl IntoIterator<Item = (A, V)>) -> Self
    where
        A: Into<BigUint>,
        V: Into<Literal>,
    {
        Self::Map(entries.into_iter().map(|(a, v)| (a.into(), v.into())).collect())
    }

    /// Parse contents from a memory image
    ///
    /// The image format is the conventional hex one: whitespace-separated
    /// hex words assigned to consecutive addresses, `@` directives setting
    /// the next address, and `//` comments. The result is sparse.
    pub fn parse_image(input: &str) -> Result<Self, Error> {
        super::parsers::image(input).map(Self::Map)
    }

    /// Look up the given address
    fn lookup(&self, address: &BigUint) -> Result<Option<Literal>, Error> {
        match self {
            Self::Function(f) => f(address).map(Some).map_err(Error::RomEvaluationError),
            Self::Table(t)    => Ok(address.to_usize().and_then(|a| t.get(a)).cloned()),
            Self::Map(m)      => Ok(m.get(address).cloned()),
        }
    }
}

impl<T: Into<Literal>> From<Vec<T>> for Contents {
    fn from(values: Vec<T>) -> Self {
        Self::table(values)
    }
}

impl fmt::Debug for Contents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(_) => f.write_str("Contents::Function"),
            Self::Table(t)    => f.debug_tuple("Contents::Table").field(t).finish(),
            Self::Map(m)      => f.debug_tuple("Contents::Map").field(m).finish(),
        }
    }
}

impl PartialEq for Contents {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Function(l), Self::Function(r)) => Arc::ptr_eq(l, r),
            (Self::Table(l),    Self::Table(r))    => l == r,
            (Self::Map(l),      Self::Map(r))      => l == r,
            _ => false,
        }
    }
}

impl fmt::Display for Contents {
    /// Render the contents in the memory-image format
    ///
    /// Function contents have no finite rendering and display as a
    /// comment. Values that are not plain unsigned literals are rendered
    /// in their literal form and will not survive a round trip.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn word(f: &mut fmt::Formatter<'_>, value: &Literal) -> fmt::Result {
            match value {
                Literal::Unsigned(v) => writeln!(f, "{:x}", v),
                other                => writeln!(f, "{}", other),
            }
        }

        match self {
            Self::Function(_) => writeln!(f, "// function contents"),
            Self::Table(t)    => t.iter().try_for_each(|v| word(f, v)),
            Self::Map(m)      => m.iter().try_for_each(|(a, v)| {
                write!(f, "@{:x} ", a)?;
                word(f, v)
            }),
        }
    }
}

#[cfg(test)]
impl Arbitrary for Contents {
    fn arbitrary(g: &mut Gen) -> Self {
        if bool::arbitrary(g) {
            Self::table(Vec::<u64>::arbitrary(g))
        } else {
            Self::map(
                Vec::<(u64, u64)>::arbitrary(g)
                    .into_iter()
                    .map(|(a, v)| (BigUint::from(a), v)),
            )
        }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        match self {
            Self::Table(t) => Box::new(t.clone().shrink().map(Self::Table)),
            // BigUint keys have no shrinker; dropping entries one by one
            // still gives quickcheck something to work with.
            Self::Map(m) => {
                let shrunk: Vec<_> = m
                    .keys()
                    .map(|k| {
                        let mut m = m.clone();
                        m.remove(k);
                        Self::Map(m)
                    })
                    .collect();
                Box::new(shrunk.into_iter())
            },
            _ => Box::new(std::iter::empty()),
        }
    }
}


/// Read-only payload of a memory
///
/// The payload bundles the contents with the resolution policies and the
/// copy pool. Widths are recorded alongside so that resolution is
/// self-contained; they always equal the owning memory's widths.
#[derive(Clone, Debug)]
pub struct Rom {
    name: Arc<str>,
    bit_width: BitWidth,
    address_width: BitWidth,
    contents: Contents,
    pad_missing_with_zero: bool,
    duplicate_on_overflow: bool,
    pool: Pool,
}

impl Rom {
    pub(crate) fn new(
        name: Arc<str>,
        bit_width: BitWidth,
        address_width: BitWidth,
        contents: Contents,
        pad_missing_with_zero: bool,
        duplicate_on_overflow: bool,
        declared_as: MemoryId,
    ) -> Self {
        Self {
            name,
            bit_width,
            address_width,
            contents,
            pad_missing_with_zero,
            duplicate_on_overflow,
            pool: Pool {active: declared_as, copies: Default::default()},
        }
    }

    /// Retrieve the contents
    pub fn contents(&self) -> &Contents {
        &self.contents
    }

    /// Check whether unmapped addresses resolve to zero
    pub fn pads_missing_with_zero(&self) -> bool {
        self.pad_missing_with_zero
    }

    /// Check whether read-port overflow spawns a twin copy
    pub fn duplicates_on_overflow(&self) -> bool {
        self.duplicate_on_overflow
    }

    /// Retrieve the copy pool
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub(crate) fn pool_mut(&mut self) -> &mut Pool {
        &mut self.pool
    }

    /// Resolve the contents at a concrete address
    ///
    /// This is invoked by the simulator, once per access; during
    /// construction addresses are symbolic and never resolved. The address
    /// must be a plain unsigned value within the address space. The
    /// resolved value must fit the element width exactly.
    pub fn resolve(&self, address: &Literal) -> Result<BigUint, Error> {
        let address = match address {
            Literal::Unsigned(a) => a,
            _ => return Err(Error::InvalidAddressType),
        };
        if address.bits() > self.address_width.into() {
            return Err(Error::InvalidAddress{
                address: address.clone(),
                address_width: self.address_width,
            })
        }

        let value = match self.contents.lookup(address)? {
            Some(value)                             => value,
            None if self.pad_missing_with_zero      => return Ok(BigUint::zero()),
            None => return Err(Error::RomAddressUnmapped(address.clone())),
        };

        value.bits(self.bit_width).ok_or_else(|| Error::InvalidRomValueType{
            memory: self.name.clone(),
            address: address.clone(),
        })
    }
}


/// Pool of physical copies of a declared ROM
///
/// The pool belongs to the originally declared ROM and records which
/// physical instance currently receives new read ports, along with every
/// twin spawned so far. Without the duplication policy the pool never
/// grows and the active copy is the declared ROM itself.
#[derive(Clone, Debug)]
pub struct Pool {
    active: MemoryId,
    copies: Vec<MemoryId>,
}

impl Pool {
    /// Retrieve the copy currently receiving new read ports
    pub fn active(&self) -> MemoryId {
        self.active
    }

    /// Retrieve the spawned copies, oldest first
    pub fn copies(&self) -> impl Iterator<Item = MemoryId> + '_ {
        self.copies.iter().copied()
    }

    pub(crate) fn activate(&mut self, copy: MemoryId) {
        self.copies.push(copy);
        self.active = copy;
    }
}
