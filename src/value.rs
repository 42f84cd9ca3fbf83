// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Literal values

use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};

#[cfg(test)]
use num_traits::ToPrimitive;

use crate::signal::BitWidth;


/// A literal value
///
/// Literals appear wherever concrete numbers meet the netlist: constant
/// signals, read-only memory contents and per-cycle valuations. A literal is
/// either a plain non-negative integer, an explicitly signed integer, or a
/// wrapper carrying both a value and the exact width it was defined with.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    /// A plain non-negative integer
    Unsigned(BigUint),
    /// An explicitly signed integer
    Signed(BigInt),
    /// An explicitly sized (and possibly signed) integer
    Sized{value: BigInt, width: BitWidth},
}

impl Literal {
    /// Create an explicitly sized literal
    pub fn sized(value: impl Into<BigInt>, width: BitWidth) -> Self {
        Self::Sized{value: value.into(), width}
    }

    /// Retrieve the width the literal was defined with, if any
    pub fn explicit_width(&self) -> Option<BitWidth> {
        match self {
            Self::Sized{width, ..} => Some(*width),
            _                      => None,
        }
    }

    /// Encode the literal as a bit pattern of the given width
    ///
    /// Signed values are encoded as two's complement. This function returns
    /// `None` if the value does not fit the requested width, or if the
    /// literal was defined with an explicit width other than the requested
    /// one. No truncation or extension is ever performed silently.
    pub fn bits(&self, width: BitWidth) -> Option<BigUint> {
        if width == 0 {
            return None
        }

        match self {
            Self::Unsigned(v) => if v.bits() <= width.into() {
                Some(v.clone())
            } else {
                None
            },
            Self::Signed(v) => {
                let bound = BigInt::one() << usize::from(width - 1);
                if -&bound <= *v && *v < bound {
                    Some(wrap(v, width))
                } else {
                    None
                }
            },
            Self::Sized{value, width: w} => if *w == width && fits(value, width) {
                Some(wrap(value, width))
            } else {
                None
            },
        }
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Self::Unsigned(if value { BigUint::one() } else { BigUint::zero() })
    }
}

impl From<u8> for Literal {
    fn from(value: u8) -> Self {
        Self::Unsigned(value.into())
    }
}

impl From<u32> for Literal {
    fn from(value: u32) -> Self {
        Self::Unsigned(value.into())
    }
}

impl From<u64> for Literal {
    fn from(value: u64) -> Self {
        Self::Unsigned(value.into())
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        if value < 0 {
            Self::Signed(value.into())
        } else {
            Self::Unsigned((value as u64).into())
        }
    }
}

impl From<BigUint> for Literal {
    fn from(value: BigUint) -> Self {
        Self::Unsigned(value)
    }
}

impl From<BigInt> for Literal {
    fn from(value: BigInt) -> Self {
        if value.sign() == Sign::Minus {
            Self::Signed(value)
        } else {
            Self::Unsigned(value.magnitude().clone())
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsigned(v)         => fmt::Display::fmt(v, f),
            Self::Signed(v)           => fmt::Display::fmt(v, f),
            Self::Sized{value, width} => write!(f, "{}:{}", value, width),
        }
    }
}

#[cfg(test)]
impl Arbitrary for Literal {
    fn arbitrary(g: &mut Gen) -> Self {
        let opts: [&dyn Fn(&mut Gen) -> Self; 3] = [
            &|g| Self::Unsigned(u64::arbitrary(g).into()),
            &|g| Self::Signed(i64::arbitrary(g).into()),
            &|g| Self::Sized{
                value: i32::arbitrary(g).into(),
                width: BitWidth::arbitrary(g).saturating_add(33),
            },
        ];
        g.choose(&opts).unwrap()(g)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        match self {
            Self::Unsigned(v) => {
                let v = v.to_u64().unwrap_or_default();
                Box::new(v.shrink().map(|v| Self::Unsigned(v.into())))
            },
            Self::Signed(v) => {
                let v = v.to_i64().unwrap_or_default();
                Box::new(v.shrink().map(|v| Self::Signed(v.into())))
            },
            Self::Sized{value, width} => {
                let w = *width;
                let v = value.to_i32().unwrap_or_default();
                Box::new(v.shrink().map(move |v| Self::Sized{value: v.into(), width: w}))
            },
        }
    }
}


/// Check whether the value fits the given width, two's complement for negatives
fn fits(value: &BigInt, width: BitWidth) -> bool {
    match value.sign() {
        Sign::Minus => {
            let bound = BigInt::one() << usize::from(width - 1);
            -bound <= *value
        },
        _ => value.magnitude().bits() <= width.into(),
    }
}


/// Encode the value modulo `2^width`
fn wrap(value: &BigInt, width: BitWidth) -> BigUint {
    let modulus = BigUint::one() << usize::from(width);
    let magnitude = value.magnitude() % &modulus;
    match value.sign() {
        Sign::Minus if !magnitude.is_zero() => modulus - magnitude,
        _                                   => magnitude,
    }
}
