// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Testing utilities

use std::fmt;

use crate::signal::{BitWidth, Signal, SignalRef};


/// Initialise logging for a test
///
/// Tests calling into the library may do so after calling this function,
/// so that `RUST_LOG` controls the library's trace output under test.
pub fn logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}


/// Shorthand for creating a primary input signal in tests
pub fn input(name: &str, width: BitWidth) -> SignalRef {
    Signal::input(name, width).expect("could not create input signal")
}


/// Utility type for property-based tests involving an equivalence
///
/// Many properties boil down to two values being equal, e.g. the input and
/// output of a print-then-parse pseudo-identity. `Equivalence` is a
/// `quickcheck::Testable` expressing exactly that, with both values
/// included in the failure report when they differ.
#[derive(Clone, Debug)]
pub struct Equivalence<T>(pub T, pub T)
where
    T: fmt::Debug + PartialEq + 'static;

impl<T> Equivalence<T>
where
    T: fmt::Debug + PartialEq + 'static,
{
    /// Construct a value expressing the equivalence of the given values
    pub fn of(left: T, right: T) -> Self {
        Self(left, right)
    }
}

impl<T> quickcheck::Testable for Equivalence<T>
where
    T: fmt::Debug + PartialEq + 'static,
{
    fn result(&self, _: &mut quickcheck::Gen) -> quickcheck::TestResult {
        use quickcheck::TestResult;
        if self.0 == self.1 {
            TestResult::passed()
        } else {
            TestResult::error(format!(
                "Missmatch! Left: '{:?}', Right: '{:?}'",
                self.0, self.1
            ))
        }
    }
}


/// Utility type for generating identifiers for tests
#[derive(Clone, Debug, PartialEq)]
pub struct Identifier {
    data: String,
}

impl Identifier {
    /// Retrieve the identifier as a `&str`
    pub fn as_str(&self) -> &str {
        self.data.as_str()
    }
}

impl From<&str> for Identifier {
    fn from(ident: &str) -> Self {
        Self {data: ident.to_string()}
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.data, f)
    }
}

impl quickcheck::Arbitrary for Identifier {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        const HEAD: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_";
        const TAIL: &[u8] =
            b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_";

        let mut data = String::new();
        data.push(*g.choose(HEAD).unwrap() as char);
        (0..usize::arbitrary(g) % 12).for_each(|_| data.push(*g.choose(TAIL).unwrap() as char));
        Self {data}
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let data = self.data.clone();
        Box::new((1..data.len()).rev().map(move |l| Self {data: data[..l].to_string()}))
    }
}
