// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Parsers related to memory contents

use std::collections::BTreeMap;

use nom::Finish;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while, take_while1};
use nom::combinator::{all_consuming, map, map_opt, value};
use nom::multi::many0;
use nom::sequence::{preceded, tuple};

use num_bigint::BigUint;
use num_traits::Zero;

use crate::value::Literal;


/// Result type for our (sub)parsers
pub type IResult<'i, O> = nom::IResult<&'i str, O, Error<'i>>;


/// Error type for our (sub)parsers
pub type Error<'i> = nom::error::VerboseError<&'i str>;


/// Parse a hex memory image into sparse contents
///
/// The image is a sequence of whitespace-separated hex words, assigned to
/// consecutive addresses starting at zero. An `@` directive sets the
/// address the next word is assigned to. `//` starts a comment reaching to
/// the end of the line.
pub(crate) fn image(input: &str) -> Result<BTreeMap<BigUint, Literal>, crate::error::Error> {
    let (_, tokens) = all_consuming(tokens)(input)
        .finish()
        .map_err(|e| crate::error::Error::ImageSyntax(nom::error::convert_error(input, e)))?;

    let mut res: BTreeMap<BigUint, Literal> = Default::default();
    let mut address = BigUint::zero();
    for token in tokens {
        match token {
            Token::At(a)   => address = a,
            Token::Word(v) => {
                res.insert(address.clone(), Literal::Unsigned(v));
                address += 1u8;
            },
        }
    }
    Ok(res)
}


/// A single token of a memory image
enum Token {
    At(BigUint),
    Word(BigUint),
}


fn tokens(input: &str) -> IResult<Vec<Token>> {
    map(tuple((many0(preceded(junk, token)), junk)), |(tokens, _)| tokens)(input)
}


fn token(input: &str) -> IResult<Token> {
    alt((
        map(preceded(tag("@"), hex), Token::At),
        map(hex, Token::Word),
    ))(input)
}


/// Parse a hex numeral
fn hex(input: &str) -> IResult<BigUint> {
    map_opt(
        take_while1(|c: char| c.is_ascii_hexdigit()),
        |s: &str| BigUint::parse_bytes(s.as_bytes(), 16),
    )(input)
}


/// Consume any amount of whitespace and comments
fn junk(input: &str) -> IResult<()> {
    value(
        (),
        many0(alt((
            value((), take_while1(char::is_whitespace)),
            value((), tuple((tag("//"), take_while(|c| c != '\n')))),
        ))),
    )(input)
}
