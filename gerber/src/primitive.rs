//! Leaf-level lexical primitives shared by the parser.
//!
//! These are the pieces of the grammar that are awkward to hand-roll
//! correctly (signed/unsigned numeric literals, user- and system-defined
//! names) but don't carry any mode-sensitive state, so a small `nom`
//! combinator is a better fit here than the byte-scanner the command
//! dispatcher uses.

use nom::{
    branch::alt,
    character::complete::{anychar, char, digit0, digit1, one_of},
    combinator::{map, opt, recognize, verify},
    multi::{many0, many_m_n},
    sequence::{pair, preceded},
    IResult,
};

/// Parse a string of ASCII digits into an `i64`.
fn into_i64(x: &str) -> i64 {
    x.parse().unwrap()
}

/// Parse a non-negative integer.
pub(crate) fn unsigned_integer(input: &str) -> IResult<&str, i64> {
    map(digit1, into_i64)(input)
}

/// Parse a positive integer, tolerating leading zeros.
pub(crate) fn positive_integer(input: &str) -> IResult<&str, i64> {
    map(preceded(many0(char('0')), digit1), into_i64)(input)
}

fn into_f64(x: &str) -> f64 {
    x.parse().unwrap()
}

/// Parse a non-negative decimal real (aperture parameters, step distances).
pub(crate) fn unsigned_decimal(input: &str) -> IResult<&str, f64> {
    map(
        alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        )),
        into_f64,
    )(input)
}

/// Parse a signed decimal real (`LR`/`LS` values, negative aperture params).
pub(crate) fn decimal(input: &str) -> IResult<&str, f64> {
    map(pair(opt(one_of("+-")), unsigned_decimal), |(sign, val)| {
        if sign == Some('-') {
            -val
        } else {
            val
        }
    })(input)
}

/// First character of a user-defined name (everything but `.`).
fn name_fragment_first(input: &str) -> IResult<&str, char> {
    verify(anychar, |&c| c.is_alphabetic() || c == '_' || c == '$')(input)
}

/// Non-first character of a name fragment (includes `.`).
fn name_fragment_rest(input: &str) -> IResult<&str, char> {
    verify(anychar, |&c| {
        c.is_alphanumeric() || c == '.' || c == '_' || c == '$'
    })(input)
}

/// Parse a user- or macro-defined name (aperture macro names, user
/// attribute names). Unlike the full X2 grammar this does not enforce the
/// 127-character ceiling; malformed-but-long names are still round-tripped
/// rather than rejected, in keeping with the parser's never-fail policy.
pub(crate) fn name(input: &str) -> IResult<&str, &str> {
    recognize(pair(name_fragment_first, many0(name_fragment_rest)))(input)
}

/// Parse a `.`-prefixed standard or user-defined attribute name fragment.
pub(crate) fn system_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(char('.'), many_m_n(0, 126, name_fragment_rest)))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers() {
        assert_eq!(unsigned_integer("0"), Ok(("", 0)));
        assert_eq!(unsigned_integer("123"), Ok(("", 123)));
        assert!(unsigned_integer("-123").is_err());

        assert_eq!(positive_integer("007"), Ok(("", 7)));
    }

    #[test]
    fn decimals() {
        assert_eq!(unsigned_decimal("0.1"), Ok(("", 0.1)));
        assert_eq!(unsigned_decimal(".5"), Ok(("", 0.5)));
        assert_eq!(decimal("-0.1"), Ok(("", -0.1)));
        assert_eq!(decimal("1"), Ok(("", 1.0)));
    }

    #[test]
    fn names() {
        assert_eq!(name("Donut,"), Ok((",", "Donut")));
        assert_eq!(name("__$Some.01__Name"), Ok(("", "__$Some.01__Name")));
        assert!(name(".Nope").is_err());

        assert_eq!(system_name(".Part,x"), Ok((",x", ".Part")));
    }
}
