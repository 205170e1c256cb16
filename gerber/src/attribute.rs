//! Attribute names used by `TF`, `TA`, and `TO` (X2 attribute extension).
//!
//! The three attribute prefixes share one namespacing rule: a name is
//! either one of a small set of standard, dotted names or a user-defined
//! one. [`AttributeName`] recognizes both, falling back to
//! [`AttributeName::UserDefined`] for anything it doesn't know.

use std::fmt;

use crate::primitive::{name, system_name};
use nom::{branch::alt, bytes::complete::tag, combinator::map, combinator::value, IResult};

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum AttributeName {
    Part,
    FileFunction,
    FilePolarity,
    SameCoordinates,
    CreationDate,
    GenerationSoftware,
    ProjectId,
    Md5,
    /// A dot-prefixed name that isn't one of the standard names above.
    UnknownStandard(String),
    /// A name with no leading dot.
    UserDefined(String),
}

impl AttributeName {
    pub(crate) fn parse(input: &str) -> IResult<&str, Self> {
        alt((
            value(Self::Part, tag(".Part")),
            value(Self::FileFunction, tag(".FileFunction")),
            value(Self::FilePolarity, tag(".FilePolarity")),
            value(Self::SameCoordinates, tag(".SameCoordinates")),
            value(Self::CreationDate, tag(".CreationDate")),
            value(Self::GenerationSoftware, tag(".GenerationSoftware")),
            value(Self::ProjectId, tag(".ProjectId")),
            value(Self::Md5, tag(".MD5")),
            map(system_name, |s: &str| Self::UnknownStandard(s.to_string())),
            map(name, |s: &str| Self::UserDefined(s.to_string())),
        ))(input)
    }
}

impl fmt::Display for AttributeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Part => write!(f, ".Part"),
            Self::FileFunction => write!(f, ".FileFunction"),
            Self::FilePolarity => write!(f, ".FilePolarity"),
            Self::SameCoordinates => write!(f, ".SameCoordinates"),
            Self::CreationDate => write!(f, ".CreationDate"),
            Self::GenerationSoftware => write!(f, ".GenerationSoftware"),
            Self::ProjectId => write!(f, ".ProjectId"),
            Self::Md5 => write!(f, ".MD5"),
            Self::UnknownStandard(s) => write!(f, "{s}"),
            Self::UserDefined(s) => write!(f, "{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_names() {
        assert_eq!(
            AttributeName::parse(".GenerationSoftware"),
            Ok(("", AttributeName::GenerationSoftware))
        );
        assert_eq!(
            AttributeName::parse(".FileFunction"),
            Ok(("", AttributeName::FileFunction))
        );
    }

    #[test]
    fn user_defined_name() {
        assert_eq!(
            AttributeName::parse("MyAttribute,value"),
            Ok((",value", AttributeName::UserDefined("MyAttribute".into())))
        );
    }

    #[test]
    fn unknown_standard_name() {
        assert_eq!(
            AttributeName::parse(".NotARealOne,x"),
            Ok((",x", AttributeName::UnknownStandard(".NotARealOne".into())))
        );
    }
}
