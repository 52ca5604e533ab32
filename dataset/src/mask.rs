//! Tag masks for selective element matching.
//!
//! A tag mask is a tag expression where any hexadecimal digit
//! may be replaced by an `x` wildcard,
//! such as `(0010,xxxx)` for the whole patient group
//! or `(60xx,3000)` for the repeating overlay data group.

use std::fmt;
use std::str::FromStr;

use dcmset_core::header::Tag;
use snafu::{ensure, OptionExt, ResultExt, Snafu};

/// An error returned when parsing an invalid tag mask expression.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[non_exhaustive]
pub enum ParseTagMaskError {
    /// Not enough mask components, expected `group,element`
    MissingMaskComponent,
    /// A mask component does not have exactly 4 characters
    #[snafu(display("mask component has an invalid length: got {} but must be 4", got))]
    InvalidComponentLength {
        /// the number of characters in the offending component
        got: usize,
    },
    /// invalid hexadecimal digit in mask component
    InvalidComponent {
        /// the underlying integer parser error
        source: std::num::ParseIntError,
    },
}

/// A mask over the packed 32-bit form of an attribute tag
/// (`group << 16 | element`).
///
/// A tag matches when its digits agree with the mask expression
/// at every position which is not a wildcard.
///
/// # Example
///
/// ```
/// # use dcmset_core::Tag;
/// # use dcmset_dataset::TagMask;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mask: TagMask = "(0010,xxxx)".parse()?;
/// assert!(mask.matches(Tag(0x0010, 0x0010)));
/// assert!(mask.matches(Tag(0x0010, 0x4000)));
/// assert!(!mask.matches(Tag(0x0008, 0x0010)));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TagMask {
    value: u32,
    mask: u32,
}

impl TagMask {
    /// Create a mask from its packed comparison value and digit mask.
    /// Wildcard positions have their nibble zeroed in `mask`.
    pub fn new(value: u32, mask: u32) -> Self {
        TagMask {
            value: value & mask,
            mask,
        }
    }

    /// Check whether the given tag matches this mask.
    pub fn matches(&self, tag: Tag) -> bool {
        let packed = (u32::from(tag.group()) << 16) | u32::from(tag.element());
        packed & self.mask == self.value
    }
}

fn parse_component(part: &str) -> Result<(u32, u32), ParseTagMaskError> {
    ensure!(
        part.len() == 4,
        InvalidComponentLengthSnafu { got: part.len() }
    );
    let mut value = 0_u32;
    let mut mask = 0_u32;
    for c in part.chars() {
        value <<= 4;
        mask <<= 4;
        if c == 'x' || c == 'X' {
            continue;
        }
        let digit = u32::from_str_radix(&c.to_string(), 16).context(InvalidComponentSnafu)?;
        value |= digit;
        mask |= 0xF;
    }
    Ok((value, mask))
}

/// Parse a tag mask from a text expression.
/// The expected syntax is the tag syntax `GGGG,EEEE`,
/// optionally surrounded by parentheses,
/// where any digit may be the wildcard `x` (or `X`).
impl FromStr for TagMask {
    type Err = ParseTagMaskError;

    fn from_str(mut s: &str) -> Result<Self, Self::Err> {
        if s.starts_with('(') && s.ends_with(')') {
            s = &s[1..s.len() - 1];
        }
        let mut parts = s.split(',');
        let group = parts.next().context(MissingMaskComponentSnafu)?;
        let elem = parts.next().context(MissingMaskComponentSnafu)?;
        let (group_value, group_mask) = parse_component(group)?;
        let (elem_value, elem_mask) = parse_component(elem)?;
        Ok(TagMask::new(
            (group_value << 16) | elem_value,
            (group_mask << 16) | elem_mask,
        ))
    }
}

impl fmt::Display for TagMask {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("(")?;
        for i in (0..8).rev() {
            let nibble_mask = (self.mask >> (i * 4)) & 0xF;
            if nibble_mask == 0 {
                f.write_str("x")?;
            } else {
                write!(f, "{:X}", (self.value >> (i * 4)) & 0xF)?;
            }
            if i == 4 {
                f.write_str(",")?;
            }
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fully_specified_mask_matches_one_tag() {
        let mask: TagMask = "0010,0010".parse().unwrap();
        assert!(mask.matches(Tag(0x0010, 0x0010)));
        assert!(!mask.matches(Tag(0x0010, 0x0020)));
    }

    #[test]
    fn wildcards_match_any_digit() {
        let mask: TagMask = "(60xx,3000)".parse().unwrap();
        assert!(mask.matches(Tag(0x6000, 0x3000)));
        assert!(mask.matches(Tag(0x60FE, 0x3000)));
        assert!(!mask.matches(Tag(0x6100, 0x3000)));
        assert!(!mask.matches(Tag(0x6000, 0x3001)));
    }

    #[test]
    fn uppercase_wildcards_are_accepted() {
        let mask: TagMask = "0010,XXXX".parse().unwrap();
        assert!(mask.matches(Tag(0x0010, 0x4000)));
    }

    #[test]
    fn bad_expressions_are_rejected() {
        assert!("0010".parse::<TagMask>().is_err());
        assert!("010,0010".parse::<TagMask>().is_err());
        assert!("0z10,0010".parse::<TagMask>().is_err());
    }

    #[test]
    fn display_round_trip() {
        let mask: TagMask = "(60xx,3000)".parse().unwrap();
        assert_eq!(mask.to_string(), "(60xx,3000)");
    }
}
