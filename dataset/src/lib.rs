#![crate_type = "lib"]
#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    missing_docs,
    unused_qualifications,
    unused_import_braces
)]

//! This crate contains a high-level abstraction for an in-memory
//! DICOM data set: a mutable, tag-ordered collection of data elements
//! with support for nested data set sequences.
//!
//! The main type here is [`InMemDataSet`],
//! which owns all of its elements in memory.
//! A data set can be created empty or from a sequence of elements,
//! and provides the full assortment of operations over them:
//!
//! - tag-keyed insertion with replace semantics,
//!   removal, and iteration in ascending tag order;
//! - typed value retrieval with conversion and default fallbacks;
//! - value insertion with or without an explicit value representation,
//!   including textual parsing and multiplicity splitting;
//! - private attribute management through creator-reserved blocks;
//! - transfer syntax bookkeeping,
//!   propagated through every nested data set;
//! - selective duplication of elements into another data set,
//!   by explicit tag list or by tag mask;
//! - structured report content accessors
//!   (coded concepts, measured values, SOP references).
//!
//! # Example
//!
//! ```
//! use dcmset_core::{PrimitiveValue, Tag, VR};
//! use dcmset_dataset::InMemDataSet;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut ds = InMemDataSet::new_empty();
//! ds.put_value_with_vr(
//!     Tag(0x0010, 0x0010),
//!     VR::PN,
//!     PrimitiveValue::from("Doe^John"),
//! )?;
//!
//! assert_eq!(ds.string(Tag(0x0010, 0x0010))?, "Doe^John");
//! # Ok(())
//! # }
//! ```

use dcmset_core::header::Tag;
use dcmset_core::value::ConvertValueError;
use dcmset_core::VR;
use snafu::Snafu;

pub mod convert;
pub mod mask;
pub mod mem;
pub mod private;
pub mod sr;

pub use crate::mask::TagMask;
pub use crate::mem::{InMemDataSet, MemElement};
pub use crate::private::PrivateTagError;
pub use crate::sr::{CodeItem, MeasuredValue, ReferencedSop};

/// The transfer syntax UID assumed by a newly created data set:
/// Explicit VR Little Endian.
pub const DEFAULT_TRANSFER_SYNTAX: &str = "1.2.840.10008.1.2.1";

/// An error which occurs when fetching a data element
/// which is not present in the data set.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[non_exhaustive]
pub enum AccessError {
    /// No data element exists at the given tag
    #[snafu(display("no such data element {}", tag))]
    NoSuchDataElementTag {
        /// the tag looked up
        tag: Tag,
    },
}

/// An error which occurs when reading a value from a data set,
/// covering element lookup, indexing, and value conversion.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[non_exhaustive]
pub enum ReadValueError {
    /// Could not find the data element
    #[snafu(context(false))]
    Access {
        /// the underlying element lookup error
        source: AccessError,
    },
    /// The requested value index exceeds the element's multiplicity
    #[snafu(display(
        "value index {} out of range for {} (multiplicity is {})",
        index,
        tag,
        multiplicity
    ))]
    IndexOutOfRange {
        /// the tag of the element
        tag: Tag,
        /// the requested zero-based index
        index: usize,
        /// the element's multiplicity
        multiplicity: usize,
    },
    /// The value could not be converted to the requested type
    #[snafu(display("could not convert value of {}", tag))]
    ConvertValue {
        /// the tag of the element
        tag: Tag,
        /// the underlying conversion error
        source: ConvertValueError,
    },
    /// The element does not hold a data set sequence
    #[snafu(display("element {} is not a data set sequence", tag))]
    NotASequence {
        /// the tag of the element
        tag: Tag,
    },
}

/// An error which occurs when building a data element from a value,
/// covering dictionary resolution, value representation dispatch,
/// and textual token parsing.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[non_exhaustive]
pub enum BuildValueError {
    /// The attribute is not registered in the data dictionary,
    /// so no value representation could be inferred
    #[snafu(display("attribute {} is not in the dictionary", tag))]
    UnknownAttribute {
        /// the tag looked up
        tag: Tag,
    },
    /// The value variant cannot be stored or parsed
    /// under the given value representation
    #[snafu(display("no conversion rule from a {} value to VR {}", value_type, vr))]
    UnsupportedConversion {
        /// the target value representation
        vr: VR,
        /// the variant of the supplied value
        value_type: dcmset_core::value::ValueType,
    },
    /// A textual token could not be parsed as an integer
    #[snafu(display("could not parse token `{}` as an integer", token))]
    ParseIntegerToken {
        /// the offending token
        token: String,
        /// the underlying integer parser error
        source: std::num::ParseIntError,
    },
    /// A textual token could not be parsed as a floating point number
    #[snafu(display("could not parse token `{}` as a number", token))]
    ParseFloatToken {
        /// the offending token
        token: String,
        /// the underlying number parser error
        source: std::num::ParseFloatError,
    },
    /// A textual token could not be parsed as an attribute tag
    #[snafu(display("could not parse token `{}` as an attribute tag", token))]
    ParseTagToken {
        /// the offending token
        token: String,
        /// the underlying tag parser error
        source: dcmset_core::header::ParseTagError,
    },
    /// A date or time range was requested
    /// under a value representation which does not admit one
    #[snafu(display("range values require VR DA, TM or DT, got {}", vr))]
    UnsupportedRange {
        /// the requested value representation
        vr: VR,
    },
}
