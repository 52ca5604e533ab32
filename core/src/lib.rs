#![crate_type = "lib"]
#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    missing_docs,
    unused_qualifications,
    unused_import_braces
)]

//! This is the core library of dcmset,
//! containing the data structures and traits
//! which make up the in-memory DICOM data model.
//!
//! The current structure of this crate is as follows:
//!
//! - [`header`] comprises the basic data types for DICOM data elements,
//!   including the attribute tag and the value representation.
//! - [`dictionary`] describes the common behavior of data dictionaries,
//!   which translate attribute names and/or tags to a dictionary entry
//!   containing the attribute's allowed value representations
//!   and its value multiplicity.
//! - [`value`] holds definitions for values in standard DICOM elements,
//!   with the awareness of multiplicity, representation,
//!   and the possible presence of sequences.
//!
//! [`dictionary`]: ./dictionary/index.html
//! [`header`]: ./header/index.html
//! [`value`]: ./value/index.html

pub mod dictionary;
pub mod header;
pub mod value;

pub use dictionary::{DataDictionary, DictionaryEntry, VM};
pub use header::{DataElement, Header, Tag, VR};
pub use value::{PrimitiveValue, Value as DicomValue};

// re-export crates that are part of the public API
pub use chrono;
pub use smallvec;
