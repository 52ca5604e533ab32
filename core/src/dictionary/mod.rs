//! This module contains the concept of a DICOM data dictionary,
//! which maps attribute tags and keyword aliases
//! to their value representation and multiplicity constraints.
//!
//! A data dictionary is always taken as an explicit handle,
//! so that applications can choose to use the built-in
//! [`StandardDataDictionary`], a [`StubDictionary`],
//! or their own implementation.

pub mod entries;
pub mod stub;

use crate::header::{Tag, VR};
use std::fmt;

pub use self::entries::StandardDataDictionary;
pub use self::stub::StubDictionary;

/// The value multiplicity constraint of an attribute:
/// the number of individual values it may carry.
///
/// A `max` of `None` stands for an unbounded multiplicity (`1-n`).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VM {
    /// The minimum number of values.
    pub min: u32,
    /// The maximum number of values, or `None` if unbounded.
    pub max: Option<u32>,
}

impl VM {
    /// A multiplicity of exactly `n` values.
    pub const fn fixed(n: u32) -> Self {
        VM {
            min: n,
            max: Some(n),
        }
    }

    /// A multiplicity between `min` and `max` values.
    pub const fn bounded(min: u32, max: u32) -> Self {
        VM {
            min,
            max: Some(max),
        }
    }

    /// A multiplicity of at least `min` values, with no upper bound.
    pub const fn unbounded(min: u32) -> Self {
        VM { min, max: None }
    }

    /// Whether the attribute admits more than one value.
    /// Multi-valued attributes have their string input
    /// split by backslash on insertion.
    pub fn is_multi(&self) -> bool {
        self.max != Some(1)
    }
}

impl fmt::Display for VM {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.min, self.max) {
            (min, Some(max)) if min == max => write!(f, "{}", min),
            (min, Some(max)) => write!(f, "{}-{}", min, max),
            (min, None) => write!(f, "{}-n", min),
        }
    }
}

/// An entry in a data dictionary:
/// the attribute's tag, keyword alias,
/// allowed value representations and multiplicity.
pub trait DictionaryEntry {
    /// The attribute tag.
    fn tag(&self) -> Tag;

    /// The keyword alias of the attribute, in `PascalCase`
    /// (e.g. `PatientName`).
    fn alias(&self) -> &str;

    /// The ordered set of allowed value representations.
    /// The first one is the preferred representation
    /// when the attribute is inserted without an explicit VR.
    fn vrs(&self) -> &[VR];

    /// The value multiplicity constraint.
    fn vm(&self) -> VM;
}

/// A data dictionary entry with a static lifetime,
/// as used by dictionaries built into the program.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DictionaryEntryRef<'a> {
    /// The attribute tag
    pub tag: Tag,
    /// The keyword alias of the attribute
    pub alias: &'a str,
    /// The allowed value representations, preferred first
    pub vrs: &'a [VR],
    /// The value multiplicity constraint
    pub vm: VM,
}

impl<'a> DictionaryEntry for DictionaryEntryRef<'a> {
    fn tag(&self) -> Tag {
        self.tag
    }
    fn alias(&self) -> &str {
        self.alias
    }
    fn vrs(&self) -> &[VR] {
        self.vrs
    }
    fn vm(&self) -> VM {
        self.vm
    }
}

/// A data dictionary entry which owns its data,
/// as used by dictionaries loaded at run time.
#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryEntryBuf {
    /// The attribute tag
    pub tag: Tag,
    /// The keyword alias of the attribute
    pub alias: String,
    /// The allowed value representations, preferred first
    pub vrs: Vec<VR>,
    /// The value multiplicity constraint
    pub vm: VM,
}

impl DictionaryEntry for DictionaryEntryBuf {
    fn tag(&self) -> Tag {
        self.tag
    }
    fn alias(&self) -> &str {
        &self.alias
    }
    fn vrs(&self) -> &[VR] {
        &self.vrs
    }
    fn vm(&self) -> VM {
        self.vm
    }
}

/// A view into an attribute dictionary.
///
/// The dictionary is provided as an explicit value or handle
/// wherever attribute resolution takes place.
pub trait DataDictionary {
    /// The type of the dictionary entry.
    type Entry: DictionaryEntry;

    /// Fetch an entry by its usual tag.
    fn by_tag(&self, tag: Tag) -> Option<&Self::Entry>;

    /// Fetch an entry by its keyword alias.
    fn by_name(&self, name: &str) -> Option<&Self::Entry>;
}

impl<T> DataDictionary for &T
where
    T: DataDictionary,
{
    type Entry = T::Entry;

    fn by_tag(&self, tag: Tag) -> Option<&T::Entry> {
        (**self).by_tag(tag)
    }

    fn by_name(&self, name: &str) -> Option<&T::Entry> {
        (**self).by_name(name)
    }
}

impl<T> DataDictionary for Box<T>
where
    T: DataDictionary,
{
    type Entry = T::Entry;

    fn by_tag(&self, tag: Tag) -> Option<&T::Entry> {
        (**self).by_tag(tag)
    }

    fn by_name(&self, name: &str) -> Option<&T::Entry> {
        (**self).by_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vm_multiplicity_checks() {
        assert!(!VM::fixed(1).is_multi());
        assert!(VM::fixed(3).is_multi());
        assert!(VM::bounded(2, 2).is_multi());
        assert!(VM::unbounded(1).is_multi());
    }

    #[test]
    fn vm_display() {
        assert_eq!(VM::fixed(1).to_string(), "1");
        assert_eq!(VM::bounded(2, 4).to_string(), "2-4");
        assert_eq!(VM::unbounded(1).to_string(), "1-n");
    }
}
