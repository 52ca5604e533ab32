//! A trivial attribute dictionary with no entries.

use super::{DataDictionary, DictionaryEntryRef};
use crate::header::Tag;

/// An attribute dictionary which knows nothing.
/// All lookups result in `None`.
///
/// This dictionary is useful when handling data sets
/// made exclusively of elements with an explicit VR.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StubDictionary;

impl DataDictionary for StubDictionary {
    type Entry = DictionaryEntryRef<'static>;

    fn by_tag(&self, _tag: Tag) -> Option<&Self::Entry> {
        None
    }

    fn by_name(&self, _name: &str) -> Option<&Self::Entry> {
        None
    }
}
