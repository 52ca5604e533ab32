//! This module contains the implementation of the in-memory data set.
//!
//! An [`InMemDataSet`] keeps all of its elements in a tag-ordered map,
//! with nested data sets owned by their sequence elements.

use std::borrow::Cow;
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::str::FromStr;

use dcmset_core::chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use dcmset_core::dictionary::{DataDictionary, DictionaryEntry, StandardDataDictionary};
use dcmset_core::header::{DataElement, Header, Tag, VR};
use dcmset_core::value::{PrimitiveValue, Value};
use num_traits::NumCast;
use snafu::{IntoError, ResultExt};
use tracing::trace;

use crate::mask::TagMask;
use crate::{
    AccessError, ConvertValueSnafu, IndexOutOfRangeSnafu, NoSuchDataElementTagSnafu,
    NotASequenceSnafu, ReadValueError, DEFAULT_TRANSFER_SYNTAX,
};

/// A DICOM data element fully in memory,
/// where sequence items are in-memory data sets.
pub type MemElement<D = StandardDataDictionary> = DataElement<InMemDataSet<D>>;

/// A DICOM data set fully in memory.
///
/// Elements are keyed and iterated by tag, in ascending order.
/// There is at most one element per tag;
/// inserting an element at an occupied tag replaces the previous one.
///
/// The data set carries a handle to an attribute dictionary `D`,
/// which resolves implicit value representations and multiplicities,
/// and a transfer syntax UID which is kept consistent
/// across every nested data set (see
/// [`set_transfer_syntax`](InMemDataSet::set_transfer_syntax)).
#[derive(Debug, Clone, PartialEq)]
pub struct InMemDataSet<D = StandardDataDictionary> {
    entries: BTreeMap<Tag, MemElement<D>>,
    dict: D,
    transfer_syntax: String,
}

impl InMemDataSet<StandardDataDictionary> {
    /// Create a new empty data set
    /// using the built-in attribute dictionary.
    pub fn new_empty() -> Self {
        InMemDataSet::new_empty_with_dict(StandardDataDictionary)
    }

    /// Construct a data set from an iterator of structured elements,
    /// using the built-in attribute dictionary.
    pub fn from_element_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = MemElement<StandardDataDictionary>>,
    {
        InMemDataSet::from_iter_with_dict(iter, StandardDataDictionary)
    }
}

impl<D> InMemDataSet<D>
where
    D: DataDictionary,
{
    /// Create a new empty data set with the given dictionary.
    pub fn new_empty_with_dict(dict: D) -> Self {
        InMemDataSet {
            entries: BTreeMap::new(),
            dict,
            transfer_syntax: DEFAULT_TRANSFER_SYNTAX.to_string(),
        }
    }

    /// Construct a data set from an iterator of structured elements
    /// and a dictionary.
    /// The data set's transfer syntax is pushed to every nested data set.
    pub fn from_iter_with_dict<I>(iter: I, dict: D) -> Self
    where
        I: IntoIterator<Item = MemElement<D>>,
    {
        let entries = iter.into_iter().map(|e| (e.tag(), e)).collect();
        let mut ds = InMemDataSet {
            entries,
            dict,
            transfer_syntax: DEFAULT_TRANSFER_SYNTAX.to_string(),
        };
        let uid = ds.transfer_syntax.clone();
        ds.propagate_transfer_syntax(&uid);
        ds
    }

    /// Obtain a reference to the data set's dictionary.
    pub fn dictionary(&self) -> &D {
        &self.dict
    }

    // --- store operations ---

    /// Check whether an element at the given tag is present.
    pub fn contains(&self, tag: Tag) -> bool {
        self.entries.contains_key(&tag)
    }

    /// The number of elements in the data set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the data set holds no elements.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Retrieve a particular element by tag,
    /// or `None` if it is not present.
    pub fn get(&self, tag: Tag) -> Option<&MemElement<D>> {
        self.entries.get(&tag)
    }

    /// Retrieve a particular element by tag.
    pub fn element(&self, tag: Tag) -> Result<&MemElement<D>, AccessError> {
        self.entries
            .get(&tag)
            .ok_or_else(|| NoSuchDataElementTagSnafu { tag }.build())
    }

    /// Retrieve the value representation of the element at the given tag.
    pub fn vr_of(&self, tag: Tag) -> Result<VR, AccessError> {
        self.element(tag).map(|e| e.vr())
    }

    /// Insert a data element into the data set,
    /// replacing (and returning) any previous element of the same tag.
    pub fn put(&mut self, elt: MemElement<D>) -> Option<MemElement<D>> {
        self.put_element(elt)
    }

    /// Insert a data element into the data set,
    /// replacing (and returning) any previous element of the same tag.
    pub fn put_element(&mut self, elt: MemElement<D>) -> Option<MemElement<D>> {
        self.entries.insert(elt.tag(), elt)
    }

    /// Remove the element at the given tag.
    /// Returns whether the element was present.
    pub fn remove_element(&mut self, tag: Tag) -> bool {
        self.entries.remove(&tag).is_some()
    }

    /// Remove the element at the given tag and return it.
    pub fn take_element(&mut self, tag: Tag) -> Result<MemElement<D>, AccessError> {
        self.entries
            .remove(&tag)
            .ok_or_else(|| NoSuchDataElementTagSnafu { tag }.build())
    }

    /// Remove every element matching the given predicate,
    /// returning the number of elements removed.
    ///
    /// The matching tags are materialized before any removal takes place,
    /// so the predicate always observes the data set
    /// as it was when the call started.
    pub fn remove_where<P>(&mut self, predicate: P) -> usize
    where
        P: Fn(&MemElement<D>) -> bool,
    {
        let tags: Vec<Tag> = self
            .entries
            .values()
            .filter(|e| predicate(e))
            .map(|e| e.tag())
            .collect();
        for tag in &tags {
            self.entries.remove(tag);
        }
        tags.len()
    }

    /// Remove all elements from the data set.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Obtain an iterator over the elements of this data set,
    /// in ascending tag order.
    pub fn iter(&self) -> Iter<'_, D> {
        self.into_iter()
    }

    /// Obtain an iterator over the tags of the data set's elements,
    /// in ascending order.
    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.entries.keys().copied()
    }

    // --- transfer syntax ---

    /// The transfer syntax UID in force for this data set.
    pub fn transfer_syntax(&self) -> &str {
        &self.transfer_syntax
    }

    /// Set the transfer syntax UID of this data set
    /// and of every data set nested in its sequence elements,
    /// at any depth.
    ///
    /// The propagation is performed at assignment time.
    /// A data set inserted into a sequence afterwards
    /// does not receive this transfer syntax
    /// until the next assignment.
    pub fn set_transfer_syntax(&mut self, uid: impl Into<String>) {
        let uid = uid.into();
        trace!(transfer_syntax = %uid, "propagating transfer syntax");
        self.propagate_transfer_syntax(&uid);
        self.transfer_syntax = uid;
    }

    fn propagate_transfer_syntax(&mut self, uid: &str) {
        for elt in self.entries.values_mut() {
            if let Some(items) = elt.value_mut().items_mut() {
                for item in items.iter_mut() {
                    item.set_transfer_syntax(uid);
                }
            }
        }
    }

    // --- typed value retrieval ---

    /// Retrieve the value of the element at the given tag
    /// as a single trimmed string,
    /// with multiple values joined by a backslash.
    pub fn string(&self, tag: Tag) -> Result<Cow<'_, str>, ReadValueError> {
        let elt = self.element(tag)?;
        elt.to_str().context(ConvertValueSnafu { tag })
    }

    /// Retrieve the string value at the given index
    /// of the element at the given tag.
    pub fn string_at(&self, tag: Tag, index: usize) -> Result<String, ReadValueError> {
        let prim = self.primitive_of(tag)?;
        match prim.nth(index) {
            Some(value) => Ok(value.to_str().into_owned()),
            None => IndexOutOfRangeSnafu {
                tag,
                index,
                multiplicity: prim.multiplicity(),
            }
            .fail(),
        }
    }

    /// Retrieve the full value of the element at the given tag
    /// as a sequence of strings.
    pub fn strings(&self, tag: Tag) -> Result<Cow<'_, [String]>, ReadValueError> {
        let elt = self.element(tag)?;
        elt.to_multi_str().context(ConvertValueSnafu { tag })
    }

    /// Retrieve and convert the value of the element at the given tag
    /// into an integer.
    pub fn int<T>(&self, tag: Tag) -> Result<T, ReadValueError>
    where
        T: NumCast,
        T: FromStr<Err = std::num::ParseIntError>,
    {
        let elt = self.element(tag)?;
        elt.to_int().context(ConvertValueSnafu { tag })
    }

    /// Retrieve and convert the integer value at the given index
    /// of the element at the given tag.
    pub fn int_at<T>(&self, tag: Tag, index: usize) -> Result<T, ReadValueError>
    where
        T: NumCast,
        T: FromStr<Err = std::num::ParseIntError>,
    {
        let prim = self.primitive_of(tag)?;
        match prim.nth(index) {
            Some(value) => value.to_int().context(ConvertValueSnafu { tag }),
            None => IndexOutOfRangeSnafu {
                tag,
                index,
                multiplicity: prim.multiplicity(),
            }
            .fail(),
        }
    }

    /// Retrieve the value of the element at the given tag as a `u16`.
    pub fn uint16(&self, tag: Tag) -> Result<u16, ReadValueError> {
        self.int(tag)
    }

    /// Retrieve the value of the element at the given tag as a `u32`.
    pub fn uint32(&self, tag: Tag) -> Result<u32, ReadValueError> {
        self.int(tag)
    }

    /// Retrieve and convert the value of the element at the given tag
    /// into a single-precision floating point number.
    pub fn float32(&self, tag: Tag) -> Result<f32, ReadValueError> {
        let elt = self.element(tag)?;
        elt.to_float32().context(ConvertValueSnafu { tag })
    }

    /// Retrieve and convert the value of the element at the given tag
    /// into a double-precision floating point number.
    pub fn float64(&self, tag: Tag) -> Result<f64, ReadValueError> {
        let elt = self.element(tag)?;
        elt.to_float64().context(ConvertValueSnafu { tag })
    }

    /// Retrieve and convert the value of the element at the given tag
    /// into a date.
    pub fn date(&self, tag: Tag) -> Result<NaiveDate, ReadValueError> {
        let elt = self.element(tag)?;
        elt.to_date().context(ConvertValueSnafu { tag })
    }

    /// Retrieve and convert the value of the element at the given tag
    /// into a time.
    pub fn time(&self, tag: Tag) -> Result<NaiveTime, ReadValueError> {
        let elt = self.element(tag)?;
        elt.to_time().context(ConvertValueSnafu { tag })
    }

    /// Retrieve and convert the value of the element at the given tag
    /// into a date-time.
    pub fn datetime(&self, tag: Tag) -> Result<DateTime<FixedOffset>, ReadValueError> {
        let elt = self.element(tag)?;
        elt.to_datetime().context(ConvertValueSnafu { tag })
    }

    /// Retrieve and convert the value of the element at the given tag
    /// into an attribute tag.
    pub fn tag_value(&self, tag: Tag) -> Result<Tag, ReadValueError> {
        let elt = self.element(tag)?;
        elt.to_tag().context(ConvertValueSnafu { tag })
    }

    // --- retrieval with defaults ---

    /// Retrieve the string value of the element at the given tag,
    /// or the given default if the element is absent or empty.
    /// Conversion failures are still reported.
    pub fn string_or(&self, tag: Tag, default: &str) -> Result<String, ReadValueError> {
        match self.get(tag) {
            None => Ok(default.to_string()),
            Some(elt) if elt.value().is_empty() => Ok(default.to_string()),
            Some(elt) => elt
                .to_str()
                .map(Cow::into_owned)
                .context(ConvertValueSnafu { tag }),
        }
    }

    /// Retrieve the integer value of the element at the given tag,
    /// or the given default if the element is absent or empty.
    pub fn int_or<T>(&self, tag: Tag, default: T) -> Result<T, ReadValueError>
    where
        T: NumCast,
        T: FromStr<Err = std::num::ParseIntError>,
    {
        match self.get(tag) {
            None => Ok(default),
            Some(elt) if elt.value().is_empty() => Ok(default),
            Some(elt) => elt.to_int().context(ConvertValueSnafu { tag }),
        }
    }

    /// Retrieve the float value of the element at the given tag,
    /// or the given default if the element is absent or empty.
    pub fn float64_or(&self, tag: Tag, default: f64) -> Result<f64, ReadValueError> {
        match self.get(tag) {
            None => Ok(default),
            Some(elt) if elt.value().is_empty() => Ok(default),
            Some(elt) => elt.to_float64().context(ConvertValueSnafu { tag }),
        }
    }

    /// Retrieve the date value of the element at the given tag,
    /// or the given default if the element is absent or empty.
    pub fn date_or(&self, tag: Tag, default: NaiveDate) -> Result<NaiveDate, ReadValueError> {
        match self.get(tag) {
            None => Ok(default),
            Some(elt) if elt.value().is_empty() => Ok(default),
            Some(elt) => elt.to_date().context(ConvertValueSnafu { tag }),
        }
    }

    /// Retrieve the full value of the element at the given tag
    /// as raw bytes.
    ///
    /// Values already backed by byte buffers (`U8`)
    /// are shared rather than copied.
    pub fn bytes(&self, tag: Tag) -> Result<Cow<'_, [u8]>, ReadValueError> {
        let elt = self.element(tag)?;
        elt.to_bytes().context(ConvertValueSnafu { tag })
    }

    /// Retrieve the items of the data set sequence at the given tag.
    pub fn items(&self, tag: Tag) -> Result<&[InMemDataSet<D>], ReadValueError> {
        let elt = self.element(tag)?;
        elt.value()
            .items()
            .ok_or_else(|| NotASequenceSnafu { tag }.build())
    }

    fn primitive_of(&self, tag: Tag) -> Result<&PrimitiveValue, ReadValueError> {
        let elt = self.element(tag)?;
        elt.value()
            .primitive()
            .ok_or_else(|| {
                ConvertValueSnafu { tag }
                    .into_error(dcmset_core::value::ConvertValueError {
                        requested: "primitive",
                        original: dcmset_core::value::ValueType::DataSetSequence,
                        cause: None,
                    })
            })
    }

    // --- copy operations ---

    /// Clone every element of this data set into `dest`,
    /// replacing any elements of matching tags.
    pub fn copy_to(&self, dest: &mut InMemDataSet<D>)
    where
        D: Clone,
    {
        for elt in self.entries.values() {
            dest.put(elt.clone());
        }
    }

    /// Clone the elements at the listed tags into `dest`.
    /// The copy fails on the first tag not present in this data set,
    /// leaving the elements copied so far in place.
    pub fn copy_tags(&self, dest: &mut InMemDataSet<D>, tags: &[Tag]) -> Result<(), AccessError>
    where
        D: Clone,
    {
        for &tag in tags {
            let elt = self.element(tag)?;
            dest.put(elt.clone());
        }
        Ok(())
    }

    /// Clone every element whose tag matches the given mask into `dest`.
    pub fn copy_masked(&self, dest: &mut InMemDataSet<D>, mask: &TagMask)
    where
        D: Clone,
    {
        for (tag, elt) in &self.entries {
            if mask.matches(*tag) {
                dest.put(elt.clone());
            }
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter, indent: usize) -> fmt::Result {
        for (tag, elt) in &self.entries {
            let alias = self
                .dict
                .by_tag(*tag)
                .map(|e| e.alias())
                .unwrap_or("?");
            write!(
                f,
                "{:indent$}{} {} ({}) [{}]: ",
                "",
                tag,
                elt.vr(),
                alias,
                elt.multiplicity(),
                indent = indent,
            )?;
            match elt.value() {
                Value::Primitive(v) => writeln!(f, "{}", v)?,
                Value::Sequence(seq) => {
                    writeln!(f, "sequence of {} item(s)", seq.multiplicity())?;
                    for item in seq.items() {
                        item.fmt_indented(f, indent + 2)?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl<D> fmt::Display for InMemDataSet<D>
where
    D: DataDictionary,
{
    /// Format the data set as a table of elements, one line each:
    /// tag, VR, dictionary alias (or `?`), multiplicity
    /// and a preview of the value.
    /// Sequence items are indented below their element.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

/// An iterator over the elements of an in-memory data set,
/// in ascending tag order.
#[derive(Debug)]
pub struct Iter<'a, D>(btree_map::Values<'a, Tag, MemElement<D>>);

impl<'a, D> Iterator for Iter<'a, D> {
    type Item = &'a MemElement<D>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a, D> IntoIterator for &'a InMemDataSet<D> {
    type Item = &'a MemElement<D>;
    type IntoIter = Iter<'a, D>;

    fn into_iter(self) -> Self::IntoIter {
        Iter(self.entries.values())
    }
}

/// An iterator over the elements of an in-memory data set, by value.
#[derive(Debug)]
pub struct IntoIter<D>(btree_map::IntoValues<Tag, MemElement<D>>);

impl<D> Iterator for IntoIter<D> {
    type Item = MemElement<D>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<D> IntoIterator for InMemDataSet<D> {
    type Item = MemElement<D>;
    type IntoIter = IntoIter<D>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self.entries.into_values())
    }
}

impl<D> Extend<MemElement<D>> for InMemDataSet<D> {
    fn extend<I: IntoIterator<Item = MemElement<D>>>(&mut self, iter: I) {
        self.entries.extend(iter.into_iter().map(|e| (e.tag(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcmset_core::value::DataSetSequence;

    fn str_element(tag: Tag, vr: VR, text: &str) -> MemElement {
        DataElement::new(tag, vr, Value::new(PrimitiveValue::from(text)))
    }

    #[test]
    fn insertion_replaces() {
        let mut ds = InMemDataSet::new_empty();
        ds.put(str_element(Tag(0x0010, 0x0010), VR::PN, "Doe^John"));
        ds.put(str_element(Tag(0x0010, 0x0010), VR::PN, "Doe^Jane"));

        assert_eq!(ds.len(), 1);
        assert!(ds.contains(Tag(0x0010, 0x0010)));
        assert_eq!(ds.string(Tag(0x0010, 0x0010)).unwrap(), "Doe^Jane");
    }

    #[test]
    fn iteration_is_tag_ordered() {
        let mut ds = InMemDataSet::new_empty();
        ds.put(str_element(Tag(0x0020, 0x000D), VR::UI, "1.2.3"));
        ds.put(str_element(Tag(0x0008, 0x0060), VR::CS, "MR"));
        ds.put(str_element(Tag(0x0010, 0x0010), VR::PN, "Doe^John"));

        let tags: Vec<_> = ds.tags().collect();
        assert_eq!(
            tags,
            vec![
                Tag(0x0008, 0x0060),
                Tag(0x0010, 0x0010),
                Tag(0x0020, 0x000D),
            ]
        );
    }

    #[test]
    fn absent_tag_is_reported() {
        let ds = InMemDataSet::new_empty();
        assert!(matches!(
            ds.element(Tag(0x0010, 0x0010)),
            Err(AccessError::NoSuchDataElementTag {
                tag: Tag(0x0010, 0x0010),
            })
        ));
    }

    #[test]
    fn defaults_apply_only_when_absent_or_empty() {
        let mut ds = InMemDataSet::new_empty();
        assert_eq!(
            ds.string_or(Tag(0x0008, 0x0060), "OT").unwrap(),
            "OT".to_string()
        );

        ds.put(DataElement::empty(Tag(0x0008, 0x0060), VR::CS));
        assert_eq!(
            ds.string_or(Tag(0x0008, 0x0060), "OT").unwrap(),
            "OT".to_string()
        );

        ds.put(str_element(Tag(0x0008, 0x0060), VR::CS, "MR"));
        assert_eq!(
            ds.string_or(Tag(0x0008, 0x0060), "OT").unwrap(),
            "MR".to_string()
        );
    }

    #[test]
    fn string_at_reports_out_of_range() {
        let mut ds = InMemDataSet::new_empty();
        ds.put(DataElement::new(
            Tag(0x0008, 0x0008),
            VR::CS,
            Value::new(PrimitiveValue::from(&["DERIVED", "PRIMARY"][..])),
        ));

        assert_eq!(ds.string_at(Tag(0x0008, 0x0008), 1).unwrap(), "PRIMARY");
        assert!(matches!(
            ds.string_at(Tag(0x0008, 0x0008), 2),
            Err(ReadValueError::IndexOutOfRange {
                index: 2,
                multiplicity: 2,
                ..
            })
        ));
    }

    #[test]
    fn remove_where_uses_a_snapshot() {
        let mut ds = InMemDataSet::new_empty();
        ds.put(str_element(Tag(0x0008, 0x0060), VR::CS, "MR"));
        ds.put(str_element(Tag(0x0010, 0x0010), VR::PN, "Doe^John"));
        ds.put(str_element(Tag(0x0010, 0x0020), VR::LO, "ID1"));

        let removed = ds.remove_where(|e| e.tag().group() == 0x0010);
        assert_eq!(removed, 2);
        assert_eq!(ds.len(), 1);
        assert!(ds.contains(Tag(0x0008, 0x0060)));
    }

    #[test]
    fn transfer_syntax_propagates_to_nested_items() {
        let mut child = InMemDataSet::new_empty();
        child.put(str_element(Tag(0x0008, 0x0100), VR::SH, "T-D1100"));

        let mut ds = InMemDataSet::new_empty();
        ds.put(DataElement::new(
            Tag(0x0008, 0x1199),
            VR::SQ,
            Value::from(DataSetSequence::new(vec![child])),
        ));

        ds.set_transfer_syntax("1.2.840.10008.1.2");
        assert_eq!(ds.transfer_syntax(), "1.2.840.10008.1.2");
        let items = ds.items(Tag(0x0008, 0x1199)).unwrap();
        assert_eq!(items[0].transfer_syntax(), "1.2.840.10008.1.2");
    }

    #[test]
    fn data_set_dump_format() {
        let mut ds = InMemDataSet::new_empty();
        ds.put(str_element(Tag(0x0010, 0x0010), VR::PN, "Doe^John"));
        ds.put(str_element(Tag(0x0011, 0x0010), VR::LO, "ACME"));

        let dump = ds.to_string();
        assert!(dump.contains("(0010,0010) PN (PatientName) [1]: Doe^John"));
        assert!(dump.contains("(0011,0010) LO (?) [1]: ACME"));
    }
}
