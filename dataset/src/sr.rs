//! Structured report content views.
//!
//! These types are read-only views over a sequence element's items,
//! constructed on demand and never stored in the data set.
//! They expose the typed accessors which structured report consumers
//! reach for most often: coded concepts, measured values
//! and SOP instance references.

use std::borrow::Cow;

use dcmset_core::dictionary::{DataDictionary, StandardDataDictionary};
use dcmset_core::header::{Header, Tag};
use snafu::OptionExt;

use crate::mem::{InMemDataSet, MemElement};
use crate::{IndexOutOfRangeSnafu, NotASequenceSnafu, ReadValueError};

const CODE_VALUE: Tag = Tag(0x0008, 0x0100);
const CODING_SCHEME_DESIGNATOR: Tag = Tag(0x0008, 0x0102);
const CODE_MEANING: Tag = Tag(0x0008, 0x0104);
const REFERENCED_SOP_CLASS_UID: Tag = Tag(0x0008, 0x1150);
const REFERENCED_SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x1155);
const MEASUREMENT_UNITS_CODE_SEQUENCE: Tag = Tag(0x0040, 0x08EA);
const NUMERIC_VALUE: Tag = Tag(0x0040, 0xA30A);

fn first_item<D>(elt: &MemElement<D>) -> Result<&InMemDataSet<D>, ReadValueError>
where
    D: DataDictionary,
{
    let tag = elt.tag();
    let items = elt
        .value()
        .items()
        .context(NotASequenceSnafu { tag })?;
    items.first().context(IndexOutOfRangeSnafu {
        tag,
        index: 0_usize,
        multiplicity: 0_usize,
    })
}

/// A view over a code sequence item:
/// a coded concept from some coding scheme.
#[derive(Debug, Copy, Clone)]
pub struct CodeItem<'a, D = StandardDataDictionary> {
    item: &'a InMemDataSet<D>,
}

impl<'a, D> CodeItem<'a, D>
where
    D: DataDictionary,
{
    /// Create a view over the first item of the given sequence element.
    pub fn from_element(elt: &'a MemElement<D>) -> Result<Self, ReadValueError> {
        Ok(CodeItem {
            item: first_item(elt)?,
        })
    }

    /// The code value (0008,0100).
    pub fn value(&self) -> Result<Cow<'a, str>, ReadValueError> {
        self.item.string(CODE_VALUE)
    }

    /// The coding scheme designator (0008,0102).
    pub fn scheme_designator(&self) -> Result<Cow<'a, str>, ReadValueError> {
        self.item.string(CODING_SCHEME_DESIGNATOR)
    }

    /// The code meaning (0008,0104).
    pub fn meaning(&self) -> Result<Cow<'a, str>, ReadValueError> {
        self.item.string(CODE_MEANING)
    }
}

/// A view over a measured value sequence item:
/// a numeric value qualified by a coded measurement unit.
#[derive(Debug, Copy, Clone)]
pub struct MeasuredValue<'a, D = StandardDataDictionary> {
    item: &'a InMemDataSet<D>,
}

impl<'a, D> MeasuredValue<'a, D>
where
    D: DataDictionary,
{
    /// Create a view over the first item of the given sequence element.
    pub fn from_element(elt: &'a MemElement<D>) -> Result<Self, ReadValueError> {
        Ok(MeasuredValue {
            item: first_item(elt)?,
        })
    }

    /// The numeric value (0040,A30A).
    pub fn numeric_value(&self) -> Result<f64, ReadValueError> {
        self.item.float64(NUMERIC_VALUE)
    }

    /// The full multi-valued numeric value (0040,A30A).
    pub fn numeric_values(&self) -> Result<Vec<f64>, ReadValueError> {
        let elt = self.item.element(NUMERIC_VALUE)?;
        elt.to_multi_float64()
            .map_err(|source| ReadValueError::ConvertValue {
                tag: NUMERIC_VALUE,
                source,
            })
    }

    /// The measurement units code (0040,08EA).
    pub fn unit(&self) -> Result<CodeItem<'a, D>, ReadValueError> {
        let elt = self.item.element(MEASUREMENT_UNITS_CODE_SEQUENCE)?;
        CodeItem::from_element(elt)
    }
}

/// A view over a referenced SOP sequence item:
/// a reference to another SOP instance.
#[derive(Debug, Copy, Clone)]
pub struct ReferencedSop<'a, D = StandardDataDictionary> {
    item: &'a InMemDataSet<D>,
}

impl<'a, D> ReferencedSop<'a, D>
where
    D: DataDictionary,
{
    /// Create a view over the first item of the given sequence element.
    pub fn from_element(elt: &'a MemElement<D>) -> Result<Self, ReadValueError> {
        Ok(ReferencedSop {
            item: first_item(elt)?,
        })
    }

    /// The referenced SOP class UID (0008,1150).
    pub fn sop_class_uid(&self) -> Result<Cow<'a, str>, ReadValueError> {
        self.item.string(REFERENCED_SOP_CLASS_UID)
    }

    /// The referenced SOP instance UID (0008,1155).
    pub fn sop_instance_uid(&self) -> Result<Cow<'a, str>, ReadValueError> {
        self.item.string(REFERENCED_SOP_INSTANCE_UID)
    }
}

impl<D> InMemDataSet<D>
where
    D: DataDictionary,
{
    /// View the sequence element at the given tag as a coded concept.
    pub fn code_item(&self, tag: Tag) -> Result<CodeItem<'_, D>, ReadValueError> {
        CodeItem::from_element(self.element(tag)?)
    }

    /// View the sequence element at the given tag as a measured value.
    pub fn measured_value(&self, tag: Tag) -> Result<MeasuredValue<'_, D>, ReadValueError> {
        MeasuredValue::from_element(self.element(tag)?)
    }

    /// View the sequence element at the given tag as a SOP reference.
    pub fn referenced_sop(&self, tag: Tag) -> Result<ReferencedSop<'_, D>, ReadValueError> {
        ReferencedSop::from_element(self.element(tag)?)
    }
}
