//! This module includes a high level abstraction over a DICOM data element's value.

use crate::header::Tag;
use num_traits::NumCast;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

pub mod deserialize;
pub mod primitive;
pub mod range;
pub mod serialize;

pub use self::primitive::{
    CastValueError, ConvertValueError, InvalidValueReadError, PrimitiveValue, ValueType, C,
};
pub use self::range::{DateRange, DateTimeRange, TimeRange};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};

/// A full DICOM value, which may be either primitive
/// or another DICOM object as part of a sequence.
///
/// The type parameter `I` gives the type of a sequence item,
/// which is usually a form of DICOM object.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<I> {
    /// Primitive value.
    Primitive(PrimitiveValue),
    /// A complex sequence of items.
    Sequence(DataSetSequence<I>),
}

impl<I> From<PrimitiveValue> for Value<I> {
    fn from(v: PrimitiveValue) -> Self {
        Value::Primitive(v)
    }
}

impl<I> From<DataSetSequence<I>> for Value<I> {
    fn from(v: DataSetSequence<I>) -> Self {
        Value::Sequence(v)
    }
}

impl<I> From<&str> for Value<I> {
    fn from(v: &str) -> Self {
        Value::Primitive(PrimitiveValue::from(v))
    }
}

impl<I> From<String> for Value<I> {
    fn from(v: String) -> Self {
        Value::Primitive(PrimitiveValue::from(v))
    }
}

impl<I> Value<I> {
    /// Create a value from a primitive value,
    /// in a way that does not depend on the sequence item type.
    pub fn new(value: PrimitiveValue) -> Self {
        Value::Primitive(value)
    }

    /// Create a value from a vector of sequence items.
    pub fn from_items(items: Vec<I>) -> Self {
        Value::Sequence(DataSetSequence::from(items))
    }

    /// Obtain the number of individual values.
    /// In a sequence value, this is the number of items.
    pub fn multiplicity(&self) -> usize {
        match self {
            Value::Primitive(v) => v.multiplicity(),
            Value::Sequence(v) => v.multiplicity(),
        }
    }

    /// Determine whether the value holds no data
    /// (zero primitive elements or zero items).
    pub fn is_empty(&self) -> bool {
        self.multiplicity() == 0
    }

    /// Retrieve the specific variant of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Primitive(v) => v.value_type(),
            Value::Sequence(_) => ValueType::DataSetSequence,
        }
    }

    /// Gets a reference to the primitive value,
    /// if the value is primitive.
    pub fn primitive(&self) -> Option<&PrimitiveValue> {
        match self {
            Value::Primitive(v) => Some(v),
            _ => None,
        }
    }

    /// Gets a mutable reference to the primitive value,
    /// if the value is primitive.
    pub fn primitive_mut(&mut self) -> Option<&mut PrimitiveValue> {
        match self {
            Value::Primitive(v) => Some(v),
            _ => None,
        }
    }

    /// Gets a reference to the items of a sequence,
    /// if the value is a data set sequence.
    pub fn items(&self) -> Option<&[I]> {
        match self {
            Value::Sequence(v) => Some(v.items()),
            _ => None,
        }
    }

    /// Gets a mutable reference to the items of a sequence,
    /// if the value is a data set sequence.
    pub fn items_mut(&mut self) -> Option<&mut C<I>> {
        match self {
            Value::Sequence(v) => Some(v.items_mut()),
            _ => None,
        }
    }

    /// Retrieve the primitive value, discarding the rest.
    /// Returns `None` if the value is a sequence.
    pub fn into_primitive(self) -> Option<PrimitiveValue> {
        match self {
            Value::Primitive(v) => Some(v),
            _ => None,
        }
    }

    /// Retrieve the sequence items, discarding the rest.
    /// Returns `None` if the value is primitive.
    pub fn into_items(self) -> Option<C<I>> {
        match self {
            Value::Sequence(v) => Some(v.into_items()),
            _ => None,
        }
    }

    fn sequence_conversion_failure(&self, requested: &'static str) -> ConvertValueError {
        ConvertValueError {
            requested,
            original: ValueType::DataSetSequence,
            cause: None,
        }
    }

    /// Convert the value into a single trimmed string,
    /// with multiple values joined by a backslash (`'\\'`).
    ///
    /// Returns an error if the value is a data set sequence.
    pub fn to_str(&self) -> Result<Cow<'_, str>, ConvertValueError> {
        match self {
            Value::Primitive(prim) => Ok(prim.to_str()),
            _ => Err(self.sequence_conversion_failure("string")),
        }
    }

    /// Convert the full value into a sequence of strings.
    ///
    /// Returns an error if the value is a data set sequence.
    pub fn to_multi_str(&self) -> Result<Cow<'_, [String]>, ConvertValueError> {
        match self {
            Value::Primitive(prim) => Ok(prim.to_multi_str()),
            _ => Err(self.sequence_conversion_failure("strings")),
        }
    }

    /// Convert the full value into raw bytes.
    ///
    /// Returns an error if the value is a data set sequence.
    pub fn to_bytes(&self) -> Result<Cow<'_, [u8]>, ConvertValueError> {
        match self {
            Value::Primitive(prim) => Ok(prim.to_bytes()),
            _ => Err(self.sequence_conversion_failure("bytes")),
        }
    }

    /// Retrieve and convert the value into an integer.
    pub fn to_int<T>(&self) -> Result<T, ConvertValueError>
    where
        T: NumCast,
        T: FromStr<Err = std::num::ParseIntError>,
    {
        match self {
            Value::Primitive(prim) => prim.to_int(),
            _ => Err(self.sequence_conversion_failure("integer")),
        }
    }

    /// Retrieve and convert the full value into a sequence of integers.
    pub fn to_multi_int<T>(&self) -> Result<Vec<T>, ConvertValueError>
    where
        T: NumCast,
        T: FromStr<Err = std::num::ParseIntError>,
    {
        match self {
            Value::Primitive(prim) => prim.to_multi_int(),
            _ => Err(self.sequence_conversion_failure("integers")),
        }
    }

    /// Retrieve and convert the value
    /// into a single-precision floating point number.
    pub fn to_float32(&self) -> Result<f32, ConvertValueError> {
        match self {
            Value::Primitive(prim) => prim.to_float32(),
            _ => Err(self.sequence_conversion_failure("float32")),
        }
    }

    /// Retrieve and convert the value
    /// into a double-precision floating point number.
    pub fn to_float64(&self) -> Result<f64, ConvertValueError> {
        match self {
            Value::Primitive(prim) => prim.to_float64(),
            _ => Err(self.sequence_conversion_failure("float64")),
        }
    }

    /// Retrieve and convert the full value
    /// into a sequence of double-precision floating point numbers.
    pub fn to_multi_float64(&self) -> Result<Vec<f64>, ConvertValueError> {
        match self {
            Value::Primitive(prim) => prim.to_multi_float64(),
            _ => Err(self.sequence_conversion_failure("float64s")),
        }
    }

    /// Retrieve and convert the value into a date.
    pub fn to_date(&self) -> Result<NaiveDate, ConvertValueError> {
        match self {
            Value::Primitive(prim) => prim.to_date(),
            _ => Err(self.sequence_conversion_failure("date")),
        }
    }

    /// Retrieve and convert the value into a time.
    pub fn to_time(&self) -> Result<NaiveTime, ConvertValueError> {
        match self {
            Value::Primitive(prim) => prim.to_time(),
            _ => Err(self.sequence_conversion_failure("time")),
        }
    }

    /// Retrieve and convert the value into a date-time.
    pub fn to_datetime(&self) -> Result<DateTime<FixedOffset>, ConvertValueError> {
        match self {
            Value::Primitive(prim) => prim.to_datetime(),
            _ => Err(self.sequence_conversion_failure("date-time")),
        }
    }

    /// Retrieve and convert the value into an attribute tag.
    pub fn to_tag(&self) -> Result<Tag, ConvertValueError> {
        match self {
            Value::Primitive(prim) => prim.to_tag(),
            _ => Err(self.sequence_conversion_failure("tag")),
        }
    }
}

/// Macro for delegating a getter to the primitive value,
/// reporting a cast error on sequence values.
macro_rules! impl_value_getters {
    ($name_single: ident, $name_multi: ident, $ret: ty) => {
        /// Get a single value of the requested type.
        /// An error is returned if the variant is not compatible.
        pub fn $name_single(&self) -> Result<$ret, CastValueError> {
            match self {
                Value::Primitive(v) => v.$name_single(),
                value => Err(CastValueError {
                    requested: stringify!($name_single),
                    got: value.value_type(),
                }),
            }
        }

        /// Get a sequence of values of the requested type without copying.
        /// An error is returned if the variant is not compatible.
        pub fn $name_multi(&self) -> Result<&[$ret], CastValueError> {
            match self {
                Value::Primitive(v) => v.$name_multi(),
                value => Err(CastValueError {
                    requested: stringify!($name_multi),
                    got: value.value_type(),
                }),
            }
        }
    };
}

impl<I> Value<I> {
    /// Get a single string value.
    ///
    /// An error is returned if the variant is not compatible.
    pub fn string(&self) -> Result<&str, CastValueError> {
        match self {
            Value::Primitive(v) => v.string(),
            value => Err(CastValueError {
                requested: "string",
                got: value.value_type(),
            }),
        }
    }

    /// Get the inner sequence of string values
    /// if the variant is `Strs`.
    ///
    /// An error is returned if the variant is not compatible.
    pub fn strings(&self) -> Result<&[String], CastValueError> {
        match self {
            Value::Primitive(v) => v.strings(),
            value => Err(CastValueError {
                requested: "strings",
                got: value.value_type(),
            }),
        }
    }

    impl_value_getters!(tag, tags, Tag);
    impl_value_getters!(date, dates, NaiveDate);
    impl_value_getters!(time, times, NaiveTime);
    impl_value_getters!(datetime, datetimes, DateTime<FixedOffset>);
    impl_value_getters!(uint8, uint8_slice, u8);
    impl_value_getters!(uint16, uint16_slice, u16);
    impl_value_getters!(int16, int16_slice, i16);
    impl_value_getters!(uint32, uint32_slice, u32);
    impl_value_getters!(int32, int32_slice, i32);
    impl_value_getters!(int64, int64_slice, i64);
    impl_value_getters!(uint64, uint64_slice, u64);
    impl_value_getters!(float32, float32_slice, f32);
    impl_value_getters!(float64, float64_slice, f64);
}

impl<I> fmt::Display for Value<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Primitive(v) => fmt::Display::fmt(v, f),
            Value::Sequence(seq) => write!(f, "sequence of {} item(s)", seq.multiplicity()),
        }
    }
}

/// A sequence of data set items, as used in values of the SQ representation.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSetSequence<I> {
    /// The item collection.
    items: C<I>,
}

impl<I> DataSetSequence<I> {
    /// Create a new data set sequence from a list of items.
    pub fn new(items: impl Into<C<I>>) -> Self {
        DataSetSequence {
            items: items.into(),
        }
    }

    /// Create an empty data set sequence.
    pub fn empty() -> Self {
        DataSetSequence { items: C::new() }
    }

    /// Gets a reference to the items.
    pub fn items(&self) -> &[I] {
        &self.items
    }

    /// Gets a mutable reference to the items.
    pub fn items_mut(&mut self) -> &mut C<I> {
        &mut self.items
    }

    /// Retrieve the collection of items, discarding the rest.
    pub fn into_items(self) -> C<I> {
        self.items
    }

    /// Obtain the number of items in the sequence.
    pub fn multiplicity(&self) -> usize {
        self.items.len()
    }

    /// Check whether the sequence has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<I> From<Vec<I>> for DataSetSequence<I> {
    fn from(items: Vec<I>) -> Self {
        DataSetSequence {
            items: items.into(),
        }
    }
}

impl<I> From<C<I>> for DataSetSequence<I> {
    fn from(items: C<I>) -> Self {
        DataSetSequence { items }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::EmptyObject;
    use smallvec::smallvec;

    #[test]
    fn to_int_on_a_primitive_value() {
        let value: Value<EmptyObject> = Value::new(PrimitiveValue::U16(smallvec![100]));
        assert_eq!(value.to_int::<u16>().unwrap(), 100);
    }

    #[test]
    fn sequences_do_not_convert() {
        let value: Value<u8> = Value::from_items(vec![1, 2]);
        assert_eq!(value.multiplicity(), 2);
        assert!(matches!(
            value.to_str(),
            Err(ConvertValueError {
                original: ValueType::DataSetSequence,
                ..
            })
        ));
        assert!(matches!(
            value.uint16(),
            Err(CastValueError {
                got: ValueType::DataSetSequence,
                ..
            })
        ));
    }

    #[test]
    fn items_access() {
        let mut value: Value<u8> = Value::from_items(vec![5]);
        assert_eq!(value.items(), Some(&[5][..]));
        value.items_mut().unwrap().push(6);
        assert_eq!(value.items(), Some(&[5, 6][..]));
        assert_eq!(value.primitive(), None);
    }
}
