//! Declaration and implementation of a DICOM primitive value.
//!
//! See [`PrimitiveValue`](./enum.PrimitiveValue.html).

use crate::header::Tag;
use crate::value::deserialize;
use crate::value::serialize::{date_to_text, datetime_to_text, time_to_text};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use itertools::Itertools;
use num_traits::NumCast;
use safe_transmute::to_bytes::transmute_to_bytes;
use smallvec::SmallVec;
use snafu::Snafu;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// An aggregation of one or more elements in a value.
pub type C<T> = SmallVec<[T; 2]>;

/// The specific type of a primitive or structured value,
/// as used in conversion error reports
/// and in value representation selection.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ValueType {
    /// No data. Maps to an empty byte buffer.
    Empty,
    /// A sequence of strings.
    Strs,
    /// A single string.
    Str,
    /// A sequence of attribute tags.
    Tags,
    /// A sequence of unsigned 8-bit integers.
    U8,
    /// A sequence of signed 16-bit integers.
    I16,
    /// A sequence of unsigned 16-bit integers.
    U16,
    /// A sequence of signed 32-bit integers.
    I32,
    /// A sequence of unsigned 32-bit integers.
    U32,
    /// A sequence of signed 64-bit integers.
    I64,
    /// A sequence of unsigned 64-bit integers.
    U64,
    /// A sequence of 32-bit floating point numbers.
    F32,
    /// A sequence of 64-bit floating point numbers.
    F64,
    /// A sequence of complete dates.
    Date,
    /// A sequence of complete date-time values.
    DateTime,
    /// A sequence of complete time values.
    Time,
    /// A nested data set sequence.
    DataSetSequence,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ValueType::Empty => "Empty",
            ValueType::Strs => "Strs",
            ValueType::Str => "Str",
            ValueType::Tags => "Tags",
            ValueType::U8 => "U8",
            ValueType::I16 => "I16",
            ValueType::U16 => "U16",
            ValueType::I32 => "I32",
            ValueType::U32 => "U32",
            ValueType::I64 => "I64",
            ValueType::U64 => "U64",
            ValueType::F32 => "F32",
            ValueType::F64 => "F64",
            ValueType::Date => "Date",
            ValueType::DateTime => "DateTime",
            ValueType::Time => "Time",
            ValueType::DataSetSequence => "DataSetSequence",
        };
        f.write_str(name)
    }
}

/// An error which occurs when fetching a value of one specific variant,
/// but the value is stored as a different variant.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(display("bad value cast: requested {} but value is {}", requested, got))]
pub struct CastValueError {
    /// The value variant requested
    pub requested: &'static str,
    /// The variant of the value currently in the element
    pub got: ValueType,
}

/// An error which occurs
/// when converting a value into another representation,
/// possibly including a parsing step.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(display("could not convert {} value to a {}", original, requested))]
pub struct ConvertValueError {
    /// The target type requested
    pub requested: &'static str,
    /// The variant of the value currently in the element
    pub original: ValueType,
    /// The underlying cause of the failure, if available
    pub cause: Option<InvalidValueReadError>,
}

/// An error which occurs when interpreting the contents of a value
/// as another data type.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[non_exhaustive]
pub enum InvalidValueReadError {
    /// Failed to parse text value as an integer
    ParseInteger {
        /// the underlying integer parser error
        source: std::num::ParseIntError,
    },
    /// Failed to parse text value as a floating point number
    ParseFloat {
        /// the underlying number parser error
        source: std::num::ParseFloatError,
    },
    /// Failed to parse text value as a date, time or date-time
    ParseDateTime {
        /// the underlying date-time parser error
        source: deserialize::Error,
    },
    /// Failed to parse text value as an attribute tag
    ParseTag {
        /// the underlying tag parser error
        source: crate::header::ParseTagError,
    },
    /// The value does not fit in the requested numeric type
    #[snafu(display("value `{}` cannot be represented in the requested width", value))]
    NarrowConvert {
        /// the textual form of the offending value
        value: String,
    },
}

/// An enum representing a primitive value from a DICOM element.
///
/// Multiple elements are contained in a [`smallvec`] vector,
/// conveniently aliased to the type [`C`].
///
/// `From` conversions into `PrimitiveValue` exist
/// for single element types,
/// including numeric types, `String`, `&str`,
/// slices and vectors of numeric types,
/// and chrono date and time types.
///
/// # Example
///
/// ```
/// # use dcmset_core::PrimitiveValue;
/// # use smallvec::smallvec;
/// let value = PrimitiveValue::from("Smith^John");
/// assert_eq!(value, PrimitiveValue::Str("Smith^John".to_string()));
/// assert_eq!(value.multiplicity(), 1);
///
/// let value = PrimitiveValue::from(512_u16);
/// assert_eq!(value, PrimitiveValue::U16(smallvec![512]));
/// ```
///
/// [`smallvec`]: ../../smallvec/index.html
/// [`C`]: ./type.C.html
#[derive(Debug, PartialEq, Clone)]
pub enum PrimitiveValue {
    /// No data. Usually employed for zero-lengthed values.
    Empty,

    /// A sequence of strings.
    /// Used for AE, AS, PN, SH, CS, LO, UI and UC.
    /// Can also be used for IS, SS, DS, DA, DT and TM when decoding
    /// with format preservation.
    Strs(C<String>),

    /// A single string.
    /// Used for ST, LT, UT and UR, which are never multi-valued.
    Str(String),

    /// A sequence of attribute tags.
    /// Used specifically for AT.
    Tags(C<Tag>),

    /// The value is a sequence of unsigned 8-bit integers.
    /// Used for OB and UN.
    U8(C<u8>),

    /// The value is a sequence of signed 16-bit integers.
    /// Used for SS.
    I16(C<i16>),

    /// A sequence of unsigned 16-bit integers.
    /// Used for US and OW.
    U16(C<u16>),

    /// A sequence of signed 32-bit integers.
    /// Used for SL and IS.
    I32(C<i32>),

    /// A sequence of unsigned 32-bit integers.
    /// Used for UL and OL.
    U32(C<u32>),

    /// A sequence of signed 64-bit integers.
    /// Used for SV.
    I64(C<i64>),

    /// A sequence of unsigned 64-bit integers.
    /// Used for UV and OV.
    U64(C<u64>),

    /// The value is a sequence of 32-bit floating point numbers.
    /// Used for OF and FL.
    F32(C<f32>),

    /// The value is a sequence of 64-bit floating point numbers.
    /// Used for OD, FD and DS.
    F64(C<f64>),

    /// A sequence of complete dates.
    /// Used for the DA representation.
    Date(C<NaiveDate>),

    /// A sequence of complete date-time values.
    /// Used for the DT representation.
    DateTime(C<DateTime<FixedOffset>>),

    /// A sequence of complete time values.
    /// Used for the TM representation.
    Time(C<NaiveTime>),
}

/// A utility macro for implementing the conversion from a core type into a
/// DICOM primitive value with a single element.
macro_rules! impl_from_for_primitive {
    ($typ: ty, $variant: ident) => {
        impl From<$typ> for PrimitiveValue {
            fn from(value: $typ) -> Self {
                PrimitiveValue::$variant(C::from_elem(value, 1))
            }
        }
    };
}

impl_from_for_primitive!(u8, U8);
impl_from_for_primitive!(u16, U16);
impl_from_for_primitive!(i16, I16);
impl_from_for_primitive!(u32, U32);
impl_from_for_primitive!(i32, I32);
impl_from_for_primitive!(u64, U64);
impl_from_for_primitive!(i64, I64);
impl_from_for_primitive!(f32, F32);
impl_from_for_primitive!(f64, F64);

impl_from_for_primitive!(Tag, Tags);
impl_from_for_primitive!(NaiveDate, Date);
impl_from_for_primitive!(NaiveTime, Time);
impl_from_for_primitive!(DateTime<FixedOffset>, DateTime);

impl From<String> for PrimitiveValue {
    fn from(value: String) -> Self {
        PrimitiveValue::Str(value)
    }
}

impl From<&str> for PrimitiveValue {
    fn from(value: &str) -> Self {
        PrimitiveValue::Str(value.to_owned())
    }
}

impl From<Vec<String>> for PrimitiveValue {
    fn from(value: Vec<String>) -> Self {
        PrimitiveValue::Strs(value.into())
    }
}

impl From<&[&str]> for PrimitiveValue {
    fn from(value: &[&str]) -> Self {
        PrimitiveValue::Strs(value.iter().map(|s| (*s).to_owned()).collect())
    }
}

macro_rules! impl_from_seq_for_primitive {
    ($typ: ty, $variant: ident) => {
        impl From<Vec<$typ>> for PrimitiveValue {
            fn from(value: Vec<$typ>) -> Self {
                PrimitiveValue::$variant(C::from(value))
            }
        }

        impl From<&[$typ]> for PrimitiveValue {
            fn from(value: &[$typ]) -> Self {
                PrimitiveValue::$variant(C::from_slice(value))
            }
        }
    };
}

impl_from_seq_for_primitive!(u8, U8);
impl_from_seq_for_primitive!(u16, U16);
impl_from_seq_for_primitive!(i16, I16);
impl_from_seq_for_primitive!(u32, U32);
impl_from_seq_for_primitive!(i32, I32);
impl_from_seq_for_primitive!(u64, U64);
impl_from_seq_for_primitive!(i64, I64);
impl_from_seq_for_primitive!(f32, F32);
impl_from_seq_for_primitive!(f64, F64);
impl_from_seq_for_primitive!(Tag, Tags);

impl PrimitiveValue {
    /// Obtain the number of individual elements. This number may not
    /// match the DICOM value multiplicity in some value representations.
    pub fn multiplicity(&self) -> usize {
        use self::PrimitiveValue::*;
        match self {
            Empty => 0,
            Str(_) => 1,
            Strs(c) => c.len(),
            Tags(c) => c.len(),
            U8(c) => c.len(),
            I16(c) => c.len(),
            U16(c) => c.len(),
            I32(c) => c.len(),
            U32(c) => c.len(),
            I64(c) => c.len(),
            U64(c) => c.len(),
            F32(c) => c.len(),
            F64(c) => c.len(),
            Date(c) => c.len(),
            DateTime(c) => c.len(),
            Time(c) => c.len(),
        }
    }

    /// Check whether the value holds no elements.
    pub fn is_empty(&self) -> bool {
        self.multiplicity() == 0
    }

    /// Retrieve the specific variant of this value.
    pub fn value_type(&self) -> ValueType {
        use self::PrimitiveValue::*;
        match self {
            Empty => ValueType::Empty,
            Str(_) => ValueType::Str,
            Strs(_) => ValueType::Strs,
            Tags(_) => ValueType::Tags,
            U8(_) => ValueType::U8,
            I16(_) => ValueType::I16,
            U16(_) => ValueType::U16,
            I32(_) => ValueType::I32,
            U32(_) => ValueType::U32,
            I64(_) => ValueType::I64,
            U64(_) => ValueType::U64,
            F32(_) => ValueType::F32,
            F64(_) => ValueType::F64,
            Date(_) => ValueType::Date,
            DateTime(_) => ValueType::DateTime,
            Time(_) => ValueType::Time,
        }
    }

    /// Obtain a single-element copy of the value at the given index,
    /// or `None` if the index is out of bounds.
    pub fn nth(&self, index: usize) -> Option<PrimitiveValue> {
        use self::PrimitiveValue::*;
        match self {
            Empty => None,
            Str(s) => {
                if index == 0 {
                    Some(Str(s.clone()))
                } else {
                    None
                }
            }
            Strs(c) => c.get(index).map(|v| Str(v.clone())),
            Tags(c) => c.get(index).copied().map(PrimitiveValue::from),
            U8(c) => c.get(index).copied().map(PrimitiveValue::from),
            I16(c) => c.get(index).copied().map(PrimitiveValue::from),
            U16(c) => c.get(index).copied().map(PrimitiveValue::from),
            I32(c) => c.get(index).copied().map(PrimitiveValue::from),
            U32(c) => c.get(index).copied().map(PrimitiveValue::from),
            I64(c) => c.get(index).copied().map(PrimitiveValue::from),
            U64(c) => c.get(index).copied().map(PrimitiveValue::from),
            F32(c) => c.get(index).copied().map(PrimitiveValue::from),
            F64(c) => c.get(index).copied().map(PrimitiveValue::from),
            Date(c) => c.get(index).copied().map(PrimitiveValue::from),
            DateTime(c) => c.get(index).copied().map(PrimitiveValue::from),
            Time(c) => c.get(index).copied().map(PrimitiveValue::from),
        }
    }

    fn conversion_failure(
        &self,
        requested: &'static str,
        cause: Option<InvalidValueReadError>,
    ) -> ConvertValueError {
        ConvertValueError {
            requested,
            original: self.value_type(),
            cause,
        }
    }

    /// Convert the primitive value into a string representation.
    ///
    /// String values already encoded with the `Str` and `Strs` variants
    /// are provided with trailing whitespace and null padding trimmed.
    /// In the case of `Strs`, the strings are joined together
    /// with a backslash (`'\\'`).
    /// All other type variants are first converted to a string,
    /// then joined together with a backslash.
    pub fn to_str(&self) -> Cow<'_, str> {
        fn trim_padding(s: &str) -> &str {
            s.trim_end_matches(|c: char| c.is_whitespace() || c == '\u{0}')
        }
        match self {
            PrimitiveValue::Empty => Cow::from(""),
            PrimitiveValue::Str(values) => Cow::from(trim_padding(values)),
            PrimitiveValue::Strs(values) => {
                if values.len() == 1 {
                    Cow::from(trim_padding(&values[0]))
                } else {
                    Cow::from(values.iter().map(|s| trim_padding(s)).join("\\"))
                }
            }
            prim => Cow::from(prim.to_string()),
        }
    }

    /// Convert the full primitive value into a sequence of strings.
    ///
    /// If the value is a `Strs`, it is provided without copying.
    /// All other type variants are converted
    /// into a vector of their textual forms.
    pub fn to_multi_str(&self) -> Cow<'_, [String]> {
        use self::PrimitiveValue::*;
        match self {
            Empty => Cow::Owned(Vec::new()),
            Strs(values) => Cow::Borrowed(&values[..]),
            Str(s) => Cow::Owned(vec![s.clone()]),
            Tags(c) => Cow::Owned(c.iter().map(|v| v.to_string()).collect()),
            U8(c) => Cow::Owned(c.iter().map(|v| v.to_string()).collect()),
            I16(c) => Cow::Owned(c.iter().map(|v| v.to_string()).collect()),
            U16(c) => Cow::Owned(c.iter().map(|v| v.to_string()).collect()),
            I32(c) => Cow::Owned(c.iter().map(|v| v.to_string()).collect()),
            U32(c) => Cow::Owned(c.iter().map(|v| v.to_string()).collect()),
            I64(c) => Cow::Owned(c.iter().map(|v| v.to_string()).collect()),
            U64(c) => Cow::Owned(c.iter().map(|v| v.to_string()).collect()),
            F32(c) => Cow::Owned(c.iter().map(|v| v.to_string()).collect()),
            F64(c) => Cow::Owned(c.iter().map(|v| v.to_string()).collect()),
            Date(c) => Cow::Owned(c.iter().map(|v| date_to_text(*v)).collect()),
            DateTime(c) => Cow::Owned(c.iter().map(|v| datetime_to_text(*v)).collect()),
            Time(c) => Cow::Owned(c.iter().map(|v| time_to_text(*v)).collect()),
        }
    }

    /// Retrieve this DICOM value as raw bytes.
    ///
    /// Binary numeric values are returned with a reinterpretation
    /// of the holding vector's occupied data block as bytes,
    /// without copying,
    /// under the platform's native byte order.
    ///
    /// String values are provided as their bytes in UTF-8;
    /// in the case of `Strs`, the strings are joined together
    /// with a backslash (`'\\'`).
    /// Other variants are first converted to their textual form.
    pub fn to_bytes(&self) -> Cow<'_, [u8]> {
        match self {
            PrimitiveValue::Empty => Cow::from(&[][..]),
            PrimitiveValue::U8(values) => Cow::from(&values[..]),
            PrimitiveValue::U16(values) => Cow::Borrowed(transmute_to_bytes(values)),
            PrimitiveValue::I16(values) => Cow::Borrowed(transmute_to_bytes(values)),
            PrimitiveValue::U32(values) => Cow::Borrowed(transmute_to_bytes(values)),
            PrimitiveValue::I32(values) => Cow::Borrowed(transmute_to_bytes(values)),
            PrimitiveValue::I64(values) => Cow::Borrowed(transmute_to_bytes(values)),
            PrimitiveValue::U64(values) => Cow::Borrowed(transmute_to_bytes(values)),
            PrimitiveValue::F32(values) => Cow::Borrowed(transmute_to_bytes(values)),
            PrimitiveValue::F64(values) => Cow::Borrowed(transmute_to_bytes(values)),
            PrimitiveValue::Str(values) => Cow::from(values.as_bytes()),
            PrimitiveValue::Strs(values) => {
                if values.len() == 1 {
                    // no need to copy if it's a single string
                    Cow::from(values[0].as_bytes())
                } else {
                    Cow::from(values.iter().join("\\").into_bytes())
                }
            }
            prim => Cow::from(prim.to_string().into_bytes()),
        }
    }

    /// Retrieve and convert the primitive value into an integer.
    ///
    /// If the value is a string or sequence of strings,
    /// the first string is parsed to obtain an integer.
    /// If the value is already a numeric type,
    /// the first number is converted, failing if it cannot be represented
    /// in the requested width.
    pub fn to_int<T>(&self) -> Result<T, ConvertValueError>
    where
        T: NumCast,
        T: FromStr<Err = std::num::ParseIntError>,
    {
        macro_rules! cast_first {
            ($c: expr) => {
                NumCast::from($c[0]).ok_or_else(|| {
                    self.conversion_failure(
                        "integer",
                        Some(InvalidValueReadError::NarrowConvert {
                            value: $c[0].to_string(),
                        }),
                    )
                })
            };
        }
        use self::PrimitiveValue::*;
        match self {
            Str(s) => s.trim().parse().map_err(|source| {
                self.conversion_failure(
                    "integer",
                    Some(InvalidValueReadError::ParseInteger { source }),
                )
            }),
            Strs(c) if !c.is_empty() => c[0].trim().parse().map_err(|source| {
                self.conversion_failure(
                    "integer",
                    Some(InvalidValueReadError::ParseInteger { source }),
                )
            }),
            U8(c) if !c.is_empty() => cast_first!(c),
            I16(c) if !c.is_empty() => cast_first!(c),
            U16(c) if !c.is_empty() => cast_first!(c),
            I32(c) if !c.is_empty() => cast_first!(c),
            U32(c) if !c.is_empty() => cast_first!(c),
            I64(c) if !c.is_empty() => cast_first!(c),
            U64(c) if !c.is_empty() => cast_first!(c),
            _ => Err(self.conversion_failure("integer", None)),
        }
    }

    /// Retrieve and convert the full primitive value
    /// into a sequence of integers.
    pub fn to_multi_int<T>(&self) -> Result<Vec<T>, ConvertValueError>
    where
        T: NumCast,
        T: FromStr<Err = std::num::ParseIntError>,
    {
        macro_rules! cast_all {
            ($c: expr) => {
                $c.iter()
                    .map(|v| {
                        NumCast::from(*v).ok_or_else(|| {
                            self.conversion_failure(
                                "integer",
                                Some(InvalidValueReadError::NarrowConvert {
                                    value: v.to_string(),
                                }),
                            )
                        })
                    })
                    .collect()
            };
        }
        use self::PrimitiveValue::*;
        match self {
            Empty => Ok(Vec::new()),
            Str(s) => {
                let out = s.trim().parse().map_err(|source| {
                    self.conversion_failure(
                        "integer",
                        Some(InvalidValueReadError::ParseInteger { source }),
                    )
                })?;
                Ok(vec![out])
            }
            Strs(c) => c
                .iter()
                .map(|s| {
                    s.trim().parse().map_err(|source| {
                        self.conversion_failure(
                            "integer",
                            Some(InvalidValueReadError::ParseInteger { source }),
                        )
                    })
                })
                .collect(),
            U8(c) => cast_all!(c),
            I16(c) => cast_all!(c),
            U16(c) => cast_all!(c),
            I32(c) => cast_all!(c),
            U32(c) => cast_all!(c),
            I64(c) => cast_all!(c),
            U64(c) => cast_all!(c),
            _ => Err(self.conversion_failure("integer", None)),
        }
    }

    /// Retrieve and convert the primitive value
    /// into a single-precision floating point number.
    pub fn to_float32(&self) -> Result<f32, ConvertValueError> {
        self.first_float("float32").map(|v| v as f32)
    }

    /// Retrieve and convert the primitive value
    /// into a double-precision floating point number.
    pub fn to_float64(&self) -> Result<f64, ConvertValueError> {
        self.first_float("float64")
    }

    fn first_float(&self, requested: &'static str) -> Result<f64, ConvertValueError> {
        macro_rules! cast_first {
            ($c: expr) => {
                NumCast::from($c[0]).ok_or_else(|| {
                    self.conversion_failure(
                        requested,
                        Some(InvalidValueReadError::NarrowConvert {
                            value: $c[0].to_string(),
                        }),
                    )
                })
            };
        }
        use self::PrimitiveValue::*;
        match self {
            Str(s) => s.trim().parse().map_err(|source| {
                self.conversion_failure(
                    requested,
                    Some(InvalidValueReadError::ParseFloat { source }),
                )
            }),
            Strs(c) if !c.is_empty() => c[0].trim().parse().map_err(|source| {
                self.conversion_failure(
                    requested,
                    Some(InvalidValueReadError::ParseFloat { source }),
                )
            }),
            F32(c) if !c.is_empty() => Ok(c[0].into()),
            F64(c) if !c.is_empty() => Ok(c[0]),
            U8(c) if !c.is_empty() => cast_first!(c),
            I16(c) if !c.is_empty() => cast_first!(c),
            U16(c) if !c.is_empty() => cast_first!(c),
            I32(c) if !c.is_empty() => cast_first!(c),
            U32(c) if !c.is_empty() => cast_first!(c),
            I64(c) if !c.is_empty() => cast_first!(c),
            U64(c) if !c.is_empty() => cast_first!(c),
            _ => Err(self.conversion_failure(requested, None)),
        }
    }

    /// Retrieve and convert the full primitive value
    /// into a sequence of single-precision floating point numbers.
    pub fn to_multi_float32(&self) -> Result<Vec<f32>, ConvertValueError> {
        Ok(self
            .to_multi_float64()?
            .into_iter()
            .map(|v| v as f32)
            .collect())
    }

    /// Retrieve and convert the full primitive value
    /// into a sequence of double-precision floating point numbers.
    pub fn to_multi_float64(&self) -> Result<Vec<f64>, ConvertValueError> {
        macro_rules! cast_all {
            ($c: expr) => {
                Ok($c.iter().map(|v| (*v).into()).collect())
            };
        }
        use self::PrimitiveValue::*;
        match self {
            Empty => Ok(Vec::new()),
            Str(s) => {
                let out = s.trim().parse().map_err(|source| {
                    self.conversion_failure(
                        "float64",
                        Some(InvalidValueReadError::ParseFloat { source }),
                    )
                })?;
                Ok(vec![out])
            }
            Strs(c) => c
                .iter()
                .map(|s| {
                    s.trim().parse().map_err(|source| {
                        self.conversion_failure(
                            "float64",
                            Some(InvalidValueReadError::ParseFloat { source }),
                        )
                    })
                })
                .collect(),
            F32(c) => cast_all!(c),
            F64(c) => Ok(c.to_vec()),
            U8(c) => cast_all!(c),
            I16(c) => cast_all!(c),
            U16(c) => cast_all!(c),
            I32(c) => cast_all!(c),
            U32(c) => cast_all!(c),
            I64(c) => Ok(c.iter().map(|v| *v as f64).collect()),
            U64(c) => Ok(c.iter().map(|v| *v as f64).collect()),
            _ => Err(self.conversion_failure("float64", None)),
        }
    }

    /// Retrieve and convert the primitive value into a date.
    ///
    /// If the value is already represented as a date, it is returned as is.
    /// If the value is a string or sequence of strings,
    /// the first string is decoded as a date in the DICOM textual form.
    pub fn to_date(&self) -> Result<NaiveDate, ConvertValueError> {
        use self::PrimitiveValue::*;
        match self {
            Date(c) if !c.is_empty() => Ok(c[0]),
            Str(s) => deserialize::parse_date(s).map_err(|source| {
                self.conversion_failure(
                    "date",
                    Some(InvalidValueReadError::ParseDateTime { source }),
                )
            }),
            Strs(c) if !c.is_empty() => deserialize::parse_date(&c[0]).map_err(|source| {
                self.conversion_failure(
                    "date",
                    Some(InvalidValueReadError::ParseDateTime { source }),
                )
            }),
            _ => Err(self.conversion_failure("date", None)),
        }
    }

    /// Retrieve and convert the full primitive value
    /// into a sequence of dates.
    ///
    /// If the value is already represented as dates,
    /// they are returned as is.
    /// String values are decoded as dates in the DICOM textual form.
    pub fn to_multi_date(&self) -> Result<Vec<NaiveDate>, ConvertValueError> {
        use self::PrimitiveValue::*;
        match self {
            Empty => Ok(Vec::new()),
            Date(c) => Ok(c.to_vec()),
            Str(s) => deserialize::parse_date(s).map(|date| vec![date]).map_err(
                |source| {
                    self.conversion_failure(
                        "date",
                        Some(InvalidValueReadError::ParseDateTime { source }),
                    )
                },
            ),
            Strs(c) => c
                .iter()
                .map(|s| {
                    deserialize::parse_date(s).map_err(|source| {
                        self.conversion_failure(
                            "date",
                            Some(InvalidValueReadError::ParseDateTime { source }),
                        )
                    })
                })
                .collect(),
            _ => Err(self.conversion_failure("date", None)),
        }
    }

    /// Retrieve and convert the primitive value into a time.
    pub fn to_time(&self) -> Result<NaiveTime, ConvertValueError> {
        use self::PrimitiveValue::*;
        match self {
            Time(c) if !c.is_empty() => Ok(c[0]),
            Str(s) => deserialize::parse_time(s).map_err(|source| {
                self.conversion_failure(
                    "time",
                    Some(InvalidValueReadError::ParseDateTime { source }),
                )
            }),
            Strs(c) if !c.is_empty() => deserialize::parse_time(&c[0]).map_err(|source| {
                self.conversion_failure(
                    "time",
                    Some(InvalidValueReadError::ParseDateTime { source }),
                )
            }),
            _ => Err(self.conversion_failure("time", None)),
        }
    }

    /// Retrieve and convert the full primitive value
    /// into a sequence of times.
    pub fn to_multi_time(&self) -> Result<Vec<NaiveTime>, ConvertValueError> {
        use self::PrimitiveValue::*;
        match self {
            Empty => Ok(Vec::new()),
            Time(c) => Ok(c.to_vec()),
            Str(s) => deserialize::parse_time(s).map(|time| vec![time]).map_err(
                |source| {
                    self.conversion_failure(
                        "time",
                        Some(InvalidValueReadError::ParseDateTime { source }),
                    )
                },
            ),
            Strs(c) => c
                .iter()
                .map(|s| {
                    deserialize::parse_time(s).map_err(|source| {
                        self.conversion_failure(
                            "time",
                            Some(InvalidValueReadError::ParseDateTime { source }),
                        )
                    })
                })
                .collect(),
            _ => Err(self.conversion_failure("time", None)),
        }
    }

    /// Retrieve and convert the primitive value into a date-time.
    pub fn to_datetime(&self) -> Result<DateTime<FixedOffset>, ConvertValueError> {
        use self::PrimitiveValue::*;
        match self {
            DateTime(c) if !c.is_empty() => Ok(c[0]),
            Str(s) => deserialize::parse_datetime(s).map_err(|source| {
                self.conversion_failure(
                    "date-time",
                    Some(InvalidValueReadError::ParseDateTime { source }),
                )
            }),
            Strs(c) if !c.is_empty() => deserialize::parse_datetime(&c[0]).map_err(|source| {
                self.conversion_failure(
                    "date-time",
                    Some(InvalidValueReadError::ParseDateTime { source }),
                )
            }),
            _ => Err(self.conversion_failure("date-time", None)),
        }
    }

    /// Retrieve and convert the full primitive value
    /// into a sequence of date-times.
    pub fn to_multi_datetime(&self) -> Result<Vec<DateTime<FixedOffset>>, ConvertValueError> {
        use self::PrimitiveValue::*;
        match self {
            Empty => Ok(Vec::new()),
            DateTime(c) => Ok(c.to_vec()),
            Str(s) => deserialize::parse_datetime(s)
                .map(|dt| vec![dt])
                .map_err(|source| {
                    self.conversion_failure(
                        "date-time",
                        Some(InvalidValueReadError::ParseDateTime { source }),
                    )
                }),
            Strs(c) => c
                .iter()
                .map(|s| {
                    deserialize::parse_datetime(s).map_err(|source| {
                        self.conversion_failure(
                            "date-time",
                            Some(InvalidValueReadError::ParseDateTime { source }),
                        )
                    })
                })
                .collect(),
            _ => Err(self.conversion_failure("date-time", None)),
        }
    }

    /// Retrieve and convert the primitive value into an attribute tag.
    ///
    /// String values are parsed in the `GGGG,EEEE` form.
    pub fn to_tag(&self) -> Result<Tag, ConvertValueError> {
        use self::PrimitiveValue::*;
        match self {
            Tags(c) if !c.is_empty() => Ok(c[0]),
            Str(s) => s.trim().parse().map_err(|source| {
                self.conversion_failure("tag", Some(InvalidValueReadError::ParseTag { source }))
            }),
            Strs(c) if !c.is_empty() => c[0].trim().parse().map_err(|source| {
                self.conversion_failure("tag", Some(InvalidValueReadError::ParseTag { source }))
            }),
            _ => Err(self.conversion_failure("tag", None)),
        }
    }
}

/// Macro for implementing getters to single and multi-values of each variant.
///
/// Should be placed inside `PrimitiveValue`'s impl block.
macro_rules! impl_primitive_getters {
    ($name_single: ident, $name_multi: ident, $variant: ident, $ret: ty) => {
        /// Get a single value of the requested type.
        /// If it contains multiple values,
        /// only the first one is returned.
        /// An error is returned if the variant is not compatible.
        pub fn $name_single(&self) -> Result<$ret, CastValueError> {
            match self {
                PrimitiveValue::$variant(c) if !c.is_empty() => Ok(c[0]),
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
                PrimitiveValue::$variant(c) => Ok(&c[..]),
                value => Err(CastValueError {
                    requested: stringify!($name_multi),
                    got: value.value_type(),
                }),
            }
        }
    };
}

impl PrimitiveValue {
    /// Get a single string value.
    ///
    /// If the value contains multiple strings, only the first one is returned.
    ///
    /// An error is returned if the variant is not compatible.
    /// To enable conversions of other variants to a textual representation,
    /// see [`to_str()`](PrimitiveValue::to_str) instead.
    pub fn string(&self) -> Result<&str, CastValueError> {
        match self {
            PrimitiveValue::Str(s) => Ok(s),
            PrimitiveValue::Strs(c) if !c.is_empty() => Ok(&c[0]),
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
            PrimitiveValue::Strs(c) => Ok(&c[..]),
            value => Err(CastValueError {
                requested: "strings",
                got: value.value_type(),
            }),
        }
    }

    impl_primitive_getters!(tag, tags, Tags, Tag);
    impl_primitive_getters!(date, dates, Date, NaiveDate);
    impl_primitive_getters!(time, times, Time, NaiveTime);
    impl_primitive_getters!(datetime, datetimes, DateTime, DateTime<FixedOffset>);
    impl_primitive_getters!(uint8, uint8_slice, U8, u8);
    impl_primitive_getters!(uint16, uint16_slice, U16, u16);
    impl_primitive_getters!(int16, int16_slice, I16, i16);
    impl_primitive_getters!(uint32, uint32_slice, U32, u32);
    impl_primitive_getters!(int32, int32_slice, I32, i32);
    impl_primitive_getters!(int64, int64_slice, I64, i64);
    impl_primitive_getters!(uint64, uint64_slice, U64, u64);
    impl_primitive_getters!(float32, float32_slice, F32, f32);
    impl_primitive_getters!(float64, float64_slice, F64, f64);
}

impl fmt::Display for PrimitiveValue {
    /// Format the value as its DICOM textual form,
    /// with multiple values joined by a backslash (`'\\'`).
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::PrimitiveValue::*;
        match self {
            Empty => Ok(()),
            Str(s) => f.write_str(s),
            Strs(c) => f.write_str(&c.iter().join("\\")),
            Tags(c) => f.write_str(&c.iter().join("\\")),
            U8(c) => f.write_str(&c.iter().join("\\")),
            I16(c) => f.write_str(&c.iter().join("\\")),
            U16(c) => f.write_str(&c.iter().join("\\")),
            I32(c) => f.write_str(&c.iter().join("\\")),
            U32(c) => f.write_str(&c.iter().join("\\")),
            I64(c) => f.write_str(&c.iter().join("\\")),
            U64(c) => f.write_str(&c.iter().join("\\")),
            F32(c) => f.write_str(&c.iter().join("\\")),
            F64(c) => f.write_str(&c.iter().join("\\")),
            Date(c) => f.write_str(&c.iter().map(|v| date_to_text(*v)).join("\\")),
            DateTime(c) => f.write_str(&c.iter().map(|v| datetime_to_text(*v)).join("\\")),
            Time(c) => f.write_str(&c.iter().map(|v| time_to_text(*v)).join("\\")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn primitive_value_to_str() {
        assert_eq!(PrimitiveValue::Empty.to_str(), "");

        // does not copy on a single string
        let value = PrimitiveValue::Str("Smith^John".to_string());
        let string = value.to_str();
        assert_eq!(string, "Smith^John");
        match string {
            Cow::Borrowed(_) => {}
            _ => panic!("expected string to be borrowed, but was owned"),
        }

        assert_eq!(
            PrimitiveValue::Date(smallvec![NaiveDate::from_ymd_opt(2014, 10, 12).unwrap()])
                .to_str(),
            "20141012",
        );
        assert_eq!(
            PrimitiveValue::Strs(smallvec![
                "DERIVED".to_string(),
                "PRIMARY".to_string(),
                "WHOLE BODY".to_string(),
            ])
            .to_str(),
            "DERIVED\\PRIMARY\\WHOLE BODY",
        );

        // trailing whitespace and null padding are trimmed
        let value = PrimitiveValue::from("1.2.345\0");
        assert_eq!(&value.to_str(), "1.2.345");
        let value = PrimitiveValue::from("CT ");
        assert_eq!(&value.to_str(), "CT");
        let value = PrimitiveValue::Strs(smallvec![
            "1.2.840.10008.5.1.4.1.1.7\0".to_string(),
        ]);
        assert_eq!(&value.to_str(), "1.2.840.10008.5.1.4.1.1.7");
    }

    #[test]
    fn primitive_value_to_bytes() {
        let value = PrimitiveValue::U8(smallvec![1, 2, 5]);
        assert_eq!(value.to_bytes(), &[1, 2, 5][..]);

        let value = PrimitiveValue::from("Smith^John");
        assert_eq!(value.to_bytes(), &b"Smith^John"[..]);
    }

    #[test]
    fn primitive_value_to_int() {
        let value = PrimitiveValue::U16(smallvec![256, 0, 16]);
        assert_eq!(value.to_int::<u32>().unwrap(), 256);

        let value = PrimitiveValue::from("-73");
        assert_eq!(value.to_int::<i32>().unwrap(), -73);

        // overflow is reported instead of truncated
        let value = PrimitiveValue::U16(smallvec![256]);
        assert!(matches!(
            value.to_int::<u8>(),
            Err(ConvertValueError {
                requested: "integer",
                ..
            })
        ));
    }

    #[test]
    fn primitive_value_to_multi_int() {
        let value = PrimitiveValue::Strs(smallvec![
            "1".to_string(),
            "2".to_string(),
            "3".to_string(),
        ]);
        assert_eq!(value.to_multi_int::<u16>().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn primitive_value_to_float() {
        let value = PrimitiveValue::from("1.25");
        assert_eq!(value.to_float64().unwrap(), 1.25);

        let value = PrimitiveValue::F64(smallvec![0.5, 1.5]);
        assert_eq!(value.to_multi_float64().unwrap(), vec![0.5, 1.5]);

        // single-precision values widen losslessly
        let value = PrimitiveValue::F32(smallvec![0.5_f32, 2.25]);
        assert_eq!(value.to_float64().unwrap(), 0.5);
        assert_eq!(value.to_multi_float64().unwrap(), vec![0.5, 2.25]);
    }

    #[test]
    fn primitive_value_to_multi_date_time() {
        let value = PrimitiveValue::Strs(smallvec![
            "20141012".to_string(),
            "20200229".to_string(),
        ]);
        assert_eq!(
            value.to_multi_date().unwrap(),
            vec![
                NaiveDate::from_ymd_opt(2014, 10, 12).unwrap(),
                NaiveDate::from_ymd_opt(2020, 2, 29).unwrap(),
            ],
        );

        let value = PrimitiveValue::from("131415");
        assert_eq!(
            value.to_multi_time().unwrap(),
            vec![NaiveTime::from_hms_opt(13, 14, 15).unwrap()],
        );

        let value = PrimitiveValue::Strs(smallvec!["20141012131415".to_string()]);
        let parsed = value.to_multi_datetime().unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(
            parsed[0].naive_utc(),
            NaiveDate::from_ymd_opt(2014, 10, 12)
                .unwrap()
                .and_hms_opt(13, 14, 15)
                .unwrap(),
        );

        // a value which is not date-like is reported
        assert!(PrimitiveValue::U16(smallvec![2014]).to_multi_date().is_err());
    }

    #[test]
    fn primitive_value_nth() {
        let value = PrimitiveValue::U16(smallvec![10, 20, 30]);
        assert_eq!(value.nth(1), Some(PrimitiveValue::from(20u16)));
        assert_eq!(value.nth(3), None);
        assert_eq!(PrimitiveValue::Empty.nth(0), None);
    }

    #[test]
    fn primitive_value_to_tag() {
        let value = PrimitiveValue::from(Tag(0x0010, 0x0010));
        assert_eq!(value.to_tag().unwrap(), Tag(0x0010, 0x0010));

        let value = PrimitiveValue::from("0008,103E");
        assert_eq!(value.to_tag().unwrap(), Tag(0x0008, 0x103E));
    }
}
