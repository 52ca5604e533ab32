//! This module contains an assortment of types required for interpreting DICOM
//! data elements. It comprises the DICOM attribute tag, the value
//! representation enumeration, and the element composite type.

use crate::value::{
    CastValueError, ConvertValueError, DateRange, DateTimeRange, PrimitiveValue, TimeRange, Value,
};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use num_traits::NumCast;
use snafu::{ensure, OptionExt, ResultExt, Snafu};
use std::borrow::Cow;
use std::fmt;
use std::str::{from_utf8, FromStr};

/// Idiomatic alias for a tag's group number.
pub type GroupNumber = u16;
/// Idiomatic alias for a tag's element number.
pub type ElementNumber = u16;

/// The data type for DICOM data element tags.
///
/// Tags are comparable and orderable by their `(group, element)` pair.
/// Both `(u16, u16)` and `[u16; 2]` can be efficiently converted
/// to this type.
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy)]
pub struct Tag(pub GroupNumber, pub ElementNumber);

impl Tag {
    /// Getter for the tag's group value.
    #[inline]
    pub fn group(self) -> GroupNumber {
        self.0
    }

    /// Getter for the tag's element value.
    #[inline]
    pub fn element(self) -> ElementNumber {
        self.1
    }

    /// Check whether this tag lies in a private (odd) group.
    #[inline]
    pub fn is_private(self) -> bool {
        self.0 & 1 == 1
    }

    /// Check whether this is a group length tag (element `0000`).
    #[inline]
    pub fn is_group_length(self) -> bool {
        self.1 == 0
    }

    /// Check whether this tag is a private creator slot,
    /// that is, a tag of the form `(gggg,00BB)`
    /// where `gggg` is odd and `BB` is between `0x10` and `0xFF`.
    #[inline]
    pub fn is_private_creator(self) -> bool {
        self.is_private() && (0x0010..=0x00FF).contains(&self.1)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tag({:#06X?}, {:#06X?})", self.0, self.1)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.0, self.1)
    }
}

impl PartialEq<(u16, u16)> for Tag {
    fn eq(&self, other: &(u16, u16)) -> bool {
        self.0 == other.0 && self.1 == other.1
    }
}

impl PartialEq<[u16; 2]> for Tag {
    fn eq(&self, other: &[u16; 2]) -> bool {
        self.0 == other[0] && self.1 == other[1]
    }
}

impl From<(u16, u16)> for Tag {
    #[inline]
    fn from(value: (u16, u16)) -> Tag {
        Tag(value.0, value.1)
    }
}

impl From<[u16; 2]> for Tag {
    #[inline]
    fn from(value: [u16; 2]) -> Tag {
        Tag(value[0], value[1])
    }
}

/// An error returned when parsing an invalid tag expression.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[non_exhaustive]
pub enum ParseTagError {
    /// Not enough tag components, expected `group,element`
    MissingTagComponent,
    /// A tag component does not have exactly 4 characters
    #[snafu(display("tag component has an invalid length: got {} but must be 4", got))]
    InvalidComponentLength {
        /// the number of characters in the offending component
        got: usize,
    },
    /// invalid tag component `group`
    InvalidTagGroup {
        /// the underlying integer parser error
        source: std::num::ParseIntError,
    },
    /// invalid tag component `element`
    InvalidTagElement {
        /// the underlying integer parser error
        source: std::num::ParseIntError,
    },
}

/// Parse a tag from a text expression.
/// The expected syntax is `GGGG,EEEE`,
/// where `GGGG` and `EEEE` are the group and element parts
/// in hexadecimal, optionally surrounded by parentheses.
impl FromStr for Tag {
    type Err = ParseTagError;

    fn from_str(mut s: &str) -> Result<Self, Self::Err> {
        if s.starts_with('(') && s.ends_with(')') {
            s = &s[1..s.len() - 1];
        }
        let mut parts = s.split(',');
        let group = parts.next().context(MissingTagComponentSnafu)?;
        let elem = parts.next().context(MissingTagComponentSnafu)?;
        ensure!(
            group.len() == 4,
            InvalidComponentLengthSnafu { got: group.len() }
        );
        ensure!(
            elem.len() == 4,
            InvalidComponentLengthSnafu { got: elem.len() }
        );
        let group = u16::from_str_radix(group, 16).context(InvalidTagGroupSnafu)?;
        let elem = u16::from_str_radix(elem, 16).context(InvalidTagElementSnafu)?;
        Ok(Tag(group, elem))
    }
}

/// An enum type for a DICOM value representation.
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone, Ord, PartialOrd)]
pub enum VR {
    /// Application Entity
    AE,
    /// Age String
    AS,
    /// Attribute Tag
    AT,
    /// Code String
    CS,
    /// Date
    DA,
    /// Decimal String
    DS,
    /// Date Time
    DT,
    /// Floating Point Single
    FL,
    /// Floating Point Double
    FD,
    /// Integer String
    IS,
    /// Long String
    LO,
    /// Long Text
    LT,
    /// Other Byte
    OB,
    /// Other Double
    OD,
    /// Other Float
    OF,
    /// Other Long
    OL,
    /// Other Very Long
    OV,
    /// Other Word
    OW,
    /// Person Name
    PN,
    /// Short String
    SH,
    /// Signed Long
    SL,
    /// Sequence of Items
    SQ,
    /// Signed Short
    SS,
    /// Short Text
    ST,
    /// Signed Very Long
    SV,
    /// Time
    TM,
    /// Unlimited Characters
    UC,
    /// Unique Identifier (UID)
    UI,
    /// Unsigned Long
    UL,
    /// Unknown
    UN,
    /// Universal Resource Identifier or Universal Resource Locator (URI/URL)
    UR,
    /// Unsigned Short
    US,
    /// Unlimited Text
    UT,
    /// Unsigned Very Long
    UV,
}

impl VR {
    /// Obtain the value representation corresponding to the given two bytes.
    /// Each byte should represent an alphabetic character in upper case.
    pub fn from_binary(chars: [u8; 2]) -> Option<Self> {
        from_utf8(chars.as_ref())
            .ok()
            .and_then(|s| VR::from_str(s).ok())
    }

    /// Retrieve a string representation of this VR.
    pub fn to_string(self) -> &'static str {
        use VR::*;
        match self {
            AE => "AE",
            AS => "AS",
            AT => "AT",
            CS => "CS",
            DA => "DA",
            DS => "DS",
            DT => "DT",
            FL => "FL",
            FD => "FD",
            IS => "IS",
            LO => "LO",
            LT => "LT",
            OB => "OB",
            OD => "OD",
            OF => "OF",
            OL => "OL",
            OV => "OV",
            OW => "OW",
            PN => "PN",
            SH => "SH",
            SL => "SL",
            SQ => "SQ",
            SS => "SS",
            ST => "ST",
            SV => "SV",
            TM => "TM",
            UC => "UC",
            UI => "UI",
            UL => "UL",
            UN => "UN",
            UR => "UR",
            US => "US",
            UT => "UT",
            UV => "UV",
        }
    }

    /// Check whether this VR's natural value type is textual.
    pub fn is_string_family(self) -> bool {
        use VR::*;
        matches!(
            self,
            AE | AS | CS | DA | DS | DT | IS | LO | LT | PN | SH | ST | TM | UC | UI | UR | UT
        )
    }

    /// Check whether this VR is one of the binary "other" representations,
    /// which may take a pre-built byte buffer as their entire value.
    pub fn is_binary_family(self) -> bool {
        use VR::*;
        matches!(self, OB | OD | OF | OL | OV | OW | UN)
    }

    /// Check whether values of this VR may be constructed
    /// by parsing textual input.
    pub fn can_parse_text(self) -> bool {
        use VR::*;
        matches!(self, AT | FD | FL | SL | SS | UL | US)
    }

    /// Check whether this VR admits more than one value in a single element.
    /// The text representations ST, LT, UT and UR are never multi-valued.
    pub fn allows_multiple_values(self) -> bool {
        use VR::*;
        !matches!(self, ST | LT | UT | UR)
    }
}

/// Obtain the value representation corresponding to the given string.
/// The string should hold exactly two UTF-8 encoded alphabetic characters
/// in upper case, otherwise no match is made.
impl FromStr for VR {
    type Err = &'static str;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        use VR::*;
        match string {
            "AE" => Ok(AE),
            "AS" => Ok(AS),
            "AT" => Ok(AT),
            "CS" => Ok(CS),
            "DA" => Ok(DA),
            "DS" => Ok(DS),
            "DT" => Ok(DT),
            "FL" => Ok(FL),
            "FD" => Ok(FD),
            "IS" => Ok(IS),
            "LO" => Ok(LO),
            "LT" => Ok(LT),
            "OB" => Ok(OB),
            "OD" => Ok(OD),
            "OF" => Ok(OF),
            "OL" => Ok(OL),
            "OV" => Ok(OV),
            "OW" => Ok(OW),
            "PN" => Ok(PN),
            "SH" => Ok(SH),
            "SL" => Ok(SL),
            "SQ" => Ok(SQ),
            "SS" => Ok(SS),
            "ST" => Ok(ST),
            "SV" => Ok(SV),
            "TM" => Ok(TM),
            "UC" => Ok(UC),
            "UI" => Ok(UI),
            "UL" => Ok(UL),
            "UN" => Ok(UN),
            "UR" => Ok(UR),
            "US" => Ok(US),
            "UT" => Ok(UT),
            "UV" => Ok(UV),
            _ => Err("no such value representation"),
        }
    }
}

impl fmt::Display for VR {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(VR::to_string(*self))
    }
}

/// A trait for a data type containing a DICOM element header.
pub trait Header {
    /// Retrieve the element's tag as a `(group, element)` tuple.
    fn tag(&self) -> Tag;

    /// Retrieve the element's value representation.
    fn vr(&self) -> VR;
}

/// Stub type representing a non-existing DICOM object.
///
/// This type cannot be instantiated,
/// which makes it so that `Value<EmptyObject>` is sure to be
/// a primitive value.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub enum EmptyObject {}

/// A data type that represents and owns a DICOM data element.
///
/// This type is capable of representing any data element fully in memory,
/// whether it be a primitive value
/// or a nested data set (where each item contains an object of type `I`).
#[derive(Debug, PartialEq, Clone)]
pub struct DataElement<I = EmptyObject> {
    tag: Tag,
    vr: VR,
    value: Value<I>,
}

impl<I> Header for DataElement<I> {
    #[inline]
    fn tag(&self) -> Tag {
        self.tag
    }

    #[inline]
    fn vr(&self) -> VR {
        self.vr
    }
}

impl<'a, I> Header for &'a DataElement<I> {
    #[inline]
    fn tag(&self) -> Tag {
        (**self).tag()
    }

    #[inline]
    fn vr(&self) -> VR {
        (**self).vr()
    }
}

impl<I> DataElement<I> {
    /// Create a data element from the given parts.
    /// This method will not check whether
    /// the value representation is compatible with the given value.
    pub fn new<T>(tag: Tag, vr: VR, value: T) -> Self
    where
        T: Into<Value<I>>,
    {
        DataElement {
            tag,
            vr,
            value: value.into(),
        }
    }

    /// Create an empty data element.
    pub fn empty(tag: Tag, vr: VR) -> Self {
        DataElement {
            tag,
            vr,
            value: PrimitiveValue::Empty.into(),
        }
    }

    /// Retrieve the data value.
    pub fn value(&self) -> &Value<I> {
        &self.value
    }

    /// Obtain a mutable reference to the data value.
    pub fn value_mut(&mut self) -> &mut Value<I> {
        &mut self.value
    }

    /// Move the data value out of the element, discarding the rest.
    pub fn into_value(self) -> Value<I> {
        self.value
    }

    /// Retrieve the number of individual values in the element.
    /// In the case of a sequence element,
    /// this is the number of data set items.
    pub fn multiplicity(&self) -> usize {
        self.value.multiplicity()
    }

    /// Retrieve the element's value as a single trimmed string.
    ///
    /// Returns an error if the value is not primitive.
    pub fn to_str(&self) -> Result<Cow<'_, str>, ConvertValueError> {
        self.value.to_str()
    }

    /// Convert the full value of the data element into a sequence of strings.
    ///
    /// Returns an error if the value is not primitive.
    pub fn to_multi_str(&self) -> Result<Cow<'_, [String]>, ConvertValueError> {
        self.value.to_multi_str()
    }

    /// Convert the full primitive value into raw bytes.
    ///
    /// String values are provided in UTF-8,
    /// numeric values are reinterpreted as their native byte representation.
    ///
    /// Returns an error if the value is not primitive.
    pub fn to_bytes(&self) -> Result<Cow<'_, [u8]>, ConvertValueError> {
        self.value.to_bytes()
    }

    /// Retrieve and convert the value of the data element into an integer.
    ///
    /// Returns an error if the value is not primitive
    /// or cannot be converted.
    pub fn to_int<T>(&self) -> Result<T, ConvertValueError>
    where
        T: NumCast,
        T: FromStr<Err = std::num::ParseIntError>,
    {
        self.value.to_int()
    }

    /// Retrieve and convert the value of the data element
    /// into a sequence of integers.
    pub fn to_multi_int<T>(&self) -> Result<Vec<T>, ConvertValueError>
    where
        T: NumCast,
        T: FromStr<Err = std::num::ParseIntError>,
    {
        self.value.to_multi_int()
    }

    /// Retrieve and convert the value of the data element
    /// into a single-precision floating point number.
    pub fn to_float32(&self) -> Result<f32, ConvertValueError> {
        self.value.to_float32()
    }

    /// Retrieve and convert the value of the data element
    /// into a double-precision floating point number.
    pub fn to_float64(&self) -> Result<f64, ConvertValueError> {
        self.value.to_float64()
    }

    /// Retrieve and convert the value of the data element
    /// into a sequence of double-precision floating point numbers.
    pub fn to_multi_float64(&self) -> Result<Vec<f64>, ConvertValueError> {
        self.value.to_multi_float64()
    }

    /// Retrieve and convert the primitive value into a date.
    pub fn to_date(&self) -> Result<NaiveDate, ConvertValueError> {
        self.value.to_date()
    }

    /// Retrieve and convert the primitive value into a time.
    pub fn to_time(&self) -> Result<NaiveTime, ConvertValueError> {
        self.value.to_time()
    }

    /// Retrieve and convert the primitive value into a date-time.
    pub fn to_datetime(&self) -> Result<DateTime<FixedOffset>, ConvertValueError> {
        self.value.to_datetime()
    }

    /// Retrieve and convert the primitive value into an attribute tag.
    pub fn to_tag(&self) -> Result<Tag, ConvertValueError> {
        self.value.to_tag()
    }
}

/// Macro for implementing getters to single and multi-values,
/// by delegating to `Value`.
///
/// Should be placed inside `DataElement`'s impl block.
macro_rules! impl_primitive_getters {
    ($name_single: ident, $name_multi: ident, $variant: ident, $ret: ty) => {
        /// Get a single value of the requested type.
        ///
        /// If it contains multiple values,
        /// only the first one is returned.
        /// An error is returned if the variant is not compatible.
        pub fn $name_single(&self) -> Result<$ret, CastValueError> {
            self.value.$name_single()
        }

        /// Get a sequence of values of the requested type without copying.
        ///
        /// An error is returned if the variant is not compatible.
        pub fn $name_multi(&self) -> Result<&[$ret], CastValueError> {
            self.value.$name_multi()
        }
    };
}

impl<I> DataElement<I> {
    /// Get a single string value.
    ///
    /// If it contains multiple strings, only the first one is returned.
    ///
    /// An error is returned if the variant is not compatible.
    /// To enable conversions of other variants to a textual representation,
    /// see [`to_str()`](DataElement::to_str) instead.
    pub fn string(&self) -> Result<&str, CastValueError> {
        self.value.string()
    }

    /// Get the inner sequence of string values
    /// if the variant is either `Str` or `Strs`.
    ///
    /// An error is returned if the variant is not compatible.
    pub fn strings(&self) -> Result<&[String], CastValueError> {
        self.value.strings()
    }

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

impl<I> fmt::Display for DataElement<I> {
    /// Format the element as `tag VR: value`.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}: {}", self.tag, self.vr, self.value)
    }
}

/// A value which may be supplied to a date or time attribute
/// in place of a concrete date, time or date-time:
/// a half-open interval which is rendered
/// into the DICOM textual range encoding
/// (`start-`, `-end`, or `start-end`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeValue {
    /// A date range, for elements of VR DA
    Date(DateRange),
    /// A time range, for elements of VR TM
    Time(TimeRange),
    /// A date-time range, for elements of VR DT
    DateTime(DateTimeRange),
}

impl From<DateRange> for RangeValue {
    fn from(value: DateRange) -> Self {
        RangeValue::Date(value)
    }
}

impl From<TimeRange> for RangeValue {
    fn from(value: TimeRange) -> Self {
        RangeValue::Time(value)
    }
}

impl From<DateTimeRange> for RangeValue {
    fn from(value: DateTimeRange) -> Self {
        RangeValue::DateTime(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_from_u16_pair() {
        let t = Tag::from((0x0010u16, 0x0020u16));
        assert_eq!(0x0010u16, t.group());
        assert_eq!(0x0020u16, t.element());
    }

    #[test]
    fn tag_parsing() {
        assert_eq!("0010,0010".parse::<Tag>().unwrap(), Tag(0x0010, 0x0010));
        assert_eq!("(7FE0,0010)".parse::<Tag>().unwrap(), Tag(0x7FE0, 0x0010));
        assert!("10,0010".parse::<Tag>().is_err());
        assert!("0010".parse::<Tag>().is_err());
        assert!("zzzz,0010".parse::<Tag>().is_err());
    }

    #[test]
    fn tag_category_checks() {
        assert!(Tag(0x0009, 0x0001).is_private());
        assert!(!Tag(0x0008, 0x0001).is_private());
        assert!(Tag(0x0009, 0x0000).is_group_length());
        assert!(Tag(0x0009, 0x0010).is_private_creator());
        assert!(!Tag(0x0009, 0x0100).is_private_creator());
    }

    #[test]
    fn get_date_value() {
        let data_element: DataElement = DataElement::new(
            Tag(0x0010, 0x0030),
            VR::DA,
            Value::new(PrimitiveValue::from("19941012")),
        );

        assert_eq!(
            data_element.to_date().unwrap(),
            NaiveDate::from_ymd_opt(1994, 10, 12).unwrap(),
        );
    }

    #[test]
    fn create_data_element_from_primitive() {
        let data_element: DataElement = DataElement::new(
            Tag(0x0028, 0x3002),
            VR::US,
            PrimitiveValue::from(&[256u16, 0, 16][..]),
        );

        assert_eq!(data_element.uint16_slice().unwrap(), &[256, 0, 16]);
    }
}
