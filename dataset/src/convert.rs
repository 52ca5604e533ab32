//! Construction of data elements from native values.
//!
//! This module implements the insertion half of value coercion:
//! given a tag, an optional value representation
//! and a primitive value of any variant,
//! build a well-formed element or report why none can be built.
//!
//! The rules are applied in priority order:
//! an empty input always builds an empty element;
//! a value whose variant is native to the VR is stored as-is
//! (textual values additionally going through the multiplicity split);
//! byte buffers are accepted wholesale by the binary VRs;
//! and the text-parseable VRs (AT, FD, FL, SL, SS, UL, US)
//! fall back to splitting and parsing textual input.
//! Any other combination is rejected.

use dcmset_core::dictionary::{DataDictionary, DictionaryEntry, VM};
use dcmset_core::header::{DataElement, RangeValue, Tag, VR};
use dcmset_core::value::range::{DateRange, DateTimeRange, TimeRange};
use dcmset_core::value::{DataSetSequence, PrimitiveValue, Value, ValueType, C};
use snafu::ResultExt;

use crate::mem::InMemDataSet;
use crate::{
    BuildValueError, ParseFloatTokenSnafu, ParseIntegerTokenSnafu, ParseTagTokenSnafu,
    UnknownAttributeSnafu, UnsupportedConversionSnafu, UnsupportedRangeSnafu,
};

impl<D> InMemDataSet<D>
where
    D: DataDictionary,
{
    /// Insert a value at the given tag,
    /// resolving the value representation through the dictionary.
    ///
    /// The chosen VR is the first of the attribute's allowed set
    /// which accepts the value's variant natively,
    /// or the first declared one if none do.
    /// Fails if the tag is not known to the dictionary.
    pub fn put_value(&mut self, tag: Tag, value: PrimitiveValue) -> Result<(), BuildValueError> {
        let (vr, vm) = {
            let entry = self
                .dictionary()
                .by_tag(tag)
                .ok_or_else(|| UnknownAttributeSnafu { tag }.build())?;
            let vrs = entry.vrs();
            let vr = vrs
                .iter()
                .copied()
                .find(|&vr| vr_accepts(vr, value.value_type()))
                .or_else(|| vrs.first().copied())
                .unwrap_or(VR::UN);
            (vr, entry.vm())
        };
        self.put_coerced(tag, vr, vm, value)
    }

    /// Insert a value at the given tag with an explicit value representation.
    ///
    /// The attribute's multiplicity is taken from the dictionary if known,
    /// defaulting to a single value.
    pub fn put_value_with_vr(
        &mut self,
        tag: Tag,
        vr: VR,
        value: PrimitiveValue,
    ) -> Result<(), BuildValueError> {
        let vm = self
            .dictionary()
            .by_tag(tag)
            .map(|e| e.vm())
            .unwrap_or(VM::fixed(1));
        self.put_coerced(tag, vr, vm, value)
    }

    fn put_coerced(
        &mut self,
        tag: Tag,
        vr: VR,
        vm: VM,
        value: PrimitiveValue,
    ) -> Result<(), BuildValueError> {
        let value = coerce_value(vr, vm, value)?;
        self.put(DataElement::new(tag, vr, Value::new(value)));
        Ok(())
    }

    /// Insert a sequence element at the given tag,
    /// taking ownership of the given data sets as its items.
    pub fn put_seq(&mut self, tag: Tag, items: Vec<InMemDataSet<D>>) {
        self.put(DataElement::new(
            tag,
            VR::SQ,
            Value::from(DataSetSequence::from(items)),
        ));
    }

    /// Insert a date range at the given tag as a DA element
    /// in the range matching form (`start-`, `-end` or `start-end`).
    pub fn put_date_range(&mut self, tag: Tag, range: DateRange) {
        self.put(DataElement::new(tag, VR::DA, Value::from(range.to_string())));
    }

    /// Insert a time range at the given tag as a TM element
    /// in the range matching form.
    pub fn put_time_range(&mut self, tag: Tag, range: TimeRange) {
        self.put(DataElement::new(tag, VR::TM, Value::from(range.to_string())));
    }

    /// Insert a date-time range at the given tag as a DT element
    /// in the range matching form.
    pub fn put_datetime_range(&mut self, tag: Tag, range: DateTimeRange) {
        self.put(DataElement::new(tag, VR::DT, Value::from(range.to_string())));
    }

    /// Insert a range value at the given tag
    /// under an explicit value representation,
    /// which must be the one matching the range's kind
    /// (DA for dates, TM for times, DT for date-times).
    pub fn put_range(
        &mut self,
        tag: Tag,
        vr: VR,
        range: RangeValue,
    ) -> Result<(), BuildValueError> {
        match (vr, range) {
            (VR::DA, RangeValue::Date(range)) => Ok(self.put_date_range(tag, range)),
            (VR::TM, RangeValue::Time(range)) => Ok(self.put_time_range(tag, range)),
            (VR::DT, RangeValue::DateTime(range)) => Ok(self.put_datetime_range(tag, range)),
            (vr, _) => UnsupportedRangeSnafu { vr }.fail(),
        }
    }
}

/// Whether the value representation stores this value variant natively,
/// with no parsing involved.
fn vr_accepts(vr: VR, value_type: ValueType) -> bool {
    use VR::*;
    match value_type {
        ValueType::Empty => true,
        ValueType::Str | ValueType::Strs => vr.is_string_family(),
        ValueType::Tags => vr == AT,
        // a byte buffer may back any of the binary VRs wholesale
        ValueType::U8 => vr.is_binary_family(),
        ValueType::U16 => matches!(vr, US | OW),
        ValueType::I16 => vr == SS,
        ValueType::U32 => matches!(vr, UL | OL),
        ValueType::I32 => matches!(vr, SL | IS),
        ValueType::I64 => vr == SV,
        ValueType::U64 => matches!(vr, UV | OV),
        ValueType::F32 => matches!(vr, FL | OF),
        ValueType::F64 => matches!(vr, FD | OD | DS),
        ValueType::Date => vr == DA,
        ValueType::Time => vr == TM,
        ValueType::DateTime => vr == DT,
        ValueType::DataSetSequence => false,
    }
}

fn coerce_value(vr: VR, vm: VM, value: PrimitiveValue) -> Result<PrimitiveValue, BuildValueError> {
    if value.is_empty() {
        return Ok(PrimitiveValue::Empty);
    }
    if vr_accepts(vr, value.value_type()) {
        return Ok(split_if_multi(vr, vm, value));
    }
    match &value {
        PrimitiveValue::Str(_) | PrimitiveValue::Strs(_) if vr == VR::AT || vr.can_parse_text() => {
            parse_tokens(vr, &tokens_of(&value, vr, vm))
        }
        _ => UnsupportedConversionSnafu {
            vr,
            value_type: value.value_type(),
        }
        .fail(),
    }
}

/// Apply the string multiplicity split:
/// a single textual value under a multi-valued attribute,
/// whether a `Str` or a one-element `Strs`,
/// is split on the backslash delimiter,
/// with tokens trimmed and empty tokens discarded.
/// Any other value is kept as it came.
fn split_if_multi(vr: VR, vm: VM, value: PrimitiveValue) -> PrimitiveValue {
    fn split(s: &str) -> PrimitiveValue {
        let parts: C<String> = s
            .split('\\')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .collect();
        if parts.is_empty() {
            PrimitiveValue::Empty
        } else {
            PrimitiveValue::Strs(parts)
        }
    }
    if !(vr.allows_multiple_values() && vm.is_multi()) {
        return value;
    }
    match value {
        PrimitiveValue::Str(s) if s.contains('\\') => split(&s),
        PrimitiveValue::Strs(c) if c.len() == 1 && c[0].contains('\\') => split(&c[0]),
        other => other,
    }
}

/// Collect the textual tokens to be parsed for a text-parseable VR,
/// applying the multiplicity split to a single string input.
/// Tokens which are empty after trimming are discarded
/// no matter which variant supplied them.
fn tokens_of(value: &PrimitiveValue, vr: VR, vm: VM) -> Vec<String> {
    fn collect<'a>(parts: impl Iterator<Item = &'a str>) -> Vec<String> {
        parts
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .collect()
    }
    let split_single = vr.allows_multiple_values() && vm.is_multi();
    match value {
        PrimitiveValue::Str(s) if split_single => collect(s.split('\\')),
        PrimitiveValue::Str(s) => collect(std::iter::once(s.as_str())),
        PrimitiveValue::Strs(c) if c.len() == 1 && split_single => collect(c[0].split('\\')),
        PrimitiveValue::Strs(c) => collect(c.iter().map(String::as_str)),
        _ => Vec::new(),
    }
}

macro_rules! parse_all {
    ($tokens: expr, $variant: ident, $typ: ty, $ctx: ident) => {{
        let parsed: Result<C<$typ>, BuildValueError> = $tokens
            .iter()
            .map(|token| token.parse::<$typ>().context($ctx { token }))
            .collect();
        Ok(PrimitiveValue::$variant(parsed?))
    }};
}

fn parse_tokens(vr: VR, tokens: &[String]) -> Result<PrimitiveValue, BuildValueError> {
    if tokens.is_empty() {
        return Ok(PrimitiveValue::Empty);
    }
    match vr {
        VR::AT => {
            let parsed: Result<C<Tag>, BuildValueError> = tokens
                .iter()
                .map(|token| token.parse::<Tag>().context(ParseTagTokenSnafu { token }))
                .collect();
            Ok(PrimitiveValue::Tags(parsed?))
        }
        VR::US => parse_all!(tokens, U16, u16, ParseIntegerTokenSnafu),
        VR::UL => parse_all!(tokens, U32, u32, ParseIntegerTokenSnafu),
        VR::SS => parse_all!(tokens, I16, i16, ParseIntegerTokenSnafu),
        VR::SL => parse_all!(tokens, I32, i32, ParseIntegerTokenSnafu),
        VR::FL => parse_all!(tokens, F32, f32, ParseFloatTokenSnafu),
        VR::FD => parse_all!(tokens, F64, f64, ParseFloatTokenSnafu),
        _ => UnsupportedConversionSnafu {
            vr,
            value_type: ValueType::Str,
        }
        .fail(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn implicit_vr_comes_from_the_dictionary() {
        let mut ds = InMemDataSet::new_empty();
        ds.put_value(Tag(0x0010, 0x0010), PrimitiveValue::from("Doe^John"))
            .unwrap();
        ds.put_value(Tag(0x0028, 0x0010), PrimitiveValue::from(512_u16))
            .unwrap();

        assert_eq!(ds.vr_of(Tag(0x0010, 0x0010)).unwrap(), VR::PN);
        assert_eq!(ds.vr_of(Tag(0x0028, 0x0010)).unwrap(), VR::US);
    }

    #[test]
    fn implicit_vr_fails_on_unknown_attribute() {
        let mut ds = InMemDataSet::new_empty();
        let err = ds
            .put_value(Tag(0x0009, 0x0001), PrimitiveValue::from("?"))
            .unwrap_err();
        assert!(matches!(
            err,
            BuildValueError::UnknownAttribute {
                tag: Tag(0x0009, 0x0001),
            }
        ));
    }

    #[test]
    fn multi_valued_attribute_splits_a_single_string() {
        let mut ds = InMemDataSet::new_empty();
        // ImageType admits 2-n values
        ds.put_value_with_vr(
            Tag(0x0008, 0x0008),
            VR::CS,
            PrimitiveValue::from("DERIVED\\PRIMARY\\WHOLE BODY"),
        )
        .unwrap();

        let strings = ds.strings(Tag(0x0008, 0x0008)).unwrap();
        assert_eq!(
            strings.to_vec(),
            vec![
                "DERIVED".to_string(),
                "PRIMARY".to_string(),
                "WHOLE BODY".to_string(),
            ]
        );
    }

    #[test]
    fn single_valued_attribute_keeps_the_delimiter() {
        let mut ds = InMemDataSet::new_empty();
        // Modality admits exactly one value
        ds.put_value_with_vr(
            Tag(0x0008, 0x0060),
            VR::CS,
            PrimitiveValue::from("MR\\CT"),
        )
        .unwrap();

        let elt = ds.element(Tag(0x0008, 0x0060)).unwrap();
        assert_eq!(elt.multiplicity(), 1);
        assert_eq!(ds.string(Tag(0x0008, 0x0060)).unwrap(), "MR\\CT");
    }

    #[test]
    fn numeric_vr_parses_text_input() {
        let mut ds = InMemDataSet::new_empty();
        ds.put_value_with_vr(Tag(0x0028, 0x0010), VR::US, PrimitiveValue::from("512"))
            .unwrap();

        let elt = ds.element(Tag(0x0028, 0x0010)).unwrap();
        assert_eq!(elt.uint16().unwrap(), 512);
    }

    #[test]
    fn bad_token_fails_the_whole_call() {
        let mut ds = InMemDataSet::new_empty();
        let err = ds
            .put_value_with_vr(Tag(0x0028, 0x0010), VR::US, PrimitiveValue::from("51b"))
            .unwrap_err();
        assert!(matches!(err, BuildValueError::ParseIntegerToken { .. }));
        assert!(!ds.contains(Tag(0x0028, 0x0010)));
    }

    #[test]
    fn whitespace_tokens_are_discarded_before_parsing() {
        let mut ds = InMemDataSet::new_empty();
        ds.put_value_with_vr(
            Tag(0x0028, 0x0010),
            VR::US,
            PrimitiveValue::Strs(smallvec!["512".to_string(), " ".to_string()]),
        )
        .unwrap();

        let elt = ds.element(Tag(0x0028, 0x0010)).unwrap();
        assert_eq!(elt.uint16_slice().unwrap(), &[512][..]);
    }

    #[test]
    fn whitespace_only_text_builds_an_empty_element() {
        let mut ds = InMemDataSet::new_empty();
        ds.put_value_with_vr(Tag(0x0028, 0x0010), VR::US, PrimitiveValue::from("   "))
            .unwrap();

        let elt = ds.element(Tag(0x0028, 0x0010)).unwrap();
        assert_eq!(elt.multiplicity(), 0);
    }

    #[test]
    fn multi_valued_attribute_splits_a_one_element_string_sequence() {
        let mut ds = InMemDataSet::new_empty();
        ds.put_value_with_vr(
            Tag(0x0008, 0x0008),
            VR::CS,
            PrimitiveValue::Strs(smallvec!["DERIVED\\PRIMARY".to_string()]),
        )
        .unwrap();

        let strings = ds.strings(Tag(0x0008, 0x0008)).unwrap();
        assert_eq!(
            strings.to_vec(),
            vec!["DERIVED".to_string(), "PRIMARY".to_string()],
        );
    }

    #[test]
    fn at_vr_parses_tags_from_text() {
        let mut ds = InMemDataSet::new_empty();
        ds.put_value_with_vr(
            Tag(0x0041, 0x1001),
            VR::AT,
            PrimitiveValue::from("0008,103E"),
        )
        .unwrap();

        assert_eq!(
            ds.tag_value(Tag(0x0041, 0x1001)).unwrap(),
            Tag(0x0008, 0x103E),
        );
    }

    #[test]
    fn no_silent_narrowing_between_numeric_variants() {
        let mut ds = InMemDataSet::new_empty();
        let err = ds
            .put_value_with_vr(
                Tag(0x0028, 0x0010),
                VR::US,
                PrimitiveValue::U32(smallvec![70000]),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            BuildValueError::UnsupportedConversion {
                vr: VR::US,
                value_type: ValueType::U32,
            }
        ));
    }

    #[test]
    fn empty_input_builds_an_empty_element() {
        let mut ds = InMemDataSet::new_empty();
        ds.put_value_with_vr(Tag(0x0008, 0x0060), VR::CS, PrimitiveValue::Empty)
            .unwrap();

        let elt = ds.element(Tag(0x0008, 0x0060)).unwrap();
        assert_eq!(elt.multiplicity(), 0);
    }

    #[test]
    fn byte_buffers_back_binary_elements_wholesale() {
        let mut ds = InMemDataSet::new_empty();
        ds.put_value_with_vr(
            Tag(0x7FE0, 0x0010),
            VR::OW,
            PrimitiveValue::from(vec![0x00_u8, 0x01, 0x02, 0x03]),
        )
        .unwrap();

        let bytes = ds.bytes(Tag(0x7FE0, 0x0010)).unwrap();
        assert_eq!(&*bytes, &[0x00, 0x01, 0x02, 0x03]);
        // the buffer is shared with the element, not copied
        assert!(matches!(bytes, std::borrow::Cow::Borrowed(_)));

        let mut ds = InMemDataSet::new_empty();
        ds.put_value_with_vr(
            Tag(0x7FE0, 0x0010),
            VR::OW,
            PrimitiveValue::U16(smallvec![0x0100, 0x0302]),
        )
        .unwrap();
        let bytes = ds.bytes(Tag(0x7FE0, 0x0010)).unwrap();
        assert_eq!(bytes.len(), 4);
        assert!(matches!(bytes, std::borrow::Cow::Borrowed(_)));
    }

    #[test]
    fn date_range_is_rendered_as_range_text() {
        use dcmset_core::chrono::NaiveDate;

        let mut ds = InMemDataSet::new_empty();
        ds.put_date_range(
            Tag(0x0008, 0x0020),
            DateRange::from_start(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()),
        );

        assert_eq!(ds.string(Tag(0x0008, 0x0020)).unwrap(), "20200101-");
        assert_eq!(ds.vr_of(Tag(0x0008, 0x0020)).unwrap(), VR::DA);
    }

    #[test]
    fn range_vr_mismatch_is_reported() {
        use dcmset_core::chrono::NaiveDate;

        let mut ds = InMemDataSet::new_empty();
        let range = RangeValue::from(DateRange::from_start(
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        ));
        let err = ds
            .put_range(Tag(0x0008, 0x0030), VR::TM, range)
            .unwrap_err();
        assert!(matches!(err, BuildValueError::UnsupportedRange { vr: VR::TM }));
    }

    #[test]
    fn sequences_are_owned_by_their_element() {
        let mut item = InMemDataSet::new_empty();
        item.put_value_with_vr(
            Tag(0x0008, 0x0100),
            VR::SH,
            PrimitiveValue::from("T-D1100"),
        )
        .unwrap();

        let mut ds = InMemDataSet::new_empty();
        ds.put_seq(Tag(0x0008, 0x1199), vec![item]);

        assert_eq!(ds.vr_of(Tag(0x0008, 0x1199)).unwrap(), VR::SQ);
        let items = ds.items(Tag(0x0008, 0x1199)).unwrap();
        assert_eq!(items[0].string(Tag(0x0008, 0x0100)).unwrap(), "T-D1100");
    }
}
