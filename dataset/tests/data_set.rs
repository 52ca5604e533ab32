//! End-to-end exercises of the in-memory data set:
//! insertion, retrieval, private blocks, transfer syntax propagation
//! and selective copies, composed the way a consumer would.

use dcmset_core::chrono::NaiveDate;
use dcmset_core::header::{DataElement, Header, Tag, VR};
use dcmset_core::value::{PrimitiveValue, Value};
use dcmset_dataset::{
    AccessError, InMemDataSet, ReadValueError, TagMask, DEFAULT_TRANSFER_SYNTAX,
};

const PATIENT_NAME: Tag = Tag(0x0010, 0x0010);
const CODE_VALUE: Tag = Tag(0x0008, 0x0100);
const REFERENCED_SOP_SEQUENCE: Tag = Tag(0x0008, 0x1199);

fn sample_data_set() -> InMemDataSet {
    let mut ds = InMemDataSet::new_empty();
    ds.put_value(PATIENT_NAME, PrimitiveValue::from("Doe^John"))
        .unwrap();
    ds.put_value(Tag(0x0010, 0x0020), PrimitiveValue::from("P-1234"))
        .unwrap();
    ds.put_value(Tag(0x0008, 0x0060), PrimitiveValue::from("MR"))
        .unwrap();
    ds.put_value(Tag(0x0028, 0x0010), PrimitiveValue::from(512_u16))
        .unwrap();
    ds.put_value(Tag(0x0028, 0x0011), PrimitiveValue::from(512_u16))
        .unwrap();
    ds
}

#[test]
fn round_trips_per_value_family() {
    let mut ds = InMemDataSet::new_empty();

    // string family
    ds.put_value_with_vr(PATIENT_NAME, VR::PN, PrimitiveValue::from("Doe^John"))
        .unwrap();
    assert_eq!(ds.string(PATIENT_NAME).unwrap(), "Doe^John");

    // numeric family
    ds.put_value_with_vr(
        Tag(0x0028, 0x0010),
        VR::US,
        PrimitiveValue::from(1024_u16),
    )
    .unwrap();
    assert_eq!(ds.uint16(Tag(0x0028, 0x0010)).unwrap(), 1024);

    ds.put_value_with_vr(Tag(0x0018, 0x9087), VR::FD, PrimitiveValue::from(0.831_f64))
        .unwrap();
    assert_eq!(ds.float64(Tag(0x0018, 0x9087)).unwrap(), 0.831);

    // dates
    let birth = NaiveDate::from_ymd_opt(1974, 3, 2).unwrap();
    ds.put_value_with_vr(Tag(0x0010, 0x0030), VR::DA, PrimitiveValue::from(birth))
        .unwrap();
    assert_eq!(ds.date(Tag(0x0010, 0x0030)).unwrap(), birth);

    // attribute tags
    ds.put_value_with_vr(
        Tag(0x0041, 0x1001),
        VR::AT,
        PrimitiveValue::from(Tag(0x7FE0, 0x0010)),
    )
    .unwrap();
    assert_eq!(ds.tag_value(Tag(0x0041, 0x1001)).unwrap(), Tag(0x7FE0, 0x0010));

    // binary family
    ds.put_value_with_vr(
        Tag(0x7FE0, 0x0010),
        VR::OB,
        PrimitiveValue::from(vec![1_u8, 2, 3, 4]),
    )
    .unwrap();
    assert_eq!(&*ds.bytes(Tag(0x7FE0, 0x0010)).unwrap(), &[1, 2, 3, 4]);
}

#[test]
fn replace_does_not_duplicate() {
    let mut ds = sample_data_set();
    let before = ds.len();

    ds.put_value(PATIENT_NAME, PrimitiveValue::from("Doe^Jane"))
        .unwrap();

    assert_eq!(ds.len(), before);
    assert!(ds.contains(PATIENT_NAME));
    assert_eq!(ds.string(PATIENT_NAME).unwrap(), "Doe^Jane");
}

#[test]
fn iteration_order_is_independent_of_insertion_order() {
    let mut ds = InMemDataSet::new_empty();
    ds.put(DataElement::new(
        Tag(0x7FE0, 0x0010),
        VR::OB,
        Value::new(PrimitiveValue::from(vec![0_u8])),
    ));
    ds.put_value(Tag(0x0008, 0x0060), PrimitiveValue::from("MR"))
        .unwrap();
    ds.put_value(Tag(0x0028, 0x0010), PrimitiveValue::from(64_u16))
        .unwrap();
    ds.put_value(PATIENT_NAME, PrimitiveValue::from("Doe^John"))
        .unwrap();

    let tags: Vec<Tag> = ds.iter().map(|e| e.tag()).collect();
    let mut sorted = tags.clone();
    sorted.sort();
    assert_eq!(tags, sorted);
}

#[test]
fn absent_tags_fail_without_a_default_and_yield_one_with() {
    let ds = InMemDataSet::new_empty();

    assert!(matches!(
        ds.string(PATIENT_NAME),
        Err(ReadValueError::Access {
            source: AccessError::NoSuchDataElementTag { tag: PATIENT_NAME },
        })
    ));
    assert_eq!(ds.string_or(PATIENT_NAME, "Anonymous").unwrap(), "Anonymous");
    assert_eq!(ds.int_or::<u16>(Tag(0x0028, 0x0010), 1).unwrap(), 1);
}

#[test]
fn transfer_syntax_reaches_every_nesting_depth() {
    let mut inner = InMemDataSet::new_empty();
    inner
        .put_value_with_vr(CODE_VALUE, VR::SH, PrimitiveValue::from("T-D1100"))
        .unwrap();

    let mut middle = InMemDataSet::new_empty();
    middle.put_seq(Tag(0x0040, 0xA043), vec![inner]);

    let mut root = InMemDataSet::new_empty();
    root.put_seq(REFERENCED_SOP_SEQUENCE, vec![middle]);

    assert_eq!(root.transfer_syntax(), DEFAULT_TRANSFER_SYNTAX);
    root.set_transfer_syntax("1.2.840.10008.1.2");

    let middle = &root.items(REFERENCED_SOP_SEQUENCE).unwrap()[0];
    let inner = &middle.items(Tag(0x0040, 0xA043)).unwrap()[0];
    assert_eq!(middle.transfer_syntax(), "1.2.840.10008.1.2");
    assert_eq!(inner.transfer_syntax(), "1.2.840.10008.1.2");
    assert_eq!(inner.string(CODE_VALUE).unwrap(), "T-D1100");
}

#[test]
fn private_blocks_are_stable_and_distinct() {
    let mut ds = InMemDataSet::new_empty();

    let first = ds
        .resolve_private_tag(Tag(0x0029, 0x0010), Some("ACME"))
        .unwrap();
    let again = ds
        .resolve_private_tag(Tag(0x0029, 0x0010), Some("ACME"))
        .unwrap();
    let other = ds
        .resolve_private_tag(Tag(0x0029, 0x0010), Some("OTHER"))
        .unwrap();

    assert_eq!(first, again);
    assert_ne!(first, other);
    assert_eq!(first.group(), 0x0029);
    assert!(first.element() >= 0x0100);
}

#[test]
fn copy_all_and_copy_tags() {
    let src = sample_data_set();

    let mut dest = InMemDataSet::new_empty();
    src.copy_to(&mut dest);
    assert_eq!(dest.len(), src.len());
    assert_eq!(dest.string(PATIENT_NAME).unwrap(), "Doe^John");

    let mut partial = InMemDataSet::new_empty();
    src.copy_tags(&mut partial, &[PATIENT_NAME, Tag(0x0008, 0x0060)])
        .unwrap();
    assert_eq!(partial.len(), 2);

    // an absent tag fails the copy
    let err = src
        .copy_tags(&mut partial, &[Tag(0x0008, 0x0018)])
        .unwrap_err();
    assert!(matches!(
        err,
        AccessError::NoSuchDataElementTag {
            tag: Tag(0x0008, 0x0018),
        }
    ));
}

#[test]
fn masked_copy_selects_by_group() {
    let src = sample_data_set();
    let mask: TagMask = "(0010,xxxx)".parse().unwrap();

    let mut dest = InMemDataSet::new_empty();
    src.copy_masked(&mut dest, &mask);

    assert_eq!(dest.len(), 2);
    assert!(dest.contains(PATIENT_NAME));
    assert!(dest.contains(Tag(0x0010, 0x0020)));
    assert!(!dest.contains(Tag(0x0008, 0x0060)));
}

#[test]
fn construction_from_elements_propagates_transfer_syntax() {
    let mut item = InMemDataSet::new_empty();
    item.put_value_with_vr(CODE_VALUE, VR::SH, PrimitiveValue::from("T-D1100"))
        .unwrap();
    item.set_transfer_syntax("1.2.840.10008.1.2.2");

    let ds = InMemDataSet::from_element_iter(vec![
        DataElement::new(
            REFERENCED_SOP_SEQUENCE,
            VR::SQ,
            Value::from_items(vec![item]),
        ),
        DataElement::new(
            PATIENT_NAME,
            VR::PN,
            Value::new(PrimitiveValue::from("Doe^John")),
        ),
    ]);

    // the child is brought back in line with the owner
    let child = &ds.items(REFERENCED_SOP_SEQUENCE).unwrap()[0];
    assert_eq!(ds.transfer_syntax(), DEFAULT_TRANSFER_SYNTAX);
    assert_eq!(child.transfer_syntax(), DEFAULT_TRANSFER_SYNTAX);
}
