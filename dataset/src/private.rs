//! Reservation and lookup of private data elements.
//!
//! Vendors store their own attributes in odd-numbered groups,
//! inside blocks reserved by a creator string:
//! the element `(gggg,00BB)` holds the creator,
//! and the block's elements live at `(gggg,BBxx)`.
//! This module resolves a dictionary-style private tag
//! (group, element below `0x100`, creator)
//! into its concrete block-encoded tag within a given data set,
//! reserving a fresh block when the creator has none yet.

use dcmset_core::dictionary::DataDictionary;
use dcmset_core::header::{DataElement, Header, Tag, VR};
use dcmset_core::value::{PrimitiveValue, Value};
use snafu::{ensure, Snafu};
use tracing::debug;

use crate::mem::{InMemDataSet, MemElement};
use crate::BuildValueError;

/// An error which occurs when resolving or accessing
/// a private data element.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[non_exhaustive]
pub enum PrivateTagError {
    /// The group number is even, so it cannot hold private attributes
    #[snafu(display("group number {:#06X?} must be odd", group))]
    InvalidGroup {
        /// the offending group number
        group: u16,
    },
    /// Every block of the group is reserved by some other creator
    #[snafu(display(
        "no block in group {:#06X?} is free or reserved by creator `{}`",
        group,
        creator
    ))]
    BlocksExhausted {
        /// the group scanned
        group: u16,
        /// the creator which could not be placed
        creator: String,
    },
    /// The creator has no reserved block in the group
    #[snafu(display("no private creator `{}` found in group {:#06X?}", creator, group))]
    PrivateCreatorNotFound {
        /// the group scanned
        group: u16,
        /// the creator looked up
        creator: String,
    },
    /// The creator's block holds no element at the given position
    #[snafu(display(
        "private element {:#06X?} of creator `{}` not found in group {:#06X?}",
        element,
        creator,
        group
    ))]
    ElementNotFound {
        /// the group scanned
        group: u16,
        /// the creator owning the block
        creator: String,
        /// the position within the block
        element: u16,
    },
    /// could not build the private element's value
    #[snafu(context(false))]
    BuildValue { source: BuildValueError },
}

impl<D> InMemDataSet<D>
where
    D: DataDictionary,
{
    /// Resolve a private tag into its concrete, storage-ready form.
    ///
    /// Tags which do not require resolution come back unchanged:
    /// non-private tags, group length tags (element `0`),
    /// tags without a creator,
    /// and tags whose element is already block-encoded (`>= 0x100`).
    ///
    /// Otherwise, blocks `0x10` through `0xFF` of the tag's group
    /// are scanned in order.
    /// The first free block is reserved for the creator
    /// by storing an LO element with the creator string
    /// at `(group, block)`;
    /// a block already reserved by the same creator is reused,
    /// making resolution idempotent.
    /// The resolved tag is `(group, (block << 8) | (element & 0xFF))`.
    pub fn resolve_private_tag(
        &mut self,
        tag: Tag,
        creator: Option<&str>,
    ) -> Result<Tag, PrivateTagError> {
        if !tag.is_private() || tag.is_group_length() || tag.element() >= 0x0100 {
            return Ok(tag);
        }
        let creator = match creator {
            Some(creator) => creator,
            None => return Ok(tag),
        };

        let group = tag.group();
        for block in 0x10..=0xFF_u16 {
            let slot = Tag(group, block);
            let resolved = Tag(group, (block << 8) | (tag.element() & 0x00FF));
            match self.get(slot) {
                Some(elt) => {
                    if let Ok(existing) = elt.to_str() {
                        if existing == creator {
                            return Ok(resolved);
                        }
                    }
                }
                None => {
                    debug!(group = group, block = block, creator, "reserving private block");
                    self.put(DataElement::new(
                        slot,
                        VR::LO,
                        Value::new(PrimitiveValue::from(creator)),
                    ));
                    return Ok(resolved);
                }
            }
        }
        BlocksExhaustedSnafu { group, creator }.fail()
    }

    /// Insert a value into the block of the given creator,
    /// reserving the block if necessary.
    ///
    /// `element` carries only the low byte of the final element number
    /// (the position within the block).
    /// Returns the resolved tag where the element was stored.
    pub fn put_private_value(
        &mut self,
        group: u16,
        creator: &str,
        element: u16,
        vr: VR,
        value: PrimitiveValue,
    ) -> Result<Tag, PrivateTagError> {
        ensure!(group & 1 == 1, InvalidGroupSnafu { group });
        let tag = self.resolve_private_tag(Tag(group, element & 0x00FF), Some(creator))?;
        self.put_value_with_vr(tag, vr, value)?;
        Ok(tag)
    }

    /// Retrieve a private element previously stored
    /// in the block of the given creator.
    pub fn private_element(
        &self,
        group: u16,
        creator: &str,
        element: u16,
    ) -> Result<&MemElement<D>, PrivateTagError> {
        ensure!(group & 1 == 1, InvalidGroupSnafu { group });
        let block = self
            .iter()
            .filter(|elt| elt.tag().group() == group && elt.tag().is_private_creator())
            .find(|elt| matches!(elt.to_str(), Ok(existing) if existing == creator))
            .map(|elt| elt.tag().element())
            .ok_or_else(|| PrivateCreatorNotFoundSnafu { group, creator }.build())?;

        let tag = Tag(group, (block << 8) | (element & 0x00FF));
        self.get(tag).ok_or_else(|| {
            ElementNotFoundSnafu {
                group,
                creator,
                element,
            }
            .build()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_is_idempotent() {
        let mut ds = InMemDataSet::new_empty();
        let first = ds
            .resolve_private_tag(Tag(0x0009, 0x0001), Some("ACME"))
            .unwrap();
        let second = ds
            .resolve_private_tag(Tag(0x0009, 0x0001), Some("ACME"))
            .unwrap();

        assert_eq!(first, Tag(0x0009, 0x1001));
        assert_eq!(first, second);
        // one reservation element only
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.string(Tag(0x0009, 0x0010)).unwrap(), "ACME");
    }

    #[test]
    fn distinct_creators_get_distinct_blocks() {
        let mut ds = InMemDataSet::new_empty();
        let acme = ds
            .resolve_private_tag(Tag(0x0009, 0x0001), Some("ACME"))
            .unwrap();
        let other = ds
            .resolve_private_tag(Tag(0x0009, 0x0002), Some("OTHER"))
            .unwrap();
        let acme_again = ds
            .resolve_private_tag(Tag(0x0009, 0x0003), Some("ACME"))
            .unwrap();

        assert_eq!(acme, Tag(0x0009, 0x1001));
        assert_eq!(other, Tag(0x0009, 0x1102));
        assert_eq!(acme_again, Tag(0x0009, 0x1003));
    }

    #[test]
    fn tags_which_need_no_resolution_pass_through() {
        let mut ds = InMemDataSet::new_empty();
        // not private
        assert_eq!(
            ds.resolve_private_tag(Tag(0x0010, 0x0010), Some("ACME"))
                .unwrap(),
            Tag(0x0010, 0x0010),
        );
        // group length
        assert_eq!(
            ds.resolve_private_tag(Tag(0x0009, 0x0000), Some("ACME"))
                .unwrap(),
            Tag(0x0009, 0x0000),
        );
        // no creator
        assert_eq!(
            ds.resolve_private_tag(Tag(0x0009, 0x0001), None).unwrap(),
            Tag(0x0009, 0x0001),
        );
        // already resolved
        assert_eq!(
            ds.resolve_private_tag(Tag(0x0009, 0x1001), Some("ACME"))
                .unwrap(),
            Tag(0x0009, 0x1001),
        );
        assert!(ds.is_empty());
    }

    #[test]
    fn exhausted_groups_are_reported() {
        let mut ds = InMemDataSet::new_empty();
        for block in 0x10..=0xFF_u16 {
            ds.put(DataElement::new(
                Tag(0x0009, block),
                VR::LO,
                Value::new(PrimitiveValue::from(format!("VENDOR {}", block))),
            ));
        }

        let err = ds
            .resolve_private_tag(Tag(0x0009, 0x0001), Some("ACME"))
            .unwrap_err();
        assert!(matches!(
            err,
            PrivateTagError::BlocksExhausted { group: 0x0009, .. }
        ));
    }

    #[test]
    fn put_and_fetch_private_values() {
        let mut ds = InMemDataSet::new_empty();
        let tag = ds
            .put_private_value(
                0x0009,
                "ACME",
                0x01,
                VR::LO,
                PrimitiveValue::from("positron emission"),
            )
            .unwrap();
        assert_eq!(tag, Tag(0x0009, 0x1001));

        let elt = ds.private_element(0x0009, "ACME", 0x01).unwrap();
        assert_eq!(elt.to_str().unwrap(), "positron emission");

        assert!(matches!(
            ds.private_element(0x0009, "OTHER", 0x01),
            Err(PrivateTagError::PrivateCreatorNotFound { .. })
        ));
        assert!(matches!(
            ds.private_element(0x0009, "ACME", 0x02),
            Err(PrivateTagError::ElementNotFound { .. })
        ));
        assert!(matches!(
            ds.private_element(0x0008, "ACME", 0x01),
            Err(PrivateTagError::InvalidGroup { group: 0x0008 })
        ));
    }
}
