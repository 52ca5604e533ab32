//! The built-in attribute dictionary.
//!
//! The table is a curated subset of the registry of standard attributes,
//! covering the patient, study, series and image modules,
//! coded concepts and structured report content,
//! and the pixel description attributes.
//! Entries are sorted by tag so that tag lookup is a binary search.

use super::{DataDictionary, DictionaryEntryRef, VM};
use crate::header::{Tag, VR};

/// The default attribute dictionary, built into the program.
///
/// This dictionary is zero-sized and can be passed by value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StandardDataDictionary;

impl DataDictionary for StandardDataDictionary {
    type Entry = DictionaryEntryRef<'static>;

    fn by_tag(&self, tag: Tag) -> Option<&Self::Entry> {
        ENTRIES
            .binary_search_by_key(&tag, |e| e.tag)
            .ok()
            .map(|i| &ENTRIES[i])
    }

    fn by_name(&self, name: &str) -> Option<&Self::Entry> {
        ENTRIES.iter().find(|e| e.alias == name)
    }
}

macro_rules! entry {
    ($group: expr, $elem: expr, $alias: expr, [$($vr: ident),+], $vm: expr) => {
        DictionaryEntryRef {
            tag: Tag($group, $elem),
            alias: $alias,
            vrs: &[$(VR::$vr),+],
            vm: $vm,
        }
    };
}

const ONE: VM = VM::fixed(1);

/// The attribute table, ordered by tag.
static ENTRIES: &[DictionaryEntryRef<'static>] = &[
    entry!(0x0002, 0x0010, "TransferSyntaxUID", [UI], ONE),
    entry!(0x0008, 0x0005, "SpecificCharacterSet", [CS], VM::unbounded(1)),
    entry!(0x0008, 0x0008, "ImageType", [CS], VM::unbounded(2)),
    entry!(0x0008, 0x0016, "SOPClassUID", [UI], ONE),
    entry!(0x0008, 0x0018, "SOPInstanceUID", [UI], ONE),
    entry!(0x0008, 0x0020, "StudyDate", [DA], ONE),
    entry!(0x0008, 0x0021, "SeriesDate", [DA], ONE),
    entry!(0x0008, 0x0023, "ContentDate", [DA], ONE),
    entry!(0x0008, 0x002A, "AcquisitionDateTime", [DT], ONE),
    entry!(0x0008, 0x0030, "StudyTime", [TM], ONE),
    entry!(0x0008, 0x0033, "ContentTime", [TM], ONE),
    entry!(0x0008, 0x0050, "AccessionNumber", [SH], ONE),
    entry!(0x0008, 0x0060, "Modality", [CS], ONE),
    entry!(0x0008, 0x0070, "Manufacturer", [LO], ONE),
    entry!(0x0008, 0x0100, "CodeValue", [SH], ONE),
    entry!(0x0008, 0x0102, "CodingSchemeDesignator", [SH], ONE),
    entry!(0x0008, 0x0103, "CodingSchemeVersion", [SH], ONE),
    entry!(0x0008, 0x0104, "CodeMeaning", [LO], ONE),
    entry!(0x0008, 0x1030, "StudyDescription", [LO], ONE),
    entry!(0x0008, 0x103E, "SeriesDescription", [LO], ONE),
    entry!(0x0008, 0x1115, "ReferencedSeriesSequence", [SQ], ONE),
    entry!(0x0008, 0x1150, "ReferencedSOPClassUID", [UI], ONE),
    entry!(0x0008, 0x1155, "ReferencedSOPInstanceUID", [UI], ONE),
    entry!(0x0008, 0x1199, "ReferencedSOPSequence", [SQ], ONE),
    entry!(0x0010, 0x0010, "PatientName", [PN], ONE),
    entry!(0x0010, 0x0020, "PatientID", [LO], ONE),
    entry!(0x0010, 0x0030, "PatientBirthDate", [DA], ONE),
    entry!(0x0010, 0x0040, "PatientSex", [CS], ONE),
    entry!(0x0010, 0x1010, "PatientAge", [AS], ONE),
    entry!(0x0010, 0x1020, "PatientSize", [DS], ONE),
    entry!(0x0010, 0x1030, "PatientWeight", [DS], ONE),
    entry!(0x0018, 0x0050, "SliceThickness", [DS], ONE),
    entry!(0x0018, 0x5100, "PatientPosition", [CS], ONE),
    entry!(0x0020, 0x000D, "StudyInstanceUID", [UI], ONE),
    entry!(0x0020, 0x000E, "SeriesInstanceUID", [UI], ONE),
    entry!(0x0020, 0x0011, "SeriesNumber", [IS], ONE),
    entry!(0x0020, 0x0013, "InstanceNumber", [IS], ONE),
    entry!(0x0020, 0x0032, "ImagePositionPatient", [DS], VM::fixed(3)),
    entry!(0x0020, 0x0037, "ImageOrientationPatient", [DS], VM::fixed(6)),
    entry!(0x0020, 0x0052, "FrameOfReferenceUID", [UI], ONE),
    entry!(0x0020, 0x1041, "SliceLocation", [DS], ONE),
    entry!(0x0028, 0x0002, "SamplesPerPixel", [US], ONE),
    entry!(0x0028, 0x0004, "PhotometricInterpretation", [CS], ONE),
    entry!(0x0028, 0x0010, "Rows", [US], ONE),
    entry!(0x0028, 0x0011, "Columns", [US], ONE),
    entry!(0x0028, 0x0030, "PixelSpacing", [DS], VM::fixed(2)),
    entry!(0x0028, 0x0100, "BitsAllocated", [US], ONE),
    entry!(0x0028, 0x0101, "BitsStored", [US], ONE),
    entry!(0x0028, 0x0102, "HighBit", [US], ONE),
    entry!(0x0028, 0x0103, "PixelRepresentation", [US], ONE),
    entry!(0x0028, 0x0106, "SmallestImagePixelValue", [US, SS], ONE),
    entry!(0x0028, 0x0107, "LargestImagePixelValue", [US, SS], ONE),
    entry!(0x0028, 0x1050, "WindowCenter", [DS], VM::unbounded(1)),
    entry!(0x0028, 0x1051, "WindowWidth", [DS], VM::unbounded(1)),
    entry!(0x0028, 0x1052, "RescaleIntercept", [DS], ONE),
    entry!(0x0028, 0x1053, "RescaleSlope", [DS], ONE),
    entry!(0x0040, 0x08EA, "MeasurementUnitsCodeSequence", [SQ], ONE),
    entry!(0x0040, 0xA010, "RelationshipType", [CS], ONE),
    entry!(0x0040, 0xA040, "ValueType", [CS], ONE),
    entry!(0x0040, 0xA043, "ConceptNameCodeSequence", [SQ], ONE),
    entry!(0x0040, 0xA120, "DateTime", [DT], ONE),
    entry!(0x0040, 0xA160, "TextValue", [UT], ONE),
    entry!(0x0040, 0xA168, "ConceptCodeSequence", [SQ], ONE),
    entry!(0x0040, 0xA300, "MeasuredValueSequence", [SQ], ONE),
    entry!(0x0040, 0xA30A, "NumericValue", [DS], VM::unbounded(1)),
    entry!(0x0040, 0xA730, "ContentSequence", [SQ], ONE),
    entry!(0x7FE0, 0x0010, "PixelData", [OB, OW], ONE),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::DictionaryEntry;

    #[test]
    fn entries_are_sorted_by_tag() {
        for pair in ENTRIES.windows(2) {
            assert!(
                pair[0].tag < pair[1].tag,
                "entries out of order: {} before {}",
                pair[0].tag,
                pair[1].tag,
            );
        }
    }

    #[test]
    fn lookup_by_tag() {
        let dict = StandardDataDictionary;
        let entry = dict.by_tag(Tag(0x0010, 0x0010)).unwrap();
        assert_eq!(entry.alias(), "PatientName");
        assert_eq!(entry.vrs(), &[VR::PN]);
        assert_eq!(entry.vm(), VM::fixed(1));

        assert!(dict.by_tag(Tag(0x0011, 0x0001)).is_none());
    }

    #[test]
    fn lookup_by_name() {
        let dict = StandardDataDictionary;
        let entry = dict.by_name("ImageType").unwrap();
        assert_eq!(entry.tag(), Tag(0x0008, 0x0008));
        assert!(entry.vm().is_multi());

        assert!(dict.by_name("NoSuchAttribute").is_none());
    }

    #[test]
    fn multi_vr_entries() {
        let dict = StandardDataDictionary;
        let entry = dict.by_tag(Tag(0x7FE0, 0x0010)).unwrap();
        assert_eq!(entry.vrs(), &[VR::OB, VR::OW]);
    }
}
