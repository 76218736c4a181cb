//! Turns a parsed [`MftAttribute`] into its typed [`AttributeValue`],
//! reading resident bytes directly and non-resident ones back through a
//! device by way of [`ClusterBlockStream`]. Scoped to attributes owned
//! outright by a single MFT record; reassembling one that spans multiple
//! records via an `$ATTRIBUTE_LIST` is a higher layer's job, since doing so
//! requires resolving other records' file references.
use std::io::Cursor;

use crate::attribute::header::ResidentialHeader;
use crate::attribute::raw::RawAttribute;
use crate::attribute::value::AttributeValue;
use crate::attribute::x10::StandardInfoAttr;
use crate::attribute::x100::LoggedUtilityStreamAttr;
use crate::attribute::x30::FileNameAttr;
use crate::attribute::x40::ObjectIdAttr;
use crate::attribute::x50::SecurityDescriptorAttr;
use crate::attribute::x60::VolumeNameAttr;
use crate::attribute::x70::VolumeInformationAttr;
use crate::attribute::xb0::BitmapAttr;
use crate::attribute::xc0::ReparsePointAttr;
use crate::attribute::{AttributeDataFlags, MftAttribute, MftAttributeType};
use crate::cache::ClusterBlockCache;
use crate::err::{self, Result};
use crate::stream::{ClusterBlockStream, ClusterGeometry};
use crate::ReadSeek;

use bitflags::bitflags;

bitflags! {
    /// Flags controlling how [`materialize`] resolves an attribute's value.
    #[derive(Default)]
    pub struct ReadFlags: u32 {
        /// Never touch `device`. A non-resident attribute materializes to an
        /// empty value of the right kind instead of reading its data runs,
        /// so a record's metadata stays reachable even when the payload
        /// can't be (or isn't worth) decoding.
        const MFT_ONLY = 0x0000_0001;
    }
}

/// Materializes `attribute`'s typed value, reading non-resident data runs
/// back through `device` using `geometry` to translate clusters to byte
/// offsets.
pub fn materialize<D: ReadSeek>(
    attribute: &MftAttribute,
    device: &mut D,
    geometry: ClusterGeometry,
    flags: ReadFlags,
) -> Result<AttributeValue> {
    let type_code = attribute.header.type_code;

    if let Some(resident) = &attribute.resident_data {
        return materialize_resident(type_code, &attribute.header.name, resident);
    }

    materialize_non_resident(attribute, type_code, device, geometry, flags)
}

fn materialize_resident(
    type_code: MftAttributeType,
    attribute_name: &str,
    data: &[u8],
) -> Result<AttributeValue> {
    let mut cursor = Cursor::new(data.to_vec());
    match type_code {
        MftAttributeType::StandardInformation => Ok(AttributeValue::StandardInformation(
            StandardInfoAttr::from_reader(&mut cursor, data.len())?,
        )),
        MftAttributeType::FileName => Ok(AttributeValue::FileName(FileNameAttr::from_stream(
            &mut cursor,
        )?)),
        MftAttributeType::ObjectId => Ok(AttributeValue::ObjectId(ObjectIdAttr::from_stream(
            &mut cursor,
            data.len(),
        )?)),
        MftAttributeType::SecurityDescriptor => Ok(AttributeValue::SecurityDescriptor(
            SecurityDescriptorAttr::from_stream(&mut cursor, data.len())?,
        )),
        MftAttributeType::VolumeName => Ok(AttributeValue::VolumeName(
            VolumeNameAttr::from_stream(&mut cursor, data.len())?,
        )),
        MftAttributeType::VolumeInformation => Ok(AttributeValue::VolumeInformation(
            VolumeInformationAttr::from_stream(&mut cursor)?,
        )),
        MftAttributeType::BITMAP => Ok(AttributeValue::Bitmap(BitmapAttr::from_stream(
            &mut cursor,
            data.len(),
        )?)),
        MftAttributeType::ReparsePoint => Ok(AttributeValue::ReparsePoint(
            ReparsePointAttr::from_stream(&mut cursor, data.len())?,
        )),
        MftAttributeType::LoggedUtilityStream => Ok(AttributeValue::LoggedUtilityStream(
            LoggedUtilityStreamAttr::from_stream(&mut cursor, data.len(), attribute_name)?,
        )),
        // DATA, ATTRIBUTE_LIST, INDEX_ROOT and anything else resident are
        // left to higher layers as opaque bytes.
        _ => Ok(AttributeValue::Raw(RawAttribute {
            attribute_type: type_code,
            data: data.to_vec(),
        })),
    }
}

fn materialize_non_resident<D: ReadSeek>(
    attribute: &MftAttribute,
    type_code: MftAttributeType,
    device: &mut D,
    geometry: ClusterGeometry,
    flags: ReadFlags,
) -> Result<AttributeValue> {
    // These schemas are only ever written resident; a non-resident record
    // claiming to hold one is a parse/following error this crate refuses to
    // paper over.
    let resident_only = matches!(
        type_code,
        MftAttributeType::FileName
            | MftAttributeType::StandardInformation
            | MftAttributeType::ObjectId
            | MftAttributeType::ReparsePoint
            | MftAttributeType::VolumeInformation
            | MftAttributeType::VolumeName
    );
    if resident_only {
        return err::UnsupportedNonResident {
            attribute_type: type_code,
        }
        .fail();
    }

    let non_resident = attribute
        .non_resident
        .as_ref()
        .expect("header.residential_header is NonResident, so non_resident is populated");
    let header = match &attribute.header.residential_header {
        ResidentialHeader::NonResident(h) => h,
        ResidentialHeader::Resident(_) => {
            unreachable!("attribute.resident_data is None only when the header is non-resident")
        }
    };

    if flags.contains(ReadFlags::MFT_ONLY) {
        return Ok(empty_value(type_code));
    }

    let is_compressed_or_sparse = attribute
        .header
        .data_flags
        .intersects(AttributeDataFlags::IS_COMPRESSED | AttributeDataFlags::SPARSE);
    if is_compressed_or_sparse && header.compression_unit_size > 0 && cfg!(not(feature = "lznt1")) {
        return err::UnsupportedCompression.fail();
    }

    // BITMAP is built block-by-block through the cached cluster vector, the
    // rest read the stream directly.
    if type_code == MftAttributeType::BITMAP {
        let stream = ClusterBlockStream::new(
            device,
            geometry,
            non_resident.data_runs.clone(),
            header.compression_unit_size,
            header.data_size,
            header.valid_data_size,
        );
        let mut cache = ClusterBlockCache::new(stream, geometry);
        let mut bitmap = BitmapAttr::empty();
        for cluster_index in 0..cache.len_in_clusters() {
            let block = cache.block(cluster_index)?;
            bitmap.append(block);
        }
        bitmap.truncate(header.data_size as usize);
        return Ok(AttributeValue::Bitmap(bitmap));
    }

    let mut stream = ClusterBlockStream::new(
        device,
        geometry,
        non_resident.data_runs.clone(),
        header.compression_unit_size,
        header.data_size,
        header.valid_data_size,
    );
    let data = read_stream_fully(&mut stream, header.data_size as usize)?;

    match type_code {
        MftAttributeType::SecurityDescriptor => Ok(AttributeValue::SecurityDescriptor(
            SecurityDescriptorAttr::from_stream(&mut Cursor::new(data.clone()), data.len())?,
        )),
        MftAttributeType::LoggedUtilityStream => Ok(AttributeValue::LoggedUtilityStream(
            LoggedUtilityStreamAttr::from_stream(
                &mut Cursor::new(data.clone()),
                data.len(),
                &attribute.header.name,
            )?,
        )),
        _ => Ok(AttributeValue::Raw(RawAttribute {
            attribute_type: type_code,
            data,
        })),
    }
}

/// An empty typed value of the kind `type_code` normally materializes to,
/// used to satisfy `MFT_ONLY` without reading `device` at all.
fn empty_value(type_code: MftAttributeType) -> AttributeValue {
    match type_code {
        MftAttributeType::SecurityDescriptor => {
            AttributeValue::SecurityDescriptor(SecurityDescriptorAttr::empty())
        }
        MftAttributeType::BITMAP => AttributeValue::Bitmap(BitmapAttr::empty()),
        MftAttributeType::LoggedUtilityStream => {
            AttributeValue::LoggedUtilityStream(LoggedUtilityStreamAttr::Opaque(Vec::new()))
        }
        _ => AttributeValue::Raw(RawAttribute {
            attribute_type: type_code,
            data: Vec::new(),
        }),
    }
}

fn read_stream_fully<D: ReadSeek>(
    stream: &mut ClusterBlockStream<'_, D>,
    len: usize,
) -> Result<Vec<u8>> {
    let mut data = vec![0_u8; len];
    let mut total = 0usize;
    while total < data.len() {
        let n = stream.read_at(total as u64, &mut data[total..])?;
        if n == 0 {
            break;
        }
        total += n;
    }
    data.truncate(total);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::data_run::{DataRun, RunType};
    use crate::attribute::header::{MftAttributeHeader, NonResidentHeader, ResidentHeader};
    use crate::attribute::non_resident_attr::NonResidentAttr;

    fn geometry() -> ClusterGeometry {
        ClusterGeometry {
            bytes_per_sector: 512,
            sectors_per_cluster: 1,
        }
    }

    fn resident_attribute(type_code: MftAttributeType, data: Vec<u8>) -> MftAttribute {
        let header = MftAttributeHeader {
            type_code,
            record_length: 64,
            form_code: 0,
            residential_header: ResidentialHeader::Resident(ResidentHeader {
                data_size: data.len() as u32,
                data_offset: 24,
                index_flag: 0,
                padding: 0,
            }),
            name_size: 0,
            name_offset: None,
            data_flags: AttributeDataFlags::empty(),
            instance: 0,
            name: String::new(),
            start_offset: 0,
        };
        MftAttribute {
            header,
            resident_data: Some(data),
            non_resident: None,
        }
    }

    #[test]
    fn resident_volume_name_materializes_directly() {
        let name_utf16: Vec<u8> = "A"
            .encode_utf16()
            .flat_map(|c| c.to_le_bytes())
            .collect();
        let attribute = resident_attribute(MftAttributeType::VolumeName, name_utf16);

        let mut device = Cursor::new(Vec::<u8>::new());
        let value = materialize(&attribute, &mut device, geometry(), ReadFlags::empty()).unwrap();
        match value {
            AttributeValue::VolumeName(v) => assert_eq!(v.name, "A"),
            other => panic!("unexpected value: {:?}", other),
        }
    }

    #[test]
    fn non_resident_file_name_is_rejected() {
        let non_resident_header = NonResidentHeader {
            data_first_vcn: 0,
            data_last_vcn: 0,
            runs_offset: 64,
            compression_unit_size: 0,
            padding: 0,
            allocated_data_size: 4096,
            data_size: 4096,
            valid_data_size: 4096,
            compressed_data_size: None,
        };
        let header = MftAttributeHeader {
            type_code: MftAttributeType::FileName,
            record_length: 64,
            form_code: 1,
            residential_header: ResidentialHeader::NonResident(non_resident_header),
            name_size: 0,
            name_offset: None,
            data_flags: AttributeDataFlags::empty(),
            instance: 0,
            name: String::new(),
            start_offset: 0,
        };
        let attribute = MftAttribute {
            header,
            resident_data: None,
            non_resident: Some(NonResidentAttr {
                data_runs: vec![DataRun {
                    lcn_offset: 0,
                    lcn_length: 8,
                    run_type: RunType::Standard,
                }],
            }),
        };

        let mut device = Cursor::new(vec![0u8; 4096]);
        let result = materialize(&attribute, &mut device, geometry(), ReadFlags::empty());
        assert!(matches!(
            result,
            Err(err::Error::UnsupportedNonResident { .. })
        ));
    }

    #[test]
    fn non_resident_bitmap_reads_through_cluster_cache() {
        let cluster_size = geometry().cluster_size();
        let mut disk = vec![0u8; cluster_size as usize];
        disk[0] = 0b0000_0011;
        let mut device = Cursor::new(disk);

        let non_resident_header = NonResidentHeader {
            data_first_vcn: 0,
            data_last_vcn: 0,
            runs_offset: 64,
            compression_unit_size: 0,
            padding: 0,
            allocated_data_size: cluster_size,
            data_size: cluster_size,
            valid_data_size: cluster_size,
            compressed_data_size: None,
        };
        let header = MftAttributeHeader {
            type_code: MftAttributeType::BITMAP,
            record_length: 64,
            form_code: 1,
            residential_header: ResidentialHeader::NonResident(non_resident_header),
            name_size: 0,
            name_offset: None,
            data_flags: AttributeDataFlags::empty(),
            instance: 0,
            name: String::new(),
            start_offset: 0,
        };
        let attribute = MftAttribute {
            header,
            resident_data: None,
            non_resident: Some(NonResidentAttr {
                data_runs: vec![DataRun {
                    lcn_offset: 0,
                    lcn_length: 1,
                    run_type: RunType::Standard,
                }],
            }),
        };

        let value = materialize(&attribute, &mut device, geometry(), ReadFlags::empty()).unwrap();
        match value {
            AttributeValue::Bitmap(bitmap) => assert_eq!(bitmap.count_set(), 2),
            other => panic!("unexpected value: {:?}", other),
        }
    }

    #[test]
    fn compressed_data_fails_without_lznt1_but_mft_only_short_circuits_it() {
        let non_resident_header = NonResidentHeader {
            data_first_vcn: 0,
            data_last_vcn: 3,
            runs_offset: 64,
            compression_unit_size: 4,
            padding: 0,
            allocated_data_size: 4096,
            data_size: 4096,
            valid_data_size: 4096,
            compressed_data_size: Some(2048),
        };
        let header = MftAttributeHeader {
            type_code: MftAttributeType::DATA,
            record_length: 64,
            form_code: 1,
            residential_header: ResidentialHeader::NonResident(non_resident_header),
            name_size: 0,
            name_offset: None,
            data_flags: AttributeDataFlags::IS_COMPRESSED,
            instance: 0,
            name: String::new(),
            start_offset: 0,
        };
        let attribute = MftAttribute {
            header,
            resident_data: None,
            non_resident: Some(NonResidentAttr {
                data_runs: vec![DataRun {
                    lcn_offset: 0,
                    lcn_length: 4,
                    run_type: RunType::Standard,
                }],
            }),
        };
        let mut device = Cursor::new(vec![0u8; 4096]);

        let without_flag = materialize(&attribute, &mut device, geometry(), ReadFlags::empty());
        assert!(matches!(
            without_flag,
            Err(err::Error::UnsupportedCompression)
        ));

        let with_flag = materialize(&attribute, &mut device, geometry(), ReadFlags::MFT_ONLY)
            .expect("MFT_ONLY skips the compression check entirely");
        match with_flag {
            AttributeValue::Raw(raw) => {
                assert_eq!(raw.attribute_type, MftAttributeType::DATA);
                assert!(raw.data.is_empty());
            }
            other => panic!("unexpected value: {:?}", other),
        }
    }
}
