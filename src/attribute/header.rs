use crate::attribute::{AttributeDataFlags, MftAttributeType};
use crate::err::{self, Error, Result};
use crate::utils::read_utf16_string;

use byteorder::{LittleEndian, ReadBytesExt};
use num_traits::FromPrimitive;
use serde::Serialize;
use snafu::ensure;
use std::io::{Read, Seek, SeekFrom};

/// Fixed size of the common prefix shared by resident and non-resident
/// attribute records, up to and including the instance id.
const FIXED_HEADER_SIZE: u32 = 16;

/// Represents the union defined in
/// <https://docs.microsoft.com/en-us/windows/desktop/devnotes/attribute-record-header>
#[derive(Serialize, Clone, Debug)]
pub struct MftAttributeHeader {
    pub type_code: MftAttributeType,
    /// The size of the attribute record, in bytes.
    /// This value reflects the required size for the record variant and is always rounded to the nearest quadword boundary.
    pub record_length: u32,
    /// If the FormCode member is RESIDENT_FORM (0x00), the union is a Resident structure.
    /// If FormCode is NONRESIDENT_FORM (0x01), the union is a Nonresident structure.
    pub form_code: u8,
    pub residential_header: ResidentialHeader,
    /// The size of the optional attribute name, in characters, or 0 if there is no attribute name.
    /// The maximum attribute name length is 255 characters.
    pub name_size: u8,
    /// The offset of the attribute name from the start of the attribute record, in bytes.
    /// If the NameLength member is 0, this member is undefined.
    pub name_offset: Option<u16>,
    pub data_flags: AttributeDataFlags,
    /// The unique instance for this attribute in the file record.
    pub instance: u16,
    pub name: String,
    /// start of the attribute; used for calculating relative offsets
    pub start_offset: u64,
}

#[derive(Serialize, Clone, Debug)]
#[serde(untagged)]
pub enum ResidentialHeader {
    Resident(ResidentHeader),
    NonResident(NonResidentHeader),
}

impl MftAttributeHeader {
    /// Tries to read an AttributeHeader from the stream.
    /// Will return `None` if the type code is $END.
    pub fn from_stream<S: Read + Seek>(stream: &mut S) -> Result<Option<MftAttributeHeader>> {
        let attribute_header_start_offset = stream.stream_position()?;

        let type_code_value = stream.read_u32::<LittleEndian>()?;

        if type_code_value == 0xFFFF_FFFF {
            return Ok(None);
        }

        let type_code = match MftAttributeType::from_u32(type_code_value) {
            Some(attribute_type) => attribute_type,
            None => {
                return Err(Error::UnknownAttributeType {
                    attribute_type: type_code_value,
                })
            }
        };

        let record_length = stream.read_u32::<LittleEndian>()?;
        ensure!(
            record_length % 8 == 0,
            err::MisalignedSize {
                size: record_length
            }
        );

        let resident_flag = stream.read_u8()?;
        let name_size = stream.read_u8()?;
        let name_offset = {
            // We always read the two bytes to advance the stream.
            let value = stream.read_u16::<LittleEndian>()?;
            if name_size > 0 {
                ensure!(
                    u32::from(value) + u32::from(name_size) * 2 <= record_length,
                    err::NameOutOfBounds {
                        name_offset: value,
                        name_length: name_size,
                        record_size: record_length,
                    }
                );
                Some(value)
            } else {
                None
            }
        };

        let data_flags = AttributeDataFlags::from_bits_truncate(stream.read_u16::<LittleEndian>()?);
        let id = stream.read_u16::<LittleEndian>()?;

        let residential_header = match resident_flag {
            0 => ResidentialHeader::Resident(ResidentHeader::from_stream(stream, record_length)?),
            1 => ResidentialHeader::NonResident(NonResidentHeader::from_stream(
                stream,
                data_flags,
                record_length,
            )?),
            _ => {
                return Err(Error::UnhandledResidentFlag {
                    flag: resident_flag,
                    offset: stream.stream_position()?,
                })
            }
        };

        // Name is optional, and will not be present if size == 0.
        let name = if name_size > 0 {
            stream.seek(SeekFrom::Start(
                attribute_header_start_offset
                    + u64::from(name_offset.expect("name_size > 0 is invariant")),
            ))?;
            read_utf16_string(stream, Some(name_size as usize))?
        } else {
            String::new()
        };

        Ok(Some(MftAttributeHeader {
            type_code,
            record_length,
            form_code: resident_flag,
            name_size,
            name_offset,
            data_flags,
            instance: id,
            name,
            residential_header,
            start_offset: attribute_header_start_offset,
        }))
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct ResidentHeader {
    #[serde(skip_serializing)]
    /// The size of the attribute value, in bytes.
    pub data_size: u32,
    #[serde(skip_serializing)]
    /// The offset to the value from the start of the attribute record, in bytes.
    pub data_offset: u16,
    pub index_flag: u8,
    pub padding: u8,
}

impl ResidentHeader {
    pub fn from_stream<R: Read>(reader: &mut R, record_length: u32) -> Result<ResidentHeader> {
        let data_size = reader.read_u32::<LittleEndian>()?;
        let data_offset = reader.read_u16::<LittleEndian>()?;
        let index_flag = reader.read_u8()?;
        let padding = reader.read_u8()?;

        ensure!(
            u64::from(data_offset) + u64::from(data_size) <= u64::from(record_length),
            err::Truncated {
                declared: data_size as usize,
                available: record_length.saturating_sub(u32::from(data_offset)) as usize,
            }
        );

        Ok(ResidentHeader {
            data_size,
            data_offset,
            index_flag,
            padding,
        })
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct NonResidentHeader {
    /// The lowest virtual cluster number (VCN) covered by this attribute record.
    pub data_first_vcn: u64,
    /// The highest VCN covered by this attribute record.
    pub data_last_vcn: u64,
    #[serde(skip_serializing)]
    /// The offset to the mapping pairs array from the start of the attribute record, in bytes.
    pub runs_offset: u16,
    /// Size, in clusters, of a compression unit. 0 if the stream isn't compressed.
    pub compression_unit_size: u16,
    #[serde(skip_serializing)]
    pub padding: u32,

    /// The allocated size of the file, in bytes.
    /// This value is an even multiple of the cluster size.
    /// This member is not valid if the first VCN is nonzero.
    pub allocated_data_size: u64,
    /// The current size of the stream, in bytes.
    pub data_size: u64,
    /// Contains the valid data size in number of bytes.
    /// This value is not valid if the first VCN is nonzero.
    pub valid_data_size: u64,
    /// Total allocated size for the uncompressed stream of a compressed
    /// attribute, present only when `AttributeDataFlags::IS_COMPRESSED` (or
    /// `SPARSE`) is set on the owning header.
    pub compressed_data_size: Option<u64>,
}

impl NonResidentHeader {
    pub fn from_stream<R: Read>(
        reader: &mut R,
        data_flags: AttributeDataFlags,
        record_length: u32,
    ) -> Result<NonResidentHeader> {
        let data_first_vcn = reader.read_u64::<LittleEndian>()?;
        let data_last_vcn = reader.read_u64::<LittleEndian>()?;
        let runs_offset = reader.read_u16::<LittleEndian>()?;
        let compression_unit_size = reader.read_u16::<LittleEndian>()?;
        let padding = reader.read_u32::<LittleEndian>()?;
        let allocated_data_size = reader.read_u64::<LittleEndian>()?;
        let data_size = reader.read_u64::<LittleEndian>()?;
        let valid_data_size = reader.read_u64::<LittleEndian>()?;

        ensure!(
            data_last_vcn >= data_first_vcn || (data_first_vcn == 0 && data_last_vcn == 0),
            err::Internal {
                detail: format!(
                    "data_last_vcn ({}) precedes data_first_vcn ({})",
                    data_last_vcn, data_first_vcn
                ),
            }
        );

        let is_compressed_or_sparse = data_flags.intersects(
            AttributeDataFlags::IS_COMPRESSED | AttributeDataFlags::SPARSE,
        );
        let compressed_data_size = if is_compressed_or_sparse {
            Some(reader.read_u64::<LittleEndian>()?)
        } else {
            None
        };

        ensure!(
            u32::from(runs_offset) <= record_length,
            err::RunListOutOfBounds {
                runs_offset,
                record_size: record_length,
            }
        );

        Ok(NonResidentHeader {
            data_first_vcn,
            data_last_vcn,
            runs_offset,
            compression_unit_size,
            padding,
            allocated_data_size,
            data_size,
            valid_data_size,
            compressed_data_size,
        })
    }
}
