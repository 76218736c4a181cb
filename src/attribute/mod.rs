pub mod data_run;
pub mod header;
pub mod non_resident_attr;
pub mod raw;
pub mod value;
pub mod x10;
pub mod x20;
pub mod x30;
pub mod x40;
pub mod x50;
pub mod x60;
pub mod x70;
pub mod xb0;
pub mod xc0;
pub mod x100;

pub mod facade;

use crate::err::Result;
use crate::{impl_serialize_for_bitflags, ReadSeek};

use bitflags::bitflags;
use serde::Serialize;
use std::io::SeekFrom;

pub use x30::FileAttributeFlags;

use crate::attribute::header::{MftAttributeHeader, ResidentialHeader};
use crate::attribute::non_resident_attr::NonResidentAttr;

/// A parsed attribute record: the common header, plus whichever of resident
/// payload bytes or non-resident data runs the record's form code carries.
/// Typed decoding of the payload (9.$10/$20/.../0x100 etc) is deferred to
/// [`facade::AttributeFacade`] rather than performed eagerly here, since a
/// given attribute may never be asked for its materialized value.
#[derive(Serialize, Clone, Debug)]
pub struct MftAttribute {
    pub header: MftAttributeHeader,
    pub resident_data: Option<Vec<u8>>,
    pub non_resident: Option<NonResidentAttr>,
}

impl MftAttribute {
    /// Parses one attribute record starting at the stream's current
    /// position. Returns `Ok(None)` once the $END marker (`0xFFFFFFFF` type
    /// code) is reached.
    pub fn from_stream<S: ReadSeek>(stream: &mut S) -> Result<Option<MftAttribute>> {
        let header = match MftAttributeHeader::from_stream(stream)? {
            Some(header) => header,
            None => return Ok(None),
        };

        let (resident_data, non_resident) = match &header.residential_header {
            ResidentialHeader::Resident(resident) => {
                stream.seek(SeekFrom::Start(
                    header.start_offset + u64::from(resident.data_offset),
                ))?;
                let mut data = vec![0_u8; resident.data_size as usize];
                stream.read_exact(&mut data)?;
                (Some(data), None)
            }
            ResidentialHeader::NonResident(non_resident_header) => {
                let runs = NonResidentAttr::from_stream(stream, &header, non_resident_header)?;
                (None, Some(runs))
            }
        };

        // Advance to the next attribute record regardless of how much of
        // this one's payload we actually consumed.
        stream.seek(SeekFrom::Start(
            header.start_offset + u64::from(header.record_length),
        ))?;

        Ok(Some(MftAttribute {
            header,
            resident_data,
            non_resident,
        }))
    }
}

/// MFT attribute type codes, from
/// <https://docs.microsoft.com/en-us/windows/desktop/devnotes/attribute-list-entry>.
/// `IndexRoot`, `IndexAllocation`, `DATA`, `AttributeList` and unrecognized
/// codes are left to higher layers; this crate only materializes typed
/// values for the rest (see [`value::AttributeValue`]).
#[derive(Serialize, Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialOrd, Ord, PartialEq, Eq)]
#[repr(u32)]
pub enum MftAttributeType {
    /// File attributes (such as read-only and archive), time stamps (such as file creation and last modified), and the hard link count.
    StandardInformation = 0x10_u32,
    /// A list of attributes that make up the file and the file reference of the MFT file record in which each attribute is located.
    AttributeList = 0x20_u32,
    /// The name of the file, in Unicode characters.
    FileName = 0x30_u32,
    /// An 16-byte object identifier assigned by the link-tracking service.
    ObjectId = 0x40_u32,
    /// File's access control list and security properties
    SecurityDescriptor = 0x50_u32,
    /// The volume label.
    /// Present in the $Volume file.
    VolumeName = 0x60_u32,
    /// The volume information.
    /// Present in the $Volume file.
    VolumeInformation = 0x70_u32,
    /// The contents of the file.
    DATA = 0x80_u32,
    /// Used to implement filename allocation for large directories.
    IndexRoot = 0x90_u32,
    /// Used to implement filename allocation for large directories.
    IndexAllocation = 0xA0_u32,
    /// A bitmap index for a large directory.
    BITMAP = 0xB0_u32,
    /// The reparse point data.
    ReparsePoint = 0xC0_u32,
    /// Used for backward compatibility with OS/2 applications (HPFS)
    EaInformation = 0xD0_u32,
    /// Used for backward compatibility with OS/2 applications (HPFS)
    EA = 0xE0_u32,
    /// Keys and other information about encrypted attributes (NTFS 3.0+; Windows 2000+)
    LoggedUtilityStream = 0x100_u32,
}

bitflags! {
    #[derive(Default)]
    pub struct AttributeDataFlags: u16 {
        const IS_COMPRESSED     = 0x0001;
        const COMPRESSION_MASK  = 0x00FF;
        const ENCRYPTED         = 0x4000;
        const SPARSE            = 0x8000;
    }
}

impl_serialize_for_bitflags! {AttributeDataFlags}
