use crate::err::Result;
use crate::{impl_serialize_for_bitflags, ReadSeek};

use bitflags::bitflags;
use byteorder::{LittleEndian, ReadBytesExt};
use serde::Serialize;

bitflags! {
    #[derive(Default)]
    pub struct VolumeInformationFlags: u16 {
        const DIRTY                 = 0x0001;
        const RESIZE_LOG_FILE       = 0x0002;
        const UPGRADE_ON_MOUNT      = 0x0004;
        const MOUNTED_ON_NT4        = 0x0008;
        const DELETE_USN_UNDERWAY   = 0x0010;
        const REPAIR_OBJECT_ID      = 0x0020;
        const CHKDSK_UNDERWAY       = 0x4000;
        const MODIFIED_BY_CHKDSK    = 0x8000;
    }
}

impl_serialize_for_bitflags! {VolumeInformationFlags}

/// $VOLUME_INFORMATION: the volume's NTFS version and dirty/chkdsk state,
/// present only in the `$Volume` system file.
#[derive(Serialize, Clone, Debug)]
pub struct VolumeInformationAttr {
    #[serde(skip_serializing)]
    pub reserved: u64,
    pub major_version: u8,
    pub minor_version: u8,
    pub flags: VolumeInformationFlags,
}

impl VolumeInformationAttr {
    pub fn from_stream<S: ReadSeek>(stream: &mut S) -> Result<Self> {
        let reserved = stream.read_u64::<LittleEndian>()?;
        let major_version = stream.read_u8()?;
        let minor_version = stream.read_u8()?;
        let flags = VolumeInformationFlags::from_bits_truncate(stream.read_u16::<LittleEndian>()?);

        Ok(VolumeInformationAttr {
            reserved,
            major_version,
            minor_version,
            flags,
        })
    }
}
