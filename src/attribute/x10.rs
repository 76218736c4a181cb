use crate::err::{self, Result};

use crate::ReadSeek;
use byteorder::{LittleEndian, ReadBytesExt};
use chrono::{DateTime, Utc};
use log::trace;
use serde::Serialize;
use snafu::ResultExt;
use winstructs::timestamp::WinTimestamp;

/// Size in bytes of the NTFS 3.0+ ("v3") extension fields appended after the
/// four timestamps and the file flags/versioning fields. A payload shorter
/// than this (48 bytes) is a pre-3.0 ("v1") record and carries only the
/// timestamps and `file_flags`.
const V3_EXTENSION_SIZE: usize = 72;

#[derive(Serialize, Debug, Clone)]
pub struct StandardInfoAttr {
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub mft_modified: DateTime<Utc>,
    pub accessed: DateTime<Utc>,
    pub file_flags: u32,
    /// `max_version` onward are only present on NTFS 3.0+ volumes; `None` for
    /// a pre-3.0 ("v1") $STANDARD_INFORMATION record.
    pub max_version: Option<u32>,
    pub version: Option<u32>,
    pub class_id: Option<u32>,
    pub owner_id: Option<u32>,
    pub security_id: Option<u32>,
    pub quota: Option<u64>,
    pub usn: Option<u64>,
}

impl StandardInfoAttr {
    /// Parse a Standard Information attribute buffer. `data_size` is the
    /// resident attribute's declared payload size, which discriminates the
    /// 48-byte "v1" record from the 72-byte NTFS 3.0+ "v3" record.
    ///
    /// # Example
    ///
    /// Parse a raw buffer.
    ///
    /// ```
    /// use ntfs_attr_core::attribute::x10::StandardInfoAttr;
    /// # use std::io::Cursor;
    /// let attribute_buffer: &[u8] = &[
    /// 	0x2F,0x6D,0xB6,0x6F,0x0C,0x97,0xCE,0x01,0x56,0xCD,0x1A,0x75,0x73,0xB5,0xCE,0x01,
    /// 	0x56,0xCD,0x1A,0x75,0x73,0xB5,0xCE,0x01,0x56,0xCD,0x1A,0x75,0x73,0xB5,0xCE,0x01,
    /// 	0x20,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00,
    /// 	0x00,0x00,0x00,0x00,0xB0,0x05,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00,
    /// 	0x68,0x58,0xA0,0x0A,0x02,0x00,0x00,0x00
    /// ];
    ///
    /// let attribute = StandardInfoAttr::from_reader(&mut Cursor::new(attribute_buffer), attribute_buffer.len()).unwrap();
    ///
    /// assert_eq!(attribute.file_flags, 32);
    /// assert_eq!(attribute.security_id, Some(1456));
    /// assert_eq!(attribute.quota, Some(0));
    /// assert_eq!(attribute.usn, Some(8768215144));
    /// ```
    pub fn from_reader<S: ReadSeek>(reader: &mut S, data_size: usize) -> Result<StandardInfoAttr> {
        trace!("StandardInfoAttr");
        let created = WinTimestamp::from_reader(reader)
            .context(err::FailedToReadWindowsTime)?
            .to_datetime();
        let modified = WinTimestamp::from_reader(reader)
            .context(err::FailedToReadWindowsTime)?
            .to_datetime();
        let mft_modified = WinTimestamp::from_reader(reader)
            .context(err::FailedToReadWindowsTime)?
            .to_datetime();
        let accessed = WinTimestamp::from_reader(reader)
            .context(err::FailedToReadWindowsTime)?
            .to_datetime();

        let file_flags = reader.read_u32::<LittleEndian>()?;
        let max_version = reader.read_u32::<LittleEndian>()?;
        let version = reader.read_u32::<LittleEndian>()?;
        let class_id = reader.read_u32::<LittleEndian>()?;

        if data_size < V3_EXTENSION_SIZE {
            return Ok(StandardInfoAttr {
                created,
                modified,
                mft_modified,
                accessed,
                file_flags,
                max_version: None,
                version: None,
                class_id: None,
                owner_id: None,
                security_id: None,
                quota: None,
                usn: None,
            });
        }

        let owner_id = reader.read_u32::<LittleEndian>()?;
        let security_id = reader.read_u32::<LittleEndian>()?;
        let quota = reader.read_u64::<LittleEndian>()?;
        let usn = reader.read_u64::<LittleEndian>()?;

        Ok(StandardInfoAttr {
            created,
            modified,
            mft_modified,
            accessed,
            file_flags,
            max_version: Some(max_version),
            version: Some(version),
            class_id: Some(class_id),
            owner_id: Some(owner_id),
            security_id: Some(security_id),
            quota: Some(quota),
            usn: Some(usn),
        })
    }
}
