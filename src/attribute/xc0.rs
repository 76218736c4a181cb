use crate::err::{self, Result};
use crate::{impl_serialize_for_bitflags, utils, ReadSeek};

use bitflags::bitflags;
use byteorder::{LittleEndian, ReadBytesExt};
use serde::{ser, Serialize};
use snafu::ResultExt;

bitflags! {
    #[derive(Default)]
    pub struct ReparseTagFlags: u32 {
        const IS_MICROSOFT      = 0x8000_0000;
        const IS_NAME_SURROGATE = 0x2000_0000;
        const IS_DIRECTORY      = 0x1000_0000;
    }
}

impl_serialize_for_bitflags! {ReparseTagFlags}

const IO_REPARSE_TAG_SYMLINK: u32 = 0xA000_000C;
const IO_REPARSE_TAG_MOUNT_POINT: u32 = 0xA000_0003;

/// $REPARSE_POINT. For tags that carry the common symbolic-link/mount-point
/// layout (substitute name + print name with a shared name buffer), the
/// offsets/lengths into `data` are decoded into `link_target`; any other tag
/// is left as opaque `data`.
#[derive(Clone, Debug)]
pub struct ReparsePointAttr {
    pub reparse_tag: u32,
    pub tag_flags: ReparseTagFlags,
    pub reparse_data_length: u16,
    pub data: Vec<u8>,
    pub link_target: Option<ReparseLinkTarget>,
}

#[derive(Serialize, Clone, Debug)]
pub struct ReparseLinkTarget {
    pub substitute_name: String,
    pub print_name: String,
}

impl ReparsePointAttr {
    pub fn from_stream<S: ReadSeek>(stream: &mut S, data_size: usize) -> Result<Self> {
        let reparse_tag = stream.read_u32::<LittleEndian>()?;
        let reparse_data_length = stream.read_u16::<LittleEndian>()?;
        let _reserved = stream.read_u16::<LittleEndian>()?;

        let tag_flags = ReparseTagFlags::from_bits_truncate(reparse_tag & 0xF000_0000);

        let declared = data_size.saturating_sub(8);
        if usize::from(reparse_data_length) > declared {
            return err::Truncated {
                declared: usize::from(reparse_data_length),
                available: declared,
            }
            .fail();
        }

        let mut data = vec![0_u8; usize::from(reparse_data_length)];
        stream.read_exact(&mut data).context(err::IoError)?;

        let link_target = if reparse_tag == IO_REPARSE_TAG_SYMLINK
            || reparse_tag == IO_REPARSE_TAG_MOUNT_POINT
        {
            parse_link_target(&data, reparse_tag == IO_REPARSE_TAG_SYMLINK)
        } else {
            None
        };

        Ok(ReparsePointAttr {
            reparse_tag,
            tag_flags,
            reparse_data_length,
            data,
            link_target,
        })
    }
}

/// Decodes the substitute-name/print-name pair shared by symbolic link and
/// mount point reparse data buffers. Returns `None` rather than erroring on a
/// malformed buffer, since this decoding is best-effort beyond the generic
/// reparse point parse.
fn parse_link_target(data: &[u8], is_symlink: bool) -> Option<ReparseLinkTarget> {
    use encoding::all::UTF_16LE;
    use encoding::{DecoderTrap, Encoding};
    use std::io::{Cursor, Read};

    let mut cursor = Cursor::new(data);
    let header_len = if is_symlink { 12 } else { 8 };
    if data.len() < header_len {
        return None;
    }

    let mut read_u16 = || -> Option<u16> {
        let mut buf = [0u8; 2];
        cursor.read_exact(&mut buf).ok()?;
        Some(u16::from_le_bytes(buf))
    };

    let substitute_name_offset = read_u16()?;
    let substitute_name_length = read_u16()?;
    let print_name_offset = read_u16()?;
    let print_name_length = read_u16()?;
    if is_symlink {
        let _flags = read_u16()?;
        let _pad = read_u16()?;
    }

    let name_buffer = &data[header_len..];
    let substitute_name = name_buffer
        .get(substitute_name_offset as usize..(substitute_name_offset + substitute_name_length) as usize)
        .and_then(|b| UTF_16LE.decode(b, DecoderTrap::Ignore).ok())?;
    let print_name = name_buffer
        .get(print_name_offset as usize..(print_name_offset + print_name_length) as usize)
        .and_then(|b| UTF_16LE.decode(b, DecoderTrap::Ignore).ok())?;

    Some(ReparseLinkTarget {
        substitute_name,
        print_name,
    })
}


impl Serialize for ReparsePointAttr {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ReparsePointAttr", 5)?;
        state.serialize_field("reparse_tag", &self.reparse_tag)?;
        state.serialize_field("tag_flags", &self.tag_flags)?;
        state.serialize_field("reparse_data_length", &self.reparse_data_length)?;
        state.serialize_field("data", &utils::to_hex_string(&self.data))?;
        state.serialize_field("link_target", &self.link_target)?;
        state.end()
    }
}
