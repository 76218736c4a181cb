use crate::err::{self, Result};
use crate::{utils, ReadSeek};

use bitflags::bitflags;
use byteorder::{LittleEndian, ReadBytesExt};
use serde::{ser, Serialize};
use snafu::ResultExt;

use crate::impl_serialize_for_bitflags;

bitflags! {
    #[derive(Default)]
    pub struct SecurityDescriptorControlFlags: u16 {
        const OWNER_DEFAULTED       = 0x0001;
        const GROUP_DEFAULTED       = 0x0002;
        const DACL_PRESENT          = 0x0004;
        const DACL_DEFAULTED        = 0x0008;
        const SACL_PRESENT          = 0x0010;
        const SACL_DEFAULTED        = 0x0020;
        const DACL_AUTO_INHERIT_REQ = 0x0100;
        const SACL_AUTO_INHERIT_REQ = 0x0200;
        const DACL_AUTO_INHERITED   = 0x0400;
        const SACL_AUTO_INHERITED   = 0x0800;
        const DACL_PROTECTED        = 0x1000;
        const SACL_PROTECTED        = 0x2000;
        const RM_CONTROL_VALID      = 0x4000;
        const SELF_RELATIVE         = 0x8000;
    }
}

impl_serialize_for_bitflags! {SecurityDescriptorControlFlags}

/// A self-relative `SECURITY_DESCRIPTOR` as found resident in a $50 attribute
/// or embedded (after a 16-byte `$SII` index header) in the `$SDS` stream.
/// The owner/group SIDs and the SACL/DACL ACLs are kept as opaque bytes,
/// addressable by the offsets below; this crate does not decode SID/ACL
/// internals.
#[derive(Clone, Debug)]
pub struct SecurityDescriptorAttr {
    pub revision: u8,
    pub control: SecurityDescriptorControlFlags,
    pub owner_offset: u32,
    pub group_offset: u32,
    pub sacl_offset: u32,
    pub dacl_offset: u32,
    pub raw: Vec<u8>,
    /// Populated only when this descriptor was read via [`Self::from_sds_stream`].
    pub sds_header: Option<SdsEntryHeader>,
}

impl SecurityDescriptorAttr {
    pub fn from_stream<S: ReadSeek>(stream: &mut S, data_size: usize) -> Result<Self> {
        let mut raw = vec![0_u8; data_size];
        stream.read_exact(&mut raw).context(err::IoError)?;
        Self::from_bytes(raw)
    }

    /// Parses one entry out of the `$Secure:$SDS` stream: a 16-byte
    /// `$SII`-style header (hash, security id, stream offset, entry size)
    /// followed by the self-relative security descriptor itself.
    pub fn from_sds_stream<S: ReadSeek>(stream: &mut S, entry_size: usize) -> Result<Self> {
        if entry_size < 16 {
            return err::Truncated {
                declared: 16,
                available: entry_size,
            }
            .fail();
        }

        let hash = stream.read_u32::<LittleEndian>()?;
        let security_id = stream.read_u32::<LittleEndian>()?;
        let stream_offset = stream.read_u32::<LittleEndian>()?;
        let entry_length = stream.read_u32::<LittleEndian>()?;

        let mut raw = vec![0_u8; entry_size - 16];
        stream.read_exact(&mut raw).context(err::IoError)?;

        let mut descriptor = Self::from_bytes(raw)?;
        descriptor.sds_header = Some(SdsEntryHeader {
            hash,
            security_id,
            stream_offset,
            entry_length,
        });
        Ok(descriptor)
    }

    /// A zeroed descriptor with no backing bytes, used when only an
    /// attribute's presence (not its content) needs reporting.
    pub fn empty() -> Self {
        SecurityDescriptorAttr {
            revision: 0,
            control: SecurityDescriptorControlFlags::empty(),
            owner_offset: 0,
            group_offset: 0,
            sacl_offset: 0,
            dacl_offset: 0,
            raw: Vec::new(),
            sds_header: None,
        }
    }

    fn from_bytes(raw: Vec<u8>) -> Result<Self> {
        let mut header = &raw[..];
        if header.len() < 20 {
            return err::Truncated {
                declared: 20,
                available: header.len(),
            }
            .fail();
        }

        let revision = header.read_u8()?;
        let _sbz1 = header.read_u8()?;
        let control = SecurityDescriptorControlFlags::from_bits_truncate(
            header.read_u16::<LittleEndian>()?,
        );
        let owner_offset = header.read_u32::<LittleEndian>()?;
        let group_offset = header.read_u32::<LittleEndian>()?;
        let sacl_offset = header.read_u32::<LittleEndian>()?;
        let dacl_offset = header.read_u32::<LittleEndian>()?;

        Ok(SecurityDescriptorAttr {
            revision,
            control,
            owner_offset,
            group_offset,
            sacl_offset,
            dacl_offset,
            raw,
            sds_header: None,
        })
    }
}

/// Locates one security descriptor inside the `$Secure:$SDS` data stream,
/// as indexed by `$Secure:$SII`.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct SdsEntryHeader {
    pub hash: u32,
    pub security_id: u32,
    pub stream_offset: u32,
    pub entry_length: u32,
}

impl Serialize for SecurityDescriptorAttr {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("SecurityDescriptorAttr", 8)?;
        state.serialize_field("revision", &self.revision)?;
        state.serialize_field("control", &self.control)?;
        state.serialize_field("owner_offset", &self.owner_offset)?;
        state.serialize_field("group_offset", &self.group_offset)?;
        state.serialize_field("sacl_offset", &self.sacl_offset)?;
        state.serialize_field("dacl_offset", &self.dacl_offset)?;
        state.serialize_field("raw", &utils::to_hex_string(&self.raw))?;
        state.serialize_field("sds_header", &self.sds_header)?;
        state.end()
    }
}
