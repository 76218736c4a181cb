use crate::err::{self, Result};
use crate::{utils, ReadSeek};

use byteorder::{LittleEndian, ReadBytesExt};
use serde::Serialize;
use snafu::ResultExt;

const TXF_DATA_NAME: &str = "$TXF_DATA";
const TXF_FIXED_SIZE: usize = 44;

/// $LOGGED_UTILITY_STREAM. Most producers (e.g. EFS, under the name `$EFS`)
/// store opaque, producer-specific bytes here. The one schema this crate
/// understands is TxF's `$TXF_DATA` stream, picked out purely by an exact,
/// case-sensitive UTF-16LE name match — any other name is left opaque.
#[derive(Serialize, Clone, Debug)]
#[serde(untagged)]
pub enum LoggedUtilityStreamAttr {
    TxfData(TxfData),
    Opaque(#[serde(serialize_with = "hex")] Vec<u8>),
}

#[derive(Serialize, Clone, Debug)]
pub struct TxfData {
    pub version: u16,
    pub flags: u16,
    pub rm_root_file_reference: u64,
    pub usn_index_lsn: u64,
    pub user_data_lsn: u64,
    pub directory_index_lsn: u64,
    pub usn: u64,
    #[serde(serialize_with = "hex")]
    pub additional: Vec<u8>,
}

impl LoggedUtilityStreamAttr {
    /// `attribute_name` is the attribute record's own name (decoded from the
    /// header), compared byte-for-byte in UTF-16LE against `$TXF_DATA`.
    pub fn from_stream<S: ReadSeek>(
        stream: &mut S,
        data_size: usize,
        attribute_name: &str,
    ) -> Result<Self> {
        if attribute_name == TXF_DATA_NAME && data_size >= TXF_FIXED_SIZE {
            let version = stream.read_u16::<LittleEndian>()?;
            let flags = stream.read_u16::<LittleEndian>()?;
            let rm_root_file_reference = stream.read_u64::<LittleEndian>()?;
            let usn_index_lsn = stream.read_u64::<LittleEndian>()?;
            let user_data_lsn = stream.read_u64::<LittleEndian>()?;
            let directory_index_lsn = stream.read_u64::<LittleEndian>()?;
            let usn = stream.read_u64::<LittleEndian>()?;

            let mut additional = vec![0_u8; data_size - TXF_FIXED_SIZE];
            stream.read_exact(&mut additional).context(err::IoError)?;

            Ok(LoggedUtilityStreamAttr::TxfData(TxfData {
                version,
                flags,
                rm_root_file_reference,
                usn_index_lsn,
                user_data_lsn,
                directory_index_lsn,
                usn,
                additional,
            }))
        } else {
            let mut data = vec![0_u8; data_size];
            stream.read_exact(&mut data).context(err::IoError)?;
            Ok(LoggedUtilityStreamAttr::Opaque(data))
        }
    }
}

fn hex<S>(bytes: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&utils::to_hex_string(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn names_other_than_txf_data_stay_opaque() {
        let mut stream = Cursor::new(vec![0xAAu8; 16]);
        let parsed = LoggedUtilityStreamAttr::from_stream(&mut stream, 16, "$EFS").unwrap();
        assert!(matches!(parsed, LoggedUtilityStreamAttr::Opaque(_)));
    }

    #[test]
    fn exact_txf_data_name_is_decoded() {
        let mut buf = vec![0u8; TXF_FIXED_SIZE];
        buf[0] = 0x01; // version = 1
        let mut stream = Cursor::new(buf);
        let parsed =
            LoggedUtilityStreamAttr::from_stream(&mut stream, TXF_FIXED_SIZE, "$TXF_DATA")
                .unwrap();
        match parsed {
            LoggedUtilityStreamAttr::TxfData(txf) => assert_eq!(txf.version, 1),
            _ => panic!("expected TxfData"),
        }
    }

    #[test]
    fn case_sensitive_name_mismatch_stays_opaque() {
        let mut stream = Cursor::new(vec![0u8; TXF_FIXED_SIZE]);
        let parsed =
            LoggedUtilityStreamAttr::from_stream(&mut stream, TXF_FIXED_SIZE, "$txf_data")
                .unwrap();
        assert!(matches!(parsed, LoggedUtilityStreamAttr::Opaque(_)));
    }
}
