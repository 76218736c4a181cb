use crate::err::{self, Result};
use crate::utils::read_utf16_string;
use crate::ReadSeek;

use serde::Serialize;

/// $VOLUME_NAME: the volume label, present only in the `$Volume` system file.
/// The entire resident payload is the UTF-16LE name with no terminator.
#[derive(Serialize, Clone, Debug)]
pub struct VolumeNameAttr {
    pub name: String,
}

impl VolumeNameAttr {
    pub fn from_stream<S: ReadSeek>(stream: &mut S, data_size: usize) -> Result<Self> {
        if data_size % 2 != 0 {
            return err::Truncated {
                declared: data_size,
                available: data_size - (data_size % 2),
            }
            .fail();
        }
        let name = read_utf16_string(stream, Some(data_size / 2))?;
        Ok(VolumeNameAttr { name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn decodes_full_payload_as_volume_label() {
        // "KW-SRCH-1" followed by a trailing U+0000 code unit, as the
        // payload is handed over in full with no length trimming.
        let payload: &[u8] = &[
            0x4b, 0x00, 0x57, 0x00, 0x2d, 0x00, 0x53, 0x00, 0x52, 0x00, 0x43, 0x00, 0x48, 0x00,
            0x2d, 0x00, 0x31, 0x00, 0x00, 0x00,
        ];
        let volume_name =
            VolumeNameAttr::from_stream(&mut Cursor::new(payload), payload.len()).unwrap();
        assert_eq!(volume_name.name.trim_end_matches('\0'), "KW-SRCH-1");
        assert_eq!(volume_name.name.len(), 10);
    }

    #[test]
    fn rejects_odd_byte_payload() {
        let payload: &[u8] = &[0x41, 0x00, 0x42];
        let result = VolumeNameAttr::from_stream(&mut Cursor::new(payload), payload.len());
        assert!(matches!(result, Err(err::Error::Truncated { .. })));
    }
}
