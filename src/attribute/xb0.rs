use crate::err::{self, Result};
use crate::{utils, ReadSeek};

use serde::ser;
use snafu::ResultExt;

/// $BITMAP: a packed bit vector, one bit per allocation unit (MFT record or
/// cluster, depending on which file owns the attribute). Bit `i` lives in
/// byte `i >> 3`, masked by `1 << (i & 7)`.
#[derive(Clone, Debug)]
pub struct BitmapAttr(Vec<u8>);

impl BitmapAttr {
    pub fn from_stream<S: ReadSeek>(stream: &mut S, data_size: usize) -> Result<Self> {
        let mut data = vec![0_u8; data_size];
        stream.read_exact(&mut data).context(err::IoError)?;
        Ok(BitmapAttr(data))
    }

    /// Starts an empty bitmap to be built up by [`BitmapAttr::append`].
    pub fn empty() -> Self {
        BitmapAttr(Vec::new())
    }

    /// Appends one more decoded cluster block's worth of bytes onto the
    /// bitmap. Blocks must be fed in ascending cluster order.
    pub fn append(&mut self, block: &[u8]) {
        self.0.extend_from_slice(block);
    }

    pub fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }

    pub fn bit_count(&self) -> usize {
        self.0.len() * 8
    }

    pub fn is_set(&self, index: usize) -> bool {
        match self.0.get(index >> 3) {
            Some(byte) => byte & (1 << (index & 7)) != 0,
            None => false,
        }
    }

    /// Number of set bits across the whole bitmap.
    pub fn count_set(&self) -> u64 {
        self.0.iter().map(|b| b.count_ones() as u64).sum()
    }

    /// Index of the lowest clear bit, if any exists within the bitmap's
    /// declared length.
    pub fn find_first_clear(&self) -> Option<usize> {
        for (byte_index, byte) in self.0.iter().enumerate() {
            if *byte != 0xFF {
                let bit = byte.trailing_ones() as usize;
                return Some(byte_index * 8 + bit);
            }
        }
        None
    }

    pub fn data(&self) -> &[u8] {
        &self.0
    }
}

impl ser::Serialize for BitmapAttr {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        serializer.serialize_str(&utils::to_hex_string(&self.0))
    }
}
