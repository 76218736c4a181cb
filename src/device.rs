use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use snafu::ResultExt;

use crate::err::{self, Result};

/// A readable, seekable byte source with an efficient way to ask for its
/// current position. Every parser in this crate is generic over this trait
/// rather than over `File` or `&[u8]` directly, so the same code can run
/// against an open volume handle, a raw image file or an in-memory buffer
/// taken from a resident attribute or attribute list.
pub trait ReadSeek: Read + Seek {
    fn tell(&mut self) -> io::Result<u64> {
        self.seek(SeekFrom::Current(0))
    }
}

impl<T: Read + Seek + ?Sized> ReadSeek for T {}

/// Opens a buffered handle to a raw NTFS volume or extracted image file.
pub fn open_file(path: impl AsRef<Path>) -> Result<BufReader<File>> {
    let path = path.as_ref();
    let file = File::open(path).context(err::FailedToOpenFile {
        path: path.to_owned(),
    })?;
    Ok(BufReader::with_capacity(4096, file))
}
