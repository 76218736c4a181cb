use encoding::all::UTF_16LE;
use encoding::{DecoderTrap, Encoding};
use std::io::Read;

use crate::err::{self, Result};

pub fn to_hex_string(bytes: &[u8]) -> String {
    let strs: Vec<String> = bytes.iter().map(|b| format!("{:02X}", b)).collect();
    strs.join("")
}

pub fn print_buffer_as_hex(buffer: &[u8]) {
    println!("{}", to_hex_string(buffer));
}

/// Reads `utf16_code_units` UTF-16LE code units (`utf16_code_units * 2` bytes)
/// from `stream` and transcodes them to a `String`, replacing unpaired
/// surrogates instead of failing the whole read.
pub fn read_utf16_string(
    stream: &mut impl Read,
    utf16_code_units: Option<usize>,
) -> Result<String> {
    let len = utf16_code_units.unwrap_or(0);
    let mut buffer = vec![0u8; len * 2];
    stream.read_exact(&mut buffer)?;

    UTF_16LE
        .decode(&buffer, DecoderTrap::Ignore)
        .map_err(|_| err::Error::InvalidFilename)
}
