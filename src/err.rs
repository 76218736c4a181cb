use snafu::Snafu;
use std::path::PathBuf;
use std::{io, result};

pub type Result<T> = result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("An I/O error has occurred: {}", source))]
    IoError { source: std::io::Error },
    #[snafu(display("Failed to open file {}: {}", path.display(), source))]
    FailedToOpenFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Error while decoding name in filename attribute"))]
    InvalidFilename,
    #[snafu(display("Unknown attribute type: {:#x}", attribute_type))]
    UnknownAttributeType { attribute_type: u32 },
    #[snafu(display("Unhandled resident flag: {} (offset: {})", flag, offset))]
    UnhandledResidentFlag { flag: u8, offset: u64 },
    #[snafu(display("Failed to decode data runs: {:?}", bad_data_runs))]
    FailedToDecodeDataRuns { bad_data_runs: Vec<u8> },
    #[snafu(display("Failed to read a windows timestamp: {}", source))]
    FailedToReadWindowsTime { source: io::Error },
    #[snafu(display("Failed to read an MFT reference: {}", source))]
    FailedToReadMftReference { source: io::Error },
    #[snafu(display("Failed to read a GUID: {}", source))]
    FailedToReadGuid { source: io::Error },

    // --- structural and policy errors specific to this crate ---
    #[snafu(display("Invalid argument: {}", detail))]
    InvalidArgument { detail: String },
    #[snafu(display("Output slot was already initialized"))]
    AlreadyInitialized,
    #[snafu(display("Declared length ({}) exceeds available bytes ({})", declared, available))]
    Truncated { declared: usize, available: usize },
    #[snafu(display("Attribute record size ({}) is not a multiple of 8", size))]
    MisalignedSize { size: u32 },
    #[snafu(display("Invalid data-run header byte {:#04x}", header_byte))]
    InvalidRunHeader { header_byte: u8 },
    #[snafu(display("Name (offset {}, length {}) falls outside the record ({} bytes)", name_offset, name_length, record_size))]
    NameOutOfBounds {
        name_offset: u16,
        name_length: u8,
        record_size: u32,
    },
    #[snafu(display("Run list (offset {}) falls outside the record ({} bytes)", runs_offset, record_size))]
    RunListOutOfBounds { runs_offset: u16, record_size: u32 },
    #[snafu(display(
        "Decoded {} data runs but the VCN range implies {}",
        decoded,
        expected
    ))]
    UnexpectedRunCount { decoded: u64, expected: u64 },
    #[snafu(display("Compressed non-resident data encountered without LZNT1 support"))]
    UnsupportedCompression,
    #[snafu(display("Attribute type {:?} arrived non-resident but is only valid resident", attribute_type))]
    UnsupportedNonResident { attribute_type: crate::attribute::MftAttributeType },
    #[snafu(display("Unsupported payload version/revision: {}", revision))]
    UnsupportedVersion { revision: u32 },
    #[snafu(display("Internal invariant violation: {}", detail))]
    Internal { detail: String },
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::IoError { source: err }
    }
}
