use crate::attribute::data_run::{decode_data_runs, DataRun};
use crate::attribute::header::{MftAttributeHeader, NonResidentHeader};
use crate::err::{self, Result};

use serde::Serialize;
use snafu::ensure;
use std::io::{Read, Seek, SeekFrom};

#[derive(Serialize, Clone, Debug)]
pub struct NonResidentAttr {
    pub data_runs: Vec<DataRun>,
}

impl NonResidentAttr {
    pub fn from_stream<S: Read + Seek>(
        stream: &mut S,
        header: &MftAttributeHeader,
        resident: &NonResidentHeader,
    ) -> Result<Self> {
        ensure!(
            u32::from(resident.runs_offset) <= header.record_length,
            err::RunListOutOfBounds {
                runs_offset: resident.runs_offset,
                record_size: header.record_length,
            }
        );

        let data_run_bytes_count =
            (header.record_length - u32::from(resident.runs_offset)) as usize;

        if data_run_bytes_count == 0 {
            return Ok(Self {
                data_runs: Vec::new(),
            });
        }

        let mut data_run_bytes = vec![0_u8; data_run_bytes_count];

        stream.seek(SeekFrom::Start(
            header.start_offset + u64::from(resident.runs_offset),
        ))?;
        stream.read_exact(&mut data_run_bytes)?;

        let data_runs =
            decode_data_runs(&data_run_bytes).map_err(|_| err::Error::FailedToDecodeDataRuns {
                bad_data_runs: data_run_bytes,
            })?;

        let expected_run_count = resident.data_last_vcn - resident.data_first_vcn + 1;
        ensure!(
            data_runs.len() as u64 == expected_run_count,
            err::UnexpectedRunCount {
                decoded: data_runs.len() as u64,
                expected: expected_run_count,
            }
        );

        Ok(Self { data_runs })
    }
}
