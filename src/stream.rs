//! Presents a non-resident attribute's mapped clusters as one flat byte
//! stream, independent of how many data runs or compression units back it.
use std::io::{Read, Seek, SeekFrom};

use crate::attribute::data_run::{DataRun, RunType};
use crate::err::{self, Result};
use crate::ReadSeek;

#[cfg(feature = "lznt1")]
use crate::lznt1;

/// Sector/cluster geometry of the volume a [`ClusterBlockStream`] reads
/// against. NTFS addresses everything in clusters; this crate needs their
/// byte size to translate a data run's starting LCN into a device byte
/// offset.
#[derive(Clone, Copy, Debug)]
pub struct ClusterGeometry {
    pub bytes_per_sector: u32,
    pub sectors_per_cluster: u32,
}

impl ClusterGeometry {
    pub fn cluster_size(&self) -> u64 {
        u64::from(self.bytes_per_sector) * u64::from(self.sectors_per_cluster)
    }
}

/// A randomly addressable view over a non-resident attribute's data runs.
/// Honors sparse runs (read as zero), the valid-data-size boundary (bytes at
/// or beyond it read as zero regardless of what the backing clusters hold),
/// and logical end-of-stream at `data_size`. When the attribute is
/// compressed, whole compression units are decompressed on demand; callers
/// that will re-read the same unit repeatedly should front this with
/// [`crate::cache::ClusterBlockCache`].
pub struct ClusterBlockStream<'a, D: ReadSeek> {
    device: &'a mut D,
    geometry: ClusterGeometry,
    runs: Vec<DataRun>,
    compression_unit_clusters: u64,
    data_size: u64,
    valid_data_size: u64,
}

impl<'a, D: ReadSeek> ClusterBlockStream<'a, D> {
    pub fn new(
        device: &'a mut D,
        geometry: ClusterGeometry,
        runs: Vec<DataRun>,
        compression_unit_size: u16,
        data_size: u64,
        valid_data_size: u64,
    ) -> Self {
        let compression_unit_clusters = if compression_unit_size == 0 {
            0
        } else {
            1u64 << compression_unit_size
        };
        ClusterBlockStream {
            device,
            geometry,
            runs,
            compression_unit_clusters,
            data_size,
            valid_data_size,
        }
    }

    pub fn len(&self) -> u64 {
        self.data_size
    }

    pub fn is_empty(&self) -> bool {
        self.data_size == 0
    }

    /// Reads up to `buf.len()` bytes starting at logical byte `offset`.
    /// Returns the number of bytes written, which is `0` once
    /// `offset >= len()` and otherwise always `buf.len().min(len() - offset)`.
    pub fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        if offset >= self.data_size || buf.is_empty() {
            return Ok(0);
        }

        let available = (self.data_size - offset) as usize;
        let want = buf.len().min(available);

        if self.compression_unit_clusters == 0 {
            self.read_uncompressed(offset, &mut buf[..want])?;
        } else {
            let cluster_size = self.geometry.cluster_size();
            self.read_compressed(offset, &mut buf[..want], cluster_size)?;
        }

        // Bytes at or beyond valid_data_size are logical zero even though
        // the clusters backing them may still hold stale data.
        if offset + want as u64 > self.valid_data_size {
            let zero_from = self.valid_data_size.saturating_sub(offset) as usize;
            for b in &mut buf[zero_from.min(want)..want] {
                *b = 0;
            }
        }

        Ok(want)
    }

    fn locate_run(&self, cluster_index: u64) -> Option<(DataRun, u64)> {
        let mut vcn = 0u64;
        for run in &self.runs {
            if cluster_index < vcn + run.lcn_length {
                return Some((*run, cluster_index - vcn));
            }
            vcn += run.lcn_length;
        }
        None
    }

    fn read_uncompressed(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let cluster_size = self.geometry.cluster_size();
        let mut written = 0usize;
        while written < buf.len() {
            let abs_offset = offset + written as u64;
            let cluster_index = abs_offset / cluster_size;
            let within_cluster = (abs_offset % cluster_size) as usize;
            let chunk_len = (cluster_size as usize - within_cluster).min(buf.len() - written);

            match self.locate_run(cluster_index) {
                Some((run, run_cluster_offset)) if run.run_type == RunType::Standard => {
                    let disk_offset =
                        (run.lcn_offset + run_cluster_offset) * cluster_size + within_cluster as u64;
                    self.device.seek(SeekFrom::Start(disk_offset))?;
                    self.device
                        .read_exact(&mut buf[written..written + chunk_len])?;
                }
                _ => {
                    for b in &mut buf[written..written + chunk_len] {
                        *b = 0;
                    }
                }
            }

            written += chunk_len;
        }
        Ok(())
    }

    fn read_compressed(&mut self, offset: u64, buf: &mut [u8], cluster_size: u64) -> Result<()> {
        let unit_size = self.compression_unit_clusters * cluster_size;
        let mut written = 0usize;
        while written < buf.len() {
            let abs_offset = offset + written as u64;
            let unit_index = abs_offset / unit_size;
            let within_unit = (abs_offset % unit_size) as usize;
            let chunk_len = (unit_size as usize - within_unit).min(buf.len() - written);

            let unit = self.decode_unit(unit_index)?;
            buf[written..written + chunk_len]
                .copy_from_slice(&unit[within_unit..within_unit + chunk_len]);

            written += chunk_len;
        }
        Ok(())
    }

    /// Decodes one whole compression unit into a freshly allocated buffer. A
    /// unit whose last run is sparse holds an LZNT1-compressed tail packed
    /// across its preceding runs; any other unit is stored literally,
    /// cluster for cluster.
    fn decode_unit(&mut self, unit_index: u64) -> Result<Vec<u8>> {
        let cluster_size = self.geometry.cluster_size();
        let unit_clusters = self.compression_unit_clusters;
        let first_cluster = unit_index * unit_clusters;

        let mut unit_runs: Vec<(DataRun, u64, u64)> = Vec::new();
        let mut remaining = unit_clusters;
        let mut cluster_cursor = first_cluster;
        while remaining > 0 {
            match self.locate_run(cluster_cursor) {
                Some((run, run_cluster_offset)) => {
                    let available_in_run = run.lcn_length - run_cluster_offset;
                    let take = available_in_run.min(remaining);
                    unit_runs.push((run, run_cluster_offset, take));
                    remaining -= take;
                    cluster_cursor += take;
                }
                None => break,
            }
        }

        let is_compressed_unit = unit_runs
            .last()
            .map(|(run, _, _)| run.run_type == RunType::Sparse)
            .unwrap_or(false);

        let mut output = vec![0_u8; (unit_clusters * cluster_size) as usize];

        if !is_compressed_unit {
            let mut out_pos = 0usize;
            for (run, run_cluster_offset, take) in &unit_runs {
                let len = (*take * cluster_size) as usize;
                if run.run_type == RunType::Standard {
                    let disk_offset = (run.lcn_offset + run_cluster_offset) * cluster_size;
                    self.device.seek(SeekFrom::Start(disk_offset))?;
                    self.device
                        .read_exact(&mut output[out_pos..out_pos + len])?;
                }
                out_pos += len;
            }
            return Ok(output);
        }

        #[cfg(not(feature = "lznt1"))]
        {
            return err::UnsupportedCompression.fail();
        }

        #[cfg(feature = "lznt1")]
        {
            let mut compressed = Vec::new();
            for (run, run_cluster_offset, take) in &unit_runs {
                if run.run_type != RunType::Standard {
                    continue;
                }
                let len = (*take * cluster_size) as usize;
                let disk_offset = (run.lcn_offset + run_cluster_offset) * cluster_size;
                self.device.seek(SeekFrom::Start(disk_offset))?;
                let mut block = vec![0_u8; len];
                self.device.read_exact(&mut block)?;
                compressed.extend_from_slice(&block);
            }
            lznt1::decompress_unit(&compressed, &mut output)?;
            Ok(output)
        }
    }
}
