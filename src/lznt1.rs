//! LZNT1 decompression, gated behind the `lznt1` feature. NTFS packs a
//! compression unit's compressed tail into one or more 4096-byte chunks,
//! each prefixed by a 16-bit header: bits 0-11 hold `compressed_size - 3`,
//! bits 12-14 are a fixed signature (3), and bit 15 marks whether the chunk
//! is actually compressed (an incompressible chunk is stored verbatim).
use crate::err::{self, Result};

const CHUNK_SIZE: usize = 4096;

struct ChunkHeader(u16);

impl ChunkHeader {
    fn compressed_size(&self) -> usize {
        (self.0 as usize & 0x0FFF) + 3
    }

    fn is_compressed(&self) -> bool {
        self.0 & 0x8000 != 0
    }

    fn is_end(&self) -> bool {
        self.0 == 0
    }
}

fn format_for_position(position: usize) -> usize {
    const MAX_DISPLACEMENT: [usize; 9] = [16, 32, 64, 128, 256, 512, 1024, 2048, 4096];
    MAX_DISPLACEMENT
        .iter()
        .position(|&max| position < max)
        .unwrap_or(8)
}

fn copy_length(format: usize, token: u16) -> usize {
    let length_bits = 12 - format;
    let mask = (1u16 << length_bits) - 1;
    ((token & mask) + 3) as usize
}

fn copy_displacement(format: usize, token: u16) -> usize {
    let length_bits = 12 - format;
    ((token >> length_bits) + 1) as usize
}

fn decompress_chunk(uncompressed: &mut [u8], compressed: &[u8]) -> Result<usize> {
    if compressed.is_empty() {
        return Ok(0);
    }

    let mut output_pos = 0;
    let mut input_pos = 1;
    let mut flag_byte = compressed[0];
    let mut flag_bit = 0;

    while output_pos < uncompressed.len() && input_pos < compressed.len() {
        let format = format_for_position(output_pos);

        if flag_byte & (1 << flag_bit) == 0 {
            uncompressed[output_pos] = compressed[input_pos];
            output_pos += 1;
            input_pos += 1;
        } else {
            if input_pos + 1 >= compressed.len() {
                return err::Internal {
                    detail: "truncated LZNT1 copy token".to_string(),
                }
                .fail();
            }
            let token = u16::from_le_bytes([compressed[input_pos], compressed[input_pos + 1]]);
            input_pos += 2;

            let displacement = copy_displacement(format, token);
            let length = copy_length(format, token);

            if displacement > output_pos {
                return err::Internal {
                    detail: "LZNT1 copy token displacement exceeds output so far".to_string(),
                }
                .fail();
            }

            let copy_len = length.min(uncompressed.len() - output_pos);
            for _ in 0..copy_len {
                uncompressed[output_pos] = uncompressed[output_pos - displacement];
                output_pos += 1;
            }
        }

        flag_bit = (flag_bit + 1) % 8;
        if flag_bit == 0 && input_pos < compressed.len() {
            flag_byte = compressed[input_pos];
            input_pos += 1;
        }
    }

    Ok(output_pos)
}

/// Decompresses a whole compression unit (one or more chained 4096-byte
/// chunks) into `output`, which must be exactly `compression_unit_clusters *
/// cluster_size` bytes. An uncompressed chunk (header says `is_compressed ==
/// false`) is copied verbatim; a zero header ends the unit early and the
/// remainder of `output` stays zero-filled.
pub fn decompress_unit(compressed: &[u8], output: &mut [u8]) -> Result<()> {
    let mut in_pos = 0;
    let mut out_pos = 0;

    while out_pos < output.len() && in_pos + 2 <= compressed.len() {
        let header = ChunkHeader(u16::from_le_bytes([compressed[in_pos], compressed[in_pos + 1]]));
        if header.is_end() {
            break;
        }
        in_pos += 2;

        let chunk_len = header.compressed_size() - 2;
        let chunk_end = (in_pos + chunk_len).min(compressed.len());
        let chunk_data = &compressed[in_pos..chunk_end];
        in_pos = chunk_end;

        let out_end = (out_pos + CHUNK_SIZE).min(output.len());
        let out_chunk = &mut output[out_pos..out_end];

        if header.is_compressed() {
            decompress_chunk(out_chunk, chunk_data)?;
        } else {
            let n = chunk_data.len().min(out_chunk.len());
            out_chunk[..n].copy_from_slice(&chunk_data[..n]);
        }

        out_pos = out_end;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbatim_chunk_round_trips() {
        let mut compressed = vec![0u8; 2];
        let payload = b"hello world, this chunk is stored uncompressed";
        // The size field counts the whole chunk, header included.
        let header = ChunkHeader::compressed_size_for_test(payload.len() + 2);
        compressed[0..2].copy_from_slice(&header.to_le_bytes());
        compressed.extend_from_slice(payload);

        let mut output = vec![0u8; payload.len()];
        decompress_unit(&compressed, &mut output).unwrap();
        assert_eq!(&output[..], &payload[..]);
    }

    impl ChunkHeader {
        fn compressed_size_for_test(size: usize) -> u16 {
            ((size - 3) as u16 & 0x0FFF) | (3 << 12)
        }
    }
}
