//! Adaptive hybrid codec.
//!
//! Input is byte-differenced, split into blocks sized from the total
//! input, and each block is routed to RLE, LZ77 or Huffman by its
//! statistical profile. Each block header records the primitive actually
//! used, so the decoder never re-runs the classifier.

pub mod classify;
mod parallel;

use std::ops::Range;
use std::time::Instant;

use log::info;

use crate::checksum;
use crate::error::{Error, Result};
use crate::huffman::HuffmanCodec;
use crate::lz77::Lz77Codec;
use crate::rle::RleCodec;
use crate::{Codec, CodecInfo, CodecOutput, CompressionConfig, CompressionStats};

use classify::{BlockType, Primitive};

const MAGIC: &[u8; 4] = b"HYBR";

/// Tag byte, decoded size, encoded size.
const BLOCK_HEADER_LEN: usize = 9;

pub struct HybridCodec;

impl HybridCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HybridCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for HybridCodec {
    fn info(&self) -> CodecInfo {
        CodecInfo {
            name: "hybrid",
            description: "Adaptive block compression routing RLE, LZ77 and Huffman by data profile",
            supports_parallel: true,
            min_block_size: 8192,
        }
    }

    fn encode(&self, input: &[u8], config: &CompressionConfig) -> Result<CodecOutput> {
        if input.is_empty() {
            return Err(Error::EmptyInput);
        }

        let mut stats = CompressionStats { original_size: input.len(), ..Default::default() };
        if config.verify_integrity {
            stats.checksum = checksum::hash(input);
        }

        let start = Instant::now();

        let preprocessed = delta_encode(input);
        let block_size = if config.block_size > 0 {
            config.block_size
        } else {
            classify::block_size_for(input.len())
        };
        let ranges = partition(preprocessed.len(), block_size);

        let threads = effective_threads(config.num_threads);
        let use_workers = threads > 1 && ranges.len() > 1;
        let blocks = if use_workers {
            parallel::encode_blocks(&preprocessed, &ranges, threads, config)?
        } else {
            let mut blocks = Vec::with_capacity(ranges.len());
            for range in &ranges {
                let (primitive, payload) = compress_block(&preprocessed[range.clone()], config)?;
                blocks.push((primitive, range.len(), payload));
            }
            blocks
        };
        stats.threads_used = if use_workers { threads } else { 1 };

        let mut data = Vec::with_capacity(input.len() / 2 + 16);
        data.extend_from_slice(MAGIC);
        data.extend_from_slice(&(blocks.len() as u32).to_be_bytes());

        let mut used = [0usize; 3];
        for (primitive, decoded_len, payload) in &blocks {
            data.push(primitive.tag());
            data.extend_from_slice(&(*decoded_len as u32).to_be_bytes());
            data.extend_from_slice(&(payload.len() as u32).to_be_bytes());
            data.extend_from_slice(payload);
            used[primitive.tag() as usize] += 1;
        }

        stats.encode_time = start.elapsed();
        stats.compressed_size = data.len();
        stats.compression_ratio = CompressionStats::ratio(data.len(), input.len());

        if config.verbose {
            info!(
                "hybrid encode: {} -> {} bytes ({:.1}%, {} blocks: {} rle, {} lz77, {} huffman)",
                input.len(),
                data.len(),
                stats.compression_ratio * 100.0,
                blocks.len(),
                used[0],
                used[1],
                used[2],
            );
        }

        Ok(CodecOutput { data, stats })
    }

    fn decode(&self, input: &[u8], config: &CompressionConfig) -> Result<CodecOutput> {
        if input.is_empty() {
            return Err(Error::EmptyInput);
        }

        let start = Instant::now();

        if input.len() < 4 || &input[0..4] != MAGIC {
            return Err(Error::CorruptFrame("bad hybrid magic".to_string()));
        }
        if input.len() < 8 {
            return Err(Error::TruncatedStream("hybrid block count"));
        }
        let block_count = u32::from_be_bytes([input[4], input[5], input[6], input[7]]) as usize;

        let block_config = block_config();
        let mut preprocessed = Vec::new();
        let mut offset = 8;

        for _ in 0..block_count {
            if offset + BLOCK_HEADER_LEN > input.len() {
                return Err(Error::TruncatedStream("hybrid block header"));
            }
            let tag = input[offset];
            let decoded_size = u32::from_be_bytes([
                input[offset + 1],
                input[offset + 2],
                input[offset + 3],
                input[offset + 4],
            ]) as usize;
            let encoded_size = u32::from_be_bytes([
                input[offset + 5],
                input[offset + 6],
                input[offset + 7],
                input[offset + 8],
            ]) as usize;
            offset += BLOCK_HEADER_LEN;

            if offset + encoded_size > input.len() {
                return Err(Error::TruncatedStream("hybrid block payload"));
            }
            let payload = &input[offset..offset + encoded_size];
            offset += encoded_size;

            let block = match tag {
                0 => RleCodec::new().decode(payload, &block_config)?,
                1 => Lz77Codec::new().decode(payload, &block_config)?,
                // Tag 3 is the legacy mixed marker; its payload is Huffman.
                2 | 3 => HuffmanCodec::new().decode(payload, &block_config)?,
                tag => {
                    return Err(Error::CorruptFrame(format!(
                        "unknown hybrid block tag 0x{tag:02x}"
                    )))
                }
            };

            if block.data.len() != decoded_size {
                return Err(Error::CorruptFrame(format!(
                    "block decoded to {} bytes, header declared {}",
                    block.data.len(),
                    decoded_size
                )));
            }
            preprocessed.extend_from_slice(&block.data);
        }

        if offset != input.len() {
            return Err(Error::CorruptFrame("trailing bytes after declared blocks".to_string()));
        }

        let data = delta_decode(&preprocessed);

        let mut stats = CompressionStats {
            original_size: data.len(),
            compressed_size: input.len(),
            compression_ratio: CompressionStats::ratio(input.len(), data.len()),
            decode_time: start.elapsed(),
            threads_used: 1,
            ..Default::default()
        };
        if config.verify_integrity {
            stats.checksum = checksum::hash(&data);
        }

        Ok(CodecOutput { data, stats })
    }

    fn estimate_ratio(&self, input: &[u8]) -> f64 {
        if input.is_empty() {
            return 1.0;
        }
        let entropy = crate::analysis::entropy(input);
        if entropy < classify::LOW_ENTROPY_THRESHOLD {
            return 0.2;
        }
        if crate::analysis::repetition_score(input) > classify::HIGH_REPETITION_THRESHOLD {
            return 0.4;
        }
        0.6
    }

    fn optimal_block_size(&self, input_size: usize) -> usize {
        classify::block_size_for(input_size)
    }
}

fn effective_threads(requested: usize) -> usize {
    match requested {
        0 => num_cpus::get().clamp(1, 32),
        n => n.clamp(1, 32),
    }
}

/// Config for per-block primitive calls: the hybrid layer owns integrity
/// checking and logging.
fn block_config() -> CompressionConfig {
    CompressionConfig {
        block_size: 0,
        num_threads: 1,
        verify_integrity: false,
        verbose: false,
    }
}

fn partition(len: usize, block_size: usize) -> Vec<Range<usize>> {
    let block_size = block_size.max(1);
    let mut ranges = Vec::with_capacity(len / block_size + 1);
    let mut start = 0;
    while start < len {
        let end = (start + block_size).min(len);
        ranges.push(start..end);
        start = end;
    }
    ranges
}

/// Compress one block with the primitive its profile suggests; MIXED
/// blocks race all three and keep the smallest output.
fn compress_block(block: &[u8], _config: &CompressionConfig) -> Result<(Primitive, Vec<u8>)> {
    let config = block_config();

    match classify::classify(block) {
        BlockType::LowEntropy => {
            let out = RleCodec::new().encode(block, &config)?;
            Ok((Primitive::Rle, out.data))
        }
        BlockType::HighRepetition => {
            let out = Lz77Codec::new().encode(block, &config)?;
            Ok((Primitive::Lz77, out.data))
        }
        BlockType::Random => {
            let out = HuffmanCodec::new().encode(block, &config)?;
            Ok((Primitive::Huffman, out.data))
        }
        BlockType::Mixed => {
            let rle = RleCodec::new().encode(block, &config)?;
            let lz77 = Lz77Codec::new().encode(block, &config)?;
            let huffman = HuffmanCodec::new().encode(block, &config)?;

            let mut best = (Primitive::Rle, rle.data);
            if lz77.data.len() < best.1.len() {
                best = (Primitive::Lz77, lz77.data);
            }
            if huffman.data.len() < best.1.len() {
                best = (Primitive::Huffman, huffman.data);
            }
            Ok(best)
        }
    }
}

/// Byte differencing: each output byte is the delta from its predecessor.
fn delta_encode(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut previous = 0u8;
    for &byte in input {
        out.push(byte.wrapping_sub(previous));
        previous = byte;
    }
    out
}

/// Running sum, the inverse of [`delta_encode`].
fn delta_decode(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut previous = 0u8;
    for &delta in input {
        previous = previous.wrapping_add(delta);
        out.push(previous);
    }
    out
}
