//! Huffman codec with a self-contained tree.
//!
//! Two frame formats, distinguished by the leading tag byte: `0x01` for
//! single-symbol input (symbol plus repeat count) and `0x02` for the
//! general case (serialised tree, original length, bit-packed codewords).

pub mod tree;

use std::time::Instant;

use log::info;

use crate::analysis;
use crate::bits::{BitReader, BitWriter};
use crate::checksum;
use crate::error::{Error, Result};
use crate::{Codec, CodecInfo, CodecOutput, CompressionConfig, CompressionStats};

use tree::{Tree, NIL};

const TAG_SINGLE: u8 = 0x01;
const TAG_TREE: u8 = 0x02;

/// Tag, symbol, big-endian u32 count.
const SINGLE_FRAME_LEN: usize = 6;

pub struct HuffmanCodec;

impl HuffmanCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HuffmanCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for HuffmanCodec {
    fn info(&self) -> CodecInfo {
        CodecInfo {
            name: "huffman",
            description: "Canonical Huffman coding with a serialised tree per frame",
            supports_parallel: false,
            min_block_size: 4096,
        }
    }

    fn encode(&self, input: &[u8], config: &CompressionConfig) -> Result<CodecOutput> {
        if input.is_empty() {
            return Err(Error::EmptyInput);
        }

        let mut stats = CompressionStats { original_size: input.len(), threads_used: 1, ..Default::default() };
        if config.verify_integrity {
            stats.checksum = checksum::hash(input);
        }

        let start = Instant::now();

        let mut freq = [0u64; 256];
        for &b in input {
            freq[b as usize] += 1;
        }
        let distinct = freq.iter().filter(|&&f| f > 0).count();

        let data = if distinct == 1 {
            encode_single(input)
        } else {
            encode_tree(input, &freq)
        };

        stats.encode_time = start.elapsed();
        stats.compressed_size = data.len();
        stats.compression_ratio = CompressionStats::ratio(data.len(), input.len());

        if config.verbose {
            info!(
                "huffman encode: {} -> {} bytes ({:.1}%, {} distinct symbols)",
                input.len(),
                data.len(),
                stats.compression_ratio * 100.0,
                distinct,
            );
        }

        Ok(CodecOutput { data, stats })
    }

    fn decode(&self, input: &[u8], config: &CompressionConfig) -> Result<CodecOutput> {
        if input.is_empty() {
            return Err(Error::EmptyInput);
        }

        let start = Instant::now();
        let data = match input[0] {
            TAG_SINGLE => decode_single(input)?,
            TAG_TREE => decode_tree(input)?,
            tag => {
                return Err(Error::CorruptFrame(format!("unknown Huffman frame tag 0x{tag:02x}")))
            }
        };

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

    /// Shannon entropy plus the ~9 bits each distinct symbol costs in the
    /// serialised tree.
    fn estimate_ratio(&self, input: &[u8]) -> f64 {
        if input.is_empty() {
            return 1.0;
        }
        let entropy = analysis::entropy(input);
        let distinct = analysis::distinct_bytes(input) as f64;
        let overhead = distinct * 9.0 / (8.0 * input.len() as f64);
        (entropy + overhead).clamp(0.0, 1.0)
    }
}

fn encode_single(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(SINGLE_FRAME_LEN);
    out.push(TAG_SINGLE);
    out.push(input[0]);
    out.extend_from_slice(&(input.len() as u32).to_be_bytes());
    out
}

fn decode_single(input: &[u8]) -> Result<Vec<u8>> {
    if input.len() != SINGLE_FRAME_LEN {
        return Err(Error::CorruptFrame("single-symbol frame has wrong length".to_string()));
    }
    let symbol = input[1];
    let count = u32::from_be_bytes([input[2], input[3], input[4], input[5]]) as usize;
    Ok(vec![symbol; count])
}

fn encode_tree(input: &[u8], freq: &[u64; 256]) -> Vec<u8> {
    let tree = Tree::from_frequencies(freq);
    let codes = tree.code_table();
    let tree_data = tree.serialize();

    let mut out = Vec::with_capacity(input.len() / 2 + tree_data.len() + 16);
    out.push(TAG_TREE);
    out.extend_from_slice(&(tree_data.len() as u16).to_be_bytes());
    out.extend_from_slice(&tree_data);
    out.extend_from_slice(&(input.len() as u32).to_be_bytes());

    let mut writer = BitWriter::new(&mut out);
    for &b in input {
        let code = codes[b as usize];
        write_codeword(&mut writer, code.bits, code.length);
    }
    writer.flush();
    drop(writer);

    out
}

/// Write a codeword MSB-first, chunked to the writer's 24-bit call limit.
fn write_codeword(writer: &mut BitWriter<'_>, bits: u64, length: u8) {
    let mut remaining = length;
    while remaining > 16 {
        remaining -= 16;
        writer.write_bits(((bits >> remaining) & 0xFFFF) as u32, 16);
    }
    writer.write_bits((bits & ((1u64 << remaining) - 1)) as u32, remaining);
}

fn decode_tree(input: &[u8]) -> Result<Vec<u8>> {
    if input.len() < 3 {
        return Err(Error::TruncatedStream("Huffman frame header"));
    }
    let tree_size = u16::from_be_bytes([input[1], input[2]]) as usize;

    let tree_end = 3 + tree_size;
    if tree_end + 4 > input.len() {
        return Err(Error::CorruptTree("tree size exceeds frame"));
    }
    let tree = Tree::deserialize(&input[3..tree_end])?;

    let original_size = u32::from_be_bytes([
        input[tree_end],
        input[tree_end + 1],
        input[tree_end + 2],
        input[tree_end + 3],
    ]) as usize;

    let mut reader = BitReader::new(&input[tree_end + 4..]);
    let mut output = Vec::with_capacity(original_size);
    let root = tree.root();

    for _ in 0..original_size {
        let mut node = root;
        while !tree.is_leaf(node) {
            let (left, right) = tree.children(node);
            let next = if reader.read_bit()? { right } else { left };
            if next == NIL {
                return Err(Error::CorruptTree("descended into missing child"));
            }
            node = next;
        }
        output.push(tree.symbol(node));
    }

    Ok(output)
}
