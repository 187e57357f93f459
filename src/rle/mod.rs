//! Run-length codec with two wire variants.
//!
//! The encoder measures input entropy and picks the variant: below 0.5 it
//! uses the enhanced form (magic `0xE1`, control bytes with a run/literal
//! flag bit), otherwise the plain form (escape byte `0xFF`). The decoder
//! identifies the variant from the first byte.

use std::time::Instant;

use log::info;

use crate::analysis;
use crate::checksum;
use crate::error::{Error, Result};
use crate::{Codec, CodecInfo, CodecOutput, CompressionConfig, CompressionStats};

/// Escape byte of the plain variant.
const ESCAPE: u8 = 0xFF;
/// Magic byte of the enhanced variant.
const ENHANCED_MAGIC: u8 = 0xE1;
/// Entropy below which the enhanced variant wins.
const ENHANCED_THRESHOLD: f64 = 0.5;
/// Plain run tokens encode at most this many repeats.
const PLAIN_MAX_RUN: usize = 255;
/// Enhanced tokens carry a 7-bit length.
const ENHANCED_MAX_RUN: usize = 127;
const ENHANCED_MAX_LITERALS: usize = 127;

pub struct RleCodec;

impl RleCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RleCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for RleCodec {
    fn info(&self) -> CodecInfo {
        CodecInfo {
            name: "rle",
            description: "Run-length encoding for data with consecutive identical bytes",
            supports_parallel: false,
            min_block_size: 1024,
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
        let entropy = analysis::entropy(input);
        let data = if entropy < ENHANCED_THRESHOLD {
            encode_enhanced(input)
        } else {
            encode_plain(input)
        };
        stats.encode_time = start.elapsed();

        stats.compressed_size = data.len();
        stats.compression_ratio = CompressionStats::ratio(data.len(), input.len());

        if config.verbose {
            info!(
                "rle encode: {} -> {} bytes ({:.1}%, entropy {:.3}, {} variant)",
                input.len(),
                data.len(),
                stats.compression_ratio * 100.0,
                entropy,
                if entropy < ENHANCED_THRESHOLD { "enhanced" } else { "plain" },
            );
        }

        Ok(CodecOutput { data, stats })
    }

    fn decode(&self, input: &[u8], config: &CompressionConfig) -> Result<CodecOutput> {
        if input.is_empty() {
            return Err(Error::EmptyInput);
        }

        let start = Instant::now();
        let data = if input[0] == ENHANCED_MAGIC {
            decode_enhanced(input)?
        } else {
            decode_plain(input)?
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

    fn estimate_ratio(&self, input: &[u8]) -> f64 {
        if input.is_empty() {
            return 1.0;
        }
        let mut runs = 1usize;
        for i in 1..input.len() {
            if input[i] != input[i - 1] {
                runs += 1;
            }
        }
        // A run costs roughly 2-3 bytes in either variant.
        (runs as f64 * 2.5 / input.len() as f64).min(1.0)
    }
}

fn encode_plain(input: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len());

    let mut i = 0;
    while i < input.len() {
        let byte = input[i];
        let mut run = 1;
        while i + run < input.len() && input[i + run] == byte && run < PLAIN_MAX_RUN {
            run += 1;
        }

        if run >= 3 {
            output.push(ESCAPE);
            output.push(run as u8);
            output.push(byte);
        } else if output.is_empty() && byte == ENHANCED_MAGIC {
            // A leading literal 0xE1 would make the frame look enhanced;
            // the run form keeps the first byte 0xFF.
            output.push(ESCAPE);
            output.push(run as u8);
            output.push(byte);
        } else {
            for _ in 0..run {
                if byte == ESCAPE {
                    output.push(ESCAPE);
                    output.push(0x00);
                } else {
                    output.push(byte);
                }
            }
        }

        i += run;
    }

    output
}

fn decode_plain(input: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(input.len() * 2);

    let mut i = 0;
    while i < input.len() {
        if input[i] != ESCAPE {
            output.push(input[i]);
            i += 1;
            continue;
        }

        let Some(&control) = input.get(i + 1) else {
            return Err(Error::TruncatedStream("dangling RLE escape"));
        };
        if control == 0x00 {
            output.push(ESCAPE);
            i += 2;
        } else {
            let Some(&value) = input.get(i + 2) else {
                return Err(Error::TruncatedStream("RLE run missing value byte"));
            };
            output.resize(output.len() + control as usize, value);
            i += 3;
        }
    }

    Ok(output)
}

fn encode_enhanced(input: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len() + 1);
    output.push(ENHANCED_MAGIC);

    let mut i = 0;
    while i < input.len() {
        let byte = input[i];
        let mut run = 1;
        while i + run < input.len() && input[i + run] == byte && run < ENHANCED_MAX_RUN {
            run += 1;
        }

        if run >= 4 {
            output.push(0x80 | run as u8);
            output.push(byte);
            i += run;
            continue;
        }

        // Pack short runs into a literal segment until the next long run
        // or the 7-bit length cap.
        let mut literals = 0usize;
        let mut j = i;
        while j < input.len() && literals < ENHANCED_MAX_LITERALS {
            let mut next_run = 1;
            while j + next_run < input.len() && input[j + next_run] == input[j] && next_run < 4 {
                next_run += 1;
            }
            if next_run >= 4 {
                break;
            }
            let take = next_run.min(ENHANCED_MAX_LITERALS - literals);
            literals += take;
            j += take;
        }

        output.push(literals as u8);
        output.extend_from_slice(&input[i..i + literals]);
        i += literals;
    }

    output
}

fn decode_enhanced(input: &[u8]) -> Result<Vec<u8>> {
    if input.first() != Some(&ENHANCED_MAGIC) {
        return Err(Error::CorruptFrame("missing enhanced RLE header".to_string()));
    }

    let mut output = Vec::with_capacity(input.len() * 2);

    let mut i = 1;
    while i < input.len() {
        let control = input[i];
        i += 1;

        if control & 0x80 != 0 {
            let run = (control & 0x7F) as usize;
            let Some(&value) = input.get(i) else {
                return Err(Error::CorruptFrame("run token missing value byte".to_string()));
            };
            i += 1;
            output.resize(output.len() + run, value);
        } else {
            let count = control as usize;
            if i + count > input.len() {
                return Err(Error::CorruptFrame("truncated literal run".to_string()));
            }
            output.extend_from_slice(&input[i..i + count]);
            i += count;
        }
    }

    Ok(output)
}
