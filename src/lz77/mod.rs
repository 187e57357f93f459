//! LZ77 codec with hash-chain match search.
//!
//! Greedy left-to-right parse over a 4 KiB window. Every match token
//! carries the byte that follows the matched region, so the encoder caps
//! match length one short of the input end to keep encoder and decoder
//! agreed on the final byte.

pub mod matcher;
pub mod tokens;

use std::time::Instant;

use log::info;

use crate::checksum;
use crate::error::{Error, Result};
use crate::{Codec, CodecInfo, CodecOutput, CompressionConfig, CompressionStats};

use matcher::{HashChains, LOOKAHEAD};
use tokens::Token;

const MAGIC: &[u8; 4] = b"LZ77";

const TAG_LITERAL: u8 = 0x00;
const TAG_MATCH: u8 = 0x01;

pub struct Lz77Codec;

impl Lz77Codec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Lz77Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for Lz77Codec {
    fn info(&self) -> CodecInfo {
        CodecInfo {
            name: "lz77",
            description: "LZ77 sliding-window compression with hash-chain match search",
            supports_parallel: false,
            min_block_size: 8192,
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
        let tokens = parse(input);
        let data = encode_tokens(&tokens);
        stats.encode_time = start.elapsed();

        stats.compressed_size = data.len();
        stats.compression_ratio = CompressionStats::ratio(data.len(), input.len());

        if config.verbose {
            info!(
                "lz77 encode: {} -> {} bytes ({:.1}%, {} tokens)",
                input.len(),
                data.len(),
                stats.compression_ratio * 100.0,
                tokens.len(),
            );
        }

        Ok(CodecOutput { data, stats })
    }

    fn decode(&self, input: &[u8], config: &CompressionConfig) -> Result<CodecOutput> {
        if input.is_empty() {
            return Err(Error::EmptyInput);
        }

        let start = Instant::now();
        let data = decode_frame(input)?;

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
        // Each position with a nearby 3-gram repeat saves roughly 2.5
        // bytes once folded into a match.
        let repetition = crate::analysis::repetition_score(input);
        let positions = input.len().saturating_sub(2) as f64;
        let saved = repetition * positions * 2.5;
        (1.0 - saved / input.len() as f64).max(0.1)
    }
}

/// Greedy parse: longest available match, literal otherwise.
fn parse(input: &[u8]) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(input.len() / 4);
    let mut chains = HashChains::new();

    let mut i = 0;
    while i < input.len() {
        // Reserve one byte past the match for the follow byte.
        let max_len = LOOKAHEAD.min(input.len() - i - 1);

        let advance = match chains.find_match(input, i, max_len) {
            Some((distance, length)) => {
                let follow = input[i + length as usize];
                tokens.push(Token::Match { distance, length, follow });
                length as usize + 1
            }
            None => {
                tokens.push(Token::Literal(input[i]));
                1
            }
        };

        for position in i..i + advance {
            chains.insert(input, position);
        }
        i += advance;
    }

    tokens
}

fn encode_tokens(tokens: &[Token]) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + tokens.len() * 2);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&(tokens.len() as u32).to_be_bytes());

    for token in tokens {
        match *token {
            Token::Literal(byte) => {
                out.push(TAG_LITERAL);
                out.push(byte);
            }
            Token::Match { distance, length, follow } => {
                out.push(TAG_MATCH);
                out.extend_from_slice(&distance.to_be_bytes());
                out.push(length);
                out.push(follow);
            }
        }
    }

    out
}

fn decode_frame(input: &[u8]) -> Result<Vec<u8>> {
    if input.len() < 4 || &input[0..4] != MAGIC {
        return Err(Error::CorruptFrame("bad LZ77 magic".to_string()));
    }
    if input.len() < 8 {
        return Err(Error::TruncatedStream("LZ77 token count"));
    }

    let token_count = u32::from_be_bytes([input[4], input[5], input[6], input[7]]) as usize;
    let mut output = Vec::with_capacity((token_count * 2).min(1 << 20));

    let mut offset = 8;
    for _ in 0..token_count {
        let Some(&tag) = input.get(offset) else {
            return Err(Error::TruncatedStream("LZ77 token tag"));
        };
        offset += 1;

        match tag {
            TAG_LITERAL => {
                let Some(&byte) = input.get(offset) else {
                    return Err(Error::TruncatedStream("LZ77 literal byte"));
                };
                offset += 1;
                output.push(byte);
            }
            TAG_MATCH => {
                if offset + 4 > input.len() {
                    return Err(Error::TruncatedStream("LZ77 match token"));
                }
                let distance = u16::from_be_bytes([input[offset], input[offset + 1]]);
                let length = input[offset + 2] as usize;
                let follow = input[offset + 3];
                offset += 4;

                let distance_usize = distance as usize;
                if distance_usize == 0 || distance_usize > output.len() {
                    return Err(Error::BadReference { distance, available: output.len() });
                }

                // Byte-by-byte so overlapping copies repeat recent output.
                let start = output.len() - distance_usize;
                for k in 0..length {
                    let byte = output[start + k];
                    output.push(byte);
                }
                output.push(follow);
            }
            tag => {
                return Err(Error::CorruptFrame(format!("unknown LZ77 token tag 0x{tag:02x}")))
            }
        }
    }

    if offset != input.len() {
        return Err(Error::CorruptFrame("trailing bytes after declared tokens".to_string()));
    }

    Ok(output)
}
