//! polycomp: adaptive block-partitioned byte-stream compression.
//!
//! Three primitive codecs (run-length, canonical-tree Huffman, hash-chain
//! LZ77) share one [`Codec`] interface and are composed by a hybrid
//! meta-codec that partitions input into blocks, classifies each block by
//! its statistical profile and routes it to the best primitive. Every
//! frame is self-describing and decodes back to the original bytes.

pub mod analysis;
pub mod bits;
pub mod checksum;
pub mod error;
pub mod harness;
pub mod huffman;
pub mod hybrid;
pub mod lz77;
pub mod registry;
pub mod rle;

pub use error::{Error, ErrorKind, Result};
pub use harness::{run_benchmark, BenchmarkReport, CodecBenchmark};
pub use huffman::HuffmanCodec;
pub use hybrid::HybridCodec;
pub use lz77::Lz77Codec;
pub use registry::{create, is_available, list};
pub use rle::RleCodec;

use std::time::Duration;

/// Configuration shared by all codecs.
#[derive(Clone, Debug)]
pub struct CompressionConfig {
    /// Target block size for block-partitioned codecs (0 = codec default)
    pub block_size: usize,
    /// Worker threads for codecs that can parallelise (0 = auto, 1 = single-threaded)
    pub num_threads: usize,
    /// Compute a CRC-32 of the raw side and attach it to the stats
    pub verify_integrity: bool,
    /// Emit informational log output while encoding/decoding
    pub verbose: bool,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self { block_size: 0, num_threads: 1, verify_integrity: true, verbose: false }
    }
}

/// Statistics from a single encode or decode call.
#[derive(Clone, Debug, Default)]
pub struct CompressionStats {
    pub original_size: usize,
    pub compressed_size: usize,
    /// compressed / original
    pub compression_ratio: f64,
    pub encode_time: Duration,
    pub decode_time: Duration,
    /// CRC-32 of the raw (uncompressed) side, 0 unless `verify_integrity`
    pub checksum: u32,
    pub threads_used: usize,
}

impl CompressionStats {
    pub(crate) fn ratio(compressed: usize, original: usize) -> f64 {
        if original == 0 {
            0.0
        } else {
            compressed as f64 / original as f64
        }
    }
}

/// Static metadata describing a codec.
#[derive(Clone, Debug)]
pub struct CodecInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub supports_parallel: bool,
    pub min_block_size: usize,
}

/// Successful result of an encode or decode call.
#[derive(Clone, Debug)]
pub struct CodecOutput {
    pub data: Vec<u8>,
    pub stats: CompressionStats,
}

/// A reversible byte-stream compressor with a fixed wire format.
///
/// Implementations are pure: output depends only on the input bytes and
/// the codec's fixed parameters. A single instance is not required to
/// tolerate concurrent calls; distinct instances may run on distinct
/// threads.
pub trait Codec {
    fn info(&self) -> CodecInfo;

    /// Compress `input` into a self-describing frame.
    ///
    /// Fails only with [`Error::EmptyInput`] or on invalid configuration.
    fn encode(&self, input: &[u8], config: &CompressionConfig) -> Result<CodecOutput>;

    /// Decode a frame produced by this codec's `encode`.
    ///
    /// Any structural violation fails without partial output.
    fn decode(&self, input: &[u8], config: &CompressionConfig) -> Result<CodecOutput>;

    /// Cheap estimate of the achievable ratio in [0, 1]; advisory only.
    fn estimate_ratio(&self, input: &[u8]) -> f64;

    /// Preferred block size when splitting `input_size` bytes for this codec.
    fn optimal_block_size(&self, input_size: usize) -> usize {
        let _ = input_size;
        64 * 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = CompressionConfig::default();
        assert_eq!(config.block_size, 0);
        assert_eq!(config.num_threads, 1);
        assert!(config.verify_integrity);
        assert!(!config.verbose);
    }

    #[test]
    fn test_ratio() {
        assert_eq!(CompressionStats::ratio(50, 100), 0.5);
        assert_eq!(CompressionStats::ratio(10, 0), 0.0);
    }
}
