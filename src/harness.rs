//! Round-trip benchmark orchestrator.
//!
//! Drives `encode → decode → compare` for a set of codecs over one input
//! and records per-codec outcomes. Report formatting belongs to callers.

use log::info;

use crate::error::Error;
use crate::registry;
use crate::{CompressionConfig, CompressionStats};

/// Outcome of one codec's round trip.
#[derive(Clone, Debug)]
pub struct CodecBenchmark {
    pub name: String,
    pub success: bool,
    pub stats: CompressionStats,
    pub error: Option<String>,
}

impl CodecBenchmark {
    fn failed(name: &str, error: Error) -> Self {
        Self { name: name.to_string(), success: false, stats: Default::default(), error: Some(error.to_string()) }
    }
}

/// All per-codec outcomes for one input.
#[derive(Clone, Debug, Default)]
pub struct BenchmarkReport {
    pub results: Vec<CodecBenchmark>,
}

impl BenchmarkReport {
    pub fn successful_count(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    /// Lowest compressed/original ratio among successful runs.
    pub fn best_compression(&self) -> Option<&CodecBenchmark> {
        self.results
            .iter()
            .filter(|r| r.success)
            .min_by(|a, b| a.stats.compression_ratio.total_cmp(&b.stats.compression_ratio))
    }

    pub fn fastest_encode(&self) -> Option<&CodecBenchmark> {
        self.results.iter().filter(|r| r.success).min_by_key(|r| r.stats.encode_time)
    }

    pub fn fastest_decode(&self) -> Option<&CodecBenchmark> {
        self.results.iter().filter(|r| r.success).min_by_key(|r| r.stats.decode_time)
    }

    pub fn average_ratio(&self) -> f64 {
        let successful: Vec<f64> = self
            .results
            .iter()
            .filter(|r| r.success)
            .map(|r| r.stats.compression_ratio)
            .collect();
        if successful.is_empty() {
            0.0
        } else {
            successful.iter().sum::<f64>() / successful.len() as f64
        }
    }
}

/// Round-trip `input` through each named codec.
///
/// Unknown names are recorded as failed results with an `Unsupported`
/// message rather than aborting the run.
pub fn run_benchmark(input: &[u8], names: &[&str], config: &CompressionConfig) -> BenchmarkReport {
    let mut report = BenchmarkReport::default();

    for &name in names {
        let Some(codec) = registry::create(name) else {
            report.results.push(CodecBenchmark::failed(name, Error::Unsupported(name.to_string())));
            continue;
        };

        let result = round_trip(&*codec, name, input, config);
        if config.verbose {
            if result.success {
                info!(
                    "{name}: {} -> {} bytes ({:.1}%)",
                    result.stats.original_size,
                    result.stats.compressed_size,
                    result.stats.compression_ratio * 100.0
                );
            } else {
                info!("{name}: failed: {}", result.error.as_deref().unwrap_or("unknown"));
            }
        }
        report.results.push(result);
    }

    report
}

fn round_trip(
    codec: &dyn crate::Codec,
    name: &str,
    input: &[u8],
    config: &CompressionConfig,
) -> CodecBenchmark {
    let encoded = match codec.encode(input, config) {
        Ok(out) => out,
        Err(err) => return CodecBenchmark::failed(name, err),
    };

    let decoded = match codec.decode(&encoded.data, config) {
        Ok(out) => out,
        Err(err) => return CodecBenchmark::failed(name, err),
    };

    if decoded.data != input {
        return CodecBenchmark::failed(
            name,
            Error::CorruptFrame("round trip produced different bytes".to_string()),
        );
    }

    if config.verify_integrity && encoded.stats.checksum != decoded.stats.checksum {
        return CodecBenchmark::failed(name, Error::CorruptFrame("checksum mismatch".to_string()));
    }

    let mut stats = encoded.stats;
    stats.decode_time = decoded.stats.decode_time;
    CodecBenchmark { name: name.to_string(), success: true, stats, error: None }
}
