//! End-to-end tests for polycomp.
//!
//! Exercises every codec over a spread of data shapes, the documented
//! boundary cases, and frame misidentification paths.

use polycomp::{
    create, list, run_benchmark, Codec, CompressionConfig, ErrorKind, HuffmanCodec, HybridCodec,
    Lz77Codec, RleCodec,
};

// ============================================================================
// Test Data Generators
// ============================================================================

/// Deterministic xorshift PRNG bytes (uniform distribution).
fn generate_random_data(size: usize, seed: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut state = seed;
    for _ in 0..size {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        data.push((state & 0xFF) as u8);
    }
    data
}

/// Heavily skewed distribution: mostly one symbol with occasional others.
fn generate_skewed_data(size: usize, seed: u64) -> Vec<u8> {
    let noise = generate_random_data(size, seed);
    noise
        .into_iter()
        .map(|b| if b < 224 { b'a' } else { b })
        .collect()
}

/// Repeating phrase (high 3-gram repetition, moderate byte entropy).
fn generate_repetitive_data(size: usize) -> Vec<u8> {
    let pattern = b"ACGTACGTTTACGGCA";
    pattern.iter().cycle().take(size).copied().collect()
}

/// Adversarial data built from the codecs' own escape and magic bytes.
fn generate_escape_heavy_data(size: usize, seed: u64) -> Vec<u8> {
    let specials = [0xFFu8, 0xE1, b'L', b'Z', b'7', b'H', b'Y', b'B', b'R', 0x00, 0x01, 0x02];
    generate_random_data(size, seed)
        .into_iter()
        .map(|b| specials[b as usize % specials.len()])
        .collect()
}

fn all_codecs() -> Vec<Box<dyn Codec>> {
    list().iter().map(|name| create(name).unwrap()).collect()
}

fn assert_roundtrip(codec: &dyn Codec, data: &[u8], label: &str) {
    let config = CompressionConfig::default();
    let encoded = codec
        .encode(data, &config)
        .unwrap_or_else(|e| panic!("{} encode failed on {label}: {e}", codec.info().name));
    let decoded = codec
        .decode(&encoded.data, &config)
        .unwrap_or_else(|e| panic!("{} decode failed on {label}: {e}", codec.info().name));
    assert_eq!(decoded.data, data, "{} round trip on {label}", codec.info().name);
    assert_eq!(
        encoded.stats.checksum, decoded.stats.checksum,
        "{} checksum on {label}",
        codec.info().name
    );
}

// ============================================================================
// Universal Round Trips
// ============================================================================

#[test]
fn test_roundtrip_uniform_random() {
    for codec in all_codecs() {
        for size in [1usize, 64, 4096, 65_536] {
            let data = generate_random_data(size, 0xA5A5_0001 + size as u64);
            assert_roundtrip(&*codec, &data, "uniform random");
        }
    }
}

#[test]
fn test_roundtrip_skewed() {
    for codec in all_codecs() {
        let data = generate_skewed_data(100_000, 7);
        assert_roundtrip(&*codec, &data, "skewed");
    }
}

#[test]
fn test_roundtrip_constant() {
    for codec in all_codecs() {
        let data = vec![0x5Au8; 50_000];
        assert_roundtrip(&*codec, &data, "constant");
    }
}

#[test]
fn test_roundtrip_repetitive() {
    for codec in all_codecs() {
        let data = generate_repetitive_data(80_000);
        assert_roundtrip(&*codec, &data, "repetitive");
    }
}

#[test]
fn test_roundtrip_escape_heavy() {
    for codec in all_codecs() {
        for size in [5usize, 500, 50_000] {
            let data = generate_escape_heavy_data(size, 0xE5CA_9E00 + size as u64);
            assert_roundtrip(&*codec, &data, "escape heavy");
        }
    }
}

#[test]
fn test_roundtrip_large_mixed() {
    // ~1 MiB spanning all hybrid block regimes: runs, text, noise.
    let mut data = vec![0u8; 300_000];
    data.extend(generate_repetitive_data(300_000));
    data.extend(generate_random_data(300_000, 31337));
    data.extend(generate_skewed_data(148_576, 99));

    for codec in all_codecs() {
        assert_roundtrip(&*codec, &data, "large mixed");
    }
}

#[test]
fn test_random_fuzz_lengths() {
    // Random lengths and seeds; every codec must round-trip everything.
    let mut state = 0xC0FF_EE00_1234_5678u64;
    for _ in 0..20 {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let size = 1 + (state % 30_000) as usize;
        let data = generate_random_data(size, state);
        for codec in all_codecs() {
            assert_roundtrip(&*codec, &data, "fuzz");
        }
    }
}

// ============================================================================
// Boundary Cases
// ============================================================================

#[test]
fn test_empty_input_rejected_everywhere() {
    let config = CompressionConfig::default();
    for codec in all_codecs() {
        let name = codec.info().name;
        let err = codec.encode(&[], &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyInput, "{name} encode");
        let err = codec.decode(&[], &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyInput, "{name} decode");
    }
}

#[test]
fn test_single_byte() {
    for codec in all_codecs() {
        for byte in [0x00u8, 0x41, 0xE1, 0xFF] {
            assert_roundtrip(&*codec, &[byte], "single byte");
        }
    }
}

#[test]
fn test_all_identical_lengths() {
    for codec in all_codecs() {
        for n in [1usize, 2, 3, 4, 255, 256, 257, 100_000] {
            let data = vec![0xABu8; n];
            assert_roundtrip(&*codec, &data, "all identical");
        }
    }
}

#[test]
fn test_five_escape_bytes() {
    for codec in all_codecs() {
        assert_roundtrip(&*codec, &[0xFF; 5], "five 0xFF");
    }
}

#[test]
fn test_all_256_symbols() {
    let data: Vec<u8> = (0..=255u8).collect();
    for codec in all_codecs() {
        assert_roundtrip(&*codec, &data, "bytes 0..255");
    }
}

#[test]
fn test_random_64k_exercises_chains() {
    let data = generate_random_data(65_536, 0xFEED);
    let codec = Lz77Codec::new();
    assert_roundtrip(&codec, &data, "random 64k");
}

// ============================================================================
// Frame Self-Identification
// ============================================================================

#[test]
fn test_frames_lead_with_their_magic() {
    let config = CompressionConfig::default();
    let data = generate_repetitive_data(4096);

    let lz77 = Lz77Codec::new().encode(&data, &config).unwrap().data;
    assert_eq!(&lz77[0..4], b"LZ77");

    let hybrid = HybridCodec::new().encode(&data, &config).unwrap().data;
    assert_eq!(&hybrid[0..4], b"HYBR");

    let huffman = HuffmanCodec::new().encode(&data, &config).unwrap().data;
    assert!(huffman[0] == 0x01 || huffman[0] == 0x02);

    // RLE variants are distinguished by the first byte: 0xE1 = enhanced.
    let constant = vec![0u8; 4096];
    let enhanced = RleCodec::new().encode(&constant, &config).unwrap().data;
    assert_eq!(enhanced[0], 0xE1);
    let plain = RleCodec::new().encode(&generate_random_data(4096, 3), &config).unwrap().data;
    assert_ne!(plain[0], 0xE1);
}

#[test]
fn test_foreign_frames_rejected() {
    let config = CompressionConfig::default();
    let data = generate_repetitive_data(4096);

    for (consumer, producer) in [
        ("lz77", "hybrid"),
        ("lz77", "huffman"),
        ("hybrid", "lz77"),
        ("hybrid", "huffman"),
        ("huffman", "lz77"),
        ("huffman", "hybrid"),
    ] {
        let frame = create(producer).unwrap().encode(&data, &config).unwrap().data;
        let err = create(consumer)
            .unwrap()
            .decode(&frame, &config)
            .expect_err(&format!("{consumer} accepted a {producer} frame"));
        assert_eq!(err.kind(), ErrorKind::CorruptFrame, "{consumer} decoding {producer}");
    }
}

// ============================================================================
// Concrete Scenarios
// ============================================================================

#[test]
fn test_scenario_single_symbol_huffman_frame() {
    let config = CompressionConfig::default();
    let out = HuffmanCodec::new().encode(b"AAAAAAAAAA", &config).unwrap();
    assert_eq!(out.data, vec![0x01, 0x41, 0x00, 0x00, 0x00, 0x0A]);
    assert_eq!(out.data.len(), 6);
    let decoded = HuffmanCodec::new().decode(&out.data, &config).unwrap();
    assert_eq!(decoded.data, b"AAAAAAAAAA");
}

#[test]
fn test_scenario_enhanced_rle_for_low_entropy() {
    let config = CompressionConfig::default();
    let out = RleCodec::new().encode(&[0xFF, 0xFF, 0xFF], &config).unwrap();
    assert_eq!(out.data[0], 0xE1);
    let decoded = RleCodec::new().decode(&out.data, &config).unwrap();
    assert_eq!(decoded.data, vec![0xFF, 0xFF, 0xFF]);
}

#[test]
fn test_scenario_lz77_periodic_tokens() {
    let config = CompressionConfig::default();
    let out = Lz77Codec::new().encode(b"abcabcabcabc", &config).unwrap();
    let token_count = u32::from_be_bytes([out.data[4], out.data[5], out.data[6], out.data[7]]);
    assert!((4..=5).contains(&token_count), "token count {token_count}");
    let decoded = Lz77Codec::new().decode(&out.data, &config).unwrap();
    assert_eq!(decoded.data, b"abcabcabcabc");
}

#[test]
fn test_scenario_hybrid_block_mix() {
    // Zeros then noise, forced into two 8 KiB blocks: the first must route
    // to RLE (tag 0), the second to Huffman (tag 2).
    let mut data = vec![0u8; 8192];
    data.extend(generate_random_data(8192, 0xBADC_0FFE));

    let config = CompressionConfig { block_size: 8192, ..Default::default() };
    let out = HybridCodec::new().encode(&data, &config).unwrap();

    assert_eq!(&out.data[0..4], b"HYBR");
    let block_count = u32::from_be_bytes([out.data[4], out.data[5], out.data[6], out.data[7]]);
    assert_eq!(block_count, 2);

    // First block header starts at 8: tag, decoded size, encoded size.
    let first_tag = out.data[8];
    assert_eq!(first_tag, 0, "zeros block should use RLE");
    let first_encoded =
        u32::from_be_bytes([out.data[13], out.data[14], out.data[15], out.data[16]]) as usize;
    let second_tag = out.data[8 + 9 + first_encoded];
    assert_eq!(second_tag, 2, "noise block should use Huffman");

    let decoded = HybridCodec::new().decode(&out.data, &CompressionConfig::default()).unwrap();
    assert_eq!(decoded.data, data);
}

#[test]
fn test_scenario_corrupted_huffman_payload() {
    let config = CompressionConfig::default();
    let data = generate_skewed_data(4096, 11);
    let mut encoded = HuffmanCodec::new().encode(&data, &config).unwrap().data;

    // Flip the first bit of the packed-codes region, which the decoder is
    // guaranteed to consume.
    let tree_size = u16::from_be_bytes([encoded[1], encoded[2]]) as usize;
    let codes_start = 3 + tree_size + 4;
    encoded[codes_start] ^= 0x80;

    match HuffmanCodec::new().decode(&encoded, &config) {
        Err(err) => assert!(matches!(
            err.kind(),
            ErrorKind::CorruptTree | ErrorKind::TruncatedStream
        )),
        // A surviving decode must be caught by the checksum comparison.
        Ok(decoded) => assert_ne!(decoded.data, data, "corruption must not round trip"),
    }
}

#[test]
fn test_scenario_registry_miss() {
    assert!(create("brotli").is_none());
    let report = run_benchmark(b"abc", &["brotli"], &CompressionConfig::default());
    assert!(!report.results[0].success);
    assert!(report.results[0].error.as_deref().unwrap().contains("unsupported"));
}

// ============================================================================
// Harness Behaviour
// ============================================================================

#[test]
fn test_benchmark_roundtrips_all_registered_codecs() {
    let data = generate_repetitive_data(30_000);
    let report = run_benchmark(&data, list(), &CompressionConfig::default());
    assert_eq!(report.successful_count(), list().len());
    let best = report.best_compression().unwrap();
    assert!(best.stats.compression_ratio < 1.0);
}

#[test]
fn test_stats_are_populated() {
    let config = CompressionConfig::default();
    let data = generate_skewed_data(10_000, 5);
    for codec in all_codecs() {
        let out = codec.encode(&data, &config).unwrap();
        assert_eq!(out.stats.original_size, data.len());
        assert_eq!(out.stats.compressed_size, out.data.len());
        assert!(out.stats.compression_ratio > 0.0);
        assert!(out.stats.threads_used >= 1);
        assert_ne!(out.stats.checksum, 0);
    }
}

#[test]
fn test_integrity_disabled_skips_checksum() {
    let config = CompressionConfig { verify_integrity: false, ..Default::default() };
    let out = RleCodec::new().encode(b"aaabbbccc", &config).unwrap();
    assert_eq!(out.stats.checksum, 0);
}

#[test]
fn test_codec_info_metadata() {
    for codec in all_codecs() {
        let info = codec.info();
        assert!(!info.description.is_empty());
        assert!(info.min_block_size >= 1024);
    }
    assert!(HybridCodec::new().info().supports_parallel);
    assert!(!RleCodec::new().info().supports_parallel);
}

#[test]
fn test_estimates_stay_in_unit_interval() {
    let inputs = [
        vec![0u8; 10_000],
        generate_random_data(10_000, 2),
        generate_repetitive_data(10_000),
        generate_skewed_data(10_000, 3),
    ];
    for codec in all_codecs() {
        for input in &inputs {
            let estimate = codec.estimate_ratio(input);
            assert!((0.0..=1.0).contains(&estimate), "{} gave {estimate}", codec.info().name);
        }
    }
}
