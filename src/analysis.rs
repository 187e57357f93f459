//! Statistical features used to route data between codecs.
//!
//! All scores are normalised to [0, 1] so thresholds compose.

/// Shannon byte entropy normalised by 8 (1.0 = uniformly random bytes).
pub fn entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let mut freq = [0u64; 256];
    for &b in data {
        freq[b as usize] += 1;
    }

    let len = data.len() as f64;
    let mut entropy = 0.0;
    for &f in &freq {
        if f > 0 {
            let p = f as f64 / len;
            entropy -= p * p.log2();
        }
    }
    entropy / 8.0
}

/// Number of distinct byte values present.
pub fn distinct_bytes(data: &[u8]) -> usize {
    let mut seen = [false; 256];
    let mut count = 0;
    for &b in data {
        if !seen[b as usize] {
            seen[b as usize] = true;
            count += 1;
        }
    }
    count
}

/// Fraction of 3-gram positions whose 3-gram re-occurs within the previous
/// 64 bytes. A cheap proxy for LZ-style redundancy.
pub fn repetition_score(data: &[u8]) -> f64 {
    if data.len() < 4 {
        return 0.0;
    }

    const LOOKBACK: usize = 64;
    let positions = data.len() - 2;
    let mut matched = 0usize;

    for i in 1..positions {
        let window_start = i.saturating_sub(LOOKBACK);
        for j in window_start..i {
            if data[j] == data[i] && data[j + 1] == data[i + 1] && data[j + 2] == data[i + 2] {
                matched += 1;
                break;
            }
        }
    }

    matched as f64 / positions as f64
}

/// Mean entropy of `window`-byte sub-windows stepping by `window / 2`.
/// Falls back to whole-buffer entropy when the data is shorter than one
/// window.
pub fn local_entropy(data: &[u8], window: usize) -> f64 {
    if data.len() < window {
        return entropy(data);
    }

    let step = (window / 2).max(1);
    let mut total = 0.0;
    let mut windows = 0usize;

    let mut start = 0;
    while start + window <= data.len() {
        total += entropy(&data[start..start + window]);
        windows += 1;
        start += step;
    }

    if windows > 0 {
        total / windows as f64
    } else {
        entropy(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entropy_constant_is_zero() {
        assert_eq!(entropy(&[42u8; 1000]), 0.0);
    }

    #[test]
    fn test_entropy_uniform_is_one() {
        let data: Vec<u8> = (0..=255u8).collect();
        let e = entropy(&data);
        assert!((e - 1.0).abs() < 1e-9, "uniform entropy was {e}");
    }

    #[test]
    fn test_entropy_two_symbols() {
        // Two equally likely symbols: 1 bit per byte, 0.125 normalised.
        let data: Vec<u8> = (0..1000).map(|i| (i % 2) as u8).collect();
        let e = entropy(&data);
        assert!((e - 0.125).abs() < 1e-9, "two-symbol entropy was {e}");
    }

    #[test]
    fn test_entropy_empty() {
        assert_eq!(entropy(&[]), 0.0);
    }

    #[test]
    fn test_distinct_bytes() {
        assert_eq!(distinct_bytes(b""), 0);
        assert_eq!(distinct_bytes(b"aaaa"), 1);
        assert_eq!(distinct_bytes(b"abcabc"), 3);
    }

    #[test]
    fn test_repetition_periodic() {
        let data: Vec<u8> = b"abcabcabc".iter().cycle().take(600).copied().collect();
        assert!(repetition_score(&data) > 0.9);
    }

    #[test]
    fn test_repetition_short_input() {
        assert_eq!(repetition_score(b"abc"), 0.0);
    }

    #[test]
    fn test_repetition_no_repeats() {
        // Strictly increasing bytes never repeat a 3-gram.
        let data: Vec<u8> = (0..=255u8).collect();
        assert_eq!(repetition_score(&data), 0.0);
    }

    #[test]
    fn test_local_entropy_short_falls_back() {
        let data = [7u8; 100];
        assert_eq!(local_entropy(&data, 256), entropy(&data));
    }

    #[test]
    fn test_local_entropy_mixed_halves() {
        // 512 constant bytes then 512 spread bytes: mean of low and high.
        let mut data = vec![0u8; 512];
        data.extend((0..512).map(|i| (i % 256) as u8));
        let le = local_entropy(&data, 256);
        let whole = entropy(&data);
        assert!(le < whole, "windowed mean {le} should undercut pooled {whole}");
    }
}
