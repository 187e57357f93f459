#![no_main]

use libfuzzer_sys::fuzz_target;
use polycomp::{create, list, CompressionConfig};

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let config = CompressionConfig::default();

    for name in list() {
        let codec = create(name).unwrap();
        let encoded = codec.encode(data, &config).expect("encode must accept non-empty input");
        let decoded = codec.decode(&encoded.data, &config).expect("own frames must decode");
        assert_eq!(decoded.data, data, "{name} round trip");
        assert_eq!(encoded.stats.checksum, decoded.stats.checksum, "{name} checksum");
    }
});
