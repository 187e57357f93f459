#![no_main]

use libfuzzer_sys::fuzz_target;
use polycomp::{create, list, CompressionConfig};

fuzz_target!(|data: &[u8]| {
    let config = CompressionConfig::default();

    // Decoding arbitrary bytes may fail - that's fine.
    // We're looking for panics and runaway allocations, not errors.
    for name in list() {
        let codec = create(name).unwrap();
        let _ = codec.decode(data, &config);
    }
});
