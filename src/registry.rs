//! Codec registry: short textual names mapped to codec factories.

use crate::huffman::HuffmanCodec;
use crate::hybrid::HybridCodec;
use crate::lz77::Lz77Codec;
use crate::rle::RleCodec;
use crate::Codec;

/// Registered codec names, in registration order.
const NAMES: [&str; 4] = ["rle", "huffman", "lz77", "hybrid"];

/// Create a fresh codec instance by name.
pub fn create(name: &str) -> Option<Box<dyn Codec>> {
    match name {
        "rle" => Some(Box::new(RleCodec::new())),
        "huffman" => Some(Box::new(HuffmanCodec::new())),
        "lz77" => Some(Box::new(Lz77Codec::new())),
        "hybrid" => Some(Box::new(HybridCodec::new())),
        _ => None,
    }
}

pub fn list() -> &'static [&'static str] {
    &NAMES
}

pub fn is_available(name: &str) -> bool {
    NAMES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_listed_names_resolve() {
        for name in list() {
            let codec = create(name).unwrap_or_else(|| panic!("{name} not constructible"));
            assert_eq!(codec.info().name, *name);
        }
    }

    #[test]
    fn test_unknown_name() {
        assert!(create("zstd").is_none());
        assert!(!is_available("zstd"));
    }

    #[test]
    fn test_list_is_stable() {
        assert_eq!(list(), &["rle", "huffman", "lz77", "hybrid"]);
    }
}
