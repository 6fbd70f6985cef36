//! Merchant-key normalization.
//!
//! Cache correctness depends on this being stable across imports: the same
//! statement description must always map to the same key.

/// Normalize a raw statement description into a merchant cache key.
///
/// Lowercases, trims, and collapses internal whitespace runs to single
/// spaces, so `"  COLES  0645 OAKLEIGH 03 "` and `"coles 0645 oakleigh 03"`
/// hit the same cache entry.
pub fn merchant_key(description: &str) -> String {
    description
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_trims() {
        assert_eq!(merchant_key("  COLES 0645 OAKLEIGH 03 "), "coles 0645 oakleigh 03");
    }

    #[test]
    fn test_collapses_inner_whitespace() {
        assert_eq!(merchant_key("UBER\t *TRIP   MELBOURNE"), "uber *trip melbourne");
    }

    #[test]
    fn test_stable_across_variants() {
        let variants = ["GITHUB INC", "github inc", "  GitHub   Inc  "];
        let keys: Vec<_> = variants.iter().map(|v| merchant_key(v)).collect();
        assert!(keys.iter().all(|k| k == "github inc"), "got {keys:?}");
    }

    #[test]
    fn test_empty_description() {
        assert_eq!(merchant_key(""), "");
        assert_eq!(merchant_key("   "), "");
    }
}
