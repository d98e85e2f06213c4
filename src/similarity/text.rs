//! Fuzzy string comparison primitives.
//!
//! All folder and tag comparisons in the engine are built on a single
//! normalized ratio. Comparison is case-insensitive everywhere: tags and
//! filenames differing only in case are the same signal.

use strsim::normalized_levenshtein;

/// Normalized similarity ratio between two strings, in [0,1].
///
/// 1.0 means identical (after lowercasing), 0.0 means fully disjoint.
/// Reflexive and symmetric.
pub fn similarity(a: &str, b: &str) -> f64 {
    normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase())
}

/// Similarity ratio clamped to zero below `threshold`.
///
/// Low-confidence ratios would otherwise contaminate weighted sums with
/// noise; a ratio exactly at the threshold passes through unclamped.
pub fn clamped_similarity(a: &str, b: &str, threshold: f64) -> f64 {
    let ratio = similarity(a, b);
    if ratio < threshold { 0.0 } else { ratio }
}

/// Strip the file extension (text after the last dot) and all ASCII digits.
///
/// Track numbering is the dominant source of variation between filenames
/// in the same folder; removing digits isolates the naming pattern itself.
pub fn strip_numbering(name: &str) -> String {
    let stem = match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    };
    stem.chars().filter(|c| !c.is_ascii_digit()).collect()
}

/// Average pairwise similarity among a set of names, in [0,1].
///
/// Names are digit-stripped first, so "Track 01" vs "Track 02" compare as
/// equal. A high value (above the generic threshold, 0.7 by default) means
/// the names carry little distinguishing signal and downstream filename or
/// title similarity should be discounted. Fewer than two names yields 0.0.
pub fn average_pairwise_similarity<S: AsRef<str>>(names: &[S]) -> f64 {
    if names.len() < 2 {
        return 0.0;
    }

    let cleaned: Vec<String> = names.iter().map(|n| strip_numbering(n.as_ref())).collect();

    let mut total = 0.0;
    let mut pairs = 0usize;
    for i in 0..cleaned.len() {
        for j in (i + 1)..cleaned.len() {
            total += similarity(&cleaned[i], &cleaned[j]);
            pairs += 1;
        }
    }

    total / pairs as f64
}

/// Discount factor for a parameter whose source names are too uniform.
///
/// When the larger of the two folders' uniformity values exceeds
/// `generic_threshold`, contributions are multiplied by
/// `1 - uniformity * reduction_factor`; otherwise no reduction.
pub fn genericity_discount(
    uniformity_a: f64,
    uniformity_b: f64,
    generic_threshold: f64,
    reduction_factor: f64,
) -> f64 {
    let max = uniformity_a.max(uniformity_b);
    if max > generic_threshold {
        1.0 - max * reduction_factor
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_similarity_identical() {
        assert_eq!(similarity("Hello World", "Hello World"), 1.0);
        assert_eq!(similarity("hello", "HELLO"), 1.0);
    }

    #[test]
    fn test_similarity_disjoint() {
        assert!(similarity("abcde", "vwxyz") < 0.3);
    }

    #[test]
    fn test_similarity_partial() {
        let ratio = similarity("Hello", "Hell");
        assert!(ratio > 0.7 && ratio < 1.0);
    }

    #[test]
    fn test_clamped_below_threshold() {
        // "Hello" vs "World": one shared char position at best
        let raw = similarity("Hello", "World");
        assert!(raw < 0.75);
        assert_eq!(clamped_similarity("Hello", "World", 0.75), 0.0);
    }

    #[test]
    fn test_clamped_at_boundary_passes() {
        // "abcd" vs "abcx": distance 1 over len 4 => exactly 0.75
        let raw = similarity("abcd", "abcx");
        assert_eq!(raw, 0.75);
        assert_eq!(clamped_similarity("abcd", "abcx", 0.75), 0.75);
    }

    #[test]
    fn test_strip_numbering() {
        assert_eq!(strip_numbering("01 - Track 01.mp3"), " - Track ");
        assert_eq!(strip_numbering("Song.flac"), "Song");
        assert_eq!(strip_numbering("no extension"), "no extension");
        // Leading dot files keep their name
        assert_eq!(strip_numbering(".hidden"), ".hidden");
    }

    #[test]
    fn test_average_pairwise_degenerate() {
        let empty: [&str; 0] = [];
        assert_eq!(average_pairwise_similarity(&empty), 0.0);
        assert_eq!(average_pairwise_similarity(&["only one"]), 0.0);
    }

    #[test]
    fn test_average_pairwise_generic_tracks() {
        // Identical after digit stripping: fully generic
        let names = ["Track 01.mp3", "Track 02.mp3", "Track 03.mp3"];
        assert_eq!(average_pairwise_similarity(&names), 1.0);
    }

    #[test]
    fn test_average_pairwise_distinct_names() {
        let names = ["01 Paranoid.mp3", "02 Iron Man.mp3", "03 War Pigs.mp3"];
        assert!(average_pairwise_similarity(&names) < 0.7);
    }

    #[test]
    fn test_genericity_discount() {
        // Below threshold: no reduction
        assert_eq!(genericity_discount(0.5, 0.6, 0.7, 0.5), 1.0);
        // Above threshold: reduced by max * factor
        let factor = genericity_discount(0.9, 0.3, 0.7, 0.5);
        assert!((factor - 0.55).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_similarity_reflexive(s in ".{0,40}") {
            prop_assert_eq!(similarity(&s, &s), 1.0);
        }

        #[test]
        fn prop_similarity_symmetric(a in ".{0,40}", b in ".{0,40}") {
            prop_assert_eq!(similarity(&a, &b), similarity(&b, &a));
        }

        #[test]
        fn prop_similarity_in_range(a in ".{0,40}", b in ".{0,40}") {
            let r = similarity(&a, &b);
            prop_assert!((0.0..=1.0).contains(&r));
        }

        #[test]
        fn prop_clamped_never_below_threshold_unless_zero(
            a in ".{0,40}", b in ".{0,40}"
        ) {
            let c = clamped_similarity(&a, &b, 0.75);
            prop_assert!(c == 0.0 || c >= 0.75);
        }
    }
}
