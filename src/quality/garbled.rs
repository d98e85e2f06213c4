//! Garbled-text detection.
//!
//! Tag text that survived a bad encoding round-trip should not count toward
//! metadata completeness. Detection is behind a trait so callers can plug a
//! stricter oracle without touching the scorer.

/// Oracle deciding whether a tag value is encoding-damaged.
pub trait GarbledTextDetector: Send + Sync {
    fn is_garbled(&self, text: &str) -> bool;
}

/// Default detector: catches the two failure shapes that actually show up
/// in ripped libraries.
///
/// - U+FFFD replacement characters left by a lossy decode.
/// - Latin-1 reinterpretation of UTF-8 multibyte sequences, which always
///   starts with Ã, Â, or a stray ï»¿ BOM triple.
#[derive(Debug, Default, Clone, Copy)]
pub struct MojibakeDetector;

impl GarbledTextDetector for MojibakeDetector {
    fn is_garbled(&self, text: &str) -> bool {
        if text.contains('\u{FFFD}') {
            return true;
        }
        // UTF-8 read as Latin-1: lead bytes 0xC2-0xC3 become Â/Ã followed
        // by another non-ASCII char.
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            if matches!(c, '\u{00C2}' | '\u{00C3}') {
                if let Some(next) = chars.peek() {
                    if !next.is_ascii() {
                        return true;
                    }
                }
            }
        }
        text.contains("\u{00EF}\u{00BB}\u{00BF}")
    }
}

/// Detector that flags nothing. Used in tests to isolate the completeness
/// component from encoding heuristics.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpDetector;

impl GarbledTextDetector for NoOpDetector {
    fn is_garbled(&self, _text: &str) -> bool {
        false
    }
}
