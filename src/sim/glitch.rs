//! Seeded glitch text for the GLITCH effect
//!
//! Drops one or two interior letters and swaps some letters for look-alike
//! digits. Seeded per row/lane so an item glitches the same way for its whole
//! lifetime. The result lives inline (no heap) because it is computed during
//! row hydration.

use serde::{Serialize, Serializer};

/// Longest word we ever glitch (color names)
const GLITCH_CAPACITY: usize = 12;

/// Deterministic pseudo-random value in `[0, 1)` for a seed
pub fn seeded_random(seed: f64) -> f64 {
    let x = seed.sin() * 10000.0;
    x - x.floor()
}

fn leet(c: u8) -> Option<u8> {
    match c {
        b'A' => Some(b'4'),
        b'B' => Some(b'8'),
        b'E' => Some(b'3'),
        b'G' => Some(b'6'),
        b'I' => Some(b'1'),
        b'O' => Some(b'0'),
        b'S' => Some(b'5'),
        b'T' => Some(b'7'),
        b'Z' => Some(b'2'),
        _ => None,
    }
}

/// Inline glitched word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlitchText {
    bytes: [u8; GLITCH_CAPACITY],
    len: u8,
}

impl GlitchText {
    /// Glitch an ASCII word. Input beyond the inline capacity is truncated.
    pub fn new(text: &str, seed: u32) -> Self {
        let seed = seed as f64;
        let mut chars = [0u8; GLITCH_CAPACITY];
        let mut len = 0usize;
        for &b in text.as_bytes().iter().take(GLITCH_CAPACITY) {
            chars[len] = b;
            len += 1;
        }

        // Omission never touches the first or last letter
        if len > 3 {
            let omission = if seeded_random(seed) > 0.5 { 2 } else { 1 };
            let start = (seeded_random(seed + 1.0) * (len - 2) as f64).floor() as usize + 1;
            let count = omission.min(len - start - 1);
            chars.copy_within(start + count..len, start);
            len -= count;
            // Derived equality compares the whole buffer
            chars[len..].fill(0);
        }

        for (i, c) in chars[..len].iter_mut().enumerate() {
            if let Some(sub) = leet(*c) {
                if seeded_random(seed + i as f64 + 10.0) < 0.6 {
                    *c = sub;
                }
            }
        }

        Self {
            bytes: chars,
            len: len as u8,
        }
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Serialize for GlitchText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_random_in_unit_range() {
        for seed in 0..500 {
            let v = seeded_random(seed as f64);
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_glitch_is_deterministic() {
        let a = GlitchText::new("PURPLE", 42);
        let b = GlitchText::new("PURPLE", 42);
        assert_eq!(a, b);
        assert_eq!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_glitch_drops_one_or_two_letters() {
        for seed in 0..200 {
            let g = GlitchText::new("ORANGE", seed);
            assert!(g.len() == 4 || g.len() == 5, "seed {seed}: {}", g.as_str());
        }
    }

    #[test]
    fn test_glitch_keeps_first_and_last_letter_position() {
        // First letter is never omitted; it may only be substituted
        for seed in 0..200 {
            let g = GlitchText::new("GREEN", seed);
            let first = g.as_str().as_bytes()[0];
            assert!(first == b'G' || first == b'6');
            let last = *g.as_str().as_bytes().last().unwrap();
            assert_eq!(last, b'N');
        }
    }

    #[test]
    fn test_equal_text_means_equal_value() {
        for a in 0..60 {
            for b in 0..60 {
                let x = GlitchText::new("YELLOW", a);
                let y = GlitchText::new("YELLOW", b);
                assert_eq!(x == y, x.as_str() == y.as_str(), "seeds {a} {b}");
            }
        }
    }

    #[test]
    fn test_short_words_are_not_shortened() {
        let g = GlitchText::new("RED", 5);
        assert_eq!(g.len(), 3);
        assert!(g.as_str().ends_with('D'));
    }
}
