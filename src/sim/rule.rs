//! Stroop rules: palette, rule generation and type alternation

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Playable ink/word colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
    White,
}

/// Full palette, in declaration order
pub const ALL_COLORS: [Color; 7] = [
    Color::Red,
    Color::Blue,
    Color::Green,
    Color::Yellow,
    Color::Purple,
    Color::Orange,
    Color::White,
];

impl Color {
    /// Word shown on a lane item
    pub fn name(&self) -> &'static str {
        match self {
            Color::Red => "RED",
            Color::Blue => "BLUE",
            Color::Green => "GREEN",
            Color::Yellow => "YELLOW",
            Color::Purple => "PURPLE",
            Color::Orange => "ORANGE",
            Color::White => "WHITE",
        }
    }

    /// Synonyms the ALIAS effect shows in place of the color name
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Color::Red => &["CRIMSON", "SCARLET", "RUBY"],
            Color::Blue => &["AZURE", "NAVY", "COBALT"],
            Color::Green => &["EMERALD", "LIME", "JADE"],
            Color::Yellow => &["GOLD", "LEMON", "AMBER"],
            Color::Purple => &["VIOLET", "LILAC", "PLUM"],
            Color::Orange => &["TANGERINE", "CORAL", "APRICOT"],
            Color::White => &["IVORY", "SNOW", "PEARL"],
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Pick a random color, optionally never returning `exclude`
pub fn random_color<R: Rng + ?Sized>(rng: &mut R, exclude: Option<Color>) -> Color {
    match exclude {
        None => ALL_COLORS[rng.random_range(0..ALL_COLORS.len())],
        Some(skip) => {
            // Sample from the palette minus one slot, then shift past the excluded index
            let idx = rng.random_range(0..ALL_COLORS.len() - 1);
            if idx >= skip.index() {
                ALL_COLORS[idx + 1]
            } else {
                ALL_COLORS[idx]
            }
        }
    }
}

/// Which attribute of a lane item the rule matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleKind {
    /// Match the ink color
    MatchColor,
    /// Match the written word
    MatchWord,
}

impl RuleKind {
    pub fn opposite(self) -> Self {
        match self {
            RuleKind::MatchColor => RuleKind::MatchWord,
            RuleKind::MatchWord => RuleKind::MatchColor,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::MatchColor => "COLOR",
            RuleKind::MatchWord => "WORD",
        }
    }
}

/// A match rule. Never mutated: a new rule replaces the active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    pub kind: RuleKind,
    pub target: Color,
}

impl Rule {
    pub fn new(kind: RuleKind, target: Color) -> Self {
        Self { kind, target }
    }
}

/// Generate a rule that differs from `previous` in kind or target color.
///
/// `forced` pins the kind; otherwise it is a fair coin flip.
pub fn generate_rule<R: Rng + ?Sized>(
    rng: &mut R,
    previous: Option<Rule>,
    forced: Option<RuleKind>,
) -> Rule {
    loop {
        let kind = forced.unwrap_or_else(|| {
            if rng.random_bool(0.5) {
                RuleKind::MatchColor
            } else {
                RuleKind::MatchWord
            }
        });
        let rule = Rule::new(kind, random_color(rng, None));
        if previous != Some(rule) {
            return rule;
        }
    }
}

/// Last two rule kinds, used to break up long same-kind runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleHistory {
    recent: [Option<RuleKind>; 2],
}

impl RuleHistory {
    pub fn new(first: RuleKind) -> Self {
        Self {
            recent: [None, Some(first)],
        }
    }

    pub fn push(&mut self, kind: RuleKind) {
        self.recent = [self.recent[1], Some(kind)];
    }

    /// Opposite kind when the last two entries match
    pub fn forced_kind(&self) -> Option<RuleKind> {
        match self.recent {
            [Some(a), Some(b)] if a == b => Some(b.opposite()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_random_color_respects_exclusion() {
        let mut rng = Pcg32::seed_from_u64(7);
        for skip in ALL_COLORS {
            for _ in 0..200 {
                assert_ne!(random_color(&mut rng, Some(skip)), skip);
            }
        }
    }

    #[test]
    fn test_random_color_reaches_every_other_color() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut seen = [false; 7];
        for _ in 0..1000 {
            seen[random_color(&mut rng, Some(Color::Red)).index()] = true;
        }
        assert!(!seen[Color::Red.index()]);
        assert!(seen.iter().skip(1).all(|s| *s));
    }

    #[test]
    fn test_forced_kind_is_honored() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..100 {
            let rule = generate_rule(&mut rng, None, Some(RuleKind::MatchWord));
            assert_eq!(rule.kind, RuleKind::MatchWord);
        }
    }

    #[test]
    fn test_history_forces_alternation() {
        let mut history = RuleHistory::new(RuleKind::MatchColor);
        assert_eq!(history.forced_kind(), None);

        history.push(RuleKind::MatchColor);
        assert_eq!(history.forced_kind(), Some(RuleKind::MatchWord));

        history.push(RuleKind::MatchWord);
        assert_eq!(history.forced_kind(), None);

        history.push(RuleKind::MatchWord);
        assert_eq!(history.forced_kind(), Some(RuleKind::MatchColor));
    }

    proptest! {
        #[test]
        fn prop_no_immediate_repeat(seed in any::<u64>(), forced in proptest::option::of(prop_oneof![
            Just(RuleKind::MatchColor),
            Just(RuleKind::MatchWord),
        ])) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut prev = generate_rule(&mut rng, None, forced);
            for _ in 0..50 {
                let next = generate_rule(&mut rng, Some(prev), forced);
                prop_assert_ne!(next, prev);
                prev = next;
            }
        }
    }
}
