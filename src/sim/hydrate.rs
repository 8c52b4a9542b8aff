//! Row hydration: fills a pool slot's lane items in place
//!
//! Standard rows carry Stroop pairs with exactly one correct lane. Crate rows
//! carry distinct power-ups with exactly one deliberately empty lane.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

use super::effects::{PowerUpKind, PowerUpSet};
use super::glitch::GlitchText;
use super::rule::{Color, Rule, RuleKind, random_color};
use crate::consts::MAX_LANES;

/// Chance the correct item's free attribute disagrees with the target
const CORRECT_MISMATCH_CHANCE: f64 = 0.7;
/// Chance a wrong item's free attribute is set to the target anyway
const DECOY_CHANCE: f64 = 0.5;

/// Stroop pair in a standard row
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StroopItem {
    /// Ink color
    pub display_color: Color,
    /// Written word
    pub word_text: Color,
    pub is_correct: bool,
    pub is_hit: bool,
    /// Precomputed GLITCH rendering of `word_text`
    pub glitch_text: GlitchText,
}

/// Power-up crate in a crate row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrateItem {
    pub effect: PowerUpKind,
    pub is_hit: bool,
}

/// One lane of a row
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LaneItem {
    /// Nothing here: no visual, no collision
    #[default]
    Empty,
    Stroop(StroopItem),
    Crate(CrateItem),
}

impl LaneItem {
    pub fn is_empty(&self) -> bool {
        matches!(self, LaneItem::Empty)
    }

    /// True for the correct Stroop item; crates count as always-correct pickups
    pub fn is_correct(&self) -> bool {
        match self {
            LaneItem::Empty => false,
            LaneItem::Stroop(item) => item.is_correct,
            LaneItem::Crate(_) => true,
        }
    }

    pub fn is_hit(&self) -> bool {
        match self {
            LaneItem::Empty => false,
            LaneItem::Stroop(item) => item.is_hit,
            LaneItem::Crate(item) => item.is_hit,
        }
    }

    pub fn set_hit(&mut self, hit: bool) {
        match self {
            LaneItem::Empty => {}
            LaneItem::Stroop(item) => item.is_hit = hit,
            LaneItem::Crate(item) => item.is_hit = hit,
        }
    }

    pub fn effect(&self) -> Option<PowerUpKind> {
        match self {
            LaneItem::Crate(item) => Some(item.effect),
            _ => None,
        }
    }
}

/// Glitch seed for a lane of a row
pub fn glitch_seed(row_id: u32, lane: usize) -> u32 {
    row_id.wrapping_add(lane as u32 * 10)
}

fn stroop_item<R: Rng + ?Sized>(rng: &mut R, correct: bool, rule: Rule, seed: u32) -> StroopItem {
    let target = rule.target;
    // `ruled` is the attribute the rule looks at, `free` the other one
    let (ruled, free) = if correct {
        let free = if rng.random_bool(CORRECT_MISMATCH_CHANCE) {
            random_color(rng, Some(target))
        } else {
            target
        };
        (target, free)
    } else {
        let ruled = random_color(rng, Some(target));
        let free = if rng.random_bool(DECOY_CHANCE) {
            target
        } else {
            random_color(rng, None)
        };
        (ruled, free)
    };

    let (display_color, word_text) = match rule.kind {
        RuleKind::MatchColor => (ruled, free),
        RuleKind::MatchWord => (free, ruled),
    };

    StroopItem {
        display_color,
        word_text,
        is_correct: correct,
        is_hit: false,
        glitch_text: GlitchText::new(word_text.name(), seed),
    }
}

/// Fill a standard row: one uniformly chosen correct lane, decoys elsewhere,
/// lanes at or beyond `lanes` emptied.
pub fn hydrate_standard_row<R: Rng + ?Sized>(
    rng: &mut R,
    items: &mut [LaneItem; MAX_LANES],
    rule: Rule,
    lanes: usize,
    row_id: u32,
) {
    let lanes = lanes.clamp(1, MAX_LANES);
    let correct_lane = rng.random_range(0..lanes);

    for (lane, item) in items.iter_mut().enumerate() {
        *item = if lane < lanes {
            LaneItem::Stroop(stroop_item(
                rng,
                lane == correct_lane,
                rule,
                glitch_seed(row_id, lane),
            ))
        } else {
            LaneItem::Empty
        };
    }
}

/// Fill a crate row: one uniformly chosen empty lane, distinct shuffled
/// power-ups in the rest. Lanes left over once the candidates run out stay
/// empty.
pub fn hydrate_crate_row<R: Rng + ?Sized>(
    rng: &mut R,
    items: &mut [LaneItem; MAX_LANES],
    rule_kind: RuleKind,
    lanes: usize,
    disabled: PowerUpSet,
) {
    let lanes = lanes.clamp(1, MAX_LANES);
    let empty_lane = rng.random_range(0..lanes);

    let mut pool = [PowerUpKind::Speed; PowerUpKind::ALL.len()];
    let mut len = 0;
    for kind in PowerUpKind::ALL {
        if kind.allowed_under(rule_kind) && !disabled.contains(kind) {
            pool[len] = kind;
            len += 1;
        }
    }
    let candidates = &mut pool[..len];
    candidates.shuffle(rng);

    let mut next = candidates.iter().copied();
    for (lane, item) in items.iter_mut().enumerate() {
        *item = if lane >= lanes || lane == empty_lane {
            LaneItem::Empty
        } else {
            match next.next() {
                Some(effect) => LaneItem::Crate(CrateItem {
                    effect,
                    is_hit: false,
                }),
                None => LaneItem::Empty,
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn items() -> [LaneItem; MAX_LANES] {
        [LaneItem::Empty; MAX_LANES]
    }

    fn rule_strategy() -> impl Strategy<Value = Rule> {
        (
            prop_oneof![Just(RuleKind::MatchColor), Just(RuleKind::MatchWord)],
            0usize..7,
        )
            .prop_map(|(kind, c)| Rule::new(kind, crate::sim::rule::ALL_COLORS[c]))
    }

    #[test]
    fn test_correct_item_matches_rule_dimension() {
        let mut rng = Pcg32::seed_from_u64(10);
        let rule = Rule::new(RuleKind::MatchWord, Color::Green);
        let mut row = items();
        for id in 0..200 {
            hydrate_standard_row(&mut rng, &mut row, rule, 3, id);
            for item in &row {
                if let LaneItem::Stroop(s) = item {
                    if s.is_correct {
                        assert_eq!(s.word_text, Color::Green);
                    } else {
                        assert_ne!(s.word_text, Color::Green);
                    }
                }
            }
        }
    }

    #[test]
    fn test_correct_item_usually_mismatched() {
        let mut rng = Pcg32::seed_from_u64(12);
        let rule = Rule::new(RuleKind::MatchColor, Color::Red);
        let mut row = items();
        let mut mismatched = 0;
        for id in 0..1000 {
            hydrate_standard_row(&mut rng, &mut row, rule, 3, id);
            let correct = row
                .iter()
                .find_map(|i| match i {
                    LaneItem::Stroop(s) if s.is_correct => Some(*s),
                    _ => None,
                })
                .unwrap();
            if correct.word_text != correct.display_color {
                mismatched += 1;
            }
        }
        assert!((600..800).contains(&mismatched), "mismatched = {mismatched}");
    }

    #[test]
    fn test_glitch_text_is_seeded_by_row_and_lane() {
        let mut rng = Pcg32::seed_from_u64(13);
        let rule = Rule::new(RuleKind::MatchWord, Color::Purple);
        let mut row = items();
        hydrate_standard_row(&mut rng, &mut row, rule, 4, 77);
        for (lane, item) in row.iter().enumerate() {
            if let LaneItem::Stroop(s) = item {
                let expected = GlitchText::new(s.word_text.name(), glitch_seed(77, lane));
                assert_eq!(s.glitch_text, expected);
            }
        }
    }

    #[test]
    fn test_crate_pool_is_rule_aware() {
        let mut rng = Pcg32::seed_from_u64(14);
        let mut row = items();
        for _ in 0..300 {
            hydrate_crate_row(&mut rng, &mut row, RuleKind::MatchWord, 4, PowerUpSet::EMPTY);
            for item in &row {
                if let Some(kind) = item.effect() {
                    assert!(kind != PowerUpKind::Bleach && kind != PowerUpKind::Alias);
                }
            }
        }
    }

    #[test]
    fn test_crate_respects_disabled_kinds() {
        let mut rng = Pcg32::seed_from_u64(15);
        let mut row = items();
        let disabled = PowerUpSet::all_except(PowerUpKind::Warp);
        for _ in 0..50 {
            hydrate_crate_row(&mut rng, &mut row, RuleKind::MatchColor, 3, disabled);
            let kinds: Vec<_> = row.iter().filter_map(|i| i.effect()).collect();
            assert_eq!(kinds, vec![PowerUpKind::Warp]);
            assert_eq!(row.iter().filter(|i| i.is_empty()).count(), MAX_LANES - 1);
        }
    }

    #[test]
    fn test_crate_with_everything_disabled_is_all_empty() {
        let mut rng = Pcg32::seed_from_u64(16);
        let mut row = items();
        let disabled: PowerUpSet = PowerUpKind::ALL.into_iter().collect();
        hydrate_crate_row(&mut rng, &mut row, RuleKind::MatchColor, 4, disabled);
        assert!(row.iter().all(|i| i.is_empty()));
    }

    proptest! {
        #[test]
        fn prop_exactly_one_correct_lane(
            seed in any::<u64>(),
            rule in rule_strategy(),
            lanes in 3usize..=4,
            row_id in any::<u32>(),
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut row = items();
            hydrate_standard_row(&mut rng, &mut row, rule, lanes, row_id);

            let correct = row.iter().filter(|i| !i.is_empty() && i.is_correct()).count();
            prop_assert_eq!(correct, 1);
            for item in &row[..lanes] {
                prop_assert!(!item.is_empty());
            }
            for item in &row[lanes..] {
                prop_assert!(item.is_empty());
            }
        }

        #[test]
        fn prop_crate_gap_invariant(
            seed in any::<u64>(),
            rule in rule_strategy(),
            lanes in 3usize..=4,
            disabled_bits in proptest::collection::vec(any::<bool>(), 11),
        ) {
            let disabled: PowerUpSet = PowerUpKind::ALL
                .into_iter()
                .zip(disabled_bits)
                .filter_map(|(k, off)| off.then_some(k))
                .collect();
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut row = items();
            hydrate_crate_row(&mut rng, &mut row, rule.kind, lanes, disabled);

            let kinds: Vec<_> = row.iter().filter_map(|i| i.effect()).collect();
            let mut unique = kinds.clone();
            unique.sort();
            unique.dedup();
            prop_assert_eq!(unique.len(), kinds.len());
            prop_assert!(kinds.len() < lanes);
            if disabled.is_empty() {
                let gaps = row[..lanes].iter().filter(|i| i.is_empty()).count();
                prop_assert_eq!(gaps, 1);
            }
            for kind in &kinds {
                prop_assert!(!disabled.contains(*kind));
                prop_assert!(kind.allowed_under(rule.kind));
            }
            for item in &row[lanes..] {
                prop_assert!(item.is_empty());
            }
        }
    }
}
