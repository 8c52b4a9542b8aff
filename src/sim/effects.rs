//! Power-up kinds and the active-effect state machine
//!
//! An effect is entered on crate pickup and cleared unconditionally when the
//! current obstacle set completes. WILD carries a concrete pair of kinds
//! resolved at pickup time. ALIAS (alone or inside a WILD pair) runs a short
//! rule respin before committing a new color rule.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::rule::{Color, Rule, RuleKind, generate_rule};
use crate::consts::ALIAS_SPIN_STEP_MS;

/// Crate power-ups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PowerUpKind {
    /// Rows move 50% faster
    Speed,
    /// Swaying track
    Drunk,
    /// Storm: track fades toward the top, lightning flashes
    Fog,
    /// Mirrored track; lane taps are inverted
    Dyslexia,
    /// Highlights the correct lane of the next row
    Gps,
    /// Cones partially hide lane items
    Blocker,
    /// Two random effects at once
    Wild,
    /// Corrupted word text (word rules only)
    Glitch,
    /// Washed-out ink (color rules only)
    Bleach,
    /// Rule target shown as a synonym, rule respun (color rules only)
    Alias,
    /// Reverse-time bonus run
    Warp,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 11] = [
        PowerUpKind::Speed,
        PowerUpKind::Drunk,
        PowerUpKind::Fog,
        PowerUpKind::Dyslexia,
        PowerUpKind::Gps,
        PowerUpKind::Blocker,
        PowerUpKind::Wild,
        PowerUpKind::Glitch,
        PowerUpKind::Bleach,
        PowerUpKind::Alias,
        PowerUpKind::Warp,
    ];

    /// Crate label shown on pickup
    pub fn label(&self) -> &'static str {
        match self {
            PowerUpKind::Speed => "SPEED",
            PowerUpKind::Drunk => "DRUNK",
            PowerUpKind::Fog => "STORM",
            PowerUpKind::Dyslexia => "SWAP",
            PowerUpKind::Gps => "GPS",
            PowerUpKind::Blocker => "BLOCK",
            PowerUpKind::Wild => "WILD",
            PowerUpKind::Glitch => "GLITCH",
            PowerUpKind::Bleach => "BLEACH",
            PowerUpKind::Alias => "ALIAS",
            PowerUpKind::Warp => "WARP",
        }
    }

    /// Points per correct hit while this effect is active.
    ///
    /// Harder effects pay more. WILD has no entry of its own: it pays the sum
    /// of its pair (see [`EffectState::points`]).
    pub fn score(&self) -> u32 {
        match self {
            PowerUpKind::Speed | PowerUpKind::Drunk | PowerUpKind::Fog | PowerUpKind::Blocker => 2,
            PowerUpKind::Dyslexia | PowerUpKind::Glitch | PowerUpKind::Bleach | PowerUpKind::Alias => 3,
            PowerUpKind::Gps | PowerUpKind::Warp | PowerUpKind::Wild => 1,
        }
    }

    /// Kinds that can only appear under one rule kind
    pub fn required_rule(&self) -> Option<RuleKind> {
        match self {
            PowerUpKind::Glitch => Some(RuleKind::MatchWord),
            PowerUpKind::Bleach | PowerUpKind::Alias => Some(RuleKind::MatchColor),
            _ => None,
        }
    }

    /// Whether a crate of this kind may spawn under `rule_kind`
    pub fn allowed_under(&self, rule_kind: RuleKind) -> bool {
        self.required_rule().is_none_or(|required| required == rule_kind)
    }

    /// Whether this kind can be one half of a WILD pair
    pub fn wild_eligible(&self) -> bool {
        !matches!(self, PowerUpKind::Wild | PowerUpKind::Warp)
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// Small copyable set of power-up kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PowerUpSet(u16);

impl PowerUpSet {
    pub const EMPTY: PowerUpSet = PowerUpSet(0);

    /// Every kind except `keep`
    pub fn all_except(keep: PowerUpKind) -> Self {
        let mut set = Self::EMPTY;
        for kind in PowerUpKind::ALL {
            if kind != keep {
                set.insert(kind);
            }
        }
        set
    }

    pub fn insert(&mut self, kind: PowerUpKind) {
        self.0 |= kind.bit();
    }

    pub fn contains(&self, kind: PowerUpKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<PowerUpKind> for PowerUpSet {
    fn from_iter<I: IntoIterator<Item = PowerUpKind>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

/// Currently active power-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "kinds")]
pub enum EffectState {
    #[default]
    None,
    Single(PowerUpKind),
    Wild(PowerUpKind, PowerUpKind),
}

impl EffectState {
    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        match *self {
            EffectState::None => false,
            EffectState::Single(k) => k == kind,
            EffectState::Wild(a, b) => kind == PowerUpKind::Wild || a == kind || b == kind,
        }
    }

    /// Points per correct hit
    pub fn points(&self) -> u32 {
        match *self {
            EffectState::None => 1,
            EffectState::Single(k) => k.score(),
            EffectState::Wild(a, b) => a.score() + b.score(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EffectState::None => "NONE",
            EffectState::Single(k) => k.label(),
            EffectState::Wild(..) => PowerUpKind::Wild.label(),
        }
    }

    pub fn flags(&self) -> EffectFlags {
        EffectFlags {
            speed_multiplier: if self.is_active(PowerUpKind::Speed) { 1.5 } else { 1.0 },
            lanes_inverted: self.is_active(PowerUpKind::Dyslexia),
            fog: self.is_active(PowerUpKind::Fog),
            drunk: self.is_active(PowerUpKind::Drunk),
            gps: self.is_active(PowerUpKind::Gps),
            blocker: self.is_active(PowerUpKind::Blocker),
            glitch: self.is_active(PowerUpKind::Glitch),
            bleach: self.is_active(PowerUpKind::Bleach),
            alias: self.is_active(PowerUpKind::Alias),
        }
    }
}

/// Auxiliary flags implied by the active effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectFlags {
    pub speed_multiplier: f32,
    pub lanes_inverted: bool,
    pub fog: bool,
    pub drunk: bool,
    pub gps: bool,
    pub blocker: bool,
    pub glitch: bool,
    pub bleach: bool,
    pub alias: bool,
}

/// Resolve the concrete pair for a WILD pickup.
///
/// Samples two distinct kinds valid under `rule_kind`, skipping disabled
/// kinds unless that leaves fewer than two candidates.
pub fn resolve_wild<R: Rng + ?Sized>(
    rng: &mut R,
    rule_kind: RuleKind,
    disabled: PowerUpSet,
) -> (PowerUpKind, PowerUpKind) {
    let mut pool = [PowerUpKind::Speed; PowerUpKind::ALL.len()];
    let mut len = 0;
    for kind in PowerUpKind::ALL {
        if kind.wild_eligible() && kind.allowed_under(rule_kind) && !disabled.contains(kind) {
            pool[len] = kind;
            len += 1;
        }
    }
    if len < 2 {
        len = 0;
        for kind in PowerUpKind::ALL {
            if kind.wild_eligible() && kind.allowed_under(rule_kind) {
                pool[len] = kind;
                len += 1;
            }
        }
    }

    let candidates = &mut pool[..len];
    candidates.shuffle(rng);
    (candidates[0], candidates[1])
}

/// Output of one respin step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinStep {
    /// Briefly shown decoy rule
    Transient(Rule),
    /// Rule to commit and apply to in-flight rows
    Final(Rule),
}

/// ALIAS respin sub-sequence: two transient color rules, then the final one
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AliasSpin {
    origin: Color,
    elapsed_ms: f32,
    steps_done: u8,
}

impl AliasSpin {
    const STEPS: u8 = 3;

    pub fn new(origin: Color) -> Self {
        Self {
            origin,
            elapsed_ms: 0.0,
            steps_done: 0,
        }
    }

    /// Advance the spin clock. Returns the latest step reached this call.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R, dt_ms: f32) -> Option<SpinStep> {
        self.elapsed_ms += dt_ms;
        let mut latest = None;
        while self.steps_done < Self::STEPS
            && self.elapsed_ms >= self.steps_done as f32 * ALIAS_SPIN_STEP_MS
        {
            let rule = generate_rule(
                rng,
                Some(Rule::new(RuleKind::MatchColor, self.origin)),
                Some(RuleKind::MatchColor),
            );
            self.steps_done += 1;
            latest = Some(if self.steps_done == Self::STEPS {
                SpinStep::Final(rule)
            } else {
                SpinStep::Transient(rule)
            });
        }
        latest
    }

    pub fn is_finished(&self) -> bool {
        self.steps_done >= Self::STEPS
    }
}

/// Active effect plus any running respin
#[derive(Debug, Clone, Default)]
pub struct EffectMachine {
    state: EffectState,
    spin: Option<AliasSpin>,
}

impl EffectMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> EffectState {
        self.state
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.state.is_active(kind)
    }

    pub fn is_spinning(&self) -> bool {
        self.spin.is_some()
    }

    /// Enter an effect from a crate pickup. WARP is owned by the warp machine
    /// and is ignored here.
    pub fn apply_pickup<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        kind: PowerUpKind,
        rule: Rule,
        disabled: PowerUpSet,
    ) -> EffectState {
        self.state = match kind {
            PowerUpKind::Warp => return self.state,
            PowerUpKind::Wild => {
                let (a, b) = resolve_wild(rng, rule.kind, disabled);
                EffectState::Wild(a, b)
            }
            other => EffectState::Single(other),
        };
        if self.state.is_active(PowerUpKind::Alias) {
            self.spin = Some(AliasSpin::new(rule.target));
        }
        self.state
    }

    /// Advance a running respin
    pub fn advance_spin<R: Rng + ?Sized>(&mut self, rng: &mut R, dt_ms: f32) -> Option<SpinStep> {
        let spin = self.spin.as_mut()?;
        let step = spin.advance(rng, dt_ms);
        if spin.is_finished() {
            self.spin = None;
        }
        step
    }

    /// Clear on set completion. Returns true if anything was active.
    pub fn clear(&mut self) -> bool {
        let was_active = self.state != EffectState::None || self.spin.is_some();
        self.state = EffectState::None;
        self.spin = None;
        was_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_score_table() {
        assert_eq!(EffectState::None.points(), 1);
        assert_eq!(EffectState::Single(PowerUpKind::Speed).points(), 2);
        assert_eq!(EffectState::Single(PowerUpKind::Alias).points(), 3);
        assert_eq!(
            EffectState::Wild(PowerUpKind::Dyslexia, PowerUpKind::Gps).points(),
            4
        );
    }

    #[test]
    fn test_wild_reports_both_halves() {
        let wild = EffectState::Wild(PowerUpKind::Fog, PowerUpKind::Speed);
        assert!(wild.is_active(PowerUpKind::Wild));
        assert!(wild.is_active(PowerUpKind::Fog));
        assert!(wild.is_active(PowerUpKind::Speed));
        assert!(!wild.is_active(PowerUpKind::Gps));
        assert_eq!(wild.flags().speed_multiplier, 1.5);
    }

    #[test]
    fn test_resolve_wild_distinct_and_rule_aware() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..300 {
            let (a, b) = resolve_wild(&mut rng, RuleKind::MatchWord, PowerUpSet::EMPTY);
            assert_ne!(a, b);
            for k in [a, b] {
                assert!(k.wild_eligible());
                assert!(k.allowed_under(RuleKind::MatchWord));
            }
        }
    }

    #[test]
    fn test_resolve_wild_skips_disabled() {
        let mut rng = Pcg32::seed_from_u64(2);
        let disabled: PowerUpSet = [PowerUpKind::Speed, PowerUpKind::Fog, PowerUpKind::Gps]
            .into_iter()
            .collect();
        for _ in 0..300 {
            let (a, b) = resolve_wild(&mut rng, RuleKind::MatchColor, disabled);
            assert!(!disabled.contains(a));
            assert!(!disabled.contains(b));
        }
    }

    #[test]
    fn test_resolve_wild_falls_back_when_too_few_enabled() {
        let mut rng = Pcg32::seed_from_u64(3);
        let disabled = PowerUpSet::all_except(PowerUpKind::Speed);
        let (a, b) = resolve_wild(&mut rng, RuleKind::MatchColor, disabled);
        assert_ne!(a, b);
    }

    #[test]
    fn test_alias_pickup_runs_three_step_spin() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut machine = EffectMachine::new();
        let rule = Rule::new(RuleKind::MatchColor, Color::Blue);
        machine.apply_pickup(&mut rng, PowerUpKind::Alias, rule, PowerUpSet::EMPTY);
        assert!(machine.is_spinning());

        assert!(matches!(
            machine.advance_spin(&mut rng, 0.0),
            Some(SpinStep::Transient(_))
        ));
        assert!(matches!(
            machine.advance_spin(&mut rng, ALIAS_SPIN_STEP_MS),
            Some(SpinStep::Transient(_))
        ));
        match machine.advance_spin(&mut rng, ALIAS_SPIN_STEP_MS) {
            Some(SpinStep::Final(r)) => {
                assert_eq!(r.kind, RuleKind::MatchColor);
                assert_ne!(r.target, Color::Blue);
            }
            other => panic!("expected final step, got {other:?}"),
        }
        assert!(!machine.is_spinning());
        assert!(machine.is_active(PowerUpKind::Alias));
    }

    #[test]
    fn test_large_step_jumps_to_final() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut spin = AliasSpin::new(Color::Red);
        assert!(matches!(spin.advance(&mut rng, 1000.0), Some(SpinStep::Final(_))));
        assert!(spin.is_finished());
    }

    #[test]
    fn test_warp_pickup_leaves_effect_untouched() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut machine = EffectMachine::new();
        let rule = Rule::new(RuleKind::MatchWord, Color::Green);
        machine.apply_pickup(&mut rng, PowerUpKind::Gps, rule, PowerUpSet::EMPTY);
        machine.apply_pickup(&mut rng, PowerUpKind::Warp, rule, PowerUpSet::EMPTY);
        assert_eq!(machine.state(), EffectState::Single(PowerUpKind::Gps));
    }

    #[test]
    fn test_clear() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut machine = EffectMachine::new();
        assert!(!machine.clear());
        let rule = Rule::new(RuleKind::MatchColor, Color::Red);
        machine.apply_pickup(&mut rng, PowerUpKind::Alias, rule, PowerUpSet::EMPTY);
        assert!(machine.clear());
        assert_eq!(machine.state(), EffectState::None);
        assert!(!machine.is_spinning());
    }
}
