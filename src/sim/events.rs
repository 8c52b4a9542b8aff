//! Outbound notifications and the floating-text queue
//!
//! The simulation never calls into presentation. Everything a host might
//! render, play or vibrate is pushed here during a tick and drained afterwards.

use std::collections::VecDeque;

use serde::Serialize;

use super::effects::EffectState;
use super::rule::Rule;
use super::warp::WarpPhase;
use crate::consts::{FLOATING_TEXT_CAPACITY, FLOATING_TEXT_TTL_MS};

/// Color hint for floating text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextStyle {
    /// Score popups, "SAVED!", "WILD MODE!"
    Plain,
    /// Crate labels and velocity surges
    Accent,
    /// Warp announcements
    Warp,
}

/// A short-lived label anchored to a lane
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloatingText {
    pub lane: usize,
    pub y: f32,
    pub text: String,
    pub style: TextStyle,
    /// Time left before it expires (ms)
    pub remaining_ms: f32,
}

/// Bounded queue of live floating text. Oldest entries are dropped first.
#[derive(Debug, Clone, Default)]
pub struct FloatingTextQueue {
    entries: VecDeque<FloatingText>,
}

impl FloatingTextQueue {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(FLOATING_TEXT_CAPACITY),
        }
    }

    pub fn push(&mut self, lane: usize, y: f32, text: String, style: TextStyle) -> FloatingText {
        if self.entries.len() == FLOATING_TEXT_CAPACITY {
            self.entries.pop_front();
        }
        let entry = FloatingText {
            lane,
            y,
            text,
            style,
            remaining_ms: FLOATING_TEXT_TTL_MS,
        };
        self.entries.push_back(entry.clone());
        entry
    }

    /// Age every entry and drop the expired ones
    pub fn advance(&mut self, dt_ms: f32) {
        for entry in self.entries.iter_mut() {
            entry.remaining_ms -= dt_ms;
        }
        self.entries.retain(|e| e.remaining_ms > 0.0);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FloatingText> {
        self.entries.iter()
    }
}

/// One-way notification for the host
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    ScoreChanged { score: u64, delta: u32 },
    GameOver { final_score: u64, elapsed_ms: f64 },
    LifeGained { lives: u32 },
    LifeLost { lives: u32 },
    LevelChanged { level: u32 },
    LaneCountChanged { lanes: usize },
    RuleChanged { rule: Rule, display_text: String },
    EffectChanged { effect: EffectState },
    WarpPhaseChanged { phase: WarpPhase },
    VelocitySurge { speed: f32 },
    FloatingText(FloatingText),
    /// Lane expansion countdown; 0 means "GO"
    Countdown { value: u32 },
    HapticPulse { ms: u32 },
    /// Practice guidance finished its guided sets
    GuidanceEnded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_is_bounded() {
        let mut queue = FloatingTextQueue::new();
        for i in 0..FLOATING_TEXT_CAPACITY + 4 {
            queue.push(0, 80.0, format!("+{i}"), TextStyle::Plain);
        }
        assert_eq!(queue.len(), FLOATING_TEXT_CAPACITY);
        assert_eq!(queue.iter().next().map(|e| e.text.as_str()), Some("+4"));
    }

    #[test]
    fn test_entries_expire() {
        let mut queue = FloatingTextQueue::new();
        queue.push(1, 60.0, "VELOCITY SURGE".into(), TextStyle::Accent);
        queue.advance(FLOATING_TEXT_TTL_MS / 2.0);
        assert_eq!(queue.len(), 1);
        queue.push(2, 85.0, "+1".into(), TextStyle::Plain);
        queue.advance(FLOATING_TEXT_TTL_MS / 2.0);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.iter().next().map(|e| e.lane), Some(2));
    }

    #[test]
    fn test_event_json_is_tagged() {
        let json = serde_json::to_string(&GameEvent::LifeGained { lives: 2 }).unwrap();
        assert_eq!(json, r#"{"type":"life_gained","lives":2}"#);
    }
}
