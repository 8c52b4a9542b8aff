//! Fixed-capacity row pool
//!
//! Rows are allocated once. Spawning re-hydrates an inactive slot in place and
//! releasing only flips `active`, so steady-state play never allocates.

use rand::Rng;
use serde::Serialize;

use super::effects::PowerUpSet;
use super::hydrate::{LaneItem, hydrate_crate_row, hydrate_standard_row};
use super::rule::{Color, Rule, RuleKind};
use crate::consts::{MAX_LANES, POOL_SIZE, SPAWN_Y};

/// Row flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowKind {
    Standard,
    Crate,
}

/// One pool slot
#[derive(Debug, Clone, Serialize)]
pub struct Row {
    pub id: u32,
    /// Vertical position (track-percent)
    pub y: f32,
    pub items: [LaneItem; MAX_LANES],
    pub active: bool,
    pub passed: bool,
    pub rule: Rule,
    /// 1-based position inside its set (0 for crates)
    pub set_index: u32,
    /// Rows in its set (0 for crates)
    pub set_size: u32,
    pub kind: RowKind,
    /// Practice guidance highlights the correct lane
    pub is_guided: bool,
    /// Empty run-up drawn behind the first row of a set
    pub transition_gap_height: f32,
}

impl Row {
    fn idle(slot: usize) -> Self {
        Self {
            // Idle slots get distinct placeholder ids so hosts can key on them
            id: u32::MAX - slot as u32,
            y: SPAWN_Y,
            items: [LaneItem::Empty; MAX_LANES],
            active: false,
            passed: false,
            rule: Rule::new(RuleKind::MatchColor, Color::Red),
            set_index: 0,
            set_size: 0,
            kind: RowKind::Standard,
            is_guided: false,
            transition_gap_height: 0.0,
        }
    }

    /// Reuse this slot as a standard row
    #[allow(clippy::too_many_arguments)]
    pub fn reset_standard<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        id: u32,
        rule: Rule,
        set_index: u32,
        set_size: u32,
        transition_gap_height: f32,
        lanes: usize,
    ) {
        self.id = id;
        self.y = SPAWN_Y;
        self.active = true;
        self.passed = false;
        self.rule = rule;
        self.set_index = set_index;
        self.set_size = set_size;
        self.kind = RowKind::Standard;
        self.is_guided = false;
        self.transition_gap_height = transition_gap_height;
        hydrate_standard_row(rng, &mut self.items, rule, lanes, id);
    }

    /// Reuse this slot as a crate row
    pub fn reset_crate<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        id: u32,
        rule: Rule,
        lanes: usize,
        disabled: PowerUpSet,
    ) {
        self.id = id;
        self.y = SPAWN_Y;
        self.active = true;
        self.passed = false;
        self.rule = rule;
        self.set_index = 0;
        self.set_size = 0;
        self.kind = RowKind::Crate;
        self.is_guided = false;
        self.transition_gap_height = 0.0;
        hydrate_crate_row(rng, &mut self.items, rule.kind, lanes, disabled);
    }

    /// Last standard row of its set
    pub fn completes_set(&self) -> bool {
        self.kind == RowKind::Standard && self.set_size > 0 && self.set_index == self.set_size
    }

    /// Lane of the correct item, if any
    pub fn correct_lane(&self) -> Option<usize> {
        self.items.iter().position(|i| !i.is_empty() && i.is_correct())
    }

    /// Clear passed/hit marks so the row can be resolved again
    pub fn unpass(&mut self) {
        self.passed = false;
        for item in self.items.iter_mut() {
            item.set_hit(false);
        }
    }
}

/// Pre-allocated row slots
#[derive(Debug, Clone, Serialize)]
pub struct ObstaclePool {
    rows: Vec<Row>,
}

impl Default for ObstaclePool {
    fn default() -> Self {
        Self::new()
    }
}

impl ObstaclePool {
    pub fn new() -> Self {
        Self::with_capacity(POOL_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: (0..capacity).map(Row::idle).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.rows.len()
    }

    /// Index of the first free slot; `None` means back off and retry next tick
    pub fn acquire(&self) -> Option<usize> {
        self.rows.iter().position(|r| !r.active)
    }

    /// Free a slot. Released rows carry no passed or hit marks.
    pub fn release(&mut self, index: usize) {
        if let Some(row) = self.rows.get_mut(index) {
            row.active = false;
            row.unpass();
        }
    }

    pub fn release_all(&mut self) {
        for row in self.rows.iter_mut() {
            row.active = false;
            row.unpass();
        }
    }

    pub fn active_count(&self) -> usize {
        self.rows.iter().filter(|r| r.active).count()
    }

    pub fn row(&self, index: usize) -> &Row {
        &self.rows[index]
    }

    pub fn row_mut(&mut self, index: usize) -> &mut Row {
        &mut self.rows[index]
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    pub fn active(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|r| r.active)
    }
}
