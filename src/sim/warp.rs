//! Warp (reverse-time) phase machine
//!
//! `None -> Run1` on WARP pickup, `Run1 -> PrepReverse` when the set in flight
//! completes, `PrepReverse -> Run2` after a fixed delay, `Run2 -> None` once
//! the first row of the replayed set is resolved.

use serde::Serialize;

use crate::consts::WARP_PREP_DELAY_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarpPhase {
    #[default]
    None,
    /// Forward run through the warp set; rows are retained
    Run1,
    /// Announcement delay before the rewind
    PrepReverse,
    /// Rows replay backwards at half speed for bonus points
    Run2,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WarpState {
    phase: WarpPhase,
    prep_remaining_ms: f32,
}

impl WarpState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> WarpPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != WarpPhase::None
    }

    pub fn is_reverse(&self) -> bool {
        self.phase == WarpPhase::Run2
    }

    /// Off-screen rows are kept for the rewind
    pub fn retains_rows(&self) -> bool {
        matches!(self.phase, WarpPhase::Run1 | WarpPhase::PrepReverse)
    }

    pub fn direction(&self) -> f32 {
        if self.is_reverse() { -1.0 } else { 1.0 }
    }

    pub fn speed_multiplier(&self) -> f32 {
        if self.is_reverse() { 0.5 } else { 1.0 }
    }

    /// WARP pickup. A pickup during the prep delay or the rewind is ignored.
    pub fn begin(&mut self) -> bool {
        match self.phase {
            WarpPhase::None | WarpPhase::Run1 => {
                let changed = self.phase != WarpPhase::Run1;
                self.phase = WarpPhase::Run1;
                changed
            }
            WarpPhase::PrepReverse | WarpPhase::Run2 => false,
        }
    }

    /// A standard set finished. Returns true when this starts the prep delay.
    pub fn on_set_completed(&mut self) -> bool {
        if self.phase == WarpPhase::Run1 {
            self.phase = WarpPhase::PrepReverse;
            self.prep_remaining_ms = WARP_PREP_DELAY_MS;
            true
        } else {
            false
        }
    }

    /// Run the prep delay. Returns true on the tick the rewind starts; the
    /// caller must un-pass the retained rows.
    pub fn advance(&mut self, dt_ms: f32) -> bool {
        if self.phase != WarpPhase::PrepReverse {
            return false;
        }
        self.prep_remaining_ms -= dt_ms;
        if self.prep_remaining_ms <= 0.0 {
            self.prep_remaining_ms = 0.0;
            self.phase = WarpPhase::Run2;
            true
        } else {
            false
        }
    }

    /// The replayed set's first row was resolved
    pub fn finish(&mut self) -> bool {
        if self.phase == WarpPhase::Run2 {
            self.phase = WarpPhase::None;
            true
        } else {
            false
        }
    }
}
