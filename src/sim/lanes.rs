//! Lane-count transitions on level-up
//!
//! Entering a level divisible by 3 widens the track to 4 lanes: a level banner,
//! then the track is cleared, then a 3-2-1 countdown during which the
//! simulation is frozen, then the new width applies. Leaving such a level
//! narrows back to 3 lanes instantly. Other level-ups are announcement only.

use crate::consts::{LANE_COUNTDOWN_SECS, LEVEL_ANNOUNCE_MS};

/// What a level-up does to the lane layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanePlan {
    /// Banner only
    Announce,
    /// Banner, clear, countdown, 4 lanes
    Expand,
    /// Instant clear and 3 lanes
    Contract,
}

impl LanePlan {
    pub fn for_level_up(previous_level: u32, new_level: u32, fixed_lanes: bool) -> Self {
        if fixed_lanes {
            LanePlan::Announce
        } else if new_level % 3 == 0 {
            LanePlan::Expand
        } else if previous_level % 3 == 0 {
            LanePlan::Contract
        } else {
            LanePlan::Announce
        }
    }
}

/// Side effect requested by [`LaneTransition::advance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneStep {
    /// Nothing to do this tick
    Idle,
    /// Banner finished: clear the track
    ClearTrack,
    /// Countdown moved to a new whole second
    Countdown(u32),
    /// Countdown finished: apply the new lane count
    Applied { lanes: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LaneTransition {
    #[default]
    Stable,
    Announcing {
        remaining_ms: f32,
        lanes: usize,
    },
    Warning {
        remaining_ms: f32,
        shown: u32,
        lanes: usize,
    },
}

impl LaneTransition {
    pub fn is_stable(&self) -> bool {
        matches!(self, LaneTransition::Stable)
    }

    /// Spawning halts for the whole transition
    pub fn blocks_spawning(&self) -> bool {
        !self.is_stable()
    }

    /// Rows are frozen during the countdown
    pub fn freezes_motion(&self) -> bool {
        matches!(self, LaneTransition::Warning { .. })
    }

    /// Seconds left on the countdown, if one is showing
    pub fn countdown(&self) -> Option<u32> {
        match self {
            LaneTransition::Warning { shown, .. } => Some(*shown),
            _ => None,
        }
    }

    pub fn begin_expansion(&mut self, lanes: usize) {
        *self = LaneTransition::Announcing {
            remaining_ms: LEVEL_ANNOUNCE_MS,
            lanes,
        };
    }

    pub fn advance(&mut self, dt_ms: f32) -> LaneStep {
        match *self {
            LaneTransition::Stable => LaneStep::Idle,
            LaneTransition::Announcing {
                remaining_ms,
                lanes,
            } => {
                let remaining_ms = remaining_ms - dt_ms;
                if remaining_ms > 0.0 {
                    *self = LaneTransition::Announcing {
                        remaining_ms,
                        lanes,
                    };
                    LaneStep::Idle
                } else {
                    *self = LaneTransition::Warning {
                        remaining_ms: LANE_COUNTDOWN_SECS as f32 * 1000.0,
                        shown: LANE_COUNTDOWN_SECS,
                        lanes,
                    };
                    LaneStep::ClearTrack
                }
            }
            LaneTransition::Warning {
                remaining_ms,
                shown,
                lanes,
            } => {
                let remaining_ms = remaining_ms - dt_ms;
                if remaining_ms <= 0.0 {
                    *self = LaneTransition::Stable;
                    return LaneStep::Applied { lanes };
                }
                let second = (remaining_ms / 1000.0).ceil() as u32;
                *self = LaneTransition::Warning {
                    remaining_ms,
                    shown: second,
                    lanes,
                };
                if second != shown {
                    LaneStep::Countdown(second)
                } else {
                    LaneStep::Idle
                }
            }
        }
    }
}
