//! Stroop Rider - a lane-switching Stroop reflex game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (row pool, rules, collisions, effects, warp)
//! - `audio`: Sound cue vocabulary and the injected audio sink
//! - `settings`: Player preferences and practice configuration
//! - `highscores`: Leaderboard fed from game-over results

pub mod audio;
pub mod error;
pub mod highscores;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use audio::{AudioCue, AudioSink, NullAudio, SoundEffect};
pub use error::StorageError;
pub use highscores::HighScores;
pub use settings::{PracticeConfig, PracticeMode, Settings};

/// Game configuration constants
///
/// Vertical positions are percentages of the track height (0 = top edge,
/// 100 = bottom edge). Speeds are track-percent per reference frame.
pub mod consts {
    /// Frame duration the speed constants are tuned against (60 fps)
    pub const REFERENCE_FRAME_MS: f32 = 16.67;
    /// Upper bound on the per-tick time scale so a stalled frame cannot teleport rows
    pub const MAX_TIME_SCALE: f32 = 4.0;

    /// Row speed at the start of a run
    pub const INITIAL_SPEED: f32 = 0.4;
    /// Speed ceiling for velocity surges
    pub const MAX_SPEED: f32 = 1.0;
    /// Speed gain per level applied at each velocity surge
    pub const SURGE_GAIN_PER_LEVEL: f32 = 0.15;
    /// Completed standard sets between velocity surges
    pub const SETS_PER_SURGE: u32 = 3;

    /// Row spacing bounds (track-percent)
    pub const MIN_OBSTACLE_DISTANCE: f32 = 35.0;
    pub const MAX_OBSTACLE_DISTANCE: f32 = 55.0;
    /// Extra spacing after a set, scaled by effective speed
    pub const SET_END_GAP_FACTOR: f32 = 60.0;
    /// Extra spacing after a crate row, scaled by effective speed
    pub const CRATE_GAP_FACTOR: f32 = 30.0;
    /// Wide breather gap before a scheduled surge objective
    pub const SURGE_GAP_BASE: f32 = 120.0;
    pub const SURGE_GAP_SPEED_FACTOR: f32 = 100.0;
    /// Gap after the practice tutorial crate
    pub const TUTORIAL_CRATE_GAP: f32 = 150.0;

    /// Where new rows appear
    pub const SPAWN_Y: f32 = -20.0;
    /// Spawn accumulator value after a track reset (forces an immediate spawn)
    pub const RESET_SPAWN_Y: f32 = 100.0;
    /// Release threshold while moving forward
    pub const DESPAWN_Y_FORWARD: f32 = 120.0;
    /// Release threshold while reversing
    pub const DESPAWN_Y_REVERSE: f32 = -30.0;

    /// Rider's fixed vertical position
    pub const PLAYER_Y_POS: f32 = 80.0;
    /// Half-height of the strike window around the rider
    pub const HIT_WINDOW: f32 = 5.0;

    /// Standard rows per set
    pub const OBSTACLES_PER_SET: u32 = 5;
    /// Row slots in the pool
    pub const POOL_SIZE: usize = 12;
    /// Widest supported lane layout
    pub const MAX_LANES: usize = 4;
    /// Lane count outside expansion levels
    pub const BASE_LANES: usize = 3;

    /// Points per level; crossing a multiple also grants a life
    pub const POINTS_PER_LEVEL: u64 = 50;
    /// Flat award for each reverse-run hit
    pub const WARP_HIT_BONUS: u32 = 6;

    /// Delay between finishing the warp set and the reverse run
    pub const WARP_PREP_DELAY_MS: f32 = 1000.0;
    /// Level banner duration before a lane expansion starts
    pub const LEVEL_ANNOUNCE_MS: f32 = 1000.0;
    /// Lane expansion countdown length in whole seconds
    pub const LANE_COUNTDOWN_SECS: u32 = 3;
    /// Interval between alias respin steps
    pub const ALIAS_SPIN_STEP_MS: f32 = 150.0;

    /// Floating text queue bound and lifetime
    pub const FLOATING_TEXT_CAPACITY: usize = 16;
    pub const FLOATING_TEXT_TTL_MS: f32 = 1000.0;

    /// Undrained events and audio cues kept per queue; the oldest are dropped
    pub const EVENT_QUEUE_CAPACITY: usize = 256;

    /// Rows inside this band drive the displayed rule
    pub const RULE_LOOKAHEAD_MIN_Y: f32 = -20.0;
    pub const RULE_LOOKAHEAD_MAX_Y: f32 = 85.0;
    /// Rows inside this band drive the GPS hint
    pub const GPS_LOOKAHEAD_MAX_Y: f32 = 90.0;

    /// Guided sets granted after the practice tutorial crate
    pub const GUIDED_SETS: u32 = 3;

    /// Haptic pulse lengths (ms)
    pub const HAPTIC_PAUSE_MS: u32 = 50;
    pub const HAPTIC_LEVEL_MS: u32 = 200;
    pub const HAPTIC_GAME_OVER_MS: u32 = 800;
}

/// Level reached at a given score
#[inline]
pub fn level_for_score(score: u64) -> u32 {
    (score / consts::POINTS_PER_LEVEL) as u32 + 1
}

/// Clamp a (possibly out-of-range) lane request into `[0, lanes - 1]`
#[inline]
pub fn clamp_lane(lane: i32, lanes: usize) -> usize {
    let max = lanes.saturating_sub(1) as i32;
    lane.clamp(0, max.max(0)) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_score() {
        assert_eq!(level_for_score(0), 1);
        assert_eq!(level_for_score(49), 1);
        assert_eq!(level_for_score(50), 2);
        assert_eq!(level_for_score(149), 3);
    }

    #[test]
    fn test_clamp_lane() {
        assert_eq!(clamp_lane(-3, 3), 0);
        assert_eq!(clamp_lane(1, 3), 1);
        assert_eq!(clamp_lane(7, 3), 2);
        assert_eq!(clamp_lane(3, 4), 3);
    }
}
