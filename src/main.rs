//! Stroop Rider entry point
//!
//! On wasm32 the page drives [`stroop_rider::web::WebGame`] directly and this
//! binary is empty. Natively it runs a headless autopilot session:
//!
//! ```text
//! stroop-rider [seed] [seconds] [highscores.json]
//! ```

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let seconds: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(120);
    let scores_path = args.next().map(std::path::PathBuf::from);

    log::info!("Stroop Rider (native) autopilot demo: seed={seed}, {seconds}s");
    let summary = demo::run(seed, seconds);
    demo::report(&summary);

    if let Some(path) = scores_path {
        demo::record(&path, &summary);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is WebGame, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::collections::BTreeMap;
    use std::path::Path;

    use stroop_rider::highscores::format_elapsed;
    use stroop_rider::sim::{GameEvent, GameState, TickInput, tick};
    use stroop_rider::{HighScores, NullAudio, Settings};

    const FRAME_MS: f64 = 1000.0 / 60.0;

    pub struct Summary {
        pub score: u64,
        pub level: u32,
        pub lives: u32,
        pub elapsed_ms: f64,
        pub game_over: bool,
        pub sets: u32,
        /// Event name -> count
        pub events: BTreeMap<&'static str, u32>,
    }

    pub fn run(seed: u64, seconds: u32) -> Summary {
        let mut state = GameState::new(seed, Settings::load());
        let mut audio = NullAudio;
        let mut events = BTreeMap::new();
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };

        let frames = seconds as u64 * 60;
        for frame in 0..=frames {
            tick(&mut state, &input, frame as f64 * FRAME_MS);
            state.flush_audio(&mut audio);
            for event in state.drain_events() {
                if let GameEvent::WarpPhaseChanged { phase } = &event {
                    log::info!("Warp phase {phase:?} at {}", format_elapsed(state.progress.elapsed_ms));
                }
                *events.entry(event_name(&event)).or_insert(0) += 1;
            }
            if state.is_over() {
                break;
            }
        }

        Summary {
            score: state.progress.score,
            level: state.progress.level,
            lives: state.progress.lives,
            elapsed_ms: state.progress.elapsed_ms,
            game_over: state.is_over(),
            sets: state.progress.completed_sets,
            events,
        }
    }

    pub fn report(summary: &Summary) {
        log::info!(
            "{} after {}: score={}, level={}, lives={}, sets={}",
            if summary.game_over { "Game over" } else { "Stopped" },
            format_elapsed(summary.elapsed_ms),
            summary.score,
            summary.level,
            summary.lives,
            summary.sets
        );
        for (name, count) in &summary.events {
            log::info!("  {name}: {count}");
        }
    }

    pub fn record(path: &Path, summary: &Summary) {
        let mut scores = match HighScores::load_from(path) {
            Ok(scores) => scores,
            Err(e) => {
                log::warn!("Starting a fresh leaderboard: {e}");
                HighScores::new()
            }
        };
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0);
        match scores.record(summary.score, summary.elapsed_ms, now) {
            Some(rank) => log::info!("Leaderboard rank #{rank}"),
            None => log::info!("Score did not make the leaderboard"),
        }
        if let Err(e) = scores.save_to(path) {
            log::error!("Failed to save high scores: {e}");
        }
    }

    fn event_name(event: &GameEvent) -> &'static str {
        match event {
            GameEvent::ScoreChanged { .. } => "score_changed",
            GameEvent::GameOver { .. } => "game_over",
            GameEvent::LifeGained { .. } => "life_gained",
            GameEvent::LifeLost { .. } => "life_lost",
            GameEvent::LevelChanged { .. } => "level_changed",
            GameEvent::LaneCountChanged { .. } => "lane_count_changed",
            GameEvent::RuleChanged { .. } => "rule_changed",
            GameEvent::EffectChanged { .. } => "effect_changed",
            GameEvent::WarpPhaseChanged { .. } => "warp_phase_changed",
            GameEvent::VelocitySurge { .. } => "velocity_surge",
            GameEvent::FloatingText(_) => "floating_text",
            GameEvent::Countdown { .. } => "countdown",
            GameEvent::HapticPulse { .. } => "haptic_pulse",
            GameEvent::GuidanceEnded => "guidance_ended",
        }
    }
}
