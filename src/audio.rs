//! Audio cues and the injected audio sink
//!
//! The simulation queues [`AudioCue`]s during a tick; the host flushes them
//! into whatever [`AudioSink`] it owns. On wasm32, [`WebAudio`] synthesizes
//! every cue procedurally with the Web Audio API - no external files needed.

use serde::Serialize;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundEffect {
    /// Displayed rule changed, countdown tick, velocity surge
    Objective,
    /// Level banner
    LevelUp,
    /// Crate collected
    Crate,
    /// WILD crate collected
    Wild,
    /// ALIAS respin or warp rewind starting
    Spin,
    /// Extra life earned
    LifeUp,
    /// Life spent on a wrong pick
    LifeLost,
    /// Fatal wrong pick
    Wrong,
}

/// Everything the simulation can ask of the audio layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "cue", content = "value", rename_all = "snake_case")]
pub enum AudioCue {
    Play(SoundEffect),
    /// Reverse run active (pitched-down playback)
    ReverseMode(bool),
    /// Warp prep sweep
    WarpTransition(bool),
    /// Word rules use a different timbre than color rules
    RuleTheme { word: bool },
}

/// Audio backend injected by the host
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);

    fn set_reverse_mode(&mut self, _on: bool) {}

    fn set_warp_transition(&mut self, _on: bool) {}

    fn set_rule_theme(&mut self, _word: bool) {}

    fn dispatch(&mut self, cue: AudioCue) {
        match cue {
            AudioCue::Play(effect) => self.play(effect),
            AudioCue::ReverseMode(on) => self.set_reverse_mode(on),
            AudioCue::WarpTransition(on) => self.set_warp_transition(on),
            AudioCue::RuleTheme { word } => self.set_rule_theme(word),
        }
    }
}

/// Silent sink for headless runs and tests
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _effect: SoundEffect) {}
}

#[cfg(target_arch = "wasm32")]
pub use web_audio::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web_audio {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, SoundEffect};

    /// Procedural Web Audio backend
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        volume: f32,
        muted: bool,
        /// Frequency multiplier; < 1 while reversing
        pitch: f32,
        word_theme: bool,
    }

    impl Default for WebAudio {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudio {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: 0.8,
                muted: false,
                pitch: 1.0,
                word_theme: false,
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        pub fn set_volume(&mut self, vol: f32) {
            self.volume = vol.clamp(0.0, 1.0);
        }

        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        fn effective_volume(&self) -> f32 {
            if self.muted { 0.0 } else { self.volume }
        }

        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq * self.pitch);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Single enveloped tone, optionally gliding to `to_freq`
        #[allow(clippy::too_many_arguments)]
        fn tone(
            &self,
            ctx: &AudioContext,
            vol: f32,
            freq: f32,
            to_freq: Option<f32>,
            osc_type: OscillatorType,
            delay: f64,
            length: f64,
        ) {
            let Some((osc, gain)) = self.create_osc(ctx, freq, osc_type) else {
                return;
            };
            let t = ctx.current_time() + delay;

            gain.gain().set_value_at_time(0.0, ctx.current_time()).ok();
            gain.gain().set_value_at_time(vol, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + length)
                .ok();
            if let Some(to) = to_freq {
                osc.frequency().set_value_at_time(freq * self.pitch, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(to * self.pitch, t + length)
                    .ok();
            }

            osc.start().ok();
            osc.stop_with_when(t + length + 0.05).ok();
        }
    }

    impl AudioSink for WebAudio {
        fn play(&mut self, effect: SoundEffect) {
            let vol = self.effective_volume();
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Browsers start suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let theme = if self.word_theme {
                OscillatorType::Triangle
            } else {
                OscillatorType::Sine
            };

            match effect {
                SoundEffect::Objective => {
                    self.tone(ctx, vol * 0.3, 660.0, None, theme, 0.0, 0.12);
                }
                SoundEffect::LevelUp => {
                    for (i, freq) in [523.0, 659.0, 784.0].into_iter().enumerate() {
                        self.tone(ctx, vol * 0.3, freq, None, theme, i as f64 * 0.08, 0.2);
                    }
                }
                SoundEffect::Crate => {
                    self.tone(ctx, vol * 0.35, 400.0, Some(900.0), OscillatorType::Square, 0.0, 0.15);
                }
                SoundEffect::Wild => {
                    self.tone(ctx, vol * 0.3, 300.0, Some(1200.0), OscillatorType::Sawtooth, 0.0, 0.25);
                    self.tone(ctx, vol * 0.2, 1200.0, Some(300.0), OscillatorType::Square, 0.1, 0.2);
                }
                SoundEffect::Spin => {
                    self.tone(ctx, vol * 0.25, 200.0, Some(1600.0), OscillatorType::Triangle, 0.0, 0.3);
                }
                SoundEffect::LifeUp => {
                    self.tone(ctx, vol * 0.3, 784.0, None, OscillatorType::Sine, 0.0, 0.1);
                    self.tone(ctx, vol * 0.3, 1047.0, None, OscillatorType::Sine, 0.1, 0.2);
                }
                SoundEffect::LifeLost => {
                    self.tone(ctx, vol * 0.4, 300.0, Some(120.0), OscillatorType::Triangle, 0.0, 0.25);
                }
                SoundEffect::Wrong => {
                    self.tone(ctx, vol * 0.5, 150.0, Some(40.0), OscillatorType::Sawtooth, 0.0, 0.6);
                }
            }
        }

        fn set_reverse_mode(&mut self, on: bool) {
            self.pitch = if on { 0.75 } else { 1.0 };
        }

        fn set_warp_transition(&mut self, on: bool) {
            if !on {
                return;
            }
            let vol = self.effective_volume();
            if let Some(ctx) = &self.ctx {
                self.tone(ctx, vol * 0.3, 80.0, Some(800.0), OscillatorType::Sawtooth, 0.0, 1.0);
            }
        }

        fn set_rule_theme(&mut self, word: bool) {
            self.word_theme = word;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        played: Vec<SoundEffect>,
        reverse: bool,
        word: bool,
    }

    impl AudioSink for Recorder {
        fn play(&mut self, effect: SoundEffect) {
            self.played.push(effect);
        }

        fn set_reverse_mode(&mut self, on: bool) {
            self.reverse = on;
        }

        fn set_rule_theme(&mut self, word: bool) {
            self.word = word;
        }
    }

    #[test]
    fn test_dispatch_routes_cues() {
        let mut sink = Recorder::default();
        sink.dispatch(AudioCue::Play(SoundEffect::Crate));
        sink.dispatch(AudioCue::ReverseMode(true));
        sink.dispatch(AudioCue::RuleTheme { word: true });
        // Sinks without a warp sweep ignore it
        sink.dispatch(AudioCue::WarpTransition(true));

        assert_eq!(sink.played, vec![SoundEffect::Crate]);
        assert!(sink.reverse);
        assert!(sink.word);
    }

    #[test]
    fn test_null_audio_accepts_everything() {
        let mut sink = NullAudio;
        sink.dispatch(AudioCue::Play(SoundEffect::Wrong));
        sink.dispatch(AudioCue::ReverseMode(false));
    }
}
