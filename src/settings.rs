//! Game settings and practice configuration
//!
//! Persisted separately from high scores in LocalStorage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sim::{PowerUpKind, PowerUpSet, RuleKind};

/// Practice drills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PracticeMode {
    /// Regular run
    #[default]
    Standard,
    /// Color rules only, no crates
    ColorOnly,
    /// Word rules only, no crates
    WordOnly,
    /// Four lanes from the start, no lane transitions
    FourLanes,
    /// Tutorial crate of one kind, then only that kind
    SingleCrate(PowerUpKind),
}

impl PracticeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PracticeMode::Standard => "Standard",
            PracticeMode::ColorOnly => "Color only",
            PracticeMode::WordOnly => "Word only",
            PracticeMode::FourLanes => "Four lanes",
            PracticeMode::SingleCrate(_) => "Single crate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PracticeConfig {
    pub mode: PracticeMode,
}

impl PracticeConfig {
    pub fn new(mode: PracticeMode) -> Self {
        Self { mode }
    }

    pub fn is_active(&self) -> bool {
        self.mode != PracticeMode::Standard
    }

    pub fn selected_crate(&self) -> Option<PowerUpKind> {
        match self.mode {
            PracticeMode::SingleCrate(kind) => Some(kind),
            _ => None,
        }
    }

    /// COLOR_ONLY / WORD_ONLY never spawn crates
    pub fn skips_crates(&self) -> bool {
        matches!(self.mode, PracticeMode::ColorOnly | PracticeMode::WordOnly)
    }

    /// Lane count never changes
    pub fn fixed_lanes(&self) -> bool {
        self.mode == PracticeMode::FourLanes
    }

    pub fn is_warp_drill(&self) -> bool {
        self.selected_crate() == Some(PowerUpKind::Warp)
    }

    /// Lanes at the start of a run
    pub fn starting_lanes(&self) -> usize {
        if self.fixed_lanes() {
            crate::consts::MAX_LANES
        } else {
            crate::consts::BASE_LANES
        }
    }

    /// Rule kind the drill pins, if any
    pub fn forced_rule_kind(&self) -> Option<RuleKind> {
        match self.mode {
            PracticeMode::ColorOnly => Some(RuleKind::MatchColor),
            PracticeMode::WordOnly => Some(RuleKind::MatchWord),
            PracticeMode::SingleCrate(kind) => kind.required_rule(),
            PracticeMode::Standard | PracticeMode::FourLanes => None,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Vibration pulses on pause, level-up and game over
    pub haptics: bool,
    /// Storm flashes and other cosmetic effects
    pub visual_fx: bool,
    /// Per-kind crate switches; missing kinds are enabled
    pub crate_toggles: BTreeMap<PowerUpKind, bool>,
    pub practice: PracticeConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            haptics: true,
            visual_fx: true,
            crate_toggles: PowerUpKind::ALL.into_iter().map(|k| (k, true)).collect(),
            practice: PracticeConfig::default(),
        }
    }
}

impl Settings {
    pub fn with_practice(mode: PracticeMode) -> Self {
        Self {
            practice: PracticeConfig::new(mode),
            ..Self::default()
        }
    }

    pub fn set_crate_enabled(&mut self, kind: PowerUpKind, enabled: bool) {
        self.crate_toggles.insert(kind, enabled);
    }

    pub fn crate_enabled(&self, kind: PowerUpKind) -> bool {
        self.crate_toggles.get(&kind).copied().unwrap_or(true)
    }

    /// Kinds that must never spawn. A single-crate drill disables everything
    /// except its selected kind.
    pub fn disabled_crates(&self) -> PowerUpSet {
        match self.practice.selected_crate() {
            Some(kind) => PowerUpSet::all_except(kind),
            None => PowerUpKind::ALL
                .into_iter()
                .filter(|k| !self.crate_enabled(*k))
                .collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "stroop_rider_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {e}"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match self.to_json() {
                Ok(json) => {
                    let _ = storage.set_item(Self::STORAGE_KEY, &json);
                    log::info!("Settings saved");
                }
                Err(e) => log::warn!("Failed to serialize settings: {e}"),
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        log::debug!("No settings storage on native ({})", Self::STORAGE_KEY);
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
