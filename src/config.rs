//! Engine configuration: judgment windows, hold-tick parameters, scoring
//! tables and frame pacing, with JSON persistence in the platform config
//! directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Fixed number of lanes. Charts and input routing both assume this.
pub const LANE_COUNT: usize = 4;

/// Judgment window half-widths, in milliseconds of chart time.
///
/// The windows nest: `perfect <= good <= normal <= judgement`. `late_grace`
/// is the post-timing zone in which a press still counts as Perfect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JudgeWindowConfig {
    pub perfect_ms: f64,
    pub good_ms: f64,
    pub normal_ms: f64,
    pub judgement_ms: f64,
    pub late_grace_ms: f64,
}

impl Default for JudgeWindowConfig {
    fn default() -> Self {
        Self {
            perfect_ms: 40.0,
            good_ms: 100.0,
            normal_ms: 150.0,
            judgement_ms: 500.0,
            late_grace_ms: 50.0,
        }
    }
}

/// Long-note hold-tick parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoldConfig {
    /// Interval between combo ticks while a long note is held.
    pub tick_interval_ms: f64,
    /// Slack added to the tail of the tick window so the final tick is not
    /// lost to the release window.
    pub tick_safety_ms: f64,
}

impl Default for HoldConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 200.0,
            tick_safety_ms: 50.0,
        }
    }
}

/// A combo threshold and the score multiplier that applies at or above it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComboMultiplier {
    pub threshold: u32,
    pub multiplier: f64,
}

/// Base scores per tier and the combo multiplier ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreConfig {
    pub perfect_score: u64,
    pub good_score: u64,
    pub normal_score: u64,
    pub combo_multipliers: Vec<ComboMultiplier>,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            perfect_score: 100,
            good_score: 50,
            normal_score: 20,
            combo_multipliers: vec![
                ComboMultiplier { threshold: 20, multiplier: 1.2 },
                ComboMultiplier { threshold: 40, multiplier: 1.3 },
                ComboMultiplier { threshold: 60, multiplier: 1.5 },
            ],
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub windows: JudgeWindowConfig,
    pub hold: HoldConfig,
    pub scoring: ScoreConfig,
    /// How far ahead of the clock notes are promoted into the active set.
    pub lookahead_ms: f64,
    /// Target frame rate for the host loop pacer.
    pub target_fps: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            windows: JudgeWindowConfig::default(),
            hold: HoldConfig::default(),
            scoring: ScoreConfig::default(),
            lookahead_ms: 2000.0,
            target_fps: 60.0,
        }
    }
}

impl EngineConfig {
    /// Checks the window-nesting invariant and basic positivity constraints.
    pub fn validate(&self) -> Result<()> {
        let w = &self.windows;
        if !(w.perfect_ms <= w.good_ms
            && w.good_ms <= w.normal_ms
            && w.normal_ms <= w.judgement_ms)
        {
            bail!(
                "judgment windows must nest: perfect {} <= good {} <= normal {} <= judgement {}",
                w.perfect_ms,
                w.good_ms,
                w.normal_ms,
                w.judgement_ms
            );
        }
        if w.perfect_ms < 0.0 || w.late_grace_ms < 0.0 {
            bail!("judgment windows must be non-negative");
        }
        if self.hold.tick_interval_ms <= 0.0 {
            bail!("hold tick interval must be positive, got {}", self.hold.tick_interval_ms);
        }
        if self.lookahead_ms < 0.0 {
            bail!("lookahead must be non-negative, got {}", self.lookahead_ms);
        }
        if self.target_fps <= 0.0 {
            bail!("target fps must be positive, got {}", self.target_fps);
        }
        Ok(())
    }

    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "lanefall")
            .map(|dirs| dirs.config_dir().join("engine.json"))
    }

    /// Loads the config from the platform config directory, falling back to
    /// defaults when the file is absent or unreadable.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            warn!("no config directory available, using default config");
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                info!("using default config ({e})");
                Self::default()
            }
        }
    }

    /// Saves the config to the platform config directory.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .context("no config directory available")?;
        self.save_to(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;
        let config: Self = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse config at {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)
            .with_context(|| format!("failed to write config to {}", path.display()))?;
        Ok(())
    }
}
