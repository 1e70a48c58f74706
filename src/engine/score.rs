//! Score and combo ledger.

use serde::Serialize;

use crate::config::{ComboMultiplier, ScoreConfig};

use super::judge::JudgmentTier;

/// Ordered combo-threshold → multiplier ladder. Evaluated highest threshold
/// first; combos below the lowest threshold score at 1.0.
#[derive(Debug, Clone)]
pub struct MultiplierTable {
    // Sorted descending by threshold.
    tiers: Vec<ComboMultiplier>,
}

impl MultiplierTable {
    pub fn new(mut tiers: Vec<ComboMultiplier>) -> Self {
        tiers.sort_by(|a, b| b.threshold.cmp(&a.threshold));
        Self { tiers }
    }

    pub fn multiplier_for(&self, combo: u32) -> f64 {
        self.tiers
            .iter()
            .find(|t| combo >= t.threshold)
            .map(|t| t.multiplier)
            .unwrap_or(1.0)
    }
}

/// Frozen counters snapshot handed out at round end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    pub score: u64,
    pub max_combo: u32,
    pub perfect_count: u32,
    pub good_count: u32,
    pub normal_count: u32,
    pub miss_count: u32,
}

/// Mutable score state for one round.
#[derive(Debug, Clone)]
pub struct ScoreBoard {
    config: ScoreConfig,
    multipliers: MultiplierTable,
    score: u64,
    combo: u32,
    max_combo: u32,
    perfect_count: u32,
    good_count: u32,
    normal_count: u32,
    miss_count: u32,
}

impl ScoreBoard {
    pub fn new(config: ScoreConfig) -> Self {
        let multipliers = MultiplierTable::new(config.combo_multipliers.clone());
        Self {
            config,
            multipliers,
            score: 0,
            combo: 0,
            max_combo: 0,
            perfect_count: 0,
            good_count: 0,
            normal_count: 0,
            miss_count: 0,
        }
    }

    /// Applies one judgment. Hit tiers score at the multiplier of the combo
    /// *before* this judgment extends it; Miss resets the combo and never
    /// scores.
    pub fn register(&mut self, tier: JudgmentTier) {
        let base = match tier {
            JudgmentTier::Perfect => {
                self.perfect_count += 1;
                self.config.perfect_score
            }
            JudgmentTier::Good => {
                self.good_count += 1;
                self.config.good_score
            }
            JudgmentTier::Normal => {
                self.normal_count += 1;
                self.config.normal_score
            }
            JudgmentTier::Miss => {
                self.miss_count += 1;
                self.combo = 0;
                return;
            }
        };
        let multiplier = self.multipliers.multiplier_for(self.combo);
        self.score += (base as f64 * multiplier).round() as u64;
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    pub fn miss_count(&self) -> u32 {
        self.miss_count
    }

    pub fn reset(&mut self) {
        let config = self.config.clone();
        *self = Self::new(config);
    }

    pub fn summary(&self) -> RoundSummary {
        RoundSummary {
            score: self.score,
            max_combo: self.max_combo,
            perfect_count: self.perfect_count,
            good_count: self.good_count,
            normal_count: self.normal_count,
            miss_count: self.miss_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> ScoreBoard {
        ScoreBoard::new(ScoreConfig::default())
    }

    #[test]
    fn perfect_scores_base_at_low_combo() {
        let mut b = board();
        b.register(JudgmentTier::Perfect);
        assert_eq!(b.score(), 100);
        assert_eq!(b.combo(), 1);
        assert_eq!(b.max_combo(), 1);
    }

    #[test]
    fn multiplier_uses_pre_increment_combo() {
        let mut b = board();
        for _ in 0..20 {
            b.register(JudgmentTier::Perfect);
        }
        // 20 hits at x1.0.
        assert_eq!(b.score(), 2000);
        // The 21st hit sees combo == 20, so it scores 100 * 1.2.
        b.register(JudgmentTier::Perfect);
        assert_eq!(b.score(), 2120);
    }

    #[test]
    fn miss_resets_combo_but_not_max() {
        let mut b = board();
        b.register(JudgmentTier::Good);
        b.register(JudgmentTier::Normal);
        b.register(JudgmentTier::Miss);
        assert_eq!(b.combo(), 0);
        assert_eq!(b.max_combo(), 2);
        assert_eq!(b.score(), 70);
        assert_eq!(b.miss_count(), 1);
    }

    #[test]
    fn multiplier_table_ladder() {
        let table = MultiplierTable::new(ScoreConfig::default().combo_multipliers);
        assert_eq!(table.multiplier_for(0), 1.0);
        assert_eq!(table.multiplier_for(19), 1.0);
        assert_eq!(table.multiplier_for(20), 1.2);
        assert_eq!(table.multiplier_for(40), 1.3);
        assert_eq!(table.multiplier_for(59), 1.3);
        assert_eq!(table.multiplier_for(60), 1.5);
        assert_eq!(table.multiplier_for(1000), 1.5);
    }

    #[test]
    fn empty_table_is_always_unity() {
        let table = MultiplierTable::new(Vec::new());
        assert_eq!(table.multiplier_for(999), 1.0);
    }

    #[test]
    fn reset_clears_everything() {
        let mut b = board();
        b.register(JudgmentTier::Perfect);
        b.register(JudgmentTier::Miss);
        b.reset();
        assert_eq!(b.summary(), RoundSummary::default());
    }

    #[test]
    fn summary_snapshot() {
        let mut b = board();
        b.register(JudgmentTier::Perfect);
        b.register(JudgmentTier::Good);
        b.register(JudgmentTier::Miss);
        let s = b.summary();
        assert_eq!(s.perfect_count, 1);
        assert_eq!(s.good_count, 1);
        assert_eq!(s.normal_count, 0);
        assert_eq!(s.miss_count, 1);
        assert_eq!(s.max_combo, 2);
        assert_eq!(s.score, 150);
    }
}
