//! Judgment tiers and the timing windows that bucket press deltas into them.

use serde::{Deserialize, Serialize};

use crate::config::JudgeWindowConfig;

/// Judgment tiers, best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JudgmentTier {
    Perfect,
    Good,
    Normal,
    Miss,
}

impl JudgmentTier {
    /// Every tier except Miss extends the combo and scores.
    pub fn is_hit(self) -> bool {
        !matches!(self, Self::Miss)
    }
}

/// One judgment as delivered to the sink and the last-judgment feed.
///
/// `time_delta_ms` is `timing - now` at the moment of judgment (negative =
/// late). It is absent for judgments with no meaningful press delta: misses
/// from retirement or forced hold failure, and hold ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JudgmentEvent {
    pub tier: JudgmentTier,
    pub lane: usize,
    pub time_delta_ms: Option<f64>,
}

/// Resolved judgment windows.
///
/// All comparisons are inclusive: a delta of exactly `perfect_ms` is still
/// Perfect. Deltas are signed, `timing - now`; `late_grace_ms` extends the
/// windows below zero so slightly late presses judge Perfect.
#[derive(Debug, Clone, Copy)]
pub struct JudgeWindows {
    perfect_ms: f64,
    good_ms: f64,
    normal_ms: f64,
    judgement_ms: f64,
    late_grace_ms: f64,
}

impl JudgeWindows {
    pub fn new(config: &JudgeWindowConfig) -> Self {
        Self {
            perfect_ms: config.perfect_ms,
            good_ms: config.good_ms,
            normal_ms: config.normal_ms,
            judgement_ms: config.judgement_ms,
            late_grace_ms: config.late_grace_ms,
        }
    }

    pub fn normal_ms(&self) -> f64 {
        self.normal_ms
    }

    pub fn late_grace_ms(&self) -> f64 {
        self.late_grace_ms
    }

    /// Whether a note at this delta is a candidate for press judgment at all.
    pub fn in_judgement_range(&self, delta_ms: f64) -> bool {
        delta_ms + self.late_grace_ms >= 0.0 && delta_ms <= self.judgement_ms
    }

    /// The tighter range in which a long-note edge actually scores
    /// (Normal-or-better).
    pub fn in_effective_range(&self, delta_ms: f64) -> bool {
        delta_ms + self.late_grace_ms >= 0.0 && delta_ms <= self.normal_ms
    }

    /// Buckets a signed press delta into a tier. Callers guarantee the delta
    /// is already inside the judgement range.
    pub fn classify(&self, delta_ms: f64) -> JudgmentTier {
        if delta_ms < 0.0 {
            // Late side: anything inside the grace zone is Perfect.
            return if delta_ms + self.late_grace_ms >= 0.0 {
                JudgmentTier::Perfect
            } else {
                JudgmentTier::Miss
            };
        }
        if delta_ms <= self.perfect_ms {
            JudgmentTier::Perfect
        } else if delta_ms <= self.good_ms {
            JudgmentTier::Good
        } else if delta_ms <= self.normal_ms {
            JudgmentTier::Normal
        } else {
            JudgmentTier::Miss
        }
    }

    /// Buckets an unsigned delta magnitude, used when backfilling hold ticks
    /// from the release delta. Never yields Miss: the caller has already
    /// established the release landed in the effective range.
    pub fn classify_magnitude(&self, abs_delta_ms: f64) -> JudgmentTier {
        if abs_delta_ms <= self.perfect_ms {
            JudgmentTier::Perfect
        } else if abs_delta_ms <= self.good_ms {
            JudgmentTier::Good
        } else {
            JudgmentTier::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn windows() -> JudgeWindows {
        JudgeWindows::new(&JudgeWindowConfig::default())
    }

    #[test]
    fn window_boundaries_are_inclusive() {
        let w = windows();
        // Defaults: perfect 40, good 100, normal 150.
        assert_eq!(w.classify(40.0), JudgmentTier::Perfect);
        assert_eq!(w.classify(41.0), JudgmentTier::Good);
        assert_eq!(w.classify(100.0), JudgmentTier::Good);
        assert_eq!(w.classify(101.0), JudgmentTier::Normal);
        assert_eq!(w.classify(150.0), JudgmentTier::Normal);
        assert_eq!(w.classify(151.0), JudgmentTier::Miss);
    }

    #[test]
    fn exact_hit_is_perfect() {
        assert_eq!(windows().classify(0.0), JudgmentTier::Perfect);
    }

    #[test]
    fn late_grace_is_perfect() {
        let w = windows();
        // Late grace is 50 ms.
        assert_eq!(w.classify(-1.0), JudgmentTier::Perfect);
        assert_eq!(w.classify(-50.0), JudgmentTier::Perfect);
        assert_eq!(w.classify(-51.0), JudgmentTier::Miss);
    }

    #[test]
    fn judgement_range_bounds() {
        let w = windows();
        assert!(w.in_judgement_range(0.0));
        assert!(w.in_judgement_range(500.0));
        assert!(!w.in_judgement_range(500.1));
        assert!(w.in_judgement_range(-50.0));
        assert!(!w.in_judgement_range(-50.1));
    }

    #[test]
    fn effective_range_is_tighter() {
        let w = windows();
        assert!(w.in_effective_range(150.0));
        assert!(!w.in_effective_range(150.1));
        assert!(w.in_effective_range(-50.0));
        assert!(!w.in_effective_range(-50.1));
    }

    #[test]
    fn magnitude_bucketing_never_misses() {
        let w = windows();
        assert_eq!(w.classify_magnitude(0.0), JudgmentTier::Perfect);
        assert_eq!(w.classify_magnitude(40.0), JudgmentTier::Perfect);
        assert_eq!(w.classify_magnitude(100.0), JudgmentTier::Good);
        assert_eq!(w.classify_magnitude(150.0), JudgmentTier::Normal);
        assert_eq!(w.classify_magnitude(9999.0), JudgmentTier::Normal);
    }
}
