//! Chart lookup by track id.

use tracing::debug;

use super::{Chart, Note};

/// Id of the bundled demo track.
pub const DEMO_TRACK: &str = "demo-loop";

/// Resolves a track id to its chart. Unknown ids yield an empty chart, never
/// an error: a round over an empty chart simply ends immediately.
pub trait ChartProvider {
    fn chart(&self, track_id: &str) -> Chart;
}

/// The charts compiled into the binary.
#[derive(Debug, Default)]
pub struct BuiltinCharts;

impl BuiltinCharts {
    pub fn new() -> Self {
        Self
    }

    fn demo_loop() -> Chart {
        let mut notes = Vec::new();
        // Four bars of eighth notes at 120 BPM (250 ms per eighth), walking
        // across the lanes, with a long note closing each bar.
        for bar in 0..4u32 {
            let bar_start = 1000.0 + f64::from(bar) * 2000.0;
            for step in 0..6u32 {
                let lane = ((bar + step) % 4) as usize;
                notes.push(Note::short(lane, bar_start + f64::from(step) * 250.0));
            }
            notes.push(Note::long((bar % 4) as usize, bar_start + 1500.0, 400.0));
        }
        Chart::new(notes)
    }
}

impl ChartProvider for BuiltinCharts {
    fn chart(&self, track_id: &str) -> Chart {
        match track_id {
            DEMO_TRACK => Self::demo_loop(),
            _ => {
                debug!(track_id, "unknown track id, returning empty chart");
                Chart::empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_track_is_non_empty_and_sorted() {
        let chart = BuiltinCharts::new().chart(DEMO_TRACK);
        assert!(!chart.is_empty());
        let timings: Vec<f64> = chart.notes().iter().map(|n| n.timing_ms).collect();
        let mut sorted = timings.clone();
        sorted.sort_by(f64::total_cmp);
        assert_eq!(timings, sorted);
    }

    #[test]
    fn unknown_track_yields_empty_chart() {
        let chart = BuiltinCharts::new().chart("no-such-track");
        assert!(chart.is_empty());
    }
}
