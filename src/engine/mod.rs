//! Round orchestration: the [`GameEngine`] owns the timeline, the score
//! ledger and the input dispatcher, advances them against the audio-derived
//! clock and routes lane edges into press/release judgments.

mod geometry;
mod hold;
mod input;
mod judge;
mod score;
mod timeline;

pub use geometry::Layout;
pub use input::{InputDispatcher, LaneEdge, default_key_bindings};
pub use judge::{JudgeWindows, JudgmentEvent, JudgmentTier};
pub use score::{MultiplierTable, RoundSummary, ScoreBoard};
pub use timeline::{HoldState, HoldTracker, LiveNote, Timeline};

use anyhow::Result;
use tracing::{debug, info};
use winit::keyboard::KeyCode;

use crate::audio::{AudioTrack, SongClock};
use crate::chart::{Chart, NoteKind};
use crate::config::{EngineConfig, LANE_COUNT};

use hold::TickWindow;

/// Round lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Idle,
    Running,
    Paused,
    Finished,
}

/// Fire-and-forget observer invoked on every judgment, misses included.
pub type JudgmentSink = Box<dyn FnMut(&JudgmentEvent)>;

/// Throttles a host frame callback to the configured rate. Lives outside
/// the engine so the logic itself stays pure in `now`.
#[derive(Debug)]
pub struct FramePacer {
    interval_ms: f64,
    last_ms: Option<f64>,
}

impl FramePacer {
    pub fn new(target_fps: f64) -> Self {
        Self {
            interval_ms: 1000.0 / target_fps,
            last_ms: None,
        }
    }

    /// Whether a frame should run at `now_ms` (host timestamp). The first
    /// call always runs.
    pub fn should_run(&mut self, now_ms: f64) -> bool {
        match self.last_ms {
            Some(last) if now_ms - last < self.interval_ms => false,
            _ => {
                self.last_ms = Some(now_ms);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// The timing and judgment engine for one round.
pub struct GameEngine {
    config: EngineConfig,
    windows: JudgeWindows,
    layout: Layout,
    timeline: Timeline,
    board: ScoreBoard,
    dispatcher: InputDispatcher,
    clock: SongClock,
    track: Box<dyn AudioTrack>,
    phase: RoundPhase,
    last_judgment: Option<JudgmentEvent>,
    sink: Option<JudgmentSink>,
}

impl GameEngine {
    pub fn new(layout: Layout, config: EngineConfig, track: Box<dyn AudioTrack>) -> Result<Self> {
        config.validate()?;
        let windows = JudgeWindows::new(&config.windows);
        let board = ScoreBoard::new(config.scoring.clone());
        Ok(Self {
            config,
            windows,
            layout,
            timeline: Timeline::default(),
            board,
            dispatcher: InputDispatcher::with_default_bindings(),
            clock: SongClock::new(),
            track,
            phase: RoundPhase::Idle,
            last_judgment: None,
            sink: None,
        })
    }

    /// Derives the play queue from the chart's raw timings plus the session
    /// latency. Rebinding recomputes from scratch, so the offset can never
    /// stack.
    pub fn bind_chart(&mut self, chart: &Chart, latency_offset_ms: f64) {
        self.timeline.bind(chart, latency_offset_ms);
        self.board.reset();
        self.last_judgment = None;
    }

    pub fn set_judgment_sink(&mut self, sink: impl FnMut(&JudgmentEvent) + 'static) {
        self.sink = Some(Box::new(sink));
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Chart time right now, from the track position.
    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms(self.track.position_secs())
    }

    pub fn start(&mut self) -> Result<()> {
        self.clock.start(self.track.position_secs());
        self.track.play()?;
        self.phase = RoundPhase::Running;
        info!("round started");
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        if self.phase != RoundPhase::Running {
            return Ok(());
        }
        self.track.pause()?;
        self.dispatcher.clear();
        self.phase = RoundPhase::Paused;
        info!(now_ms = self.now_ms(), "round paused");
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        if self.phase != RoundPhase::Paused {
            return Ok(());
        }
        self.track.resume()?;
        self.phase = RoundPhase::Running;
        info!("round resumed");
        Ok(())
    }

    /// Abandons the round: clears the play queue, the ledger and all held
    /// input sources.
    pub fn stop(&mut self) {
        let _ = self.track.pause();
        self.timeline.clear();
        self.board.reset();
        self.dispatcher.clear();
        self.last_judgment = None;
        self.phase = RoundPhase::Idle;
        info!("round stopped");
    }

    /// Advances one frame: hold ticks, promotion, retirement, end-of-round
    /// detection. No-op unless running.
    pub fn frame(&mut self) {
        if self.phase != RoundPhase::Running {
            return;
        }
        let now = self.now_ms();
        self.update_holds(now);
        self.timeline.promote(now, self.config.lookahead_ms);
        let passed = self.layout.passed_threshold_ms();
        let grace = self.windows.late_grace_ms();
        for lane in self.timeline.retire(now, passed, grace) {
            self.register(JudgmentTier::Miss, lane, None);
        }
        if self.track.is_ended() {
            self.phase = RoundPhase::Finished;
            let _ = self.track.pause();
            info!(summary = ?self.summary(), "round finished");
        }
    }

    pub fn summary(&self) -> RoundSummary {
        self.board.summary()
    }

    pub fn score(&self) -> &ScoreBoard {
        &self.board
    }

    pub fn active_notes(&self) -> &[LiveNote] {
        self.timeline.active()
    }

    /// Most recent judgment, for the on-screen judgment feed.
    pub fn last_judgment(&self) -> Option<&JudgmentEvent> {
        self.last_judgment.as_ref()
    }

    /// Whether a click at (x, y) hits the pause button of a running round.
    pub fn is_pause_button_press(&self, x: f32, y: f32) -> bool {
        self.phase == RoundPhase::Running && self.layout.pause_button_contains(x, y)
    }

    // -- input routing -------------------------------------------------

    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if self.phase != RoundPhase::Running {
            return;
        }
        if let Some(edge) = self.dispatcher.key_event(key, pressed) {
            self.apply_edge(edge);
        }
    }

    pub fn handle_pointer_press(&mut self, x: f32) {
        if self.phase != RoundPhase::Running {
            return;
        }
        if let Some(edge) = self.dispatcher.pointer_press(x, &self.layout) {
            self.apply_edge(edge);
        }
    }

    pub fn handle_pointer_release(&mut self, x: f32) {
        if self.phase != RoundPhase::Running {
            return;
        }
        if let Some(edge) = self.dispatcher.pointer_release(x, &self.layout) {
            self.apply_edge(edge);
        }
    }

    pub fn handle_touch_at(&mut self, id: u64, x: f32) {
        if self.phase != RoundPhase::Running {
            return;
        }
        for edge in self.dispatcher.touch_at(id, x, &self.layout) {
            self.apply_edge(edge);
        }
    }

    pub fn handle_touch_end(&mut self, id: u64) {
        if self.phase != RoundPhase::Running {
            return;
        }
        if let Some(edge) = self.dispatcher.touch_end(id) {
            self.apply_edge(edge);
        }
    }

    fn apply_edge(&mut self, edge: LaneEdge) {
        if edge.pressed {
            self.press_lane(edge.lane);
        } else {
            self.release_lane(edge.lane);
        }
    }

    // -- judgment ------------------------------------------------------

    /// Judges a lane press at the current clock reading. A lane with no
    /// candidate note is a silent no-op.
    pub fn press_lane(&mut self, lane: usize) {
        if self.phase != RoundPhase::Running || lane >= LANE_COUNT {
            return;
        }
        let now = self.now_ms();
        let Some(idx) = self.timeline.closest_pressable(lane, now, &self.windows) else {
            return;
        };
        let note = self.timeline.active()[idx].note;
        let delta = note.timing_ms - now;
        match note.kind {
            NoteKind::Short => {
                let tier = self.windows.classify(delta);
                self.timeline.remove_active(idx);
                self.register(tier, lane, Some(delta));
                debug!(lane, delta_ms = delta, ?tier, "short note judged");
            }
            NoteKind::Long => {
                let tier = self.windows.classify(delta);
                if !tier.is_hit() || !self.windows.in_effective_range(delta) {
                    // Pressed too early to latch; the note stays Waiting
                    // and may still be hit or retired.
                    return;
                }
                // Snapshot the combo before the start judgment extends it;
                // the release shortfall is measured against this.
                let held_combo = self.board.combo();
                self.register(tier, lane, Some(delta));
                if let Some(h) = self.timeline.active_mut()[idx].hold.as_mut() {
                    h.state = HoldState::Holding;
                    h.is_held = true;
                    h.held_combo = held_combo;
                    // Ticks align to the chart, not to how early or late
                    // the press landed.
                    h.last_tick_ms = note.timing_ms;
                }
                debug!(lane, delta_ms = delta, ?tier, "hold started");
            }
        }
    }

    /// Judges a lane release against any note held in that lane.
    pub fn release_lane(&mut self, lane: usize) {
        if self.phase != RoundPhase::Running || lane >= LANE_COUNT {
            return;
        }
        let now = self.now_ms();
        let normal = self.windows.normal_ms();
        for i in 0..self.timeline.active().len() {
            let live = self.timeline.active()[i];
            let Some(h) = live.hold else { continue };
            if live.note.lane != lane || !h.is_held {
                continue;
            }
            if h.state == HoldState::Holding {
                let end = live.end_ms();
                let delta = end - now;
                if now < end - normal {
                    // Let go before the release window opened.
                    self.register(JudgmentTier::Miss, lane, None);
                    self.set_hold_state(i, HoldState::Missed);
                    debug!(lane, delta_ms = delta, "hold released early");
                } else if self.windows.in_effective_range(delta) {
                    let tier = self.windows.classify(delta);
                    self.register(tier, lane, Some(delta));
                    self.set_hold_state(i, HoldState::Completed);
                    self.backfill_ticks(lane, &live, delta);
                    debug!(lane, delta_ms = delta, ?tier, "hold completed");
                }
            }
            if let Some(hm) = self.timeline.active_mut()[i].hold.as_mut() {
                hm.is_held = false;
            }
        }
    }

    /// Awards the hold ticks the frame loop did not get to before the
    /// release landed. `expected` counts the interval instants of a full
    /// hold (the end judgment covers the last one); everything the combo
    /// did not gain since the hold started is made up here, bucketed by the
    /// release delta.
    fn backfill_ticks(&mut self, lane: usize, live: &LiveNote, end_delta_ms: f64) {
        let Some(h) = live.hold else { return };
        let expected =
            i64::from(hold::expected_ticks(live.note.duration_ms, self.config.hold.tick_interval_ms));
        // Combo now includes the start and end judgments.
        let gained = i64::from(self.board.combo()) - i64::from(h.held_combo);
        let shortfall = expected - gained;
        if shortfall <= 0 {
            return;
        }
        let tier = self.windows.classify_magnitude(end_delta_ms.abs());
        debug!(lane, shortfall, ?tier, "backfilling hold ticks");
        for _ in 0..shortfall {
            self.register(tier, lane, Some(end_delta_ms));
        }
    }

    /// Per-frame hold maintenance: tick catch-up and the forced miss for
    /// notes held past their end grace.
    fn update_holds(&mut self, now: f64) {
        let interval = self.config.hold.tick_interval_ms;
        let safety = self.config.hold.tick_safety_ms;
        let normal = self.windows.normal_ms();
        let grace = self.windows.late_grace_ms();
        for i in 0..self.timeline.active().len() {
            let live = self.timeline.active()[i];
            let Some(h) = live.hold else { continue };
            if !h.is_held || h.state != HoldState::Holding {
                continue;
            }
            let window =
                TickWindow::for_note(live.note.timing_ms, live.note.duration_ms, normal, safety);
            let (ticks, cursor) = hold::catch_up(h.last_tick_ms, now, interval, window);
            if let Some(hm) = self.timeline.active_mut()[i].hold.as_mut() {
                hm.last_tick_ms = cursor;
            }
            for _ in 0..ticks {
                self.register(JudgmentTier::Perfect, live.note.lane, None);
            }
            if now - grace > live.end_ms() {
                // Held through the whole release window.
                self.register(JudgmentTier::Miss, live.note.lane, None);
                self.set_hold_state(i, HoldState::Missed);
                debug!(lane = live.note.lane, "hold overheld, forced miss");
            }
        }
    }

    fn set_hold_state(&mut self, index: usize, state: HoldState) {
        if let Some(h) = self.timeline.active_mut()[index].hold.as_mut() {
            h.state = state;
        }
    }

    fn register(&mut self, tier: JudgmentTier, lane: usize, time_delta_ms: Option<f64>) {
        self.board.register(tier);
        let event = JudgmentEvent {
            tier,
            lane,
            time_delta_ms,
        };
        self.last_judgment = Some(event);
        if let Some(sink) = self.sink.as_mut() {
            sink(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pacer_first_frame_always_runs() {
        let mut pacer = FramePacer::new(60.0);
        assert!(pacer.should_run(123.0));
    }

    #[test]
    fn pacer_skips_inside_one_interval() {
        let mut pacer = FramePacer::new(60.0);
        assert!(pacer.should_run(0.0));
        assert!(!pacer.should_run(10.0));
        assert!(pacer.should_run(16.7));
    }

    #[test]
    fn pacer_reset_rearms() {
        let mut pacer = FramePacer::new(60.0);
        assert!(pacer.should_run(0.0));
        pacer.reset();
        assert!(pacer.should_run(1.0));
    }
}
