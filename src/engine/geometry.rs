//! Playfield layout: lane geometry, scroll mapping and the pause button
//! hit-test, all scaled from a fixed reference resolution.

use anyhow::{Result, bail};

use crate::config::LANE_COUNT;

pub const REFERENCE_WIDTH: f32 = 720.0;
pub const REFERENCE_HEIGHT: f32 = 1080.0;
pub const LANE_WIDTH: f32 = REFERENCE_WIDTH / LANE_COUNT as f32;
pub const JUDGMENT_LINE_Y: f32 = 900.0;
/// How far below the judgment line a note may scroll before it is retired.
pub const PASSED_LINE_Y: f32 = 60.0;
/// Scroll rate: milliseconds of chart time per reference pixel.
pub const MS_PER_REFERENCE_PX: f64 = 2.0;

const PAUSE_BUTTON_SIZE: f32 = 40.0;
const PAUSE_BUTTON_MARGIN: f32 = 20.0;

/// A concrete surface size and the scale factors it implies.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    width: f32,
    height: f32,
}

impl Layout {
    /// A zero-area surface means the host failed to provide a drawing
    /// target, which is fatal at setup time.
    pub fn new(width: f32, height: f32) -> Result<Self> {
        if width <= 0.0 || height <= 0.0 {
            bail!("cannot set up playfield on a zero-area surface ({width}x{height})");
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    fn h_scale(&self) -> f32 {
        self.width / REFERENCE_WIDTH
    }

    fn v_scale(&self) -> f32 {
        self.height / REFERENCE_HEIGHT
    }

    /// Maps a surface x-coordinate to a lane index, if it falls on the
    /// playfield.
    pub fn lane_from_x(&self, x: f32) -> Option<usize> {
        let reference_x = x / self.h_scale();
        if reference_x < 0.0 {
            return None;
        }
        let lane = (reference_x / LANE_WIDTH).floor() as usize;
        (lane < LANE_COUNT).then_some(lane)
    }

    /// Surface y-coordinate of a note at `timing_ms` when the clock reads
    /// `now_ms`. Notes fall toward the judgment line; past notes render
    /// below it.
    pub fn note_y(&self, timing_ms: f64, now_ms: f64) -> f32 {
        let reference_y = JUDGMENT_LINE_Y - ((timing_ms - now_ms) / MS_PER_REFERENCE_PX) as f32;
        reference_y * self.v_scale()
    }

    /// Chart-time equivalent of the passed line: how many milliseconds after
    /// its timing a note crosses it. Scale factors cancel, so this is a
    /// resolution-independent constant.
    pub fn passed_threshold_ms(&self) -> f64 {
        f64::from(PASSED_LINE_Y) * MS_PER_REFERENCE_PX
    }

    /// Hit-test for the pause button in the top-right corner.
    pub fn pause_button_contains(&self, x: f32, y: f32) -> bool {
        let s = self.h_scale();
        let size = PAUSE_BUTTON_SIZE * s;
        let margin = PAUSE_BUTTON_MARGIN * s;
        let left = self.width - size - margin;
        let top = margin;
        x >= left && x <= left + size && y >= top && y <= top + size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_area_surface_is_fatal() {
        assert!(Layout::new(0.0, 1080.0).is_err());
        assert!(Layout::new(720.0, 0.0).is_err());
        assert!(Layout::new(-1.0, -1.0).is_err());
    }

    #[test]
    fn lane_mapping_at_reference_scale() {
        let layout = Layout::new(720.0, 1080.0).unwrap();
        assert_eq!(layout.lane_from_x(0.0), Some(0));
        assert_eq!(layout.lane_from_x(179.0), Some(0));
        assert_eq!(layout.lane_from_x(180.0), Some(1));
        assert_eq!(layout.lane_from_x(719.0), Some(3));
        assert_eq!(layout.lane_from_x(720.0), None);
        assert_eq!(layout.lane_from_x(-1.0), None);
    }

    #[test]
    fn lane_mapping_scales_with_width() {
        let layout = Layout::new(1440.0, 1080.0).unwrap();
        assert_eq!(layout.lane_from_x(359.0), Some(0));
        assert_eq!(layout.lane_from_x(360.0), Some(1));
    }

    #[test]
    fn passed_threshold_is_resolution_independent() {
        let small = Layout::new(360.0, 540.0).unwrap();
        let big = Layout::new(2880.0, 4320.0).unwrap();
        assert_eq!(small.passed_threshold_ms(), 120.0);
        assert_eq!(big.passed_threshold_ms(), 120.0);
    }

    #[test]
    fn note_y_reaches_judgment_line_at_timing() {
        let layout = Layout::new(720.0, 1080.0).unwrap();
        assert_eq!(layout.note_y(1000.0, 1000.0), JUDGMENT_LINE_Y);
        // 200 ms early = 100 reference px above the line.
        assert_eq!(layout.note_y(1200.0, 1000.0), JUDGMENT_LINE_Y - 100.0);
    }

    #[test]
    fn pause_button_corners() {
        let layout = Layout::new(720.0, 1080.0).unwrap();
        // Button spans x in [660, 700], y in [20, 60].
        assert!(layout.pause_button_contains(660.0, 20.0));
        assert!(layout.pause_button_contains(700.0, 60.0));
        assert!(layout.pause_button_contains(680.0, 40.0));
        assert!(!layout.pause_button_contains(659.0, 40.0));
        assert!(!layout.pause_button_contains(680.0, 61.0));
        assert!(!layout.pause_button_contains(10.0, 10.0));
    }

    #[test]
    fn pause_button_scales() {
        let layout = Layout::new(1440.0, 2160.0).unwrap();
        // Scale 2: button spans x in [1320, 1400], y in [40, 120].
        assert!(layout.pause_button_contains(1360.0, 80.0));
        assert!(!layout.pause_button_contains(1310.0, 80.0));
    }
}
