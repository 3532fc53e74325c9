use std::time::{Duration, Instant};

use glam::Mat4;

use crate::input::ButtonFlags;
use crate::Size;

// ---------------------------------------------------------------------------
// FrameInputs: the values pushed to the pipeline for one pass
// ---------------------------------------------------------------------------

/// Pass index of the off-screen pass.
pub const OFFSCREEN_PASS: u32 = 0;
/// Pass index of the on-screen pass.
pub const SURFACE_PASS: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInputs {
    pub resolution: Size,
    pub target_size: Size,
    /// Surface pixels, origin bottom-left.
    pub pointer: [f32; 2],
    pub buttons: ButtonFlags,
    pub pass_index: u32,
    /// Seconds since the session started.
    pub time: f32,
    pub projection: Mat4,
    pub model_view: Mat4,
}

impl FrameInputs {
    pub fn for_pass(&self, pass_index: u32) -> Self {
        Self { pass_index, ..*self }
    }
}

/// 30° vertical field of view, near plane 1, far plane 10000.
pub fn perspective(aspect: f32) -> Mat4 {
    Mat4::perspective_rh(30f32.to_radians(), aspect, 1.0, 10_000.0)
}

// ---------------------------------------------------------------------------
// Schedule / FrameLoop
// ---------------------------------------------------------------------------

/// How the host should invoke the draw callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Redraw on every display refresh.
    EveryFrame,
    /// Fire once after `delay`, then never again.
    Once { delay: Duration },
}

/// Decides when a frame is due. Holds no host handles; the host asks it.
#[derive(Debug, Clone)]
pub struct FrameLoop {
    schedule: Schedule,
    armed_at: Instant,
    frames: u64,
}

impl FrameLoop {
    pub fn new(schedule: Schedule, now: Instant) -> Self {
        Self {
            schedule,
            armed_at: now,
            frames: 0,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        match self.schedule {
            Schedule::EveryFrame => true,
            Schedule::Once { delay } => self.frames == 0 && now >= self.armed_at + delay,
        }
    }

    /// When a one-shot frame is still pending, the instant it becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        match self.schedule {
            Schedule::Once { delay } if self.frames == 0 => Some(self.armed_at + delay),
            _ => None,
        }
    }

    pub fn complete_frame(&mut self) {
        self.frames += 1;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// A one-shot loop that has fired. Repeating loops never finish.
    pub fn is_finished(&self) -> bool {
        matches!(self.schedule, Schedule::Once { .. }) && self.frames > 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_frame_is_always_due() {
        let t0 = Instant::now();
        let mut fl = FrameLoop::new(Schedule::EveryFrame, t0);
        for _ in 0..3 {
            assert!(fl.is_due(t0));
            fl.complete_frame();
        }
        assert_eq!(fl.frames(), 3);
        assert!(!fl.is_finished());
        assert_eq!(fl.deadline(), None);
    }

    #[test]
    fn one_shot_waits_for_its_delay() {
        let t0 = Instant::now();
        let delay = Duration::from_secs(1);
        let fl = FrameLoop::new(Schedule::Once { delay }, t0);
        assert!(!fl.is_due(t0));
        assert!(!fl.is_due(t0 + Duration::from_millis(999)));
        assert!(fl.is_due(t0 + delay));
        assert_eq!(fl.deadline(), Some(t0 + delay));
    }

    #[test]
    fn one_shot_fires_exactly_once() {
        let t0 = Instant::now();
        let mut fl = FrameLoop::new(
            Schedule::Once {
                delay: Duration::ZERO,
            },
            t0,
        );
        assert!(fl.is_due(t0));
        fl.complete_frame();
        assert!(fl.is_finished());
        assert!(!fl.is_due(t0 + Duration::from_secs(60)));
        assert_eq!(fl.deadline(), None);
    }

    #[test]
    fn for_pass_only_changes_the_index() {
        let inputs = FrameInputs {
            resolution: Size::new(800, 600),
            target_size: Size::new(1024, 1024),
            pointer: [1.0, 2.0],
            buttons: ButtonFlags {
                clicked: true,
                held: true,
            },
            pass_index: OFFSCREEN_PASS,
            time: 0.5,
            projection: Mat4::IDENTITY,
            model_view: Mat4::IDENTITY,
        };
        let surface = inputs.for_pass(SURFACE_PASS);
        assert_eq!(surface.pass_index, SURFACE_PASS);
        assert_eq!(surface.for_pass(OFFSCREEN_PASS), inputs);
    }

    #[test]
    fn perspective_keeps_triangle_in_front_of_camera() {
        // A point at z = -4 must land inside the clip volume.
        let clip = perspective(4.0 / 3.0) * glam::Vec4::new(0.0, 1.0, -4.0, 1.0);
        let ndc = clip / clip.w;
        assert!(clip.w > 0.0, "w={}", clip.w);
        assert!((0.0..=1.0).contains(&ndc.z), "z={}", ndc.z);
        assert!(ndc.y.abs() <= 1.0, "y={}", ndc.y);
    }
}
