use std::sync::Arc;
use std::time::Instant;

use quad_core::frame::FrameLoop;
use quad_core::pipeline::ShaderSources;
use quad_core::{RenderSession, SessionConfig, SetupError, Size};
use quad_gpu::WgpuDevice;
use winit::window::Window;

use crate::fallback::WindowFallback;

// ---------------------------------------------------------------------------
// FpsCounter: reports once per second
// ---------------------------------------------------------------------------

struct FpsCounter {
    frames: u32,
    last_report: Instant,
}

impl FpsCounter {
    fn new(now: Instant) -> Self {
        Self {
            frames: 0,
            last_report: now,
        }
    }

    /// Count a frame. Returns the rate once a full second has passed.
    fn tick(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        let elapsed = now.duration_since(self.last_report).as_secs_f32();
        if elapsed >= 1.0 {
            let fps = self.frames as f32 / elapsed;
            self.frames = 0;
            self.last_report = now;
            Some(fps)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// App: one render session bound to the window
// ---------------------------------------------------------------------------

pub struct App {
    session: RenderSession<WgpuDevice>,
    frames: FrameLoop,
    start: Instant,
    fps: FpsCounter,
}

impl App {
    /// Set up the GPU session for `window`.
    ///
    /// On failure the window title carries the reason and the error is
    /// returned; nothing is drawn.
    pub fn launch(
        window: Arc<Window>,
        config: &SessionConfig,
        sources: &ShaderSources,
    ) -> Result<Self, SetupError> {
        let inner = window.inner_size();
        let size = Size::new(inner.width, inner.height);
        let mut fallback = WindowFallback::new(Arc::clone(&window));

        let session = quad_core::launch(
            || WgpuDevice::new(Arc::clone(&window), size),
            config,
            sources,
            &mut fallback,
        )?;

        let now = Instant::now();
        Ok(Self {
            frames: FrameLoop::new(session.variant().schedule(), now),
            session,
            start: now,
            fps: FpsCounter::new(now),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.session.resize(Size::new(width, height));
    }

    /// Cursor position in window client coordinates (physical pixels).
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.session.pointer_moved_in_surface(x, y);
    }

    pub fn pointer_pressed(&mut self) {
        self.session.pointer_pressed();
    }

    pub fn pointer_released(&mut self) {
        self.session.pointer_released();
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.frames.is_due(now)
    }

    /// When the pending one-shot frame becomes due, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.frames.deadline()
    }

    /// Draw a frame if the schedule says one is due.
    pub fn render(&mut self, now: Instant) -> Result<(), wgpu::SurfaceError> {
        if !self.frames.is_due(now) {
            return Ok(());
        }

        let time = now.duration_since(self.start).as_secs_f32();
        self.session.render_frame(time)?;
        self.frames.complete_frame();

        if let Some(fps) = self.fps.tick(now) {
            log::debug!("FPS: {fps:.1}");
        }
        if self.frames.is_finished() {
            log::info!("{} drawn once; idling", self.session.variant().name());
        }
        Ok(())
    }

    /// Reconfigure after the surface was lost or outdated.
    pub fn recover_surface(&mut self) {
        log::debug!("Reconfiguring surface");
        self.session.device_mut().reconfigure_surface();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn fps_is_silent_within_the_first_second() {
        let start = Instant::now();
        let mut fps = FpsCounter::new(start);
        assert_eq!(fps.tick(start + Duration::from_millis(100)), None);
        assert_eq!(fps.tick(start + Duration::from_millis(900)), None);
    }

    #[test]
    fn fps_reports_frames_per_elapsed_second_then_resets() {
        let start = Instant::now();
        let mut fps = FpsCounter::new(start);
        fps.tick(start + Duration::from_millis(300));
        fps.tick(start + Duration::from_millis(600));
        let rate = fps.tick(start + Duration::from_secs(2)).expect("report");
        assert!((rate - 1.5).abs() < 1e-4, "got {rate}");
        assert_eq!(fps.tick(start + Duration::from_millis(2100)), None);
    }
}
