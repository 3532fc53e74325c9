//! A software graphics device for tests.
//!
//! Every collaborator call is recorded. Passes are rasterized into CPU pixel
//! buffers as flat fills: a pass that samples nothing fills its destination
//! with `pattern(time)`, a surface pass that samples a target copies it.
//! Writes only land on `flush`, so a pass that samples before the previous
//! pass was flushed sees stale pixels.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::device::{Destination, GraphicsDevice, LinkOptions, Pass, Sample};
use crate::frame::FrameInputs;
use crate::geometry::Geometry;
use crate::target::TargetMode;
use crate::{ShaderStage, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dest {
    Surface,
    Target,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sampled {
    Nothing,
    Target,
    History,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Compile(ShaderStage),
    Link,
    Validate,
    Upload(u32),
    CreateTarget(Size),
    Resize(Size),
    BeginFrame,
    Draw { dest: Dest },
    Flush,
    Capture,
    EndFrame,
    Blank,
}

#[derive(Debug, Clone)]
pub struct DrawRecord {
    pub dest: Dest,
    pub viewport: Size,
    pub sampled: Sampled,
    pub inputs: FrameInputs,
}

#[derive(Debug)]
pub struct SoftProgram;

#[derive(Debug)]
pub struct SoftTarget(usize);

#[derive(Debug)]
pub struct FrameLost;

struct Image {
    size: Size,
    pixels: Vec<u32>,
}

impl Image {
    fn new(size: Size) -> Self {
        Self {
            size,
            pixels: vec![0; (size.width * size.height) as usize],
        }
    }

    fn sample_into(&self, dst: &mut Image) {
        for y in 0..dst.size.height {
            for x in 0..dst.size.width {
                let sx = x * self.size.width / dst.size.width;
                let sy = y * self.size.height / dst.size.height;
                dst.pixels[(y * dst.size.width + x) as usize] =
                    self.pixels[(sy * self.size.width + sx) as usize];
            }
        }
    }
}

struct SoftTargetImages {
    color: Image,
    history: Option<Image>,
}

enum PendingWrite {
    Fill { dest: Option<usize>, color: u32 },
    Surface(Image),
    CaptureInto(usize),
}

pub struct RecordingDevice {
    surface: Image,
    targets: Vec<SoftTargetImages>,
    pending: Vec<PendingWrite>,
    calls: Rc<RefCell<Vec<Call>>>,
    draws: RefCell<Vec<DrawRecord>>,
    fail_compile: Option<ShaderStage>,
    fail_link: bool,
    fail_validate: bool,
    fail_frame: Cell<bool>,
    history_sample: Option<u32>,
}

impl RecordingDevice {
    pub fn new(size: Size) -> Self {
        Self {
            surface: Image::new(size),
            targets: Vec::new(),
            pending: Vec::new(),
            calls: Rc::new(RefCell::new(Vec::new())),
            draws: RefCell::new(Vec::new()),
            fail_compile: None,
            fail_link: false,
            fail_validate: false,
            fail_frame: Cell::new(false),
            history_sample: None,
        }
    }

    pub fn fail_compile(mut self, stage: ShaderStage) -> Self {
        self.fail_compile = Some(stage);
        self
    }

    pub fn fail_link(mut self) -> Self {
        self.fail_link = true;
        self
    }

    pub fn fail_validate(mut self) -> Self {
        self.fail_validate = true;
        self
    }

    pub fn fail_next_frame(&self) {
        self.fail_frame.set(true);
    }

    /// Fill color written by an unsampled pass at `time`.
    pub fn pattern(time: f32) -> u32 {
        0xff00_0000 | ((time * 255.0) as u32 & 0x00ff_ffff)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Shared handle that outlives the device.
    pub fn call_log(&self) -> Rc<RefCell<Vec<Call>>> {
        Rc::clone(&self.calls)
    }

    pub fn draws(&self) -> Vec<DrawRecord> {
        self.draws.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
        self.draws.borrow_mut().clear();
    }

    pub fn surface_pixels(&self) -> &[u32] {
        &self.surface.pixels
    }

    /// First history pixel seen by the most recent history-sampling pass.
    pub fn last_history_sample(&self) -> Option<u32> {
        self.history_sample
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl GraphicsDevice for RecordingDevice {
    type Shader = ShaderStage;
    type Program = SoftProgram;
    type Geometry = u32;
    type Target = SoftTarget;
    type FrameError = FrameLost;

    fn surface_size(&self) -> Size {
        self.surface.size
    }

    fn compile_shader(&mut self, stage: ShaderStage, _source: &str) -> Result<ShaderStage, String> {
        self.record(Call::Compile(stage));
        if self.fail_compile == Some(stage) {
            return Err(format!("{stage}: syntax error"));
        }
        Ok(stage)
    }

    fn link_program(
        &mut self,
        _vertex: ShaderStage,
        _fragment: ShaderStage,
        _options: &LinkOptions,
    ) -> Result<SoftProgram, String> {
        self.record(Call::Link);
        if self.fail_link {
            return Err("varying mismatch".into());
        }
        Ok(SoftProgram)
    }

    fn validate_program(&mut self, _program: &SoftProgram) -> Result<(), String> {
        self.record(Call::Validate);
        if self.fail_validate {
            return Err("sampler unbound".into());
        }
        Ok(())
    }

    fn upload_geometry(&mut self, geometry: &Geometry) -> u32 {
        self.record(Call::Upload(geometry.vertex_count()));
        geometry.vertex_count()
    }

    fn create_target(&mut self, size: Size, mode: TargetMode) -> SoftTarget {
        self.record(Call::CreateTarget(size));
        self.targets.push(SoftTargetImages {
            color: Image::new(size),
            history: (mode == TargetMode::CaptureSurface).then(|| Image::new(size)),
        });
        SoftTarget(self.targets.len() - 1)
    }

    fn resize_surface(&mut self, size: Size) {
        self.record(Call::Resize(size));
        self.surface = Image::new(size);
    }

    fn begin_frame(&mut self) -> Result<(), FrameLost> {
        if self.fail_frame.replace(false) {
            return Err(FrameLost);
        }
        self.record(Call::BeginFrame);
        Ok(())
    }

    fn draw(&mut self, pass: Pass<'_, Self>) {
        let (dest, dest_id) = match pass.destination {
            Destination::Surface => (Dest::Surface, None),
            Destination::Target(t) => (Dest::Target, Some(t.0)),
        };
        let sampled = match pass.sample {
            Sample::Nothing => Sampled::Nothing,
            Sample::Target(_) => Sampled::Target,
            Sample::History(_) => Sampled::History,
        };
        self.record(Call::Draw { dest });
        self.draws.borrow_mut().push(DrawRecord {
            dest,
            viewport: pass.viewport,
            sampled,
            inputs: *pass.inputs,
        });

        match pass.sample {
            Sample::Target(t) if dest_id.is_none() => {
                // Reads what has been flushed so far, not what is pending.
                let mut frame = Image::new(self.surface.size);
                self.targets[t.0].color.sample_into(&mut frame);
                self.pending.push(PendingWrite::Surface(frame));
                return;
            }
            Sample::History(t) => {
                self.history_sample = self.targets[t.0]
                    .history
                    .as_ref()
                    .and_then(|h| h.pixels.first().copied());
            }
            _ => {}
        }
        self.pending.push(PendingWrite::Fill {
            dest: dest_id,
            color: Self::pattern(pass.inputs.time),
        });
    }

    fn flush(&mut self) {
        self.record(Call::Flush);
        for write in std::mem::take(&mut self.pending) {
            match write {
                PendingWrite::Fill { dest: None, color } => self.surface.pixels.fill(color),
                PendingWrite::Fill {
                    dest: Some(id),
                    color,
                } => self.targets[id].color.pixels.fill(color),
                PendingWrite::Surface(frame) => self.surface = frame,
                PendingWrite::CaptureInto(id) => {
                    if let Some(history) = self.targets[id].history.as_mut() {
                        self.surface.sample_into(history);
                    }
                }
            }
        }
    }

    fn capture_surface(&mut self, target: &SoftTarget) {
        self.record(Call::Capture);
        self.pending.push(PendingWrite::CaptureInto(target.0));
    }

    fn end_frame(&mut self) {
        self.record(Call::EndFrame);
    }

    fn blank_surface(&mut self) {
        self.record(Call::Blank);
        self.pending.clear();
        self.surface.pixels.fill(0);
    }
}
