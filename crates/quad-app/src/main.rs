use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use quad_core::pipeline::ShaderSources;
use quad_core::SessionConfig;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

mod app;
mod config;
mod fallback;
mod input;
mod logging;

use app::App;
use config::Cli;
use input::{InputAction, Key};

// ---------------------------------------------------------------------------
// Handler: winit ApplicationHandler
// ---------------------------------------------------------------------------

struct Handler {
    config: SessionConfig,
    sources: ShaderSources,
    window: Option<Arc<Window>>,
    app: Option<App>,
}

impl Handler {
    fn apply(&mut self, action: InputAction, event_loop: &ActiveEventLoop) {
        match action {
            InputAction::Quit => {
                log::info!("Quit requested, exiting");
                event_loop.exit();
            }
            InputAction::PointerDown => {
                if let Some(app) = &mut self.app {
                    app.pointer_pressed();
                }
            }
            InputAction::PointerUp => {
                if let Some(app) = &mut self.app {
                    app.pointer_released();
                }
            }
        }
    }
}

impl ApplicationHandler for Handler {
    /// Creates the window, then the GPU session inside it.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let size = self.config.initial_size;
        let window_attrs = Window::default_attributes()
            .with_title(format!("quad ({})", self.config.variant.name()))
            .with_inner_size(winit::dpi::LogicalSize::new(size.width, size.height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };
        log::info!("Window created ({})", size);

        match App::launch(Arc::clone(&window), &self.config, &self.sources) {
            Ok(app) => self.app = Some(app),
            // Already logged and shown; the window stays up until closed.
            Err(_) => log::warn!("Rendering disabled"),
        }
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                let key = match code {
                    KeyCode::KeyQ => Key::Q,
                    KeyCode::Escape => Key::Escape,
                    _ => Key::Other,
                };
                if let Some(action) = input::on_key(key) {
                    self.apply(action, event_loop);
                }
            }

            // ----------------------------------------------------------------
            // Pointer
            // ----------------------------------------------------------------
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(app) = &mut self.app {
                    app.pointer_moved(position.x as f32, position.y as f32);
                }
            }

            WindowEvent::MouseInput { state, .. } => {
                let action = input::on_button(state == ElementState::Pressed);
                self.apply(action, event_loop);
            }

            WindowEvent::Resized(new_size) => {
                if let Some(app) = &mut self.app {
                    app.resize(new_size.width, new_size.height);
                }
            }

            WindowEvent::RedrawRequested => {
                if let Some(app) = &mut self.app {
                    match app.render(Instant::now()) {
                        Ok(()) => {}
                        // Reconfigure and try again on the next redraw.
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            app.recover_surface();
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("GPU out of memory, exiting");
                            event_loop.exit();
                        }
                        Err(e) => log::warn!("render error: {e:?}"),
                    }
                }
            }

            _ => {}
        }
    }

    /// Redraw continuously, wait for a one-shot deadline, or idle.
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(app)) = (&self.window, &self.app) else {
            return;
        };

        if app.is_due(Instant::now()) {
            event_loop.set_control_flow(ControlFlow::Wait);
            window.request_redraw();
        } else if let Some(deadline) = app.deadline() {
            event_loop.set_control_flow(ControlFlow::WaitUntil(deadline));
        } else {
            event_loop.set_control_flow(ControlFlow::Wait);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.logging_config());

    let config = cli.session_config();
    let sources = cli.shader_sources()?;
    log::info!("Variant: {}", config.variant);

    let event_loop = EventLoop::new().context("creating event loop")?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut handler = Handler {
        config,
        sources,
        window: None,
        app: None,
    };
    event_loop.run_app(&mut handler).context("running event loop")?;
    Ok(())
}
