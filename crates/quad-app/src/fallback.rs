use std::sync::Arc;

use quad_core::FallbackUi;
use winit::window::Window;

/// Puts the setup failure message where the user will see it: the window
/// title. Nothing is ever drawn into a window that failed setup.
pub struct WindowFallback {
    window: Arc<Window>,
    base_title: String,
}

impl WindowFallback {
    pub fn new(window: Arc<Window>) -> Self {
        let base_title = window.title();
        Self { window, base_title }
    }
}

impl FallbackUi for WindowFallback {
    fn show_message(&mut self, message: &str) {
        log::error!("{message}");
        self.window
            .set_title(&fallback_title(&self.base_title, message));
    }
}

fn fallback_title(base: &str, message: &str) -> String {
    if base.is_empty() {
        message.to_string()
    } else {
        format!("{base}: {message}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_follows_the_window_name() {
        assert_eq!(fallback_title("quad", "no GPU"), "quad: no GPU");
        assert_eq!(fallback_title("", "no GPU"), "no GPU");
    }
}
