// ---------------------------------------------------------------------------
// Key: windowing-library-independent key representation
// ---------------------------------------------------------------------------

/// Keys the app reacts to. `main.rs` maps winit's physical keys onto this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Q,
    Escape,
    Other,
}

// ---------------------------------------------------------------------------
// InputAction
// ---------------------------------------------------------------------------

/// What the app does in response to a key or button event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Quit,
    PointerDown,
    PointerUp,
}

pub fn on_key(key: Key) -> Option<InputAction> {
    match key {
        Key::Q | Key::Escape => Some(InputAction::Quit),
        Key::Other => None,
    }
}

/// Every mouse button drives the click/held flags.
pub fn on_button(pressed: bool) -> InputAction {
    if pressed {
        InputAction::PointerDown
    } else {
        InputAction::PointerUp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn q_and_escape_quit() {
        assert_eq!(on_key(Key::Q), Some(InputAction::Quit));
        assert_eq!(on_key(Key::Escape), Some(InputAction::Quit));
        assert_eq!(on_key(Key::Other), None);
    }

    #[test]
    fn button_state_maps_to_pointer_actions() {
        assert_eq!(on_button(true), InputAction::PointerDown);
        assert_eq!(on_button(false), InputAction::PointerUp);
    }
}
