// ---------------------------------------------------------------------------
// SurfaceBounds: where the drawable sits in client space
// ---------------------------------------------------------------------------

/// Content box of the drawable in the host's client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceBounds {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl SurfaceBounds {
    /// Bounds for a drawable that fills its window's client area.
    pub fn at_origin(width: f32, height: f32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width,
            height,
        }
    }

    /// Translate a client-space point into surface-local coordinates with
    /// the origin at the bottom edge.
    pub fn to_surface(&self, client_x: f32, client_y: f32) -> [f32; 2] {
        let x = client_x - self.left;
        let y = client_y - self.top;
        [x, self.height - y]
    }
}

// ---------------------------------------------------------------------------
// ButtonFlags
// ---------------------------------------------------------------------------

/// Button state as seen by one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonFlags {
    /// Pressed since the previous frame. Observed by exactly one frame.
    pub clicked: bool,
    /// Currently held down.
    pub held: bool,
}

// ---------------------------------------------------------------------------
// InteractionState
// ---------------------------------------------------------------------------

/// Pointer state written by input handlers and read once per frame.
#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    pointer: [f32; 2],
    clicked: bool,
    held: bool,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer_moved(&mut self, client_x: f32, client_y: f32, bounds: &SurfaceBounds) {
        self.pointer = bounds.to_surface(client_x, client_y);
    }

    pub fn pointer_pressed(&mut self) {
        self.clicked = true;
        self.held = true;
    }

    /// Clears only the sticky flag; a click not yet seen by a frame survives.
    pub fn pointer_released(&mut self) {
        self.held = false;
    }

    /// Pointer position in surface pixels, origin bottom-left.
    pub fn pointer(&self) -> [f32; 2] {
        self.pointer
    }

    /// Read both flags for the current frame and clear the one-shot click.
    pub fn take_flags(&mut self) -> ButtonFlags {
        let flags = self.peek_flags();
        self.clicked = false;
        flags
    }

    pub fn peek_flags(&self) -> ButtonFlags {
        ButtonFlags {
            clicked: self.clicked,
            held: self.held,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> SurfaceBounds {
        SurfaceBounds::at_origin(800.0, 600.0)
    }

    // --- Pointer translation --------------------------------------------------

    #[test]
    fn top_edge_maps_to_surface_height() {
        let mut input = InteractionState::new();
        input.pointer_moved(0.0, 0.0, &bounds());
        assert_eq!(input.pointer(), [0.0, 600.0]);
    }

    #[test]
    fn bottom_edge_maps_to_zero() {
        let mut input = InteractionState::new();
        input.pointer_moved(120.0, 600.0, &bounds());
        assert_eq!(input.pointer(), [120.0, 0.0]);
    }

    #[test]
    fn offset_bounds_are_subtracted() {
        let b = SurfaceBounds {
            left: 10.0,
            top: 20.0,
            width: 100.0,
            height: 50.0,
        };
        // (15, 30) client → (5, 10) local → y' = 50 - 10
        assert_eq!(b.to_surface(15.0, 30.0), [5.0, 40.0]);
    }

    // --- Click / held flags ---------------------------------------------------

    #[test]
    fn click_is_seen_by_exactly_one_frame() {
        let mut input = InteractionState::new();
        input.pointer_pressed();

        let first = input.take_flags();
        assert!(first.clicked);
        assert!(first.held);

        // Button still down on the next frame: held, but no new click.
        let second = input.take_flags();
        assert!(!second.clicked);
        assert!(second.held);
    }

    #[test]
    fn release_clears_held_only() {
        let mut input = InteractionState::new();
        input.pointer_pressed();
        input.pointer_released();

        let flags = input.take_flags();
        assert!(flags.clicked, "a quick click must still be observed");
        assert!(!flags.held);
    }

    #[test]
    fn peek_does_not_consume() {
        let mut input = InteractionState::new();
        input.pointer_pressed();
        assert!(input.peek_flags().clicked);
        assert!(input.peek_flags().clicked);
        assert!(input.take_flags().clicked);
        assert!(!input.peek_flags().clicked);
    }

    #[test]
    fn no_flags_without_input() {
        let mut input = InteractionState::new();
        assert_eq!(input.take_flags(), ButtonFlags::default());
    }
}
