use crate::models::engine::{Lane, NUM_LANES};

/// Gameplay actions produced by an input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    Hit { lane: Lane },
    Release { lane: Lane },
}

/// Raw lane signals for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputFrame {
    /// A key went down since the previous frame.
    pub pressed: [bool; NUM_LANES],
    /// The key is down right now.
    pub held: [bool; NUM_LANES],
}

impl InputFrame {
    pub fn pressed(&self, lane: Lane) -> bool {
        self.pressed[lane.index()]
    }

    pub fn held(&self, lane: Lane) -> bool {
        self.held[lane.index()]
    }
}

/// Folds actions arriving between frames into per-frame edges and levels.
///
/// A press and release inside the same frame still reports the press edge.
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    pressed: [bool; NUM_LANES],
    held: [bool; NUM_LANES],
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, action: GameAction) {
        match action {
            GameAction::Hit { lane } => {
                if !self.held[lane.index()] {
                    self.pressed[lane.index()] = true;
                }
                self.held[lane.index()] = true;
            }
            GameAction::Release { lane } => {
                self.held[lane.index()] = false;
            }
        }
    }

    /// Returns this frame's signals and clears the edges.
    pub fn take_frame(&mut self) -> InputFrame {
        let frame = InputFrame {
            pressed: self.pressed,
            held: self.held,
        };
        self.pressed = [false; NUM_LANES];
        frame
    }
}
