//! Controller input handling
//!
//! Turns raw controller snapshots into edge-triggered control events and
//! per-frame analog deltas. Every digital control goes through the same
//! [`EdgeTrigger`], so holding a button or trigger fires exactly once.

pub mod bindings;

pub use bindings::{Binding, InputSource, DEFAULT_BINDINGS};

use bitflags::bitflags;

use crate::device::{ControllerState, Hand};

bitflags! {
    /// Control events that fired this frame
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Controls: u32 {
        /// Advance the eye render mode
        const CYCLE_EYE_MODE = 1 << 0;
        /// Advance the view (lock) mode
        const CYCLE_VIEW_MODE = 1 << 1;
        /// Advance the content mode
        const CYCLE_CONTENT = 1 << 2;
        /// Reset the object scale to zero
        const RESET_SCALE = 1 << 3;
        /// Reset the interocular offset to zero
        const RESET_IOD = 1 << 4;
        /// Decrease tracking lag by one frame
        const LAG_DOWN = 1 << 5;
        /// Increase tracking lag by one frame
        const LAG_UP = 1 << 6;
        /// Decrease render delay by one frame
        const DELAY_DOWN = 1 << 7;
        /// Increase render delay by one frame
        const DELAY_UP = 1 << 8;
    }
}

/// Rising-edge detector for one digital signal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeTrigger {
    held: bool,
}

impl EdgeTrigger {
    /// Feed the current level; returns `true` only on a released-to-pressed transition
    pub fn update(&mut self, active: bool) -> bool {
        let rising = active && !self.held;
        self.held = active;
        rising
    }

    /// Whether the signal was active at the last update
    pub fn is_held(&self) -> bool {
        self.held
    }
}

/// Input interpreted for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputFrame {
    /// Controls whose binding went from released to pressed
    pub edges: Controls,
    /// Object scale axis (left thumbstick X)
    pub scale_axis: f32,
    /// Interocular axis (right thumbstick X)
    pub iod_axis: f32,
}

/// Edge detection over a fixed set of bindings
#[derive(Debug, Clone)]
pub struct InputManager {
    bindings: Vec<Binding>,
    triggers: Vec<EdgeTrigger>,
    trigger_threshold: f32,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl InputManager {
    /// Input manager with the default touch-controller bindings
    pub fn new(trigger_threshold: f32) -> Self {
        Self::with_bindings(DEFAULT_BINDINGS.to_vec(), trigger_threshold)
    }

    /// Input manager with custom bindings
    pub fn with_bindings(bindings: Vec<Binding>, trigger_threshold: f32) -> Self {
        let triggers = vec![EdgeTrigger::default(); bindings.len()];
        Self {
            bindings,
            triggers,
            trigger_threshold,
        }
    }

    /// Interpret one controller snapshot
    ///
    /// Call once per frame; edge state carries over between calls.
    pub fn update(&mut self, state: &ControllerState) -> InputFrame {
        let mut edges = Controls::empty();
        for (binding, trigger) in self.bindings.iter().zip(self.triggers.iter_mut()) {
            if trigger.update(binding.source.is_active(state, self.trigger_threshold)) {
                edges |= binding.control;
            }
        }

        InputFrame {
            edges,
            scale_axis: axis(state.thumbstick(Hand::Left).x),
            iod_axis: axis(state.thumbstick(Hand::Right).x),
        }
    }

    /// Frame with no input, used when the controllers cannot be read
    ///
    /// Edge state is left untouched so a button held across the gap does
    /// not fire again.
    pub fn idle_frame(&self) -> InputFrame {
        InputFrame::default()
    }
}

/// Non-finite samples read as a centered stick
fn axis(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
