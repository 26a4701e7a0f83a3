//! Controller-to-control bindings

use super::Controls;
use crate::device::{Buttons, ControllerState, Hand};

/// Physical input that drives a control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    /// Any of the given buttons held
    Button(Buttons),
    /// Index trigger pulled past the threshold
    IndexTrigger(Hand),
    /// Grip trigger pulled past the threshold
    HandTrigger(Hand),
}

impl InputSource {
    /// Whether this source is active in `state`
    pub fn is_active(self, state: &ControllerState, threshold: f32) -> bool {
        match self {
            InputSource::Button(buttons) => state.buttons.intersects(buttons),
            InputSource::IndexTrigger(hand) => state.index_trigger(hand) > threshold,
            InputSource::HandTrigger(hand) => state.hand_trigger(hand) > threshold,
        }
    }
}

/// One control bound to one source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    /// Control fired on the rising edge
    pub control: Controls,
    /// Source watched for the edge
    pub source: InputSource,
}

impl Binding {
    /// Bind `control` to `source`
    pub const fn new(control: Controls, source: InputSource) -> Self {
        Self { control, source }
    }
}

/// Touch controller layout
///
/// A cycles eye rendering, B cycles view locking, X cycles content. The
/// thumbstick clicks reset scale (left) and interocular offset (right).
/// Index triggers step tracking lag, grip triggers step render delay; left
/// decreases, right increases.
pub const DEFAULT_BINDINGS: [Binding; 9] = [
    Binding::new(Controls::CYCLE_EYE_MODE, InputSource::Button(Buttons::A)),
    Binding::new(Controls::CYCLE_VIEW_MODE, InputSource::Button(Buttons::B)),
    Binding::new(Controls::CYCLE_CONTENT, InputSource::Button(Buttons::X)),
    Binding::new(Controls::RESET_SCALE, InputSource::Button(Buttons::LTHUMB)),
    Binding::new(Controls::RESET_IOD, InputSource::Button(Buttons::RTHUMB)),
    Binding::new(Controls::LAG_DOWN, InputSource::IndexTrigger(Hand::Left)),
    Binding::new(Controls::LAG_UP, InputSource::IndexTrigger(Hand::Right)),
    Binding::new(Controls::DELAY_DOWN, InputSource::HandTrigger(Hand::Left)),
    Binding::new(Controls::DELAY_UP, InputSource::HandTrigger(Hand::Right)),
];
