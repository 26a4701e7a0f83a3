//! Simulated participant: head motion and controller activity

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stereo_engine::device::{Buttons, ControllerState, EyeIndex};
use stereo_engine::foundation::math::{Pose, Quat, Unit, Vec3};
use stereo_engine::render::{EyeRenderParams, SceneRenderer};

/// Head sway: slow yaw oscillation plus a small lateral drift
pub fn head_motion(frame: u64) -> Pose {
    let t = frame as f32 / 90.0;
    let yaw = (t * 0.8).sin() * 0.6;
    Pose::new(
        Quat::from_axis_angle(&Unit::new_normalize(Vec3::y()), yaw),
        Vec3::new((t * 0.5).sin() * 0.1, 1.65, (t * 0.3).cos() * 0.05),
    )
}

/// Random controller activity for `frames` frames
///
/// Every press lasts a few frames and is followed by a release, so each one
/// produces exactly one edge.
pub fn controller_script(seed: u64, frames: usize) -> Vec<ControllerState> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut script = Vec::with_capacity(frames);

    while script.len() < frames {
        let mut state = ControllerState::default();
        state.thumbsticks[0].x = stick(&mut rng);
        state.thumbsticks[1].x = stick(&mut rng);

        if rng.gen_bool(0.05) {
            press_random_control(&mut rng, &mut state);
            let hold = rng.gen_range(1..=4);
            script.extend(std::iter::repeat(state).take(hold));
        } else {
            script.push(state);
        }
        script.push(ControllerState::default());
    }

    script.truncate(frames);
    script
}

fn stick(rng: &mut StdRng) -> f32 {
    if rng.gen_bool(0.1) {
        rng.gen_range(-1.0..=1.0)
    } else {
        0.0
    }
}

fn press_random_control(rng: &mut StdRng, state: &mut ControllerState) {
    match rng.gen_range(0..9) {
        0 => state.buttons = Buttons::A,
        1 => state.buttons = Buttons::B,
        2 => state.buttons = Buttons::X,
        3 => state.buttons = Buttons::LTHUMB,
        4 => state.buttons = Buttons::RTHUMB,
        5 => state.index_triggers[0] = 1.0,
        6 => state.index_triggers[1] = 1.0,
        7 => state.hand_triggers[0] = 1.0,
        _ => state.hand_triggers[1] = 1.0,
    }
}

/// Scene stand-in that tallies what it was asked to draw
#[derive(Debug, Default)]
pub struct TallyScene {
    draws: [u64; 2],
    swapped: u64,
    largest_scale: f32,
}

impl TallyScene {
    /// Draw calls per viewport eye
    pub fn draws(&self, eye: EyeIndex) -> u64 {
        self.draws[eye.index()]
    }

    /// Draws that showed the other eye's content
    pub fn swapped(&self) -> u64 {
        self.swapped
    }

    /// Largest absolute object scale seen
    pub fn largest_scale(&self) -> f32 {
        self.largest_scale
    }
}

impl SceneRenderer for TallyScene {
    fn render_eye(&mut self, params: &EyeRenderParams) {
        self.draws[params.viewport_eye.index()] += 1;
        if params.eye != params.viewport_eye {
            self.swapped += 1;
        }
        self.largest_scale = self.largest_scale.max(params.object_scale.abs());
        log::trace!("{:?} eye drawn with {:?}", params.viewport_eye, params.content_mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_length_and_determinism() {
        let first = controller_script(7, 500);
        assert_eq!(first.len(), 500);
        assert_eq!(first, controller_script(7, 500));
    }

    #[test]
    fn test_every_press_is_followed_by_release() {
        let script = controller_script(3, 2000);
        let released = ControllerState::default();
        let pressed = |state: &ControllerState| {
            !state.buttons.is_empty()
                || state.index_triggers.iter().chain(&state.hand_triggers).any(|&t| t > 0.5)
        };

        for pair in script.windows(2) {
            if pressed(&pair[0]) && !pressed(&pair[1]) {
                assert_eq!(pair[1], released);
            }
        }
        assert!(script.iter().any(pressed));
    }
}
