//! Staggered slide-and-fade entrances.

use crate::animation::{PropertyValues, TargetRef, TaskConfig, TaskHandle, Tween};
use crate::controller::AnimationController;
use crate::options::{Direction, RevealOptions};

/// Values an element sits at before it is revealed: shifted `distance`
/// against the travel direction and fully transparent.
pub fn hidden_state(options: &RevealOptions) -> PropertyValues {
    let d = options.distance;
    let shifted = match options.direction {
        Direction::Up => PropertyValues::new().y(d),
        Direction::Down => PropertyValues::new().y(-d),
        Direction::Left => PropertyValues::new().x(d),
        Direction::Right => PropertyValues::new().x(-d),
    };
    shifted.opacity(0.0)
}

fn shown_state(options: &RevealOptions) -> PropertyValues {
    match options.direction {
        Direction::Up | Direction::Down => PropertyValues::new().y(0.0),
        Direction::Left | Direction::Right => PropertyValues::new().x(0.0),
    }
    .opacity(1.0)
}

/// Slide and fade `targets` into place one after another.
///
/// Every target is moved to its hidden state at once, so items still
/// waiting for their turn never show in place before sliding in.
pub fn staggered_reveal(
    ctrl: &AnimationController,
    targets: &[TargetRef],
    options: &RevealOptions,
) -> Vec<TaskHandle> {
    let from = hidden_state(options);
    let to = shown_state(options);
    let config = TaskConfig::new(options.duration())
        .ease(options.ease)
        .delay(options.delay())
        .stagger(options.stagger())
        .immediate_render(true)
        .named("reveal");
    ctrl.animate_batch(
        targets,
        |_| Box::new(Tween::from_to(from.clone(), to.clone())),
        &config,
    )
}
