//! Rotating gradient backgrounds.

use web_time::Duration;

use crate::animation::{
    IntoTargetRef, Property, PropertyValues, Repeat, TaskConfig, TaskHandle, Tween,
};
use crate::controller::AnimationController;
use crate::util::easing::EasingFunction;

/// Spin a gradient's angle a full turn every `period`, forever.
///
/// The task never completes; cancel it or dispose its registry. Under
/// reduced motion the end angle is written once and the task is cancelled.
pub fn animated_gradient(
    ctrl: &AnimationController,
    target: &impl IntoTargetRef,
    angle: f32,
    period: Duration,
) -> TaskHandle {
    let from = PropertyValues::new().with(Property::GradientAngle, angle);
    let to = PropertyValues::new().with(Property::GradientAngle, angle + 360.0);
    ctrl.animate(
        target,
        Tween::from_to(from, to),
        TaskConfig::new(period)
            .ease(EasingFunction::Linear)
            .repeat(Repeat::Infinite)
            .named("gradient"),
    )
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::animation::TaskStatus;
    use crate::headless::{ManualClock, RecordingTarget};
    use crate::options::MotionOptions;
    use crate::policy::MotionPolicy;

    #[test]
    fn gradient_loops_without_completing() {
        let clock = Rc::new(ManualClock::new());
        let ctrl = AnimationController::new(
            MotionOptions::default(),
            MotionPolicy::fixed(false),
            clock.clone(),
        );
        let target = Rc::new(RecordingTarget::new());
        let handle = animated_gradient(&ctrl, &target, 45.0, Duration::from_secs(3));

        clock.advance(Duration::from_millis(1500));
        assert!(ctrl.tick());
        let angle = target.value(Property::GradientAngle).unwrap();
        assert!((angle - 225.0).abs() < 1e-3);

        clock.advance(Duration::from_secs(60));
        assert!(ctrl.tick());
        assert_eq!(handle.status(), TaskStatus::Running);
        assert!(handle.cancel());
        assert!(!ctrl.tick());
    }

    #[test]
    fn reduced_motion_cancels_the_loop() {
        let ctrl = AnimationController::new(
            MotionOptions::default(),
            MotionPolicy::fixed(true),
            ManualClock::new(),
        );
        let target = Rc::new(RecordingTarget::new());
        let handle = animated_gradient(&ctrl, &target, 0.0, Duration::from_secs(3));
        assert_eq!(handle.status(), TaskStatus::Cancelled);
        assert_eq!(target.value(Property::GradientAngle), Some(360.0));
    }
}
