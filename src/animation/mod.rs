//! Animation tasks and the runtime that drives them.
//!
//! - [`TaskConfig`]: timing (duration, easing, delay, stagger, repeat, yoyo)
//! - [`Effect`]: what a task writes each frame ([`Tween`] for properties)
//! - [`AnimationRuntime`]: owns live tasks and advances them per frame
//! - [`TaskHandle`]: cancellable reference to a started task
//! - [`Timeline`]: steps sequenced against one start, played as a unit

mod clock;
mod effect;
mod property;
mod runtime;
mod target;
mod task;
mod timeline;

pub use clock::{Clock, SystemClock};
pub use effect::{Effect, Tween};
pub use property::{Channel, Property, PropertyValues};
pub use runtime::AnimationRuntime;
pub use target::{AnimationTarget, IntoTargetRef, TargetRef};
pub use task::{Repeat, Sample, TaskConfig, TaskHandle, TaskId, TaskStatus};
pub use timeline::{Position, Timeline, TimelineHandle};
