//! Ready-made animation presets built on the runtime.
//!
//! Every preset goes through an [`AnimationController`], so reduced motion
//! and missing targets are handled the same way as hand-built tasks.
//!
//! [`AnimationController`]: crate::controller::AnimationController

mod gradient;
mod pointer;
mod reveal;
mod scroll;
mod text;
mod visibility;

use glam::Vec2;

pub use gradient::animated_gradient;
pub use pointer::{MagneticCursor, MagneticEffect};
pub use reveal::{hidden_state, staggered_reveal};
pub use scroll::{scroll_progress, ScrollTrigger};
pub use text::{counter, text_scramble, typewriter, Counter, CounterFormat, Scramble, Typewriter};
pub use visibility::{reveal_on_visible, StaggeredVisibility};

/// An element's bounding box in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Distance from the viewport's left edge.
    pub left: f32,
    /// Distance from the viewport's top edge.
    pub top: f32,
    /// Box width.
    pub width: f32,
    /// Box height.
    pub height: f32,
}

impl Rect {
    /// Box from its top-left corner and size.
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Centre point.
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.left + self.width * 0.5, self.top + self.height * 0.5)
    }
}
