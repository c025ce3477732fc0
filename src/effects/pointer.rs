//! Pointer-driven effects: magnetic elements and a following cursor.

use glam::Vec2;

use super::Rect;
use crate::animation::{IntoTargetRef, PropertyValues, TaskConfig, TaskHandle};
use crate::controller::AnimationController;
use crate::options::MagneticOptions;

/// Pulls an element toward the pointer while it hovers and springs it
/// back when the pointer leaves.
///
/// Hosts call [`on_move`](Self::on_move) and [`on_leave`](Self::on_leave)
/// from their pointer listeners. Every call starts a fresh task; the
/// newest one takes over the element's offset from the previous one.
#[derive(Debug, Clone)]
pub struct MagneticEffect {
    options: MagneticOptions,
}

impl MagneticEffect {
    /// Effect with the given tuning.
    pub fn new(options: MagneticOptions) -> Self {
        Self { options }
    }

    /// Effect tuned by the controller's options.
    pub fn from_controller(ctrl: &AnimationController) -> Self {
        Self::new(ctrl.options().magnetic.clone())
    }

    /// Tuning in use.
    pub fn options(&self) -> &MagneticOptions {
        &self.options
    }

    /// Offset the element should settle at for a pointer at `pointer`.
    pub fn offset(&self, rect: Rect, pointer: Vec2) -> Vec2 {
        (pointer - rect.center()) * self.options.strength
    }

    /// Follow the pointer.
    pub fn on_move(
        &self,
        ctrl: &AnimationController,
        target: &impl IntoTargetRef,
        rect: Rect,
        pointer: Vec2,
    ) -> TaskHandle {
        let offset = self.offset(rect, pointer);
        ctrl.to(
            target,
            PropertyValues::new().x(offset.x).y(offset.y),
            TaskConfig::new(self.options.follow())
                .ease(self.options.follow_ease)
                .named("magnetic"),
        )
    }

    /// Return to rest.
    pub fn on_leave(&self, ctrl: &AnimationController, target: &impl IntoTargetRef) -> TaskHandle {
        ctrl.to(
            target,
            PropertyValues::new().x(0.0).y(0.0),
            TaskConfig::new(self.options.release())
                .ease(self.options.release_ease)
                .named("magnetic-release"),
        )
    }
}

impl Default for MagneticEffect {
    fn default() -> Self {
        Self::new(MagneticOptions::default())
    }
}

/// Glides a custom cursor element to the pointer while it moves over an
/// area. The cursor is positioned relative to the area's top-left corner.
#[derive(Debug, Clone)]
pub struct MagneticCursor {
    options: MagneticOptions,
}

impl MagneticCursor {
    /// Cursor with the given tuning; only the `cursor_*` fields apply.
    pub fn new(options: MagneticOptions) -> Self {
        Self { options }
    }

    /// Cursor tuned by the controller's options.
    pub fn from_controller(ctrl: &AnimationController) -> Self {
        Self::new(ctrl.options().magnetic.clone())
    }

    /// Where the cursor belongs for a pointer at `pointer` over `area`.
    pub fn position(&self, area: Rect, pointer: Vec2) -> Vec2 {
        pointer - Vec2::new(area.left, area.top)
    }

    /// Chase the pointer.
    pub fn on_move(
        &self,
        ctrl: &AnimationController,
        cursor: &impl IntoTargetRef,
        area: Rect,
        pointer: Vec2,
    ) -> TaskHandle {
        let at = self.position(area, pointer);
        ctrl.to(
            cursor,
            PropertyValues::new().x(at.x).y(at.y),
            TaskConfig::new(self.options.cursor())
                .ease(self.options.cursor_ease)
                .named("magnetic-cursor"),
        )
    }
}

impl Default for MagneticCursor {
    fn default() -> Self {
        Self::new(MagneticOptions::default())
    }
}
