//! Frame scheduling through `requestAnimationFrame`.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use gloo::render::{request_animation_frame, AnimationFrame};

use crate::controller::AnimationController;
use crate::util::frame_timing::FrameTiming;

struct FrameInner {
    ctrl: AnimationController,
    frame: RefCell<Option<AnimationFrame>>,
    timing: RefCell<FrameTiming>,
    warned: Cell<bool>,
}

/// Ticks a controller once per `requestAnimationFrame` while it has
/// live tasks, and goes idle otherwise.
///
/// Installs itself as the controller's frame waker, so starting a task
/// anywhere schedules the next frame. Also measures the frame rate.
pub struct FrameLoop {
    inner: Rc<FrameInner>,
}

impl FrameLoop {
    /// Drive `ctrl` from animation frames.
    pub fn new(ctrl: &AnimationController) -> Self {
        let inner = Rc::new(FrameInner {
            ctrl: ctrl.clone(),
            frame: RefCell::new(None),
            timing: RefCell::new(FrameTiming::new(ctrl.now())),
            warned: Cell::new(false),
        });
        let weak: Weak<FrameInner> = Rc::downgrade(&inner);
        ctrl.set_frame_waker(move || {
            if let Some(inner) = weak.upgrade() {
                schedule(&inner);
            }
        });
        schedule(&inner);
        Self { inner }
    }

    /// Frames per second over the last full second.
    pub fn fps(&self) -> u32 {
        self.inner.timing.borrow().fps()
    }

    /// Whether the last measured second fell below 30 fps.
    pub fn is_low_performance(&self) -> bool {
        self.inner.timing.borrow().is_low_performance()
    }

    /// Cancel the pending frame. Starting a task schedules one again.
    pub fn stop(&self) {
        drop(self.inner.frame.borrow_mut().take());
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for FrameLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameLoop")
            .field("scheduled", &self.inner.frame.borrow().is_some())
            .field("fps", &self.fps())
            .finish()
    }
}

fn schedule(inner: &Rc<FrameInner>) {
    if inner.frame.borrow().is_some() {
        return;
    }
    let weak = Rc::downgrade(inner);
    let handle = request_animation_frame(move |_timestamp| {
        if let Some(inner) = weak.upgrade() {
            on_frame(&inner);
        }
    });
    *inner.frame.borrow_mut() = Some(handle);
}

fn on_frame(inner: &Rc<FrameInner>) {
    // The handle for this frame has fired; clear it so a new one can be
    // requested.
    drop(inner.frame.borrow_mut().take());

    let now = inner.ctrl.now();
    let measured = inner.timing.borrow_mut().record_frame(now);
    if let Some(fps) = measured {
        let low = inner.timing.borrow().is_low_performance();
        if low && !inner.warned.replace(true) {
            log::warn!("low frame rate: {fps} fps");
        } else if !low {
            inner.warned.set(false);
        }
    }

    if inner.ctrl.tick() {
        schedule(inner);
    }
}
