//! Pointer and scroll listeners wired to effects.

use std::rc::Rc;

use glam::Vec2;
use gloo::events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::MouseEvent;

use super::{window, DomTarget};
use crate::controller::AnimationController;
use crate::effects::{MagneticCursor, MagneticEffect, ScrollTrigger};
use crate::error::MotifError;
use crate::options::ParallaxOptions;
use crate::registry::ListenerGuard;

/// Attach the magnetic pointer effect to `target`.
///
/// Both pointer listeners are removed together when the returned guard
/// is released, disposed or dropped.
pub fn attach_magnetic(
    ctrl: &AnimationController,
    target: &Rc<DomTarget>,
    effect: MagneticEffect,
) -> ListenerGuard {
    let element = target.element().clone();
    let effect = Rc::new(effect);

    let on_move = {
        let ctrl = ctrl.clone();
        let effect = Rc::clone(&effect);
        let weak = Rc::downgrade(target);
        EventListener::new(&element, "mousemove", move |event| {
            let (Some(target), Some(event)) = (weak.upgrade(), event.dyn_ref::<MouseEvent>())
            else {
                return;
            };
            let pointer = Vec2::new(event.client_x() as f32, event.client_y() as f32);
            let _ = effect.on_move(&ctrl, &target, target.rect(), pointer);
        })
    };

    let on_leave = {
        let ctrl = ctrl.clone();
        let weak = Rc::downgrade(target);
        EventListener::new(&element, "mouseleave", move |_event| {
            if let Some(target) = weak.upgrade() {
                let _ = effect.on_leave(&ctrl, &target);
            }
        })
    };

    ListenerGuard::new("magnetic pointer", move || {
        drop(on_move);
        drop(on_leave);
    })
}

/// Make `cursor` follow the pointer while it moves over `area`.
///
/// The listener holds both elements weakly and is removed when the
/// returned guard is released, disposed or dropped.
pub fn attach_magnetic_cursor(
    ctrl: &AnimationController,
    area: &Rc<DomTarget>,
    cursor: &Rc<DomTarget>,
    effect: MagneticCursor,
) -> ListenerGuard {
    let ctrl = ctrl.clone();
    let weak_area = Rc::downgrade(area);
    let weak_cursor = Rc::downgrade(cursor);
    let on_move = EventListener::new(area.element(), "mousemove", move |event| {
        let (Some(area), Some(cursor), Some(event)) = (
            weak_area.upgrade(),
            weak_cursor.upgrade(),
            event.dyn_ref::<MouseEvent>(),
        ) else {
            return;
        };
        let pointer = Vec2::new(event.client_x() as f32, event.client_y() as f32);
        let _ = effect.on_move(&ctrl, &cursor, area.rect(), pointer);
    });
    ListenerGuard::new("magnetic cursor", move || drop(on_move))
}

/// Move `target` with page scrolling.
///
/// The scroll and resize listeners live as long as the returned trigger
/// is active; killing or disposing it removes them.
pub fn attach_parallax(
    ctrl: &AnimationController,
    target: &Rc<DomTarget>,
    options: ParallaxOptions,
) -> Result<ScrollTrigger, MotifError> {
    let window = window()?;
    let trigger = ScrollTrigger::parallax(ctrl, target, options);

    let update = {
        let ctrl = ctrl.clone();
        let weak_target = Rc::downgrade(target);
        let weak_trigger = trigger.downgrade();
        let window = window.clone();
        move || {
            let (Some(target), Some(trigger)) = (weak_target.upgrade(), weak_trigger.upgrade())
            else {
                return;
            };
            let height = window
                .inner_height()
                .ok()
                .and_then(|h| h.as_f64())
                .unwrap_or_default() as f32;
            let _ = trigger.update(target.rect(), height, ctrl.now());
        }
    };
    update();

    // gloo listeners are passive by default.
    let update = Rc::new(update);
    let on_scroll = {
        let update = Rc::clone(&update);
        EventListener::new(&window, "scroll", move |_event| (*update)())
    };
    let on_resize = EventListener::new(&window, "resize", move |_event| (*update)());

    trigger.on_kill(move || {
        drop(on_scroll);
        drop(on_resize);
    });
    Ok(trigger)
}
