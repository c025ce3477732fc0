//! Reduced-motion preference and device hints from the browser.

use gloo::events::EventListener;
use wasm_bindgen::JsValue;

use super::window;
use crate::controller::AnimationController;
use crate::policy::MotionEnvironment;
use crate::registry::ListenerGuard;

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

/// Reads the motion preference and device hints from the browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserEnvironment;

impl MotionEnvironment for BrowserEnvironment {
    fn prefers_reduced_motion(&self) -> bool {
        window()
            .ok()
            .and_then(|w| w.match_media(REDUCED_MOTION_QUERY).ok().flatten())
            .is_some_and(|q| q.matches())
    }

    fn hardware_concurrency(&self) -> Option<u32> {
        let cores = window().ok()?.navigator().hardware_concurrency();
        (cores.is_finite() && cores >= 1.0).then(|| cores as u32)
    }

    fn device_memory_gb(&self) -> Option<f64> {
        // Not in web-sys: Chromium-only `navigator.deviceMemory`.
        let navigator = window().ok()?.navigator();
        js_sys::Reflect::get(&navigator, &JsValue::from_str("deviceMemory"))
            .ok()?
            .as_f64()
    }
}

/// Re-evaluate the controller's policy whenever the user flips the
/// reduced-motion preference. Drop or release the guard to stop.
pub fn watch_reduced_motion(ctrl: &AnimationController) -> Option<ListenerGuard> {
    let query = window().ok()?.match_media(REDUCED_MOTION_QUERY).ok()??;
    let ctrl = ctrl.clone();
    let listener = EventListener::new(&query, "change", move |_event| {
        let _ = ctrl.policy().refresh();
    });
    Some(ListenerGuard::new("reduced-motion watch", move || drop(listener)))
}
