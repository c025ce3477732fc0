//! Browser bindings (feature `web`).
//!
//! - [`DomTarget`]: an `HtmlElement` as an animation target
//! - [`BrowserViewport`]: `IntersectionObserver` as the visibility primitive
//! - [`BrowserEnvironment`]: `matchMedia` and navigator device hints
//! - [`FrameLoop`]: drives the controller from `requestAnimationFrame`
//! - [`attach_magnetic`] / [`attach_magnetic_cursor`] / [`attach_parallax`]:
//!   pointer and scroll wiring

mod dom;
mod environment;
mod frame;
mod listeners;
mod viewport;

pub use dom::DomTarget;
pub use environment::{watch_reduced_motion, BrowserEnvironment};
pub use frame::FrameLoop;
pub use listeners::{attach_magnetic, attach_magnetic_cursor, attach_parallax};
pub use viewport::BrowserViewport;

use crate::error::MotifError;

/// Route `log` output to the browser console and install the panic hook.
pub fn init_logging(level: log::Level) {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(level).is_err() {
        log::debug!("console logger already installed");
    }
}

/// The global `window`.
pub(crate) fn window() -> Result<web_sys::Window, MotifError> {
    web_sys::window().ok_or_else(|| MotifError::Dom("no global window".to_owned()))
}

/// Format a thrown JS value for an error message.
pub(crate) fn js_error(context: &str, value: &wasm_bindgen::JsValue) -> MotifError {
    MotifError::Dom(format!("{context}: {value:?}"))
}
