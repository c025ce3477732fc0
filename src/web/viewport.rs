//! `IntersectionObserver` as the visibility primitive.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use super::{js_error, DomTarget};
use crate::animation::AnimationTarget;
use crate::error::MotifError;
use crate::observer::{Disconnect, EntrySink, IntersectionEntry, ObserveOptions, ViewportObserver};

/// `IntersectionObserver`, one native observer per observation.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserViewport;

impl ViewportObserver for BrowserViewport {
    type Element = DomTarget;

    fn is_attached(&self, element: &DomTarget) -> bool {
        element.is_attached()
    }

    fn connect(
        &self,
        element: &DomTarget,
        options: &ObserveOptions,
        mut sink: EntrySink,
    ) -> Result<Disconnect, MotifError> {
        let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
            move |entries: js_sys::Array, _observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                        continue;
                    };
                    sink(IntersectionEntry {
                        is_intersecting: entry.is_intersecting(),
                        ratio: entry.intersection_ratio() as f32,
                    });
                }
            },
        );

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(f64::from(options.threshold())));
        init.set_root_margin(&options.root_margin);

        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
                .map_err(|e| js_error("IntersectionObserver", &e))?;
        observer.observe(element.element());

        Ok(Box::new(move || {
            observer.disconnect();
            drop(callback);
        }))
    }
}
