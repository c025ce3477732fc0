//! DOM elements as animation targets.

use std::cell::RefCell;
use std::fmt::Write as _;

use web_sys::HtmlElement;

use super::js_error;
use crate::animation::{AnimationTarget, Property, PropertyValues};
use crate::effects::Rect;

/// CSS custom property receiving [`Property::GradientAngle`].
const GRADIENT_ANGLE_VAR: &str = "--motif-gradient-angle";

/// An `HtmlElement` driven through its inline style.
///
/// Translation, scale and rotation are folded into one `transform`.
/// Values are remembered on write, so reads return what the runtime last
/// applied rather than parsing computed styles.
#[derive(Debug)]
pub struct DomTarget {
    element: HtmlElement,
    values: RefCell<PropertyValues>,
}

impl DomTarget {
    /// Wrap an element.
    pub fn new(element: HtmlElement) -> Self {
        Self {
            element,
            values: RefCell::new(PropertyValues::new()),
        }
    }

    /// The wrapped element.
    pub fn element(&self) -> &HtmlElement {
        &self.element
    }

    /// Bounding box in viewport pixels.
    pub fn rect(&self) -> Rect {
        let r = self.element.get_bounding_client_rect();
        Rect::new(r.left() as f32, r.top() as f32, r.width() as f32, r.height() as f32)
    }

    fn apply(&self, values: &PropertyValues) {
        let get = |p: Property| values.get(p).unwrap_or_else(|| p.identity());

        let mut transform = String::new();
        if values.contains(Property::X) || values.contains(Property::Y) {
            let _ = write!(transform, "translate({}px, {}px)", get(Property::X), get(Property::Y));
        }
        if values.contains(Property::Scale) {
            let _ = write!(transform, " scale({})", get(Property::Scale));
        }
        if values.contains(Property::Rotate) {
            let _ = write!(transform, " rotate({}deg)", get(Property::Rotate));
        }
        if !transform.is_empty() {
            self.set_style("transform", transform.trim_start());
        }
        if let Some(opacity) = values.get(Property::Opacity) {
            self.set_style("opacity", &opacity.to_string());
        }
        if let Some(angle) = values.get(Property::GradientAngle) {
            self.set_style(GRADIENT_ANGLE_VAR, &format!("{angle}deg"));
        }
    }

    fn set_style(&self, name: &str, value: &str) {
        if let Err(e) = self.element.style().set_property(name, value) {
            log::debug!("{}", js_error(&format!("set {name}"), &e));
        }
    }
}

impl AnimationTarget for DomTarget {
    fn is_attached(&self) -> bool {
        self.element.is_connected()
    }

    fn read(&self, property: Property) -> Option<f32> {
        self.values.borrow().get(property)
    }

    fn write(&self, values: &PropertyValues) {
        let merged = {
            let mut current = self.values.borrow_mut();
            for (p, v) in values.iter() {
                current.set(p, v);
            }
            current.clone()
        };
        self.apply(&merged);
    }

    fn write_text(&self, text: &str) {
        self.element.set_text_content(Some(text));
    }
}
