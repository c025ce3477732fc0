//! Owner-scoped bookkeeping for animation resources.
//!
//! A [`TriggerRegistry`] is created when a UI component mounts. Everything
//! the component starts (tasks, visibility subscriptions, listener guards,
//! scroll triggers) is registered with it, and one [`dispose_all`] at
//! unmount releases all of it. Dropping the registry disposes whatever is
//! still registered.
//!
//! [`dispose_all`]: TriggerRegistry::dispose_all

use std::cell::RefCell;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use crate::error::MotifError;

/// A resource that can be released by a registry.
pub trait Disposable {
    /// Short description for logs.
    fn label(&self) -> String;

    /// Whether the resource still holds anything that needs releasing.
    fn is_live(&self) -> bool;

    /// Release the resource. Must be idempotent.
    fn dispose(&self) -> Result<(), MotifError>;

    /// Identity shared by every clone of the resource, used to tell a
    /// re-registration apart from a replacement. `None` if unknown.
    fn resource_key(&self) -> Option<usize> {
        None
    }
}

/// Collection of resources owned by one UI component instance.
///
/// Methods take `&self` so the registry can be shared with callbacks
/// (for example a visibility callback that starts tasks) through an `Rc`.
pub struct TriggerRegistry {
    owner: String,
    entries: RefCell<Vec<Box<dyn Disposable>>>,
}

impl TriggerRegistry {
    /// Empty registry for `owner`.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            entries: RefCell::new(Vec::new()),
        }
    }

    /// Name of the owning component.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Add a resource to the live set and hand it back for chaining.
    ///
    /// Entries that finished on their own are pruned first, so the set
    /// only ever holds live resources.
    pub fn register<R: Disposable + Clone + 'static>(&self, resource: R) -> R {
        let mut entries = self.entries.borrow_mut();
        entries.retain(|e| e.is_live());
        if resource.is_live() {
            entries.push(Box::new(resource.clone()));
        }
        resource
    }

    /// Register an optional resource (e.g. the result of
    /// [`observe`](crate::observer::observe)), passing `None` through.
    pub fn register_opt<R: Disposable + Clone + 'static>(
        &self,
        resource: Option<R>,
    ) -> Option<R> {
        resource.map(|r| self.register(r))
    }

    /// Register every resource in `resources`.
    pub fn register_all<R: Disposable + Clone + 'static>(
        &self,
        resources: impl IntoIterator<Item = R>,
    ) -> Vec<R> {
        resources.into_iter().map(|r| self.register(r)).collect()
    }

    /// Number of registered resources that are still live.
    pub fn live_count(&self) -> usize {
        self.entries.borrow().iter().filter(|e| e.is_live()).count()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Release every registered resource, then clear the set.
    ///
    /// Best effort: a resource that errors or panics is logged and the
    /// rest are still released. Calling this again is a no-op. Returns the
    /// number of resources that failed to release cleanly.
    pub fn dispose_all(&self) -> usize {
        // Take the entries first; resources may touch the registry while
        // releasing.
        let entries = std::mem::take(&mut *self.entries.borrow_mut());
        if entries.is_empty() {
            return 0;
        }

        let total = entries.len();
        let mut failures = 0;
        for entry in entries {
            let label = entry.label();
            match catch_unwind(AssertUnwindSafe(|| entry.dispose())) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    failures += 1;
                    log::warn!("{}: {e}", self.owner);
                }
                Err(_) => {
                    failures += 1;
                    log::warn!("{}: {label} panicked while disposing", self.owner);
                }
            }
        }
        log::debug!(
            "{}: disposed {total} resources ({failures} failed)",
            self.owner
        );
        failures
    }
}

impl Drop for TriggerRegistry {
    fn drop(&mut self) {
        if !self.entries.get_mut().is_empty() {
            let _ = self.dispose_all();
        }
    }
}

impl fmt::Debug for TriggerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerRegistry")
            .field("owner", &self.owner)
            .field("entries", &self.entries.borrow().len())
            .finish()
    }
}

struct GuardInner {
    label: String,
    teardown: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl GuardInner {
    fn run(&self) {
        let teardown = self.teardown.borrow_mut().take();
        if let Some(teardown) = teardown {
            teardown();
        }
    }
}

impl Drop for GuardInner {
    fn drop(&mut self) {
        if let Some(teardown) = self.teardown.get_mut().take() {
            teardown();
        }
    }
}

/// A matched teardown for something attached elsewhere, such as a pair of
/// pointer listeners. The teardown runs once: on [`release`], on registry
/// disposal, or when the last clone drops.
///
/// [`release`]: ListenerGuard::release
#[derive(Clone)]
pub struct ListenerGuard {
    inner: Rc<GuardInner>,
}

impl ListenerGuard {
    /// Guard that runs `teardown` when released.
    pub fn new(label: impl Into<String>, teardown: impl FnOnce() + 'static) -> Self {
        Self {
            inner: Rc::new(GuardInner {
                label: label.into(),
                teardown: RefCell::new(Some(Box::new(teardown))),
            }),
        }
    }

    /// Run the teardown now. Idempotent.
    pub fn release(&self) {
        self.inner.run();
    }

    /// Whether the teardown has not run yet.
    pub fn is_attached(&self) -> bool {
        self.inner.teardown.borrow().is_some()
    }
}

impl fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("label", &self.inner.label)
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl Disposable for ListenerGuard {
    fn label(&self) -> String {
        self.inner.label.clone()
    }

    fn is_live(&self) -> bool {
        self.is_attached()
    }

    fn dispose(&self) -> Result<(), MotifError> {
        self.release();
        Ok(())
    }
}
