//! Reduced-motion policy.
//!
//! A single source of truth for whether visual effects should be
//! suppressed. The policy is an explicitly constructed object handed to the
//! runtime, never a global. It evaluates lazily on first query and keeps
//! that answer until [`MotionPolicy::refresh`] is called.

use std::cell::Cell;

use crate::options::PolicyOptions;

/// Where the policy reads accessibility and device information from.
pub trait MotionEnvironment {
    /// Whether the user asked the OS/browser to reduce motion.
    fn prefers_reduced_motion(&self) -> bool;

    /// Logical CPU count, when the platform exposes it.
    fn hardware_concurrency(&self) -> Option<u32>;

    /// Approximate device memory in gigabytes, when exposed.
    fn device_memory_gb(&self) -> Option<f64>;
}

/// Environment with a fixed answer and no device information.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPreference(pub bool);

impl MotionEnvironment for FixedPreference {
    fn prefers_reduced_motion(&self) -> bool {
        self.0
    }

    fn hardware_concurrency(&self) -> Option<u32> {
        None
    }

    fn device_memory_gb(&self) -> Option<f64> {
        None
    }
}

/// Decides whether animations should be replaced by their end state.
pub struct MotionPolicy {
    environment: Box<dyn MotionEnvironment>,
    options: PolicyOptions,
    cached: Cell<Option<bool>>,
}

impl MotionPolicy {
    /// Policy reading from `environment`. Nothing is evaluated yet.
    pub fn new(
        environment: impl MotionEnvironment + 'static,
        options: PolicyOptions,
    ) -> Self {
        Self {
            environment: Box::new(environment),
            options,
            cached: Cell::new(None),
        }
    }

    /// Policy that always answers `reduce`.
    pub fn fixed(reduce: bool) -> Self {
        Self::new(FixedPreference(reduce), PolicyOptions::default())
    }

    /// Whether animations should be skipped. Evaluated once, then cached.
    pub fn should_reduce_motion(&self) -> bool {
        match self.cached.get() {
            Some(reduce) => reduce,
            None => self.refresh(),
        }
    }

    /// Re-read the environment and replace the cached answer.
    pub fn refresh(&self) -> bool {
        let reduce = self.evaluate();
        if self.cached.replace(Some(reduce)) != Some(reduce) {
            log::debug!("reduced motion policy: {reduce}");
        }
        reduce
    }

    /// Whether the policy has been evaluated at least once.
    pub fn is_initialized(&self) -> bool {
        self.cached.get().is_some()
    }

    fn evaluate(&self) -> bool {
        if self.environment.prefers_reduced_motion() {
            return true;
        }
        if !self.options.device_heuristics {
            return false;
        }
        let few_cores = self
            .environment
            .hardware_concurrency()
            .is_some_and(|cores| cores <= self.options.low_end_cores);
        let little_memory = self
            .environment
            .device_memory_gb()
            .is_some_and(|gb| gb <= self.options.low_end_memory_gb);
        few_cores || little_memory
    }
}

impl std::fmt::Debug for MotionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotionPolicy")
            .field("options", &self.options)
            .field("cached", &self.cached.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;

    struct Device {
        prefers: Rc<Cell<bool>>,
        cores: Option<u32>,
        memory: Option<f64>,
    }

    impl MotionEnvironment for Device {
        fn prefers_reduced_motion(&self) -> bool {
            self.prefers.get()
        }

        fn hardware_concurrency(&self) -> Option<u32> {
            self.cores
        }

        fn device_memory_gb(&self) -> Option<f64> {
            self.memory
        }
    }

    fn device(cores: Option<u32>, memory: Option<f64>) -> (Device, Rc<Cell<bool>>) {
        let prefers = Rc::new(Cell::new(false));
        (
            Device {
                prefers: prefers.clone(),
                cores,
                memory,
            },
            prefers,
        )
    }

    #[test]
    fn lazily_initialized() {
        let policy = MotionPolicy::fixed(true);
        assert!(!policy.is_initialized());
        assert!(policy.should_reduce_motion());
        assert!(policy.is_initialized());
    }

    #[test]
    fn low_end_devices_reduce_motion() {
        let (env, _) = device(Some(2), Some(8.0));
        assert!(MotionPolicy::new(env, PolicyOptions::default()).should_reduce_motion());

        let (env, _) = device(Some(8), Some(1.0));
        assert!(MotionPolicy::new(env, PolicyOptions::default()).should_reduce_motion());

        let (env, _) = device(Some(8), None);
        assert!(!MotionPolicy::new(env, PolicyOptions::default()).should_reduce_motion());
    }

    #[test]
    fn heuristics_can_be_disabled() {
        let (env, _) = device(Some(1), Some(0.5));
        let options = PolicyOptions {
            device_heuristics: false,
            ..PolicyOptions::default()
        };
        assert!(!MotionPolicy::new(env, options).should_reduce_motion());
    }

    #[test]
    fn cached_until_refresh() {
        let (env, prefers) = device(None, None);
        let policy = MotionPolicy::new(env, PolicyOptions::default());
        assert!(!policy.should_reduce_motion());

        prefers.set(true);
        assert!(!policy.should_reduce_motion(), "answer must stay cached");
        assert!(policy.refresh());
        assert!(policy.should_reduce_motion());
    }
}
