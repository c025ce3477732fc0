// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Animation lifecycle management for scroll-driven UI effects.
//!
//! Motif runs the motion layer of a page: reveal-on-scroll, staggered
//! entrances, text effects, pointer-follow and parallax. Every task,
//! visibility subscription and listener it creates is owned by a
//! [`registry::TriggerRegistry`], so unmounting a component releases all
//! of it in one call, and every start consults the user's reduced-motion
//! preference.
//!
//! # Key entry points
//!
//! - [`controller::AnimationController`] - the shared runtime, policy and
//!   options handle
//! - [`observer::observe`] - threshold-crossing visibility callbacks
//! - [`registry::TriggerRegistry`] - per-component teardown scope
//! - [`policy::MotionPolicy`] - reduced-motion decision
//! - [`effects`] - reveal, text, pointer and scroll presets
//! - [`options::MotionOptions`] - TOML presets with a JSON schema
//!
//! # Architecture
//!
//! Everything is single-threaded. The runtime owns its tasks and is
//! advanced by [`controller::AnimationController::tick`], either from the
//! browser's animation frames (`web::FrameLoop`, feature `web`) or from
//! a [`headless`] clock. Handles share only a status cell with the
//! runtime, so cancelling never needs the runtime borrowed. Targets are
//! held weakly: a task whose element went away cancels itself.

pub mod animation;
pub mod controller;
pub mod effects;
pub mod error;
pub mod headless;
pub mod observer;
pub mod options;
pub mod policy;
pub mod registry;
pub mod util;
#[cfg(feature = "web")]
pub mod web;
