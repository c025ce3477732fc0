//! Command-line driver for the motif animation lifecycle manager.

use std::io::Write as _;
use std::path::Path;
use std::rc::Rc;

use motif::animation::{IntoTargetRef, Property, TargetRef};
use motif::controller::AnimationController;
use motif::effects::StaggeredVisibility;
use motif::error::MotifError;
use motif::headless::{ManualClock, ManualViewport, RecordingTarget};
use motif::observer::ObserveOptions;
use motif::options::MotionOptions;
use motif::policy::MotionPolicy;
use motif::registry::TriggerRegistry;
use motif::util::frame_timing::FrameTiming;
use web_time::Duration;

const USAGE: &str = "Usage: motif <schema | check PRESET | trace [PRESET] [--reduced]>";

/// Simulated display refresh for `trace`.
const FRAME: Duration = Duration::from_micros(16_667);

fn load_options(path: Option<&String>) -> Result<MotionOptions, MotifError> {
    match path {
        Some(path) => MotionOptions::load(Path::new(path)),
        None => Ok(MotionOptions::default()),
    }
}

fn print_schema() -> Result<(), MotifError> {
    let schema = serde_json::to_string_pretty(&MotionOptions::json_schema())
        .map_err(|e| MotifError::OptionsParse(e.to_string()))?;
    writeln!(std::io::stdout().lock(), "{schema}")?;
    Ok(())
}

fn check(path: &str) -> Result<(), MotifError> {
    let options = MotionOptions::load(Path::new(path))?;
    log::info!(
        "{path}: ok (reveal {}ms/{}ms stagger, threshold {})",
        options.reveal.duration_ms,
        options.reveal.stagger_ms,
        options.observer.threshold
    );
    Ok(())
}

/// Reveal a column of items the way a page would, logging each item's
/// opacity as the frames go by.
fn trace(options: MotionOptions, reduced: bool, items: usize) {
    let clock = Rc::new(ManualClock::new());
    let observe = ObserveOptions::from(&options.observer);
    let ctrl = AnimationController::new(options, MotionPolicy::fixed(reduced), clock.clone());
    let viewport = ManualViewport::new();
    let registry = TriggerRegistry::new("trace");

    let container = Rc::new(RecordingTarget::new());
    let targets: Vec<_> = (0..items).map(|_| Rc::new(RecordingTarget::new())).collect();
    let refs: Vec<TargetRef> = targets.iter().map(IntoTargetRef::target_ref).collect();

    let Some(group) = registry.register_opt(StaggeredVisibility::observe(
        &ctrl,
        &viewport,
        container.as_ref(),
        refs,
        &observe,
    )) else {
        log::error!("container not attached");
        return;
    };

    viewport.report(&container, 1.0);
    let mut timing = FrameTiming::new(ctrl.now());
    let mut frame = 0u32;
    loop {
        clock.advance(FRAME);
        frame += 1;
        let more = ctrl.tick();
        if let Some(fps) = timing.record_frame(ctrl.now()) {
            log::debug!("{fps} fps");
        }
        let opacities: Vec<String> = targets
            .iter()
            .map(|t| format!("{:.2}", t.value(Property::Opacity).unwrap_or(1.0)))
            .collect();
        log::info!("frame {frame:>3}: [{}]", opacities.join(", "));
        if !more {
            break;
        }
    }

    log::info!(
        "{} of {items} items revealed after {frame} frames",
        group.visible_items().len()
    );
    let failures = registry.dispose_all();
    if failures > 0 {
        log::warn!("{failures} resources failed to release");
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        Some("schema") => print_schema(),
        Some("check") => match args.get(1) {
            Some(path) => check(path),
            None => {
                log::error!("{USAGE}");
                std::process::exit(2);
            }
        },
        Some("trace") => {
            let reduced = args.iter().any(|a| a == "--reduced");
            let preset = args[1..].iter().find(|a| !a.starts_with("--"));
            load_options(preset).map(|options| trace(options, reduced, 5))
        }
        _ => {
            log::error!("{USAGE}");
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        log::error!("{e}");
        std::process::exit(1);
    }
}
