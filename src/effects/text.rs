//! Effects that animate an element's text content.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use web_time::Duration;

use crate::animation::{AnimationTarget, Channel, Effect, IntoTargetRef, TaskConfig, TaskHandle};
use crate::controller::AnimationController;
use crate::util::easing::EasingFunction;

/// How a [`Counter`] renders its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterFormat {
    /// Text before the number.
    pub prefix: String,
    /// Text after the number.
    pub suffix: String,
    /// Digits after the decimal point.
    pub decimals: usize,
}

impl CounterFormat {
    /// Render `value` as `{prefix}{value}{suffix}`.
    pub fn format(&self, value: f32) -> String {
        format!(
            "{}{value:.prec$}{}",
            self.prefix,
            self.suffix,
            prec = self.decimals
        )
    }
}

/// Counts a number from `from` to `to`.
#[derive(Debug, Clone)]
pub struct Counter {
    from: f32,
    to: f32,
    format: CounterFormat,
    active: bool,
}

impl Counter {
    /// Counter between two values.
    pub fn new(from: f32, to: f32, format: CounterFormat) -> Self {
        Self {
            from,
            to,
            format,
            active: true,
        }
    }
}

impl Effect for Counter {
    fn name(&self) -> &'static str {
        "counter"
    }

    fn channels(&self) -> Vec<Channel> {
        if self.active {
            vec![Channel::Text]
        } else {
            Vec::new()
        }
    }

    fn release(&mut self, channel: Channel) -> bool {
        if channel == Channel::Text {
            self.active = false;
        }
        self.active
    }

    fn render(&mut self, target: &dyn AnimationTarget, eased_t: f32) {
        if self.active {
            let value = self.from + (self.to - self.from) * eased_t;
            target.write_text(&self.format.format(value));
        }
    }
}

/// Types `text` one character at a time.
#[derive(Debug, Clone)]
pub struct Typewriter {
    chars: Vec<char>,
    cursor: Option<char>,
    shown: Option<usize>,
    active: bool,
}

impl Typewriter {
    /// Typewriter for `text`, with an optional trailing cursor.
    pub fn new(text: &str, cursor: Option<char>) -> Self {
        Self {
            chars: text.chars().collect(),
            cursor,
            shown: None,
            active: true,
        }
    }

    /// Characters visible at progress `t`. The first one appears at once.
    fn visible_at(&self, t: f32) -> usize {
        let n = self.chars.len();
        if n == 0 {
            return 0;
        }
        let typed = (t.clamp(0.0, 1.0) * n as f32).floor() as usize + 1;
        typed.min(n)
    }
}

impl Effect for Typewriter {
    fn name(&self) -> &'static str {
        "typewriter"
    }

    fn channels(&self) -> Vec<Channel> {
        if self.active {
            vec![Channel::Text]
        } else {
            Vec::new()
        }
    }

    fn release(&mut self, channel: Channel) -> bool {
        if channel == Channel::Text {
            self.active = false;
        }
        self.active
    }

    fn render(&mut self, target: &dyn AnimationTarget, eased_t: f32) {
        if !self.active {
            return;
        }
        let visible = self.visible_at(eased_t);
        if self.shown == Some(visible) {
            return;
        }
        self.shown = Some(visible);
        let mut text: String = self.chars[..visible].iter().collect();
        if let Some(cursor) = self.cursor {
            text.push(cursor);
        }
        target.write_text(&text);
    }
}

/// Resolves `text` left to right while the unresolved tail cycles
/// through random characters.
#[derive(Debug, Clone)]
pub struct Scramble {
    chars: Vec<char>,
    charset: Vec<char>,
    rng: StdRng,
    resolved: Option<usize>,
    active: bool,
}

impl Scramble {
    /// Scramble drawing noise from `charset`, seeded from the thread rng.
    pub fn new(text: &str, charset: &str) -> Self {
        Self::with_rng(text, charset, StdRng::from_rng(&mut rand::rng()))
    }

    /// Deterministic scramble for previews and tests.
    pub fn seeded(text: &str, charset: &str, seed: u64) -> Self {
        Self::with_rng(text, charset, StdRng::seed_from_u64(seed))
    }

    fn with_rng(text: &str, charset: &str, rng: StdRng) -> Self {
        Self {
            chars: text.chars().collect(),
            charset: charset.chars().collect(),
            rng,
            resolved: None,
            active: true,
        }
    }

    fn noise(&mut self) -> char {
        if self.charset.is_empty() {
            return ' ';
        }
        let i = self.rng.random_range(0..self.charset.len());
        self.charset[i]
    }
}

impl Effect for Scramble {
    fn name(&self) -> &'static str {
        "scramble"
    }

    fn channels(&self) -> Vec<Channel> {
        if self.active {
            vec![Channel::Text]
        } else {
            Vec::new()
        }
    }

    fn release(&mut self, channel: Channel) -> bool {
        if channel == Channel::Text {
            self.active = false;
        }
        self.active
    }

    fn render(&mut self, target: &dyn AnimationTarget, eased_t: f32) {
        if !self.active {
            return;
        }
        let n = self.chars.len();
        let resolved = ((eased_t.clamp(0.0, 1.0) * n as f32).floor() as usize).min(n);
        // Re-roll the noise once per step, not once per frame.
        if self.resolved == Some(resolved) {
            return;
        }
        self.resolved = Some(resolved);
        let mut text: String = self.chars[..resolved].iter().collect();
        for _ in resolved..n {
            let c = self.noise();
            text.push(c);
        }
        target.write_text(&text);
    }
}

fn per_char(step: Duration, chars: usize) -> Duration {
    step.saturating_mul(u32::try_from(chars).unwrap_or(u32::MAX))
}

/// Count the target's text up to `to` over the configured counter time.
pub fn counter(
    ctrl: &AnimationController,
    target: &impl IntoTargetRef,
    to: f32,
    format: CounterFormat,
) -> TaskHandle {
    let duration = Duration::from_millis(ctrl.options().text.counter_ms);
    ctrl.animate(
        target,
        Counter::new(0.0, to, format),
        TaskConfig::new(duration)
            .ease(EasingFunction::DEFAULT)
            .named("counter"),
    )
}

/// Type `text` into the target, one character per configured step.
pub fn typewriter(
    ctrl: &AnimationController,
    target: &impl IntoTargetRef,
    text: &str,
) -> TaskHandle {
    let options = &ctrl.options().text;
    let step = Duration::from_millis(options.typewriter_char_ms);
    let cursor = options.typewriter_cursor.then_some(options.cursor_char);
    let effect = Typewriter::new(text, cursor);
    let duration = per_char(step, effect.chars.len());
    ctrl.animate(
        target,
        effect,
        TaskConfig::new(duration)
            .ease(EasingFunction::Linear)
            .named("typewriter"),
    )
}

/// Scramble the target's text into `text`.
pub fn text_scramble(
    ctrl: &AnimationController,
    target: &impl IntoTargetRef,
    text: &str,
) -> TaskHandle {
    let options = &ctrl.options().text;
    let step = Duration::from_millis(options.scramble_char_ms);
    let effect = Scramble::new(text, &options.scramble_charset);
    let duration = per_char(step, effect.chars.len());
    ctrl.animate(
        target,
        effect,
        TaskConfig::new(duration)
            .ease(EasingFunction::Linear)
            .named("scramble"),
    )
}
