//! Easing functions for animation interpolation.
//!
//! Easing curves are a pluggable enumeration addressed by name, using the
//! naming scheme common to web tweening engines (`"power2.out"`,
//! `"back.out(1.7)"`, `"elastic.out(1, 0.3)"`). Curves are close to the
//! familiar shapes but are not meant to be bit-exact reproductions.

use std::f32::consts::{FRAC_PI_2, PI, TAU};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MotifError;

/// Default overshoot for the `back` family.
const BACK_OVERSHOOT: f32 = 1.70158;

/// Easing function variants for animation curves.
///
/// Input is clamped to `[0, 1]`. Output starts at 0 and ends at 1 but
/// the `back` and `elastic` families leave that range in between.
///
/// Serializes as its name, e.g. `"back.out(1.7)"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EasingFunction {
    /// Linear interpolation (no easing). Named `none` or `linear`.
    Linear,
    /// Polynomial ease-in of degree `power + 1`.
    PowerIn(u8),
    /// Polynomial ease-out of degree `power + 1`.
    PowerOut(u8),
    /// Polynomial ease-in-out of degree `power + 1`.
    PowerInOut(u8),
    /// Quarter sine ease-in.
    SineIn,
    /// Quarter sine ease-out.
    SineOut,
    /// Half cosine ease-in-out.
    SineInOut,
    /// Pull back before moving toward the target.
    BackIn {
        /// Overshoot amount.
        overshoot: f32,
    },
    /// Overshoot the target, then settle.
    BackOut {
        /// Overshoot amount.
        overshoot: f32,
    },
    /// Pull back, overshoot, settle.
    BackInOut {
        /// Overshoot amount.
        overshoot: f32,
    },
    /// Damped oscillation that winds up into the target.
    ElasticIn {
        /// Oscillation amplitude (values below 1 behave like 1).
        amplitude: f32,
        /// Oscillation period in normalized time.
        period: f32,
    },
    /// Damped oscillation settling onto the target.
    ElasticOut {
        /// Oscillation amplitude (values below 1 behave like 1).
        amplitude: f32,
        /// Oscillation period in normalized time.
        period: f32,
    },
    /// Square root ease-out (fast start, gradual slow).
    SqrtOut,
    /// Cubic Hermite interpolation with configurable control points.
    /// Formula: c1·3t(1-t)² + c2·3(1-t)t² + t³
    CubicHermite {
        /// First control value.
        c1: f32,
        /// Second control value.
        c2: f32,
    },
}

impl EasingFunction {
    /// Default easing: `power2.out`.
    pub const DEFAULT: EasingFunction = EasingFunction::PowerOut(2);

    /// Elastic settle used when pointer effects release.
    pub const ELASTIC_RELEASE: EasingFunction = EasingFunction::ElasticOut {
        amplitude: 1.0,
        period: 0.3,
    };

    /// Evaluate the easing function at time t.
    ///
    /// Input t is clamped to [0.0, 1.0]; the endpoints always map to
    /// exactly 0.0 and 1.0.
    #[inline]
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        if t == 0.0 || t == 1.0 {
            return t;
        }

        match *self {
            EasingFunction::Linear => t,
            EasingFunction::PowerIn(p) => power_in(t, p),
            EasingFunction::PowerOut(p) => 1.0 - power_in(1.0 - t, p),
            EasingFunction::PowerInOut(p) => {
                if t < 0.5 {
                    0.5 * power_in(2.0 * t, p)
                } else {
                    1.0 - 0.5 * power_in(2.0 * (1.0 - t), p)
                }
            }
            EasingFunction::SineIn => 1.0 - (t * FRAC_PI_2).cos(),
            EasingFunction::SineOut => (t * FRAC_PI_2).sin(),
            EasingFunction::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
            EasingFunction::BackIn { overshoot } => back_in(t, overshoot),
            EasingFunction::BackOut { overshoot } => {
                1.0 - back_in(1.0 - t, overshoot)
            }
            EasingFunction::BackInOut { overshoot } => {
                if t < 0.5 {
                    0.5 * back_in(2.0 * t, overshoot)
                } else {
                    1.0 - 0.5 * back_in(2.0 * (1.0 - t), overshoot)
                }
            }
            EasingFunction::ElasticIn { amplitude, period } => {
                1.0 - elastic_out(1.0 - t, amplitude, period)
            }
            EasingFunction::ElasticOut { amplitude, period } => {
                elastic_out(t, amplitude, period)
            }
            EasingFunction::SqrtOut => t.sqrt(),
            EasingFunction::CubicHermite { c1, c2 } => {
                let omt = 1.0 - t;
                c1 * 3.0 * t * omt * omt + c2 * 3.0 * omt * t * t + t * t * t
            }
        }
    }
}

#[inline]
fn power_in(t: f32, power: u8) -> f32 {
    t.powi(i32::from(power) + 1)
}

#[inline]
fn back_in(t: f32, s: f32) -> f32 {
    (s + 1.0) * t * t * t - s * t * t
}

#[inline]
fn elastic_out(t: f32, amplitude: f32, period: f32) -> f32 {
    let a = amplitude.max(1.0);
    let p = if period > 0.0 { period } else { 0.3 };
    let shift = p / TAU * (1.0 / a).asin();
    a * 2f32.powf(-10.0 * t) * ((t - shift) * TAU / p).sin() + 1.0
}

impl Default for EasingFunction {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for EasingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Linear => f.write_str("none"),
            Self::PowerIn(p) => write!(f, "power{p}.in"),
            Self::PowerOut(p) => write!(f, "power{p}.out"),
            Self::PowerInOut(p) => write!(f, "power{p}.inOut"),
            Self::SineIn => f.write_str("sine.in"),
            Self::SineOut => f.write_str("sine.out"),
            Self::SineInOut => f.write_str("sine.inOut"),
            Self::BackIn { overshoot } => write!(f, "back.in({overshoot})"),
            Self::BackOut { overshoot } => write!(f, "back.out({overshoot})"),
            Self::BackInOut { overshoot } => {
                write!(f, "back.inOut({overshoot})")
            }
            Self::ElasticIn { amplitude, period } => {
                write!(f, "elastic.in({amplitude}, {period})")
            }
            Self::ElasticOut { amplitude, period } => {
                write!(f, "elastic.out({amplitude}, {period})")
            }
            Self::SqrtOut => f.write_str("sqrt.out"),
            Self::CubicHermite { c1, c2 } => write!(f, "hermite({c1}, {c2})"),
        }
    }
}

/// Which half of the curve a name selects.
#[derive(Clone, Copy)]
enum Flavor {
    In,
    Out,
    InOut,
}

impl FromStr for EasingFunction {
    type Err = MotifError;

    /// Parse an easing name such as `power2.out` or `back.out(1.7)`.
    ///
    /// A family without a flavor (`"power3"`) defaults to `.out`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MotifError::InvalidEase(s.to_owned());
        let name = s.trim();

        let (head, args) = match name.find('(') {
            Some(open) => {
                let close = name.rfind(')').ok_or_else(invalid)?;
                if close < open {
                    return Err(invalid());
                }
                let args = name[open + 1..close]
                    .split(',')
                    .map(|a| a.trim().parse::<f32>().map_err(|_| invalid()))
                    .collect::<Result<Vec<_>, _>>()?;
                (&name[..open], args)
            }
            None => (name, Vec::new()),
        };

        let (family, flavor) = match head.split_once('.') {
            Some((family, "in")) => (family, Flavor::In),
            Some((family, "out")) => (family, Flavor::Out),
            Some((family, "inOut" | "inout")) => (family, Flavor::InOut),
            Some(_) => return Err(invalid()),
            None => (head, Flavor::Out),
        };

        let arg = |i: usize, default: f32| args.get(i).copied().unwrap_or(default);

        let easing = match family {
            "none" | "linear" | "power0" => EasingFunction::Linear,
            "quad" => power(1, flavor),
            "cubic" => power(2, flavor),
            "quart" => power(3, flavor),
            "quint" | "strong" => power(4, flavor),
            "sine" => match flavor {
                Flavor::In => EasingFunction::SineIn,
                Flavor::Out => EasingFunction::SineOut,
                Flavor::InOut => EasingFunction::SineInOut,
            },
            "back" => {
                let overshoot = arg(0, BACK_OVERSHOOT);
                match flavor {
                    Flavor::In => EasingFunction::BackIn { overshoot },
                    Flavor::Out => EasingFunction::BackOut { overshoot },
                    Flavor::InOut => EasingFunction::BackInOut { overshoot },
                }
            }
            "elastic" => {
                let amplitude = arg(0, 1.0);
                let period = arg(1, 0.3);
                match flavor {
                    Flavor::In => EasingFunction::ElasticIn { amplitude, period },
                    Flavor::Out | Flavor::InOut => {
                        EasingFunction::ElasticOut { amplitude, period }
                    }
                }
            }
            "sqrt" => EasingFunction::SqrtOut,
            "hermite" => EasingFunction::CubicHermite {
                c1: arg(0, 0.33),
                c2: arg(1, 1.0),
            },
            other => match other.strip_prefix("power").map(str::parse::<u8>) {
                Some(Ok(p @ 1..=4)) => power(p, flavor),
                _ => return Err(invalid()),
            },
        };
        Ok(easing)
    }
}

fn power(p: u8, flavor: Flavor) -> EasingFunction {
    match flavor {
        Flavor::In => EasingFunction::PowerIn(p),
        Flavor::Out => EasingFunction::PowerOut(p),
        Flavor::InOut => EasingFunction::PowerInOut(p),
    }
}

impl TryFrom<String> for EasingFunction {
    type Error = MotifError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EasingFunction> for String {
    fn from(value: EasingFunction) -> Self {
        value.to_string()
    }
}
