//! Easing curves for eased actions
//!
//! An [`Easing`] remaps the normalized progress of the action it wraps.
//! Curves may leave 0.0..=1.0 (elastic and back overshoot on purpose); the
//! wrapped action receives the remapped value unchanged.

use std::f32::consts::PI;

/// Default exponent for the power curves
pub const DEFAULT_EASE_RATE: f32 = 2.0;

/// Default oscillation period for the elastic curves
pub const DEFAULT_ELASTIC_PERIOD: f32 = 0.3;

/// Overshoot used by the back curves
pub const BACK_OVERSHOOT: f32 = 1.70158;

/// Easing function type
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Easing {
    #[default]
    Linear,
    /// `t^rate`
    In { rate: f32 },
    /// `t^(1/rate)`
    Out { rate: f32 },
    /// Power curve mirrored around the midpoint
    InOut { rate: f32 },
    SineIn,
    SineOut,
    SineInOut,
    ExponentialIn,
    ExponentialOut,
    ExponentialInOut,
    ElasticIn { period: f32 },
    ElasticOut { period: f32 },
    ElasticInOut { period: f32 },
    BounceIn,
    BounceOut,
    BounceInOut,
    BackIn,
    BackOut,
    BackInOut,
}

impl Easing {
    /// Power ease-in with the default rate
    pub const fn ease_in() -> Self {
        Easing::In {
            rate: DEFAULT_EASE_RATE,
        }
    }

    /// Power ease-out with the default rate
    pub const fn ease_out() -> Self {
        Easing::Out {
            rate: DEFAULT_EASE_RATE,
        }
    }

    /// Power ease-in-out with the default rate
    pub const fn ease_in_out() -> Self {
        Easing::InOut {
            rate: DEFAULT_EASE_RATE,
        }
    }

    /// Elastic ease-in with the default period
    pub const fn elastic_in() -> Self {
        Easing::ElasticIn {
            period: DEFAULT_ELASTIC_PERIOD,
        }
    }

    /// Elastic ease-out with the default period
    pub const fn elastic_out() -> Self {
        Easing::ElasticOut {
            period: DEFAULT_ELASTIC_PERIOD,
        }
    }

    /// Elastic ease-in-out with the default period
    pub const fn elastic_in_out() -> Self {
        Easing::ElasticInOut {
            period: DEFAULT_ELASTIC_PERIOD,
        }
    }

    /// Apply the easing function to a progress value (0.0 to 1.0)
    pub fn apply(&self, t: f32) -> f32 {
        match *self {
            Easing::Linear => t,
            Easing::In { rate } => t.powf(rate),
            Easing::Out { rate } => t.powf(1.0 / rate),
            Easing::InOut { rate } => power_in_out(t, rate),
            Easing::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Easing::SineOut => (t * PI / 2.0).sin(),
            Easing::SineInOut => -0.5 * ((PI * t).cos() - 1.0),
            Easing::ExponentialIn => {
                if t == 0.0 {
                    0.0
                } else {
                    2f32.powf(10.0 * (t - 1.0))
                }
            }
            Easing::ExponentialOut => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2f32.powf(-10.0 * t)
                }
            }
            Easing::ExponentialInOut => {
                if t == 0.0 || t == 1.0 {
                    return t;
                }
                let t = t * 2.0;
                if t < 1.0 {
                    0.5 * 2f32.powf(10.0 * (t - 1.0))
                } else {
                    0.5 * (2.0 - 2f32.powf(-10.0 * (t - 1.0)))
                }
            }
            Easing::ElasticIn { period } => {
                if t == 0.0 || t == 1.0 {
                    return t;
                }
                let t = t - 1.0;
                -2f32.powf(10.0 * t) * elastic_wave(t, period)
            }
            Easing::ElasticOut { period } => {
                if t == 0.0 || t == 1.0 {
                    return t;
                }
                2f32.powf(-10.0 * t) * elastic_wave(t, period) + 1.0
            }
            Easing::ElasticInOut { period } => {
                if t == 0.0 || t == 1.0 {
                    return t;
                }
                let t = t * 2.0 - 1.0;
                if t < 0.0 {
                    -0.5 * 2f32.powf(10.0 * t) * elastic_wave(t, period)
                } else {
                    0.5 * 2f32.powf(-10.0 * t) * elastic_wave(t, period) + 1.0
                }
            }
            Easing::BounceIn => 1.0 - bounce(1.0 - t),
            Easing::BounceOut => bounce(t),
            Easing::BounceInOut => {
                if t < 0.5 {
                    0.5 * (1.0 - bounce(1.0 - t * 2.0))
                } else {
                    0.5 * bounce(t * 2.0 - 1.0) + 0.5
                }
            }
            Easing::BackIn => {
                let s = BACK_OVERSHOOT;
                t * t * ((s + 1.0) * t - s)
            }
            Easing::BackOut => {
                let s = BACK_OVERSHOOT;
                let t = t - 1.0;
                t * t * ((s + 1.0) * t + s) + 1.0
            }
            Easing::BackInOut => {
                let s = BACK_OVERSHOOT * 1.525;
                let t = t * 2.0;
                if t < 1.0 {
                    t * t * ((s + 1.0) * t - s) / 2.0
                } else {
                    let t = t - 2.0;
                    t * t * ((s + 1.0) * t + s) / 2.0 + 1.0
                }
            }
        }
    }

    /// The curve to use when the eased action runs backwards
    ///
    /// Returns `None` for the elastic and back in-out curves, which have no
    /// defined reverse.
    pub fn reversed(&self) -> Option<Easing> {
        let reversed = match *self {
            Easing::Linear => Easing::Linear,
            // t^(1/rate) is the out curve of the same rate
            Easing::In { rate } => Easing::In { rate: 1.0 / rate },
            Easing::Out { rate } => Easing::Out { rate: 1.0 / rate },
            Easing::InOut { rate } => Easing::InOut { rate },
            Easing::SineIn => Easing::SineOut,
            Easing::SineOut => Easing::SineIn,
            Easing::SineInOut => Easing::SineInOut,
            Easing::ExponentialIn => Easing::ExponentialOut,
            Easing::ExponentialOut => Easing::ExponentialIn,
            Easing::ExponentialInOut => Easing::ExponentialInOut,
            Easing::ElasticIn { period } => Easing::ElasticOut { period },
            Easing::ElasticOut { period } => Easing::ElasticIn { period },
            Easing::ElasticInOut { .. } => return None,
            Easing::BounceIn => Easing::BounceOut,
            Easing::BounceOut => Easing::BounceIn,
            Easing::BounceInOut => Easing::BounceInOut,
            Easing::BackIn => Easing::BackOut,
            Easing::BackOut => Easing::BackIn,
            Easing::BackInOut => return None,
        };
        Some(reversed)
    }
}

/// Piecewise power curve, symmetric around t = 0.5
///
/// The second half evaluates `(t - 2)^rate`, whose sign follows the parity
/// of the integer part of `rate`; the outer sign flips with it so the curve
/// keeps rising.
fn power_in_out(t: f32, rate: f32) -> f32 {
    let even = (rate as i32) % 2 == 0;
    let sign = if even { -1.0 } else { 1.0 };
    let t = t * 2.0;
    if t < 1.0 {
        0.5 * t.powf(rate)
    } else {
        // (t - 2)^rate without a negative base, so fractional rates stay finite
        let magnitude = (2.0 - t).powf(rate);
        let power = if even { magnitude } else { -magnitude };
        sign * 0.5 * (power + sign * 2.0)
    }
}

#[inline]
fn elastic_wave(t: f32, period: f32) -> f32 {
    let shift = period / 4.0;
    ((t - shift) * 2.0 * PI / period).sin()
}

/// Four decreasing parabolic bounces reaching 1.0 at t = 1.0
fn bounce(t: f32) -> f32 {
    if t < 1.0 / 2.75 {
        7.5625 * t * t
    } else if t < 2.0 / 2.75 {
        let t = t - 1.5 / 2.75;
        7.5625 * t * t + 0.75
    } else if t < 2.5 / 2.75 {
        let t = t - 2.25 / 2.75;
        7.5625 * t * t + 0.9375
    } else {
        let t = t - 2.625 / 2.75;
        7.5625 * t * t + 0.984375
    }
}
