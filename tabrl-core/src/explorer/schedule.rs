//! Exploration-rate schedules.
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

/// A user-defined schedule `t -> epsilon`.
///
/// Not serializable; configurations loaded from YAML use the other variants of
/// [`EpsilonSchedule`].
#[derive(Clone)]
pub struct ScheduleFn(pub Arc<dyn Fn(usize) -> f64 + Send + Sync>);

impl fmt::Debug for ScheduleFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ScheduleFn(..)")
    }
}

impl PartialEq for ScheduleFn {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Exploration rate as a function of a counter `t`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub enum EpsilonSchedule {
    /// Fixed rate.
    Constant(f64),

    /// `1 / (t + 1)`.
    Inverse,

    /// Linear interpolation from `start` to `end`, reached at `final_step`.
    Linear {
        /// Rate at `t = 0`.
        start: f64,
        /// Rate from `final_step` on.
        end: f64,
        /// Counter value at which `end` is reached.
        final_step: usize,
    },

    /// `max(start * decay^t, min)`.
    Exponential {
        /// Rate at `t = 0`.
        start: f64,
        /// Multiplicative decay per count.
        decay: f64,
        /// Lower bound.
        min: f64,
    },

    /// User-defined function, clamped to `[0, 1]`.
    #[serde(skip)]
    Custom(ScheduleFn),
}

impl EpsilonSchedule {
    /// Constructs a custom schedule.
    pub fn custom(f: impl Fn(usize) -> f64 + Send + Sync + 'static) -> Self {
        Self::Custom(ScheduleFn(Arc::new(f)))
    }

    /// Exploration rate at counter `t`.
    pub fn value(&self, t: usize) -> f64 {
        match self {
            Self::Constant(eps) => *eps,
            Self::Inverse => 1.0 / (t as f64 + 1.0),
            Self::Linear {
                start,
                end,
                final_step,
            } => {
                if *final_step == 0 || t >= *final_step {
                    *end
                } else {
                    let d = (start - end) / (*final_step as f64);
                    start - d * t as f64
                }
            }
            Self::Exponential { start, decay, min } => (start * decay.powf(t as f64)).max(*min),
            Self::Custom(f) => (f.0)(t).clamp(0.0, 1.0),
        }
    }

    /// Checks the parameters, returning a description of the first violation.
    pub fn check(&self) -> Result<(), String> {
        let unit = |name: &str, v: f64| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(format!("{} must be in [0, 1], got {}", name, v))
            }
        };
        match self {
            Self::Constant(eps) => unit("epsilon", *eps),
            Self::Inverse | Self::Custom(_) => Ok(()),
            Self::Linear { start, end, .. } => {
                unit("epsilon start", *start)?;
                unit("epsilon end", *end)
            }
            Self::Exponential { start, decay, min } => {
                unit("epsilon start", *start)?;
                unit("epsilon min", *min)?;
                if *decay > 0.0 && *decay <= 1.0 {
                    Ok(())
                } else {
                    Err(format!("epsilon decay must be in (0, 1], got {}", decay))
                }
            }
        }
    }
}

/// What the counter `t` of an [`EpsilonSchedule`] counts.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum DecayClock {
    /// Environment steps over the whole run.
    Step,

    /// Episodes started so far.
    Episode,
}

impl Default for DecayClock {
    fn default() -> Self {
        Self::Episode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedules() {
        assert_eq!(EpsilonSchedule::Constant(0.3).value(100), 0.3);
        assert_eq!(EpsilonSchedule::Inverse.value(0), 1.0);
        assert_eq!(EpsilonSchedule::Inverse.value(3), 0.25);

        let linear = EpsilonSchedule::Linear {
            start: 1.0,
            end: 0.2,
            final_step: 4,
        };
        assert_eq!(linear.value(0), 1.0);
        assert!((linear.value(2) - 0.6).abs() < 1e-12);
        assert_eq!(linear.value(10), 0.2);

        let exp = EpsilonSchedule::Exponential {
            start: 1.0,
            decay: 0.5,
            min: 0.1,
        };
        assert_eq!(exp.value(1), 0.5);
        assert_eq!(exp.value(10), 0.1);

        let custom = EpsilonSchedule::custom(|t| 2.0 - t as f64);
        assert_eq!(custom.value(0), 1.0);
        assert_eq!(custom.value(5), 0.0);
    }

    #[test]
    fn test_check_rejects_out_of_range() {
        assert!(EpsilonSchedule::Constant(1.5).check().is_err());
        assert!(EpsilonSchedule::Exponential {
            start: 1.0,
            decay: 0.0,
            min: 0.0
        }
        .check()
        .is_err());
        assert!(EpsilonSchedule::Inverse.check().is_ok());
    }
}
