//! Additive day-of-week seasonality

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Additive effect per weekday, Monday first.
///
/// Effects are centered so that the weekdays which were observed average to
/// zero; weekdays never observed carry no effect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekdayProfile {
    effects: [f64; 7],
}

impl WeekdayProfile {
    /// A profile with no seasonal effect
    pub fn flat() -> Self {
        Self::default()
    }

    /// Estimate the profile from detrended residuals tagged with their weekday
    pub fn estimate(residuals: &[(Weekday, f64)]) -> Self {
        let mut sums = [0.0; 7];
        let mut counts = [0usize; 7];
        for &(weekday, residual) in residuals {
            let idx = weekday.num_days_from_monday() as usize;
            sums[idx] += residual;
            counts[idx] += 1;
        }

        let mut effects = [0.0; 7];
        let mut observed = 0usize;
        let mut total = 0.0;
        for idx in 0..7 {
            if counts[idx] > 0 {
                effects[idx] = sums[idx] / counts[idx] as f64;
                total += effects[idx];
                observed += 1;
            }
        }

        if observed > 0 {
            let center = total / observed as f64;
            for idx in 0..7 {
                if counts[idx] > 0 {
                    effects[idx] -= center;
                }
            }
        }

        Self { effects }
    }

    /// Effect for a weekday
    pub fn effect(&self, weekday: Weekday) -> f64 {
        self.effects[weekday.num_days_from_monday() as usize]
    }

    /// Whether every effect is zero
    pub fn is_flat(&self) -> bool {
        self.effects.iter().all(|e| *e == 0.0)
    }
}
