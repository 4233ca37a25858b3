//! Bounds comparison for aggregated means

use crate::config::AbsentBoundPolicy;

/// Result of checking one mean against its measurement's bounds
///
/// Carries the two bound values that were actually compared, since the
/// alert message reports them rather than the measured value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsCheck {
    pub breached: bool,
    pub effective_min: f64,
    pub effective_max: f64,
}

impl BoundsCheck {
    /// Check a mean against its bounds
    ///
    /// Breach when `mean > max` or `mean < min` after substituting absent
    /// bounds per policy. `ZeroSubstitute` replaces a missing bound with 0
    /// before comparing, so a measurement with no max alerts on any
    /// positive mean. `Unbounded` disables the missing side instead (the
    /// reported effective bound still renders as 0 in that case).
    pub fn evaluate(
        mean: f64,
        min: Option<f64>,
        max: Option<f64>,
        policy: AbsentBoundPolicy,
    ) -> BoundsCheck {
        let effective_min = min.unwrap_or(0.0);
        let effective_max = max.unwrap_or(0.0);

        let breached = match policy {
            AbsentBoundPolicy::ZeroSubstitute => mean > effective_max || mean < effective_min,
            AbsentBoundPolicy::Unbounded => {
                max.is_some_and(|max| mean > max) || min.is_some_and(|min| mean < min)
            }
        };

        BoundsCheck {
            breached,
            effective_min,
            effective_max,
        }
    }
}
